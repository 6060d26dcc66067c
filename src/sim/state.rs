//! Game state owned by the frame driver

use super::body::KinematicBody;
use super::camera::{CameraFollower, CameraPose};
use super::race::{FinishLine, RaceSession};
use super::vehicle::VehicleController;
use crate::consts::CAR_START_POSITION;
use crate::tuning::Tuning;

/// Everything one play session needs between frames
#[derive(Debug, Clone)]
pub struct GameState {
    pub session: RaceSession,
    pub vehicle: VehicleController,
    pub camera: CameraFollower,
    /// Car body in the physics host; `None` until it is attached
    pub body: Option<KinematicBody>,
    pub finish: FinishLine,
    /// Camera placement from the latest tick
    pub camera_pose: Option<CameraPose>,
}

impl GameState {
    /// New session with the car body already attached
    pub fn new(tuning: Tuning) -> Self {
        let mut state = Self::detached(tuning);
        state.attach_body(KinematicBody::new(CAR_START_POSITION));
        state
    }

    /// New session whose body will be attached later
    pub fn detached(tuning: Tuning) -> Self {
        Self {
            session: RaceSession::new(),
            vehicle: VehicleController::new(tuning.vehicle),
            camera: CameraFollower::new(tuning.camera),
            body: None,
            finish: FinishLine::default(),
            camera_pose: None,
        }
    }

    pub fn attach_body(&mut self, body: KinematicBody) {
        log::debug!("Car body attached at {:?}", body.position);
        self.body = Some(body);
    }
}

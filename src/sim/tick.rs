//! Per-frame simulation tick
//!
//! Runs the controller before the camera so the camera reads the body pose
//! written in the same frame.

use super::race::RaceEvent;
use super::state::GameState;
use super::vehicle::{ControlState, VehicleEvent, VehicleInput};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Keys held this frame
    pub controls: ControlState,
    /// Start (or restart) a run
    pub start: bool,
}

/// Advance the game state by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.start {
        state.session.start_run();
    }

    let vehicle_input = VehicleInput {
        controls: input.controls,
        race: state.session.state,
        reset_token: state.session.reset_token,
    };
    let event = state
        .vehicle
        .update(dt, &vehicle_input, state.body.as_mut(), &mut state.session);
    if event == Some(VehicleEvent::Fell) {
        state.session.handle(RaceEvent::Fell);
    }

    // Physics host step
    if let Some(body) = state.body.as_mut() {
        body.step(dt);
        if state.finish.check(body.position) {
            state.session.handle(RaceEvent::Finished);
        }
    }

    state.session.tick(dt);

    if let Some(pose) = state
        .camera
        .update(dt, state.body.as_ref(), state.session.is_running())
    {
        state.camera_pose = Some(pose);
    }
}

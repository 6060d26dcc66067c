//! Frame-driven simulation module
//!
//! All gameplay logic lives here, free of rendering and platform code:
//! - `vehicle`: keyboard intent -> car body velocity and heading
//! - `camera`: smoothed chase camera reading the same body
//! - `body`: the seam to the physics host, plus a flat-ground stand-in
//! - `race`: run state, timer and finish line

pub mod body;
pub mod camera;
pub mod race;
pub mod state;
pub mod tick;
pub mod vehicle;

pub use body::{KinematicBody, VehicleBody};
pub use camera::{CameraFollowState, CameraFollower, CameraPose};
pub use race::{FinishLine, RaceEvent, RaceSession, RaceState};
pub use state::GameState;
pub use tick::{TickInput, tick};
pub use vehicle::{
    ControlState, SpeedSink, VehicleController, VehicleEvent, VehicleInput, VehicleMotionState,
    WheelVisual,
};

//! Buggy Run - An arcade obstacle-course driving demo
//!
//! Core modules:
//! - `sim`: Per-frame simulation (vehicle controller, chase camera, race harness)
//! - `tuning`: Data-driven vehicle and camera balance

pub mod sim;
pub mod tuning;

pub use tuning::{CameraTuning, Tuning, TuningError, VehicleTuning};

use glam::{EulerRot, Quat, Vec3};

/// Course configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep (matches the 60 Hz physics step)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted by the frame driver (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Height of the driving surface
    pub const TRACK_TOP_Y: f32 = 0.1;
    /// Drivable lane width (finish line spans it)
    pub const TRACK_WIDTH: f32 = 50.0;
    /// Distance from the start zone to the end of the course
    pub const TRACK_LENGTH: f32 = 200.0;
    /// Z of the start zone centre
    pub const TRACK_START_Z: f32 = 15.0;

    /// Ground slab footprint (x half-width, z extent) - the car falls outside it
    pub const GROUND_HALF_WIDTH: f32 = 100.0;
    pub const GROUND_LENGTH: f32 = 300.0;

    /// Where the car spawns on every reset
    pub const CAR_START_POSITION: Vec3 = Vec3::new(0.0, 0.25, 15.0);
    /// Half extents of the car body cuboid
    pub const CAR_HALF_EXTENTS: Vec3 = Vec3::new(0.6, 0.25, 1.0);

    /// Finish line sensor
    pub const FINISH_Z: f32 = -195.0;
    pub const FINISH_SENSOR_CENTER: Vec3 = Vec3::new(0.0, 1.0, FINISH_Z);
    pub const FINISH_SENSOR_HALF_EXTENTS: Vec3 = Vec3::new(TRACK_WIDTH / 2.0, 2.5, 1.0);

    /// Gravity acceleration (m/s²)
    pub const GRAVITY: f32 = -9.81;

    /// Multiplier from simulation speed to the km/h readout
    pub const SPEED_DISPLAY_SCALE: f32 = 6.0;
}

/// Frame-rate independent blend weight: `1 - base^dt`.
///
/// `base` must lie in (0, 1); smaller bases converge faster. For the same
/// elapsed time, many short steps blend exactly as far as one long step.
#[inline]
pub fn smoothing_factor(base: f32, dt: f32) -> f32 {
    1.0 - base.powf(dt)
}

/// Rotation about +Y only
#[inline]
pub fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_axis_angle(Vec3::Y, yaw)
}

/// Heading of an orientation around +Y, in (-π, π]
#[inline]
pub fn yaw_of(rotation: Quat) -> f32 {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    yaw
}

/// Unit vector the vehicle faces (-Z in body space)
#[inline]
pub fn forward_of(rotation: Quat) -> Vec3 {
    (rotation * Vec3::NEG_Z).normalize()
}

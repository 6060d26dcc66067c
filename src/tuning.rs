//! Vehicle and camera tuning
//!
//! Gameplay balance lives here, separate from course constants in `consts`.
//! Persisted as JSON in LocalStorage on the web, or read from the file named by
//! `BUGGY_RUN_TUNING` on native.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{CAR_START_POSITION, TRACK_TOP_Y};

/// Errors raised while loading or validating tuning
#[derive(Debug)]
pub enum TuningError {
    /// The JSON document could not be parsed
    Parse(serde_json::Error),
    /// The tuning file could not be read
    Io(std::io::Error),
    /// A field holds a value the simulation cannot use
    Invalid { field: &'static str, reason: &'static str },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(e) => write!(f, "malformed tuning JSON: {e}"),
            TuningError::Io(e) => write!(f, "cannot read tuning file: {e}"),
            TuningError::Invalid { field, reason } => {
                write!(f, "invalid tuning `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(e) => Some(e),
            TuningError::Io(e) => Some(e),
            TuningError::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

impl From<std::io::Error> for TuningError {
    fn from(e: std::io::Error) -> Self {
        TuningError::Io(e)
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::Invalid { field, reason: "must be positive" })
    }
}

/// Bases for `1 - base^dt` blends and per-frame decay multipliers
fn require_unit_open(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(TuningError::Invalid { field, reason: "must lie in (0, 1)" })
    }
}

/// Handling of the player buggy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    /// Top forward speed (m/s)
    pub max_speed: f32,
    /// Forward acceleration (m/s²)
    pub acceleration: f32,
    /// Reverse acceleration as a fraction of `acceleration`
    pub reverse_accel_factor: f32,
    /// Reverse top speed as a fraction of `max_speed`
    pub reverse_cap_factor: f32,
    /// Base friction deceleration (m/s²)
    pub deceleration: f32,
    /// Friction multiplier when coasting
    pub coast_friction_factor: f32,
    /// Friction multiplier with the brake held
    pub brake_friction_factor: f32,

    /// Steering accumulation rate (per second)
    pub turn_rate: f32,
    /// Steering intent limit
    pub max_turn: f32,
    /// Per-frame steering decay when no turn key is held
    pub self_centering: f32,
    /// How strongly steering intent rotates the body
    pub rotation_gain: f32,
    /// Floor of the speed-scaled steering authority
    pub min_steer_authority: f32,

    /// Base of the horizontal velocity blend
    pub velocity_base: f32,

    /// Per-frame decays while the race is not running
    pub idle_speed_decay: f32,
    pub idle_yaw_decay: f32,

    /// Ride height the one-sided spring pushes toward
    pub ride_height: f32,
    /// Deficit below ride height tolerated before pushing
    pub ride_margin: f32,
    /// Spring stiffness (impulse per metre of deficit per second)
    pub ride_stiffness: f32,
    /// Cap on the spring impulse rate
    pub ride_max_force: f32,

    /// Distance below the track surface that counts as falling off
    pub fall_depth: f32,

    /// Cosmetic wheel feedback
    pub wheel_spin_rate: f32,
    pub wheel_steer_factor: f32,
    pub wheel_steer_base: f32,

    /// Spawn position used by every reset
    pub start_position: glam::Vec3,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            max_speed: 48.0,
            acceleration: 150.0,
            reverse_accel_factor: 0.6,
            reverse_cap_factor: 0.65,
            deceleration: 60.0,
            coast_friction_factor: 0.9,
            brake_friction_factor: 3.5,

            turn_rate: 8.5,
            max_turn: 1.1,
            self_centering: 0.88,
            rotation_gain: 6.5,
            min_steer_authority: 0.5,

            velocity_base: 0.1,

            idle_speed_decay: 0.85,
            idle_yaw_decay: 0.9,

            ride_height: TRACK_TOP_Y + 0.25,
            ride_margin: 0.1,
            ride_stiffness: 60.0,
            ride_max_force: 40.0,

            fall_depth: 2.0,

            wheel_spin_rate: 4.0,
            wheel_steer_factor: 0.7,
            wheel_steer_base: 0.12,

            start_position: CAR_START_POSITION,
        }
    }
}

impl VehicleTuning {
    /// Most negative speed reachable in reverse
    pub fn reverse_cap(&self) -> f32 {
        -self.max_speed * self.reverse_cap_factor
    }

    /// Height below which the car has left the course
    pub fn fall_line(&self) -> f32 {
        TRACK_TOP_Y - self.fall_depth
    }

    /// Steering authority at `speed`: scales with speed, floored for slow turns
    pub fn steer_authority(&self, speed: f32) -> f32 {
        (speed.abs() / self.max_speed).max(self.min_steer_authority)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        require_positive("max_speed", self.max_speed)?;
        require_positive("acceleration", self.acceleration)?;
        require_positive("reverse_accel_factor", self.reverse_accel_factor)?;
        require_positive("reverse_cap_factor", self.reverse_cap_factor)?;
        require_positive("deceleration", self.deceleration)?;
        require_positive("coast_friction_factor", self.coast_friction_factor)?;
        require_positive("brake_friction_factor", self.brake_friction_factor)?;
        require_positive("turn_rate", self.turn_rate)?;
        require_positive("max_turn", self.max_turn)?;
        require_positive("rotation_gain", self.rotation_gain)?;
        require_positive("min_steer_authority", self.min_steer_authority)?;
        require_positive("fall_depth", self.fall_depth)?;
        require_positive("ride_stiffness", self.ride_stiffness)?;
        require_positive("ride_max_force", self.ride_max_force)?;
        require_unit_open("self_centering", self.self_centering)?;
        require_unit_open("velocity_base", self.velocity_base)?;
        require_unit_open("idle_speed_decay", self.idle_speed_decay)?;
        require_unit_open("idle_yaw_decay", self.idle_yaw_decay)?;
        require_unit_open("wheel_steer_base", self.wheel_steer_base)?;
        if self.brake_friction_factor <= self.coast_friction_factor {
            return Err(TuningError::Invalid {
                field: "brake_friction_factor",
                reason: "must exceed coast_friction_factor",
            });
        }
        if !(self.ride_margin >= 0.0 && self.ride_margin.is_finite()) {
            return Err(TuningError::Invalid {
                field: "ride_margin",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

/// Chase camera placement and smoothing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Distance behind the car along its forward axis
    pub offset_back: f32,
    /// Height above the car
    pub height: f32,
    /// Look-at point ahead of the car
    pub look_ahead: f32,
    pub look_height: f32,

    /// Blend bases; position tracks tighter than the look-at point
    pub position_base: f32,
    pub look_base: f32,

    /// Banking roll from the forward vector's lateral component
    pub bank_gain: f32,
    pub bank_limit: f32,
    pub bank_base: f32,

    /// Extra fixed catch-up applied while the race is not running
    pub idle_relax: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            offset_back: 10.0,
            height: 4.5,
            look_ahead: 2.0,
            look_height: 1.5,
            position_base: 0.05,
            look_base: 0.08,
            bank_gain: 0.08,
            bank_limit: 0.1,
            bank_base: 0.01,
            idle_relax: 0.003,
        }
    }
}

impl CameraTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        require_unit_open("position_base", self.position_base)?;
        require_unit_open("look_base", self.look_base)?;
        require_unit_open("bank_base", self.bank_base)?;
        require_unit_open("idle_relax", self.idle_relax)?;
        if self.bank_limit < 0.0 {
            return Err(TuningError::Invalid {
                field: "bank_limit",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

/// Complete tuning bundle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub vehicle: VehicleTuning,
    pub camera: CameraTuning,
}

impl Tuning {
    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        self.vehicle.validate()?;
        self.camera.validate()
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "buggy_run_tuning";

    /// Environment variable naming a tuning file (native only)
    pub const PATH_ENV: &'static str = "BUGGY_RUN_TUNING";

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored tuning: {e}"),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Load tuning from the file named by `BUGGY_RUN_TUNING`, if set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::PATH_ENV) else {
            log::info!("Using default tuning");
            return Self::default();
        };
        match Self::from_path(&path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {path}");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file {path}: {e}");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_brake_friction_ratio() {
        let t = VehicleTuning::default();
        let ratio = t.brake_friction_factor / t.coast_friction_factor;
        assert!((ratio - 3.9).abs() < 0.05);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let tuning = Tuning::from_json(r#"{ "vehicle": { "max_speed": 30.0 } }"#).unwrap();
        assert_eq!(tuning.vehicle.max_speed, 30.0);
        assert_eq!(tuning.vehicle.acceleration, VehicleTuning::default().acceleration);
        assert_eq!(tuning.camera, CameraTuning::default());
    }

    #[test]
    fn test_rejects_bad_blend_base() {
        let err = Tuning::from_json(r#"{ "camera": { "position_base": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "position_base", .. }));
    }

    #[test]
    fn test_rejects_downward_ride_spring() {
        let err = Tuning::from_json(r#"{ "vehicle": { "ride_max_force": -40.0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "ride_max_force", .. }));

        let err = Tuning::from_json(r#"{ "vehicle": { "ride_stiffness": -60.0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "ride_stiffness", .. }));

        let err = Tuning::from_json(r#"{ "vehicle": { "ride_margin": -0.5 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "ride_margin", .. }));

        // Zero margin still only pushes up
        assert!(Tuning::from_json(r#"{ "vehicle": { "ride_margin": 0.0 } }"#).is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let mut tuning = Tuning::default();
        tuning.camera.height = 6.0;
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_steer_authority_floor() {
        let t = VehicleTuning::default();
        assert_eq!(t.steer_authority(0.0), 0.5);
        assert_eq!(t.steer_authority(-t.max_speed), 1.0);
        assert!((t.steer_authority(36.0) - 0.75).abs() < 1e-6);
    }
}

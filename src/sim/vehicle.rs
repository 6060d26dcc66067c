//! Per-frame vehicle controller
//!
//! Turns keyboard intent into a target speed and heading, then writes
//! horizontal velocity and a yaw-only orientation back to the car body.
//! Vertical motion belongs to the physics engine; the controller only nudges
//! the body up when it sinks below ride height.

use glam::Vec3;

use super::body::VehicleBody;
use super::race::RaceState;
use crate::tuning::VehicleTuning;
use crate::{forward_of, smoothing_factor, yaw_of, yaw_rotation};

/// Held keys for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub brake: bool,
}

impl ControlState {
    /// Update from a `KeyboardEvent.code`; returns false for unmapped keys
    pub fn set_key(&mut self, code: &str, pressed: bool) -> bool {
        let slot = match code {
            "ArrowUp" | "KeyW" => &mut self.forward,
            "ArrowDown" | "KeyS" => &mut self.backward,
            "ArrowLeft" | "KeyA" => &mut self.left,
            "ArrowRight" | "KeyD" => &mut self.right,
            "Space" => &mut self.brake,
            _ => return false,
        };
        *slot = pressed;
        true
    }

    /// Steering direction: +1 turns left (counter-clockwise seen from above).
    /// Right wins when both keys are held.
    fn steer_direction(&self) -> Option<f32> {
        if self.right {
            Some(-1.0)
        } else if self.left {
            Some(1.0)
        } else {
            None
        }
    }
}

/// Everything the controller consumes besides the body
#[derive(Debug, Clone, Copy, Default)]
pub struct VehicleInput {
    pub controls: ControlState,
    pub race: RaceState,
    /// Changes whenever a new run starts
    pub reset_token: u64,
}

/// Receives the absolute speed once per frame
pub trait SpeedSink {
    fn report_speed(&mut self, speed: f32);
}

/// Discards readings
impl SpeedSink for () {
    fn report_speed(&mut self, _speed: f32) {}
}

/// Records every reading
impl SpeedSink for Vec<f32> {
    fn report_speed(&mut self, speed: f32) {
        self.push(speed);
    }
}

/// Signals raised by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleEvent {
    /// Car dropped below the fall line; the run is lost
    Fell,
}

/// Controller state carried between frames
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VehicleMotionState {
    /// Signed longitudinal speed (negative in reverse)
    pub speed: f32,
    /// Signed steering intent, positive to the left
    pub yaw_intent: f32,
    /// Set on a fall, cleared only by a reset
    pub has_fallen: bool,
}

/// Cosmetic wheel pose, fed back into nothing
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelVisual {
    /// Accumulated rolling angle (radians)
    pub spin: f32,
    /// Front wheel steer angle (radians)
    pub steer: f32,
}

/// Drives the car body from held keys and race state, one frame at a time
#[derive(Debug, Clone)]
pub struct VehicleController {
    pub tuning: VehicleTuning,
    pub motion: VehicleMotionState,
    pub wheels: WheelVisual,
    /// Reset token most recently applied; `None` until the first body shows up
    applied_reset: Option<u64>,
}

impl VehicleController {
    pub fn new(tuning: VehicleTuning) -> Self {
        Self {
            tuning,
            motion: VehicleMotionState::default(),
            wheels: WheelVisual::default(),
            applied_reset: None,
        }
    }

    /// Put the car back on the start line and clear all motion state
    pub fn reset<B: VehicleBody + ?Sized>(&mut self, body: &mut B) {
        body.reset_to(self.tuning.start_position);
        self.motion = VehicleMotionState::default();
    }

    /// Advance one frame. A missing body makes the frame a no-op.
    pub fn update<B: VehicleBody + ?Sized>(
        &mut self,
        dt: f32,
        input: &VehicleInput,
        body: Option<&mut B>,
        speed_sink: &mut impl SpeedSink,
    ) -> Option<VehicleEvent> {
        let body = body?;

        if self.applied_reset != Some(input.reset_token) {
            log::info!("Resetting car for run token {}", input.reset_token);
            self.reset(body);
            self.applied_reset = Some(input.reset_token);
        }

        self.hold_ride_height(dt, body);

        if self.check_fall(body) {
            return Some(VehicleEvent::Fell);
        }

        if input.race != RaceState::Running {
            self.motion.speed *= self.tuning.idle_speed_decay;
            self.motion.yaw_intent *= self.tuning.idle_yaw_decay;
            speed_sink.report_speed(self.motion.speed.abs());
            return None;
        }

        self.update_speed(dt, &input.controls);
        self.update_steering(dt, &input.controls);
        let forward = self.integrate_heading(dt, body);
        self.apply_velocity(dt, forward, body);

        let speed = self.motion.speed.abs();
        speed_sink.report_speed(speed);
        self.animate_wheels(dt, speed);
        None
    }

    /// One-sided spring toward ride height; never pulls down
    fn hold_ride_height<B: VehicleBody + ?Sized>(&self, dt: f32, body: &mut B) {
        let t = &self.tuning;
        let deficit = t.ride_height - body.translation().y;
        if deficit > t.ride_margin {
            let force = (deficit * t.ride_stiffness).min(t.ride_max_force);
            body.apply_impulse(Vec3::new(0.0, force * dt, 0.0));
        }
    }

    /// Returns true on the frame the car first drops below the fall line
    fn check_fall<B: VehicleBody + ?Sized>(&mut self, body: &mut B) -> bool {
        let y = body.translation().y;
        if y >= self.tuning.fall_line() || self.motion.has_fallen {
            return false;
        }
        log::debug!("Car fell off the course at {:?}", body.translation());
        body.reset_to(self.tuning.start_position);
        self.motion.speed = 0.0;
        self.motion.yaw_intent = 0.0;
        self.motion.has_fallen = true;
        true
    }

    fn update_speed(&mut self, dt: f32, controls: &ControlState) {
        let t = &self.tuning;
        let speed = &mut self.motion.speed;
        if controls.forward {
            *speed = (*speed + t.acceleration * dt).min(t.max_speed);
        } else if controls.backward {
            *speed = (*speed - t.acceleration * t.reverse_accel_factor * dt).max(t.reverse_cap());
        } else {
            let factor = if controls.brake {
                t.brake_friction_factor
            } else {
                t.coast_friction_factor
            };
            let friction = t.deceleration * factor * dt;
            if *speed > 0.0 {
                *speed = (*speed - friction).max(0.0);
            } else if *speed < 0.0 {
                *speed = (*speed + friction).min(0.0);
            }
        }
    }

    fn update_steering(&mut self, dt: f32, controls: &ControlState) {
        let t = &self.tuning;
        match controls.steer_direction() {
            Some(direction) => {
                let authority = t.steer_authority(self.motion.speed);
                let yaw = self.motion.yaw_intent + t.turn_rate * dt * direction * authority;
                self.motion.yaw_intent = yaw.clamp(-t.max_turn, t.max_turn);
            }
            None => self.motion.yaw_intent *= t.self_centering,
        }
    }

    /// Rotate the body about +Y and return its new forward vector
    fn integrate_heading<B: VehicleBody + ?Sized>(&self, dt: f32, body: &mut B) -> Vec3 {
        let t = &self.tuning;
        let authority = t.steer_authority(self.motion.speed);
        let turn = self.motion.yaw_intent * dt * t.rotation_gain * authority;
        let yaw = yaw_of(body.rotation()) + turn;
        let rotation = yaw_rotation(yaw);
        body.set_rotation(rotation);
        forward_of(rotation)
    }

    /// Blend horizontal velocity toward the heading; Y is left to physics
    fn apply_velocity<B: VehicleBody + ?Sized>(&self, dt: f32, forward: Vec3, body: &mut B) {
        let current = body.linvel();
        let target = forward * self.motion.speed;
        let blend = smoothing_factor(self.tuning.velocity_base, dt);
        body.set_linvel(Vec3::new(
            current.x + (target.x - current.x) * blend,
            current.y,
            current.z + (target.z - current.z) * blend,
        ));
    }

    fn animate_wheels(&mut self, dt: f32, speed: f32) {
        let t = &self.tuning;
        self.wheels.spin += speed * dt * t.wheel_spin_rate;
        let target = self.motion.yaw_intent * t.wheel_steer_factor;
        let blend = smoothing_factor(t.wheel_steer_base, dt);
        self.wheels.steer += (target - self.wheels.steer) * blend;
    }
}

//! Chase camera
//!
//! Sits behind and above the car along its own forward axis and looks at a
//! point just ahead of it. Position tracks tighter than the look-at point, so
//! the view lags slightly through turns.

use glam::Vec3;

use super::body::VehicleBody;
use crate::tuning::CameraTuning;
use crate::{forward_of, smoothing_factor};

/// Camera placement handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Banking roll about the view axis (radians)
    pub roll: f32,
}

/// Smoothed camera state; once initialized it is never reset
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraFollowState {
    pub smoothed_position: Vec3,
    pub smoothed_look_at: Vec3,
    pub roll: f32,
    pub initialized: bool,
}

#[derive(Debug, Clone)]
pub struct CameraFollower {
    pub tuning: CameraTuning,
    pub state: CameraFollowState,
}

impl CameraFollower {
    pub fn new(tuning: CameraTuning) -> Self {
        Self {
            tuning,
            state: CameraFollowState::default(),
        }
    }

    /// Where the camera wants to be and look for a car at `position` facing `forward`
    pub fn targets(&self, position: Vec3, forward: Vec3) -> (Vec3, Vec3) {
        let t = &self.tuning;
        let target_position = position - forward * t.offset_back + Vec3::Y * t.height;
        let target_look_at = position + forward * t.look_ahead + Vec3::Y * t.look_height;
        (target_position, target_look_at)
    }

    /// Advance one frame; `None` while no body is attached
    pub fn update<B: VehicleBody + ?Sized>(
        &mut self,
        dt: f32,
        body: Option<&B>,
        is_running: bool,
    ) -> Option<CameraPose> {
        let body = body?;
        let forward = forward_of(body.rotation());
        let (target_position, target_look_at) = self.targets(body.translation(), forward);
        let t = &self.tuning;
        let s = &mut self.state;

        if !s.initialized {
            s.smoothed_position = target_position;
            s.smoothed_look_at = target_look_at;
            s.initialized = true;
            return Some(self.pose());
        }

        s.smoothed_position = s
            .smoothed_position
            .lerp(target_position, smoothing_factor(t.position_base, dt));
        s.smoothed_look_at = s
            .smoothed_look_at
            .lerp(target_look_at, smoothing_factor(t.look_base, dt));

        let bank = (forward.x * t.bank_gain).clamp(-t.bank_limit, t.bank_limit);
        s.roll += (-bank - s.roll) * smoothing_factor(t.bank_base, dt);

        // Stacks on the blend above; lets the camera settle between runs
        if !is_running {
            s.smoothed_position = s.smoothed_position.lerp(target_position, t.idle_relax);
        }

        Some(self.pose())
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.state.smoothed_position,
            look_at: self.state.smoothed_look_at,
            roll: self.state.roll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::body::KinematicBody;
    use crate::yaw_rotation;
    use std::f32::consts::FRAC_PI_2;

    fn follower() -> CameraFollower {
        CameraFollower::new(CameraTuning::default())
    }

    #[test]
    fn test_first_frame_snaps_to_targets() {
        let mut cam = follower();
        let body = KinematicBody::new(Vec3::ZERO);
        let pose = cam.update(SIM_DT, Some(&body), true).unwrap();

        assert!(cam.state.initialized);
        assert_eq!(pose.position, Vec3::new(0.0, 4.5, 10.0));
        assert_eq!(pose.look_at, Vec3::new(0.0, 1.5, -2.0));
        assert_eq!(pose.roll, 0.0);
    }

    #[test]
    fn test_missing_body_leaves_state_untouched() {
        let mut cam = follower();
        assert!(cam.update(SIM_DT, None::<&KinematicBody>, true).is_none());
        assert!(!cam.state.initialized);
    }

    #[test]
    fn test_position_tracks_tighter_than_look_at() {
        let mut cam = follower();
        let mut body = KinematicBody::new(Vec3::ZERO);
        cam.update(SIM_DT, Some(&body), true);

        body.position = Vec3::new(0.0, 0.0, -5.0);
        let (target_position, target_look_at) = cam.targets(body.position, Vec3::NEG_Z);
        let pose = cam.update(SIM_DT, Some(&body), true).unwrap();

        let pos_progress = 1.0 - (pose.position - target_position).length() / 5.0;
        let look_progress = 1.0 - (pose.look_at - target_look_at).length() / 5.0;
        assert!((pos_progress - smoothing_factor(0.05, SIM_DT)).abs() < 1e-4);
        assert!((look_progress - smoothing_factor(0.08, SIM_DT)).abs() < 1e-4);
        assert!(pos_progress > look_progress);
    }

    #[test]
    fn test_converges_on_a_parked_car() {
        let mut cam = follower();
        let mut body = KinematicBody::new(Vec3::ZERO);
        cam.update(SIM_DT, Some(&body), true);

        body.position = Vec3::new(3.0, 0.35, -40.0);
        body.rotation = yaw_rotation(0.4);
        for _ in 0..600 {
            cam.update(SIM_DT, Some(&body), true);
        }
        let (target_position, target_look_at) =
            cam.targets(body.position, forward_of(body.rotation));
        assert!((cam.state.smoothed_position - target_position).length() < 1e-3);
        assert!((cam.state.smoothed_look_at - target_look_at).length() < 1e-3);
    }

    #[test]
    fn test_banking_is_clamped_and_opposes_heading() {
        let mut cam = follower();
        let mut body = KinematicBody::new(Vec3::ZERO);
        cam.update(SIM_DT, Some(&body), true);

        // Facing -X: lateral component is -1, bank clamps to -0.08 -> roll toward +0.08
        body.rotation = yaw_rotation(FRAC_PI_2);
        for _ in 0..600 {
            cam.update(SIM_DT, Some(&body), true);
        }
        assert!((cam.state.roll - 0.08).abs() < 1e-3);

        cam.tuning.bank_gain = 1.0;
        for _ in 0..600 {
            cam.update(SIM_DT, Some(&body), true);
        }
        assert!((cam.state.roll - 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_idle_relax_compounds_with_blend() {
        let mut racing = follower();
        let body = KinematicBody::new(Vec3::ZERO);
        racing.update(SIM_DT, Some(&body), true);
        let mut idle = racing.clone();

        let moved = KinematicBody::new(Vec3::new(0.0, 0.0, -10.0));
        let (target, _) = racing.targets(moved.position, Vec3::NEG_Z);
        racing.update(SIM_DT, Some(&moved), true);
        idle.update(SIM_DT, Some(&moved), false);

        let blend = smoothing_factor(0.05, SIM_DT);
        let racing_gap = (racing.state.smoothed_position - target).length();
        let idle_gap = (idle.state.smoothed_position - target).length();
        assert!((racing_gap - 10.0 * (1.0 - blend)).abs() < 1e-3);
        // The extra step removes 0.3% of whatever gap the normal blend left
        assert!((idle_gap - 10.0 * (1.0 - blend) * (1.0 - 0.003)).abs() < 1e-3);
        // Look-at is not relaxed
        assert_eq!(racing.state.smoothed_look_at, idle.state.smoothed_look_at);
    }

    #[test]
    fn test_smoothing_continues_across_restarts() {
        let mut cam = follower();
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.35, -120.0));
        cam.update(SIM_DT, Some(&body), true);

        // Car teleports back to the start; the camera glides instead of snapping
        body.position = Vec3::new(0.0, 0.35, 15.0);
        let pose = cam.update(SIM_DT, Some(&body), false).unwrap();
        let (target, _) = cam.targets(body.position, Vec3::NEG_Z);
        assert!(cam.state.initialized);
        assert!((pose.position - target).length() > 100.0);
    }
}

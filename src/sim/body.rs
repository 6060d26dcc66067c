//! Rigid body seam between the controller and the physics host
//!
//! The physics engine owns the car body. The controller and camera only see it
//! through `VehicleBody`, and a body that is not attached yet is simply `None`.

use glam::{Quat, Vec3};

use crate::consts::*;

/// Access to the car's rigid body inside the host physics engine
pub trait VehicleBody {
    fn translation(&self) -> Vec3;
    fn set_translation(&mut self, translation: Vec3);

    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);

    fn linvel(&self) -> Vec3;
    fn set_linvel(&mut self, linvel: Vec3);

    fn angvel(&self) -> Vec3;
    fn set_angvel(&mut self, angvel: Vec3);

    /// Instantaneous change of momentum
    fn apply_impulse(&mut self, impulse: Vec3);

    /// Teleport to `position` at rest with identity orientation
    fn reset_to(&mut self, position: Vec3) {
        self.set_translation(position);
        self.set_linvel(Vec3::ZERO);
        self.set_angvel(Vec3::ZERO);
        self.set_rotation(Quat::IDENTITY);
    }
}

/// Minimal stand-in body: gravity, damping and a flat ground slab.
///
/// Only the floor is solid and only inside the slab footprint, so driving off
/// the edge drops the car. Obstacles are not collided with.
#[derive(Debug, Clone)]
pub struct KinematicBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub linvel: Vec3,
    pub angvel: Vec3,
    /// Heavy enough that the ride-height spring cannot hold it up over a void
    pub mass: f32,
    pub half_extents: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl KinematicBody {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            linvel: Vec3::ZERO,
            angvel: Vec3::ZERO,
            mass: 5.0,
            half_extents: CAR_HALF_EXTENTS,
            linear_damping: 0.03,
            angular_damping: 0.08,
        }
    }

    /// Is `(x, z)` over the ground slab
    pub fn over_ground(x: f32, z: f32) -> bool {
        let center_z = TRACK_START_Z - TRACK_LENGTH / 2.0;
        x.abs() <= GROUND_HALF_WIDTH && (z - center_z).abs() <= GROUND_LENGTH / 2.0
    }

    /// Advance one physics step
    pub fn step(&mut self, dt: f32) {
        self.linvel.y += GRAVITY * dt;
        self.linvel *= 1.0 / (1.0 + dt * self.linear_damping);
        self.angvel *= 1.0 / (1.0 + dt * self.angular_damping);

        self.position += self.linvel * dt;
        let spin = self.angvel * dt;
        if spin.length_squared() > 0.0 {
            self.rotation = (Quat::from_scaled_axis(spin) * self.rotation).normalize();
        }

        // Floor contact: no penetration, no bounce
        let rest_y = TRACK_TOP_Y + self.half_extents.y;
        if Self::over_ground(self.position.x, self.position.z)
            && self.position.y < rest_y
            && self.position.y > TRACK_TOP_Y - self.half_extents.y * 2.0
        {
            self.position.y = rest_y;
            if self.linvel.y < 0.0 {
                self.linvel.y = 0.0;
            }
        }
    }
}

impl VehicleBody for KinematicBody {
    fn translation(&self) -> Vec3 {
        self.position
    }

    fn set_translation(&mut self, translation: Vec3) {
        self.position = translation;
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn linvel(&self) -> Vec3 {
        self.linvel
    }

    fn set_linvel(&mut self, linvel: Vec3) {
        self.linvel = linvel;
    }

    fn angvel(&self) -> Vec3 {
        self.angvel
    }

    fn set_angvel(&mut self, angvel: Vec3) {
        self.angvel = angvel;
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        self.linvel += impulse / self.mass;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rests_on_track() {
        let mut body = KinematicBody::new(CAR_START_POSITION);
        for _ in 0..120 {
            body.step(SIM_DT);
        }
        assert!((body.position.y - (TRACK_TOP_Y + 0.25)).abs() < 1e-4);
        assert_eq!(body.linvel.y, 0.0);
    }

    #[test]
    fn test_falls_off_edge() {
        let mut body = KinematicBody::new(Vec3::new(GROUND_HALF_WIDTH + 5.0, 0.35, 0.0));
        for _ in 0..60 {
            body.step(SIM_DT);
        }
        assert!(body.position.y < TRACK_TOP_Y - 2.0);
    }

    #[test]
    fn test_reset_to_start() {
        let mut body = KinematicBody::new(Vec3::new(3.0, -5.0, -40.0));
        body.linvel = Vec3::new(1.0, -2.0, 3.0);
        body.angvel = Vec3::Y;
        body.rotation = Quat::from_rotation_y(1.0);

        body.reset_to(CAR_START_POSITION);

        assert_eq!(body.position, CAR_START_POSITION);
        assert_eq!(body.linvel, Vec3::ZERO);
        assert_eq!(body.angvel, Vec3::ZERO);
        assert_eq!(body.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_impulse_scales_by_mass() {
        let mut body = KinematicBody::new(Vec3::ZERO);
        body.mass = 2.0;
        body.apply_impulse(Vec3::new(0.0, 3.0, 0.0));
        assert!((body.linvel.y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_ground_footprint() {
        assert!(KinematicBody::over_ground(0.0, CAR_START_POSITION.z));
        assert!(KinematicBody::over_ground(0.0, FINISH_Z));
        assert!(!KinematicBody::over_ground(GROUND_HALF_WIDTH + 1.0, 0.0));
        assert!(!KinematicBody::over_ground(0.0, 80.0));
    }
}

//! Observation vector assembly
//!
//! The 24-slot layout and its normalization are the policy's contract; every
//! factor here must be reproduced exactly or a trained policy silently
//! degrades. Layout:
//!
//! ```text
//!  0  hull angle (rad)
//!  1  hull angular velocity * 2 / FPS
//!  2  horizontal velocity * 0.3 * (VIEWPORT_W/SCALE) / FPS
//!  3  vertical velocity   * 0.3 * (VIEWPORT_H/SCALE) / FPS
//!  4..8   hip angle, hip speed/SPEED_HIP, knee angle + 1, knee speed/SPEED_KNEE, shin contact  (leg 0)
//!  9..13  same for leg 1
//! 14..23  lidar fractions, ray order
//! ```

use glam::Vec2;

use crate::consts::{FPS, LIDAR_RAYS, OBSERVATION_DIM, SCALE, SPEED_HIP, SPEED_KNEE, VIEWPORT_H, VIEWPORT_W};
use crate::error::EnvError;

/// Fixed-length normalized observation vector.
pub type Observation = [f32; OBSERVATION_DIM];

/// Hull kinematics sampled after a physics tick.
#[derive(Debug, Clone, Copy)]
pub struct HullState {
    pub position: Vec2,
    pub angle: f32,
    pub linvel: Vec2,
    pub angvel: f32,
}

/// Angle and angular speed of one revolute joint.
#[derive(Debug, Clone, Copy)]
pub struct JointState {
    pub angle: f32,
    pub speed: f32,
}

/// Assemble the observation. Joint order is `[hip 0, knee 0, hip 1, knee 1]`.
///
/// Any non-finite input means the physics state diverged; that is surfaced
/// here rather than leaked into the vector.
pub fn build(
    hull: &HullState,
    joints: &[JointState; 4],
    shin_contact: [bool; 2],
    lidar: &[f32; LIDAR_RAYS],
) -> Result<Observation, EnvError> {
    let mut obs = [0.0f32; OBSERVATION_DIM];

    obs[0] = hull.angle;
    obs[1] = 2.0 * hull.angvel / FPS;
    obs[2] = 0.3 * hull.linvel.x * (VIEWPORT_W / SCALE) / FPS;
    obs[3] = 0.3 * hull.linvel.y * (VIEWPORT_H / SCALE) / FPS;

    for leg in 0..2 {
        let base = 4 + 5 * leg;
        let hip = joints[2 * leg];
        let knee = joints[2 * leg + 1];
        obs[base] = hip.angle;
        obs[base + 1] = hip.speed / SPEED_HIP;
        obs[base + 2] = knee.angle + 1.0;
        obs[base + 3] = knee.speed / SPEED_KNEE;
        obs[base + 4] = if shin_contact[leg] { 1.0 } else { 0.0 };
    }

    obs[14..24].copy_from_slice(lidar);

    if !obs.iter().all(|v| v.is_finite()) {
        return Err(EnvError::SimulationDiverged {
            what: "observation",
        });
    }
    Ok(obs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_hull() -> HullState {
        HullState {
            position: Vec2::ZERO,
            angle: 0.1,
            linvel: Vec2::new(1.0, -0.5),
            angvel: 0.2,
        }
    }

    #[test]
    fn test_layout_and_normalization() {
        let joints = [
            JointState { angle: 0.3, speed: 2.0 },
            JointState { angle: -0.9, speed: 3.0 },
            JointState { angle: -0.2, speed: -2.0 },
            JointState { angle: -1.2, speed: -3.0 },
        ];
        let lidar = [0.5; LIDAR_RAYS];
        let obs = build(&still_hull(), &joints, [true, false], &lidar).expect("finite");

        assert_eq!(obs.len(), OBSERVATION_DIM);
        assert_eq!(obs[0], 0.1);
        assert_eq!(obs[1], 2.0 * 0.2 / FPS);
        assert_eq!(obs[2], 0.3 * 1.0 * (VIEWPORT_W / SCALE) / FPS);
        assert_eq!(obs[3], 0.3 * -0.5 * (VIEWPORT_H / SCALE) / FPS);
        assert_eq!(obs[4], 0.3);
        assert_eq!(obs[5], 2.0 / SPEED_HIP);
        assert_eq!(obs[6], -0.9 + 1.0);
        assert_eq!(obs[7], 3.0 / SPEED_KNEE);
        assert_eq!(obs[8], 1.0);
        assert_eq!(obs[9], -0.2);
        assert_eq!(obs[13], 0.0);
        assert!(obs[14..24].iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_non_finite_state_is_rejected() {
        let mut hull = still_hull();
        hull.angle = f32::NAN;
        let joints = [JointState { angle: 0.0, speed: 0.0 }; 4];
        let lidar = [1.0; LIDAR_RAYS];

        let err = build(&hull, &joints, [false, false], &lidar).unwrap_err();
        assert!(matches!(err, EnvError::SimulationDiverged { .. }));
    }
}

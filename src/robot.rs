//! Articulated walker construction
//!
//! One hull plus two legs of (thigh, shin) segments, joined by four
//! motorized revolute joints. Bodies and joints live in the episode's
//! [`PhysicsWorld`]; this module only holds the handles and the build
//! geometry.

use glam::Vec2;
use rapier2d::prelude::{ColliderHandle, ImpulseJointHandle, RigidBodyHandle};

use crate::consts::{
    HULL_POLY, INITIAL_RANDOM, LEG_DOWN, LEG_H, LEG_W, MOTORS_TORQUE, SCALE, TERRAIN_HEIGHT,
    TERRAIN_STARTPAD, TERRAIN_STEP,
};
use crate::error::EnvError;
use crate::physics::PhysicsWorld;
use crate::rng::EnvRng;

/// One dynamic body with its attached collider.
#[derive(Debug, Clone, Copy)]
pub struct BodyPart {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

/// One leg: thigh hinged to the hull, shin hinged to the thigh.
#[derive(Debug, Clone, Copy)]
pub struct Leg {
    pub thigh: BodyPart,
    pub shin: BodyPart,
    pub hip: ImpulseJointHandle,
    pub knee: ImpulseJointHandle,
}

/// The walker's bodies and joints for one episode.
///
/// Joint order for action mapping is `[hip 0, knee 0, hip 1, knee 1]`;
/// `legs[0]` is the side spawned tilted backward, `legs[1]` forward.
#[derive(Debug, Clone)]
pub struct Robot {
    pub hull: BodyPart,
    pub legs: [Leg; 2],
}

/// Hip joint angle limits, radians.
const HIP_LIMITS: [f32; 2] = [-0.8, 1.1];
/// Knee joint angle limits, radians.
const KNEE_LIMITS: [f32; 2] = [-1.6, -0.1];

impl Robot {
    /// Build the walker over the terrain's flat start pad and apply the
    /// random spawn force to the hull. The force persists until the
    /// environment clears it after the first (internal) physics tick.
    pub fn build(physics: &mut PhysicsWorld, rng: &mut EnvRng) -> Result<Self, EnvError> {
        let init_x = TERRAIN_STEP * TERRAIN_STARTPAD as f32 / 2.0;
        let init_y = TERRAIN_HEIGHT + 2.0 * LEG_H;

        let hull_vertices: Vec<Vec2> = HULL_POLY
            .iter()
            .map(|&(x, y)| Vec2::new(x / SCALE, y / SCALE))
            .collect();

        let hull_body = physics.add_dynamic_body(Vec2::new(init_x, init_y), 0.0);
        let hull_collider = physics
            .attach_convex_collider(hull_body, &hull_vertices, 5.0, 0.1, true)
            .ok_or(EnvError::DegenerateGeometry { what: "hull polygon" })?;
        let hull = BodyPart {
            body: hull_body,
            collider: hull_collider,
        };

        // A nudge so the walker never starts perfectly balanced.
        let push = rng.uniform(-INITIAL_RANDOM, INITIAL_RANDOM);
        physics.apply_force_to_center(hull_body, Vec2::new(push, 0.0));

        let legs = [
            Self::build_leg(physics, hull_body, init_x, init_y, -1.0),
            Self::build_leg(physics, hull_body, init_x, init_y, 1.0),
        ];

        Ok(Self { hull, legs })
    }

    fn build_leg(
        physics: &mut PhysicsWorld,
        hull: RigidBodyHandle,
        init_x: f32,
        init_y: f32,
        side: f32,
    ) -> Leg {
        let thigh_body = physics.add_dynamic_body(
            Vec2::new(init_x, init_y - LEG_H / 2.0 - LEG_DOWN),
            side * 0.05,
        );
        let thigh_collider =
            physics.attach_box_collider(thigh_body, LEG_W / 2.0, LEG_H / 2.0, 1.0, false);

        let hip = physics.create_revolute_joint(
            hull,
            thigh_body,
            Vec2::new(0.0, LEG_DOWN),
            Vec2::new(0.0, LEG_H / 2.0),
            HIP_LIMITS,
            side,
            MOTORS_TORQUE,
        );

        let shin_body = physics.add_dynamic_body(
            Vec2::new(init_x, init_y - LEG_H * 3.0 / 2.0 - LEG_DOWN),
            side * 0.05,
        );
        let shin_collider =
            physics.attach_box_collider(shin_body, 0.8 * LEG_W / 2.0, LEG_H / 2.0, 1.0, true);

        let knee = physics.create_revolute_joint(
            thigh_body,
            shin_body,
            Vec2::new(0.0, -LEG_H / 2.0),
            Vec2::new(0.0, LEG_H / 2.0),
            KNEE_LIMITS,
            1.0,
            MOTORS_TORQUE,
        );

        Leg {
            thigh: BodyPart {
                body: thigh_body,
                collider: thigh_collider,
            },
            shin: BodyPart {
                body: shin_body,
                collider: shin_collider,
            },
            hip,
            knee,
        }
    }

    /// Joints in action order: `[hip 0, knee 0, hip 1, knee 1]`, each with
    /// its parent and child body for angle/speed readback.
    pub fn joints(&self) -> [(ImpulseJointHandle, RigidBodyHandle, RigidBodyHandle); 4] {
        let hull = self.hull.body;
        let [l0, l1] = &self.legs;
        [
            (l0.hip, hull, l0.thigh.body),
            (l0.knee, l0.thigh.body, l0.shin.body),
            (l1.hip, hull, l1.thigh.body),
            (l1.knee, l1.thigh.body, l1.shin.body),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TERRAIN_HEIGHT;

    #[test]
    fn test_robot_spawns_over_startpad() {
        let mut physics = PhysicsWorld::new();
        let mut rng = EnvRng::seed_from(1);
        let robot = Robot::build(&mut physics, &mut rng).expect("build");

        let pos = physics.body_position(robot.hull.body);
        assert!((pos.x - TERRAIN_STEP * TERRAIN_STARTPAD as f32 / 2.0).abs() < 1e-6);
        assert!((pos.y - (TERRAIN_HEIGHT + 2.0 * LEG_H)).abs() < 1e-6);
    }

    #[test]
    fn test_leg_segments_spawn_tilted_apart() {
        let mut physics = PhysicsWorld::new();
        let mut rng = EnvRng::seed_from(1);
        let robot = Robot::build(&mut physics, &mut rng).expect("build");

        assert!((physics.body_angle(robot.legs[0].thigh.body) + 0.05).abs() < 1e-6);
        assert!((physics.body_angle(robot.legs[1].thigh.body) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_joint_action_order() {
        let mut physics = PhysicsWorld::new();
        let mut rng = EnvRng::seed_from(1);
        let robot = Robot::build(&mut physics, &mut rng).expect("build");

        let joints = robot.joints();
        assert_eq!(joints[0].0, robot.legs[0].hip);
        assert_eq!(joints[1].0, robot.legs[0].knee);
        assert_eq!(joints[2].0, robot.legs[1].hip);
        assert_eq!(joints[3].0, robot.legs[1].knee);
    }
}

//! Contact tracking and lidar sensing
//!
//! The contact tracker consumes the collision begin/end events drained from
//! the physics world after each tick; it holds only the collider handles it
//! cares about, not a back-reference to the environment. The lidar casts a
//! fan of ground-filtered rays from the hull.

use glam::Vec2;
use rapier2d::prelude::{ColliderHandle, CollisionEvent};

use crate::consts::{LIDAR_RANGE, LIDAR_RAYS};
use crate::physics::PhysicsWorld;
use crate::robot::Robot;

/// Tracks the fatal hull contact and the per-shin ground contacts.
#[derive(Debug, Clone)]
pub struct ContactTracker {
    hull: ColliderHandle,
    shins: [ColliderHandle; 2],
    hull_contact: bool,
    shin_contact: [bool; 2],
}

impl ContactTracker {
    pub fn new(robot: &Robot) -> Self {
        Self {
            hull: robot.hull.collider,
            shins: [robot.legs[0].shin.collider, robot.legs[1].shin.collider],
            hull_contact: false,
            shin_contact: [false; 2],
        }
    }

    /// Fold a batch of collision events into the contact state. Events that
    /// involve no tracked collider are ignored.
    pub fn observe(&mut self, events: &[CollisionEvent]) {
        for event in events {
            match *event {
                CollisionEvent::Started(a, b, _) => {
                    if a == self.hull || b == self.hull {
                        // Fatal, and never cleared for the rest of the episode.
                        self.hull_contact = true;
                    }
                    for (i, shin) in self.shins.iter().enumerate() {
                        if a == *shin || b == *shin {
                            self.shin_contact[i] = true;
                        }
                    }
                }
                CollisionEvent::Stopped(a, b, _) => {
                    for (i, shin) in self.shins.iter().enumerate() {
                        if a == *shin || b == *shin {
                            self.shin_contact[i] = false;
                        }
                    }
                }
            }
        }
    }

    /// Whether the hull has ever touched the ground this episode.
    pub fn hull_contact(&self) -> bool {
        self.hull_contact
    }

    /// Current ground contact of each shin, in leg order.
    pub fn shin_contact(&self) -> [bool; 2] {
        self.shin_contact
    }
}

/// Result of one lidar sweep.
#[derive(Debug, Clone)]
pub struct LidarScan {
    /// Fraction of [`LIDAR_RANGE`] to the first ground hit per ray;
    /// 1.0 means no hit within range.
    pub fractions: [f32; LIDAR_RAYS],
    pub origin: Vec2,
    /// Hit point (or max-range endpoint) per ray, for rendering.
    pub endpoints: [Vec2; LIDAR_RAYS],
}

impl LidarScan {
    /// A sweep with no hits, used before the first physics tick.
    pub fn empty(origin: Vec2) -> Self {
        let mut scan = Self {
            fractions: [1.0; LIDAR_RAYS],
            origin,
            endpoints: [origin; LIDAR_RAYS],
        };
        for (i, endpoint) in scan.endpoints.iter_mut().enumerate() {
            *endpoint = origin + ray_direction(i) * LIDAR_RANGE;
        }
        scan
    }

    /// Cast the 10-ray fan from `origin` against ground colliders only.
    ///
    /// The fan covers roughly 86 degrees forward-downward; non-ground
    /// fixtures are excluded so legs and hull never occlude the sensor.
    pub fn sweep(physics: &PhysicsWorld, origin: Vec2) -> Self {
        let mut fractions = [1.0f32; LIDAR_RAYS];
        let mut endpoints = [origin; LIDAR_RAYS];
        for i in 0..LIDAR_RAYS {
            let dir = ray_direction(i);
            let fraction = physics
                .cast_ground_ray(origin, dir, LIDAR_RANGE)
                .unwrap_or(1.0);
            fractions[i] = fraction;
            endpoints[i] = origin + dir * LIDAR_RANGE * fraction;
        }
        Self {
            fractions,
            origin,
            endpoints,
        }
    }
}

/// Unit direction of ray `i`: `(sin(1.5 i/10), -cos(1.5 i/10))`.
fn ray_direction(i: usize) -> Vec2 {
    let angle = 1.5 * i as f32 / LIDAR_RAYS as f32;
    Vec2::new(angle.sin(), -angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::EnvRng;
    use rapier2d::prelude::CollisionEventFlags;

    fn test_robot() -> (PhysicsWorld, Robot) {
        let mut physics = PhysicsWorld::new();
        let mut rng = EnvRng::seed_from(1);
        let robot = Robot::build(&mut physics, &mut rng).expect("build");
        (physics, robot)
    }

    #[test]
    fn test_hull_contact_is_sticky() {
        let (_physics, robot) = test_robot();
        let mut tracker = ContactTracker::new(&robot);
        let hull = robot.hull.collider;
        let other = robot.legs[0].thigh.collider;

        tracker.observe(&[CollisionEvent::Started(
            hull,
            other,
            CollisionEventFlags::empty(),
        )]);
        assert!(tracker.hull_contact());

        // End events never clear the fatal flag.
        tracker.observe(&[CollisionEvent::Stopped(
            hull,
            other,
            CollisionEventFlags::empty(),
        )]);
        assert!(tracker.hull_contact());
    }

    #[test]
    fn test_shin_contact_follows_begin_end() {
        let (_physics, robot) = test_robot();
        let mut tracker = ContactTracker::new(&robot);
        let shin = robot.legs[1].shin.collider;
        let other = robot.hull.collider;

        tracker.observe(&[CollisionEvent::Started(
            shin,
            other,
            CollisionEventFlags::empty(),
        )]);
        assert_eq!(tracker.shin_contact(), [false, true]);

        tracker.observe(&[CollisionEvent::Stopped(
            other,
            shin,
            CollisionEventFlags::empty(),
        )]);
        assert_eq!(tracker.shin_contact(), [false, false]);
    }

    #[test]
    fn test_untracked_contacts_are_ignored() {
        let (_physics, robot) = test_robot();
        let mut tracker = ContactTracker::new(&robot);
        let a = robot.legs[0].thigh.collider;
        let b = robot.legs[1].thigh.collider;

        tracker.observe(&[CollisionEvent::Started(a, b, CollisionEventFlags::empty())]);
        assert!(!tracker.hull_contact());
        assert_eq!(tracker.shin_contact(), [false, false]);
    }

    #[test]
    fn test_lidar_fraction_on_flat_ground() {
        let mut physics = PhysicsWorld::new();
        physics.add_ground_segment(Vec2::new(-20.0, 0.0), Vec2::new(20.0, 0.0), 2.5);
        physics.step();

        let height = 2.0;
        let scan = LidarScan::sweep(&physics, Vec2::new(0.0, height));

        // Ray 0 points straight down.
        let expected = height / LIDAR_RANGE;
        assert!((scan.fractions[0] - expected).abs() < 1e-2);
        for f in scan.fractions {
            assert!((0.0..=1.0).contains(&f));
        }
    }

    #[test]
    fn test_lidar_misses_report_full_range() {
        let physics = PhysicsWorld::new();
        let scan = LidarScan::sweep(&physics, Vec2::new(0.0, 100.0));
        assert_eq!(scan.fractions, [1.0; LIDAR_RAYS]);
        for (i, e) in scan.endpoints.iter().enumerate() {
            let dir = ray_direction(i);
            let expected = Vec2::new(0.0, 100.0) + dir * LIDAR_RANGE;
            assert!((*e - expected).length() < 1e-5);
        }
    }
}

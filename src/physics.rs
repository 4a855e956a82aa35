//! Rigid-body physics wrapper around rapier2d
//!
//! The environment treats the physics engine as an external capability:
//! create static/dynamic bodies, create motorized revolute joints, advance
//! the world by a fixed timestep, cast rays, report collision events. This
//! module is the only place rapier (and nalgebra) types appear; everything
//! else works with `glam::Vec2` and opaque handles.

use crossbeam::channel::Receiver;
use glam::Vec2;
use rapier2d::prelude::*;

use crate::consts::FPS;

/// Collision group for all terrain colliders (ground segments and obstacle
/// polygons). Lidar rays filter on this group, so robot geometry can never
/// self-occlude the sensor.
pub const GROUND_GROUP: Group = Group::GROUP_1;

/// Collision group for the hull and leg colliders. Robot colliders filter on
/// [`GROUND_GROUP`] only, so legs never collide with each other or the hull.
pub const ROBOT_GROUP: Group = Group::GROUP_2;

/// Owns the complete rapier state for one episode.
///
/// Dropping the `PhysicsWorld` tears down every body, collider and joint at
/// once, which keeps episode teardown trivially idempotent.
pub struct PhysicsWorld {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: ChannelEventCollector,
    collision_recv: Receiver<CollisionEvent>,
    // Kept alive so the collector's sender never disconnects.
    _contact_force_recv: Receiver<ContactForceEvent>,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let integration_parameters = IntegrationParameters {
            dt: 1.0 / FPS,
            // Extra friction passes keep the high-friction ground contacts
            // stable under the strong joint motors.
            num_additional_friction_iterations: 30,
            ..Default::default()
        };

        let (collision_send, collision_recv) = crossbeam::channel::unbounded();
        let (contact_force_send, contact_force_recv) = crossbeam::channel::unbounded();
        let event_collector = ChannelEventCollector::new(collision_send, contact_force_send);

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            pipeline: PhysicsPipeline::new(),
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector,
            collision_recv,
            _contact_force_recv: contact_force_recv,
        }
    }

    /// Advance the world by one fixed tick (`1.0 / FPS` seconds).
    pub fn step(&mut self) {
        let gravity = vector![0.0, -10.0];
        let physics_hooks = ();

        self.pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &physics_hooks,
            &self.event_collector,
        );
    }

    /// Drain the collision begin/end events emitted by the last step.
    pub fn drain_collision_events(&mut self) -> Vec<CollisionEvent> {
        self.collision_recv.try_iter().collect()
    }

    // ===== Static terrain colliders =====

    /// Insert one ground polyline segment as a static collider.
    pub fn add_ground_segment(&mut self, a: Vec2, b: Vec2, friction: f32) -> ColliderHandle {
        let collider = ColliderBuilder::segment(point![a.x, a.y], point![b.x, b.y])
            .friction(friction)
            .collision_groups(InteractionGroups::new(GROUND_GROUP, Group::ALL))
            .build();
        self.collider_set.insert(collider)
    }

    /// Insert a convex obstacle polygon as a static collider. Returns `None`
    /// if the vertices do not span a valid convex area.
    pub fn add_ground_polygon(&mut self, vertices: &[Vec2], friction: f32) -> Option<ColliderHandle> {
        let points: Vec<_> = vertices.iter().map(|v| point![v.x, v.y]).collect();
        let builder = ColliderBuilder::convex_hull(&points)?;
        let collider = builder
            .friction(friction)
            .collision_groups(InteractionGroups::new(GROUND_GROUP, Group::ALL))
            .build();
        Some(self.collider_set.insert(collider))
    }

    // ===== Dynamic robot bodies =====

    /// Create a dynamic body at the given pose, without colliders.
    pub fn add_dynamic_body(&mut self, position: Vec2, angle: f32) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y])
            .rotation(angle)
            .build();
        self.rigid_body_set.insert(body)
    }

    /// Attach a convex polygon collider (robot collision groups) to a body.
    /// `report_contacts` enables begin/end collision events for the collider.
    pub fn attach_convex_collider(
        &mut self,
        body: RigidBodyHandle,
        vertices: &[Vec2],
        density: f32,
        friction: f32,
        report_contacts: bool,
    ) -> Option<ColliderHandle> {
        let points: Vec<_> = vertices.iter().map(|v| point![v.x, v.y]).collect();
        let mut builder = ColliderBuilder::convex_hull(&points)?
            .density(density)
            .friction(friction)
            .restitution(0.0)
            .collision_groups(InteractionGroups::new(ROBOT_GROUP, GROUND_GROUP));
        if report_contacts {
            builder = builder.active_events(ActiveEvents::COLLISION_EVENTS);
        }
        let handle =
            self.collider_set
                .insert_with_parent(builder.build(), body, &mut self.rigid_body_set);
        Some(handle)
    }

    /// Attach a box collider (robot collision groups) to a body.
    pub fn attach_box_collider(
        &mut self,
        body: RigidBodyHandle,
        half_width: f32,
        half_height: f32,
        density: f32,
        report_contacts: bool,
    ) -> ColliderHandle {
        let mut builder = ColliderBuilder::cuboid(half_width, half_height)
            .density(density)
            .restitution(0.0)
            .collision_groups(InteractionGroups::new(ROBOT_GROUP, GROUND_GROUP));
        if report_contacts {
            builder = builder.active_events(ActiveEvents::COLLISION_EVENTS);
        }
        self.collider_set
            .insert_with_parent(builder.build(), body, &mut self.rigid_body_set)
    }

    // ===== Joints =====

    /// Create a motorized revolute joint with angle limits between two
    /// bodies. The motor is force-based with the given initial velocity
    /// target and torque cap, matching a speed-driven torque-capped motor.
    #[allow(clippy::too_many_arguments)]
    pub fn create_revolute_joint(
        &mut self,
        parent: RigidBodyHandle,
        child: RigidBodyHandle,
        anchor_parent: Vec2,
        anchor_child: Vec2,
        limits: [f32; 2],
        motor_speed: f32,
        max_torque: f32,
    ) -> ImpulseJointHandle {
        let joint = RevoluteJointBuilder::new()
            .local_anchor1(point![anchor_parent.x, anchor_parent.y])
            .local_anchor2(point![anchor_child.x, anchor_child.y])
            .limits(limits)
            .motor_model(MotorModel::ForceBased)
            .motor_velocity(motor_speed, 1.0)
            .motor_max_force(max_torque)
            .contacts_enabled(false)
            .build();
        self.impulse_joint_set.insert(parent, child, joint, true)
    }

    /// Update a joint motor's velocity target and torque cap.
    pub fn set_motor(&mut self, joint: ImpulseJointHandle, speed: f32, max_torque: f32) {
        if let Some(j) = self.impulse_joint_set.get_mut(joint) {
            if let Some(rev) = j.data.as_revolute_mut() {
                rev.set_motor_velocity(speed, 1.0)
                    .set_motor_max_force(max_torque);
            }
        }
    }

    /// Current angle and angular speed of a revolute joint, derived from the
    /// two linked bodies (Box2D convention: child relative to parent).
    pub fn revolute_state(&self, parent: RigidBodyHandle, child: RigidBodyHandle) -> (f32, f32) {
        let p = &self.rigid_body_set[parent];
        let c = &self.rigid_body_set[child];
        let angle = c.rotation().angle() - p.rotation().angle();
        let speed = c.angvel() - p.angvel();
        (angle, speed)
    }

    // ===== Body state =====

    pub fn body_position(&self, body: RigidBodyHandle) -> Vec2 {
        let t = self.rigid_body_set[body].translation();
        Vec2::new(t.x, t.y)
    }

    pub fn body_angle(&self, body: RigidBodyHandle) -> f32 {
        self.rigid_body_set[body].rotation().angle()
    }

    pub fn body_linvel(&self, body: RigidBodyHandle) -> Vec2 {
        let v = self.rigid_body_set[body].linvel();
        Vec2::new(v.x, v.y)
    }

    pub fn body_angvel(&self, body: RigidBodyHandle) -> f32 {
        self.rigid_body_set[body].angvel()
    }

    /// Apply a persistent force at the body's center of mass. Stays in
    /// effect until [`Self::clear_forces`].
    pub fn apply_force_to_center(&mut self, body: RigidBodyHandle, force: Vec2) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.add_force(vector![force.x, force.y], true);
        }
    }

    pub fn clear_forces(&mut self, body: RigidBodyHandle) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.reset_forces(true);
        }
    }

    // ===== Queries =====

    /// Cast a ray against ground-group colliders only. Returns the fraction
    /// of `max_len` to the first hit, or `None` if nothing is hit in range.
    pub fn cast_ground_ray(&self, origin: Vec2, dir: Vec2, max_len: f32) -> Option<f32> {
        let ray = Ray::new(point![origin.x, origin.y], vector![dir.x, dir.y]);
        let filter = QueryFilter::new().groups(InteractionGroups::new(Group::ALL, GROUND_GROUP));
        self.query_pipeline
            .cast_ray(&self.rigid_body_set, &self.collider_set, &ray, max_len, true, filter)
            .map(|(_, toi)| toi / max_len)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_body_falls_under_gravity() {
        let mut world = PhysicsWorld::new();
        let body = world.add_dynamic_body(Vec2::new(0.0, 10.0), 0.0);
        world.attach_box_collider(body, 0.5, 0.5, 1.0, false);

        for _ in 0..50 {
            world.step();
        }

        assert!(world.body_position(body).y < 10.0);
        assert!(world.body_linvel(body).y < 0.0);
    }

    #[test]
    fn test_high_friction_resting_contact_is_stable() {
        let mut world = PhysicsWorld::new();
        world.add_ground_segment(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0), 2.5);
        let body = world.add_dynamic_body(Vec2::new(0.0, 0.6), 0.0);
        world.attach_box_collider(body, 0.5, 0.5, 1.0, false);

        for _ in 0..200 {
            world.step();
        }

        let pos = world.body_position(body);
        assert!(pos.x.abs() < 0.05, "box must not drift on flat ground");
        assert!(pos.y > 0.3, "box must come to rest on the segment");
    }

    #[test]
    fn test_ground_ray_hits_segment() {
        let mut world = PhysicsWorld::new();
        world.add_ground_segment(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0), 2.5);
        world.step();

        let frac = world
            .cast_ground_ray(Vec2::new(0.0, 2.0), Vec2::new(0.0, -1.0), 4.0)
            .expect("ray should hit the ground segment");
        assert!((frac - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_ground_ray_ignores_robot_colliders() {
        let mut world = PhysicsWorld::new();
        let body = world.add_dynamic_body(Vec2::new(0.0, 1.0), 0.0);
        world.attach_box_collider(body, 0.5, 0.5, 1.0, false);
        world.step();

        // Only a robot collider below the origin: the ground-filtered ray
        // must report no hit.
        let hit = world.cast_ground_ray(Vec2::new(0.0, 3.0), Vec2::new(0.0, -1.0), 4.0);
        assert!(hit.is_none());
    }

    #[test]
    fn test_revolute_state_tracks_relative_rotation() {
        let mut world = PhysicsWorld::new();
        let parent = world.add_dynamic_body(Vec2::new(0.0, 0.0), 0.0);
        let child = world.add_dynamic_body(Vec2::new(0.0, -1.0), 0.3);

        let (angle, _) = world.revolute_state(parent, child);
        assert!((angle - 0.3).abs() < 1e-6);
    }
}

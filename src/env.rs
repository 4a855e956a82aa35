//! Episode orchestration
//!
//! [`WalkerEnv`] owns the seeded RNG and, per episode, the physics world,
//! terrain, robot, contact state and reward shaper. `reset()` rebuilds all
//! per-episode entities from scratch; `step()` applies an action to the
//! joint motors, advances physics by one fixed tick, gathers the sensors and
//! produces the observation/reward/termination triple.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    ACTION_DIM, FRICTION, HULL_POLY, LEG_H, LEG_W, MOTORS_TORQUE, OBSERVATION_DIM, SCALE,
    SPEED_HIP, SPEED_KNEE, SUCCESS_X, VIEWPORT_W,
};
use crate::error::EnvError;
use crate::observation::{self, HullState, JointState, Observation};
use crate::physics::PhysicsWorld;
use crate::render::{
    leg_colors, BodyKind, DrawableBody, GroundPoly, GroundSegment, LidarLine, RenderSnapshot,
    GRASS_DARK, GRASS_LIGHT, GROUND_FILL, HULL_FILL, HULL_OUTLINE,
};
use crate::reward::RewardShaper;
use crate::rng::EnvRng;
use crate::robot::Robot;
use crate::sensors::{ContactTracker, LidarScan};
use crate::sign;
use crate::terrain::Terrain;

/// Environment construction options.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Whether the terrain grammar may leave GRASS (stumps, stairs, pits).
    pub hardcore: bool,
    /// Initial RNG seed; drawn from entropy when `None`.
    pub seed: Option<u64>,
}

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationCause {
    /// The hull touched the ground; reward is overridden to -100.
    HullContact,
    /// The hull moved behind the terrain origin; reward is overridden to -100.
    OutOfBounds,
    /// The hull crossed the far end of the terrain; ordinary reward.
    ReachedEnd,
}

impl TerminationCause {
    /// Whether this cause carries the -100 reward override.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::HullContact | Self::OutOfBounds)
    }
}

/// Termination decision for one post-tick hull state. Fatal causes take
/// precedence over a crossed success threshold.
fn evaluate_termination(hull_x: f32, hull_contact: bool) -> Option<TerminationCause> {
    if hull_contact {
        Some(TerminationCause::HullContact)
    } else if hull_x < 0.0 {
        Some(TerminationCause::OutOfBounds)
    } else if hull_x > SUCCESS_X {
        Some(TerminationCause::ReachedEnd)
    } else {
        None
    }
}

/// Extra per-step information. Deliberately empty, kept for API symmetry
/// with the usual (observation, reward, done, info) tuple.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StepInfo {}

/// Result of one environment step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f32,
    pub done: bool,
    pub info: StepInfo,
}

/// Box space description (per-dimension bounds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxSpace {
    pub low: Vec<f32>,
    pub high: Vec<f32>,
}

impl BoxSpace {
    pub fn dim(&self) -> usize {
        self.low.len()
    }
}

/// All entities living exactly one episode.
struct Episode {
    physics: PhysicsWorld,
    terrain: Terrain,
    robot: Robot,
    contacts: ContactTracker,
    shaper: RewardShaper,
    lidar: LidarScan,
    scroll: f32,
    step_count: usize,
    terminated: Option<TerminationCause>,
}

/// The walker environment.
pub struct WalkerEnv {
    hardcore: bool,
    rng: EnvRng,
    seed: u64,
    episode: Option<Episode>,
}

impl WalkerEnv {
    pub fn new(config: EnvConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            hardcore: config.hardcore,
            rng: EnvRng::seed_from(seed),
            seed,
            episode: None,
        }
    }

    pub fn hardcore(&self) -> bool {
        self.hardcore
    }

    /// Reinitialize the RNG. Returns the effective seed used.
    pub fn seed(&mut self, seed: Option<u64>) -> u64 {
        let seed = seed.unwrap_or_else(rand::random);
        self.seed = seed;
        self.rng = EnvRng::seed_from(seed);
        seed
    }

    /// Tear down the previous episode (a no-op on the first call), rebuild
    /// terrain and robot, and produce the initial observation via one
    /// internal zero-action tick.
    pub fn reset(&mut self) -> Result<Observation, EnvError> {
        // Dropping the episode drops the whole physics world with it.
        self.episode = None;

        let mut physics = PhysicsWorld::new();
        let terrain = Terrain::generate(self.hardcore, &mut self.rng);

        for i in 0..terrain.segment_count() {
            physics.add_ground_segment(terrain.points[i], terrain.points[i + 1], FRICTION);
        }
        for obstacle in &terrain.obstacles {
            physics
                .add_ground_polygon(&obstacle.vertices, obstacle.friction)
                .ok_or(EnvError::DegenerateGeometry {
                    what: "obstacle polygon",
                })?;
        }

        let robot = Robot::build(&mut physics, &mut self.rng)?;
        let contacts = ContactTracker::new(&robot);
        let hull_pos = physics.body_position(robot.hull.body);

        let mut episode = Episode {
            physics,
            terrain,
            robot,
            contacts,
            shaper: RewardShaper::new(),
            lidar: LidarScan::empty(hull_pos),
            scroll: 0.0,
            step_count: 0,
            terminated: None,
        };

        // One zero-action tick populates sensors and the first observation.
        // It records no shaping potential, so the first caller step still
        // sees an undefined previous potential.
        let (observation, _) = Self::advance(&mut episode, &[0.0; ACTION_DIM])?;

        // The spawn force acts for exactly one tick, like a one-shot push.
        let hull = episode.robot.hull.body;
        episode.physics.clear_forces(hull);

        self.episode = Some(episode);
        log::debug!(
            "episode reset: seed={} hardcore={}",
            self.seed,
            self.hardcore
        );
        Ok(observation)
    }

    /// Apply a 4-component action and advance the episode by one tick.
    ///
    /// Component signs drive the motor speed targets, clipped magnitudes the
    /// torque caps; values outside `[-1, 1]` are clamped, a wrong arity is
    /// an error. Calling before `reset()` or after termination is rejected.
    pub fn step(&mut self, action: &[f32]) -> Result<StepOutcome, EnvError> {
        if action.len() != ACTION_DIM {
            return Err(EnvError::InvalidAction { got: action.len() });
        }
        let episode = self.episode.as_mut().ok_or(EnvError::NotInitialized)?;
        if episode.terminated.is_some() {
            return Err(EnvError::EpisodeTerminated);
        }

        let action: [f32; ACTION_DIM] = [action[0], action[1], action[2], action[3]];
        let (observation, hull) = Self::advance(episode, &action)?;

        let mut reward = episode.shaper.step(hull.position.x, hull.angle, &action);
        let mut done = false;

        if let Some(cause) = evaluate_termination(hull.position.x, episode.contacts.hull_contact())
        {
            if cause.is_fatal() {
                reward = -100.0;
            }
            done = true;
            episode.terminated = Some(cause);
        }

        episode.step_count += 1;
        if let Some(cause) = episode.terminated {
            log::debug!(
                "episode terminated after {} steps: {:?}",
                episode.step_count,
                cause
            );
        }

        Ok(StepOutcome {
            observation,
            reward,
            done,
            info: StepInfo {},
        })
    }

    /// Motor application, physics tick, contact/lidar/joint readback and
    /// observation assembly, shared by `reset` and `step`.
    fn advance(
        episode: &mut Episode,
        action: &[f32; ACTION_DIM],
    ) -> Result<(Observation, HullState), EnvError> {
        let joints = episode.robot.joints();

        for (i, (joint, _, _)) in joints.iter().enumerate() {
            let speed = if i % 2 == 0 { SPEED_HIP } else { SPEED_KNEE };
            let a = action[i];
            episode.physics.set_motor(
                *joint,
                speed * sign(a),
                MOTORS_TORQUE * a.abs().clamp(0.0, 1.0),
            );
        }

        episode.physics.step();

        let events = episode.physics.drain_collision_events();
        episode.contacts.observe(&events);

        let hull_body = episode.robot.hull.body;
        let hull = HullState {
            position: episode.physics.body_position(hull_body),
            angle: episode.physics.body_angle(hull_body),
            linvel: episode.physics.body_linvel(hull_body),
            angvel: episode.physics.body_angvel(hull_body),
        };

        episode.lidar = LidarScan::sweep(&episode.physics, hull.position);

        let mut joint_states = [JointState {
            angle: 0.0,
            speed: 0.0,
        }; 4];
        for (i, (_, parent, child)) in joints.iter().enumerate() {
            let (angle, speed) = episode.physics.revolute_state(*parent, *child);
            joint_states[i] = JointState { angle, speed };
        }

        let observation = observation::build(
            &hull,
            &joint_states,
            episode.contacts.shin_contact(),
            &episode.lidar.fractions,
        )?;

        episode.scroll = hull.position.x - VIEWPORT_W / SCALE / 5.0;
        Ok((observation, hull))
    }

    /// Action space: box, 4 dimensions, each in `[-1, 1]`.
    pub fn action_space() -> BoxSpace {
        BoxSpace {
            low: vec![-1.0; ACTION_DIM],
            high: vec![1.0; ACTION_DIM],
        }
    }

    /// Observation space: box, 24 dimensions, nominally unbounded.
    pub fn observation_space() -> BoxSpace {
        BoxSpace {
            low: vec![f32::NEG_INFINITY; OBSERVATION_DIM],
            high: vec![f32::INFINITY; OBSERVATION_DIM],
        }
    }

    /// Why the current episode ended, if it has.
    pub fn termination(&self) -> Option<TerminationCause> {
        self.episode.as_ref().and_then(|e| e.terminated)
    }

    /// Steps taken since the last reset.
    pub fn step_count(&self) -> usize {
        self.episode.as_ref().map_or(0, |e| e.step_count)
    }

    /// Current viewport scroll offset, if an episode is live.
    pub fn scroll(&self) -> Option<f32> {
        self.episode.as_ref().map(|e| e.scroll)
    }

    /// Capture the current frame data for an external renderer.
    pub fn render_snapshot(&self) -> Option<RenderSnapshot> {
        let episode = self.episode.as_ref()?;
        let terrain = &episode.terrain;

        let mut ground_segments = Vec::with_capacity(terrain.segment_count());
        let mut ground_polys = Vec::with_capacity(terrain.segment_count());
        for i in 0..terrain.segment_count() {
            let a = terrain.points[i];
            let b = terrain.points[i + 1];
            let color = if Terrain::segment_is_light(i) {
                GRASS_LIGHT
            } else {
                GRASS_DARK
            };
            ground_segments.push(GroundSegment { a, b, color });
            ground_polys.push(GroundPoly {
                vertices: [a, b, Vec2::new(b.x, 0.0), Vec2::new(a.x, 0.0)],
                color: GROUND_FILL,
            });
        }

        let mut bodies = Vec::with_capacity(5);
        let physics = &episode.physics;
        let hull = episode.robot.hull.body;
        bodies.push(DrawableBody {
            kind: BodyKind::Hull,
            position: physics.body_position(hull),
            angle: physics.body_angle(hull),
            vertices: HULL_POLY
                .iter()
                .map(|&(x, y)| Vec2::new(x / SCALE, y / SCALE))
                .collect(),
            fill: HULL_FILL,
            outline: HULL_OUTLINE,
        });
        for (leg, side) in episode.robot.legs.iter().zip([-1.0f32, 1.0]) {
            let (fill, outline) = leg_colors(side);
            for (kind, part, half_w) in [
                (BodyKind::Thigh, &leg.thigh, LEG_W / 2.0),
                (BodyKind::Shin, &leg.shin, 0.8 * LEG_W / 2.0),
            ] {
                bodies.push(DrawableBody {
                    kind,
                    position: physics.body_position(part.body),
                    angle: physics.body_angle(part.body),
                    vertices: box_vertices(half_w, LEG_H / 2.0),
                    fill,
                    outline,
                });
            }
        }

        let lidar = episode
            .lidar
            .endpoints
            .iter()
            .map(|&to| LidarLine {
                from: episode.lidar.origin,
                to,
            })
            .collect();

        Some(RenderSnapshot {
            scroll: episode.scroll,
            step_count: episode.step_count,
            ground_segments,
            ground_polys,
            obstacles: terrain.obstacles.clone(),
            clouds: terrain.clouds.clone(),
            bodies,
            lidar,
        })
    }
}

fn box_vertices(half_w: f32, half_h: f32) -> Vec<Vec2> {
    vec![
        Vec2::new(-half_w, -half_h),
        Vec2::new(half_w, -half_h),
        Vec2::new(half_w, half_h),
        Vec2::new(-half_w, half_h),
    ]
}

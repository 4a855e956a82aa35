//! Simulation constants
//!
//! All values are carried over from the reference walker environment; the
//! observation normalization and the reward scale depend on them, so they are
//! part of the policy contract and must not drift.

/// Physics tick rate; one `step()` advances the world by `1.0 / FPS` seconds.
pub const FPS: f32 = 50.0;

/// World-units-per-pixel scale. Affects how fast-paced the simulation is;
/// forces are tuned against it.
pub const SCALE: f32 = 30.0;

/// Torque cap shared by all four joint motors.
pub const MOTORS_TORQUE: f32 = 80.0;

/// Motor speed target magnitude for the hip joints.
pub const SPEED_HIP: f32 = 4.0;

/// Motor speed target magnitude for the knee joints.
pub const SPEED_KNEE: f32 = 6.0;

/// Maximum lidar ray length, in world units.
pub const LIDAR_RANGE: f32 = 160.0 / SCALE;

/// Number of lidar rays cast per step.
pub const LIDAR_RAYS: usize = 10;

/// Magnitude bound of the random horizontal force applied to the hull at
/// spawn, so the walker never starts perfectly balanced.
pub const INITIAL_RANDOM: f32 = 5.0;

/// Hull polygon outline in pixel units (divided by [`SCALE`] at build time).
pub const HULL_POLY: [(f32, f32); 5] = [
    (-30.0, 9.0),
    (6.0, 9.0),
    (34.0, 1.0),
    (34.0, -8.0),
    (-30.0, -8.0),
];

/// Vertical offset of the hip anchor below the hull center.
pub const LEG_DOWN: f32 = -8.0 / SCALE;
/// Leg segment width, in world units.
pub const LEG_W: f32 = 8.0 / SCALE;
/// Leg segment height, in world units.
pub const LEG_H: f32 = 34.0 / SCALE;

/// Viewport size in pixels; enters the observation normalization.
pub const VIEWPORT_W: f32 = 600.0;
pub const VIEWPORT_H: f32 = 400.0;

/// Horizontal distance between consecutive terrain points.
pub const TERRAIN_STEP: f32 = 14.0 / SCALE;
/// Terrain length in generation steps.
pub const TERRAIN_LENGTH: usize = 200;
/// Baseline ground height the grass random walk reverts to.
pub const TERRAIN_HEIGHT: f32 = VIEWPORT_H / SCALE / 4.0;
/// Grass run length bound between terrain features, in steps.
pub const TERRAIN_GRASS: usize = 10;
/// Flat spawn pad length at the start of the terrain, in steps.
pub const TERRAIN_STARTPAD: usize = 20;
/// Ground friction coefficient.
pub const FRICTION: f32 = 2.5;

/// Number of action components (hip1, knee1, hip2, knee2).
pub const ACTION_DIM: usize = 4;
/// Length of the observation vector.
pub const OBSERVATION_DIM: usize = 24;

/// Hull x-position past which the episode counts as a successful traversal.
pub const SUCCESS_X: f32 = (TERRAIN_LENGTH - TERRAIN_GRASS) as f32 * TERRAIN_STEP;

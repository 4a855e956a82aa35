//! Procedural terrain generation
//!
//! A stateful 4-state grammar lays out the ground height polyline and embeds
//! obstacle geometry. Normal mode never leaves GRASS (mildly uneven ground,
//! zero obstacles); hardcore mode transitions uniformly into STUMP, STAIRS or
//! PIT runs with randomized dimensions. The generator produces pure data; the
//! environment instantiates the matching static colliders.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    FRICTION, SCALE, TERRAIN_GRASS, TERRAIN_HEIGHT, TERRAIN_LENGTH, TERRAIN_STARTPAD, TERRAIN_STEP,
    VIEWPORT_H,
};
use crate::rng::EnvRng;
use crate::sign;

/// Obstacle geometry kinds emitted by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    PitWall,
    Stump,
    StairTread,
}

/// One static obstacle polygon (always an axis-aligned rectangle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstaclePoly {
    pub kind: ObstacleKind,
    /// Vertices in the original emission order.
    pub vertices: Vec<Vec2>,
    pub friction: f32,
}

/// One decorative cloud polygon with its x-extent for scroll culling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudPoly {
    pub vertices: Vec<Vec2>,
    pub x_min: f32,
    pub x_max: f32,
}

/// Generated terrain for one episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    /// Ground polyline, one point per generation step; `points[i].x` is
    /// exactly `i * TERRAIN_STEP` regardless of the random draws.
    pub points: Vec<Vec2>,
    pub obstacles: Vec<ObstaclePoly>,
    /// Cosmetic layer. Generated from the same RNG stream as the rest of the
    /// episode, so it participates in the determinism contract.
    pub clouds: Vec<CloudPoly>,
}

/// Grammar states. The run-length `counter` and the `oneshot` flag marking
/// the first step after a transition live alongside in [`Terrain::generate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GrammarState {
    Grass,
    Stump,
    Stairs,
    Pit,
}

impl Terrain {
    /// Run the grammar and lay out the full terrain.
    pub fn generate(hardcore: bool, rng: &mut EnvRng) -> Self {
        let mut points = Vec::with_capacity(TERRAIN_LENGTH);
        let mut obstacles = Vec::new();

        let mut state = GrammarState::Grass;
        let mut velocity = 0.0f32;
        let mut y = TERRAIN_HEIGHT;
        let mut counter = TERRAIN_STARTPAD as i32;
        let mut oneshot = false;

        // Registers used by the PIT and STAIRS runs.
        let mut original_y = 0.0f32;
        let mut stair_height = 0i32;
        let mut stair_width = 0i32;
        let mut stair_steps = 0i32;

        for i in 0..TERRAIN_LENGTH {
            let x = i as f32 * TERRAIN_STEP;

            match (state, oneshot) {
                (GrammarState::Grass, false) => {
                    // Mean-reverting random walk toward the baseline height.
                    velocity = 0.8 * velocity + 0.01 * sign(TERRAIN_HEIGHT - y);
                    if i > TERRAIN_STARTPAD {
                        velocity += rng.uniform(-1.0, 1.0) / SCALE;
                    }
                    y += velocity;
                }
                (GrammarState::Pit, true) => {
                    counter = rng.integers(3, 5);
                    let wall = [
                        Vec2::new(x, y),
                        Vec2::new(x + TERRAIN_STEP, y),
                        Vec2::new(x + TERRAIN_STEP, y - 4.0 * TERRAIN_STEP),
                        Vec2::new(x, y - 4.0 * TERRAIN_STEP),
                    ];
                    obstacles.push(ObstaclePoly {
                        kind: ObstacleKind::PitWall,
                        vertices: wall.to_vec(),
                        friction: FRICTION,
                    });
                    let shift = TERRAIN_STEP * counter as f32;
                    obstacles.push(ObstaclePoly {
                        kind: ObstacleKind::PitWall,
                        vertices: wall.iter().map(|p| Vec2::new(p.x + shift, p.y)).collect(),
                        friction: FRICTION,
                    });
                    counter += 2;
                    original_y = y;
                }
                (GrammarState::Pit, false) => {
                    y = original_y;
                    if counter > 1 {
                        y -= 4.0 * TERRAIN_STEP;
                    }
                }
                (GrammarState::Stump, true) => {
                    counter = rng.integers(1, 3);
                    let side = counter as f32 * TERRAIN_STEP;
                    obstacles.push(ObstaclePoly {
                        kind: ObstacleKind::Stump,
                        vertices: vec![
                            Vec2::new(x, y),
                            Vec2::new(x + side, y),
                            Vec2::new(x + side, y + side),
                            Vec2::new(x, y + side),
                        ],
                        friction: FRICTION,
                    });
                }
                (GrammarState::Stairs, true) => {
                    stair_height = if rng.random() > 0.5 { 1 } else { -1 };
                    stair_width = rng.integers(4, 5);
                    stair_steps = rng.integers(3, 5);
                    original_y = y;
                    for s in 0..stair_steps {
                        let x0 = x + (s * stair_width) as f32 * TERRAIN_STEP;
                        let x1 = x + ((s + 1) * stair_width) as f32 * TERRAIN_STEP;
                        let y1 = y + (s * stair_height) as f32 * TERRAIN_STEP;
                        let y0 = y + (s * stair_height - 1) as f32 * TERRAIN_STEP;
                        obstacles.push(ObstaclePoly {
                            kind: ObstacleKind::StairTread,
                            vertices: vec![
                                Vec2::new(x0, y1),
                                Vec2::new(x1, y1),
                                Vec2::new(x1, y0),
                                Vec2::new(x0, y0),
                            ],
                            friction: FRICTION,
                        });
                    }
                    counter = stair_steps * stair_width;
                }
                (GrammarState::Stairs, false) => {
                    let s = stair_steps * stair_width - counter - stair_height;
                    let n = s as f32 / stair_width as f32;
                    y = original_y + n * stair_height as f32 * TERRAIN_STEP;
                }
                // A stump run (and the first step back in grass) leaves the
                // ground height untouched.
                (GrammarState::Stump, false) | (GrammarState::Grass, true) => {}
            }

            oneshot = false;
            points.push(Vec2::new(x, y));

            counter -= 1;
            if counter == 0 {
                counter = rng.integers(TERRAIN_GRASS as i32 / 2, TERRAIN_GRASS as i32);
                if state == GrammarState::Grass && hardcore {
                    state = match rng.integers(1, 4) {
                        1 => GrammarState::Stump,
                        2 => GrammarState::Stairs,
                        _ => GrammarState::Pit,
                    };
                } else {
                    state = GrammarState::Grass;
                }
                oneshot = true;
            }
        }

        let clouds = generate_clouds(rng);

        Self {
            points,
            obstacles,
            clouds,
        }
    }

    /// Number of ground polyline segments.
    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Whether ground segment `i` gets the light of the two grass tones.
    pub fn segment_is_light(i: usize) -> bool {
        i % 2 == 0
    }
}

/// Decorative cloud layer: TERRAIN_LENGTH/20 five-pointed jittered polygons
/// at random x across the terrain span.
fn generate_clouds(rng: &mut EnvRng) -> Vec<CloudPoly> {
    let mut clouds = Vec::with_capacity(TERRAIN_LENGTH / 20);
    for _ in 0..TERRAIN_LENGTH / 20 {
        let x = rng.uniform(0.0, TERRAIN_LENGTH as f32) * TERRAIN_STEP;
        let y = VIEWPORT_H / SCALE * 3.0 / 4.0;
        let vertices: Vec<Vec2> = (0..5)
            .map(|a| {
                let phase = 3.14 * 2.0 * a as f32 / 5.0;
                let px = x + 15.0 * TERRAIN_STEP * phase.sin() + rng.uniform(0.0, 5.0 * TERRAIN_STEP);
                let py = y + 5.0 * TERRAIN_STEP * phase.cos() + rng.uniform(0.0, 5.0 * TERRAIN_STEP);
                Vec2::new(px, py)
            })
            .collect();
        let x_min = vertices.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let x_max = vertices.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        clouds.push(CloudPoly {
            vertices,
            x_min,
            x_max,
        });
    }
    clouds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_coordinates_deterministic() {
        for seed in [0u64, 1, 42, 12345] {
            let mut rng = EnvRng::seed_from(seed);
            let terrain = Terrain::generate(true, &mut rng);
            assert_eq!(terrain.points.len(), TERRAIN_LENGTH);
            for (i, p) in terrain.points.iter().enumerate() {
                assert_eq!(p.x, i as f32 * TERRAIN_STEP);
            }
        }
    }

    #[test]
    fn test_normal_mode_emits_no_obstacles() {
        for seed in [0u64, 7, 42, 12345, 99999] {
            let mut rng = EnvRng::seed_from(seed);
            let terrain = Terrain::generate(false, &mut rng);
            assert!(terrain.obstacles.is_empty());
        }
    }

    #[test]
    fn test_startpad_is_flat() {
        let mut rng = EnvRng::seed_from(12345);
        let terrain = Terrain::generate(false, &mut rng);
        // No noise is drawn until past the start pad, and the mean-reverting
        // walk starts exactly at the baseline, so the pad stays level.
        for p in &terrain.points[..TERRAIN_STARTPAD] {
            assert_eq!(p.y, TERRAIN_HEIGHT);
        }
    }

    #[test]
    fn test_generation_is_seed_deterministic() {
        let mut a = EnvRng::seed_from(31337);
        let mut b = EnvRng::seed_from(31337);
        let ta = Terrain::generate(true, &mut a);
        let tb = Terrain::generate(true, &mut b);

        assert_eq!(ta.points, tb.points);
        assert_eq!(ta.obstacles.len(), tb.obstacles.len());
        for (oa, ob) in ta.obstacles.iter().zip(&tb.obstacles) {
            assert_eq!(oa.kind, ob.kind);
            assert_eq!(oa.vertices, ob.vertices);
        }
        for (ca, cb) in ta.clouds.iter().zip(&tb.clouds) {
            assert_eq!(ca.vertices, cb.vertices);
        }
    }

    #[test]
    fn test_hardcore_eventually_emits_each_obstacle_kind() {
        let mut seen_pit = false;
        let mut seen_stump = false;
        let mut seen_stairs = false;
        for seed in 0..20u64 {
            let mut rng = EnvRng::seed_from(seed);
            let terrain = Terrain::generate(true, &mut rng);
            for o in &terrain.obstacles {
                match o.kind {
                    ObstacleKind::PitWall => seen_pit = true,
                    ObstacleKind::Stump => seen_stump = true,
                    ObstacleKind::StairTread => seen_stairs = true,
                }
            }
        }
        assert!(seen_pit && seen_stump && seen_stairs);
    }

    #[test]
    fn test_obstacles_only_after_startpad() {
        for seed in 0..10u64 {
            let mut rng = EnvRng::seed_from(seed);
            let terrain = Terrain::generate(true, &mut rng);
            let pad_end = TERRAIN_STARTPAD as f32 * TERRAIN_STEP;
            for o in &terrain.obstacles {
                for v in &o.vertices {
                    assert!(v.x >= pad_end);
                }
            }
        }
    }

    #[test]
    fn test_ground_stays_level_under_stumps() {
        // A stump run never alters the height walk, so the polyline point
        // right after a stump's base sits at the same height (this also
        // covers two-wide stumps, where the run outlives its emission step).
        let mut seen_wide = false;
        for seed in 0..40u64 {
            let mut rng = EnvRng::seed_from(seed);
            let terrain = Terrain::generate(true, &mut rng);
            for o in &terrain.obstacles {
                if o.kind != ObstacleKind::Stump {
                    continue;
                }
                let base = o.vertices[0];
                let i = (base.x / TERRAIN_STEP).round() as usize;
                let width = ((o.vertices[1].x - base.x) / TERRAIN_STEP).round() as usize;
                assert_eq!(terrain.points[i].y, base.y);
                if i + 1 < terrain.points.len() {
                    assert_eq!(terrain.points[i + 1].y, base.y);
                }
                if width >= 2 {
                    seen_wide = true;
                }
            }
        }
        assert!(seen_wide, "expected at least one two-wide stump across seeds");
    }

    #[test]
    fn test_cloud_layer_size_and_extents() {
        let mut rng = EnvRng::seed_from(5);
        let terrain = Terrain::generate(false, &mut rng);
        assert_eq!(terrain.clouds.len(), TERRAIN_LENGTH / 20);
        for c in &terrain.clouds {
            assert_eq!(c.vertices.len(), 5);
            assert!(c.x_min <= c.x_max);
            for v in &c.vertices {
                assert!(v.x >= c.x_min && v.x <= c.x_max);
            }
        }
    }

    #[test]
    fn test_segment_tone_alternates() {
        assert!(Terrain::segment_is_light(0));
        assert!(!Terrain::segment_is_light(1));
        assert!(Terrain::segment_is_light(2));
    }
}

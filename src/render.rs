//! Read-only render data
//!
//! The core never draws; an external renderer consumes a [`RenderSnapshot`]
//! captured after any step. The snapshot is a plain owned value, so it can
//! be handed to an out-of-band renderer without touching simulation state.
//! Colors (including the two-tone grass alternation) are carried over from
//! the reference environment so visuals can be reproduced faithfully.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::terrain::{CloudPoly, ObstaclePoly};

/// RGB color, components in `[0, 1]`.
pub type Color = [f32; 3];

/// Light grass tone for even-indexed ground segments.
pub const GRASS_LIGHT: Color = [0.3, 1.0, 0.3];
/// Dark grass tone for odd-indexed ground segments.
pub const GRASS_DARK: Color = [0.3, 0.8, 0.3];
/// Fill color of the ground polygons below the polyline.
pub const GROUND_FILL: Color = [0.4, 0.6, 0.3];
/// Obstacle fill and outline colors.
pub const OBSTACLE_FILL: Color = [1.0, 1.0, 1.0];
pub const OBSTACLE_OUTLINE: Color = [0.6, 0.6, 0.6];
/// Hull fill and outline colors.
pub const HULL_FILL: Color = [0.5, 0.4, 0.9];
pub const HULL_OUTLINE: Color = [0.3, 0.3, 0.5];

/// Per-side leg colors, shaded by the spawn side so the two legs are
/// distinguishable.
pub fn leg_colors(side: f32) -> (Color, Color) {
    let fill = [0.6 - side / 10.0, 0.3 - side / 10.0, 0.5 - side / 10.0];
    let outline = [0.4 - side / 10.0, 0.2 - side / 10.0, 0.3 - side / 10.0];
    (fill, outline)
}

/// Which part of the walker a drawable body is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Hull,
    Thigh,
    Shin,
}

/// One dynamic body: local-space polygon plus its current world pose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawableBody {
    pub kind: BodyKind,
    pub position: Vec2,
    pub angle: f32,
    pub vertices: Vec<Vec2>,
    pub fill: Color,
    pub outline: Color,
}

/// One ground polyline segment with its grass tone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundSegment {
    pub a: Vec2,
    pub b: Vec2,
    pub color: Color,
}

/// One filled ground polygon (segment extended down to y = 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundPoly {
    pub vertices: [Vec2; 4],
    pub color: Color,
}

/// One lidar ray from the hull to its hit point (or max-range endpoint).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LidarLine {
    pub from: Vec2,
    pub to: Vec2,
}

/// Everything an external renderer needs for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    /// Viewport scroll offset in world units.
    pub scroll: f32,
    /// Steps taken since the last reset.
    pub step_count: usize,
    pub ground_segments: Vec<GroundSegment>,
    pub ground_polys: Vec<GroundPoly>,
    pub obstacles: Vec<ObstaclePoly>,
    pub clouds: Vec<CloudPoly>,
    pub bodies: Vec<DrawableBody>,
    pub lidar: Vec<LidarLine>,
}

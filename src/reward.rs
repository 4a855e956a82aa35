//! Reward shaping
//!
//! Potential-based progress reward minus a per-joint torque-usage cost. The
//! terminal overrides (fall / out of bounds / traversal) are applied by the
//! environment, not here.

use crate::consts::{ACTION_DIM, MOTORS_TORQUE, SCALE};

/// Per-component torque cost factor; tuned so a heuristic walker spends
/// about 50 points of torque over a full traversal.
const TORQUE_COST: f32 = 0.00035;

/// Potential-based reward shaper.
///
/// `prev_shaping` is `None` exactly until the first caller-visible step of
/// an episode, so that step contributes no progress delta.
#[derive(Debug, Clone, Default)]
pub struct RewardShaper {
    prev_shaping: Option<f32>,
}

impl RewardShaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shaping potential: forward progress rewarded (normalized to ~300 over
    /// a full traversal), head tilt penalized.
    fn shaping(hull_x: f32, hull_angle: f32) -> f32 {
        130.0 * hull_x / SCALE - 5.0 * hull_angle.abs()
    }

    /// Compute the step reward and advance the stored potential.
    pub fn step(&mut self, hull_x: f32, hull_angle: f32, action: &[f32; ACTION_DIM]) -> f32 {
        let shaping = Self::shaping(hull_x, hull_angle);
        let mut reward = match self.prev_shaping {
            Some(prev) => shaping - prev,
            None => 0.0,
        };
        self.prev_shaping = Some(shaping);

        for a in action {
            reward -= TORQUE_COST * MOTORS_TORQUE * a.abs().clamp(0.0, 1.0);
        }
        reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_step_has_no_progress_delta() {
        let mut shaper = RewardShaper::new();
        let reward = shaper.step(3.0, 0.2, &[0.0; ACTION_DIM]);
        assert_eq!(reward, 0.0);
    }

    #[test]
    fn test_progress_delta_matches_potential_difference() {
        let mut shaper = RewardShaper::new();
        shaper.step(1.0, 0.0, &[0.0; ACTION_DIM]);
        let reward = shaper.step(2.0, 0.0, &[0.0; ACTION_DIM]);
        assert!((reward - 130.0 / SCALE).abs() < 1e-5);
    }

    #[test]
    fn test_head_tilt_is_penalized() {
        let mut shaper = RewardShaper::new();
        shaper.step(1.0, 0.0, &[0.0; ACTION_DIM]);
        let reward = shaper.step(1.0, 0.5, &[0.0; ACTION_DIM]);
        assert!((reward + 5.0 * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_torque_cost_is_clamped_per_component() {
        let mut shaper = RewardShaper::new();
        // First step: progress delta is zero, only torque cost remains.
        let reward = shaper.step(0.0, 0.0, &[1.0, -1.0, 0.5, 3.0]);
        let expected = -TORQUE_COST * MOTORS_TORQUE * (1.0 + 1.0 + 0.5 + 1.0);
        assert!((reward - expected).abs() < 1e-6);
    }
}

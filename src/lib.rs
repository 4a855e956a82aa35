//! # Stride - deterministic 2D bipedal locomotion environment
//!
//! An articulated four-joint walker crosses procedurally generated terrain
//! under externally supplied torque commands, producing an observation /
//! reward / termination stream for any external control-learning algorithm.
//!
//! The rigid-body engine (rapier2d), the renderer and the learning algorithm
//! are external collaborators: this crate covers terrain generation, robot
//! construction, contact tracking, lidar sensing, observation normalization,
//! reward shaping and episode orchestration.
//!
//! ```no_run
//! use stride::{EnvConfig, WalkerEnv};
//!
//! let mut env = WalkerEnv::new(EnvConfig {
//!     hardcore: false,
//!     seed: Some(12345),
//! });
//! let mut obs = env.reset()?;
//! loop {
//!     let action = [0.0, 0.0, 0.0, 0.0]; // policy goes here
//!     let outcome = env.step(&action)?;
//!     obs = outcome.observation;
//!     if outcome.done {
//!         break;
//!     }
//! }
//! # Ok::<(), stride::EnvError>(())
//! ```

pub mod consts;
pub mod env;
pub mod error;
pub mod observation;
pub mod physics;
pub mod render;
pub mod reward;
pub mod rng;
pub mod robot;
pub mod sensors;
pub mod terrain;

pub use env::{BoxSpace, EnvConfig, StepInfo, StepOutcome, TerminationCause, WalkerEnv};
pub use error::EnvError;
pub use observation::Observation;
pub use render::RenderSnapshot;

/// Sign with `sign(0) == 0`.
///
/// `f32::signum` returns 1 for +0.0, which would drive the joint motors at a
/// zero action and add drift to the grass random walk.
pub(crate) fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::sign;

    #[test]
    fn test_sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(2.5), 1.0);
        assert_eq!(sign(-0.1), -1.0);
    }
}

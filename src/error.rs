//! Environment error type

use crate::consts::ACTION_DIM;

/// Errors surfaced by [`crate::WalkerEnv`].
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// The action slice did not have exactly [`ACTION_DIM`] components.
    /// Out-of-range component *values* are not an error; they are clamped.
    #[error("action must have exactly {ACTION_DIM} components, got {got}")]
    InvalidAction { got: usize },

    /// `step()` was called before the first `reset()`.
    #[error("step() called before reset()")]
    NotInitialized,

    /// `step()` was called after the episode terminated.
    #[error("episode already terminated, call reset() to start a new one")]
    EpisodeTerminated,

    /// The physics state went non-finite (degenerate geometry or an unstable
    /// contact configuration). Surfaced instead of propagating NaNs into the
    /// observation.
    #[error("simulation diverged: non-finite {what}")]
    SimulationDiverged { what: &'static str },

    /// An obstacle polygon could not be turned into a convex collider.
    #[error("degenerate obstacle geometry: {what}")]
    DegenerateGeometry { what: &'static str },
}

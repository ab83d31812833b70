//! Error types for rejected simulation input.
//!
//! The command channel is one-way, so none of these ever reach the sender.
//! The worker logs them and carries on; they exist so the rejection reason
//! is visible in the log and testable.

use thiserror::Error;

/// Reasons an instruction or parameter is rejected.
#[derive(Debug, Error)]
pub enum SimError {
    /// Lattice side length outside the fixed size set.
    #[error("invalid lattice size {0} (expected one of 32, 64, 128, 256, 512)")]
    InvalidSize(i64),

    /// Handoff dimensions that do not describe a square lattice.
    #[error("lattice must be square, got {width}x{height}")]
    NonSquare { width: usize, height: usize },

    /// Inverse temperature that is NaN or below the accepted range.
    #[error("invalid beta {0} (expected >= 0.5 or +inf)")]
    InvalidBeta(f64),

    /// Method name not in the closed method set.
    #[error("unknown method `{0}`")]
    UnknownMethod(String),

    /// Property name not in the closed property set.
    #[error("unknown property `{0}`")]
    UnknownProperty(String),

    /// Wrong number or type of parameters for a method.
    #[error("method `{method}` expects {expected}, got {got}")]
    BadParameters {
        method: &'static str,
        expected: &'static str,
        got: String,
    },

    /// JSON object matching neither the invoke nor the set-property shape.
    #[error("unrecognized instruction shape: {0}")]
    UnrecognizedShape(String),

    /// Batch text that is not JSON, or not a JSON array.
    #[error("failed to decode instruction batch: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

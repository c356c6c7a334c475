//! errors reported by engines and the controller

use thiserror::Error;

/// Errors returned by this crate.
///
/// Calling `step` on a finished engine or `step_back` without history is not an error,
/// it is reported through [crate::engine::StepOutcome].
#[derive(Debug, Error)]
pub enum VizError {
    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is unusable.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Algorithm name not recognized.
    #[error("unknown algorithm {0}")]
    UnknownAlgorithm(String),

    /// Option value not recognized.
    #[error("unknown value {value} for option {option}")]
    UnknownOption {
        /// option name
        option: &'static str,
        /// offending value
        value: String,
    },

    /// step requested while no engine was started.
    #[error("no active engine, start one first")]
    NoActiveEngine,
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, VizError>;

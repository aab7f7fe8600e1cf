//! Error types for trajectory analysis.
//!
//! Failures fall into configuration problems, interface detection that
//! found no acceptable height, and passes that saw no usable frames.
//! Reader failures are carried through unchanged.

use thiserror::Error;

/// Errors that can occur while analysing a trajectory.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to parse an analysis configuration TOML document.
    #[error("failed to parse analysis configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configuration value is outside its valid range.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the problem.
        detail: String,
    },

    /// No bin past the start index dropped below the threshold density.
    #[error(
        "interface not found: no bin after index {start_index} falls below density {top_density}"
    )]
    ThresholdNotFound {
        /// Threshold the profile was compared against.
        top_density: f64,
        /// Bins at or before this index were not considered.
        start_index: usize,
    },

    /// The steepest descent of the profile is not an inflection point.
    #[error("interface not found: candidate bin {index} is not an inflection point")]
    InflectionRejected {
        /// Bin of the steepest descent.
        index: usize,
    },

    /// A pass finished without a single usable frame.
    #[error("no frames available for {stage}")]
    NoFrames {
        /// The pass that came up empty.
        stage: &'static str,
    },

    /// The profile has no bins.
    #[error("density profile is empty")]
    EmptyProfile,

    /// The trajectory or descriptor could not be read.
    #[error(transparent)]
    Io(#[from] crate::io::error::Error),
}

impl Error {
    /// Creates an [`InvalidConfig`](Error::InvalidConfig) error.
    pub fn invalid_config(field: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            detail: details.into(),
        }
    }
}

//! Errors surfaced by configuration loading and the runner.

use droplet_kernel::ConfigError;
use thiserror::Error;

/// Anything that can stop a simulation from being built or driven.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file was not valid JSON for [`crate::SimulationConfig`].
    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value was rejected by validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A runner-level setting was rejected.
    #[error("invalid runner setting: {0}")]
    Runner(String),

    /// The background simulation thread panicked.
    #[error("simulation thread panicked")]
    ThreadPanicked,
}

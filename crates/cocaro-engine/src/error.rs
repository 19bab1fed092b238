//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and simulation execution.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: cocaro_core::ConfigError,
    },

    /// The initial world could not be built.
    #[error("setup error: {source}")]
    Setup {
        /// The underlying setup error.
        #[from]
        source: cocaro_core::SetupError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: cocaro_core::RunnerError,
    },

    /// The blocking simulation task panicked or was cancelled.
    #[error("simulation task failed: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}

//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: demeter_core::config::ConfigError,
    },

    /// The session could not start or a cycle failed.
    #[error("game error: {source}")]
    Game {
        /// The underlying game error.
        #[from]
        source: demeter_core::GameError,
    },

    /// The final report could not be encoded.
    #[error("report encoding error: {source}")]
    Report {
        /// The underlying encoding error.
        #[from]
        source: serde_json::Error,
    },
}

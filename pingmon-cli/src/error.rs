//! CLI error types and exit codes.

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, or other non-probe errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Probe failure - the host did not answer the last probe
    pub const HOST_UNREACHABLE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Settings error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host failed validation
    #[error("Invalid host '{host}': {reason}")]
    InvalidHost {
        /// The rejected host
        host: String,
        /// Why it was rejected
        reason: String,
    },

    /// The engine refused to start
    #[error("Failed to start monitoring: {0}")]
    Start(String),

    /// The last probe failed
    #[error("Host {0} is unreachable")]
    HostUnreachable(String),

    /// Async runtime could not be created
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// JSON output error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<pingmon_core::SettingsError> for CliError {
    fn from(err: pingmon_core::SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, validation, runtime, IO)
    /// - 2: Host unreachable on the last probe
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::HostUnreachable(_) => exit_codes::HOST_UNREACHABLE,
            Self::Config(_)
            | Self::InvalidHost { .. }
            | Self::Start(_)
            | Self::Runtime(_)
            | Self::Serialization(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}

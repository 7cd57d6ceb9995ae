//! CLI-specific error types and exit code mapping

use logsift_core::error::LogsiftError;
use logsift_pipeline::LogPipelineError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logsift-core.
    #[error("{0}")]
    Core(#[from] LogsiftError),

    /// Rule set loading failed.
    #[error("rule error: {0}")]
    Rule(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                  |
    /// |------|--------------------------|
    /// | 0    | Success                  |
    /// | 1    | General / command error  |
    /// | 2    | Configuration error      |
    /// | 3    | Rule set error           |
    /// | 10   | IO error                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(LogsiftError::Config(_)) => 2,
            Self::Rule(_) => 3,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<LogPipelineError> for CliError {
    fn from(e: LogPipelineError) -> Self {
        Self::Rule(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logsift_core::error::ConfigError;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err: CliError = LogsiftError::Config(ConfigError::FileNotFound {
            path: "logsift.toml".to_owned(),
        })
        .into();
        assert_eq!(err.exit_code(), 2, "core config errors map to exit code 2");
    }

    #[test]
    fn test_exit_code_rule_error() {
        let err: CliError = LogPipelineError::RuleLoad {
            path: "syslog.rules".to_owned(),
            reason: "include cycle".to_owned(),
        }
        .into();
        assert!(matches!(err, CliError::Rule(_)));
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("include cycle"));
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        assert_eq!(CliError::Io(io_err).exit_code(), 10);
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("unknown section".to_owned());
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "unknown section");
    }

    #[test]
    fn test_exit_code_json_serialize_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json")
            .expect_err("should fail parsing");
        assert_eq!(CliError::JsonSerialize(json_err).exit_code(), 1);
    }
}

//! Error types for the CLI

use std::process::ExitCode;

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// The run finished with failing scenarios
    #[error("{failed} of {total} scenarios failed")]
    TestsFailed {
        /// Failed scenarios
        failed: usize,
        /// Scenarios in the run
        total: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Library error
    #[error("{0}")]
    Shop(#[from] shopcheck::ShopError),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Report generation error
    #[error("Report generation failed: {message}")]
    ReportGeneration {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a report generation error
    #[must_use]
    pub fn report_generation(message: impl Into<String>) -> Self {
        Self::ReportGeneration {
            message: message.into(),
        }
    }

    /// 1 when scenarios failed, 2 when the run itself could not happen
    #[must_use]
    pub const fn exit_code_value(&self) -> u8 {
        match self {
            Self::TestsFailed { .. } => 1,
            _ => 2,
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_code_value())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = CliError::invalid_argument("bad arg");
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[test]
    fn test_report_generation_error() {
        let err = CliError::report_generation("no results");
        assert!(err.to_string().contains("Report generation"));
    }

    #[test]
    fn test_tests_failed_message() {
        let err = CliError::TestsFailed {
            failed: 2,
            total: 7,
        };
        assert_eq!(err.to_string(), "2 of 7 scenarios failed");
        assert_eq!(err.exit_code_value(), 1);
    }

    #[test]
    fn test_shop_error_passes_through() {
        let err: CliError = shopcheck::ShopError::config("workers must be 1").into();
        assert_eq!(
            err.to_string(),
            "Configuration error: workers must be 1"
        );
        assert_eq!(err.exit_code_value(), 2);
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CliError = io.into();
        assert!(matches!(err, CliError::Io(_)));
        assert_eq!(err.exit_code_value(), 2);
    }
}

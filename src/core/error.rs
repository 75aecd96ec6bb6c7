//! Dump failure kinds.

use std::time::Duration;

use thiserror::Error;

use super::redact::redact;

/// Why a dump did not produce an artifact.
///
/// No variant is retried automatically; the temp file has been removed by
/// the time the caller sees any of these.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("I/O error while preparing dump: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to start '{program}': {message}")]
    ProcessStart { program: String, message: String },

    #[error("Dump tool failed ({}): {diagnostic}", exit_label(.exit_code))]
    ProcessFailure {
        /// None when the process was killed by a signal
        exit_code: Option<i32>,
        diagnostic: String,
    },

    #[error("Dump timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Dump tool exited successfully but produced no output")]
    EmptyOutput,
}

impl DumpError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DumpError::Timeout { .. })
    }

    /// Strip `secret` from any tool-provided text
    pub fn redacted(self, secret: &str) -> Self {
        match self {
            DumpError::ProcessStart { program, message } => DumpError::ProcessStart {
                program,
                message: redact(&message, secret),
            },
            DumpError::ProcessFailure {
                exit_code,
                diagnostic,
            } => DumpError::ProcessFailure {
                exit_code,
                diagnostic: redact(&diagnostic, secret),
            },
            other => other,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_failure_display() {
        let err = DumpError::ProcessFailure {
            exit_code: Some(2),
            diagnostic: "Access denied".to_string(),
        };
        assert_eq!(err.to_string(), "Dump tool failed (exit code 2): Access denied");

        let err = DumpError::ProcessFailure {
            exit_code: None,
            diagnostic: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_redacted_strips_secret() {
        let err = DumpError::ProcessFailure {
            exit_code: Some(1),
            diagnostic: "using password s3cr3t: Access denied".to_string(),
        }
        .redacted("s3cr3t");

        let message = err.to_string();
        assert!(message.contains("Access denied"));
        assert!(!message.contains("s3cr3t"));
    }

    #[test]
    fn test_is_timeout() {
        assert!(DumpError::Timeout {
            timeout: Duration::from_secs(300)
        }
        .is_timeout());
        assert!(!DumpError::EmptyOutput.is_timeout());
    }
}

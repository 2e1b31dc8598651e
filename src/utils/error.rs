use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Invalid part code '{raw}': {reason}")]
    InvalidInput { raw: String, reason: String },

    #[error("Invalid quantity {quantity} for {code}: quantity must be at least 1")]
    InvalidQuantity { code: String, quantity: i64 },

    #[error("Part not found: {code}")]
    NotFound { code: String },

    #[error("Cannot {action} while {state}")]
    InvalidTransition { state: String, action: String },

    #[error("Transfer not ready for review, required: {}", .missing.join(", "))]
    NotReady { missing: Vec<String> },

    #[error("Submission failed: {message}")]
    SubmissionFailed { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Workflow,
    Submission,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TransferError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TransferError::InvalidInput { .. }
            | TransferError::InvalidQuantity { .. }
            | TransferError::NotFound { .. } => ErrorCategory::Input,
            TransferError::InvalidTransition { .. } | TransferError::NotReady { .. } => {
                ErrorCategory::Workflow
            }
            TransferError::SubmissionFailed { .. } | TransferError::SerializationError(_) => {
                ErrorCategory::Submission
            }
            TransferError::IoError(_) => ErrorCategory::Storage,
            TransferError::ConfigValidationError { .. }
            | TransferError::InvalidConfigValueError { .. }
            | TransferError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 輸入錯誤只影響單一操作
            ErrorCategory::Input | ErrorCategory::Workflow => ErrorSeverity::Low,
            ErrorCategory::Submission => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 是否可在同一個 session 中繼續操作
    pub fn is_recoverable(&self) -> bool {
        self.category() != ErrorCategory::Configuration
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TransferError::InvalidInput { .. } => "Invalid part number".to_string(),
            TransferError::InvalidQuantity { code, .. } => {
                format!("Quantity for {} must be at least 1", code)
            }
            TransferError::NotFound { code } => format!("{} is no longer in the parts list", code),
            TransferError::InvalidTransition { state, action } => {
                format!("Cannot {} while the transfer is {}", action, state)
            }
            TransferError::NotReady { missing } => format!("Required: {}", missing.join(", ")),
            TransferError::SubmissionFailed { .. } => "Transfer failed - please try again".to_string(),
            TransferError::IoError(e) => format!("Could not write file: {}", e),
            TransferError::SerializationError(_) => {
                "Could not encode the transfer payload".to_string()
            }
            TransferError::ConfigValidationError { field, .. }
            | TransferError::InvalidConfigValueError { field, .. }
            | TransferError::MissingConfigError { field } => {
                format!("Configuration problem with '{}'", field)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Input => {
                "Re-enter the part code (at least 2 characters) or pick an existing line".to_string()
            }
            ErrorCategory::Workflow => "Run 'help' to see which actions are available now".to_string(),
            ErrorCategory::Submission => {
                "Check the network connection, then 'confirm' again or 'cancel' to keep editing"
                    .to_string()
            }
            ErrorCategory::Storage => "Check that the output directory is writable".to_string(),
            ErrorCategory::Configuration => {
                "Fix the configuration file or command-line flags and restart".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for TransferError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("request timed out: {}", e)
        } else {
            e.to_string()
        };
        TransferError::SubmissionFailed { message }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_failure_is_recoverable() {
        let err = TransferError::SubmissionFailed {
            message: "timeout".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Submission);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = TransferError::MissingConfigError {
            field: "sink.endpoint".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_not_ready_lists_missing_fields() {
        let err = TransferError::NotReady {
            missing: vec!["From Location".to_string(), "To Location".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Transfer not ready for review, required: From Location, To Location"
        );
    }
}

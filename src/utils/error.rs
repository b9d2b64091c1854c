use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Base64 decoding error: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Generation error: {message}")]
    GenerationError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SiteError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationError {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) | Self::NetworkError { .. } | Self::ApiError { .. } => {
                ErrorCategory::Network
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::SerializationError(_) | Self::DecodeError(_) | Self::GenerationError { .. } => {
                ErrorCategory::Data
            }
            Self::ValidationError { .. } => ErrorCategory::Input,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 全部都是 best-effort 呼叫，使用者可手動重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::HttpError(_) | Self::NetworkError { .. } => {
                "Check the network connection and run the command again"
            }
            Self::ApiError { status, .. } if *status == 401 || *status == 403 => {
                "Check that the generator API key is valid (GEMINI_API_KEY)"
            }
            Self::ApiError { .. } => "The remote service rejected the request, try again later",
            Self::GenerationError { .. } => {
                "Regenerate; the model sometimes answers without content"
            }
            Self::SerializationError(_) | Self::DecodeError(_) => {
                "The remote payload could not be decoded, try regenerating"
            }
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run the command again"
            }
            Self::MissingConfigError { .. } => {
                "Set the missing value in the configuration file or the environment"
            }
            Self::ValidationError { .. } => "Check the command arguments",
            Self::IoError(_) => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the remote service: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Unexpected response content: {}", self),
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        assert_eq!(SiteError::network("down").severity(), ErrorSeverity::Medium);
        assert_eq!(
            SiteError::validation("bad rating").category(),
            ErrorCategory::Input
        );
        let missing = SiteError::MissingConfigError {
            field: "generator.api_key".to_string(),
        };
        assert_eq!(missing.category(), ErrorCategory::Configuration);
        assert!(missing.user_friendly_message().contains("generator.api_key"));
    }

    #[test]
    fn test_api_key_suggestion_for_auth_failures() {
        let err = SiteError::ApiError {
            status: 403,
            message: "forbidden".to_string(),
        };
        assert!(err.recovery_suggestion().contains("API key"));
    }
}

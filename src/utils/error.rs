use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Request failed: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("Malformed linked-data block at {url}: {source}")]
    MalformedDataError {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Task cancelled before fetching {url}")]
    CancelledError { url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

impl ScrapeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScrapeError::FetchError(_)
            | ScrapeError::HttpStatusError { .. }
            | ScrapeError::CancelledError { .. } => ErrorCategory::Network,
            ScrapeError::MalformedDataError { .. }
            | ScrapeError::CsvError(_)
            | ScrapeError::SerializationError(_)
            | ScrapeError::ProcessingError { .. } => ErrorCategory::Data,
            ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ScrapeError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ScrapeError::MalformedDataError { .. } | ScrapeError::CancelledError { .. } => {
                ErrorSeverity::Low
            }
            ScrapeError::FetchError(_) | ScrapeError::HttpStatusError { .. } => {
                ErrorSeverity::Medium
            }
            ScrapeError::CsvError(_)
            | ScrapeError::SerializationError(_)
            | ScrapeError::ProcessingError { .. }
            | ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::MissingConfigError { .. } => ErrorSeverity::High,
            ScrapeError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScrapeError::FetchError(_) => {
                "Check your network connection and re-run; failed items are listed in the log".to_string()
            }
            ScrapeError::HttpStatusError { status, .. } if *status == 429 => {
                "The site is rate limiting; increase --request-delay-ms and lower --concurrent-requests".to_string()
            }
            ScrapeError::HttpStatusError { .. } => {
                "The page may be gone or temporarily unavailable; retry the listed items later".to_string()
            }
            ScrapeError::MalformedDataError { .. } => {
                "The page markup may have changed; re-run with --verbose and inspect the reported URL".to_string()
            }
            ScrapeError::CancelledError { .. } => {
                "The run was cancelled; re-run to pick up the remaining items".to_string()
            }
            ScrapeError::CsvError(_) | ScrapeError::SerializationError(_) => {
                "Verify the input file is the unmodified JSON output of a scrape run".to_string()
            }
            ScrapeError::IoError(_) => {
                "Check the output path exists and is writable".to_string()
            }
            ScrapeError::ConfigValidationError { field, .. }
            | ScrapeError::InvalidConfigValueError { field, .. }
            | ScrapeError::MissingConfigError { field } => {
                format!("Fix the '{}' setting and try again", field)
            }
            ScrapeError::ProcessingError { .. } => {
                "Re-run with --verbose to get more context".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Data => format!("Data problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = ScrapeError::HttpStatusError {
            status: 500,
            url: "https://example.com/book/1".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = ScrapeError::MissingConfigError {
            field: "username".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_rate_limit_suggestion_mentions_delay() {
        let err = ScrapeError::HttpStatusError {
            status: 429,
            url: "https://example.com/book/1".to_string(),
        };
        assert!(err.recovery_suggestion().contains("request-delay-ms"));
    }
}

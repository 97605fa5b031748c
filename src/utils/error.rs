use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("Failed to parse {source_url}: {message}")]
    ParseError { source_url: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Layer '{name}' is already registered")]
    DuplicateLayerError { name: String },
}

pub type Result<T> = std::result::Result<T, MapError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit status for a run that failed at this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl MapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MapError::NetworkError(_) | MapError::HttpStatusError { .. } => ErrorCategory::Network,
            MapError::ParseError { .. }
            | MapError::SerializationError(_)
            | MapError::ProcessingError { .. }
            | MapError::DuplicateLayerError { .. } => ErrorCategory::Data,
            MapError::IoError(_) => ErrorCategory::Storage,
            MapError::ConfigError { .. }
            | MapError::ConfigValidationError { .. }
            | MapError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // an upstream outage may clear up on a later run
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MapError::NetworkError(_) => "Check the network connection and the dataset URL, then run again",
            MapError::HttpStatusError { .. } => {
                "The dataset URL may have moved; check the open data portal for the current download link"
            }
            MapError::ParseError { .. } => {
                "Check that the dataset is CSV and that its encoding matches the configured one"
            }
            MapError::IoError(_) => "Check that the output directory exists and is writable",
            MapError::SerializationError(_) => "Inspect the dataset for unusual characters in marker fields",
            MapError::ConfigError { .. }
            | MapError::ConfigValidationError { .. }
            | MapError::InvalidConfigValueError { .. } => "Fix the configuration file and run again",
            MapError::ProcessingError { .. } => {
                "The dataset columns changed; compare the CSV header with the expected column names"
            }
            MapError::DuplicateLayerError { .. } => "Give every dataset and hazard layer a distinct name",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not download a dataset: {}", self),
            ErrorCategory::Data => format!("Could not read the dataset: {}", self),
            ErrorCategory::Storage => format!("Could not write the map: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_is_a_network_error() {
        let err = MapError::HttpStatusError {
            url: "https://example.com/a.csv".to_string(),
            status: 404,
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_unwritable_output_is_critical() {
        let err = MapError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().starts_with("Could not write the map"));
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        let network = MapError::HttpStatusError {
            url: "https://example.com/a.csv".to_string(),
            status: 503,
        };
        let config = MapError::ConfigError {
            message: "bad".to_string(),
        };
        let storage = MapError::IoError(std::io::Error::other("disk full"));

        assert_eq!(network.severity().exit_code(), 2);
        assert_eq!(config.severity().exit_code(), 1);
        assert_eq!(storage.severity().exit_code(), 3);
    }

    #[test]
    fn test_duplicate_layer_message_names_the_layer() {
        let err = MapError::DuplicateLayerError {
            name: "AED".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert!(err.to_string().contains("'AED'"));
    }
}

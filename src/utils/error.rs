use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("DescribeFeatureType for layer '{layer}' failed with HTTP status {status}")]
    TransportError { layer: String, status: u16 },

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Schema document is not well-formed XML: {0}")]
    ParseError(#[from] roxmltree::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

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

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl HarvestError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::TransportError { layer, status } => {
                format!("The service rejected the request for '{}' (HTTP {})", layer, status)
            }
            Self::RequestError(_) => "Could not reach the feature service".to_string(),
            Self::ParseError(_) => "The service returned an unreadable schema document".to_string(),
            Self::InvalidUrl(e) => format!("The endpoint is not a valid URL ({})", e),
            Self::IoError(e) => format!("File operation failed: {}", e),
            Self::SerializationError(_) => "Could not write the harvest report".to_string(),
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => format!("Configuration problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::TransportError { .. } => "Check the layer name against the service's GetCapabilities",
            Self::RequestError(_) => "Check network access and the endpoint host",
            Self::ParseError(_) => "Open the DescribeFeatureType URL in a browser and inspect the response",
            Self::InvalidUrl(_) => "Use an absolute http(s) URL without DescribeFeatureType parameters",
            Self::IoError(_) => "Check that the output directory is writable",
            Self::SerializationError(_) => "Re-run with --verbose and report the failing layer",
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the configuration file or command line arguments",
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;

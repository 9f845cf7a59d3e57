use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Session config parse error: {0}")]
    SessionConfigError(#[from] toml::de::Error),

    #[error("Data contract violation: {message}")]
    DataContractError { message: String },

    #[error("No usable IPO data after fetch and filter")]
    NoData,

    #[error("Invalid config value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required config field: {field}")]
    MissingConfigError { field: String },

    #[error("Output error: {message}")]
    OutputError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Informational; the run still counts as a success.
    Low,
    /// Degraded but recoverable on re-run (transient fetch, stale session).
    Medium,
    /// Processing failed; output is incomplete or absent.
    High,
    /// Environment problem (IO, config) that needs operator action.
    Critical,
}

impl CalError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CalError::ApiError(_) | CalError::DataContractError { .. } => ErrorSeverity::Medium,
            CalError::NoData | CalError::SerializationError(_) => ErrorSeverity::High,
            CalError::IoError(_)
            | CalError::OutputError { .. }
            | CalError::SessionConfigError(_)
            | CalError::InvalidConfigValueError { .. }
            | CalError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CalError::ApiError(_) => "The IPO data provider could not be reached.".to_string(),
            CalError::DataContractError { .. } => {
                "The provider response was not in the expected format; the session may have expired."
                    .to_string()
            }
            CalError::NoData => "No upcoming IPO entries were found for the window.".to_string(),
            CalError::IoError(_) | CalError::OutputError { .. } => {
                "Writing the output files failed.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CalError::ApiError(_) => "Check network connectivity and retry later.".to_string(),
            CalError::DataContractError { .. } => {
                "Refresh the session cookies in the session config file.".to_string()
            }
            CalError::NoData => "Nothing to do; re-run closer to the next listing window.".to_string(),
            CalError::IoError(_) | CalError::OutputError { .. } => {
                "Verify the output directory exists and is writable.".to_string()
            }
            CalError::SessionConfigError(_)
            | CalError::InvalidConfigValueError { .. }
            | CalError::MissingConfigError { .. } => {
                "Fix the flagged configuration value and re-run.".to_string()
            }
            CalError::SerializationError(_) => {
                "Inspect the raw response snapshot for unexpected fields.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CalError>;

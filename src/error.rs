//! Custom error types for rcgate.

use thiserror::Error;

/// Main error type for rcgate operations.
#[derive(Error, Debug)]
pub enum GateError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Tag not found: {0}")]
    TagNotFound(String),

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    // Forge/Git errors
    #[error("Forge operation failed: {0}")]
    ForgeError(String),

    #[error("Operation not supported by {forge} forge: {operation}")]
    Unsupported {
        forge: String,
        operation: String,
    },

    #[error("Invalid git remote URL: {0}")]
    InvalidRemoteUrl(String),

    #[error("Git URL parse error: {0}")]
    GitUrlError(#[from] git_url_parse::GitUrlParseError),

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    // Network/API errors
    #[error("API authentication failed: {0}")]
    AuthenticationError(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    // Parsing errors - automatic conversions via #[from]
    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using GateError
pub type Result<T> = std::result::Result<T, GateError>;

impl GateError {
    /// Create a forge error with context
    pub fn forge(msg: impl Into<String>) -> Self {
        Self::ForgeError(msg.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }

    /// Create an unsupported operation error
    pub fn unsupported(
        forge: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Unsupported {
            forge: forge.into(),
            operation: operation.into(),
        }
    }

    /// Whether this error was caused by the caller's input rather than by
    /// the forge or the local environment.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgs(_)
                | Self::TagNotFound(_)
                | Self::WorkflowNotFound(_)
                | Self::Unsupported { .. }
                | Self::InvalidRemoteUrl(_)
                | Self::GitUrlError(_)
        )
    }

    /// Whether retrying the same request cannot succeed: caller-input
    /// errors, rejected credentials and an exhausted rate limit.
    pub fn is_fatal(&self) -> bool {
        self.is_invalid_input()
            || matches!(
                self,
                Self::AuthenticationError(_) | Self::RateLimitExceeded
            )
    }
}

// Generic I/O errors are wrapped in the Other variant
impl From<std::io::Error> for GateError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

// Implement From for octocrab errors (GitHub API)
impl From<octocrab::Error> for GateError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            octocrab::Error::GitHub { source, .. }
                if source.status_code.as_u16() == 401
                    || source.status_code.as_u16() == 403 =>
            {
                Self::AuthenticationError(source.message.clone())
            }
            _ => Self::ForgeError(format!("GitHub API error: {}", err)),
        }
    }
}

//! Error taxonomy for the license subsystem

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LicenseError {
    /// A required configuration field is missing. Fatal at construction.
    #[error("License: missing required configuration: {field}")]
    Configuration { field: &'static str },

    /// Caller input was missing or invalid.
    #[error("{0}")]
    Validation(String),

    /// The remote API could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote API answered, but with a failure status or an unusable body.
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("Sorry! You do not have permission to perform this action.")]
    Permission,

    #[error("Invalid nonce. Please try again.")]
    SecurityToken,

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("License for slug '{0}' is not registered")]
    NotRegistered(String),
}

impl LicenseError {
    pub fn api(message: impl Into<String>, status: Option<u16>) -> Self {
        LicenseError::Api {
            message: message.into(),
            status,
        }
    }

    /// True for failures that happened on the way to or from the remote API.
    pub fn is_remote(&self) -> bool {
        matches!(self, LicenseError::Network(_) | LicenseError::Api { .. })
    }
}

pub type Result<T> = std::result::Result<T, LicenseError>;

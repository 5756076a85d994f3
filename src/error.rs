//! Library error types

use ambit_transport::TransportError;
use thiserror::Error;

/// Errors from identification, session and driver operations
#[derive(Error, Debug)]
pub enum AmbitError {
    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Caller passed an unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Record was not probed successfully or is not supported
    #[error("Device unavailable: {path} ({reason})")]
    DeviceUnavailable { path: String, reason: String },

    /// Registry has no entry for the identity
    #[error("Unknown device: VID/PID {vendor_id:04x}/{product_id:04x} model '{model}'")]
    UnknownDevice {
        vendor_id: u16,
        product_id: u16,
        model: String,
    },

    /// No enumerated device matches
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Driver does not implement the capability
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    /// Device returned unexpected response
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AmbitError {
    /// True for the "capability missing" class of errors
    pub fn is_unsupported(&self) -> bool {
        matches!(self, AmbitError::Unsupported(_))
    }
}

/// Result alias for library operations
pub type Result<T> = std::result::Result<T, AmbitError>;

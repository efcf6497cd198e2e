//! Error types shared by the provider client, the payload pipeline and the
//! coordinator.

use thiserror::Error;

use crate::model::WeatherProductType;

/// Failure talking to HERE or making sense of its answer.
#[derive(Error, Debug)]
pub enum HereError {
    /// Rejected credentials (HTTP 401/403).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rejected parameters, e.g. coordinates out of range (HTTP 400).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network failure or an unexpected HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The payload does not have the layout expected for the product.
    #[error("Payload malformed: {0}")]
    MalformedPayload(String),
}

impl From<reqwest::Error> for HereError {
    fn from(err: reqwest::Error) -> Self {
        HereError::Transport(err.to_string())
    }
}

/// A refresh cycle failed; the previously cached records stay in place.
#[derive(Error, Debug)]
#[error("Unable to fetch data from HERE: {reason}")]
pub struct UpdateFailed {
    pub product: WeatherProductType,
    pub reason: String,
}

/// A configured location could not be brought up.
#[derive(Error, Debug)]
pub enum SetupError {
    /// First refresh of one of the coordinators failed; retry later.
    #[error("Entry not ready: {0}")]
    NotReady(#[from] UpdateFailed),
}

/// Error shown next to the configuration form.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    #[error("The API key was rejected by HERE")]
    Unauthorized,

    #[error("HERE rejected the request; check the coordinates")]
    InvalidRequest,

    #[error("This location is already configured")]
    AlreadyConfigured,

    #[error("Could not reach HERE")]
    CannotConnect,
}

impl FormError {
    /// Stable key identifying the error in stored form state.
    pub fn key(&self) -> &'static str {
        match self {
            FormError::Unauthorized => "unauthorized",
            FormError::InvalidRequest => "invalid_request",
            FormError::AlreadyConfigured => "already_configured",
            FormError::CannotConnect => "cannot_connect",
        }
    }
}

//! Error types for the todo API client and store configuration.
//!
//! # Design
//! `NotFound` gets a dedicated variant because a delete of an unknown id is
//! the common failure. All other non-2xx responses land in `HttpError`
//! with the raw status code and body for debugging.

use thiserror::Error;

/// Errors returned by `TodoClient` parse methods and transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Errors from reading [`StoreConfig`](crate::StoreConfig) out of the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{var}`: {value:?}")]
    Invalid { var: &'static str, value: String },
}

//! Error types for the change request client.
//!
//! # Design
//! Failures are classified once, in a fixed order: a transport failure wins
//! over a bad status, which wins over a logical error reported inside a 2xx
//! body. The `Display` text of `Status` and `Logical` is the message shown to
//! users, so its exact shape matters.

use thiserror::Error;

/// The network exchange could not be completed, or its body was not JSON.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Failure reported by a non-reqwest transport.
    #[error("{0}")]
    Other(String),
}

/// Errors returned by `ChangeRequestClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status outside 2xx.
    #[error("{endpoint} responded with a {status} status{}", detail_suffix(.detail))]
    Status {
        endpoint: String,
        status: u16,
        detail: Option<String>,
    },

    /// A 2xx response whose body carries `cause.errorMessage`.
    #[error("{endpoint} returned an error\n{message}")]
    Logical { endpoint: String, message: String },

    #[error("request payload could not be serialized: {0}")]
    Serialization(#[source] serde_json::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_ref().map(|d| format!("\n{d}")).unwrap_or_default()
}

//! Error types and user-facing error messages

use alloy::transports::TransportError;
use thiserror::Error;

/// Fallback shown when an error carries no usable text
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("rpc error: {0}")]
    Transport(String),

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("cannot decode {field}: {reason}")]
    Decode { field: String, reason: String },

    #[error("no network connection")]
    NetworkUnavailable,

    #[error("config error: {0}")]
    Config(String),
}

/// An error broken into the pieces a user might want to see.
///
/// The display message prefers `details`, then `short_message`, then
/// `message`, then `name`; the first non-empty one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedError {
    pub details: Option<String>,
    pub short_message: Option<String>,
    pub message: Option<String>,
    pub name: Option<String>,
}

impl ParsedError {
    pub fn message(&self) -> String {
        [
            &self.details,
            &self.short_message,
            &self.message,
            &self.name,
        ]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
    }
}

/// Pull the most specific description out of an error chain.
///
/// JSON-RPC error responses give the node's message as `details` and its
/// revert data, if any, as `short_message`. Anything else falls back to the
/// error's own text.
pub fn parse_error(err: &anyhow::Error) -> ParsedError {
    for cause in err.chain() {
        if let Some(rpc) = cause.downcast_ref::<TransportError>() {
            return from_rpc_error(rpc);
        }
        if let Some(scaffold) = cause.downcast_ref::<ScaffoldError>() {
            return ParsedError {
                message: Some(scaffold.to_string()),
                name: Some(variant_name(scaffold).to_string()),
                ..Default::default()
            };
        }
    }

    let root = err.root_cause().to_string();
    ParsedError {
        short_message: Some(err.to_string()).filter(|s| *s != root),
        message: Some(root),
        ..Default::default()
    }
}

/// Shorthand for `parse_error(err).message()`
pub fn error_message(err: &anyhow::Error) -> String {
    parse_error(err).message()
}

fn from_rpc_error(err: &TransportError) -> ParsedError {
    match err.as_error_resp() {
        Some(payload) => ParsedError {
            details: Some(payload.message.to_string()),
            short_message: payload.data.as_ref().map(|data| data.get().to_string()),
            message: Some(err.to_string()),
            name: Some(format!("rpc error {}", payload.code)),
        },
        None => ParsedError {
            message: Some(err.to_string()),
            name: Some("transport error".to_string()),
            ..Default::default()
        },
    }
}

fn variant_name(err: &ScaffoldError) -> &'static str {
    match err {
        ScaffoldError::Transport(_) => "Transport",
        ScaffoldError::Validation { .. } => "Validation",
        ScaffoldError::Decode { .. } => "Decode",
        ScaffoldError::NetworkUnavailable => "NetworkUnavailable",
        ScaffoldError::Config(_) => "Config",
    }
}

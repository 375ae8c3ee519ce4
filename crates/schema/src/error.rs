//! Validation error type.

use thiserror::Error;

/// A validation failure with a path-qualified, human-readable message.
///
/// The message is the error surface: callers of the RPC layer pattern-match
/// on message text, so the formats produced here are part of the wire
/// contract and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Full message, e.g. `[ids.0]: value has length [0] but it must have a
    /// minimum length of [1].`
    pub message: String,
}

impl ValidationError {
    /// Create an error from a pre-formatted message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Create an error at `path`, prefixing the message with `[<path>]: `
    /// unless the path is empty (root-level values carry no prefix).
    pub(crate) fn at(path: &[String], body: impl AsRef<str>) -> Self {
        let body = body.as_ref();
        if path.is_empty() {
            Self::new(body)
        } else {
            Self::new(format!("[{}]: {body}", path.join(".")))
        }
    }
}

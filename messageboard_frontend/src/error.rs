use thiserror::Error;

use crate::transport::TransportError;

/// Coarse category of a failed board operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The exchange failed or its body could not be understood.
    Network,
    /// The server answered with an `error` message.
    Server,
    /// The request was rejected before anything was sent.
    Validation,
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("network error: {0}")]
    Network(#[from] TransportError),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("invalid post: {0}")]
    Validation(String),
}

impl BoardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BoardError::Network(_) | BoardError::Malformed(_) => ErrorKind::Network,
            BoardError::Server(_) => ErrorKind::Server,
            BoardError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Short text for a notice shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            BoardError::Network(_) | BoardError::Malformed(_) => {
                "Error: Something is wrong with the server/network".to_string()
            }
            BoardError::Server(message) | BoardError::Validation(message) => {
                format!("Error: {message}")
            }
        }
    }
}

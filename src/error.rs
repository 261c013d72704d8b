//! Failure taxonomy for a dispatch attempt

use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by [`crate::dispatch::DispatchTrigger::request_dispatch`]
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The credential is absent or empty, nothing was sent
    #[error("GitHub configuration missing. Please set '{name}' in the secret store.")]
    ConfigurationMissing { name: String },

    /// The HTTP exchange could not complete
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A response arrived but its status was not 204
    #[error("GitHub API returned: {status} {body}")]
    RemoteRejected { status: u16, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigurationMissing,
    TransportError,
    RemoteRejected,
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationMissing { .. } => ErrorKind::ConfigurationMissing,
            Self::Transport(_) => ErrorKind::TransportError,
            Self::RemoteRejected { .. } => ErrorKind::RemoteRejected,
        }
    }

    /// HTTP status, when a response was received at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

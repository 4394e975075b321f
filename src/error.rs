//! Error types for kind cluster lifecycle operations

use std::time::Duration;

use thiserror::Error;

/// Main error type for cluster lifecycle operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Create was asked for a cluster that the backend already reports
    #[error("kind cluster {name} already exists")]
    Conflict {
        /// Name of the existing cluster
        name: String,
    },

    /// A backend command exited non-zero or could not be started
    #[error("{command} failed\noutput: {output}")]
    BackendInvocation {
        /// The command line that was run
        command: String,
        /// Captured output (combined stdout/stderr where available)
        output: String,
    },

    /// The cluster did not become ready in time
    #[error("timed out after {waited:?} waiting for cluster {name} to be ready")]
    Timeout {
        /// Cluster that was being waited on
        name: String,
        /// How long we waited
        waited: Duration,
    },

    /// The kubeconfig returned by the backend is not a document we can read
    #[error("failed to parse kubeconfig: {0}")]
    Parse(String),

    /// The desired state is unusable
    #[error("validation error: {0}")]
    Validation(String),

    /// The cluster disappeared between creation and the follow-up read
    #[error("kind cluster {name} not found after creation")]
    NotFound {
        /// Name of the missing cluster
        name: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a conflict error for an existing cluster
    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict { name: name.into() }
    }

    /// Create a backend invocation error carrying the command's output
    pub fn backend(command: impl Into<String>, output: impl Into<String>) -> Self {
        Self::BackendInvocation {
            command: command.into(),
            output: output.into(),
        }
    }

    /// Create a timeout error for a cluster
    pub fn timeout(name: impl Into<String>, waited: Duration) -> Self {
        Self::Timeout {
            name: name.into(),
            waited,
        }
    }

    /// Create a parse error with the given message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error for a cluster
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

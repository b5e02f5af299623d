//! error types for the gateway client

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("missing an environment variable: {0}")]
    MissingEnvVar(String),

    #[error("missing environment variables: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential store {} contains no files", .0.display())]
    EmptyCredentialStore(PathBuf),

    #[error(
        "credential store {} contains more than one file: {}",
        .path.display(),
        .entries.join(", ")
    )]
    AmbiguousCredentialStore { path: PathBuf, entries: Vec<String> },

    #[error("invalid certificate: {0}")]
    Certificate(String),

    #[error("invalid private key: {0}")]
    PrivateKey(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("failed to create gRPC connection: {0}")]
    Connection(#[from] tonic::transport::Error),

    #[error("invalid action {0} (should be 'submit' or 'evaluate')")]
    InvalidAction(String),

    #[error("{operation} failed: {message}")]
    Rpc {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("transaction {tx_id} failed to commit with status code {code} ({status})")]
    Commit {
        tx_id: String,
        code: i32,
        status: String,
    },

    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GatewayError::Io {
            path: path.into(),
            source,
        }
    }
}

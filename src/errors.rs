//! Scheduler error hierarchy.
//!
//! Layered by concern: infrastructure failures (`SystemError`), configuration
//! validation (`config::ConfigError`), and execution-protocol failures
//! (`ExecutionError`). Leaf errors flatten into [`Error`] through `From`
//! impls so call sites can use `?` throughout.

use crate::proto::Digest;
use crate::proto::PreconditionFailure;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (network, serialization)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Configuration validation failures
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// Execution-protocol violations and failures
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// Request rejected before any state change (e.g. timeout out of bounds)
    #[error("Precondition failed: {0:?}")]
    FailedPrecondition(PreconditionFailure),

    /// Malformed caller input (e.g. an undecodable page token)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced blob is absent from the CAS
    #[error("Blob {}/{} not found in CAS", .0.hash, .0.size_bytes)]
    MissingBlob(Digest),

    /// Named operation is not known to this instance
    #[error("Operation {0} not found")]
    OperationNotFound(String),

    /// A long-running call (`match`, `on_match`, `put`) was interrupted
    #[error("Interrupted: {0}")]
    Interrupted(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Protocol buffer encoding/decoding errors
    #[error("Protobuf operation failed: {0}")]
    Prost(#[from] ProstError),
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Malformed remote cache target
    #[error("Invalid URI format: {0}")]
    InvalidUri(String),

    /// gRPC transport layer errors
    #[error(transparent)]
    TonicError(#[from] Box<tonic::transport::Error>),

    /// gRPC status code errors
    #[error(transparent)]
    TonicStatusError(#[from] Box<tonic::Status>),

    /// Remote endpoint never became ready
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Wrapper for prost encoding/decoding errors
#[derive(Debug, thiserror::Error)]
pub enum ProstError {
    #[error("Encoding failed: {0}")]
    Encode(#[from] prost::EncodeError),

    #[error("Decoding failed: {0}")]
    Decode(#[from] prost::DecodeError),
}

// ============== Conversion Implementations ============== //
impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Error::System(SystemError::Network(e))
    }
}

impl From<ProstError> for Error {
    fn from(e: ProstError) -> Self {
        Error::System(SystemError::Prost(e))
    }
}

impl From<prost::DecodeError> for Error {
    fn from(e: prost::DecodeError) -> Self {
        ProstError::Decode(e).into()
    }
}

impl From<prost::EncodeError> for Error {
    fn from(e: prost::EncodeError) -> Self {
        ProstError::Encode(e).into()
    }
}

impl From<tonic::transport::Error> for Error {
    fn from(err: tonic::transport::Error) -> Self {
        NetworkError::TonicError(Box::new(err)).into()
    }
}

impl From<tonic::Status> for Error {
    fn from(err: tonic::Status) -> Self {
        NetworkError::TonicStatusError(Box::new(err)).into()
    }
}

use std::error::Error;

use tonic::Code;

/// Trait to be implemented by errors returned by the different operations of services. Each
/// variant of an operation error is a caller-facing category; the transport forwards it using
/// the gRPC code returned here.
pub trait OperationError: Error {
    /// gRPC code corresponding to this error.
    fn code(&self) -> Code;
}


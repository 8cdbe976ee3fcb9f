use std::fmt::{Display, Formatter};

use service_core::operation_error::OperationError;
use thiserror::Error;

/// Field whose change requires the caller to re-prove their identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensitiveField {
    Email,
    Password,
}

impl Display for SensitiveField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SensitiveField::Email => write!(f, "email"),
            SensitiveField::Password => write!(f, "password"),
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum UpdateAccountError {
    #[error("Provide the current password to change {0}.")]
    MissingCredential(SensitiveField),

    #[error("The password doesn't match this account. Verify the password and try again.")]
    AuthenticationFailure,

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    /// The account was persisted; only the subscription side effect failed.
    #[error("The account was saved, but the newsletter subscription could not be updated.")]
    SideEffectFailure,
}

impl OperationError for UpdateAccountError {
    fn code(&self) -> tonic::Code {
        match self {
            Self::MissingCredential(_) => tonic::Code::InvalidArgument,
            Self::AuthenticationFailure => tonic::Code::Unauthenticated,
            Self::InvalidInput(_) => tonic::Code::InvalidArgument,
            Self::NotFound(_) => tonic::Code::NotFound,
            Self::AlreadyExists(_) => tonic::Code::AlreadyExists,
            Self::SideEffectFailure => tonic::Code::Internal,
        }
    }
}

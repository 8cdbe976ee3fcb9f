use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use super::credential_store::{CredentialStore, CredentialStoreError};
use super::hashing::verify_password;

#[derive(Debug, Error)]
pub enum VerifyPasswordError {
    #[error("The password doesn't match this account. Verify the password and try again.")]
    Mismatch,

    #[error("Account not found.")]
    AccountNotFound,

    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

/// Re-validates the caller's current password against the account being mutated.
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    async fn verify(&self, password: &str, account_id: &Uuid) -> Result<(), VerifyPasswordError>;
}

pub struct Argon2PasswordVerifier<C: CredentialStore> {
    credentials: Arc<C>,
}

impl<C: CredentialStore> Argon2PasswordVerifier<C> {
    pub fn new(credentials: Arc<C>) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl<C: CredentialStore> PasswordVerifier for Argon2PasswordVerifier<C> {
    async fn verify(&self, password: &str, account_id: &Uuid) -> Result<(), VerifyPasswordError> {
        let mut stored = self
            .credentials
            .password_hash(account_id)
            .await
            .map_err(|e| match e {
                CredentialStoreError::AccountNotFound => VerifyPasswordError::AccountNotFound,
                CredentialStoreError::Other(e) => VerifyPasswordError::Other(e),
            })?;

        let result = verify_password(password, &stored);
        stored.zeroize();

        result.map_err(|e| match e {
            argon2::password_hash::Error::Password => VerifyPasswordError::Mismatch,
            e => VerifyPasswordError::Other(e.to_string().into()),
        })
    }
}

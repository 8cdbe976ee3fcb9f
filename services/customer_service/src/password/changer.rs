use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use super::credential_store::{CredentialStore, CredentialStoreError};
use super::hashing::{hash_password, verify_password};
use super::policy::{PasswordPolicy, PasswordPolicyViolation};

#[derive(Debug, Error)]
pub enum ChangePasswordError {
    #[error("The password doesn't match this account. Verify the password and try again.")]
    InvalidCurrentPassword,

    #[error(transparent)]
    Policy(#[from] PasswordPolicyViolation),

    #[error("The new password must be different from the current password.")]
    Unchanged,

    #[error("No such entity with customerId = {0}")]
    AccountNotFound(Uuid),

    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl ChangePasswordError {
    /// Whether the failure is a rule the caller can fix by sending different input.
    pub fn is_business_rule(&self) -> bool {
        !matches!(self, ChangePasswordError::Other(_))
    }
}

/// Replaces the password of an account through the credential store.
#[async_trait]
pub trait PasswordChanger: Send + Sync {
    async fn change(&self, account_id: &Uuid, current_password: &str, new_password: &str)
        -> Result<(), ChangePasswordError>;
}

pub struct Argon2PasswordChanger<C: CredentialStore> {
    credentials: Arc<C>,
    policy: PasswordPolicy,
}

impl<C: CredentialStore> Argon2PasswordChanger<C> {
    pub fn new(credentials: Arc<C>, policy: PasswordPolicy) -> Self {
        Self { credentials, policy }
    }
}

#[async_trait]
impl<C: CredentialStore> PasswordChanger for Argon2PasswordChanger<C> {
    #[tracing::instrument(skip_all, fields(account_id = %account_id))]
    async fn change(
        &self,
        account_id: &Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ChangePasswordError> {
        let mut stored = self.credentials.password_hash(account_id).await.map_err(|e| match e {
            CredentialStoreError::AccountNotFound => ChangePasswordError::AccountNotFound(*account_id),
            CredentialStoreError::Other(e) => ChangePasswordError::Other(e),
        })?;

        let verified = verify_password(current_password, &stored);
        stored.zeroize();
        verified.map_err(|e| match e {
            argon2::password_hash::Error::Password => ChangePasswordError::InvalidCurrentPassword,
            e => ChangePasswordError::Other(e.to_string().into()),
        })?;

        self.policy.check(new_password)?;
        if new_password == current_password {
            return Err(ChangePasswordError::Unchanged);
        }

        let hashed = hash_password(new_password).map_err(|e| ChangePasswordError::Other(e.to_string().into()))?;
        self.credentials
            .set_password_hash(account_id, hashed)
            .await
            .map_err(|e| match e {
                CredentialStoreError::AccountNotFound => ChangePasswordError::AccountNotFound(*account_id),
                CredentialStoreError::Other(e) => ChangePasswordError::Other(e),
            })?;

        tracing::info!("Password changed.");
        Ok(())
    }
}

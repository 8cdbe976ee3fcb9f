use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("Account not found.")]
    AccountNotFound,

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

/// Storage of the hashed password of each account.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn password_hash(&self, account_id: &Uuid) -> Result<String, CredentialStoreError>;

    async fn set_password_hash(&self, account_id: &Uuid, hash: String) -> Result<(), CredentialStoreError>;
}

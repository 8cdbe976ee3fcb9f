pub mod ddb_credentials;
pub mod ddb_persister;
pub mod item;
pub mod keys;

use std::error::Error;

use async_trait::async_trait;
use service_core::ddb::delete_item::DeleteItem;
use service_core::ddb::get_item::GetItem;
use service_core::ddb::put_item::PutItem;
use service_core::ddb::query::Query;
use service_core::ddb::update_item::UpdateItem;
use thiserror::Error;

use crate::account::CustomerAccount;

pub use ddb_credentials::DdbCredentialStore;
pub use ddb_persister::DdbAccountPersister;

#[derive(Debug, Error)]
pub enum SaveAccountError {
    #[error("A customer with the same email address already exists.")]
    DuplicateAccount,

    #[error("Account not found.")]
    NotFound,

    /// The store refused the account for a reason the caller can fix.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

/// Commits a mutated account. Concurrent modification of the same account is the
/// implementation's concern.
#[async_trait]
pub trait AccountPersister: Send + Sync {
    async fn save(&self, account: &CustomerAccount) -> Result<(), SaveAccountError>;
}

pub trait ThreadSafeDdbClient: Query + GetItem + PutItem + UpdateItem + DeleteItem + Send + Sync {}
impl<T: Query + GetItem + PutItem + UpdateItem + DeleteItem + Send + Sync> ThreadSafeDdbClient for T {}

/// Flattens an SDK error for propagation once it has been logged.
pub(crate) fn datastore_error(e: impl std::fmt::Debug) -> Box<dyn Error + Send + Sync> {
    format!("{:?}", e).into()
}

pub(crate) fn conversion_error(e: serde_dynamo::Error) -> Box<dyn Error + Send + Sync> {
    tracing::error!(error = %e, "Failed to convert between an account and its DynamoDB item.");
    e.to_string().into()
}

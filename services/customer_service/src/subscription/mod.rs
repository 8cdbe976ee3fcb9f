pub mod ddb;

use std::error::Error;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use ddb::DdbSubscriptionToggler;

#[derive(Debug, Error)]
#[error("Failed to update the newsletter subscription: {0}")]
pub struct SubscriptionError(pub Box<dyn Error + Send + Sync>);

/// Newsletter subscription state of an account.
#[async_trait]
pub trait SubscriptionToggler: Send + Sync {
    async fn set_subscribed(&self, account_id: &Uuid, is_subscribed: bool) -> Result<(), SubscriptionError>;
}

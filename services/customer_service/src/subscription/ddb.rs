use async_trait::async_trait;
use aws_sdk_dynamodb::model::AttributeValue;
use chrono::{SecondsFormat, Utc};
use common_macros::hash_map;
use service_core::ddb::update_item::{UpdateItem, UpdateItemInput};
use uuid::Uuid;

use super::{SubscriptionError, SubscriptionToggler};
use crate::persistence::datastore_error;

/// Subscription records in a DynamoDB table keyed by `AccountId`. Toggling creates the record
/// on first use.
pub struct DdbSubscriptionToggler<T: UpdateItem + Send + Sync> {
    ddb: T,
    subscriptions_table_name: String,
}

impl<T: UpdateItem + Send + Sync> DdbSubscriptionToggler<T> {
    pub fn new(ddb: T, subscriptions_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            subscriptions_table_name: subscriptions_table_name.into(),
        }
    }
}

#[async_trait]
impl<T: UpdateItem + Send + Sync> SubscriptionToggler for DdbSubscriptionToggler<T> {
    async fn set_subscribed(&self, account_id: &Uuid, is_subscribed: bool) -> Result<(), SubscriptionError> {
        let update_item_input = UpdateItemInput::builder()
            .table_name(self.subscriptions_table_name.as_str())
            .key(hash_map! {
                "AccountId".to_owned() => AttributeValue::S(account_id.to_string()),
            })
            .update_expression("SET IsSubscribed = :is_subscribed, ChangedAt = :changed_at")
            .expression_attribute_values(hash_map! {
                ":is_subscribed".to_owned() => AttributeValue::Bool(is_subscribed),
                ":changed_at".to_owned() => AttributeValue::S(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            })
            .build();

        self.ddb.update_item(update_item_input).await.map_err(|e| {
            tracing::error!(error = ?e, %account_id, "Failed to update the subscription record.");
            SubscriptionError(datastore_error(e))
        })?;

        tracing::debug!(%account_id, is_subscribed, "Subscription updated.");
        Ok(())
    }
}

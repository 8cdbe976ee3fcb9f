use std::collections::HashMap;
use std::error::Error;

use aws_sdk_dynamodb::model::{AttributeValue, Select};
use common_macros::hash_map;
use service_core::ddb::query::{Query, QueryInput};
use thiserror::Error;
use uuid::Uuid;

use super::item::{AccountIdIndexProjection, EMAIL};
use super::{conversion_error, datastore_error};

pub const ACCOUNT_ID_INDEX: &str = "AccountIdIndex";

#[derive(Debug, Error)]
pub enum AccountKeyError {
    #[error("Account not found.")]
    AccountNotFound,

    #[error("Underlying datastore error: {0}")]
    Datastore(Box<dyn Error + Send + Sync>),
}

/// The accounts table is keyed by email; resolves the emails an account is stored under through
/// the `AccountIdIndex` global secondary index. More than one email means an email move left its
/// old item behind.
pub async fn stored_emails(
    ddb: &(impl Query + Sync),
    table_name: &str,
    account_id: &Uuid,
) -> Result<Vec<String>, AccountKeyError> {
    let query_input = QueryInput::builder()
        .table_name(table_name)
        .index_name(ACCOUNT_ID_INDEX)
        .key_condition_expression("AccountId = :account_id")
        .expression_attribute_values(Some(account_id_binding(account_id)))
        .select(Select::AllProjectedAttributes)
        .build();
    let output = ddb.query(query_input).await.map_err(|e| {
        tracing::error!(error = ?e, "Failed to query the account ID index.");
        AccountKeyError::Datastore(datastore_error(e))
    })?;

    let items = output
        .items
        .ok_or_else(|| AccountKeyError::Datastore("Malformed reply: missing items".into()))?;
    if items.is_empty() {
        return Err(AccountKeyError::AccountNotFound);
    }

    let mut emails = Vec::with_capacity(items.len());
    for item in items {
        let projection: AccountIdIndexProjection =
            serde_dynamo::from_item(item).map_err(|e| AccountKeyError::Datastore(conversion_error(e)))?;
        emails.push(projection.email);
    }
    if emails.len() > 1 {
        tracing::warn!(%account_id, ?emails, "Account is stored under more than one email.");
    }

    Ok(emails)
}

/// Given an email address, creates the map to be used as key to the accounts table.
pub fn account_key_from_email(email: impl Into<String>) -> HashMap<String, AttributeValue> {
    hash_map! {
        EMAIL.to_owned() => AttributeValue::S(email.into()),
    }
}

/// Expression values binding `:account_id`, used to condition writes on item ownership.
pub fn account_id_binding(account_id: &Uuid) -> HashMap<String, AttributeValue> {
    hash_map! {
        ":account_id".to_owned() => AttributeValue::S(account_id.to_string()),
    }
}

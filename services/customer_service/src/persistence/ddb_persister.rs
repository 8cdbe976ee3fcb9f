use async_trait::async_trait;
use aws_sdk_dynamodb::error::{PutItemError, PutItemErrorKind, UpdateItemError, UpdateItemErrorKind};
use aws_sdk_dynamodb::model::AttributeValue;
use aws_sdk_dynamodb::types::SdkError;
use service_core::ddb::delete_item::DeleteItemInput;
use service_core::ddb::get_item::GetItemInput;
use service_core::ddb::put_item::PutItemInput;
use service_core::ddb::update_item::UpdateItemInput;

use super::item::{account_attributes, profile_attribute, Item, STORE_ID};
use super::keys::{account_id_binding, account_key_from_email, stored_emails, AccountKeyError};
use super::{conversion_error, datastore_error, AccountPersister, SaveAccountError, ThreadSafeDdbClient};
use crate::account::CustomerAccount;

/// Stores accounts in a DynamoDB table keyed by `Email` with an `AccountIdIndex` on `AccountId`.
pub struct DdbAccountPersister<T: ThreadSafeDdbClient> {
    ddb: T,
    accounts_table_name: String,
}

impl<T: ThreadSafeDdbClient> DdbAccountPersister<T> {
    pub fn new(ddb: T, accounts_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            accounts_table_name: accounts_table_name.into(),
        }
    }

    /// Rewrites the account attributes of the item stored under `email`, provided it still
    /// belongs to the account.
    async fn update_in_place(&self, account: &CustomerAccount, email: String) -> Result<(), SaveAccountError> {
        let mut values = account_id_binding(&account.account_id);
        values.insert(
            ":profile".to_owned(),
            profile_attribute(account).map_err(|e| SaveAccountError::Other(conversion_error(e)))?,
        );
        let update_expression = match account.store_id {
            Some(store_id) => {
                values.insert(":store_id".to_owned(), AttributeValue::N(store_id.to_string()));
                "SET Profile = :profile, StoreId = :store_id"
            }
            None => "SET Profile = :profile REMOVE StoreId",
        };

        let update_item_input = UpdateItemInput::builder()
            .table_name(self.accounts_table_name.as_str())
            .key(account_key_from_email(email))
            .update_expression(update_expression)
            .condition_expression("AccountId = :account_id")
            .expression_attribute_values(values)
            .build();

        self.ddb.update_item(update_item_input).await.map_err(|err| match err {
            SdkError::ServiceError {
                err:
                    UpdateItemError {
                        kind: UpdateItemErrorKind::ConditionalCheckFailedException(_),
                        ..
                    },
                ..
            } => SaveAccountError::NotFound,
            e => {
                tracing::error!(error = ?e, "Failed to update the account item.");
                SaveAccountError::Other(datastore_error(e))
            }
        })?;

        Ok(())
    }

    /// Copies the item stored under `old_email` to the key of the account's new email. The write
    /// fails when another account owns the new key, which makes emails unique. An item under the
    /// new key that already belongs to the account is overwritten.
    async fn move_to_new_email(&self, account: &CustomerAccount, old_email: String) -> Result<(), SaveAccountError> {
        let get_item_input = GetItemInput::builder()
            .table_name(self.accounts_table_name.as_str())
            .key(account_key_from_email(old_email))
            .consistent_read(true)
            .build();
        let mut item: Item = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to read the account item.");
                SaveAccountError::Other(datastore_error(e))
            })?
            .item
            .ok_or(SaveAccountError::NotFound)?;

        if account.store_id.is_none() {
            item.remove(STORE_ID);
        }
        item.extend(account_attributes(account).map_err(|e| SaveAccountError::Other(conversion_error(e)))?);

        let put_item_input = PutItemInput::builder()
            .table_name(self.accounts_table_name.as_str())
            .item(item)
            .condition_expression("attribute_not_exists(Email) OR AccountId = :account_id")
            .expression_attribute_values(account_id_binding(&account.account_id))
            .build();
        self.ddb.put_item(put_item_input).await.map_err(|err| match err {
            SdkError::ServiceError {
                err:
                    PutItemError {
                        kind: PutItemErrorKind::ConditionalCheckFailedException(_),
                        ..
                    },
                ..
            } => SaveAccountError::DuplicateAccount,
            e => {
                tracing::error!(error = ?e, "Failed to write the account item under its new email.");
                SaveAccountError::Other(datastore_error(e))
            }
        })?;

        Ok(())
    }

    /// Deletes the items left under previous emails of the account. The account is already saved
    /// at this point, so a failure is only logged and the next save tries again.
    async fn remove_stale_items(&self, account: &CustomerAccount, stale_emails: Vec<String>) {
        for email in stale_emails {
            let delete_item_input = DeleteItemInput::builder()
                .table_name(self.accounts_table_name.as_str())
                .key(account_key_from_email(email.as_str()))
                .condition_expression("AccountId = :account_id")
                .expression_attribute_values(account_id_binding(&account.account_id))
                .build();

            match self.ddb.delete_item(delete_item_input).await {
                Ok(_) => tracing::debug!(stale_email = %email, "Removed the item under a previous email."),
                Err(e) => tracing::warn!(
                    error = ?e,
                    stale_email = %email,
                    "Failed to remove the item under a previous email."
                ),
            }
        }
    }
}

#[async_trait]
impl<T: ThreadSafeDdbClient> AccountPersister for DdbAccountPersister<T> {
    #[tracing::instrument(skip_all, fields(account_id = %account.account_id))]
    async fn save(&self, account: &CustomerAccount) -> Result<(), SaveAccountError> {
        let (current, stale): (Vec<String>, Vec<String>) =
            stored_emails(&self.ddb, &self.accounts_table_name, &account.account_id)
                .await
                .map_err(|e| match e {
                    AccountKeyError::AccountNotFound => SaveAccountError::NotFound,
                    AccountKeyError::Datastore(e) => SaveAccountError::Other(e),
                })?
                .into_iter()
                .partition(|email| *email == account.email);

        if current.is_empty() {
            let source = stale.first().cloned().ok_or(SaveAccountError::NotFound)?;
            tracing::debug!("Email changed, moving the account item.");
            self.move_to_new_email(account, source).await?;
        } else {
            self.update_in_place(account, account.email.clone()).await?;
        }

        self.remove_stale_items(account, stale).await;
        Ok(())
    }
}

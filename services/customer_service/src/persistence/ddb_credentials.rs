use async_trait::async_trait;
use aws_sdk_dynamodb::error::{UpdateItemError, UpdateItemErrorKind};
use aws_sdk_dynamodb::model::AttributeValue;
use aws_sdk_dynamodb::types::SdkError;
use service_core::ddb::get_item::GetItemInput;
use service_core::ddb::update_item::UpdateItemInput;
use uuid::Uuid;

use super::item::{PasswordProjection, PASSWORD};
use super::keys::{account_id_binding, account_key_from_email, stored_emails, AccountKeyError};
use super::{conversion_error, datastore_error, ThreadSafeDdbClient};
use crate::password::{CredentialStore, CredentialStoreError};

/// Password hashes kept in the `Password` attribute of the account item.
pub struct DdbCredentialStore<T: ThreadSafeDdbClient> {
    ddb: T,
    accounts_table_name: String,
}

impl<T: ThreadSafeDdbClient> DdbCredentialStore<T> {
    pub fn new(ddb: T, accounts_table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            accounts_table_name: accounts_table_name.into(),
        }
    }

    async fn stored_emails(&self, account_id: &Uuid) -> Result<Vec<String>, CredentialStoreError> {
        stored_emails(&self.ddb, &self.accounts_table_name, account_id)
            .await
            .map_err(|e| match e {
                AccountKeyError::AccountNotFound => CredentialStoreError::AccountNotFound,
                AccountKeyError::Datastore(e) => CredentialStoreError::Other(e),
            })
    }

    async fn write_hash(&self, email: String, account_id: &Uuid, hash: &str) -> Result<(), CredentialStoreError> {
        let mut values = account_id_binding(account_id);
        values.insert(":password".to_owned(), AttributeValue::S(hash.to_owned()));

        let update_item_input = UpdateItemInput::builder()
            .table_name(self.accounts_table_name.as_str())
            .key(account_key_from_email(email))
            .update_expression("SET Password = :password")
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
            } => CredentialStoreError::AccountNotFound,
            e => {
                tracing::error!(error = ?e, "Failed to store the password hash.");
                CredentialStoreError::Other(datastore_error(e))
            }
        })?;

        Ok(())
    }
}

#[async_trait]
impl<T: ThreadSafeDdbClient> CredentialStore for DdbCredentialStore<T> {
    async fn password_hash(&self, account_id: &Uuid) -> Result<String, CredentialStoreError> {
        let email = self
            .stored_emails(account_id)
            .await?
            .into_iter()
            .next()
            .ok_or(CredentialStoreError::AccountNotFound)?;
        let get_item_input = GetItemInput::builder()
            .table_name(self.accounts_table_name.as_str())
            .key(account_key_from_email(email))
            .consistent_read(true)
            .projection_expression(PASSWORD)
            .build();
        let item = self
            .ddb
            .get_item(get_item_input)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to read the password hash.");
                CredentialStoreError::Other(datastore_error(e))
            })?
            .item
            .ok_or(CredentialStoreError::AccountNotFound)?;

        let projection: PasswordProjection =
            serde_dynamo::from_item(item).map_err(|e| CredentialStoreError::Other(conversion_error(e)))?;
        Ok(projection.password)
    }

    /// Every item of the account gets the new hash, including one left behind by an email move.
    async fn set_password_hash(&self, account_id: &Uuid, hash: String) -> Result<(), CredentialStoreError> {
        for email in self.stored_emails(account_id).await? {
            self.write_hash(email, account_id, &hash).await?;
        }

        Ok(())
    }
}

pub mod error;
pub mod request;


use std::collections::HashSet;
use std::sync::Arc;

use service_core::endpoint_error::EndpointError;
use service_core::simple_err_map;
use typed_builder::TypedBuilder;
use uuid::Uuid;

pub use error::{SensitiveField, UpdateAccountError};
pub use request::UpdateRequest;

use crate::account::CustomerAccount;
use crate::password::{PasswordChanger, PasswordVerifier, VerifyPasswordError};
use crate::persistence::{AccountPersister, SaveAccountError};
use crate::populate::FieldPopulator;
use crate::store::{ResolveStoreError, StoreContext, StoreResolver};
use crate::subscription::SubscriptionToggler;
use crate::validation::FieldValidator;

type UpdateResult<T = ()> = Result<T, EndpointError<UpdateAccountError>>;

/// Fields never written by an account update, whatever the request contains.
pub fn default_restricted_fields() -> HashSet<String> {
    [
        "account_id",
        "id",
        "store_id",
        "website_id",
        "group_id",
        "created_at",
        "updated_at",
        "created_in",
        "disable_auto_group_change",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

/// Applies an update request to an existing customer account.
///
/// The stages run strictly in order and the first failure aborts the rest:
///
/// 1. re-authentication when the email changes,
/// 2. re-authentication and password change when a new password is given,
/// 3. validation of the whole request,
/// 4. removal of restricted fields,
/// 5. population of the account,
/// 6. store assignment,
/// 7. persistence,
/// 8. newsletter subscription, only after the account was saved.
///
/// Nothing is compensated: a password changed in stage 2 stays changed if a later stage fails,
/// and a subscription failure in stage 8 leaves the saved account in place.
#[derive(TypedBuilder)]
pub struct AccountUpdateCoordinator {
    password_verifier: Arc<dyn PasswordVerifier>,
    password_changer: Arc<dyn PasswordChanger>,
    field_validator: Arc<dyn FieldValidator>,
    field_populator: Arc<dyn FieldPopulator>,
    store_resolver: Arc<dyn StoreResolver>,
    account_persister: Arc<dyn AccountPersister>,
    subscription_toggler: Arc<dyn SubscriptionToggler>,
    #[builder(default = default_restricted_fields())]
    restricted_fields: HashSet<String>,
}

impl AccountUpdateCoordinator {
    #[tracing::instrument(
        name = "update_account",
        skip_all,
        fields(account_id = %account.account_id, store_id = store_context.store_id)
    )]
    pub async fn execute(
        &self,
        account: &mut CustomerAccount,
        request: &UpdateRequest,
        store_context: &StoreContext,
    ) -> UpdateResult {
        let account_id = account.account_id;
        if account_id.is_nil() {
            return Err(EndpointError::validation("The account to update has no identifier."));
        }

        if let Some(email) = request.email() {
            if email.as_str() != Some(account.email.as_str()) {
                tracing::debug!("Email change requested, verifying the current password.");
                let current_password = require_current_password(request, SensitiveField::Email)?;
                self.verify_password(current_password, &account_id).await?;
            }
        }

        if let Some(new_password) = request.password() {
            tracing::debug!("Password change requested, verifying the current password.");
            let current_password = require_current_password(request, SensitiveField::Password)?;
            self.verify_password(current_password, &account_id).await?;

            let new_password = new_password.as_str().ok_or_else(|| {
                EndpointError::operation(UpdateAccountError::InvalidInput("password must be a string.".to_owned()))
            })?;
            self.change_password(&account_id, current_password, new_password).await?;
        }

        self.field_validator.validate(request).await.map_err(|e| {
            let fields: Vec<&str> = e.fields().collect();
            tracing::info!(?fields, "Update request rejected by validation.");
            EndpointError::operation(UpdateAccountError::InvalidInput(e.to_string()))
        })?;

        let filtered = request.without(&self.restricted_fields);
        tracing::debug!("Request validated, populating the account.");
        self.field_populator.populate(account, &filtered, CustomerAccount::schema());
        if account.account_id != account_id {
            tracing::error!(altered = %account.account_id, "Field population altered the account identifier.");
            account.account_id = account_id;
            return Err(EndpointError::internal());
        }

        let store = self.store_resolver.resolve(store_context).await.map_err(|e| match e {
            ResolveStoreError::NotFound(_) => EndpointError::operation(UpdateAccountError::NotFound(e.to_string())),
            ResolveStoreError::Other(e) => {
                tracing::error!(error = ?e, "Failed to resolve the store.");
                EndpointError::internal()
            }
        })?;
        account.store_id = Some(store.store_id);

        self.account_persister.save(account).await.map_err(|e| match e {
            SaveAccountError::DuplicateAccount => {
                EndpointError::operation(UpdateAccountError::AlreadyExists(e.to_string()))
            }
            SaveAccountError::NotFound => EndpointError::operation(UpdateAccountError::NotFound(e.to_string())),
            SaveAccountError::Rejected(msg) => EndpointError::operation(UpdateAccountError::InvalidInput(msg)),
            SaveAccountError::Other(e) => {
                tracing::error!(error = ?e, "Failed to save the account.");
                EndpointError::internal()
            }
        })?;
        tracing::info!("Account saved.");

        if let Some(is_subscribed) = request.is_subscribed() {
            tracing::debug!(is_subscribed, "Updating the newsletter subscription.");
            self.subscription_toggler
                .set_subscribed(&account_id, is_subscribed)
                .await
                .map_err(simple_err_map!(
                    "Account saved, but the subscription update failed.",
                    EndpointError::operation(UpdateAccountError::SideEffectFailure)
                ))?;
        }

        Ok(())
    }

    async fn verify_password(&self, password: &str, account_id: &Uuid) -> UpdateResult {
        self.password_verifier
            .verify(password, account_id)
            .await
            .map_err(|e| match e {
                VerifyPasswordError::Mismatch => {
                    tracing::info!("Current password verification failed.");
                    EndpointError::operation(UpdateAccountError::AuthenticationFailure)
                }
                VerifyPasswordError::AccountNotFound => {
                    EndpointError::operation(UpdateAccountError::NotFound(e.to_string()))
                }
                VerifyPasswordError::Other(e) => {
                    tracing::error!(error = ?e, "Password verification failed unexpectedly.");
                    EndpointError::internal()
                }
            })
    }

    async fn change_password(&self, account_id: &Uuid, current_password: &str, new_password: &str) -> UpdateResult {
        self.password_changer
            .change(account_id, current_password, new_password)
            .await
            .map_err(|e| {
                if e.is_business_rule() {
                    tracing::info!(reason = %e, "Password change rejected.");
                    EndpointError::operation(UpdateAccountError::InvalidInput(e.to_string()))
                } else {
                    tracing::error!(error = ?e, "Password change failed unexpectedly.");
                    EndpointError::internal()
                }
            })
    }
}

fn require_current_password(request: &UpdateRequest, field: SensitiveField) -> UpdateResult<&str> {
    request.current_password().ok_or_else(|| {
        tracing::info!(%field, "Sensitive change requested without the current password.");
        EndpointError::operation(UpdateAccountError::MissingCredential(field))
    })
}

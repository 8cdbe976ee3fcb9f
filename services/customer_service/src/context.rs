use core::fmt;
use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

use service_core::ddb::Adapter;
use thiserror::Error;

use crate::operations::update_account::{default_restricted_fields, AccountUpdateCoordinator};
use crate::password::{Argon2PasswordChanger, Argon2PasswordVerifier, PasswordPolicy};
use crate::persistence::{DdbAccountPersister, DdbCredentialStore};
use crate::populate::SchemaFieldPopulator;
use crate::store::{StaticStoreResolver, Store};
use crate::subscription::ddb::DdbSubscriptionToggler;
use crate::validation::CustomerDataValidator;

const DEFAULT_STORES: &str = "1:default:1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextKey {
    DynamoDbEndpoint,
    AccountsTableName,
    SubscriptionsTableName,
    RestrictedFields,
    Stores,
    PasswordMinLength,
    PasswordRequiredCharacterClasses,
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DynamoDbEndpoint => write!(f, "DYNAMODB_ENDPOINT"),
            Self::AccountsTableName => write!(f, "ACCOUNTS_TABLE_NAME"),
            Self::SubscriptionsTableName => write!(f, "SUBSCRIPTIONS_TABLE_NAME"),
            Self::RestrictedFields => write!(f, "RESTRICTED_FIELDS"),
            Self::Stores => write!(f, "STORES"),
            Self::PasswordMinLength => write!(f, "PASSWORD_MIN_LENGTH"),
            Self::PasswordRequiredCharacterClasses => write!(f, "PASSWORD_REQUIRED_CHARACTER_CLASSES"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Missing required environment variable {0}.")]
    Missing(ContextKey),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: ContextKey, reason: String },

    #[error("Invalid DynamoDB endpoint: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),
}

/// Service settings read from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Context {
    pub dynamodb_endpoint: Option<String>,
    pub accounts_table_name: String,
    pub subscriptions_table_name: String,
    pub restricted_fields: HashSet<String>,
    pub stores: Vec<Store>,
    pub password_policy: PasswordPolicy,
}

impl Context {
    pub fn from_env() -> Result<Self, ContextError> {
        Self::from_lookup(|key| env::var(key.to_string()).ok())
    }

    /// Builds the context from `lookup`, which returns the raw value of a key if it is set.
    pub fn from_lookup(lookup: impl Fn(&ContextKey) -> Option<String>) -> Result<Self, ContextError> {
        let value = |key: ContextKey| lookup(&key).filter(|v| !v.trim().is_empty());
        let required = |key: ContextKey| value(key).ok_or(ContextError::Missing(key));

        let restricted_fields = match value(ContextKey::RestrictedFields) {
            Some(fields) => split_list(&fields).map(str::to_owned).collect(),
            None => default_restricted_fields(),
        };

        let stores = parse_stores(&value(ContextKey::Stores).unwrap_or_else(|| DEFAULT_STORES.to_owned()))?;

        let defaults = PasswordPolicy::default();
        let password_policy = PasswordPolicy {
            min_length: parse_number(ContextKey::PasswordMinLength, value(ContextKey::PasswordMinLength))?
                .unwrap_or(defaults.min_length),
            required_character_classes: parse_number(
                ContextKey::PasswordRequiredCharacterClasses,
                value(ContextKey::PasswordRequiredCharacterClasses),
            )?
            .unwrap_or(defaults.required_character_classes),
        };
        if !(1..=4).contains(&password_policy.required_character_classes) {
            return Err(ContextError::Invalid {
                key: ContextKey::PasswordRequiredCharacterClasses,
                reason: "expected a value between 1 and 4".to_owned(),
            });
        }

        Ok(Context {
            dynamodb_endpoint: value(ContextKey::DynamoDbEndpoint),
            accounts_table_name: required(ContextKey::AccountsTableName)?,
            subscriptions_table_name: required(ContextKey::SubscriptionsTableName)?,
            restricted_fields,
            stores,
            password_policy,
        })
    }

    pub async fn dynamodb_adapter(&self) -> Result<Adapter, ContextError> {
        let endpoint = self.dynamodb_endpoint.as_deref().map(http::Uri::from_str).transpose()?;
        let shared_config = aws_config::load_from_env().await;

        let dynamodb_config = if let Some(uri) = endpoint {
            tracing::info!(endpoint = %uri, "Using DynamoDB with a custom endpoint.");
            aws_sdk_dynamodb::config::Builder::from(&shared_config)
                .endpoint_resolver(aws_sdk_dynamodb::Endpoint::immutable(uri))
                .build()
        } else {
            aws_sdk_dynamodb::config::Config::new(&shared_config)
        };

        Ok(Adapter::from_conf(dynamodb_config))
    }

    /// Wires an account update coordinator backed by DynamoDB.
    pub async fn coordinator(&self) -> Result<AccountUpdateCoordinator, ContextError> {
        let adapter = self.dynamodb_adapter().await?;
        let credentials = Arc::new(DdbCredentialStore::new(adapter.clone(), &self.accounts_table_name));

        Ok(AccountUpdateCoordinator::builder()
            .password_verifier(Arc::new(Argon2PasswordVerifier::new(credentials.clone())))
            .password_changer(Arc::new(Argon2PasswordChanger::new(credentials, self.password_policy)))
            .field_validator(Arc::new(CustomerDataValidator::default()))
            .field_populator(Arc::new(SchemaFieldPopulator))
            .store_resolver(Arc::new(StaticStoreResolver::new(self.stores.iter().cloned())))
            .account_persister(Arc::new(DdbAccountPersister::new(adapter.clone(), &self.accounts_table_name)))
            .subscription_toggler(Arc::new(DdbSubscriptionToggler::new(adapter, &self.subscriptions_table_name)))
            .restricted_fields(self.restricted_fields.clone())
            .build())
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_number(key: ContextKey, raw: Option<String>) -> Result<Option<usize>, ContextError> {
    raw.map(|raw| {
        raw.trim().parse::<usize>().map_err(|e| ContextError::Invalid {
            key,
            reason: e.to_string(),
        })
    })
    .transpose()
}

/// Parses `id:code:website_id` entries. Every configured store is active.
fn parse_stores(raw: &str) -> Result<Vec<Store>, ContextError> {
    let invalid = |entry: &str| ContextError::Invalid {
        key: ContextKey::Stores,
        reason: format!("expected id:code:website_id, got `{}`", entry),
    };

    split_list(raw)
        .map(|entry| {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            match parts.as_slice() {
                [id, code, website_id] if !code.is_empty() => Ok(Store {
                    store_id: id.parse().map_err(|_| invalid(entry))?,
                    code: (*code).to_owned(),
                    website_id: website_id.parse().map_err(|_| invalid(entry))?,
                    is_active: true,
                }),
                _ => Err(invalid(entry)),
            }
        })
        .collect()
}

//! Test doubles for the collaborators of the account update. Every double appends what it was
//! asked to do to a shared journal so tests can assert on call order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_sdk_dynamodb::error::{
    ConditionalCheckFailedException, DeleteItemError, DeleteItemErrorKind, GetItemError, PutItemError, PutItemErrorKind,
    QueryError, UpdateItemError, UpdateItemErrorKind,
};
use aws_sdk_dynamodb::model::AttributeValue;
use aws_sdk_dynamodb::output::{DeleteItemOutput, GetItemOutput, PutItemOutput, QueryOutput, UpdateItemOutput};
use aws_sdk_dynamodb::types::SdkError;
use aws_smithy_http::body::SdkBody;
use aws_smithy_http::operation;
use service_core::ddb::delete_item::{DeleteItem, DeleteItemInput};
use service_core::ddb::get_item::{GetItem, GetItemInput};
use service_core::ddb::put_item::{PutItem, PutItemInput};
use service_core::ddb::query::{Query, QueryInput};
use service_core::ddb::update_item::{UpdateItem, UpdateItemInput};
use uuid::Uuid;

use crate::account::{AccountSchema, CustomerAccount};
use crate::operations::update_account::UpdateRequest;
use crate::password::{
    hash_password, ChangePasswordError, CredentialStore, CredentialStoreError, PasswordChanger, PasswordVerifier,
    VerifyPasswordError,
};
use crate::persistence::item::{Item, ACCOUNT_ID, EMAIL};
use crate::persistence::{AccountPersister, SaveAccountError};
use crate::populate::{FieldPopulator, SchemaFieldPopulator};
use crate::subscription::{SubscriptionError, SubscriptionToggler};
use crate::validation::{FieldValidator, ValidationError};

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct InMemoryCredentials {
    hashes: Mutex<HashMap<Uuid, String>>,
}

impl InMemoryCredentials {
    pub fn with_password(account_id: Uuid, password: &str) -> Self {
        let credentials = Self::default();
        credentials.insert_hash(account_id, &hash_password(password).unwrap());
        credentials
    }

    pub fn insert_hash(&self, account_id: Uuid, hash: &str) {
        self.hashes.lock().unwrap().insert(account_id, hash.to_owned());
    }

    pub fn hash_of(&self, account_id: &Uuid) -> Option<String> {
        self.hashes.lock().unwrap().get(account_id).cloned()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentials {
    async fn password_hash(&self, account_id: &Uuid) -> Result<String, CredentialStoreError> {
        self.hash_of(account_id).ok_or(CredentialStoreError::AccountNotFound)
    }

    async fn set_password_hash(&self, account_id: &Uuid, hash: String) -> Result<(), CredentialStoreError> {
        match self.hashes.lock().unwrap().get_mut(account_id) {
            Some(stored) => {
                *stored = hash;
                Ok(())
            }
            None => Err(CredentialStoreError::AccountNotFound),
        }
    }
}

/// Accepts a single password for every account.
pub struct FakeVerifier {
    pub journal: Journal,
    pub accepted: String,
}

#[async_trait]
impl PasswordVerifier for FakeVerifier {
    async fn verify(&self, password: &str, _account_id: &Uuid) -> Result<(), VerifyPasswordError> {
        self.journal.record("verify");
        if password == self.accepted {
            Ok(())
        } else {
            Err(VerifyPasswordError::Mismatch)
        }
    }
}

pub struct FakeChanger {
    pub journal: Journal,
    pub failure: Mutex<Option<ChangePasswordError>>,
}

#[async_trait]
impl PasswordChanger for FakeChanger {
    async fn change(
        &self,
        _account_id: &Uuid,
        _current_password: &str,
        new_password: &str,
    ) -> Result<(), ChangePasswordError> {
        self.journal.record(format!("change:{}", new_password));
        match self.failure.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

pub struct FakeValidator {
    pub journal: Journal,
    pub failure: Option<ValidationError>,
    pub seen: Mutex<Vec<UpdateRequest>>,
}

#[async_trait]
impl FieldValidator for FakeValidator {
    async fn validate(&self, request: &UpdateRequest) -> Result<(), ValidationError> {
        self.journal.record("validate");
        self.seen.lock().unwrap().push(request.clone());
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// Delegates to [`SchemaFieldPopulator`] and keeps the fields it was given.
pub struct RecordingPopulator {
    pub journal: Journal,
    pub seen: Mutex<Vec<UpdateRequest>>,
}

impl FieldPopulator for RecordingPopulator {
    fn populate(&self, account: &mut CustomerAccount, fields: &UpdateRequest, schema: &AccountSchema) {
        self.journal.record("populate");
        self.seen.lock().unwrap().push(fields.clone());
        SchemaFieldPopulator.populate(account, fields, schema);
    }
}

/// Misbehaving populator that overwrites the account identifier.
pub struct IdAlteringPopulator;

impl FieldPopulator for IdAlteringPopulator {
    fn populate(&self, account: &mut CustomerAccount, _fields: &UpdateRequest, _schema: &AccountSchema) {
        account.account_id = Uuid::new_v4();
    }
}

pub struct FakePersister {
    pub journal: Journal,
    pub failure: Mutex<Option<SaveAccountError>>,
    pub saved: Mutex<Vec<CustomerAccount>>,
}

impl FakePersister {
    pub fn last_saved(&self) -> Option<CustomerAccount> {
        self.saved.lock().unwrap().last().cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountPersister for FakePersister {
    async fn save(&self, account: &CustomerAccount) -> Result<(), SaveAccountError> {
        self.journal.record("save");
        if let Some(e) = self.failure.lock().unwrap().take() {
            return Err(e);
        }
        self.saved.lock().unwrap().push(account.clone());
        Ok(())
    }
}

pub struct FakeToggler {
    pub journal: Journal,
    pub fail: bool,
    pub subscriptions: Mutex<HashMap<Uuid, bool>>,
}

impl FakeToggler {
    pub fn is_subscribed(&self, account_id: &Uuid) -> Option<bool> {
        self.subscriptions.lock().unwrap().get(account_id).copied()
    }
}

#[async_trait]
impl SubscriptionToggler for FakeToggler {
    async fn set_subscribed(&self, account_id: &Uuid, is_subscribed: bool) -> Result<(), SubscriptionError> {
        self.journal.record(format!("subscribe:{}", is_subscribed));
        if self.fail {
            return Err(SubscriptionError("newsletter queue unavailable".into()));
        }
        self.subscriptions.lock().unwrap().insert(*account_id, is_subscribed);
        Ok(())
    }
}

/// Rough in-memory stand-in for the accounts and subscriptions tables. Items are keyed by the
/// single string attribute of the request key. `SET` and `REMOVE` update clauses are applied, and
/// conditions made of `attribute_not_exists(X)` and `X = :v` clauses joined by `OR` are checked
/// against the stored item.
#[derive(Default)]
pub struct FakeDdb {
    pub items: Mutex<HashMap<String, Item>>,
    pub journal: Journal,
    /// Operations that fail with a transport error.
    pub failing: Vec<&'static str>,
}

impl FakeDdb {
    pub fn with_items(key: &str, items: impl IntoIterator<Item = Item>) -> Self {
        let ddb = Self::default();
        for item in items {
            ddb.insert(key, item);
        }
        ddb
    }

    pub fn insert(&self, key: &str, item: Item) {
        let id = key_value(&item, key);
        self.items.lock().unwrap().insert(id, item);
    }

    pub fn item(&self, id: &str) -> Option<Item> {
        self.items.lock().unwrap().get(id).cloned()
    }

    fn check<E>(&self, operation: &'static str) -> Result<(), SdkError<E>> {
        self.journal.record(operation);
        if self.failing.contains(&operation) {
            Err(SdkError::ConstructionFailure("simulated datastore failure".into()))
        } else {
            Ok(())
        }
    }
}

fn key_value(key: &Item, name: &str) -> String {
    match key.get(name) {
        Some(AttributeValue::S(value)) => value.clone(),
        other => panic!("unsupported key attribute {:?}", other),
    }
}

fn single_key(key: &Item) -> String {
    let name = key.keys().next().expect("empty key");
    key_value(key, name)
}

fn condition_holds(condition: Option<&str>, values: &Item, stored: Option<&Item>) -> bool {
    let condition = match condition {
        Some(condition) => condition,
        None => return true,
    };
    condition.split(" OR ").any(|clause| {
        let clause = clause.trim();
        if let Some(name) = clause
            .strip_prefix("attribute_not_exists(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return stored.map_or(true, |item| !item.contains_key(name));
        }
        let (name, placeholder) = clause.split_once('=').expect("unsupported condition clause");
        stored.and_then(|item| item.get(name.trim())) == Some(&values[placeholder.trim()])
    })
}

fn conditional_check_failed() -> (ConditionalCheckFailedException, aws_smithy_types::Error) {
    (
        ConditionalCheckFailedException::builder()
            .message("The conditional request failed")
            .build(),
        aws_smithy_types::Error::builder()
            .code("ConditionalCheckFailedException")
            .build(),
    )
}

fn service_error<E>(err: E) -> SdkError<E> {
    SdkError::ServiceError {
        err,
        raw: operation::Response::new(http::Response::new(SdkBody::empty())),
    }
}

#[async_trait]
impl Query for FakeDdb {
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, SdkError<QueryError>> {
        self.check("query")?;
        let values = input.expression_attribute_values.unwrap_or_default();
        let wanted = values.get(":account_id");
        let items: Vec<_> = self
            .items
            .lock()
            .unwrap()
            .values()
            .filter(|item| item.get(ACCOUNT_ID) == wanted)
            .cloned()
            .collect();
        Ok(QueryOutput::builder().set_items(Some(items)).build())
    }
}

#[async_trait]
impl GetItem for FakeDdb {
    async fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, SdkError<GetItemError>> {
        self.check("get_item")?;
        Ok(GetItemOutput::builder().set_item(self.item(&single_key(&input.key))).build())
    }
}

#[async_trait]
impl PutItem for FakeDdb {
    async fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, SdkError<PutItemError>> {
        self.check("put_item")?;
        let values = input.expression_attribute_values.unwrap_or_default();
        let id = key_value(&input.item, EMAIL);
        let mut items = self.items.lock().unwrap();
        if !condition_holds(input.condition_expression.as_deref(), &values, items.get(&id)) {
            let (exception, meta) = conditional_check_failed();
            return Err(service_error(PutItemError::new(
                PutItemErrorKind::ConditionalCheckFailedException(exception),
                meta,
            )));
        }
        items.insert(id, input.item);
        Ok(PutItemOutput::builder().build())
    }
}

#[async_trait]
impl UpdateItem for FakeDdb {
    async fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, SdkError<UpdateItemError>> {
        self.check("update_item")?;
        let values = input.expression_attribute_values.unwrap_or_default();
        let mut items = self.items.lock().unwrap();
        let id = single_key(&input.key);
        if !condition_holds(input.condition_expression.as_deref(), &values, items.get(&id)) {
            let (exception, meta) = conditional_check_failed();
            return Err(service_error(UpdateItemError::new(
                UpdateItemErrorKind::ConditionalCheckFailedException(exception),
                meta,
            )));
        }
        let item = items.entry(id).or_insert_with(|| input.key.clone());

        let (set, remove) = match input.update_expression.split_once(" REMOVE ") {
            Some((set, remove)) => (set, Some(remove)),
            None => (input.update_expression.as_str(), None),
        };
        for assignment in set.trim_start_matches("SET ").split(',') {
            let (name, placeholder) = assignment.split_once('=').expect("malformed SET clause");
            item.insert(name.trim().to_owned(), values[placeholder.trim()].clone());
        }
        for name in remove.into_iter().flat_map(|r| r.split(',')) {
            item.remove(name.trim());
        }

        Ok(UpdateItemOutput::builder().build())
    }
}

#[async_trait]
impl DeleteItem for FakeDdb {
    async fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, SdkError<DeleteItemError>> {
        self.check("delete_item")?;
        let values = input.expression_attribute_values.unwrap_or_default();
        let mut items = self.items.lock().unwrap();
        let id = single_key(&input.key);
        if !condition_holds(input.condition_expression.as_deref(), &values, items.get(&id)) {
            let (exception, meta) = conditional_check_failed();
            return Err(service_error(DeleteItemError::new(
                DeleteItemErrorKind::ConditionalCheckFailedException(exception),
                meta,
            )));
        }
        items.remove(&id);
        Ok(DeleteItemOutput::builder().build())
    }
}

use std::collections::HashMap;

use aws_sdk_dynamodb::model::AttributeValue;
use serde::Deserialize;

use crate::account::CustomerAccount;

pub const ACCOUNT_ID: &str = "AccountId";
pub const EMAIL: &str = "Email";
pub const STORE_ID: &str = "StoreId";
pub const PROFILE: &str = "Profile";
pub const PASSWORD: &str = "Password";

pub type Item = HashMap<String, AttributeValue>;

/// Attributes of the accounts table owned by the account record. Other attributes of the item
/// (e.g. `Password`) are left untouched by account writes.
pub fn account_attributes(account: &CustomerAccount) -> Result<Item, serde_dynamo::Error> {
    serde_dynamo::to_item(account)
}

pub fn profile_attribute(account: &CustomerAccount) -> Result<AttributeValue, serde_dynamo::Error> {
    serde_dynamo::to_attribute_value(&account.profile)
}

/// Attributes projected into the `AccountIdIndex`.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AccountIdIndexProjection {
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PasswordProjection {
    pub password: String,
}

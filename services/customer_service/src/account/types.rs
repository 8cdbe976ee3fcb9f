use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use typed_builder::TypedBuilder;
use uuid::Uuid;

use super::schema::{AccountSchema, FieldKind};

/// Customer record being updated. The account is loaded by the caller, mutated in place by the
/// update operation and handed to the persister.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerAccount {
    #[serde(default = "Uuid::nil")]
    #[builder(default = Uuid::new_v4())]
    pub account_id: Uuid,

    #[builder(setter(into))]
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub store_id: Option<u32>,

    #[serde(default)]
    #[builder(default)]
    pub profile: BTreeMap<String, Value>,
}

impl CustomerAccount {
    /// Field whitelist used when merging caller supplied values into a customer account.
    pub fn schema() -> &'static AccountSchema {
        static SCHEMA: OnceLock<AccountSchema> = OnceLock::new();

        SCHEMA.get_or_init(|| {
            use FieldKind::*;

            AccountSchema::new([
                ("email", Text),
                ("firstname", Text),
                ("middlename", Text),
                ("lastname", Text),
                ("prefix", Text),
                ("suffix", Text),
                ("dob", Date),
                ("gender", Integer),
                ("taxvat", Text),
            ])
        })
    }

    pub fn profile_field(&self, name: &str) -> Option<&Value> {
        self.profile.get(name)
    }
}

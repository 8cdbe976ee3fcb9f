use serde_json::Value;

use crate::account::{AccountSchema, CustomerAccount};
use crate::operations::update_account::request::EMAIL;
use crate::operations::update_account::UpdateRequest;

/// Merges already filtered fields into an account, shaped by `schema`.
pub trait FieldPopulator: Send + Sync {
    fn populate(&self, account: &mut CustomerAccount, fields: &UpdateRequest, schema: &AccountSchema);
}

/// Writes every field known to the schema, coerced to its kind. Unknown fields and values that
/// cannot be coerced are skipped; `null` clears a profile field. Writing a value a field already
/// holds leaves the account unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemaFieldPopulator;

impl FieldPopulator for SchemaFieldPopulator {
    fn populate(&self, account: &mut CustomerAccount, fields: &UpdateRequest, schema: &AccountSchema) {
        for (field, value) in fields.iter() {
            let kind = match schema.kind_of(field) {
                Some(kind) => kind,
                None => {
                    tracing::debug!(field, "Skipping field outside of the account schema.");
                    continue;
                }
            };

            if field == EMAIL {
                match value {
                    Value::String(email) => account.email = email.clone(),
                    _ => tracing::debug!("Skipping email that is not a string."),
                }
                continue;
            }

            if value.is_null() {
                account.profile.remove(field);
                continue;
            }

            match kind.coerce(value) {
                Some(coerced) => {
                    account.profile.insert(field.to_owned(), coerced);
                }
                None => tracing::debug!(field, ?kind, "Skipping value that does not fit the field."),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn account() -> CustomerAccount {
        let mut account = CustomerAccount::builder().email("a@x.com").build();
        account.profile.insert("firstname".to_owned(), json!("John"));
        account.profile.insert("taxvat".to_owned(), json!("GB123"));
        account
    }

    #[test]
    fn writes_schema_fields() {
        let mut account = account();
        let fields = UpdateRequest::new()
            .with("email", "b@x.com")
            .with("firstname", "Jane")
            .with("gender", "2")
            .with("dob", "1990-01-31");

        SchemaFieldPopulator.populate(&mut account, &fields, CustomerAccount::schema());

        assert_eq!(account.email, "b@x.com");
        assert_eq!(account.profile_field("firstname"), Some(&json!("Jane")));
        assert_eq!(account.profile_field("gender"), Some(&json!(2)));
        assert_eq!(account.profile_field("dob"), Some(&json!("1990-01-31")));
        assert!(account.profile_field("email").is_none());
    }

    #[test]
    fn skips_unknown_and_malformed_fields() {
        let mut account = account();
        let before = account.clone();
        let fields = UpdateRequest::new()
            .with("password", "N3w-Secret")
            .with("is_subscribed", true)
            .with("account_id", "00000000-0000-0000-0000-000000000000")
            .with("dob", "yesterday")
            .with("email", 42);

        SchemaFieldPopulator.populate(&mut account, &fields, CustomerAccount::schema());

        assert_eq!(account, before);
    }

    #[test]
    fn null_clears_profile_field_but_not_email() {
        let mut account = account();
        let fields = UpdateRequest::new().with("taxvat", Value::Null).with("email", Value::Null);

        SchemaFieldPopulator.populate(&mut account, &fields, CustomerAccount::schema());

        assert!(account.profile_field("taxvat").is_none());
        assert_eq!(account.email, "a@x.com");
    }

    #[test]
    fn repeated_population_is_idempotent() {
        let mut account = account();
        let fields = UpdateRequest::new().with("firstname", "Jane");

        SchemaFieldPopulator.populate(&mut account, &fields, CustomerAccount::schema());
        let once = account.clone();
        SchemaFieldPopulator.populate(&mut account, &fields, CustomerAccount::schema());

        assert_eq!(account, once);
    }
}

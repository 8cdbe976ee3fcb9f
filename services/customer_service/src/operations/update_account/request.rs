use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EMAIL: &str = "email";
pub const PASSWORD: &str = "password";
pub const CURRENT_PASSWORD: &str = "currentPassword";
pub const IS_SUBSCRIBED: &str = "is_subscribed";

/// Field name to proposed value mapping decoded by the transport from the mutation input.
///
/// A key whose value is `null` is treated as absent by the accessors below, the same way the
/// transport treats an omitted argument.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateRequest {
    fields: HashMap<String, Value>,
}

impl UpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Value of `field` unless it is missing or `null`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn email(&self) -> Option<&Value> {
        self.get(EMAIL)
    }

    pub fn password(&self) -> Option<&Value> {
        self.get(PASSWORD)
    }

    /// The current password, if one was supplied as a string other than `""` and `"0"`.
    pub fn current_password(&self) -> Option<&str> {
        self.get(CURRENT_PASSWORD)
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty() && *p != "0")
    }

    /// Requested newsletter subscription state, cast loosely to a boolean.
    pub fn is_subscribed(&self) -> Option<bool> {
        self.get(IS_SUBSCRIBED).map(truthy)
    }

    /// Copy of this request without the `restricted` fields.
    pub fn without(&self, restricted: &HashSet<String>) -> UpdateRequest {
        self.fields
            .iter()
            .filter(|(k, _)| !restricted.contains(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl FromIterator<(String, Value)> for UpdateRequest {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// `false`, `0`, `""`, `"0"`, `null`, empty arrays and empty objects are false, everything else is
/// true.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_from_mutation_input() {
        let request: UpdateRequest = serde_json::from_value(json!({
            "firstname": "Jane",
            "currentPassword": "Secret#123",
            "is_subscribed": true,
        }))
        .unwrap();

        assert_eq!(request.get("firstname"), Some(&json!("Jane")));
        assert_eq!(request.current_password(), Some("Secret#123"));
        assert_eq!(request.is_subscribed(), Some(true));
        assert_eq!(request.email(), None);
    }

    #[test]
    fn null_is_absent() {
        let request = UpdateRequest::new().with(EMAIL, Value::Null).with(PASSWORD, Value::Null);

        assert!(request.email().is_none());
        assert!(request.password().is_none());
        assert!(!request.is_empty());
    }

    #[rstest]
    #[case(json!(""), None)]
    #[case(json!("0"), None)]
    #[case(json!(12345), None)]
    #[case(json!("Secret#123"), Some("Secret#123"))]
    fn current_password(#[case] value: Value, #[case] expected: Option<&str>) {
        let request = UpdateRequest::new().with(CURRENT_PASSWORD, value);

        assert_eq!(request.current_password(), expected);
    }

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!(false), false)]
    #[case(json!(1), true)]
    #[case(json!(0), false)]
    #[case(json!("1"), true)]
    #[case(json!("0"), false)]
    #[case(json!(""), false)]
    #[case(json!("false"), true)]
    fn is_subscribed_is_cast_loosely(#[case] value: Value, #[case] expected: bool) {
        let request = UpdateRequest::new().with(IS_SUBSCRIBED, value);

        assert_eq!(request.is_subscribed(), Some(expected));
    }

    #[test]
    fn without_strips_restricted_fields() {
        let restricted: HashSet<String> = ["group_id".to_owned()].into_iter().collect();
        let request = UpdateRequest::new().with("group_id", 4).with("firstname", "Jane");

        let filtered = request.without(&restricted);

        assert_eq!(filtered.get("group_id"), None);
        assert_eq!(filtered.get("firstname"), Some(&json!("Jane")));
        assert_eq!(request.get("group_id"), Some(&json!(4)));
    }
}

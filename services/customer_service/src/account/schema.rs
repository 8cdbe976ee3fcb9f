use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::Value;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Shape a caller supplied value must have to be written into an account field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    /// Calendar date formatted as `YYYY-MM-DD`.
    Date,
    Integer,
    Boolean,
}

impl FieldKind {
    /// Converts `value` into the canonical representation of this kind, or `None` when the value
    /// cannot represent it. `null` is not a value of any kind.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (FieldKind::Text, Value::String(_)) => Some(value.clone()),
            (FieldKind::Text, Value::Number(n)) => Some(Value::String(n.to_string())),
            (FieldKind::Date, Value::String(s)) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .ok()
                .map(|date| Value::String(date.format(DATE_FORMAT).to_string())),
            (FieldKind::Integer, Value::Number(n)) => n.as_i64().map(Value::from),
            (FieldKind::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (FieldKind::Boolean, Value::Bool(_)) => Some(value.clone()),
            (FieldKind::Boolean, Value::Number(n)) => match n.as_i64() {
                Some(0) => Some(Value::Bool(false)),
                Some(1) => Some(Value::Bool(true)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Whitelist of writable fields of an entity, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountSchema {
    fields: HashMap<String, FieldKind>,
}

impl AccountSchema {
    pub fn new<'a>(fields: impl IntoIterator<Item = (&'a str, FieldKind)>) -> Self {
        Self {
            fields: fields.into_iter().map(|(name, kind)| (name.to_owned(), kind)).collect(),
        }
    }

    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        self.fields.get(field).copied()
    }
}

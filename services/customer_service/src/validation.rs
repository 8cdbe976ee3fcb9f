use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use validator::validate_email;

use crate::account::{AccountSchema, CustomerAccount, FieldKind};
use crate::operations::update_account::request::{CURRENT_PASSWORD, EMAIL, IS_SUBSCRIBED, PASSWORD};
use crate::operations::update_account::UpdateRequest;

const MAX_TEXT_LENGTH: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

/// Validation failure listing every offending field.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.field.as_str())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.violations.iter().map(|v| v.message.as_str()).collect();
        write!(f, "{}", messages.join(" "))
    }
}

/// Validates proposed field changes against business rules before anything is mutated.
#[async_trait]
pub trait FieldValidator: Send + Sync {
    async fn validate(&self, request: &UpdateRequest) -> Result<(), ValidationError>;
}

/// Rules for customer data: required fields cannot be blanked, the email must be well formed,
/// and schema fields must hold values of their kind.
pub struct CustomerDataValidator {
    required: HashSet<String>,
    schema: &'static AccountSchema,
}

impl Default for CustomerDataValidator {
    fn default() -> Self {
        Self::new(["firstname", "lastname", EMAIL])
    }
}

impl CustomerDataValidator {
    pub fn new<'a>(required: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            required: required.into_iter().map(str::to_owned).collect(),
            schema: CustomerAccount::schema(),
        }
    }

    fn check_field(&self, field: &str, value: &Value, violations: &mut Vec<FieldViolation>) {
        if self.required.contains(field) && is_blank(value) {
            violations.push(FieldViolation::new(
                field,
                format!("Required parameters are missing: {}", field),
            ));
            return;
        }

        match field {
            EMAIL => {
                if !value.as_str().map_or(false, |email| validate_email(email)) {
                    violations.push(FieldViolation::new(field, format!("{} is not a valid email address.", value)));
                }
                return;
            }
            PASSWORD | CURRENT_PASSWORD => {
                if !value.is_string() && !value.is_null() {
                    violations.push(FieldViolation::new(field, format!("{} must be a string.", field)));
                }
                return;
            }
            IS_SUBSCRIBED => {
                if !(value.is_boolean() || value.is_number() || value.is_string() || value.is_null()) {
                    violations.push(FieldViolation::new(field, "is_subscribed must be a boolean."));
                }
                return;
            }
            _ => {}
        }

        let kind = match self.schema.kind_of(field) {
            Some(kind) if !value.is_null() => kind,
            // Fields outside the schema are left to the populator.
            _ => return,
        };

        match kind.coerce(value) {
            None => violations.push(FieldViolation::new(field, invalid_kind_message(field, kind))),
            Some(Value::String(s)) if kind == FieldKind::Text && s.chars().count() > MAX_TEXT_LENGTH => {
                violations.push(FieldViolation::new(
                    field,
                    format!("{} must not exceed {} characters.", field, MAX_TEXT_LENGTH),
                ))
            }
            Some(_) => {}
        }
    }
}

#[async_trait]
impl FieldValidator for CustomerDataValidator {
    async fn validate(&self, request: &UpdateRequest) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        for (field, value) in request.iter() {
            self.check_field(field, value, &mut violations);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            violations.sort_by(|a, b| a.field.cmp(&b.field));
            Err(ValidationError { violations })
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn invalid_kind_message(field: &str, kind: FieldKind) -> String {
    match kind {
        FieldKind::Text => format!("{} must be a string.", field),
        FieldKind::Date => format!("{} must be a date formatted as YYYY-MM-DD.", field),
        FieldKind::Integer => format!("{} must be an integer.", field),
        FieldKind::Boolean => format!("{} must be a boolean.", field),
    }
}

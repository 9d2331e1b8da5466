use crate::schema::error::SchemaError;
use crate::schema::field::{FieldDef, FieldKind, FieldList};
use regex::Regex;
use serde_json::Value;

/// Message used when a validator can only say "no".
pub const GENERIC_FAILURE: &str = "Validation failed";

/// Synchronous payload check. An empty list means the payload is valid.
pub trait Validator {
    fn check(&self, payload: &Value) -> Result<Vec<String>, SchemaError>;
}

/// Adapts a plain `payload -> bool` predicate.
pub struct Predicate<F>(pub F);

impl<F> Validator for Predicate<F>
where
    F: Fn(&Value) -> bool,
{
    fn check(&self, payload: &Value) -> Result<Vec<String>, SchemaError> {
        if (self.0)(payload) {
            Ok(Vec::new())
        } else {
            Ok(vec![GENERIC_FAILURE.to_string()])
        }
    }
}

/// Checks required-ness, kind, and pattern for every field, in field order.
#[derive(Debug)]
pub struct FieldRules {
    fields: FieldList,
    patterns: Vec<Option<Regex>>,
    email: Regex,
}

impl FieldRules {
    pub fn new(fields: FieldList) -> Result<Self, SchemaError> {
        let mut patterns = Vec::with_capacity(fields.len());
        for field in fields.iter() {
            let compiled = match &field.pattern {
                Some(p) => Some(Regex::new(p).map_err(|e| SchemaError::pattern(&field.name, e))?),
                None => None,
            };
            patterns.push(compiled);
        }

        // Not RFC 5322; one `@`, no spaces, a dot in the domain.
        let email = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .map_err(|e| SchemaError::pattern("email", e))?;

        Ok(Self {
            fields,
            patterns,
            email,
        })
    }

    fn check_field(
        &self,
        field: &FieldDef,
        pattern: Option<&Regex>,
        value: Option<&Value>,
    ) -> Option<String> {
        let label = field.display_label();

        let value = match value {
            Some(v) if !is_blank(v) => v,
            _ if field.required => return Some(format!("{} is required", label)),
            _ => return None,
        };

        let kind_ok = match field.kind {
            FieldKind::Text | FieldKind::Textarea => {
                matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
            }
            FieldKind::Number => match value {
                Value::Number(_) => true,
                Value::String(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            FieldKind::Integer => match value {
                Value::Number(n) => n.is_i64() || n.is_u64(),
                Value::String(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            FieldKind::Boolean => match value {
                Value::Bool(_) => true,
                Value::String(s) => matches!(s.as_str(), "true" | "false" | "on" | "off"),
                _ => false,
            },
            FieldKind::Email => matches!(value, Value::String(s) if self.email.is_match(s.trim())),
        };
        if !kind_ok {
            return Some(kind_message(label, field.kind));
        }

        if let Some(re) = pattern {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if !re.is_match(&text) {
                return Some(format!("{} has an invalid format", label));
            }
        }

        None
    }
}

impl Validator for FieldRules {
    fn check(&self, payload: &Value) -> Result<Vec<String>, SchemaError> {
        let Some(obj) = payload.as_object() else {
            return Ok(vec!["payload must be an object".to_string()]);
        };

        let errors = self
            .fields
            .iter()
            .zip(&self.patterns)
            .filter_map(|(field, pattern)| {
                self.check_field(field, pattern.as_ref(), obj.get(&field.name))
            })
            .collect();
        Ok(errors)
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn kind_message(label: &str, kind: FieldKind) -> String {
    match kind {
        FieldKind::Text | FieldKind::Textarea => format!("{} must be text", label),
        FieldKind::Number => format!("{} must be a number", label),
        FieldKind::Integer => format!("{} must be a whole number", label),
        FieldKind::Boolean => format!("{} must be true or false", label),
        FieldKind::Email => format!("{} must be an email address", label),
    }
}

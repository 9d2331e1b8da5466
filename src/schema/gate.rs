//! The validation gate: one failure shape for every way a check can fail.

use crate::schema::handle::SchemaHandle;
use crate::schema::rules::Validator;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl Validation {
    pub fn accepted() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn rejected(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Check `payload` against the schema behind `handle`.
///
/// Never fails outward: a schema that cannot be loaded or a validator error
/// comes back as an invalid result carrying one diagnostic.
pub fn validate(handle: &SchemaHandle, payload: &Value) -> Validation {
    let schema = match handle.schema() {
        Ok(s) => s,
        Err(e) => {
            warn!(schema = %handle.identifier(), error = %e, "validator unavailable");
            return Validation::rejected(vec![e.to_string()]);
        }
    };

    match schema.check(payload) {
        Ok(errors) if errors.is_empty() => Validation::accepted(),
        Ok(errors) => {
            debug!(schema = %handle.identifier(), violations = errors.len(), "payload rejected");
            Validation::rejected(errors)
        }
        Err(e) => {
            warn!(schema = %handle.identifier(), error = %e, "validator failed");
            Validation::rejected(vec![e.to_string()])
        }
    }
}

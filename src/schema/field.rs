//! Field descriptors discovered from a schema.
//!
//! JSON shape of one field (all keys but `name` optional):
//! {
//!   "name": "age",
//!   "label": "Age",          // defaults to `name`
//!   "kind": "integer",       // text | textarea | number | integer | boolean | email
//!   "required": true,
//!   "default": 18,
//!   "pattern": "^[0-9]+$"    // checked against the string form of the value
//! }

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Number,
    Integer,
    Boolean,
    Email,
}

impl FieldKind {
    /// HTML `type` attribute for an `<input>`; `None` for a textarea.
    pub fn input_type(self) -> Option<&'static str> {
        match self {
            FieldKind::Text => Some("text"),
            FieldKind::Textarea => None,
            FieldKind::Number | FieldKind::Integer => Some("number"),
            FieldKind::Boolean => Some("checkbox"),
            FieldKind::Email => Some("email"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub kind: FieldKind,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub default: Option<Value>,

    #[serde(default)]
    pub pattern: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind,
            required: false,
            default: None,
            pattern: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Ordered, immutable field sequence. Cloning shares the same list.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldList(Rc<[FieldDef]>);

impl FieldList {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self(fields.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDef> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<FieldDef> for FieldList {
    fn from_iter<I: IntoIterator<Item = FieldDef>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

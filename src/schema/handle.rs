//! Schema handles: a lazily loaded, memoized schema shared by reference.

use crate::schema::error::SchemaError;
use crate::schema::field::{FieldDef, FieldKind, FieldList};
use crate::schema::rules::{FieldRules, Validator};
use serde_json::Value;
use std::cell::{Cell, OnceCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// A loaded schema: its field list plus the validator built from it.
pub struct Schema {
    identifier: String,
    fields: FieldList,
    rules: FieldRules,
    extra: Vec<Box<dyn Validator>>,
}

impl Schema {
    pub fn new(identifier: impl Into<String>, fields: FieldList) -> Result<Self, SchemaError> {
        let rules = FieldRules::new(fields.clone())?;
        Ok(Self {
            identifier: identifier.into(),
            fields,
            rules,
            extra: Vec::new(),
        })
    }

    /// Add a check that runs after the field rules.
    pub fn with_rule(mut self, rule: impl Validator + 'static) -> Self {
        self.extra.push(Box::new(rule));
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn fields(&self) -> &FieldList {
        &self.fields
    }
}

impl Validator for Schema {
    fn check(&self, payload: &Value) -> Result<Vec<String>, SchemaError> {
        let mut errors = self.rules.check(payload)?;
        for rule in &self.extra {
            errors.extend(rule.check(payload)?);
        }
        Ok(errors)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("identifier", &self.identifier)
            .field("fields", &self.fields)
            .field("extra_rules", &self.extra.len())
            .finish()
    }
}

/// Turns an identifier into a schema. Called at most once per handle.
pub trait SchemaLoader {
    fn load(&self, identifier: &str) -> Result<Schema, SchemaError>;
}

impl<F> SchemaLoader for F
where
    F: Fn(&str) -> Result<Schema, SchemaError>,
{
    fn load(&self, identifier: &str) -> Result<Schema, SchemaError> {
        self(identifier)
    }
}

struct HandleInner {
    identifier: String,
    loader: Option<Rc<dyn SchemaLoader>>,
    loaded: OnceCell<Result<Rc<Schema>, SchemaError>>,
    loads: Cell<u32>,
}

/// Opaque reference to a schema. Clones share the memoized load, so every
/// component bound to the same handle triggers at most one load between them.
#[derive(Clone)]
pub struct SchemaHandle {
    inner: Rc<HandleInner>,
}

impl SchemaHandle {
    pub fn new(identifier: impl Into<String>, loader: Rc<dyn SchemaLoader>) -> Self {
        Self {
            inner: Rc::new(HandleInner {
                identifier: identifier.into(),
                loader: Some(loader),
                loaded: OnceCell::new(),
                loads: Cell::new(0),
            }),
        }
    }

    /// A handle over an already built schema; never loads.
    pub fn resolved(schema: Schema) -> Self {
        let handle = Self {
            inner: Rc::new(HandleInner {
                identifier: schema.identifier().to_string(),
                loader: None,
                loaded: OnceCell::new(),
                loads: Cell::new(0),
            }),
        };
        let _ = handle.inner.loaded.set(Ok(Rc::new(schema)));
        handle
    }

    pub fn identifier(&self) -> &str {
        &self.inner.identifier
    }

    /// Load on first use; later calls (and failures) come from the cache.
    pub fn schema(&self) -> Result<Rc<Schema>, SchemaError> {
        self.inner
            .loaded
            .get_or_init(|| {
                self.inner.loads.set(self.inner.loads.get() + 1);
                let id = &self.inner.identifier;
                let result = match &self.inner.loader {
                    Some(loader) => loader.load(id).map(Rc::new),
                    None => Err(SchemaError::load_failed(id, "no loader")),
                };
                match &result {
                    Ok(s) => debug!(schema = %id, fields = s.fields().len(), "schema loaded"),
                    Err(e) => warn!(schema = %id, error = %e, "schema load failed"),
                }
                result
            })
            .clone()
    }

    pub fn fields(&self) -> Result<FieldList, SchemaError> {
        self.schema().map(|s| s.fields().clone())
    }

    /// How many times the loader actually ran.
    pub fn load_count(&self) -> u32 {
        self.inner.loads.get()
    }
}

impl fmt::Debug for SchemaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaHandle")
            .field("identifier", &self.inner.identifier)
            .field("loaded", &self.inner.loaded.get().is_some())
            .finish()
    }
}

/// In-process registry of field lists keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct BuiltinSchemas {
    fields: HashMap<String, FieldList>,
}

impl BuiltinSchemas {
    /// Registry with the stock `person` schema.
    pub fn standard() -> Self {
        Self::default().with("person", person_fields())
    }

    pub fn with(mut self, identifier: impl Into<String>, fields: FieldList) -> Self {
        self.fields.insert(identifier.into(), fields);
        self
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.fields.contains_key(identifier)
    }

    pub fn handle(self: &Rc<Self>, identifier: &str) -> SchemaHandle {
        SchemaHandle::new(identifier, self.clone())
    }
}

impl SchemaLoader for BuiltinSchemas {
    fn load(&self, identifier: &str) -> Result<Schema, SchemaError> {
        let fields = self
            .fields
            .get(identifier)
            .ok_or_else(|| SchemaError::UnknownSchema(identifier.to_string()))?;
        Schema::new(identifier, fields.clone())
    }
}

fn person_fields() -> FieldList {
    FieldList::new(vec![
        FieldDef::new("id", FieldKind::Text).label("ID"),
        FieldDef::new("name", FieldKind::Text).label("Name").required(),
        FieldDef::new("email", FieldKind::Email).label("Email"),
        FieldDef::new("age", FieldKind::Integer).label("Age"),
        FieldDef::new("description", FieldKind::Textarea).label("Description"),
    ])
}

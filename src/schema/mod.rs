//! Schema layer: field discovery and the validation gate.
//!
//! Schemas are loaded through a `SchemaLoader` and memoized per handle.
//! Nothing here parses schema documents; loaders hand over field lists.

pub mod error;
pub mod field;
pub mod gate;
pub mod handle;
pub mod rules;

pub use error::SchemaError;
pub use field::{FieldDef, FieldKind, FieldList};
pub use gate::{Validation, validate};
pub use handle::{BuiltinSchemas, Schema, SchemaHandle, SchemaLoader};
pub use rules::{FieldRules, GENERIC_FAILURE, Predicate, Validator};

//! Schema-driven CRUD components over a path-addressable object store.

pub mod crud;
pub mod render;
pub mod schema;
pub mod script;
pub mod store;

pub type Result<T> = anyhow::Result<T>;

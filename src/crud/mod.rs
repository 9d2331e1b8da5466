//! CRUD components: one lifecycle state machine per mounted instance.
//!
//! `crud(schema)` returns a factory whose four definitions (create, read,
//! update, delete) share one config. Instances take their store handle and
//! host context by injection.

pub mod context;
pub mod create;
pub mod delete;
pub mod factory;
pub mod lifecycle;
pub mod read;
pub mod update;

pub use context::{HostContext, MemoryContext};
pub use create::CreateForm;
pub use delete::DeleteView;
pub use factory::{Component, ComponentDef, CrudComponent, CrudConfig, CrudFactory, crud};
pub use lifecycle::{
    LifecycleState, MISSING_PATH, Mode, Operation, Outcome, PATH_ATTRIBUTES, Props,
};
pub use read::ReadView;
pub use update::UpdateForm;

//! Store layer: dotted paths, slots, and the in-memory object graph.
//!
//! This module knows nothing about schemas or components. It owns:
//! - Path parsing and the resolver (`resolve`, `ensure`)
//! - Slot variants (plain value or dual read/write accessor)
//! - The HostStore contract and its in-memory implementation

pub mod error;
pub mod object;
pub mod path;
pub mod slot;

pub use error::{StoreError, StoreResult};
pub use object::{HostStore, Mapping, Node, ObjectStore};
pub use path::{Path, Resolution};
pub use slot::{Slot, SlotAccess, ValueCell};

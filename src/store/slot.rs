//! Terminal storage locations.
//!
//! A slot is either plain data or a dual slot: readable like a value, but
//! every write is routed through the slot's own write operation so whatever
//! wiring the host attached to it survives.

use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Read/write pair behind a dual slot.
pub trait SlotAccess {
    fn read(&self) -> Value;

    fn write(&self, value: Value);
}

/// Callback fired after each write to a [`ValueCell`].
pub type Watcher = Rc<dyn Fn(&Value)>;

/// Default dual slot installed by `ObjectStore::put`.
///
/// Holds the value, counts writes, and notifies watchers on every write
/// (writing an equal value still notifies).
#[derive(Default)]
pub struct ValueCell {
    value: RefCell<Value>,
    writes: Cell<u64>,
    watchers: RefCell<Vec<Watcher>>,
}

impl ValueCell {
    pub fn new(value: Value) -> Self {
        Self {
            value: RefCell::new(value),
            writes: Cell::new(0),
            watchers: RefCell::new(Vec::new()),
        }
    }

    /// Number of writes routed through this cell since it was installed.
    pub fn writes(&self) -> u64 {
        self.writes.get()
    }

    pub fn watch(&self, watcher: impl Fn(&Value) + 'static) {
        self.watchers.borrow_mut().push(Rc::new(watcher));
    }
}

impl SlotAccess for ValueCell {
    fn read(&self) -> Value {
        self.value.borrow().clone()
    }

    fn write(&self, value: Value) {
        *self.value.borrow_mut() = value;
        self.writes.set(self.writes.get() + 1);

        // watchers may add watchers or write again
        let current = self.value.borrow().clone();
        let watchers: Vec<Watcher> = self.watchers.borrow().clone();
        for watcher in &watchers {
            watcher(&current);
        }
    }
}

/// Tagged terminal value: the store checks the tag instead of guessing.
#[derive(Clone)]
pub enum Slot {
    Plain(Value),
    Accessor(Rc<dyn SlotAccess>),
}

impl Slot {
    pub fn read(&self) -> Value {
        match self {
            Slot::Plain(v) => v.clone(),
            Slot::Accessor(access) => access.read(),
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Plain(v) => f.debug_tuple("Plain").field(v).finish(),
            Slot::Accessor(access) => f.debug_tuple("Accessor").field(&access.read()).finish(),
        }
    }
}

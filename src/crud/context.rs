//! Per-instance reactive key/value state supplied by the host runtime.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub trait HostContext {
    fn get_state(&self, key: &str, default: Value) -> Value;

    fn set_state(&mut self, key: &str, value: Value);
}

/// Plain map-backed context. Optionally records every `set_state` call.
#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    values: BTreeMap<String, Value>,
    history: Option<Vec<(String, Value)>>,
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recording() -> Self {
        Self {
            values: BTreeMap::new(),
            history: Some(Vec::new()),
        }
    }

    /// Recorded `(key, value)` writes in order; empty unless `recording()`.
    pub fn history(&self) -> &[(String, Value)] {
        self.history.as_deref().unwrap_or(&[])
    }
}

impl HostContext for MemoryContext {
    fn get_state(&self, key: &str, default: Value) -> Value {
        self.values.get(key).cloned().unwrap_or(default)
    }

    fn set_state(&mut self, key: &str, value: Value) {
        if let Some(h) = &mut self.history {
            h.push((key.to_string(), value.clone()));
        }
        self.values.insert(key.to_string(), value);
    }
}

/// Lets the host keep its own handle on a context it lends to a component.
impl<C: HostContext> HostContext for Rc<RefCell<C>> {
    fn get_state(&self, key: &str, default: Value) -> Value {
        self.borrow().get_state(key, default)
    }

    fn set_state(&mut self, key: &str, value: Value) {
        self.borrow_mut().set_state(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_is_returned_for_unknown_keys() {
        let mut ctx = MemoryContext::new();
        assert_eq!(ctx.get_state("k", json!(3)), json!(3));
        ctx.set_state("k", json!(4));
        assert_eq!(ctx.get_state("k", json!(3)), json!(4));
        assert!(ctx.history().is_empty());
    }

    #[test]
    fn recording_keeps_order() {
        let mut ctx = MemoryContext::recording();
        ctx.set_state("a", json!(1));
        ctx.set_state("a", json!(2));
        assert_eq!(ctx.history().len(), 2);
        assert_eq!(ctx.history()[1], ("a".to_string(), json!(2)));
    }
}

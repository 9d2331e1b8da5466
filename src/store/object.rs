//! The path-addressable object graph.
//!
//! Mappings nest; terminal entries are slots. `put` always leaves a dual
//! slot behind, so later writes to the same path go through that slot's
//! write operation instead of replacing it. Putting an object onto a mapping
//! merges it key by key for the same reason.
//!
//! A slot holding an object can be addressed below: `persons.john.name`
//! reads, writes and deletes inside the value of a `persons` slot, and the
//! updated object is written back through that slot.

use crate::store::error::{StoreError, StoreResult};
use crate::store::path::{self, Path, Resolution};
use crate::store::slot::{Slot, SlotAccess, ValueCell};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, warn};

pub type Mapping = BTreeMap<String, Node>;

#[derive(Debug, Clone)]
pub enum Node {
    Map(Mapping),
    Slot(Slot),
}

impl Node {
    /// Materialize this node as plain JSON (mappings become objects).
    pub fn to_value(&self) -> Value {
        match self {
            Node::Map(map) => Value::Object(mapping_to_json(map)),
            Node::Slot(slot) => slot.read(),
        }
    }
}

fn mapping_to_json(map: &Mapping) -> Map<String, Value> {
    map.iter().map(|(k, node)| (k.clone(), node.to_value())).collect()
}

fn mapping_from_json(obj: Map<String, Value>) -> Mapping {
    obj.into_iter()
        .map(|(k, v)| {
            let node = match v {
                Value::Object(inner) => Node::Map(mapping_from_json(inner)),
                leaf => Node::Slot(Slot::Plain(leaf)),
            };
            (k, node)
        })
        .collect()
}

/// The three operations (plus `exists`) a lifecycle needs from a store.
///
/// `get` never fails for missing paths. A stored `null` and a missing entry
/// are both "not present" for `exists`.
pub trait HostStore {
    fn get(&self, path: &Path) -> Option<Value>;

    fn put(&self, path: &Path, value: Value) -> StoreResult<()>;

    fn delete(&self, path: &Path);

    fn exists(&self, path: &Path) -> bool {
        matches!(self.get(path), Some(v) if !v.is_null())
    }
}

/// In-memory [`HostStore`]. Single-threaded; share it with `Rc`.
#[derive(Debug, Default)]
pub struct ObjectStore {
    root: RefCell<Mapping>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a JSON object: nested objects become mappings, everything
    /// else becomes a plain slot.
    pub fn from_json(data: Map<String, Value>) -> Self {
        Self {
            root: RefCell::new(mapping_from_json(data)),
        }
    }

    /// Snapshot the whole graph as JSON.
    pub fn to_json(&self) -> Value {
        Value::Object(mapping_to_json(&self.root.borrow()))
    }

    /// Place a host-owned dual slot at `path`, replacing whatever was there.
    pub fn install(&self, path: &Path, access: Rc<dyn SlotAccess>) -> StoreResult<()> {
        let mut root = self.root.borrow_mut();
        let parent = path::ensure(&mut root, path)?;
        parent.insert(path.last().to_string(), Node::Slot(Slot::Accessor(access)));
        debug!(path = %path, "installed accessor");
        Ok(())
    }

    /// The dual slot at `path`, if the entry is one.
    pub fn slot(&self, path: &Path) -> Option<Rc<dyn SlotAccess>> {
        let root = self.root.borrow();
        match path::resolve(&root, path) {
            Resolution::Found(Node::Slot(Slot::Accessor(access))) => Some(access.clone()),
            _ => None,
        }
    }
}

impl HostStore for ObjectStore {
    fn get(&self, path: &Path) -> Option<Value> {
        let (slot, depth) = {
            let root = self.root.borrow();
            match path::resolve(&root, path) {
                Resolution::Found(node) => return Some(node.to_value()),
                Resolution::NotFound => return None,
                Resolution::Within { slot, depth } => (slot.clone(), depth),
            }
        };

        let found = value_at(slot.read(), path.below(depth));
        if found.is_none() {
            debug!(path = %path, slot = %path.prefix(depth), "read stopped inside a slot value");
        }
        found
    }

    fn put(&self, path: &Path, value: Value) -> StoreResult<()> {
        let result = match self.slot_above(path) {
            Some((slot, depth)) => self.put_within(path, slot, depth, value),
            None => self.put_node(path, value),
        };
        if let Err(e) = &result {
            warn!(path = %path, error = %e, "put rejected");
        }
        result
    }

    fn delete(&self, path: &Path) {
        if let Some((slot, depth)) = self.slot_above(path) {
            let mut value = slot.read();
            if !remove_within(&mut value, path.below(depth)) {
                return;
            }
            match self.write_slot(&path.ancestor(depth), slot, value) {
                Ok(()) => debug!(path = %path, "deleted key inside slot value"),
                Err(e) => warn!(path = %path, error = %e, "delete inside slot value failed"),
            }
            return;
        }

        let mut root = self.root.borrow_mut();
        let mut current = &mut *root;
        for segment in path.parents() {
            match current.get_mut(segment) {
                Some(Node::Map(map)) => current = map,
                _ => return,
            }
        }
        if current.remove(path.last()).is_some() {
            debug!(path = %path, "deleted entry");
        }
    }
}

type PendingWrites = Vec<(Rc<dyn SlotAccess>, Value)>;

impl ObjectStore {
    /// The slot sitting above `path`'s final segment, and how deep it sits.
    fn slot_above(&self, path: &Path) -> Option<(Slot, usize)> {
        let root = self.root.borrow();
        match path::resolve(&root, path) {
            Resolution::Within { slot, depth } => Some((slot.clone(), depth)),
            _ => None,
        }
    }

    /// Write into the object held by a slot higher up the path.
    fn put_within(&self, path: &Path, slot: Slot, depth: usize, value: Value) -> StoreResult<()> {
        let mut current = slot.read();
        if let Err(walked) = set_within(&mut current, path.below(depth), value) {
            return Err(StoreError::path_conflict(path, path.prefix(depth + walked)));
        }
        self.write_slot(&path.ancestor(depth), slot, current)?;
        debug!(path = %path, slot = %path.prefix(depth), "wrote inside slot value");
        Ok(())
    }

    fn put_node(&self, path: &Path, value: Value) -> StoreResult<()> {
        let mut pending = PendingWrites::new();
        {
            let mut root = self.root.borrow_mut();
            let parent = path::ensure(&mut root, path)?;
            let key = path.last();

            let replacement = match parent.get_mut(key) {
                Some(Node::Slot(Slot::Accessor(access))) => {
                    pending.push((Rc::clone(access), value));
                    None
                }
                Some(Node::Map(map)) => match value {
                    Value::Object(fields) => {
                        merge_into(map, fields, &mut pending);
                        None
                    }
                    other => Some(other),
                },
                _ => Some(value),
            };
            if let Some(value) = replacement {
                parent.insert(key.to_string(), new_cell(value));
                debug!(path = %path, "installed new slot");
            }
        }

        // the graph is released before any host code runs
        if !pending.is_empty() {
            debug!(path = %path, writes = pending.len(), "routed writes through existing slots");
        }
        for (access, value) in pending {
            access.write(value);
        }
        Ok(())
    }

    /// Store `value` back into the slot at `at`. Plain slots are upgraded to
    /// a fresh cell.
    fn write_slot(&self, at: &Path, slot: Slot, value: Value) -> StoreResult<()> {
        match slot {
            Slot::Accessor(access) => access.write(value),
            Slot::Plain(_) => {
                let mut root = self.root.borrow_mut();
                let parent = path::ensure(&mut root, at)?;
                parent.insert(at.last().to_string(), new_cell(value));
            }
        }
        Ok(())
    }
}

fn new_cell(value: Value) -> Node {
    Node::Slot(Slot::Accessor(Rc::new(ValueCell::new(value))))
}

/// Merge `fields` into a mapping key by key. Keys absent from `fields` are
/// dropped. Accessors met on the way are queued for the caller to write.
fn merge_into(map: &mut Mapping, fields: Map<String, Value>, pending: &mut PendingWrites) {
    map.retain(|key, _| fields.contains_key(key));
    for (key, value) in fields {
        let node = map
            .entry(key)
            .or_insert_with(|| Node::Slot(Slot::Plain(Value::Null)));
        match (node, value) {
            (Node::Slot(Slot::Accessor(access)), value) => pending.push((Rc::clone(access), value)),
            (Node::Map(inner), Value::Object(nested)) => merge_into(inner, nested, pending),
            (node, value) => *node = new_cell(value),
        }
    }
}

fn value_at(value: Value, keys: &[String]) -> Option<Value> {
    keys.iter().try_fold(value, |current, key| match current {
        Value::Object(mut fields) => fields.remove(key),
        _ => None,
    })
}

/// Set `keys` inside `target`, treating `null` as an empty object. Any other
/// non-object stops the write; the error is how many keys were walked first.
fn set_within(target: &mut Value, keys: &[String], new: Value) -> Result<(), usize> {
    let Some((key, rest)) = keys.split_first() else {
        *target = new;
        return Ok(());
    };
    if target.is_null() {
        *target = Value::Object(Map::new());
    }
    match target {
        Value::Object(fields) => {
            let child = fields.entry(key.clone()).or_insert(Value::Null);
            set_within(child, rest, new).map_err(|walked| walked + 1)
        }
        _ => Err(0),
    }
}

/// Remove the key `keys` ends at. False when any part of it is missing.
fn remove_within(target: &mut Value, keys: &[String]) -> bool {
    let Some((last, parents)) = keys.split_last() else {
        return false;
    };
    let mut current = target;
    for key in parents {
        match current.as_object_mut().and_then(|fields| fields.get_mut(key)) {
            Some(next) => current = next,
            None => return false,
        }
    }
    current
        .as_object_mut()
        .is_some_and(|fields| fields.remove(last).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = ObjectStore::new();
        let v = json!({"id": "1", "name": "John"});
        store.put(&p("persons.john"), v.clone()).unwrap();
        assert_eq!(store.get(&p("persons.john")), Some(v));
        assert_eq!(
            store.get(&p("persons")),
            Some(json!({"john": {"id": "1", "name": "John"}}))
        );
    }

    #[test]
    fn missing_paths_read_as_none() {
        let store = ObjectStore::new();
        assert_eq!(store.get(&p("nothing.here")), None);
        assert!(!store.exists(&p("nothing.here")));
    }

    #[test]
    fn second_put_reuses_the_slot() {
        let store = ObjectStore::new();
        store.put(&p("a.b"), json!(1)).unwrap();
        let first = store.slot(&p("a.b")).unwrap();

        store.put(&p("a.b"), json!(2)).unwrap();
        let second = store.slot(&p("a.b")).unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.read(), json!(2));
    }

    #[test]
    fn put_through_slot_keeps_host_wiring() {
        let store = ObjectStore::new();
        let cell = Rc::new(ValueCell::new(json!(null)));
        let seen = Rc::new(RefCell::new(0));
        let counter = seen.clone();
        cell.watch(move |_| *counter.borrow_mut() += 1);
        store.install(&p("x"), cell.clone()).unwrap();

        store.put(&p("x"), json!("same")).unwrap();
        store.put(&p("x"), json!("same")).unwrap();

        assert_eq!(*seen.borrow(), 2);
        assert_eq!(cell.writes(), 2);
        assert_eq!(store.get(&p("x")), Some(json!("same")));
    }

    #[test]
    fn put_over_plain_seeded_value_installs_a_slot() {
        let seed = json!({"persons": {"alice": {"age": 28}}});
        let store = ObjectStore::from_json(seed.as_object().unwrap().clone());
        assert!(store.slot(&p("persons.alice.age")).is_none());

        store.put(&p("persons.alice.age"), json!(29)).unwrap();
        assert!(store.slot(&p("persons.alice.age")).is_some());
        assert_eq!(store.to_json(), json!({"persons": {"alice": {"age": 29}}}));
    }

    #[test]
    fn put_below_a_value_is_a_conflict() {
        let store = ObjectStore::new();
        store.put(&p("a"), json!(5)).unwrap();
        let err = store.put(&p("a.b"), json!(1)).unwrap_err();
        assert!(matches!(err, StoreError::PathConflict { .. }));
        assert_eq!(store.get(&p("a")), Some(json!(5)));
    }

    #[test]
    fn delete_keeps_empty_parents() {
        let store = ObjectStore::new();
        store.put(&p("a.b.c"), json!(1)).unwrap();
        store.delete(&p("a.b.c"));

        assert_eq!(store.get(&p("a.b.c")), None);
        assert_eq!(store.get(&p("a.b")), Some(json!({})));
    }

    #[test]
    fn delete_of_missing_path_is_a_no_op() {
        let store = ObjectStore::new();
        store.put(&p("a"), json!(1)).unwrap();
        store.delete(&p("a.b.c"));
        store.delete(&p("zzz"));
        assert_eq!(store.to_json(), json!({"a": 1}));
    }

    #[test]
    fn null_and_delete_both_mean_absent() {
        let store = ObjectStore::new();
        store.put(&p("k.one"), json!(1)).unwrap();
        store.put(&p("k.two"), json!(2)).unwrap();

        store.put(&p("k.one"), Value::Null).unwrap();
        store.delete(&p("k.two"));

        assert!(!store.exists(&p("k.one")));
        assert!(!store.exists(&p("k.two")));
    }

    #[test]
    fn object_in_a_slot_is_addressable_below() {
        let store = ObjectStore::new();
        store
            .put(&p("persons"), json!({"john": {"id": "1", "name": "John"}}))
            .unwrap();
        let persons = store.slot(&p("persons")).unwrap();

        assert_eq!(store.get(&p("persons.john.id")), Some(json!("1")));
        assert_eq!(store.get(&p("persons.john.missing")), None);

        store.put(&p("persons.john.name"), json!("Johnny")).unwrap();
        assert_eq!(persons.read(), json!({"john": {"id": "1", "name": "Johnny"}}));

        store.delete(&p("persons.john"));
        assert!(!store.exists(&p("persons.john")));
        assert_eq!(store.get(&p("persons")), Some(json!({})));
        assert!(Rc::ptr_eq(&persons, &store.slot(&p("persons")).unwrap()));
    }

    #[test]
    fn write_below_a_slot_goes_through_its_accessor() {
        let store = ObjectStore::new();
        let cell = Rc::new(ValueCell::new(json!({"alice": {"age": 28}})));
        store.install(&p("persons"), cell.clone()).unwrap();

        store.put(&p("persons.alice.age"), json!(29)).unwrap();
        store.put(&p("persons.bob.age"), json!(40)).unwrap();

        assert_eq!(cell.writes(), 2);
        assert_eq!(store.get(&p("persons.alice.age")), Some(json!(29)));
        assert_eq!(
            cell.read(),
            json!({"alice": {"age": 29}, "bob": {"age": 40}})
        );
    }

    #[test]
    fn write_below_a_null_slot_starts_an_object() {
        let store = ObjectStore::new();
        store.put(&p("a"), Value::Null).unwrap();
        store.put(&p("a.b.c"), json!(1)).unwrap();
        assert_eq!(store.to_json(), json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn conflict_inside_a_slot_names_the_scalar() {
        let store = ObjectStore::new();
        store.put(&p("a"), json!({"b": 5})).unwrap();

        let err = store.put(&p("a.b.c"), json!(1)).unwrap_err();
        assert!(matches!(err, StoreError::PathConflict { ref at, .. } if at == "a.b"));
        assert_eq!(store.get(&p("a")), Some(json!({"b": 5})));
    }

    #[test]
    fn object_put_onto_a_mapping_keeps_installed_accessors() {
        let store = ObjectStore::new();
        let cell = Rc::new(ValueCell::new(json!(0)));
        store.install(&p("a.b.c"), cell.clone()).unwrap();

        store.put(&p("a.b"), json!({"c": 1, "d": 2})).unwrap();

        assert_eq!(cell.writes(), 1);
        assert_eq!(cell.read(), json!(1));
        let kept = store.slot(&p("a.b.c")).unwrap();
        assert!(Rc::ptr_eq(&kept, &(cell as Rc<dyn SlotAccess>)));
        assert_eq!(store.get(&p("a.b")), Some(json!({"c": 1, "d": 2})));
    }

    #[test]
    fn object_put_onto_a_mapping_drops_absent_keys() {
        let seed = json!({"persons": {"alice": {"id": "2", "nickname": "Al", "age": 28}}});
        let store = ObjectStore::from_json(seed.as_object().unwrap().clone());

        store
            .put(&p("persons.alice"), json!({"id": "2", "age": 29}))
            .unwrap();

        assert_eq!(store.get(&p("persons.alice")), Some(json!({"id": "2", "age": 29})));
        assert_eq!(store.get(&p("persons.alice.nickname")), None);
        assert!(store.slot(&p("persons.alice.age")).is_some());
    }
}

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::rc::Rc;
use store_crud::store::{
    HostStore, Mapping, Node, ObjectStore, Path, Resolution, StoreError, ValueCell, path,
};

fn p(s: &str) -> Path {
    Path::parse(s).unwrap()
}

#[test]
fn put_then_get_returns_the_value() {
    let samples = [
        ("a", json!(1)),
        ("a.b", json!("text")),
        ("x.y.z", json!({"nested": [1, 2, {"k": null}]})),
        ("flag", json!(false)),
    ];
    for (raw, value) in samples {
        let store = ObjectStore::new();
        store.put(&p(raw), value.clone()).unwrap();
        assert_eq!(store.get(&p(raw)), Some(value));
    }

    let store = ObjectStore::new();
    store.put(&p("persons.john"), json!({"id": "1"})).unwrap();
    store.put(&p("persons.john"), json!({"id": "1", "name": "John"})).unwrap();
    assert_eq!(store.get(&p("persons.john")), Some(json!({"id": "1", "name": "John"})));
}

#[test]
fn delete_makes_path_absent() {
    let store = ObjectStore::new();
    store.put(&p("persons.john"), json!({"id": "1"})).unwrap();
    store.delete(&p("persons.john"));

    assert_eq!(store.get(&p("persons.john")), None);
    assert!(!store.exists(&p("persons.john")));

    // deleting again, or deleting through a missing parent, is a no-op
    store.delete(&p("persons.john"));
    store.delete(&p("nowhere.at.all"));
    assert_eq!(store.to_json(), json!({"persons": {}}));
}

#[test]
fn null_write_and_delete_read_the_same() {
    let nulled = ObjectStore::new();
    let deleted = ObjectStore::new();
    for s in [&nulled, &deleted] {
        s.put(&p("persons.john"), json!({"id": "1"})).unwrap();
    }

    nulled.put(&p("persons.john"), Value::Null).unwrap();
    deleted.delete(&p("persons.john"));

    assert!(!nulled.exists(&p("persons.john")));
    assert!(!deleted.exists(&p("persons.john")));
}

#[test]
fn delete_reaches_into_a_put_object() {
    let store = ObjectStore::new();
    store
        .put(&p("persons"), json!({"john": {"id": "1"}, "jane": {"id": "2"}}))
        .unwrap();

    store.delete(&p("persons.john"));

    assert_eq!(store.get(&p("persons.john")), None);
    assert_eq!(store.get(&p("persons")), Some(json!({"jane": {"id": "2"}})));

    // nothing there to remove
    store.delete(&p("persons.john.id"));
    store.delete(&p("persons.jane.id.deeper"));
    assert_eq!(store.to_json(), json!({"persons": {"jane": {"id": "2"}}}));
}

#[test]
fn ensure_twice_builds_one_chain() {
    let mut root = Mapping::new();
    let target = p("a.b.c");
    path::ensure(&mut root, &target).unwrap();
    path::ensure(&mut root, &target).unwrap();

    assert_eq!(root.len(), 1);
    assert!(matches!(
        path::resolve(&root, &p("a.b")),
        Resolution::Found(Node::Map(m)) if m.is_empty()
    ));

    let store = ObjectStore::new();
    store.put(&target, json!(7)).unwrap();
    store.put(&target, json!(8)).unwrap();
    assert_eq!(store.get(&target), Some(json!(8)));
    assert_eq!(store.to_json(), json!({"a": {"b": {"c": 8}}}));
}

#[test]
fn writing_under_a_scalar_is_a_conflict() {
    let store = ObjectStore::new();
    store.put(&p("a"), json!(5)).unwrap();

    let err = store.put(&p("a.b"), json!(1)).unwrap_err();
    assert!(matches!(err, StoreError::PathConflict { ref at, .. } if at == "a"));
    assert_eq!(store.get(&p("a")), Some(json!(5)));
    assert_eq!(store.get(&p("a.b")), None);
}

#[test]
fn host_installed_slot_receives_later_puts() {
    let store = ObjectStore::new();
    let cell = Rc::new(ValueCell::new(json!(0)));
    store.install(&p("counter.value"), cell.clone()).unwrap();

    store.put(&p("counter.value"), json!(1)).unwrap();
    store.put(&p("counter.value"), json!(2)).unwrap();

    assert_eq!(cell.writes(), 2);
    assert_eq!(store.get(&p("counter.value")), Some(json!(2)));
}

#[test]
fn empty_paths_are_rejected() {
    assert!(Path::parse("").is_err());
    assert!(Path::parse("a..b").is_err());
    assert!(Path::parse(".a").is_err());
}

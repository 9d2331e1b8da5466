//! Read: `Idle -> Loaded` once the path holds a non-null value.
//! There is no write path.

use crate::crud::factory::CrudComponent;
use crate::crud::lifecycle::{self, Lifecycle, LifecycleState, Mode, Operation, Outcome};
use crate::render::Element;
use serde_json::Map;

pub struct ReadView {
    base: Lifecycle,
}

impl ReadView {
    /// Re-read the target path.
    pub fn refresh(&mut self) -> Outcome {
        self.base.load()
    }
}

impl CrudComponent for ReadView {
    const OPERATION: Operation = Operation::Read;

    fn from_lifecycle(base: Lifecycle) -> Self {
        Self { base }
    }

    fn state(&self) -> &LifecycleState {
        &self.base.state
    }

    fn mount(&mut self) -> Outcome {
        self.base.load()
    }

    fn enhance(&mut self, element: &Element) -> Outcome {
        match self.base.bind(element) {
            Some(_) => self.base.load(),
            None => Outcome::Ignored,
        }
    }

    fn cancel(&mut self) -> Outcome {
        self.base.notify_cancel()
    }

    fn render(&self) -> Element {
        let state = &self.base.state;
        let body = match (&state.current_data, state.mode) {
            (Some(data), Mode::Loaded) => {
                let values = data.as_object().cloned().unwrap_or_else(Map::new);
                vec![
                    self.base.summary(&values),
                    lifecycle::actions(vec![lifecycle::button("Close", "btn-secondary", "cancel")]),
                ]
            }
            _ => vec![lifecycle::no_data()],
        };
        self.base.shell("View Item", body)
    }
}

#[cfg(test)]
mod tests {
    use crate::crud::factory::{CrudComponent, crud};
    use crate::crud::lifecycle::{Mode, Outcome, Props};
    use crate::schema::BuiltinSchemas;
    use crate::store::{HostStore, ObjectStore, Path};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::cell::Cell;
    use std::rc::Rc;

    fn store_with_john() -> Rc<ObjectStore> {
        let seed = json!({"persons": {"john": {"id": "1", "name": "John Doe", "age": 40}}});
        Rc::new(ObjectStore::from_json(seed.as_object().cloned().unwrap()))
    }

    #[test]
    fn loads_existing_object() {
        let store = store_with_john();
        let factory = crud(Rc::new(BuiltinSchemas::standard()).handle("person"));
        let mut r = factory.get_read().instance(Props::at("persons.john"), Some(store));

        assert_eq!(r.mount(), Outcome::Moved(Mode::Loaded));
        assert_eq!(
            r.state().current_data,
            Some(json!({"id": "1", "name": "John Doe", "age": 40}))
        );

        let view = r.render();
        let text = view.text_content();
        assert!(text.contains("Name: John Doe"));
        assert!(text.contains("Email: -"));
    }

    #[test]
    fn null_and_missing_both_show_no_data() {
        let store = store_with_john();
        store.put(&Path::parse("persons.gone").unwrap(), Value::Null).unwrap();
        let factory = crud(Rc::new(BuiltinSchemas::standard()).handle("person"));

        for path in ["persons.gone", "persons.never"] {
            let mut r = factory.get_read().instance(Props::at(path), Some(store.clone()));
            assert_eq!(r.mount(), Outcome::Moved(Mode::Idle));
            assert_eq!(r.state().current_data, None);
            assert!(r.render().find_class("no-data").is_some());
        }
    }

    #[test]
    fn cancel_only_runs_the_callback() {
        let store = store_with_john();
        let before = store.to_json();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let factory = crud(Rc::new(BuiltinSchemas::standard()).handle("person"));
        let props = Props::at("persons.john").on_cancel(move || counter.set(counter.get() + 1));
        let mut r = factory.get_read().instance(props, Some(store.clone()));
        r.mount();

        assert_eq!(r.cancel(), Outcome::Cancelled);
        assert_eq!(calls.get(), 1);
        assert_eq!(store.to_json(), before);
        assert_eq!(r.state().mode, Mode::Loaded);
    }

    #[test]
    fn refresh_sees_later_writes() {
        let store = store_with_john();
        let factory = crud(Rc::new(BuiltinSchemas::standard()).handle("person"));
        let mut r = factory.get_read().instance(Props::at("persons.john"), Some(store.clone()));
        r.mount();

        store.delete(&Path::parse("persons.john").unwrap());
        assert_eq!(r.refresh(), Outcome::Moved(Mode::Idle));
    }
}

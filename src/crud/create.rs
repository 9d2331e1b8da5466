//! Create: `Idle -> Submitting -> Idle`.
//!
//! A rejected submission returns to `Idle` with the form kept and `errors`
//! set. A committed one clears the form and errors and reports the written
//! payload to `on_success`.

use crate::crud::factory::CrudComponent;
use crate::crud::lifecycle::{self, Lifecycle, LifecycleState, Mode, Operation, Outcome};
use crate::render::Element;
use serde_json::{Map, Value};

pub struct CreateForm {
    base: Lifecycle,
}

impl CreateForm {
    pub fn input(&mut self, field: &str, value: Value) -> Outcome {
        if self.base.state.mode != Mode::Idle {
            return Outcome::Ignored;
        }
        self.base.state.form.insert(field.to_string(), value);
        self.base.publish();
        Outcome::Moved(Mode::Idle)
    }

    /// Submit what has been typed into the form.
    pub fn submit(&mut self) -> Outcome {
        let payload = Value::Object(self.base.state.form.clone());
        self.submit_payload(payload)
    }

    pub fn submit_payload(&mut self, payload: Value) -> Outcome {
        if let Value::Object(obj) = &payload {
            self.base.state.form = obj.clone();
        }

        let written = match self.base.commit(payload, true) {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };

        self.reset_form();
        self.base.state.errors.clear();
        self.base.set_mode(Mode::Idle);
        self.base.notify_success(&written);
        Outcome::Committed(written)
    }

    fn reset_form(&mut self) {
        let mut form = Map::new();
        if let Ok(fields) = self.base.fields() {
            for field in fields.iter() {
                if let Some(default) = &field.default {
                    form.insert(field.name.clone(), default.clone());
                }
            }
        }
        self.base.state.form = form;
    }
}

impl CrudComponent for CreateForm {
    const OPERATION: Operation = Operation::Create;

    fn from_lifecycle(base: Lifecycle) -> Self {
        Self { base }
    }

    fn state(&self) -> &LifecycleState {
        &self.base.state
    }

    /// Start with an empty form pre-filled from field defaults.
    fn mount(&mut self) -> Outcome {
        self.reset_form();
        self.base.set_mode(Mode::Idle);
        Outcome::Moved(Mode::Idle)
    }

    /// Bind to an element carrying the store path, then pre-fill the form
    /// from whatever object already sits there. Nothing is written.
    fn enhance(&mut self, element: &Element) -> Outcome {
        if self.base.bind(element).is_none() {
            return Outcome::Ignored;
        }
        self.mount();

        let defaults = std::mem::take(&mut self.base.state.form);
        let loaded = self.base.load();
        let existing = std::mem::replace(&mut self.base.state.form, defaults);
        if loaded == Outcome::Moved(Mode::Loaded) {
            self.base.state.form.extend(existing);
        }

        // Create never shows a loaded view
        self.base.state.current_data = None;
        self.base.set_mode(Mode::Idle);
        match loaded {
            Outcome::Rejected(errors) => Outcome::Rejected(errors),
            _ => Outcome::Moved(Mode::Idle),
        }
    }

    fn cancel(&mut self) -> Outcome {
        if self.base.state.mode == Mode::Submitting {
            return Outcome::Ignored;
        }
        self.base.state.form.clear();
        self.base.state.errors.clear();
        self.base.publish();
        self.base.notify_cancel()
    }

    fn render(&self) -> Element {
        let form = Element::new("form")
            .attr("id", "create-form")
            .class("crud-form")
            .child(self.base.inputs(&self.base.state.form, true))
            .child(lifecycle::actions(vec![
                lifecycle::button("Submit", "btn-primary", "submit"),
                lifecycle::button("Cancel", "btn-secondary", "cancel"),
            ]));
        self.base.shell("Create New Item", vec![form])
    }
}

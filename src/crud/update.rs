//! Update: `Loaded -> Editing -> Submitting -> Loaded`.
//!
//! After a save the local data mirrors what was written; it is not re-read
//! from the store. Cancelling an edit restores the loaded values exactly.

use crate::crud::factory::CrudComponent;
use crate::crud::lifecycle::{self, Lifecycle, LifecycleState, Mode, Operation, Outcome};
use crate::render::Element;
use serde_json::Value;

pub struct UpdateForm {
    base: Lifecycle,
}

impl UpdateForm {
    /// Re-read the target path. Not allowed mid-edit.
    pub fn refresh(&mut self) -> Outcome {
        match self.base.state.mode {
            Mode::Idle | Mode::Loaded => self.base.load(),
            _ => Outcome::Ignored,
        }
    }

    /// Make the fields mutable.
    pub fn edit(&mut self) -> Outcome {
        if self.base.state.mode != Mode::Loaded {
            return Outcome::Ignored;
        }
        self.restore_form();
        self.base.set_mode(Mode::Editing);
        Outcome::Moved(Mode::Editing)
    }

    pub fn input(&mut self, field: &str, value: Value) -> Outcome {
        if self.base.state.mode != Mode::Editing {
            return Outcome::Ignored;
        }
        self.base.state.form.insert(field.to_string(), value);
        self.base.publish();
        Outcome::Moved(Mode::Editing)
    }

    /// Save the edited form.
    pub fn save(&mut self) -> Outcome {
        let payload = Value::Object(self.base.state.form.clone());
        self.save_payload(payload)
    }

    pub fn save_payload(&mut self, payload: Value) -> Outcome {
        if self.base.state.mode != Mode::Editing {
            return Outcome::Ignored;
        }
        if let Value::Object(obj) = &payload {
            self.base.state.form = obj.clone();
        }

        let written = match self.base.commit(payload, true) {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };

        self.base.state.current_data = Some(written.clone());
        self.restore_form();
        self.base.state.errors.clear();
        self.base.set_mode(Mode::Loaded);
        self.base.notify_success(&written);
        Outcome::Committed(written)
    }

    fn restore_form(&mut self) {
        self.base.state.form = self
            .base
            .state
            .current_data
            .as_ref()
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
    }
}

impl CrudComponent for UpdateForm {
    const OPERATION: Operation = Operation::Update;

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

    /// While editing: drop the edits and go back to read-only.
    /// Otherwise: hand control back to the caller.
    fn cancel(&mut self) -> Outcome {
        match self.base.state.mode {
            Mode::Editing => {
                self.restore_form();
                self.base.state.errors.clear();
                self.base.set_mode(Mode::Loaded);
                Outcome::Moved(Mode::Loaded)
            }
            Mode::Submitting => Outcome::Ignored,
            _ => self.base.notify_cancel(),
        }
    }

    fn render(&self) -> Element {
        let state = &self.base.state;
        if state.current_data.is_none() {
            return self.base.shell("Update Item", vec![lifecycle::no_data()]);
        }

        let editing = state.mode == Mode::Editing;
        let buttons = if editing {
            vec![
                lifecycle::button("Save", "btn-primary", "save"),
                lifecycle::button("Cancel Edit", "btn-secondary", "cancel"),
            ]
        } else {
            vec![
                lifecycle::button("Edit", "btn-primary", "edit"),
                lifecycle::button("Cancel", "btn-secondary", "cancel"),
            ]
        };

        let form = Element::new("form")
            .attr("id", "update-form")
            .class("crud-form")
            .child(self.base.inputs(&state.form, editing))
            .child(lifecycle::actions(buttons));
        self.base.shell("Update Item", vec![form])
    }
}

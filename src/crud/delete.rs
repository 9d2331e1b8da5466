//! Delete: `Loaded -> ConfirmPending -> Submitting -> Idle`.
//!
//! Confirming writes `null` to the target path; it is never validated.

use crate::crud::factory::CrudComponent;
use crate::crud::lifecycle::{self, Lifecycle, LifecycleState, Mode, Operation, Outcome};
use crate::render::Element;
use serde_json::{Map, Value};

const CONFIRM_WARNING: &str = "This action cannot be undone. Are you absolutely sure?";

pub struct DeleteView {
    base: Lifecycle,
}

impl DeleteView {
    pub fn refresh(&mut self) -> Outcome {
        match self.base.state.mode {
            Mode::Idle | Mode::Loaded => self.base.load(),
            _ => Outcome::Ignored,
        }
    }

    /// Ask for confirmation.
    pub fn request_delete(&mut self) -> Outcome {
        if self.base.state.mode != Mode::Loaded {
            return Outcome::Ignored;
        }
        self.base.set_mode(Mode::ConfirmPending);
        Outcome::Moved(Mode::ConfirmPending)
    }

    pub fn confirm(&mut self) -> Outcome {
        if self.base.state.mode != Mode::ConfirmPending {
            return Outcome::Ignored;
        }
        if let Err(outcome) = self.base.commit(Value::Null, false) {
            return outcome;
        }

        self.base.state.current_data = None;
        self.base.state.form.clear();
        self.base.state.errors.clear();
        self.base.set_mode(Mode::Idle);
        self.base.notify_success(&Value::Null);
        Outcome::Committed(Value::Null)
    }
}

impl CrudComponent for DeleteView {
    const OPERATION: Operation = Operation::Delete;

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

    /// Backs out of a pending confirmation; otherwise hands control back.
    fn cancel(&mut self) -> Outcome {
        match self.base.state.mode {
            Mode::ConfirmPending => {
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
        let Some(data) = &state.current_data else {
            return self.base.shell("Delete Item", vec![lifecycle::no_data()]);
        };
        let values = data.as_object().cloned().unwrap_or_else(Map::new);

        let body = if state.mode == Mode::ConfirmPending {
            vec![
                self.base.summary(&values),
                Element::new("p").class("delete-warning").text(CONFIRM_WARNING),
                lifecycle::actions(vec![
                    lifecycle::button("Yes, Delete", "btn-danger", "confirm"),
                    lifecycle::button("Cancel", "btn-secondary", "cancel"),
                ]),
            ]
        } else {
            vec![
                Element::new("p").text("Are you sure you want to delete this item?"),
                self.base.summary(&values),
                lifecycle::actions(vec![
                    lifecycle::button("Delete", "btn-danger", "request_delete"),
                    lifecycle::button("Cancel", "btn-secondary", "cancel"),
                ]),
            ]
        };
        self.base.shell("Delete Item", body)
    }
}

//! Shared lifecycle core for the four CRUD components.
//!
//! Each component instance owns one `Lifecycle`: its props, its injected
//! store handle and host context, and its private `LifecycleState`. The
//! variant modules (`create`, `read`, `update`, `delete`) drive transitions
//! through the helpers here.

use crate::crud::context::HostContext;
use crate::crud::factory::CrudConfig;
use crate::render::Element;
use crate::schema::{self, FieldList, GENERIC_FAILURE, SchemaError, Validation};
use crate::store::{HostStore, Path, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Attributes checked, in order, for a store path on an enhanced element.
pub const PATH_ATTRIBUTES: &[&str] = &["StorePath", "store-path", "data-store-path"];

pub const MISSING_PATH: &str = "store path not specified";

/// Context key holding a path bound by `enhance`.
const BOUND_PATH_KEY: &str = "path";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Idle,
    Loaded,
    Editing,
    ConfirmPending,
    Submitting,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Loaded => "loaded",
            Mode::Editing => "editing",
            Mode::ConfirmPending => "confirm_pending",
            Mode::Submitting => "submitting",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Private per-instance state. Never shared, even between instances that
/// target the same path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifecycleState {
    /// Data loaded from (or last written to) the store.
    pub current_data: Option<Value>,
    /// Field values being entered or edited.
    pub form: Map<String, Value>,
    /// Display-ready messages, in order.
    pub errors: Vec<String>,
    pub mode: Mode,
}

/// What a call did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A payload was written (`null` for a delete).
    Committed(Value),
    /// Nothing was written; the messages are now in `errors`.
    Rejected(Vec<String>),
    /// `on_cancel` ran.
    Cancelled,
    /// Local transition only.
    Moved(Mode),
    /// The call does not apply in the current mode.
    Ignored,
}

type SuccessFn = Box<dyn FnMut(&Value)>;
type CancelFn = Box<dyn FnMut()>;

/// Caller-supplied component inputs.
#[derive(Default)]
pub struct Props {
    pub path: Option<String>,
    on_success: Option<SuccessFn>,
    on_cancel: Option<CancelFn>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn on_success(mut self, f: impl FnMut(&Value) + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("path", &self.path)
            .field("on_success", &self.on_success.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .finish()
    }
}

/// State and collaborators behind one mounted component. Only the crate
/// can build one; components receive it through `CrudComponent`.
pub struct Lifecycle {
    operation: Operation,
    config: Rc<CrudConfig>,
    store: Option<Rc<dyn HostStore>>,
    context: Box<dyn HostContext>,
    props: Props,
    pub(crate) state: LifecycleState,
}

impl Lifecycle {
    pub(crate) fn new(
        operation: Operation,
        config: Rc<CrudConfig>,
        props: Props,
        store: Option<Rc<dyn HostStore>>,
        context: Box<dyn HostContext>,
    ) -> Self {
        Self {
            operation,
            config,
            store,
            context,
            props,
            state: LifecycleState::default(),
        }
    }

    pub(crate) fn fields(&self) -> Result<FieldList, SchemaError> {
        self.config.schema().fields()
    }

    /// Bound path (from `enhance`) wins over `props.path`.
    pub(crate) fn target(&self) -> Result<Path, String> {
        let bound = self.context.get_state(BOUND_PATH_KEY, Value::Null);
        let raw = match bound.as_str() {
            Some(p) => p.to_string(),
            None => self.props.path.clone().ok_or_else(|| MISSING_PATH.to_string())?,
        };
        Path::parse(&raw).map_err(|e| e.to_string())
    }

    fn store(&self) -> Result<Rc<dyn HostStore>, String> {
        self.store
            .clone()
            .ok_or_else(|| StoreError::StoreUnavailable.to_string())
    }

    /// Pick up the store path from an externally supplied element. Empty
    /// attributes are skipped.
    pub(crate) fn bind(&mut self, element: &Element) -> Option<String> {
        let path = PATH_ATTRIBUTES
            .iter()
            .find_map(|attr| element.attr_value(attr).filter(|v| !v.is_empty()))?
            .to_string();
        debug!(operation = %self.operation, path = %path, "bound path from element");
        self.context.set_state(BOUND_PATH_KEY, Value::String(path.clone()));
        Some(path)
    }

    /// Read the target path. Anything other than a non-null value means
    /// "no data" and leaves the instance `Idle`.
    pub(crate) fn load(&mut self) -> Outcome {
        let loaded = self.store().and_then(|store| {
            let path = self.target()?;
            Ok(store.get(&path))
        });

        match loaded {
            Ok(Some(value)) if !value.is_null() => {
                self.state.form = value.as_object().cloned().unwrap_or_default();
                self.state.current_data = Some(value);
                self.state.errors.clear();
                self.state.mode = Mode::Loaded;
            }
            Ok(_) => {
                self.state.current_data = None;
                self.state.form.clear();
                self.state.errors.clear();
                self.state.mode = Mode::Idle;
            }
            Err(msg) => {
                warn!(operation = %self.operation, error = %msg, "load aborted");
                self.state.errors = vec![msg];
                self.publish();
                return Outcome::Rejected(self.state.errors.clone());
            }
        }
        debug!(operation = %self.operation, mode = ?self.state.mode, "loaded");
        self.publish();
        Outcome::Moved(self.state.mode)
    }

    /// Run one commit: guard against overlap, validate (if asked), write.
    ///
    /// On any failure the instance returns to the mode it was in, keeps its
    /// data, and carries the messages in `errors`.
    pub(crate) fn commit(&mut self, payload: Value, check: bool) -> Result<Value, Outcome> {
        let prior = self.state.mode;
        if prior == Mode::Submitting {
            debug!(operation = %self.operation, "submission already in flight");
            return Err(Outcome::Ignored);
        }
        self.set_mode(Mode::Submitting);

        if check {
            let Validation { valid, errors } = schema::validate(self.config.schema(), &payload);
            if !valid {
                let errors = if errors.is_empty() {
                    vec![GENERIC_FAILURE.to_string()]
                } else {
                    errors
                };
                return Err(self.abort(prior, errors));
            }
        }

        let store = match self.store() {
            Ok(s) => s,
            Err(msg) => return Err(self.abort(prior, vec![msg])),
        };
        let path = match self.target() {
            Ok(p) => p,
            Err(msg) => return Err(self.abort(prior, vec![msg])),
        };
        if let Err(e) = store.put(&path, payload.clone()) {
            return Err(self.abort(prior, vec![e.to_string()]));
        }

        info!(operation = %self.operation, path = %path, "committed");
        Ok(payload)
    }

    fn abort(&mut self, prior: Mode, errors: Vec<String>) -> Outcome {
        debug!(operation = %self.operation, violations = errors.len(), "submission rejected");
        self.state.errors = errors;
        self.state.mode = prior;
        self.publish();
        Outcome::Rejected(self.state.errors.clone())
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        debug!(operation = %self.operation, from = ?self.state.mode, to = ?mode, "transition");
        self.state.mode = mode;
        self.publish();
    }

    pub(crate) fn notify_success(&mut self, payload: &Value) {
        if let Some(f) = self.props.on_success.as_mut() {
            f(payload);
        }
    }

    pub(crate) fn notify_cancel(&mut self) -> Outcome {
        if let Some(f) = self.props.on_cancel.as_mut() {
            f();
        }
        Outcome::Cancelled
    }

    /// Mirror the instance state into the host context.
    pub(crate) fn publish(&mut self) {
        let data = self.state.current_data.clone().unwrap_or(Value::Null);
        self.context.set_state("mode", json!(self.state.mode));
        self.context.set_state("data", data);
        self.context.set_state("form", Value::Object(self.state.form.clone()));
        self.context.set_state("errors", json!(self.state.errors));
    }

    // -------------------------------------------------------------------
    // Render helpers
    // -------------------------------------------------------------------

    /// Outer container: class, title, and the error list when non-empty.
    pub(crate) fn shell(&self, title: &str, body: Vec<Element>) -> Element {
        let mut root = Element::new("div")
            .class(format!("crud-component crud-{}", self.operation))
            .attr("data-mode", self.state.mode.as_str())
            .child(Element::new("h2").text(title));

        if !self.state.errors.is_empty() {
            root = root.child(
                Element::new("div")
                    .class("error-messages")
                    .children(
                        self.state
                            .errors
                            .iter()
                            .map(|e| Element::new("p").class("error").text(e)),
                    ),
            );
        }
        root.children(body)
    }

    /// One labelled input per field, filled from `values`.
    pub(crate) fn inputs(&self, values: &Map<String, Value>, editable: bool) -> Element {
        let container = Element::new("div").class("form-fields");
        let fields = match self.fields() {
            Ok(f) => f,
            Err(e) => return container.child(Element::new("p").class("error").text(e.to_string())),
        };

        container.children(fields.iter().map(|field| {
            let label = if field.required {
                format!("{} *", field.display_label())
            } else {
                field.display_label().to_string()
            };
            let value = values.get(&field.name).map(display_value).unwrap_or_default();

            let input = match field.kind.input_type() {
                None => Element::new("textarea").text(value),
                Some(kind) => Element::new("input").attr("type", kind).attr("value", value),
            }
            .attr("id", field.name.clone())
            .attr("name", field.name.clone())
            .class("form-input")
            .flag("required", field.required)
            .flag("disabled", !editable);

            Element::new("div")
                .class("form-field")
                .child(Element::new("label").attr("for", field.name.clone()).text(label))
                .child(input)
        }))
    }

    /// Read-only `Label: value` rows.
    pub(crate) fn summary(&self, values: &Map<String, Value>) -> Element {
        let container = Element::new("div").class("data-display");
        let fields = match self.fields() {
            Ok(f) => f,
            Err(e) => return container.child(Element::new("p").class("error").text(e.to_string())),
        };

        container.children(fields.iter().map(|field| {
            let value = values
                .get(&field.name)
                .map(display_value)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "-".to_string());
            Element::new("div")
                .class("preview-field")
                .child(Element::new("strong").text(format!("{}: ", field.display_label())))
                .child(Element::new("span").text(value))
        }))
    }
}

pub(crate) fn button(label: &str, class: &str, action: &str) -> Element {
    let kind = if action == "submit" || action == "save" { "submit" } else { "button" };
    Element::new("button")
        .attr("type", kind)
        .attr("data-action", action)
        .class(format!("btn {}", class))
        .text(label)
}

pub(crate) fn actions(buttons: Vec<Element>) -> Element {
    Element::new("div").class("form-actions").children(buttons)
}

pub(crate) fn no_data() -> Element {
    Element::new("p").class("no-data").text("No data available")
}

/// Strings without quotes, everything else as JSON text.
fn display_value(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! Scripted sessions: mount a set of components against one store and drive
//! them through a list of user actions.
//!
//! JSON shape:
//! {
//!   "title": "Person admin",        // optional, used for the HTML page
//!   "schema": "person",             // BuiltinSchemas identifier
//!   "mounts": [
//!     { "name": "edit", "operation": "update", "path": "persons.alice" },
//!     { "name": "view", "operation": "read", "path": "persons.bob", "enhance": true }
//!   ],
//!   "steps": [
//!     { "target": "edit", "action": "edit" },
//!     { "target": "edit", "action": "input", "field": "age", "value": 29 },
//!     { "target": "edit", "action": "save" }
//!   ]
//! }
//!
//! With `enhance` the path is handed over as a `data-store-path` attribute on
//! an element instead of through props.

use crate::crud::{Component, MemoryContext, Operation, Outcome, Props, crud};
use crate::render::Element;
use crate::schema::BuiltinSchemas;
use crate::store::HostStore;
use anyhow::{Context, bail};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::rc::Rc;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub title: Option<String>,

    pub schema: String,

    #[serde(default)]
    pub mounts: Vec<MountSpec>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MountSpec {
    pub name: String,
    pub operation: Operation,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub enhance: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub target: String,

    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Mount,
    Refresh,
    Input { field: String, value: Value },
    Submit,
    SubmitPayload { payload: Value },
    Edit,
    Save,
    SavePayload { payload: Value },
    RequestDelete,
    Confirm,
    Cancel,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Mount => "mount",
            Action::Refresh => "refresh",
            Action::Input { .. } => "input",
            Action::Submit => "submit",
            Action::SubmitPayload { .. } => "submit_payload",
            Action::Edit => "edit",
            Action::Save => "save",
            Action::SavePayload { .. } => "save_payload",
            Action::RequestDelete => "request_delete",
            Action::Confirm => "confirm",
            Action::Cancel => "cancel",
        }
    }
}

/// What a finished session leaves behind.
#[derive(Debug)]
pub struct SessionReport {
    pub title: String,
    /// One line per step, in order.
    pub lines: Vec<String>,
    /// Final render description of every mounted component, in mount order.
    pub views: Vec<(String, Element)>,
}

pub fn load_session(path: &str) -> anyhow::Result<Session> {
    let text = fs::read_to_string(path).with_context(|| format!("read session file {}", path))?;
    let session: Session =
        serde_json::from_str(&text).with_context(|| format!("parse session file {}", path))?;
    Ok(session)
}

impl Session {
    /// Reject sessions that could not run to completion.
    pub fn validate(&self, schemas: &BuiltinSchemas) -> anyhow::Result<()> {
        if !schemas.contains(&self.schema) {
            bail!("session names unknown schema: {}", self.schema);
        }

        let mut names = HashSet::new();
        for mount in &self.mounts {
            if !names.insert(mount.name.as_str()) {
                bail!("duplicate mount name in session: {}", mount.name);
            }
            if mount.enhance && mount.path.is_none() {
                bail!("mount {} sets enhance but has no path", mount.name);
            }
        }

        for (i, step) in self.steps.iter().enumerate() {
            if !names.contains(step.target.as_str()) {
                bail!("step {} targets unknown mount {}", i + 1, step.target);
            }
        }
        Ok(())
    }

    pub fn run(
        &self,
        schemas: Rc<BuiltinSchemas>,
        store: Rc<dyn HostStore>,
    ) -> anyhow::Result<SessionReport> {
        self.validate(&schemas)?;

        let factory = crud(schemas.handle(&self.schema));
        let mut mounted: Vec<(String, Component)> = Vec::new();

        for spec in &self.mounts {
            let props = match (&spec.path, spec.enhance) {
                (Some(path), false) => Props::at(path.clone()),
                _ => Props::new(),
            };
            let mut component = factory.component(
                spec.operation,
                props,
                Some(Rc::clone(&store)),
                Box::new(MemoryContext::new()),
            );

            let outcome = match (&spec.path, spec.enhance) {
                (Some(path), true) => {
                    let host = Element::new("div").attr("data-store-path", path.clone());
                    component.enhance(&host)
                }
                _ => component.mount(),
            };
            debug!(mount = %spec.name, operation = %spec.operation, outcome = ?outcome, "mounted");
            mounted.push((spec.name.clone(), component));
        }

        let mut lines = Vec::with_capacity(self.steps.len());
        for (i, step) in self.steps.iter().enumerate() {
            let (_, component) = mounted
                .iter_mut()
                .find(|(name, _)| *name == step.target)
                .with_context(|| format!("step {} targets unknown mount {}", i + 1, step.target))?;

            let outcome = apply(component, &step.action)
                .with_context(|| format!("step {} ({})", i + 1, step.target))?;
            let line = format!(
                "{:>3} {}.{}: {}",
                i + 1,
                step.target,
                step.action.name(),
                describe(&outcome)
            );
            info!(step = i + 1, mount = %step.target, "{}", line.trim_start());
            lines.push(line);
        }

        Ok(SessionReport {
            title: self.title.clone().unwrap_or_else(|| format!("{} session", self.schema)),
            lines,
            views: mounted.into_iter().map(|(name, c)| (name, c.render())).collect(),
        })
    }
}

/// Route one action to the variant that supports it.
fn apply(component: &mut Component, action: &Action) -> anyhow::Result<Outcome> {
    let outcome = match (component, action) {
        (c, Action::Mount) => c.mount(),
        (c, Action::Cancel) => c.cancel(),

        (Component::Read(c), Action::Refresh) => c.refresh(),
        (Component::Update(c), Action::Refresh) => c.refresh(),
        (Component::Delete(c), Action::Refresh) => c.refresh(),

        (Component::Create(c), Action::Input { field, value }) => c.input(field, value.clone()),
        (Component::Create(c), Action::Submit) => c.submit(),
        (Component::Create(c), Action::SubmitPayload { payload }) => {
            c.submit_payload(payload.clone())
        }

        (Component::Update(c), Action::Edit) => c.edit(),
        (Component::Update(c), Action::Input { field, value }) => c.input(field, value.clone()),
        (Component::Update(c), Action::Save) => c.save(),
        (Component::Update(c), Action::SavePayload { payload }) => c.save_payload(payload.clone()),

        (Component::Delete(c), Action::RequestDelete) => c.request_delete(),
        (Component::Delete(c), Action::Confirm) => c.confirm(),

        (c, a) => bail!("{} component does not support {}", c.operation(), a.name()),
    };
    Ok(outcome)
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Committed(Value::Null) => "committed (removed)".to_string(),
        Outcome::Committed(v) => format!("committed {}", v),
        Outcome::Rejected(errors) => format!("rejected: {}", errors.join("; ")),
        Outcome::Cancelled => "cancelled".to_string(),
        Outcome::Moved(mode) => format!("-> {}", mode),
        Outcome::Ignored => "ignored".to_string(),
    }
}

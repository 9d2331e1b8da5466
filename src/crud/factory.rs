//! Binds one schema handle to the four CRUD component definitions.
//!
//! A `CrudFactory` owns the immutable `CrudConfig` behind an `Rc`; every
//! `ComponentDef` it hands out shares that config, while every instance made
//! from a definition gets its own `LifecycleState`.

use crate::crud::context::{HostContext, MemoryContext};
use crate::crud::create::CreateForm;
use crate::crud::delete::DeleteView;
use crate::crud::lifecycle::{Lifecycle, LifecycleState, Operation, Outcome, Props};
use crate::crud::read::ReadView;
use crate::crud::update::UpdateForm;
use crate::render::Element;
use crate::schema::SchemaHandle;
use crate::store::HostStore;
use std::marker::PhantomData;
use std::rc::Rc;
use tracing::debug;

/// Shared, read-only configuration for every component of one factory.
#[derive(Debug)]
pub struct CrudConfig {
    schema: SchemaHandle,
}

impl CrudConfig {
    pub fn new(schema: SchemaHandle) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &SchemaHandle {
        &self.schema
    }
}

/// Operations every generated component supports.
pub trait CrudComponent: Sized {
    const OPERATION: Operation;

    #[doc(hidden)]
    fn from_lifecycle(base: Lifecycle) -> Self;

    fn state(&self) -> &LifecycleState;

    /// Load whatever the component needs from its target path.
    fn mount(&mut self) -> Outcome;

    /// Bind to an element carrying a store path attribute, then load.
    fn enhance(&mut self, element: &Element) -> Outcome;

    fn cancel(&mut self) -> Outcome;

    /// Render description for the current state.
    fn render(&self) -> Element;
}

/// An instantiable component definition.
pub struct ComponentDef<C> {
    config: Rc<CrudConfig>,
    _component: PhantomData<fn() -> C>,
}

impl<C> Clone for ComponentDef<C> {
    fn clone(&self) -> Self {
        Self {
            config: Rc::clone(&self.config),
            _component: PhantomData,
        }
    }
}

impl<C: CrudComponent> ComponentDef<C> {
    pub fn config(&self) -> &Rc<CrudConfig> {
        &self.config
    }

    /// New instance with a private in-memory host context.
    pub fn instance<S>(&self, props: Props, store: Option<Rc<S>>) -> C
    where
        S: HostStore + 'static,
    {
        let store = store.map(|s| s as Rc<dyn HostStore>);
        self.instance_with_context(props, store, Box::new(MemoryContext::new()))
    }

    /// New instance wired to a host-supplied context.
    pub fn instance_with_context(
        &self,
        props: Props,
        store: Option<Rc<dyn HostStore>>,
        context: Box<dyn HostContext>,
    ) -> C {
        debug!(operation = %C::OPERATION, path = ?props.path, "new component instance");
        C::from_lifecycle(Lifecycle::new(
            C::OPERATION,
            Rc::clone(&self.config),
            props,
            store,
            context,
        ))
    }

    /// Instantiate and mount in one step.
    pub fn mount<S>(&self, props: Props, store: Option<Rc<S>>) -> C
    where
        S: HostStore + 'static,
    {
        let mut component = self.instance(props, store);
        component.mount();
        component
    }
}

pub struct CrudFactory {
    config: Rc<CrudConfig>,
}

/// Build the four component definitions around `schema`.
pub fn crud(schema: SchemaHandle) -> CrudFactory {
    debug!(schema = schema.identifier(), "crud factory created");
    CrudFactory {
        config: Rc::new(CrudConfig::new(schema)),
    }
}

impl CrudFactory {
    pub fn config(&self) -> &Rc<CrudConfig> {
        &self.config
    }

    pub fn get_create(&self) -> ComponentDef<CreateForm> {
        self.def()
    }

    pub fn get_read(&self) -> ComponentDef<ReadView> {
        self.def()
    }

    pub fn get_update(&self) -> ComponentDef<UpdateForm> {
        self.def()
    }

    pub fn get_delete(&self) -> ComponentDef<DeleteView> {
        self.def()
    }

    /// Instance of whichever variant `operation` names.
    pub fn component(
        &self,
        operation: Operation,
        props: Props,
        store: Option<Rc<dyn HostStore>>,
        context: Box<dyn HostContext>,
    ) -> Component {
        match operation {
            Operation::Create => {
                Component::Create(self.get_create().instance_with_context(props, store, context))
            }
            Operation::Read => {
                Component::Read(self.get_read().instance_with_context(props, store, context))
            }
            Operation::Update => {
                Component::Update(self.get_update().instance_with_context(props, store, context))
            }
            Operation::Delete => {
                Component::Delete(self.get_delete().instance_with_context(props, store, context))
            }
        }
    }

    fn def<C>(&self) -> ComponentDef<C> {
        ComponentDef {
            config: Rc::clone(&self.config),
            _component: PhantomData,
        }
    }
}

/// Any one of the four variants, for hosts that pick the operation at runtime.
pub enum Component {
    Create(CreateForm),
    Read(ReadView),
    Update(UpdateForm),
    Delete(DeleteView),
}

macro_rules! dispatch {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            Component::Create($c) => $body,
            Component::Read($c) => $body,
            Component::Update($c) => $body,
            Component::Delete($c) => $body,
        }
    };
}

impl Component {
    pub fn operation(&self) -> Operation {
        match self {
            Component::Create(_) => CreateForm::OPERATION,
            Component::Read(_) => ReadView::OPERATION,
            Component::Update(_) => UpdateForm::OPERATION,
            Component::Delete(_) => DeleteView::OPERATION,
        }
    }

    pub fn state(&self) -> &LifecycleState {
        dispatch!(self, c => c.state())
    }

    pub fn mount(&mut self) -> Outcome {
        dispatch!(self, c => c.mount())
    }

    pub fn enhance(&mut self, element: &Element) -> Outcome {
        dispatch!(self, c => c.enhance(element))
    }

    pub fn cancel(&mut self) -> Outcome {
        dispatch!(self, c => c.cancel())
    }

    pub fn render(&self) -> Element {
        dispatch!(self, c => c.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::lifecycle::Mode;
    use crate::schema::BuiltinSchemas;
    use crate::store::{ObjectStore, Path};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store() -> Rc<ObjectStore> {
        let seed = json!({"persons": {"john": {"id": "1", "name": "John Doe"}}});
        Rc::new(ObjectStore::from_json(seed.as_object().cloned().unwrap()))
    }

    #[test]
    fn definitions_share_one_config() {
        let factory = crud(Rc::new(BuiltinSchemas::standard()).handle("person"));
        let a = factory.get_update();
        let b = factory.get_update();
        let c = factory.get_delete();

        assert!(Rc::ptr_eq(a.config(), b.config()));
        assert!(Rc::ptr_eq(a.config(), c.config()));
        assert!(Rc::ptr_eq(a.config(), factory.config()));
    }

    #[test]
    fn instances_keep_separate_state() {
        let store = store();
        let factory = crud(Rc::new(BuiltinSchemas::standard()).handle("person"));
        let def = factory.get_update();
        let mut first = def.mount(Props::at("persons.john"), Some(store.clone()));
        let second = def.mount(Props::at("persons.john"), Some(store));

        first.edit();
        first.input("name", json!("Johnny"));

        assert_eq!(first.state().mode, Mode::Editing);
        assert_eq!(second.state().mode, Mode::Loaded);
        assert_eq!(second.state().form.get("name"), Some(&json!("John Doe")));
    }

    #[test]
    fn schema_loads_once_across_components() {
        let store = store();
        let factory = crud(Rc::new(BuiltinSchemas::standard()).handle("person"));
        let mut create = factory.get_create().instance(Props::at("persons.x"), Some(store.clone()));
        let mut update = factory.get_update().mount(Props::at("persons.john"), Some(store));

        create.submit_payload(json!({"name": "X"}));
        update.edit();
        update.save();
        create.render();

        assert_eq!(factory.config().schema().load_count(), 1);
    }

    #[test]
    fn component_enum_dispatches_by_operation() {
        let store: Rc<dyn HostStore> = store();
        let factory = crud(Rc::new(BuiltinSchemas::standard()).handle("person"));
        let mut c = factory.component(
            Operation::Read,
            Props::at("persons.john"),
            Some(store.clone()),
            Box::new(MemoryContext::new()),
        );

        assert_eq!(c.operation(), Operation::Read);
        assert_eq!(c.mount(), Outcome::Moved(Mode::Loaded));
        assert!(c.render().has_class("crud-read"));
        assert!(store.exists(&Path::parse("persons.john").unwrap()));
    }
}

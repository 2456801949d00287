//! Per-entity configuration bundles consumed by the orchestrators

use crate::context::Context;
use crate::error::{EngineError, Operation, Result, Step};
use crate::hooks::{EntityHook, PreReadHook, SchemaHook, UpdateHook};
use crate::state::ResourceData;
use crate::task::RemoteTask;
use futures_util::future::BoxFuture;

/// Default desired-state field used as the lookup key
pub const DEFAULT_NAME_FIELD: &str = "name";

const FALLBACK_LABEL: &str = "entity";

/// Builds the wire payload from desired state
pub type PayloadBuilder<C, I> =
    Box<dyn Fn(&Context<C>, &ResourceData) -> Result<I> + Send + Sync>;

/// Copies handle fields into local state; must be idempotent
pub type StateWriter<C, O> =
    Box<dyn Fn(&Context<C>, &mut ResourceData, &O) -> Result<()> + Send + Sync>;

/// Synchronous creation: returns the created handle
pub type Creator<C, O, I> =
    Box<dyn for<'a> Fn(&'a Context<C>, I) -> BoxFuture<'a, Result<O>> + Send + Sync>;

/// Asynchronous creation: returns a task to wait on
pub type AsyncCreator<C, I> = Box<
    dyn for<'a> Fn(&'a Context<C>, I) -> BoxFuture<'a, Result<Box<dyn RemoteTask>>> + Send + Sync,
>;

/// Retrieves a handle by identifier or name; signals absence with `EngineError::NotFound`
pub type Fetcher<C, O> =
    Box<dyn for<'a> Fn(&'a Context<C>, &'a str) -> BoxFuture<'a, Result<O>> + Send + Sync>;

/// Read invoked after a successful create or update
pub type ReadBack<C> = Box<
    dyn for<'a> Fn(&'a Context<C>, &'a mut ResourceData) -> BoxFuture<'a, Result<()>> + Send + Sync,
>;

/// Everything the create/read/update/delete orchestrators need for one entity type
///
/// Built fresh for each call and consumed by it.
///
/// ```ignore
/// let config = EntityConfig::new("VDC group")
///     .payload(|_ctx, data| build_vdc_group(data))
///     .state_writer(|_ctx, data, group: &VdcGroup| group.write_to(data))
///     .create_async(|ctx, payload| ctx.client().clone().create_vdc_group(payload).boxed())
///     .fetch(|ctx, id| ctx.client().get_vdc_group(id).boxed());
/// create_resource(&ctx, &mut data, config).await?;
/// ```
pub struct EntityConfig<C, O, I> {
    label: String,
    pub(crate) payload_builder: Option<PayloadBuilder<C, I>>,
    pub(crate) state_writer: Option<StateWriter<C, O>>,
    pub(crate) creator: Option<Creator<C, O, I>>,
    pub(crate) async_creator: Option<AsyncCreator<C, I>>,
    pub(crate) fetcher: Option<Fetcher<C, O>>,
    pub(crate) read_back: Option<ReadBack<C>>,
    pub(crate) pre_create_hooks: Vec<SchemaHook<C>>,
    pub(crate) post_create_hooks: Vec<EntityHook<C, O>>,
    pub(crate) pre_update_hooks: Vec<UpdateHook<C, O, I>>,
    pub(crate) pre_delete_hooks: Vec<EntityHook<C, O>>,
    pub(crate) read_hooks: Vec<EntityHook<C, O>>,
}

impl<C, O, I> EntityConfig<C, O, I> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload_builder: None,
            state_writer: None,
            creator: None,
            async_creator: None,
            fetcher: None,
            read_back: None,
            pre_create_hooks: Vec::new(),
            post_create_hooks: Vec::new(),
            pre_update_hooks: Vec::new(),
            pre_delete_hooks: Vec::new(),
            read_hooks: Vec::new(),
        }
    }

    /// Label used in every diagnostic message
    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            FALLBACK_LABEL
        } else {
            &self.label
        }
    }

    pub fn payload<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<C>, &ResourceData) -> Result<I> + Send + Sync + 'static,
    {
        self.payload_builder = Some(Box::new(f));
        self
    }

    pub fn state_writer<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<C>, &mut ResourceData, &O) -> Result<()> + Send + Sync + 'static,
    {
        self.state_writer = Some(Box::new(f));
        self
    }

    pub fn create<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a Context<C>, I) -> BoxFuture<'a, Result<O>> + Send + Sync + 'static,
    {
        self.creator = Some(Box::new(f));
        self
    }

    pub fn create_async<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a Context<C>, I) -> BoxFuture<'a, Result<Box<dyn RemoteTask>>>
            + Send
            + Sync
            + 'static,
    {
        self.async_creator = Some(Box::new(f));
        self
    }

    pub fn fetch<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a Context<C>, &'a str) -> BoxFuture<'a, Result<O>> + Send + Sync + 'static,
    {
        self.fetcher = Some(Box::new(f));
        self
    }

    pub fn read_back<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a Context<C>, &'a mut ResourceData) -> BoxFuture<'a, Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.read_back = Some(Box::new(f));
        self
    }

    pub fn pre_create_hook<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a Context<C>, &'a ResourceData) -> BoxFuture<'a, Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.pre_create_hooks.push(Box::new(f));
        self
    }

    pub fn post_create_hook<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a Context<C>, &'a O) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        self.post_create_hooks.push(Box::new(f));
        self
    }

    pub fn pre_update_hook<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a Context<C>, &'a ResourceData, &'a O, &'a mut I) -> BoxFuture<'a, Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.pre_update_hooks.push(Box::new(f));
        self
    }

    pub fn pre_delete_hook<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a Context<C>, &'a O) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        self.pre_delete_hooks.push(Box::new(f));
        self
    }

    pub fn read_hook<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a Context<C>, &'a O) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        self.read_hooks.push(Box::new(f));
        self
    }

    /// Checks that must pass before Create touches anything
    pub(crate) fn validate_for_create(&self) -> Result<()> {
        match (&self.creator, &self.async_creator) {
            (Some(_), Some(_)) => {
                return Err(self.invalid(
                    Operation::Create,
                    "both a synchronous and an asynchronous creator are set",
                ));
            }
            (None, None) => {
                return Err(self.invalid(Operation::Create, "no creator function is set"));
            }
            (None, Some(_)) if self.fetcher.is_none() => {
                return Err(self.invalid(
                    Operation::Create,
                    "asynchronous creation requires a fetcher",
                ));
            }
            _ => {}
        }
        self.require_payload_builder(Operation::Create)?;
        self.require_state_writer(Operation::Create)?;
        Ok(())
    }

    pub(crate) fn require_payload_builder(
        &self,
        operation: Operation,
    ) -> Result<&PayloadBuilder<C, I>> {
        self.payload_builder
            .as_ref()
            .ok_or_else(|| self.invalid(operation, "no payload builder is set"))
    }

    pub(crate) fn require_state_writer(&self, operation: Operation) -> Result<&StateWriter<C, O>> {
        self.state_writer
            .as_ref()
            .ok_or_else(|| self.invalid(operation, "no state writer is set"))
    }

    pub(crate) fn require_fetcher(&self, operation: Operation) -> Result<&Fetcher<C, O>> {
        self.fetcher
            .as_ref()
            .ok_or_else(|| self.invalid(operation, "no fetcher is set"))
    }

    fn invalid(&self, operation: Operation, message: &str) -> EngineError {
        EngineError::invalid_config(message).within(self.label(), operation, Step::Validate)
    }
}

/// Configuration for read-only entities that are only ever looked up by name
pub struct LookupConfig<C, O> {
    label: String,
    name_field: Option<String>,
    pub(crate) fetcher: Option<Fetcher<C, O>>,
    pub(crate) state_writer: Option<StateWriter<C, O>>,
    pub(crate) pre_read_hooks: Vec<PreReadHook<C>>,
}

impl<C, O> LookupConfig<C, O> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            name_field: None,
            fetcher: None,
            state_writer: None,
            pre_read_hooks: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            FALLBACK_LABEL
        } else {
            &self.label
        }
    }

    /// Use a different desired-state field than `name` as the lookup key
    pub fn name_field(mut self, field: impl Into<String>) -> Self {
        self.name_field = Some(field.into());
        self
    }

    pub fn lookup_field(&self) -> &str {
        self.name_field.as_deref().unwrap_or(DEFAULT_NAME_FIELD)
    }

    pub fn fetch<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a Context<C>, &'a str) -> BoxFuture<'a, Result<O>> + Send + Sync + 'static,
    {
        self.fetcher = Some(Box::new(f));
        self
    }

    pub fn state_writer<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<C>, &mut ResourceData, &O) -> Result<()> + Send + Sync + 'static,
    {
        self.state_writer = Some(Box::new(f));
        self
    }

    pub fn pre_read_hook<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a Context<C>, &'a ResourceData) -> BoxFuture<'a, Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.pre_read_hooks.push(Box::new(f));
        self
    }

    pub(crate) fn validate(&self) -> Result<(&Fetcher<C, O>, &StateWriter<C, O>)> {
        let invalid = |message: &str| {
            EngineError::invalid_config(message).within(
                self.label(),
                Operation::Lookup,
                Step::Validate,
            )
        };
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or_else(|| invalid("no fetcher is set"))?;
        let state_writer = self
            .state_writer
            .as_ref()
            .ok_or_else(|| invalid("no state writer is set"))?;
        Ok((fetcher, state_writer))
    }
}

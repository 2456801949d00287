//! Hook shapes and the runners shared by every orchestrator
//!
//! All runners follow the same rule: hooks execute in declaration order, the
//! first failure is wrapped with the entity label and hook position and
//! aborts the rest of the list. An empty list succeeds immediately.

use crate::context::Context;
use crate::error::{Operation, Result, Step};
use crate::state::ResourceData;
use futures_util::future::BoxFuture;

/// Hook that sees only the context and the local state (pre-create)
pub type SchemaHook<C> = Box<
    dyn for<'a> Fn(&'a Context<C>, &'a ResourceData) -> BoxFuture<'a, Result<()>> + Send + Sync,
>;

/// Schema-level hook run before a lookup fetch
pub type PreReadHook<C> = SchemaHook<C>;

/// Hook given a live entity handle (post-create, read, pre-delete)
pub type EntityHook<C, O> =
    Box<dyn for<'a> Fn(&'a Context<C>, &'a O) -> BoxFuture<'a, Result<()>> + Send + Sync>;

/// Pre-update hook: local state, the current handle and the new payload
///
/// The payload is mutable so a hook can carry server-managed fields forward
/// before submission.
pub type UpdateHook<C, O, I> = Box<
    dyn for<'a> Fn(&'a Context<C>, &'a ResourceData, &'a O, &'a mut I) -> BoxFuture<'a, Result<()>>
        + Send
        + Sync,
>;

/// Box a closure as a [`SchemaHook`]
///
/// Closures returning a future that borrows their arguments need this (or a
/// builder method) so the compiler ties the future to the argument lifetime.
pub fn schema_hook<C, F>(f: F) -> SchemaHook<C>
where
    F: for<'a> Fn(&'a Context<C>, &'a ResourceData) -> BoxFuture<'a, Result<()>>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

/// Box a closure as an [`EntityHook`]
pub fn entity_hook<C, O, F>(f: F) -> EntityHook<C, O>
where
    F: for<'a> Fn(&'a Context<C>, &'a O) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
{
    Box::new(f)
}

/// Box a closure as an [`UpdateHook`]
pub fn update_hook<C, O, I, F>(f: F) -> UpdateHook<C, O, I>
where
    F: for<'a> Fn(&'a Context<C>, &'a ResourceData, &'a O, &'a mut I) -> BoxFuture<'a, Result<()>>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

/// Where a hook list runs, for error wrapping and logging
#[derive(Debug, Clone, Copy)]
pub(crate) struct HookSite<'s> {
    pub label: &'s str,
    pub operation: Operation,
    pub step: fn(usize) -> Step,
}

impl HookSite<'_> {
    fn step_at(&self, index: usize) -> Step {
        (self.step)(index + 1)
    }
}

pub(crate) async fn run_schema_hooks<C>(
    site: HookSite<'_>,
    hooks: &[SchemaHook<C>],
    ctx: &Context<C>,
    data: &ResourceData,
) -> Result<()> {
    for (index, hook) in hooks.iter().enumerate() {
        let step = site.step_at(index);
        tracing::debug!(entity = site.label, %step, "Running hook");
        hook(ctx, data)
            .await
            .map_err(|e| e.within(site.label, site.operation, step))?;
    }
    Ok(())
}

pub(crate) async fn run_entity_hooks<C, O>(
    site: HookSite<'_>,
    hooks: &[EntityHook<C, O>],
    ctx: &Context<C>,
    entity: &O,
) -> Result<()> {
    for (index, hook) in hooks.iter().enumerate() {
        let step = site.step_at(index);
        tracing::debug!(entity = site.label, %step, "Running hook");
        hook(ctx, entity)
            .await
            .map_err(|e| e.within(site.label, site.operation, step))?;
    }
    Ok(())
}

pub(crate) async fn run_update_hooks<C, O, I>(
    site: HookSite<'_>,
    hooks: &[UpdateHook<C, O, I>],
    ctx: &Context<C>,
    data: &ResourceData,
    entity: &O,
    payload: &mut I,
) -> Result<()> {
    for (index, hook) in hooks.iter().enumerate() {
        let step = site.step_at(index);
        tracing::debug!(entity = site.label, %step, "Running hook");
        hook(ctx, data, entity, payload)
            .await
            .map_err(|e| e.within(site.label, site.operation, step))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use futures_util::FutureExt;
    use std::sync::{Arc, Mutex};

    fn recording_hook(log: Arc<Mutex<Vec<usize>>>, n: usize, fail: bool) -> EntityHook<(), u32> {
        entity_hook::<(), u32, _>(move |_ctx, _entity| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(n);
                if fail {
                    Err(EngineError::api(format!("hook {} refused", n)))
                } else {
                    Ok(())
                }
            }
            .boxed()
        })
    }

    fn site() -> HookSite<'static> {
        HookSite {
            label: "edge gateway",
            operation: Operation::Delete,
            step: Step::PreDeleteHook,
        }
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_list() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let hooks = vec![
            recording_hook(log.clone(), 1, false),
            recording_hook(log.clone(), 2, true),
            recording_hook(log.clone(), 3, false),
        ];

        let err = run_entity_hooks(site(), &hooks, &Context::new(()), &7)
            .await
            .unwrap_err();

        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
        assert_eq!(err.step(), Some(Step::PreDeleteHook(2)));
        assert_eq!(
            err.to_string(),
            "edge gateway: delete failed at pre-delete hook #2: API error: hook 2 refused"
        );
    }

    #[tokio::test]
    async fn test_empty_list_is_noop() {
        let hooks: Vec<EntityHook<(), u32>> = Vec::new();
        run_entity_hooks(site(), &hooks, &Context::new(()), &7)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_hook_can_rewrite_payload() {
        let hooks: Vec<UpdateHook<(), String, Vec<String>>> =
            vec![update_hook::<(), String, Vec<String>, _>(|_ctx, _data, current, payload| {
                async move {
                    payload.push(current.clone());
                    Ok(())
                }
                .boxed()
            })];
        let mut payload = vec!["desired".to_string()];

        run_update_hooks(
            HookSite {
                label: "org",
                operation: Operation::Update,
                step: Step::PreUpdateHook,
            },
            &hooks,
            &Context::new(()),
            &ResourceData::new(),
            &"server-managed".to_string(),
            &mut payload,
        )
        .await
        .unwrap();

        assert_eq!(payload, vec!["desired", "server-managed"]);
    }
}

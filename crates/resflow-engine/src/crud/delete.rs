use crate::config::EntityConfig;
use crate::context::Context;
use crate::entity::MutableEntity;
use crate::error::{EngineError, Operation, Result, Step};
use crate::hooks::{HookSite, run_entity_hooks};
use crate::state::ResourceData;

const OP: Operation = Operation::Delete;

/// Delete the entity identified by `data.id()`
///
/// Local state is not touched; clearing the identity after a successful
/// delete is up to the caller.
pub async fn delete_resource<C, O, I>(
    ctx: &Context<C>,
    data: &ResourceData,
    config: EntityConfig<C, O, I>,
) -> Result<()>
where
    C: Send + Sync,
    O: MutableEntity<I>,
    I: Send + 'static,
{
    let label = config.label();
    let fetch = config.require_fetcher(OP)?;

    if !data.has_id() {
        return Err(EngineError::MissingId.within(label, OP, Step::Validate));
    }
    tracing::info!(id = %data.id(), "Deleting {}", label);

    let entity = fetch(ctx, data.id())
        .await
        .map_err(|e| e.within(label, OP, Step::Fetch))?;

    let pre_delete = HookSite {
        label,
        operation: OP,
        step: Step::PreDeleteHook,
    };
    run_entity_hooks(pre_delete, &config.pre_delete_hooks, ctx, &entity).await?;

    entity
        .delete()
        .await
        .map_err(|e| e.within(label, OP, Step::Delete))?;

    tracing::info!(id = %data.id(), "Deleted {}", label);
    Ok(())
}

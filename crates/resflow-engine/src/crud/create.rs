use crate::config::{AsyncCreator, EntityConfig, Fetcher};
use crate::context::Context;
use crate::entity::MutableEntity;
use crate::error::{EngineError, Operation, Result, Step};
use crate::hooks::{HookSite, run_entity_hooks, run_schema_hooks};
use crate::state::{ResourceData, ResourceStatus};
use crate::task::{RemoteTask, wait_for_task};

const OP: Operation = Operation::Create;

/// Create a remote entity and write its state
///
/// Order: validate, build payload, pre-create hooks, create (sync or via a
/// task), post-create hooks, state write, optional read-back.
///
/// When an asynchronous creation task fails (or the wait is cancelled or
/// times out) but the task names its owner entity, that identifier is
/// stored in `data` and the record is marked tainted before the error is
/// returned, so a later delete can clean the entity up.
pub async fn create_resource<C, O, I>(
    ctx: &Context<C>,
    data: &mut ResourceData,
    config: EntityConfig<C, O, I>,
) -> Result<O>
where
    C: Send + Sync,
    O: MutableEntity<I>,
    I: Send + 'static,
{
    config.validate_for_create()?;
    let label = config.label();
    tracing::info!("Creating {}", label);

    let build_payload = config.require_payload_builder(OP)?;
    let write_state = config.require_state_writer(OP)?;

    let payload = build_payload(ctx, data).map_err(|e| e.within(label, OP, Step::BuildPayload))?;

    let pre_create = HookSite {
        label,
        operation: OP,
        step: Step::PreCreateHook,
    };
    run_schema_hooks(pre_create, &config.pre_create_hooks, ctx, data).await?;

    let entity = match (&config.creator, &config.async_creator) {
        (Some(create), _) => create(ctx, payload)
            .await
            .map_err(|e| e.within(label, OP, Step::Create))?,
        (None, Some(create_async)) => {
            let fetcher = config.require_fetcher(OP)?;
            create_via_task(ctx, data, label, create_async, fetcher, payload).await?
        }
        (None, None) => {
            return Err(EngineError::invalid_config("no creator function is set")
                .within(label, OP, Step::Validate));
        }
    };

    let post_create = HookSite {
        label,
        operation: OP,
        step: Step::PostCreateHook,
    };
    run_entity_hooks(post_create, &config.post_create_hooks, ctx, &entity).await?;

    write_state(ctx, data, &entity).map_err(|e| e.within(label, OP, Step::WriteState))?;
    data.set_status(ResourceStatus::Ready);

    if !data.has_id() {
        tracing::warn!("State writer for {} did not set an identifier", label);
    }

    if let Some(read_back) = &config.read_back {
        read_back(ctx, data)
            .await
            .map_err(|e| e.within(label, OP, Step::ReadBack))?;
    }

    tracing::info!(id = %data.id(), "Created {}", label);
    Ok(entity)
}

async fn create_via_task<C, O, I>(
    ctx: &Context<C>,
    data: &mut ResourceData,
    label: &str,
    create_async: &AsyncCreator<C, I>,
    fetcher: &Fetcher<C, O>,
    payload: I,
) -> Result<O>
where
    C: Send + Sync,
    O: Send + Sync,
    I: Send + 'static,
{
    let mut task = create_async(ctx, payload)
        .await
        .map_err(|e| e.within(label, OP, Step::CreateAsync))?;
    tracing::debug!(task = %task.id(), "Waiting for {} creation task", label);

    if let Err(e) = wait_for_task(task.as_mut(), ctx.wait_config(), ctx.cancellation()).await {
        record_tainted(data, label, task.as_ref());
        return Err(e.within(label, OP, Step::WaitTask));
    }

    let owner_id = match owner_of(task.as_ref()) {
        Some(id) => id,
        None => {
            return Err(EngineError::api(format!(
                "task {} completed without an owner reference",
                task.id()
            ))
            .within(label, OP, Step::FetchCreated));
        }
    };

    match fetcher(ctx, &owner_id).await {
        Ok(entity) => Ok(entity),
        Err(e) => {
            // the task succeeded, so the entity exists even though we cannot read it
            tracing::warn!(
                id = %owner_id,
                "Could not fetch created {}; recording it as tainted",
                label
            );
            data.mark_tainted(owner_id);
            Err(e.within(label, OP, Step::FetchCreated))
        }
    }
}

fn owner_of(task: &dyn RemoteTask) -> Option<String> {
    task.owner_id().filter(|id| !id.is_empty())
}

fn record_tainted(data: &mut ResourceData, label: &str, task: &dyn RemoteTask) {
    match owner_of(task) {
        Some(owner_id) => {
            tracing::warn!(
                id = %owner_id,
                task = %task.id(),
                "Creation task for {} did not complete; recording entity as tainted",
                label
            );
            data.mark_tainted(owner_id);
        }
        None => {
            tracing::debug!(
                task = %task.id(),
                "Creation task for {} exposes no owner; nothing to record",
                label
            );
        }
    }
}

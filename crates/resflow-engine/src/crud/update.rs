use crate::config::EntityConfig;
use crate::context::Context;
use crate::entity::MutableEntity;
use crate::error::{EngineError, Operation, Result, Step};
use crate::hooks::{HookSite, run_update_hooks};
use crate::state::ResourceData;

const OP: Operation = Operation::Update;

/// Push the desired configuration to the entity identified by `data.id()`
///
/// Pre-update hooks see the current remote handle and may adjust the freshly
/// built payload (for instance to carry server-managed fields forward). A
/// failing hook aborts before any remote mutation.
pub async fn update_resource<C, O, I>(
    ctx: &Context<C>,
    data: &mut ResourceData,
    config: EntityConfig<C, O, I>,
) -> Result<()>
where
    C: Send + Sync,
    O: MutableEntity<I>,
    I: Send + 'static,
{
    let label = config.label();
    let build_payload = config.require_payload_builder(OP)?;
    let fetch = config.require_fetcher(OP)?;

    let mut payload =
        build_payload(ctx, data).map_err(|e| e.within(label, OP, Step::BuildPayload))?;

    if !data.has_id() {
        return Err(EngineError::MissingId.within(label, OP, Step::Validate));
    }
    let id = data.id().to_string();
    tracing::info!(id = %id, "Updating {}", label);

    let current = fetch(ctx, &id)
        .await
        .map_err(|e| e.within(label, OP, Step::Fetch))?;

    let pre_update = HookSite {
        label,
        operation: OP,
        step: Step::PreUpdateHook,
    };
    run_update_hooks(
        pre_update,
        &config.pre_update_hooks,
        ctx,
        data,
        &current,
        &mut payload,
    )
    .await?;

    current
        .update(payload)
        .await
        .map_err(|e| e.within(label, OP, Step::Update))?;

    if let Some(read_back) = &config.read_back {
        read_back(ctx, data)
            .await
            .map_err(|e| e.within(label, OP, Step::ReadBack))?;
    }

    tracing::info!(id = %id, "Updated {}", label);
    Ok(())
}

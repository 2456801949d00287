use crate::config::EntityConfig;
use crate::context::Context;
use crate::entity::MutableEntity;
use crate::error::{Operation, Result, Step};
use crate::hooks::{HookSite, run_entity_hooks};
use crate::state::{ResourceData, ResourceStatus};

const OP: Operation = Operation::Read;

/// Refresh local state from the remote entity identified by `data.id()`
///
/// A not-found fetch is not an error: the identifier is cleared and the
/// call succeeds, which is how out-of-band deletion is reconciled. Any other
/// fetch error is returned. Read hooks run before the state write; if one
/// fails, the previous local state is left as it was. A tainted record keeps
/// its [`ResourceStatus::Tainted`] marker across reads.
pub async fn read_resource<C, O, I>(
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
    let fetch = config.require_fetcher(OP)?;
    let write_state = config.require_state_writer(OP)?;

    if !data.has_id() {
        tracing::debug!("{} has no identifier; nothing to read", label);
        data.clear_id();
        return Ok(());
    }

    let id = data.id().to_string();
    tracing::debug!(id = %id, "Reading {}", label);

    let entity = match fetch(ctx, &id).await {
        Ok(entity) => entity,
        Err(e) if e.is_not_found() => {
            tracing::warn!(id = %id, "{} no longer exists; removing it from state", label);
            data.clear_id();
            return Ok(());
        }
        Err(e) => return Err(e.within(label, OP, Step::Fetch)),
    };

    let read_hooks = HookSite {
        label,
        operation: OP,
        step: Step::ReadHook,
    };
    run_entity_hooks(read_hooks, &config.read_hooks, ctx, &entity).await?;

    write_state(ctx, data, &entity).map_err(|e| e.within(label, OP, Step::WriteState))?;
    // a tainted record stays tainted until it is deleted
    if data.is_tainted() {
        tracing::warn!(id = %id, "{} is tainted; refreshed state but kept the marker", label);
    } else {
        data.set_status(ResourceStatus::Ready);
    }
    Ok(())
}

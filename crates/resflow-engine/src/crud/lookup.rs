use crate::config::LookupConfig;
use crate::context::Context;
use crate::error::{EngineError, Operation, Result, Step};
use crate::hooks::{HookSite, run_schema_hooks};
use crate::state::{ResourceData, ResourceStatus};
use serde_json::Value;

const OP: Operation = Operation::Lookup;

/// Look up a read-only entity by a name-like desired-state field
///
/// The key comes from `data` (the `name` field unless the config overrides
/// it), never from a stored identifier. Unlike [`read_resource`], a
/// not-found result is an error here.
///
/// [`read_resource`]: crate::read_resource
pub async fn lookup_entity<C, O>(
    ctx: &Context<C>,
    data: &mut ResourceData,
    config: LookupConfig<C, O>,
) -> Result<()>
where
    C: Send + Sync,
    O: Send + Sync,
{
    let label = config.label();
    let (fetch, write_state) = config.validate()?;

    let pre_read = HookSite {
        label,
        operation: OP,
        step: Step::PreReadHook,
    };
    run_schema_hooks(pre_read, &config.pre_read_hooks, ctx, data).await?;

    let field = config.lookup_field();
    let key = match data.attributes().get(field) {
        Some(Value::String(value)) if !value.is_empty() => value.clone(),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            return Err(EngineError::invalid_config(format!(
                "lookup field '{}' is missing or empty",
                field
            ))
            .within(label, OP, Step::ResolveName));
        }
        Some(other) => {
            return Err(EngineError::invalid_config(format!(
                "lookup field '{}' must be a string, got {}",
                field, other
            ))
            .within(label, OP, Step::ResolveName));
        }
    };
    tracing::debug!(key = %key, "Looking up {} by {}", label, field);

    let entity = fetch(ctx, &key)
        .await
        .map_err(|e| e.within(label, OP, Step::Fetch))?;

    write_state(ctx, data, &entity).map_err(|e| e.within(label, OP, Step::WriteState))?;
    data.set_status(ResourceStatus::Ready);
    Ok(())
}

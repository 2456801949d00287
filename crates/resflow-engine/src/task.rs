//! Long-running remote tasks and the wait loop (exponential backoff)

use crate::error::{EngineError, Result};
use async_trait::async_trait;
use resflow_config::WaitConfig;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Status reported by one poll of a remote task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Succeeded,
    Failed(String),
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Running)
    }
}

/// Server-side asynchronous operation returned by an async creator
#[async_trait]
pub trait RemoteTask: Send + Sync {
    /// Task identifier, for diagnostics
    fn id(&self) -> &str;

    /// Poll the remote API once
    async fn refresh(&mut self) -> Result<TaskStatus>;

    /// Identifier of the entity the task operates on
    ///
    /// Must stay available after the task failed; the engine uses it to
    /// record partially created entities.
    fn owner_id(&self) -> Option<String>;
}

/// Poll `task` until it reaches a terminal status
///
/// # Returns
/// * `Ok(())` - the task succeeded
/// * `Err(EngineError::TaskFailed)` - the task reported failure
/// * `Err(EngineError::TaskTimeout)` - still running after `max_retries` polls
/// * `Err(EngineError::Cancelled)` - `cancel` fired while waiting
///
/// Cancellation only stops the wait. The remote task keeps running.
pub async fn wait_for_task(
    task: &mut dyn RemoteTask,
    config: &WaitConfig,
    cancel: &CancellationToken,
) -> Result<()> {
    let task_id = task.id().to_string();
    // always poll at least once
    let max_polls = config.max_retries.max(1);

    for attempt in 0..max_polls {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled(format!("wait for task {}", task_id)));
        }

        match task.refresh().await? {
            TaskStatus::Succeeded => {
                tracing::debug!(task = %task_id, polls = attempt + 1, "Task succeeded");
                return Ok(());
            }
            TaskStatus::Failed(message) => {
                return Err(EngineError::TaskFailed { task_id, message });
            }
            TaskStatus::Running => {}
        }

        if attempt + 1 < max_polls {
            let delay = Duration::from_millis(config.delay_for_attempt(attempt));
            tracing::trace!(task = %task_id, ?delay, "Task still running");
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(EngineError::Cancelled(format!("wait for task {}", task_id)));
                }
                _ = sleep(delay) => {}
            }
        }
    }

    Err(EngineError::TaskTimeout {
        task_id,
        attempts: max_polls,
    })
}

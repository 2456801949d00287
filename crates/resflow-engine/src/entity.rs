//! Mutable-entity contract

use crate::error::Result;
use async_trait::async_trait;

/// Capability every fully managed entity handle exposes
///
/// `I` is the payload type the remote API accepts for this entity. Handles
/// are short-lived: the orchestrator that fetched or created one owns it
/// until the call returns.
#[async_trait]
pub trait MutableEntity<I: Send + 'static>: Sized + Send + Sync {
    /// Submit a new desired configuration and return the refreshed handle
    async fn update(&self, payload: I) -> Result<Self>;

    /// Remove the remote entity
    async fn delete(&self) -> Result<()>;
}

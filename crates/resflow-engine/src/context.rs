//! Orchestration context passed explicitly to every entry point

use crate::error::{EngineError, Result};
use resflow_config::{EngineSettings, WaitConfig};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Typed per-call context: remote API client, task wait policy and cancellation
///
/// `C` is whatever client the caller's collaborators need. Callbacks receive
/// `&Context<C>` and reach the client through [`Context::client`].
pub struct Context<C> {
    client: Arc<C>,
    wait: WaitConfig,
    cancel: CancellationToken,
}

impl<C> Context<C> {
    pub fn new(client: C) -> Self {
        Self::from_arc(Arc::new(client))
    }

    pub fn from_arc(client: Arc<C>) -> Self {
        Self {
            client,
            wait: WaitConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Context using the wait policy from loaded settings
    ///
    /// Settings are validated again here since they may have been built in code.
    pub fn from_settings(client: Arc<C>, settings: &EngineSettings) -> Result<Self> {
        settings
            .validate()
            .map_err(|e| EngineError::invalid_config(e.to_string()))?;
        Ok(Self::from_arc(client).with_wait_config(settings.wait.clone()))
    }

    pub fn with_wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn wait_config(&self) -> &WaitConfig {
        &self.wait
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Context sharing the client whose token is cancelled along with this one
    pub fn child(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            wait: self.wait.clone(),
            cancel: self.cancel.child_token(),
        }
    }
}

impl<C> Clone for Context<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            wait: self.wait.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

impl<C> fmt::Debug for Context<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("wait", &self.wait)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

//! resflow engine
//!
//! Generic resource-lifecycle orchestration for declarative providers.
//! Entity types describe themselves once with an [`EntityConfig`] (or a
//! [`LookupConfig`] for read-only entities) and the engine drives them
//! through create, read, update and delete against the remote API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │           provider (per entity type)             │
//! │  payload builder · state writer · fetcher · hooks│
//! └─────────────────┬────────────────────────────────┘
//!                   │ EntityConfig / LookupConfig
//! ┌─────────────────▼────────────────────────────────┐
//! │                 resflow-engine                   │
//! │  create_resource  read_resource  update_resource │
//! │  delete_resource  lookup_entity                  │
//! │  ┌────────────┐ ┌────────────┐ ┌──────────────┐  │
//! │  │   hooks    │ │ task wait  │ │ ResourceData │  │
//! │  └────────────┘ └────────────┘ └──────────────┘  │
//! └─────────────────┬────────────────────────────────┘
//!                   │ MutableEntity / RemoteTask
//! ┌─────────────────▼────────────────────────────────┐
//! │              remote API client                   │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! # Tainted entities
//!
//! If an asynchronous creation task fails after the remote object was
//! partially provisioned, the owner identifier reported by the task is
//! stored in [`ResourceData`] and the record is marked
//! [`ResourceStatus::Tainted`]. The object can then be deleted instead of
//! leaking.

pub mod config;
pub mod context;
pub mod crud;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod hooks;
pub mod lock;
pub mod state;
pub mod task;

// Re-exports
pub use config::{DEFAULT_NAME_FIELD, EntityConfig, LookupConfig};
pub use context::Context;
pub use crud::{create_resource, delete_resource, lookup_entity, read_resource, update_resource};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use entity::MutableEntity;
pub use error::{EngineError, Operation, Result, Step};
pub use hooks::{
    EntityHook, PreReadHook, SchemaHook, UpdateHook, entity_hook, schema_hook, update_hook,
};
pub use lock::{KeyedLock, KeyedLockGuard};
pub use resflow_config::{EngineSettings, WaitConfig};
pub use state::{ResourceData, ResourceStatus};
pub use task::{RemoteTask, TaskStatus, wait_for_task};

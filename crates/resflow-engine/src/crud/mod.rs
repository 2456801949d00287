//! Resource-lifecycle orchestrators
//!
//! Each entry point runs its steps strictly in sequence and calls back into
//! the caller-supplied functions of an [`EntityConfig`](crate::EntityConfig)
//! or [`LookupConfig`](crate::LookupConfig). Errors are wrapped with the entity
//! label and the failing step; nothing is retried.

mod create;
mod delete;
mod lookup;
mod read;
mod update;

pub use create::create_resource;
pub use delete::delete_resource;
pub use lookup::lookup_entity;
pub use read::read_resource;
pub use update::update_resource;

//! Local state record for a single managed entity
//!
//! `ResourceData` is what the caller's framework persists between
//! reconciliation runs. The engine only touches the identifier and status;
//! attribute values are read by payload builders and written by state writers.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Local state of one resource instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceData {
    /// Remote identifier, empty while the entity is unknown
    id: String,

    /// Lifecycle marker maintained by the engine
    status: ResourceStatus,

    /// Desired configuration and observed attributes
    attributes: Map<String, Value>,

    /// Last time the engine or a state writer changed this record
    updated_at: DateTime<Utc>,
}

impl Default for ResourceData {
    fn default() -> Self {
        Self {
            id: String::new(),
            status: ResourceStatus::Unknown,
            attributes: Map::new(),
            updated_at: Utc::now(),
        }
    }
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from desired-state attributes (a JSON object)
    pub fn from_attributes(attributes: Value) -> Self {
        let attributes = match attributes {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            attributes,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
        self.touch();
    }

    /// Drop the identifier; the entity no longer exists remotely
    pub fn clear_id(&mut self) {
        self.id.clear();
        self.status = ResourceStatus::Absent;
        self.touch();
    }

    /// Record a partially created entity so a later delete can clean it up
    pub fn mark_tainted(&mut self, id: impl Into<String>) {
        self.id = id.into();
        self.status = ResourceStatus::Tainted;
        self.touch();
    }

    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    pub fn is_tainted(&self) -> bool {
        self.status == ResourceStatus::Tainted
    }

    pub(crate) fn set_status(&mut self, status: ResourceStatus) {
        self.status = status;
        self.touch();
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Get an attribute as a specific type
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.attributes.insert(key.into(), value);
        self.touch();
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.attributes.remove(key);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Lifecycle marker of a resource record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Not yet reconciled
    Unknown,
    /// Remote entity exists and state was written
    Ready,
    /// Remote entity exists but creation did not complete
    Tainted,
    /// Remote entity is gone
    Absent,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Unknown => write!(f, "unknown"),
            ResourceStatus::Ready => write!(f, "ready"),
            ResourceStatus::Tainted => write!(f, "tainted"),
            ResourceStatus::Absent => write!(f, "absent"),
        }
    }
}

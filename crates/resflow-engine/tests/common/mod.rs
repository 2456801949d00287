#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use resflow_engine::{
    Context, EngineError, EntityConfig, EntityHook, LookupConfig, MutableEntity, RemoteTask,
    ResourceData, Result, SchemaHook, TaskStatus, WaitConfig,
};
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

pub type VdcConfig = EntityConfig<FakeApi, Vdc, VdcSpec>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Payload for the fake "VDC" entity
#[derive(Debug, Clone, PartialEq)]
pub struct VdcSpec {
    pub name: String,
    pub cpu: u32,
    /// Server-managed; the API rejects updates where it is empty
    pub href: String,
}

/// How the next asynchronous creation task behaves
#[derive(Debug, Clone)]
pub enum TaskPlan {
    Succeed { owner: Option<String> },
    Fail { owner: Option<String> },
    Hang { owner: Option<String> },
}

/// In-memory stand-in for the remote management API
///
/// Every call is appended to a log so tests can assert ordering.
pub struct FakeApi {
    entities: Mutex<HashMap<String, VdcSpec>>,
    calls: Mutex<Vec<String>>,
    task_plan: Mutex<TaskPlan>,
    fail_update: Mutex<bool>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entities: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            task_plan: Mutex::new(TaskPlan::Succeed {
                owner: Some("e-1".to_string()),
            }),
            fail_update: Mutex::new(false),
        })
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn insert(&self, id: &str, spec: VdcSpec) {
        self.entities.lock().unwrap().insert(id.to_string(), spec);
    }

    pub fn remove(&self, id: &str) {
        self.entities.lock().unwrap().remove(id);
    }

    pub fn spec(&self, id: &str) -> Option<VdcSpec> {
        self.entities.lock().unwrap().get(id).cloned()
    }

    pub fn set_task_plan(&self, plan: TaskPlan) {
        *self.task_plan.lock().unwrap() = plan;
    }

    pub fn fail_updates(&self) {
        *self.fail_update.lock().unwrap() = true;
    }

    pub async fn get(self: &Arc<Self>, id: &str) -> Result<Vdc> {
        self.record(format!("fetch:{}", id));
        let spec = self
            .spec(id)
            .ok_or_else(|| EngineError::not_found(format!("VDC {}", id)))?;
        Ok(Vdc {
            api: Arc::clone(self),
            id: id.to_string(),
            spec,
        })
    }

    pub async fn get_by_name(self: &Arc<Self>, name: &str) -> Result<Vdc> {
        self.record(format!("fetch_by_name:{}", name));
        let found = self
            .entities
            .lock()
            .unwrap()
            .iter()
            .find(|(_, spec)| spec.name == name)
            .map(|(id, spec)| (id.clone(), spec.clone()));
        let (id, spec) = found.ok_or_else(|| EngineError::not_found(format!("VDC '{}'", name)))?;
        Ok(Vdc {
            api: Arc::clone(self),
            id,
            spec,
        })
    }

    pub async fn create(self: &Arc<Self>, mut spec: VdcSpec) -> Result<Vdc> {
        self.record("create");
        let id = format!("vdc-{}", self.entities.lock().unwrap().len() + 1);
        spec.href = format!("https://api.example/vdc/{}", id);
        self.insert(&id, spec.clone());
        Ok(Vdc {
            api: Arc::clone(self),
            id,
            spec,
        })
    }

    pub async fn create_task(self: &Arc<Self>, spec: VdcSpec) -> Result<FakeTask> {
        self.record("create_async");
        let plan = self.task_plan.lock().unwrap().clone();
        let (owner, outcome) = match plan {
            TaskPlan::Succeed { owner } => (owner, Some(TaskStatus::Succeeded)),
            TaskPlan::Fail { owner } => (
                owner,
                Some(TaskStatus::Failed("network pool exhausted".to_string())),
            ),
            TaskPlan::Hang { owner } => (owner, None),
        };
        // the entity exists remotely as soon as the task names an owner
        if let Some(id) = &owner {
            self.insert(id, spec);
        }
        Ok(FakeTask {
            api: Arc::clone(self),
            id: "task-42".to_string(),
            owner,
            running_polls: 1,
            outcome,
        })
    }
}

/// Live handle to a fake VDC
#[derive(Clone)]
pub struct Vdc {
    api: Arc<FakeApi>,
    pub id: String,
    pub spec: VdcSpec,
}

impl fmt::Debug for Vdc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vdc")
            .field("id", &self.id)
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MutableEntity<VdcSpec> for Vdc {
    async fn update(&self, payload: VdcSpec) -> Result<Self> {
        self.api.record(format!("update:{}", self.id));
        if *self.api.fail_update.lock().unwrap() {
            return Err(EngineError::api("409 Conflict: entity is busy"));
        }
        if payload.href.is_empty() {
            return Err(EngineError::api("400 Bad Request: href must not be empty"));
        }
        self.api.insert(&self.id, payload.clone());
        Ok(Vdc {
            api: Arc::clone(&self.api),
            id: self.id.clone(),
            spec: payload,
        })
    }

    async fn delete(&self) -> Result<()> {
        self.api.record(format!("delete:{}", self.id));
        self.api.remove(&self.id);
        Ok(())
    }
}

pub struct FakeTask {
    api: Arc<FakeApi>,
    id: String,
    owner: Option<String>,
    running_polls: u32,
    outcome: Option<TaskStatus>,
}

#[async_trait]
impl RemoteTask for FakeTask {
    fn id(&self) -> &str {
        &self.id
    }

    async fn refresh(&mut self) -> Result<TaskStatus> {
        self.api.record(format!("poll:{}", self.id));
        if self.running_polls > 0 {
            self.running_polls -= 1;
            return Ok(TaskStatus::Running);
        }
        Ok(self.outcome.clone().unwrap_or(TaskStatus::Running))
    }

    fn owner_id(&self) -> Option<String> {
        self.owner.clone()
    }
}

/// Context with a short wait policy
pub fn context(api: &Arc<FakeApi>) -> Context<FakeApi> {
    Context::from_arc(Arc::clone(api)).with_wait_config(WaitConfig {
        max_retries: 5,
        initial_delay_ms: 10,
        max_delay_ms: 40,
        multiplier: 2.0,
    })
}

pub fn desired(name: &str, cpu: u32) -> ResourceData {
    ResourceData::from_attributes(json!({ "name": name, "cpu": cpu }))
}

pub fn spec(name: &str, cpu: u32, href: &str) -> VdcSpec {
    VdcSpec {
        name: name.to_string(),
        cpu,
        href: href.to_string(),
    }
}

/// Config with payload builder, state writer and fetcher; no creator
pub fn vdc_config() -> VdcConfig {
    VdcConfig::new("VDC")
        .payload(|ctx, data| {
            ctx.client().record("build_payload");
            let name = data
                .get_str("name")
                .ok_or_else(|| EngineError::invalid_config("name is required"))?;
            Ok(VdcSpec {
                name: name.to_string(),
                cpu: data.get("cpu").unwrap_or(1),
                href: String::new(),
            })
        })
        .state_writer(|ctx, data, vdc| {
            ctx.client().record(format!("write_state:{}", vdc.id));
            data.set_id(vdc.id.clone());
            data.set("name", &vdc.spec.name)?;
            data.set("cpu", vdc.spec.cpu)?;
            data.set("href", &vdc.spec.href)?;
            Ok(())
        })
        .fetch(|ctx, id| ctx.client().get(id).boxed())
}

pub fn sync_creator(
    ctx: &Context<FakeApi>,
    spec: VdcSpec,
) -> BoxFuture<'_, Result<Vdc>> {
    ctx.client().create(spec).boxed()
}

pub fn async_creator(
    ctx: &Context<FakeApi>,
    spec: VdcSpec,
) -> BoxFuture<'_, Result<Box<dyn RemoteTask>>> {
    async move {
        let task = ctx.client().create_task(spec).await?;
        Ok(Box::new(task) as Box<dyn RemoteTask>)
    }
    .boxed()
}

/// Schema hook that logs `name` and optionally fails
pub fn schema_hook(name: &'static str, fail: bool) -> SchemaHook<FakeApi> {
    resflow_engine::schema_hook::<FakeApi, _>(move |ctx, _data| {
        ctx.client().record(format!("hook:{}", name));
        async move {
            if fail {
                Err(EngineError::api(format!("{} refused", name)))
            } else {
                Ok(())
            }
        }
        .boxed()
    })
}

/// Entity hook that logs `name` and optionally fails
pub fn entity_hook(name: &'static str, fail: bool) -> EntityHook<FakeApi, Vdc> {
    resflow_engine::entity_hook::<FakeApi, Vdc, _>(move |ctx, vdc| {
        ctx.client().record(format!("hook:{}:{}", name, vdc.id));
        async move {
            if fail {
                Err(EngineError::api(format!("{} refused", name)))
            } else {
                Ok(())
            }
        }
        .boxed()
    })
}

/// Lookup config over the fake API, keyed by name
pub fn vdc_lookup() -> LookupConfig<FakeApi, Vdc> {
    LookupConfig::<FakeApi, Vdc>::new("VDC")
        .fetch(|ctx, name| ctx.client().get_by_name(name).boxed())
        .state_writer(|ctx, data, vdc| {
            ctx.client().record(format!("write_state:{}", vdc.id));
            data.set_id(vdc.id.clone());
            data.set("cpu", vdc.spec.cpu)?;
            Ok(())
        })
}

//! Engine error taxonomy

use std::fmt;
use thiserror::Error;

/// Orchestrator entry point an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Lookup,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::Lookup => write!(f, "lookup"),
        }
    }
}

/// Step inside an orchestrator. Hook steps carry the 1-based hook position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Validate,
    BuildPayload,
    PreCreateHook(usize),
    Create,
    CreateAsync,
    WaitTask,
    FetchCreated,
    PostCreateHook(usize),
    WriteState,
    ReadBack,
    Fetch,
    PreUpdateHook(usize),
    Update,
    ReadHook(usize),
    PreDeleteHook(usize),
    Delete,
    PreReadHook(usize),
    ResolveName,
}

impl Step {
    pub fn is_hook(&self) -> bool {
        matches!(
            self,
            Step::PreCreateHook(_)
                | Step::PostCreateHook(_)
                | Step::PreUpdateHook(_)
                | Step::ReadHook(_)
                | Step::PreDeleteHook(_)
                | Step::PreReadHook(_)
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Validate => write!(f, "validation"),
            Step::BuildPayload => write!(f, "payload build"),
            Step::PreCreateHook(n) => write!(f, "pre-create hook #{}", n),
            Step::Create => write!(f, "creation"),
            Step::CreateAsync => write!(f, "async creation"),
            Step::WaitTask => write!(f, "task wait"),
            Step::FetchCreated => write!(f, "fetch of created entity"),
            Step::PostCreateHook(n) => write!(f, "post-create hook #{}", n),
            Step::WriteState => write!(f, "state write"),
            Step::ReadBack => write!(f, "read-back"),
            Step::Fetch => write!(f, "fetch"),
            Step::PreUpdateHook(n) => write!(f, "pre-update hook #{}", n),
            Step::Update => write!(f, "remote update"),
            Step::ReadHook(n) => write!(f, "read hook #{}", n),
            Step::PreDeleteHook(n) => write!(f, "pre-delete hook #{}", n),
            Step::Delete => write!(f, "remote delete"),
            Step::PreReadHook(n) => write!(f, "pre-read hook #{}", n),
            Step::ResolveName => write!(f, "lookup key resolution"),
        }
    }
}

/// Errors produced by the engine and by the collaborators it calls
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("local identifier is empty")]
    MissingId,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("task {task_id} failed: {message}")]
    TaskFailed { task_id: String, message: String },

    #[error("task {task_id} still running after {attempts} polls")]
    TaskTimeout { task_id: String, attempts: u32 },

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{label}: {operation} failed at {step}: {source}")]
    Phase {
        label: String,
        operation: Operation,
        step: Step,
        #[source]
        source: Box<EngineError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    pub fn not_found(what: impl Into<String>) -> Self {
        EngineError::NotFound(what.into())
    }

    pub fn api(message: impl Into<String>) -> Self {
        EngineError::Api(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        EngineError::InvalidConfig(message.into())
    }

    /// Attach entity label and phase
    pub(crate) fn within(self, label: &str, operation: Operation, step: Step) -> Self {
        EngineError::Phase {
            label: label.to_string(),
            operation,
            step,
            source: Box::new(self),
        }
    }

    /// Innermost error, with every phase wrapper peeled off
    pub fn kind(&self) -> &EngineError {
        let mut current = self;
        while let EngineError::Phase { source, .. } = current {
            current = source;
        }
        current
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), EngineError::NotFound(_))
    }

    /// Invalid configuration or missing identity, detected before any remote call
    pub fn is_config_error(&self) -> bool {
        matches!(
            self.kind(),
            EngineError::InvalidConfig(_) | EngineError::MissingId
        )
    }

    pub fn is_hook_failure(&self) -> bool {
        self.step().is_some_and(|s| s.is_hook())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind(), EngineError::Cancelled(_))
    }

    pub fn entity_label(&self) -> Option<&str> {
        match self {
            EngineError::Phase { label, .. } => Some(label),
            _ => None,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            EngineError::Phase { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    pub fn step(&self) -> Option<Step> {
        match self {
            EngineError::Phase { step, .. } => Some(*step),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

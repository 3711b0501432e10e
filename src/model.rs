//! The taskset/task data model.
//!
//! A [`Taskset`] is the unit of persistence: a versioned, ordered collection
//! of [`Task`]s belonging to one spec. Only the [`crate::registry::Registry`]
//! facade is permitted to mutate a task's `state` — everything in this module
//! is plain data plus the small amount of logic needed to keep that data
//! self-consistent (transition validation, dependency checks).
//!
//! # Lifecycle
//!
//! ```text
//! READY ──▶ RUNNING ──▶ DONE
//!   │          │  ▲       │
//!   │          │  └───────┤ (retry / re-execution)
//!   ├──────────┴──▶ FAILED │
//!   └───────────────────▶ (self, no-op)
//! BLOCKED ──▶ READY | RUNNING
//! ```
//!
//! See [`TaskState::can_transition_to`] for the authoritative table.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle state of a [`Task`].
///
/// Represented as a closed tagged variant rather than polymorphic subtypes —
/// the transition table in [`TaskState::can_transition_to`] is the single
/// source of truth for which edges are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Ready,
    Running,
    Blocked,
    Done,
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Ready => "ready",
            TaskState::Running => "running",
            TaskState::Blocked => "blocked",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
        }
    }

    /// The transition table from §4.8. Self-transitions are always legal
    /// (and are no-ops used as heartbeats).
    pub fn can_transition_to(&self, target: TaskState) -> bool {
        use TaskState::*;
        if *self == target {
            return true;
        }
        matches!(
            (self, target),
            (Ready, Running)
                | (Ready, Blocked)
                | (Ready, Done)
                | (Running, Ready)
                | (Running, Done)
                | (Running, Failed)
                | (Blocked, Ready)
                | (Blocked, Running)
                | (Done, Ready)
                | (Failed, Ready)
                | (Failed, Running)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskState {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "ready" => Ok(TaskState::Ready),
            "running" => Ok(TaskState::Running),
            "blocked" => Ok(TaskState::Blocked),
            "done" => Ok(TaskState::Done),
            "failed" => Ok(TaskState::Failed),
            other => Err(format!("unrecognized task state `{other}`")),
        }
    }
}

/// Kind of artifact a task run may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    Diff,
    Log,
    Report,
    Other,
}

impl ArtifactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Diff => "diff",
            ArtifactType::Log => "log",
            ArtifactType::Report => "report",
            ArtifactType::Other => "other",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of immutable historical record appended to a spec's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TaskCreated,
    TaskReady,
    TaskAssigned,
    RunnerStarted,
    RunnerFinished,
    TaskCompleted,
    TaskFailed,
    TaskUpdated,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::TaskCreated => "TaskCreated",
            EventType::TaskReady => "TaskReady",
            EventType::TaskAssigned => "TaskAssigned",
            EventType::RunnerStarted => "RunnerStarted",
            EventType::RunnerFinished => "RunnerFinished",
            EventType::TaskCompleted => "TaskCompleted",
            EventType::TaskFailed => "TaskFailed",
            EventType::TaskUpdated => "TaskUpdated",
        }
    }

    /// The event type emitted on a successful transition into `target`,
    /// per the §4.8 table (`READY→TaskReady`, ..., `other→TaskUpdated`).
    pub fn for_transition_into(target: TaskState) -> EventType {
        match target {
            TaskState::Ready => EventType::TaskReady,
            TaskState::Running => EventType::TaskAssigned,
            TaskState::Done => EventType::TaskCompleted,
            TaskState::Failed => EventType::TaskFailed,
            TaskState::Blocked => EventType::TaskUpdated,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reference to an artifact produced by a task; the blob itself lives
/// elsewhere and is addressed only by `uri`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

/// One unit of work inside a [`Taskset`].
///
/// Invariants (enforced by the [`crate::registry::Registry`], not by this
/// struct's constructors): a task in [`TaskState::Blocked`] has at least one
/// dependency not yet [`TaskState::Done`]; a task in [`TaskState::Ready`] has
/// every dependency [`TaskState::Done`] (or none at all).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub state: TaskState,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_id: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl Task {
    /// Clears the assignment-metadata fields that are only meaningful while
    /// [`TaskState::Running`].
    pub fn clear_assignment(&mut self) {
        self.assigned_slot = None;
        self.reserved_branch = None;
        self.runner_id = None;
    }

    /// Builds a brand-new `Task` from a [`TaskDef`] in the given state.
    /// Shared by `CreateTaskset` and plan-sync's added-task classification
    /// so both paths stamp tasks identically.
    pub fn from_def(def: &TaskDef, state: TaskState) -> Task {
        let now = Utc::now();
        Task {
            id: def.id.clone(),
            title: def.title.clone(),
            description: def.description.clone(),
            state,
            dependencies: def.dependencies.clone(),
            is_optional: def.is_optional,
            priority: def.priority,
            required_skill: def.required_skill.clone(),
            assigned_slot: None,
            reserved_branch: None,
            runner_id: None,
            artifacts: Vec::new(),
            created_at: now,
            updated_at: now,
            metadata: HashMap::new(),
        }
    }
}

/// The versioned container of tasks belonging to one spec; the unit of
/// persistence for [`crate::store::TaskStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taskset {
    pub spec_name: String,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl Taskset {
    pub fn new(spec_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            spec_name: spec_name.into(),
            version: 0,
            created_at: now,
            updated_at: now,
            tasks: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn find_task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    pub fn state_of(&self, task_id: &str) -> Option<TaskState> {
        self.find_task(task_id).map(|t| t.state)
    }

    /// True iff every dependency of `task` is `Done`; vacuously true for a
    /// task with no dependencies.
    pub fn dependencies_satisfied(&self, task: &Task) -> bool {
        task.dependencies
            .iter()
            .all(|dep| self.state_of(dep) == Some(TaskState::Done))
    }
}

/// An immutable historical record of a state transition or side effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    pub event_type: EventType,
    pub spec_name: String,
    pub task_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, Value>,
}

/// A definition used to create or reconcile a task, before it has been
/// assigned a lifecycle state by the registry or plan-sync logic.
#[derive(Debug, Clone)]
pub struct TaskDef {
    pub id: String,
    pub title: String,
    pub description: String,
    pub dependencies: Vec<String>,
    pub is_optional: bool,
    pub priority: i64,
    pub required_skill: Option<String>,
    pub completed: bool,
    pub in_progress: bool,
}

impl TaskDef {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            dependencies: Vec::new(),
            is_optional: false,
            priority: 0,
            required_skill: None,
            completed: false,
            in_progress: false,
        }
    }
}

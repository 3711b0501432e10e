//! The one public surface callers use (§4.8).
//!
//! `Registry` composes [`ConfigRoots`], [`LockManager`], [`TaskStore`], and
//! [`EventStore`] by reference — it owns none of their directories directly,
//! it owns the `LockManager` 1:1. Every mutating operation is wrapped in
//! `LockManager::acquire(spec)`; every operation re-reads the canonical
//! document rather than caching, so a stale in-process `version` can never
//! be written back over a newer one (§5).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;

use crate::config::{ConfigRoots, RegistryConfig};
use crate::errors::RegistryError;
use crate::events::EventStore;
use crate::graph::{self, detect_cycle, execution_order};
use crate::lock::LockManager;
use crate::model::{Artifact, ArtifactType, EventType, Task, TaskDef, TaskEvent, TaskState, Taskset};
use crate::plan::{self, SyncResult};
use crate::query::{self, QueryFilter, SortBy};
use crate::store::TaskStore;

const DEFAULT_PLAN_RELATIVE_PATH_PREFIX: &str = ".kiro/specs";

/// The task registry facade. Construct one per `root_dir`; it is cheap to
/// clone the handles it wraps but holds no taskset state itself, so callers
/// may safely share one instance across threads (`Registry` is `Send + Sync`
/// because every field it owns is).
pub struct Registry {
    config: RegistryConfig,
    roots: ConfigRoots,
    lock_manager: LockManager,
    task_store: TaskStore,
    event_store: EventStore,
    last_backup: Mutex<HashMap<String, Instant>>,
}

impl Registry {
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let roots = ConfigRoots::new(&config)?;
        let lock_manager = LockManager::new(roots.locks_dir().to_path_buf());
        let task_store = TaskStore::new(roots.tasksets_dir().to_path_buf());
        let event_store = EventStore::new(roots.events_dir().to_path_buf());
        Ok(Self {
            config,
            roots,
            lock_manager,
            task_store,
            event_store,
            last_backup: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn roots(&self) -> &ConfigRoots {
        &self.roots
    }

    pub fn events(&self) -> &EventStore {
        &self.event_store
    }

    fn acquire(&self, spec_name: &str) -> Result<crate::lock::LockGuard, RegistryError> {
        self.lock_manager
            .acquire(spec_name, self.config.lock_timeout, self.config.lock_poll_interval)
    }

    fn record(&self, event_type: EventType, spec_name: &str, task_id: &str, details: HashMap<String, Value>) {
        let event = TaskEvent {
            event_type,
            spec_name: spec_name.to_string(),
            task_id: task_id.to_string(),
            timestamp: Utc::now(),
            details,
        };
        if let Err(e) = self.event_store.record(&event) {
            tracing::warn!(spec_name, %event_type, error = %e, "failed to record event");
        }
    }

    /// Opportunistic backup per §4.3: best-effort, never fails the mutating
    /// call that triggered it.
    fn maybe_opportunistic_backup(&self, spec_name: &str) {
        if !self.config.backup_enabled {
            return;
        }
        let interval = std::time::Duration::from_secs(self.config.backup_interval_hours * 3600);
        let due = {
            let mut last = self.last_backup.lock().unwrap();
            let now = Instant::now();
            let due = match last.get(spec_name) {
                Some(prev) => now.duration_since(*prev) >= interval,
                None => true,
            };
            if due {
                last.insert(spec_name.to_string(), now);
            }
            due
        };
        if !due {
            return;
        }
        if let Err(e) = self.task_store.backup(spec_name, self.roots.backups_dir()) {
            tracing::warn!(spec_name, error = %e, "opportunistic backup failed");
        }
    }

    /// Resolves initial states for a batch of task definitions in
    /// dependency order, shared by `CreateTaskset` and the construction of
    /// an empty-store plan sync. Fails with `CircularDependency` if the
    /// definitions contain a cycle.
    fn resolve_initial_states(defs: &[TaskDef]) -> Result<Vec<Task>, RegistryError> {
        let synthetic: Vec<Task> = defs.iter().map(|d| Task::from_def(d, TaskState::Ready)).collect();
        if let Some(chain) = detect_cycle(&synthetic) {
            return Err(RegistryError::CircularDependency { chain });
        }

        let mut taskset = Taskset::new("__scratch__");
        let by_id: HashMap<&str, &TaskDef> = defs.iter().map(|d| (d.id.as_str(), d)).collect();
        for level in execution_order(&synthetic) {
            for id in level {
                let def = by_id[id.as_str()];
                let state = if def.completed {
                    TaskState::Done
                } else if taskset.dependencies_satisfied(&Task::from_def(def, TaskState::Ready)) {
                    TaskState::Ready
                } else {
                    TaskState::Blocked
                };
                taskset.tasks.push(Task::from_def(def, state));
            }
        }
        Ok(taskset.tasks)
    }

    /// Creates (or, if `spec_name` already exists, replaces) a taskset.
    /// Initial task state per definition: `Done` if marked completed, else
    /// `Blocked` if it has unresolved dependencies, else `Ready`. Emits one
    /// `TaskCreated` event per task.
    pub fn create_taskset(
        &self,
        spec_name: &str,
        task_defs: &[TaskDef],
        metadata: Option<HashMap<String, Value>>,
    ) -> Result<Taskset, RegistryError> {
        let _guard = self.acquire(spec_name)?;
        let existing_version = self.task_store.load_taskset(spec_name).map(|t| t.version).unwrap_or(0);

        let tasks = Self::resolve_initial_states(task_defs)?;
        let now = Utc::now();
        let taskset = Taskset {
            spec_name: spec_name.to_string(),
            version: existing_version + 1,
            created_at: now,
            updated_at: now,
            tasks,
            metadata: metadata.unwrap_or_default(),
        };
        self.task_store.save_taskset(&taskset)?;
        tracing::info!(spec_name, task_count = taskset.tasks.len(), "taskset created");

        for task in &taskset.tasks {
            self.record(EventType::TaskCreated, spec_name, &task.id, HashMap::new());
        }
        self.maybe_opportunistic_backup(spec_name);
        Ok(taskset)
    }

    /// Lock-free read: a concurrent writer's atomic rename (§4.3) guarantees
    /// this always observes a complete pre- or post-state document.
    pub fn get_taskset(&self, spec_name: &str) -> Result<Taskset, RegistryError> {
        self.task_store.load_taskset(spec_name)
    }

    /// Validates and applies a state transition, cascading any now-unblocked
    /// dependents to `Ready` in the same save. See the transition table in
    /// module docs / §4.8 for the legal edges.
    pub fn update_task_state(
        &self,
        spec_name: &str,
        task_id: &str,
        new_state: TaskState,
        metadata: Option<HashMap<String, Value>>,
    ) -> Result<Taskset, RegistryError> {
        let _guard = self.acquire(spec_name)?;
        let mut taskset = self.task_store.load_taskset(spec_name)?;

        let old_state = taskset
            .find_task(task_id)
            .ok_or_else(|| RegistryError::TaskNotFound {
                spec_name: spec_name.to_string(),
                task_id: task_id.to_string(),
            })?
            .state;

        if !old_state.can_transition_to(new_state) {
            return Err(RegistryError::InvalidStateTransition {
                task_id: task_id.to_string(),
                from: old_state.to_string(),
                to: new_state.to_string(),
            });
        }

        {
            let task = taskset.find_task_mut(task_id).expect("checked above");
            task.state = new_state;
            task.updated_at = Utc::now();
            if new_state == TaskState::Running {
                if let Some(meta) = &metadata {
                    if let Some(v) = meta.get("assigned_slot").and_then(Value::as_str) {
                        task.assigned_slot = Some(v.to_string());
                    }
                    if let Some(v) = meta.get("reserved_branch").and_then(Value::as_str) {
                        task.reserved_branch = Some(v.to_string());
                    }
                    if let Some(v) = meta.get("runner_id").and_then(Value::as_str) {
                        task.runner_id = Some(v.to_string());
                    }
                }
            }
        }

        let mut newly_ready = Vec::new();
        if new_state == TaskState::Done {
            let blocked_dependents: Vec<String> = taskset
                .tasks
                .iter()
                .filter(|t| t.state == TaskState::Blocked && t.dependencies.iter().any(|d| d == task_id))
                .map(|t| t.id.clone())
                .collect();

            for dependent_id in blocked_dependents {
                let deps = taskset.find_task(&dependent_id).expect("just listed").dependencies.clone();
                let satisfied = deps.iter().all(|d| taskset.state_of(d) == Some(TaskState::Done));
                if satisfied {
                    let t = taskset.find_task_mut(&dependent_id).expect("just listed");
                    t.state = TaskState::Ready;
                    t.updated_at = Utc::now();
                    newly_ready.push(dependent_id);
                }
            }
        }

        taskset.version += 1;
        taskset.updated_at = Utc::now();
        self.task_store.save_taskset(&taskset)?;

        let mut details = HashMap::new();
        details.insert("old_state".to_string(), Value::String(old_state.to_string()));
        details.insert("new_state".to_string(), Value::String(new_state.to_string()));
        if let Some(meta) = metadata {
            for (k, v) in meta {
                details.insert(k, v);
            }
        }
        self.record(EventType::for_transition_into(new_state), spec_name, task_id, details);

        for id in &newly_ready {
            tracing::debug!(spec_name, task_id = %id, "cascaded to ready");
            self.record(EventType::TaskReady, spec_name, id, HashMap::new());
        }

        self.maybe_opportunistic_backup(spec_name);
        Ok(taskset)
    }

    /// Tasks in `Ready` state, optionally filtered by `required_skill`,
    /// sorted by ascending dependency count as a secondary hint — callers
    /// apply their own priority policy on top.
    pub fn get_ready_tasks(&self, spec_name: &str, required_skill: Option<&str>) -> Result<Vec<Task>, RegistryError> {
        let taskset = self.task_store.load_taskset(spec_name)?;
        let filter = QueryFilter {
            state: Some(TaskState::Ready),
            required_skill: required_skill.map(|s| s.to_string()),
            ..Default::default()
        };
        let mut matched: Vec<Task> = query::query(&taskset.tasks, &filter, None, 0, None)
            .into_iter()
            .cloned()
            .collect();
        matched.sort_by_key(|t| t.dependencies.len());
        Ok(matched)
    }

    /// Appends an artifact to `task_id`, lifting `size_bytes` from
    /// `metadata` if present.
    pub fn add_artifact(
        &self,
        spec_name: &str,
        task_id: &str,
        artifact_type: ArtifactType,
        uri: &str,
        metadata: Option<HashMap<String, Value>>,
    ) -> Result<Taskset, RegistryError> {
        let _guard = self.acquire(spec_name)?;
        let mut taskset = self.task_store.load_taskset(spec_name)?;

        let size_bytes = metadata.as_ref().and_then(|m| m.get("size_bytes")).and_then(Value::as_u64);
        let artifact = Artifact {
            artifact_type,
            uri: uri.to_string(),
            size_bytes,
            created_at: Utc::now(),
            metadata: metadata.clone().unwrap_or_default(),
        };

        {
            let task = taskset
                .find_task_mut(task_id)
                .ok_or_else(|| RegistryError::TaskNotFound {
                    spec_name: spec_name.to_string(),
                    task_id: task_id.to_string(),
                })?;
            task.artifacts.push(artifact);
            task.updated_at = Utc::now();
        }

        taskset.version += 1;
        taskset.updated_at = Utc::now();
        self.task_store.save_taskset(&taskset)?;

        let mut details = HashMap::new();
        details.insert("action".to_string(), Value::String("artifact_added".to_string()));
        details.insert("artifact_type".to_string(), Value::String(artifact_type.to_string()));
        details.insert("uri".to_string(), Value::String(uri.to_string()));
        self.record(EventType::TaskUpdated, spec_name, task_id, details);

        self.maybe_opportunistic_backup(spec_name);
        Ok(taskset)
    }

    fn default_plan_path(spec_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_PLAN_RELATIVE_PATH_PREFIX)
            .join(spec_name)
            .join("tasks.md")
    }

    /// Reconciles the stored taskset (or a fresh one) from the plan document
    /// at `path` (defaulting to `<cwd>/.kiro/specs/<spec>/tasks.md`).
    pub fn sync_from_plan(&self, spec_name: &str, path: Option<&Path>) -> Result<SyncResult, RegistryError> {
        let path_buf = path.map(Path::to_path_buf).unwrap_or_else(|| Self::default_plan_path(spec_name));
        let plan_text = std::fs::read_to_string(&path_buf).map_err(|e| RegistryError::SyncError {
            spec_name: spec_name.to_string(),
            reason: format!("could not read plan document at {}: {e}", path_buf.display()),
        })?;

        let _guard = self.acquire(spec_name)?;
        let existing = match self.task_store.load_taskset(spec_name) {
            Ok(t) => Some(t),
            Err(RegistryError::TasksetNotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let (new_taskset, result) = plan::sync_from_plan(existing, &plan_text, spec_name)?;
        let Some(new_taskset) = new_taskset else {
            return Ok(result);
        };

        self.task_store.save_taskset(&new_taskset)?;
        tracing::info!(
            spec_name,
            added = result.tasks_added.len(),
            updated = result.tasks_updated.len(),
            removed = result.tasks_removed.len(),
            "plan sync complete"
        );
        self.maybe_opportunistic_backup(spec_name);
        Ok(result)
    }

    /// Rewrites the plan document at `path` with current checkbox state,
    /// byte-preserving everything but the checkbox glyphs that changed.
    pub fn sync_to_plan(&self, spec_name: &str, path: Option<&Path>) -> Result<SyncResult, RegistryError> {
        let path_buf = path.map(Path::to_path_buf).unwrap_or_else(|| Self::default_plan_path(spec_name));
        let plan_text = std::fs::read_to_string(&path_buf).map_err(|e| RegistryError::SyncError {
            spec_name: spec_name.to_string(),
            reason: format!("could not read plan document at {}: {e}", path_buf.display()),
        })?;

        let taskset = self.task_store.load_taskset(spec_name)?;
        let (rewritten, result) = plan::sync_to_plan(&taskset, &plan_text);

        std::fs::write(&path_buf, rewritten).map_err(|e| RegistryError::SyncError {
            spec_name: spec_name.to_string(),
            reason: format!("could not write plan document at {}: {e}", path_buf.display()),
        })?;
        Ok(result)
    }

    pub fn export_graph_dot(&self, spec_name: &str) -> Result<String, RegistryError> {
        let taskset = self.task_store.load_taskset(spec_name)?;
        Ok(graph::to_dot(&taskset))
    }

    pub fn export_graph_mermaid(&self, spec_name: &str) -> Result<String, RegistryError> {
        let taskset = self.task_store.load_taskset(spec_name)?;
        Ok(graph::to_mermaid(&taskset))
    }

    pub fn execution_order(&self, spec_name: &str) -> Result<Vec<Vec<String>>, RegistryError> {
        let taskset = self.task_store.load_taskset(spec_name)?;
        Ok(execution_order(&taskset.tasks))
    }

    /// Direct pass-through to `TaskStore::backup` so callers don't have to
    /// reach past the facade; `dir` defaults to the registry's `backups/`.
    pub fn backup_taskset(&self, spec_name: &str, dir: Option<&Path>) -> Result<PathBuf, RegistryError> {
        let dir = dir.unwrap_or_else(|| self.roots.backups_dir());
        self.task_store.backup(spec_name, dir)
    }

    pub fn restore_taskset(&self, file: &Path) -> Result<Taskset, RegistryError> {
        self.task_store.restore(file)
    }

    /// Pass-through to `TaskStore::delete`, under lock so removal is
    /// serialized against concurrent mutation of the same spec.
    pub fn delete_taskset(&self, spec_name: &str) -> Result<(), RegistryError> {
        let _guard = self.acquire(spec_name)?;
        self.task_store.delete(spec_name)
    }

    /// Convenience query surface over an already-loaded taskset; delegates
    /// to [`crate::query`] rather than re-reading from disk per call.
    pub fn query_tasks(
        &self,
        spec_name: &str,
        filter: &QueryFilter,
        sort_by: Option<SortBy>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Task>, RegistryError> {
        let taskset = self.task_store.load_taskset(spec_name)?;
        Ok(query::query(&taskset.tasks, filter, sort_by, offset, limit)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn registry() -> (TempDir, Registry) {
        let dir = TempDir::new().unwrap();
        let config = RegistryConfig {
            backup_enabled: false,
            ..RegistryConfig::new(dir.path().to_path_buf())
        };
        let registry = Registry::new(config).unwrap();
        (dir, registry)
    }

    fn def(id: &str, deps: &[&str]) -> TaskDef {
        let mut d = TaskDef::new(id, format!("task {id}"));
        d.dependencies = deps.iter().map(|s| s.to_string()).collect();
        d
    }

    #[test]
    fn s1_simple_completion_cascades_to_ready() {
        let (_dir, reg) = registry();
        reg.create_taskset("spec-a", &[def("A", &[]), def("B", &["A"])], None).unwrap();

        let ts = reg.get_taskset("spec-a").unwrap();
        assert_eq!(ts.state_of("A"), Some(TaskState::Ready));
        assert_eq!(ts.state_of("B"), Some(TaskState::Blocked));

        reg.update_task_state("spec-a", "A", TaskState::Running, None).unwrap();
        let ts = reg.update_task_state("spec-a", "A", TaskState::Done, None).unwrap();
        assert_eq!(ts.state_of("A"), Some(TaskState::Done));
        assert_eq!(ts.state_of("B"), Some(TaskState::Ready));

        let events = reg.events().get_all("spec-a").unwrap();
        let types: Vec<_> = events.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![
                EventType::TaskCreated,
                EventType::TaskCreated,
                EventType::TaskAssigned,
                EventType::TaskCompleted,
                EventType::TaskReady,
            ]
        );
    }

    #[test]
    fn retry_and_reexecution_step_back_to_ready() {
        let (_dir, reg) = registry();
        reg.create_taskset("spec-a", &[def("A", &[])], None).unwrap();

        // A runner steps back from RUNNING to READY for a retry.
        reg.update_task_state("spec-a", "A", TaskState::Running, None).unwrap();
        let ts = reg.update_task_state("spec-a", "A", TaskState::Ready, None).unwrap();
        assert_eq!(ts.state_of("A"), Some(TaskState::Ready));

        // A completed task is reopened to READY for re-execution.
        reg.update_task_state("spec-a", "A", TaskState::Running, None).unwrap();
        reg.update_task_state("spec-a", "A", TaskState::Done, None).unwrap();
        let ts = reg.update_task_state("spec-a", "A", TaskState::Ready, None).unwrap();
        assert_eq!(ts.state_of("A"), Some(TaskState::Ready));
    }

    #[test]
    fn s2_illegal_transition_leaves_taskset_unchanged() {
        let (_dir, reg) = registry();
        reg.create_taskset("spec-a", &[def("A", &[])], None).unwrap();
        reg.update_task_state("spec-a", "A", TaskState::Done, None).unwrap();
        let before = reg.get_taskset("spec-a").unwrap();

        let err = reg.update_task_state("spec-a", "A", TaskState::Failed, None).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidStateTransition { .. }));

        let after = reg.get_taskset("spec-a").unwrap();
        assert_eq!(before.version, after.version);
        assert_eq!(before.state_of("A"), after.state_of("A"));
    }

    #[test]
    fn s5_artifact_append_bumps_version_and_emits_event() {
        let (_dir, reg) = registry();
        reg.create_taskset("spec-a", &[def("A", &[])], None).unwrap();
        let before = reg.get_taskset("spec-a").unwrap();

        let after = reg
            .add_artifact("spec-a", "A", ArtifactType::Diff, "file:///tmp/x.diff", None)
            .unwrap();
        assert_eq!(after.find_task("A").unwrap().artifacts.len(), 1);
        assert_eq!(after.version, before.version + 1);

        let events = reg.events().get_by_task("spec-a", "A").unwrap();
        let last = events.last().unwrap();
        assert_eq!(last.event_type, EventType::TaskUpdated);
        assert_eq!(last.details.get("action").unwrap().as_str(), Some("artifact_added"));
    }

    #[test]
    fn create_taskset_refuses_a_cyclic_definition() {
        let (_dir, reg) = registry();
        let err = reg
            .create_taskset("spec-a", &[def("A", &["B"]), def("B", &["A"])], None)
            .unwrap_err();
        assert!(matches!(err, RegistryError::CircularDependency { .. }));
        assert!(!reg.get_taskset("spec-a").is_ok());
    }

    #[test]
    fn s4_concurrent_mutation_is_serialized_and_keeps_invariants() {
        let (_dir, reg) = registry();
        reg.create_taskset("spec-a", &[def("A", &[]), def("B", &["A"])], None).unwrap();
        let reg = Arc::new(reg);

        let r1 = Arc::clone(&reg);
        let t1 = std::thread::spawn(move || {
            r1.update_task_state("spec-a", "A", TaskState::Running, None).unwrap();
        });
        t1.join().unwrap();

        let r2 = Arc::clone(&reg);
        let t2 = std::thread::spawn(move || {
            r2.update_task_state("spec-a", "A", TaskState::Done, None).unwrap();
        });
        t2.join().unwrap();

        let final_taskset = reg.get_taskset("spec-a").unwrap();
        // 1 create + 2 updates = version 3.
        assert_eq!(final_taskset.version, 3);

        for task in &final_taskset.tasks {
            match task.state {
                TaskState::Blocked => assert!(task.dependencies.iter().any(|d| {
                    final_taskset.state_of(d) != Some(TaskState::Done)
                })),
                TaskState::Ready => assert!(task
                    .dependencies
                    .iter()
                    .all(|d| final_taskset.state_of(d) == Some(TaskState::Done))),
                _ => {}
            }
        }
    }

    #[test]
    fn delete_taskset_removes_the_document() {
        let (_dir, reg) = registry();
        reg.create_taskset("spec-a", &[def("A", &[])], None).unwrap();
        reg.delete_taskset("spec-a").unwrap();
        assert!(matches!(
            reg.get_taskset("spec-a").unwrap_err(),
            RegistryError::TasksetNotFound(_)
        ));
    }

    #[test]
    fn s6_plan_round_trip_cascades_dependents_and_rewrites_bytewise() {
        let (_dir, reg) = registry();
        reg.create_taskset("spec-a", &[def("1", &[]), def("2", &["1"])], None).unwrap();

        let plan_dir = TempDir::new().unwrap();
        let plan_path = plan_dir.path().join("tasks.md");
        std::fs::write(
            &plan_path,
            "- [x] 1. First task\n  - does the first thing\n- [ ] 2. Second task\n  - _Requirements: 1_\n",
        )
        .unwrap();

        let from_result = reg.sync_from_plan("spec-a", Some(&plan_path)).unwrap();
        assert!(from_result.success);
        let taskset = reg.get_taskset("spec-a").unwrap();
        assert_eq!(taskset.state_of("1"), Some(TaskState::Done));
        assert_eq!(taskset.state_of("2"), Some(TaskState::Ready));

        let to_result = reg.sync_to_plan("spec-a", Some(&plan_path)).unwrap();
        // Task 1's box was already `x`; nothing to rewrite for it. Task 2 is
        // still unchecked in the plan but READY (not DONE), so its glyph is
        // also unchanged.
        assert!(to_result.tasks_updated.is_empty());

        let rewritten = std::fs::read_to_string(&plan_path).unwrap();
        assert!(rewritten.contains("- [x] 1. First task"));
        assert!(rewritten.contains("does the first thing"));
        assert!(rewritten.contains("- [ ] 2. Second task"));
    }

    #[test]
    fn backup_and_restore_round_trip_through_the_facade() {
        let (dir, reg) = registry();
        reg.create_taskset("spec-a", &[def("A", &[])], None).unwrap();
        let backup_path = reg.backup_taskset("spec-a", None).unwrap();
        assert!(backup_path.starts_with(reg.roots().backups_dir()));

        reg.delete_taskset("spec-a").unwrap();
        let restored = reg.restore_taskset(&backup_path).unwrap();
        assert_eq!(restored.spec_name, "spec-a");
        let _ = dir;
    }
}

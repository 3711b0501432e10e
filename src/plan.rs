//! Parses a structured plan document into task definitions, and writes
//! state-bearing checkbox markers back (§4.7).
//!
//! # Plan grammar
//!
//! A task line matches:
//!
//! ```text
//! <indent>- [<checkbox>]<optional?> <dotted-id>. <title>
//! ```
//!
//! `<checkbox>` is one of ` ` (unchecked), `-` (in progress), `x`/`X`
//! (completed). `<optional?>` is the literal `*` or empty. A continuation
//! line beginning with `-` (but not `- [`) immediately following a task line
//! is a description bullet; one matching `_Requirements:\s*<ids>_` instead
//! specifies dependencies. The implied parent of `a.b.c` is `a.b` if it
//! appears earlier in the document — dotted ids already encode hierarchy, so
//! this module does not separately track indent depth for dependency
//! resolution.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::RegistryError;
use crate::graph::{detect_cycle, execution_order};
use crate::model::{Task, TaskDef, TaskState, Taskset};

static TASK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)-\s\[(?P<checkbox>[ xX-])\](?P<optional>\*)?\s(?P<id>[0-9]+(?:\.[0-9]+)*)\.\s(?P<title>.*)$").unwrap()
});

static CONTINUATION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<indent>[ \t]*)-\s(?!\[)(?P<text>.*)$").unwrap());

static REQUIREMENTS_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_Requirements:\s*(?P<ids>[0-9.,\s]+)_$").unwrap());

/// Outcome of a plan-document reconciliation, in either direction.
#[derive(Debug, Clone, Default)]
pub struct SyncResult {
    pub success: bool,
    pub tasks_added: Vec<String>,
    pub tasks_updated: Vec<String>,
    pub tasks_removed: Vec<String>,
    pub errors: Vec<String>,
}

impl SyncResult {
    fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }
}

/// Parses `text` into a flat list of task definitions in document order.
/// Lines that match neither the task-line nor continuation-line pattern are
/// ignored — this module reconciles state, it does not validate prose.
pub fn parse_plan(text: &str) -> Vec<TaskDef> {
    let mut defs: Vec<TaskDef> = Vec::new();
    let mut current: Option<usize> = None;

    for line in text.lines() {
        if let Some(caps) = TASK_LINE.captures(line) {
            let checkbox = &caps["checkbox"];
            let mut def = TaskDef::new(&caps["id"], caps["title"].trim());
            def.is_optional = caps.name("optional").is_some();
            match checkbox {
                "x" | "X" => def.completed = true,
                "-" => def.in_progress = true,
                _ => {}
            }
            defs.push(def);
            current = Some(defs.len() - 1);
            continue;
        }

        if let Some(caps) = CONTINUATION_LINE.captures(line) {
            let Some(idx) = current else { continue };
            let text = caps["text"].trim();
            if let Some(req_caps) = REQUIREMENTS_BULLET.captures(text) {
                let deps: Vec<String> = req_caps["ids"]
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                defs[idx].dependencies.extend(deps);
            } else {
                let def = &mut defs[idx];
                if !def.description.is_empty() {
                    def.description.push('\n');
                }
                def.description.push_str(text);
            }
            continue;
        }

        // Any other line (blank, prose, heading) ends the continuation run.
        current = None;
    }

    defs
}

/// Reconciles `existing` (or a freshly constructed empty taskset) against
/// the tasks parsed from `plan_text`.
///
/// On a cycle, returns `(None, SyncResult{success: false, ..})` without
/// touching `existing` in any way — per §4.7 step 2, cycle detection runs
/// before any stored state is read or written.
pub fn sync_from_plan(
    existing: Option<Taskset>,
    plan_text: &str,
    spec_name: &str,
) -> Result<(Option<Taskset>, SyncResult), RegistryError> {
    let defs = parse_plan(plan_text);

    let synthetic_tasks: Vec<Task> = defs
        .iter()
        .map(|d| Task::from_def(d, TaskState::Ready))
        .collect();
    if let Some(chain) = detect_cycle(&synthetic_tasks) {
        let mut result = SyncResult::default();
        result
            .errors
            .push(format!("circular dependency: {}", chain.join(" -> ")));
        return Ok((None, result));
    }

    let mut taskset = existing.unwrap_or_else(|| Taskset::new(spec_name));
    let mut result = SyncResult::ok();

    let plan_ids: std::collections::HashSet<&str> = defs.iter().map(|d| d.id.as_str()).collect();
    let stored_ids: std::collections::HashSet<String> =
        taskset.tasks.iter().map(|t| t.id.clone()).collect();

    // Removed: reported, never deleted (step 7).
    for id in &stored_ids {
        if !plan_ids.contains(id.as_str()) {
            result.tasks_removed.push(id.clone());
            tracing::debug!(spec_name, task_id = %id, "plan sync: task removed from plan (preserved)");
        }
    }

    // Common: update title/description/dependencies/is_optional, and state
    // only when the checkbox implies a different state (step 5).
    for def in defs.iter().filter(|d| stored_ids.contains(&d.id)) {
        let task = taskset
            .find_task_mut(&def.id)
            .expect("id present in stored_ids");
        let mut changed = false;

        if task.title != def.title {
            task.title = def.title.clone();
            changed = true;
        }
        if task.description != def.description {
            task.description = def.description.clone();
            changed = true;
        }
        if task.dependencies != def.dependencies {
            task.dependencies = def.dependencies.clone();
            changed = true;
        }
        if task.is_optional != def.is_optional {
            task.is_optional = def.is_optional;
            changed = true;
        }

        let implied = if def.completed {
            Some(TaskState::Done)
        } else if def.in_progress {
            if matches!(task.state, TaskState::Ready | TaskState::Blocked) {
                Some(TaskState::Running)
            } else {
                None
            }
        } else if task.state == TaskState::Done {
            Some(TaskState::Ready)
        } else {
            None
        };

        if let Some(new_state) = implied {
            if new_state != task.state {
                task.state = new_state;
                changed = true;
            }
        }

        if changed {
            task.updated_at = chrono::Utc::now();
            result.tasks_updated.push(def.id.clone());
            tracing::debug!(spec_name, task_id = %def.id, "plan sync: task updated");
        }
    }

    // Added: state resolved in dependency order so a just-added dependency's
    // final state is known before its dependents are classified (step 6).
    let added_defs: Vec<&TaskDef> = defs.iter().filter(|d| !stored_ids.contains(&d.id)).collect();
    if !added_defs.is_empty() {
        let added_tasks: Vec<Task> = added_defs
            .iter()
            .map(|d| Task::from_def(d, TaskState::Ready))
            .collect();
        let levels = execution_order(&added_tasks);
        let by_id: std::collections::HashMap<&str, &TaskDef> =
            added_defs.iter().map(|d| (d.id.as_str(), *d)).collect();

        for level in levels {
            for id in level {
                let def = by_id[id.as_str()];
                let state = if def.completed {
                    TaskState::Done
                } else if taskset.dependencies_satisfied(&Task::from_def(def, TaskState::Ready))
                {
                    TaskState::Ready
                } else {
                    TaskState::Blocked
                };
                taskset.tasks.push(Task::from_def(def, state));
                result.tasks_added.push(def.id.clone());
                tracing::debug!(spec_name, task_id = %def.id, state = %state, "plan sync: task added");
            }
        }
    }

    taskset.version += 1;
    taskset.updated_at = chrono::Utc::now();

    Ok((Some(taskset), result))
}

/// Rewrites only the checkbox glyph of each recognized task line according
/// to current state: `Done`->`x`, `Running`->`-`, `Ready`/`Blocked`->` `.
/// `Failed` is rendered as ` ` (an explicit, revisitable design choice — see
/// DESIGN.md). The rest of each line is byte-preserved: only the checkbox
/// character span is replaced, never a reconstruction from parsed fields.
pub fn sync_to_plan(taskset: &Taskset, plan_text: &str) -> (String, SyncResult) {
    let mut result = SyncResult::ok();
    let mut out = String::with_capacity(plan_text.len());

    for (i, line) in plan_text.split_inclusive('\n').enumerate() {
        let (body, ending) = match line.strip_suffix('\n') {
            Some(b) => (b, "\n"),
            None => (line, ""),
        };
        let _ = i;

        if let Some(caps) = TASK_LINE.captures(body) {
            let id = &caps["id"];
            let target_glyph = match taskset.state_of(id) {
                Some(TaskState::Done) => 'x',
                Some(TaskState::Running) => '-',
                Some(TaskState::Ready) | Some(TaskState::Blocked) | Some(TaskState::Failed)
                | None => ' ',
            };
            let checkbox_match = caps.name("checkbox").unwrap();
            let current_glyph = checkbox_match.as_str().chars().next().unwrap();

            if taskset.state_of(id).is_some() && current_glyph != target_glyph {
                let start = checkbox_match.start();
                let end = checkbox_match.end();
                out.push_str(&body[..start]);
                out.push(target_glyph);
                out.push_str(&body[end..]);
                result.tasks_updated.push(id.to_string());
                tracing::debug!(task_id = %id, "plan sync: checkbox rewritten");
            } else {
                out.push_str(body);
            }
        } else {
            out.push_str(body);
        }
        out.push_str(ending);
    }

    (out, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PLAN: &str = "\
# Tasks

- [x] 1. Set up project scaffolding
  - Initialize the repository layout
- [ ] 2. Implement the parser
  - Handles the grammar described above
  - _Requirements: 1_
- [ ]* 3. Write optional docs
  - _Requirements: 1, 2_
";

    #[test]
    fn parse_plan_extracts_ids_titles_and_checkboxes() {
        let defs = parse_plan(SAMPLE_PLAN);
        assert_eq!(defs.len(), 3);
        assert_eq!(defs[0].id, "1");
        assert!(defs[0].completed);
        assert_eq!(defs[1].id, "2");
        assert!(!defs[1].completed);
        assert_eq!(defs[1].dependencies, vec!["1".to_string()]);
        assert!(defs[2].is_optional);
        assert_eq!(defs[2].dependencies, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn parse_plan_collects_description_bullets() {
        let defs = parse_plan(SAMPLE_PLAN);
        assert!(defs[0].description.contains("Initialize the repository layout"));
    }

    #[test]
    fn sync_from_plan_on_empty_store_creates_done_ready_blocked() {
        let (taskset, result) = sync_from_plan(None, SAMPLE_PLAN, "spec-a").unwrap();
        let taskset = taskset.expect("no cycle");
        assert!(result.success);
        assert_eq!(result.tasks_added.len(), 3);

        assert_eq!(taskset.state_of("1"), Some(TaskState::Done));
        assert_eq!(taskset.state_of("2"), Some(TaskState::Ready));
        assert_eq!(taskset.state_of("3"), Some(TaskState::Blocked));
    }

    #[test]
    fn sync_from_plan_refuses_a_cycle_without_touching_state() {
        let cyclic = "\
- [ ] 1. A
  - _Requirements: 2_
- [ ] 2. B
  - _Requirements: 1_
";
        let (taskset, result) = sync_from_plan(None, cyclic, "spec-a").unwrap();
        assert!(taskset.is_none());
        assert!(!result.success);
        assert!(result.errors.iter().any(|e| e.contains("circular")));
    }

    #[test]
    fn sync_from_plan_preserves_running_state_on_unchecked_box() {
        let mut existing = Taskset::new("spec-a");
        let mut task = Task::from_def(&TaskDef::new("1", "Do thing"), TaskState::Running);
        task.runner_id = Some("runner-1".to_string());
        existing.tasks.push(task);

        let plan = "- [ ] 1. Do thing\n";
        let (taskset, result) = sync_from_plan(Some(existing), plan, "spec-a").unwrap();
        let taskset = taskset.unwrap();
        // Unchecked box on a RUNNING task must not stomp the in-flight state.
        assert_eq!(taskset.state_of("1"), Some(TaskState::Running));
        assert!(!result.tasks_updated.contains(&"1".to_string()));
    }

    #[test]
    fn sync_from_plan_reopens_done_task_on_unchecked_box() {
        let mut existing = Taskset::new("spec-a");
        existing
            .tasks
            .push(Task::from_def(&TaskDef::new("1", "Do thing"), TaskState::Done));

        let plan = "- [ ] 1. Do thing\n";
        let (taskset, _result) = sync_from_plan(Some(existing), plan, "spec-a").unwrap();
        assert_eq!(taskset.unwrap().state_of("1"), Some(TaskState::Ready));
    }

    #[test]
    fn sync_from_plan_reports_removed_tasks_without_deleting() {
        let mut existing = Taskset::new("spec-a");
        existing
            .tasks
            .push(Task::from_def(&TaskDef::new("9", "Stale"), TaskState::Ready));

        let plan = "- [ ] 1. New\n";
        let (taskset, result) = sync_from_plan(Some(existing), plan, "spec-a").unwrap();
        let taskset = taskset.unwrap();
        assert_eq!(result.tasks_removed, vec!["9".to_string()]);
        assert!(taskset.find_task("9").is_some());
    }

    #[test]
    fn sync_to_plan_rewrites_only_the_checkbox_byte_span() {
        let mut taskset = Taskset::new("spec-a");
        taskset
            .tasks
            .push(Task::from_def(&TaskDef::new("2", "Implement the parser"), TaskState::Done));

        let (rewritten, result) = sync_to_plan(&taskset, SAMPLE_PLAN);
        assert_eq!(result.tasks_updated, vec!["2".to_string()]);
        assert!(rewritten.contains("- [x] 2. Implement the parser"));
        // Task 1's line and all description bullets are untouched.
        assert!(rewritten.contains("- [x] 1. Set up project scaffolding"));
        assert!(rewritten.contains("Initialize the repository layout"));
    }

    #[test]
    fn sync_to_plan_reports_nothing_when_no_glyph_changes() {
        let mut taskset = Taskset::new("spec-a");
        taskset
            .tasks
            .push(Task::from_def(&TaskDef::new("1", "Set up project scaffolding"), TaskState::Done));
        let (_rewritten, result) = sync_to_plan(&taskset, SAMPLE_PLAN);
        assert!(result.tasks_updated.is_empty());
    }
}

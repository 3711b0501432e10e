//! Filter/sort/paginate tasks from an already-loaded taskset (§4.6).
//!
//! Pure and side-effect free: every function here borrows a [`Taskset`] and
//! returns owned `Vec<&Task>`/`Vec<Task>` slices. Unknown filter keys are a
//! contract violation for callers but must never fault — [`QueryFilter`] is
//! a closed struct precisely so the recognized keys are the only ones that
//! exist; callers reaching for the generic [`query`] entry point with a
//! stringly-typed map get the same "ignore, don't fault" treatment via
//! [`QueryFilter::from_map`].

use std::collections::HashMap;

use serde_json::Value;

use crate::model::{Task, TaskState};

/// Sort key recognized by [`sort`]. Unrecognized keys parsed from a
/// stringly-typed source are simply absent from this enum, which is how
/// "unknown sort keys are ignored" is realized in a closed-variant model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    PriorityDesc,
    CreatedAtAsc,
    UpdatedAtAsc,
    IdAsc,
}

impl SortBy {
    pub fn from_str_opt(s: &str) -> Option<SortBy> {
        match s {
            "priority" | "priority_desc" => Some(SortBy::PriorityDesc),
            "created_at" | "created_at_asc" => Some(SortBy::CreatedAtAsc),
            "updated_at" | "updated_at_asc" => Some(SortBy::UpdatedAtAsc),
            "id" | "id_asc" => Some(SortBy::IdAsc),
            _ => None,
        }
    }
}

/// The recognized filter keys from §4.6:
/// `{state, required_skill, is_optional, has_dependencies, runner_id, assigned_slot}`.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub state: Option<TaskState>,
    pub required_skill: Option<String>,
    pub is_optional: Option<bool>,
    pub has_dependencies: Option<bool>,
    pub runner_id: Option<String>,
    pub assigned_slot: Option<String>,
}

impl QueryFilter {
    /// Builds a filter from a stringly-typed map, as a caller passing
    /// loosely-typed input (e.g. deserialized from a request body) would.
    /// Keys outside the recognized set are ignored rather than rejected.
    pub fn from_map(map: &HashMap<String, Value>) -> QueryFilter {
        let mut filter = QueryFilter::default();
        if let Some(v) = map.get("state").and_then(Value::as_str) {
            filter.state = v.parse().ok();
        }
        if let Some(v) = map.get("required_skill").and_then(Value::as_str) {
            filter.required_skill = Some(v.to_string());
        }
        if let Some(v) = map.get("is_optional").and_then(Value::as_bool) {
            filter.is_optional = Some(v);
        }
        if let Some(v) = map.get("has_dependencies").and_then(Value::as_bool) {
            filter.has_dependencies = Some(v);
        }
        if let Some(v) = map.get("runner_id").and_then(Value::as_str) {
            filter.runner_id = Some(v.to_string());
        }
        if let Some(v) = map.get("assigned_slot").and_then(Value::as_str) {
            filter.assigned_slot = Some(v.to_string());
        }
        filter
    }

    fn matches(&self, task: &Task) -> bool {
        if let Some(state) = self.state {
            if task.state != state {
                return false;
            }
        }
        if let Some(skill) = &self.required_skill {
            if task.required_skill.as_deref() != Some(skill.as_str()) {
                return false;
            }
        }
        if let Some(opt) = self.is_optional {
            if task.is_optional != opt {
                return false;
            }
        }
        if let Some(has_deps) = self.has_dependencies {
            if !task.dependencies.is_empty() != !has_deps {
                return false;
            }
        }
        if let Some(runner) = &self.runner_id {
            if task.runner_id.as_deref() != Some(runner.as_str()) {
                return false;
            }
        }
        if let Some(slot) = &self.assigned_slot {
            if task.assigned_slot.as_deref() != Some(slot.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Filters `tasks` against `filter`, then applies a stable `sort_by` (if
/// given), then `offset`/`limit`.
pub fn query<'a>(
    tasks: &'a [Task],
    filter: &QueryFilter,
    sort_by: Option<SortBy>,
    offset: usize,
    limit: Option<usize>,
) -> Vec<&'a Task> {
    let mut matched: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();

    if let Some(sort_by) = sort_by {
        sort(&mut matched, sort_by);
    }

    let start = offset.min(matched.len());
    let end = match limit {
        Some(n) => (start + n).min(matched.len()),
        None => matched.len(),
    };
    matched[start..end].to_vec()
}

/// Stable sort in place by `sort_by`.
pub fn sort(tasks: &mut [&Task], sort_by: SortBy) {
    match sort_by {
        SortBy::PriorityDesc => tasks.sort_by(|a, b| b.priority.cmp(&a.priority)),
        SortBy::CreatedAtAsc => tasks.sort_by_key(|t| t.created_at),
        SortBy::UpdatedAtAsc => tasks.sort_by_key(|t| t.updated_at),
        SortBy::IdAsc => tasks.sort_by(|a, b| a.id.cmp(&b.id)),
    }
}

/// Convenience: tasks in the given state.
pub fn filter_by_state(tasks: &[Task], state: TaskState) -> Vec<&Task> {
    tasks.iter().filter(|t| t.state == state).collect()
}

/// Convenience: tasks tagged with the given required skill.
pub fn filter_by_skill<'a>(tasks: &'a [Task], skill: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.required_skill.as_deref() == Some(skill))
        .collect()
}

/// Convenience: all tasks sorted by descending priority.
pub fn sort_by_priority(tasks: &[Task]) -> Vec<&Task> {
    let mut all: Vec<&Task> = tasks.iter().collect();
    sort(&mut all, SortBy::PriorityDesc);
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap as StdHashMap;

    fn task(id: &str, priority: i64, state: TaskState) -> Task {
        Task {
            id: id.to_string(),
            title: String::new(),
            description: String::new(),
            state,
            dependencies: Vec::new(),
            is_optional: false,
            priority,
            required_skill: None,
            assigned_slot: None,
            reserved_branch: None,
            runner_id: None,
            artifacts: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            metadata: StdHashMap::new(),
        }
    }

    #[test]
    fn filter_by_state_convenience_matches_direct_field_filter() {
        let tasks = vec![
            task("1", 0, TaskState::Ready),
            task("2", 0, TaskState::Done),
        ];
        assert_eq!(filter_by_state(&tasks, TaskState::Ready).len(), 1);
    }

    #[test]
    fn unknown_filter_keys_are_ignored_not_rejected() {
        let mut map = HashMap::new();
        map.insert("bogus_key".to_string(), Value::String("whatever".into()));
        map.insert("state".to_string(), Value::String("ready".into()));
        let filter = QueryFilter::from_map(&map);
        assert_eq!(filter.state, Some(TaskState::Ready));

        let tasks = vec![task("1", 0, TaskState::Ready)];
        let results = query(&tasks, &filter, None, 0, None);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn sort_by_priority_desc_is_stable_for_ties() {
        let tasks = vec![
            task("a", 5, TaskState::Ready),
            task("b", 10, TaskState::Ready),
            task("c", 5, TaskState::Ready),
        ];
        let sorted = sort_by_priority(&tasks);
        assert_eq!(sorted[0].id, "b");
        // "a" and "c" tie at priority 5; stable sort preserves input order.
        assert_eq!(sorted[1].id, "a");
        assert_eq!(sorted[2].id, "c");
    }

    #[test]
    fn offset_and_limit_paginate_after_sort() {
        let tasks = vec![
            task("a", 1, TaskState::Ready),
            task("b", 3, TaskState::Ready),
            task("c", 2, TaskState::Ready),
        ];
        let filter = QueryFilter::default();
        let page = query(&tasks, &filter, Some(SortBy::PriorityDesc), 1, Some(1));
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "c");
    }
}

//! Dependency-graph services: cycle detection, level-wise topological
//! ordering, and textual diagram export (§4.5).
//!
//! Deliberately not built on a general-purpose graph crate: the task count
//! is small (hundreds to low thousands) and an inline traversal over
//! `HashMap`/`HashSet` is clearer than pulling in a dependency for a
//! well-understood, small algorithm.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Write as _;

use crate::model::{Task, TaskState, Taskset};

/// Depth-first search with a recursion-stack marker set. Returns the first
/// cycle found as an ordered list of task ids, or `None` if the graph is
/// acyclic.
pub fn detect_cycle(tasks: &[Task]) -> Option<Vec<String>> {
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_stack: HashSet<&str> = HashSet::new();
    let mut path: Vec<&str> = Vec::new();

    fn visit<'a>(
        id: &'a str,
        by_id: &HashMap<&'a str, &'a Task>,
        visited: &mut HashSet<&'a str>,
        on_stack: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        if on_stack.contains(id) {
            let start = path.iter().position(|x| *x == id).unwrap_or(0);
            let mut chain: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
            chain.push(id.to_string());
            return Some(chain);
        }
        if visited.contains(id) {
            return None;
        }
        visited.insert(id);
        on_stack.insert(id);
        path.push(id);

        if let Some(task) = by_id.get(id) {
            for dep in &task.dependencies {
                if let Some(cycle) = visit(dep.as_str(), by_id, visited, on_stack, path) {
                    return Some(cycle);
                }
            }
        }

        path.pop();
        on_stack.remove(id);
        None
    }

    for task in tasks {
        if let Some(cycle) = visit(task.id.as_str(), &by_id, &mut visited, &mut on_stack, &mut path)
        {
            return Some(cycle);
        }
    }
    None
}

/// Kahn-style level-wise topological ordering. Each level is the set of
/// unprocessed tasks whose remaining in-degree (against unprocessed
/// predecessors) is zero; levels are emitted in dependency order and may
/// each run in parallel once prior levels are `Done`.
///
/// If a residue remains after no further progress can be made (a cycle is
/// present), the residue is emitted as a final level rather than raising —
/// callers use it to diagnose which tasks are stuck.
pub fn execution_order(tasks: &[Task]) -> Vec<Vec<String>> {
    let mut remaining: HashMap<&str, HashSet<&str>> = tasks
        .iter()
        .map(|t| (t.id.as_str(), t.dependencies.iter().map(|d| d.as_str()).collect()))
        .collect();

    let mut levels = Vec::new();
    while !remaining.is_empty() {
        let ready: Vec<&str> = remaining
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(id, _)| *id)
            .collect();

        if ready.is_empty() {
            // Cycle: emit the residue as a diagnostic final level.
            let mut residue: Vec<String> = remaining.keys().map(|s| s.to_string()).collect();
            residue.sort();
            levels.push(residue);
            break;
        }

        let mut level: Vec<String> = ready.iter().map(|s| s.to_string()).collect();
        level.sort();

        for id in &ready {
            remaining.remove(id);
        }
        for deps in remaining.values_mut() {
            for id in &ready {
                deps.remove(id);
            }
        }
        levels.push(level);
    }
    levels
}

fn state_color(state: TaskState) -> &'static str {
    match state {
        TaskState::Ready => "green",
        TaskState::Running => "gold",
        TaskState::Blocked => "grey",
        TaskState::Done => "blue",
        TaskState::Failed => "red",
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Mermaid forbids dots and dashes in node ids; this sanitizes an id for use
/// as a Mermaid node identifier. Human-readable labels are left untouched.
fn mermaid_node_id(id: &str) -> String {
    id.chars()
        .map(|c| if c == '.' || c == '-' { '_' } else { c })
        .collect()
}

/// Renders the dependency graph as Graphviz DOT. Node styling encodes
/// state by fill color; optional tasks render with a dashed outline.
pub fn to_dot(taskset: &Taskset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph \"{}\" {{", escape_quotes(&taskset.spec_name));
    let _ = writeln!(out, "  rankdir=LR;");

    for task in &taskset.tasks {
        let label = escape_quotes(&format!("{}: {}", task.id, task.title));
        let style = if task.is_optional { "dashed" } else { "solid" };
        let _ = writeln!(
            out,
            "  \"{}\" [label=\"{}\", style={}, fillcolor={}, color={}, fontcolor=black, \
             shape=box, penwidth=2];",
            escape_quotes(&task.id),
            label,
            style,
            state_color(task.state),
            state_color(task.state),
        );
    }
    for task in &taskset.tasks {
        for dep in &task.dependencies {
            let _ = writeln!(
                out,
                "  \"{}\" -> \"{}\";",
                escape_quotes(dep),
                escape_quotes(&task.id)
            );
        }
    }
    out.push_str("}\n");
    out
}

/// Renders the dependency graph as a Mermaid flowchart.
pub fn to_mermaid(taskset: &Taskset) -> String {
    let mut out = String::new();
    out.push_str("flowchart LR\n");

    for task in &taskset.tasks {
        let node = mermaid_node_id(&task.id);
        let label = escape_quotes(&format!("{}: {}", task.id, task.title));
        let _ = writeln!(out, "  {node}[\"{label}\"]");
        let _ = writeln!(out, "  style {node} fill:{}", state_color(task.state));
        if task.is_optional {
            let _ = writeln!(out, "  style {node} stroke-dasharray: 5 5");
        }
    }
    for task in &taskset.tasks {
        let to = mermaid_node_id(&task.id);
        for dep in &task.dependencies {
            let from = mermaid_node_id(dep);
            let _ = writeln!(out, "  {from} --> {to}");
        }
    }
    out
}

/// Breadth-first collection of every task transitively reachable as a
/// dependency of `task_id`, used by the plan-sync cascade diagnostics.
pub fn transitive_dependencies(tasks: &[Task], task_id: &str) -> HashSet<String> {
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(task_id.to_string());
    while let Some(id) = queue.pop_front() {
        if let Some(task) = by_id.get(id.as_str()) {
            for dep in &task.dependencies {
                if seen.insert(dep.clone()) {
                    queue.push_back(dep.clone());
                }
            }
        }
    }
    seen
}

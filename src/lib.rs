//! Persistent, concurrent task registry for a multi-agent code-generation
//! orchestrator.
//!
//! A [`registry::Registry`] owns a directory tree (`tasksets/`, `events/`,
//! `locks/`, `backups/`) holding one versioned [`model::Taskset`] per spec.
//! Mutating operations take an OS-level advisory lock ([`lock::LockManager`])
//! so multiple dispatcher/runner processes on the same host never interleave
//! writes to the same spec; every write goes through the store's
//! write-temp-then-rename discipline so a lock-free reader never observes a
//! torn document.
//!
//! ```text
//! Registry
//!   ├── config::RegistryConfig / config::ConfigRoots   root dir resolution
//!   ├── lock::LockManager                               per-spec mutual exclusion
//!   ├── store::TaskStore                                taskset.json persistence
//!   ├── events::EventStore                               append-only event log
//!   ├── graph                                            cycle detection, ordering, diagrams
//!   ├── query                                            filter/sort/paginate
//!   └── plan                                             plan-document sync
//! ```
pub mod config;
pub mod errors;
pub mod events;
pub mod graph;
pub mod lock;
pub mod model;
pub mod plan;
pub mod query;
pub mod registry;
pub mod store;

pub use config::{ConfigRoots, RegistryConfig};
pub use errors::RegistryError;
pub use model::{Artifact, ArtifactType, EventType, Task, TaskDef, TaskEvent, TaskState, Taskset};
pub use registry::Registry;

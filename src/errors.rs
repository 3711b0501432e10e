//! Error types for the task registry crate.
//!
//! This module defines a unified error enumeration used across configuration,
//! locking, persistence, the event log, the dependency graph, and plan-document
//! synchronization. It integrates with `thiserror` to provide rich `Display`
//! implementations and error source chaining where applicable.
//!
//! Notes:
//! - Each variant carries contextual details via its message payload.
//! - Exactly one variant is returned per failed API call: callers never need
//!   to inspect more than one error to understand what happened.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
/// Unified error enumeration for the task registry.
///
/// - Used across `ConfigRoots`, `LockManager`, `TaskStore`, `EventStore`,
///   `GraphEngine`, `PlanSync`, and the `Registry` facade.
/// - Implements `std::error::Error` via `thiserror`.
pub enum RegistryError {
    /// A referenced taskset does not exist.
    #[error("taskset `{0}` not found")]
    TasksetNotFound(String),

    /// A referenced task does not exist within its taskset.
    #[error("task `{task_id}` not found in taskset `{spec_name}`")]
    TaskNotFound { spec_name: String, task_id: String },

    /// The requested state transition is not permitted by the transition table.
    #[error("cannot transition task `{task_id}` from {from} to {to}")]
    InvalidStateTransition {
        task_id: String,
        from: String,
        to: String,
    },

    /// The dependency graph (or a parsed plan) contains a cycle.
    #[error("circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    /// The per-spec lock could not be acquired within the configured window.
    #[error("timed out after {timeout:?} acquiring lock for `{spec_name}`")]
    LockTimeout {
        spec_name: String,
        timeout: Duration,
    },

    /// The plan document could not be read, parsed, or written back.
    #[error("plan sync error for `{spec_name}`: {reason}")]
    SyncError { spec_name: String, reason: String },

    /// A persisted document failed required-field validation.
    #[error("integrity check failed: {0}")]
    IntegrityError(String),

    /// Underlying filesystem operation failed.
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    /// The taskset (or plan) document could not be (de)serialized.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// `RegistryConfig` failed construction-time validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

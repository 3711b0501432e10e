//! Append-only per-spec event log in line-delimited JSON, with size-triggered
//! rotation (§4.4).
//!
//! `EventStore` exclusively owns the `events/` directory. Read paths
//! (`get_by_task`, `get_by_time_range`, `get_all`) tolerate per-line
//! corruption by skipping malformed lines silently — this is the
//! corruption-tolerant replay the spec requires, not a bug.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::errors::RegistryError;
use crate::model::TaskEvent;

/// Owns `events/<spec>/events.jsonl` (and rotated siblings) for every spec.
#[derive(Debug, Clone)]
pub struct EventStore {
    events_dir: PathBuf,
}

impl EventStore {
    pub fn new(events_dir: PathBuf) -> Self {
        Self { events_dir }
    }

    fn spec_dir(&self, spec_name: &str) -> PathBuf {
        self.events_dir.join(spec_name)
    }

    fn log_path(&self, spec_name: &str) -> PathBuf {
        self.spec_dir(spec_name).join("events.jsonl")
    }

    /// Appends one event as a single UTF-8 line terminated by `\n`.
    pub fn record(&self, event: &TaskEvent) -> Result<(), RegistryError> {
        let dir = self.spec_dir(&event.spec_name);
        fs::create_dir_all(&dir)?;
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(&event.spec_name))?;
        file.write_all(&line)?;
        Ok(())
    }

    fn read_lines(&self, spec_name: &str) -> Result<Vec<TaskEvent>, RegistryError> {
        let path = self.log_path(spec_name);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RegistryError::IOError(e)),
        };
        let reader = BufReader::new(file);
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => continue,
            };
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(event) = serde_json::from_str::<TaskEvent>(&line) {
                events.push(event);
            }
            // Malformed lines are skipped silently: corruption-tolerant replay.
        }
        Ok(events)
    }

    pub fn get_all(&self, spec_name: &str) -> Result<Vec<TaskEvent>, RegistryError> {
        self.read_lines(spec_name)
    }

    pub fn get_by_task(
        &self,
        spec_name: &str,
        task_id: &str,
    ) -> Result<Vec<TaskEvent>, RegistryError> {
        Ok(self
            .read_lines(spec_name)?
            .into_iter()
            .filter(|e| e.task_id == task_id)
            .collect())
    }

    pub fn get_by_time_range(
        &self,
        spec_name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TaskEvent>, RegistryError> {
        Ok(self
            .read_lines(spec_name)?
            .into_iter()
            .filter(|e| e.timestamp >= start && e.timestamp <= end)
            .collect())
    }

    /// Walks every spec directory; any `events.jsonl` at or beyond
    /// `max_bytes` is renamed to the lowest unused `events.jsonl.<N>` and a
    /// fresh empty file takes its place. Rotation is atomic at the rename
    /// step, so no event is ever lost.
    pub fn rotate(&self, max_bytes: u64) -> Result<Vec<String>, RegistryError> {
        let mut rotated = Vec::new();
        if !self.events_dir.is_dir() {
            return Ok(rotated);
        }
        for entry in fs::read_dir(&self.events_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let spec_name = entry.file_name().to_string_lossy().into_owned();
            let log_path = self.log_path(&spec_name);
            let Ok(meta) = fs::metadata(&log_path) else {
                continue;
            };
            if meta.len() < max_bytes {
                continue;
            }

            let mut n = 1u32;
            loop {
                let candidate = self.spec_dir(&spec_name).join(format!("events.jsonl.{n}"));
                if !candidate.exists() {
                    fs::rename(&log_path, &candidate)?;
                    break;
                }
                n += 1;
            }
            File::create(&log_path)?;
            tracing::info!(
                spec_name = %spec_name,
                rotated_bytes = meta.len(),
                "rotated event log"
            );
            rotated.push(spec_name);
        }
        Ok(rotated)
    }

    /// Test/ops utility: deletes the spec's `events.jsonl` outright. Not
    /// part of the normal operational surface and not exposed through the
    /// Registry facade.
    pub fn clear_events(&self, spec_name: &str) -> Result<(), RegistryError> {
        match fs::remove_file(self.log_path(spec_name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RegistryError::IOError(e)),
        }
    }
}

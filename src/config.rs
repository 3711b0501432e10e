//! Registry configuration and filesystem root resolution.
//!
//! [`RegistryConfig`] is the single programmatic configuration surface for
//! the registry (§6: the registry has no CLI or environment-variable surface
//! of its own — the embedding application is responsible for constructing
//! one, typically with [`RegistryConfig::default`] plus targeted overrides).
//! [`ConfigRoots`] turns a resolved root directory into the four sibling
//! directories the rest of the crate reads and writes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::RegistryError;

fn default_root_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".necrocode").join("registry")
}

/// Programmatic configuration for a [`crate::registry::Registry`] instance.
///
/// `Serialize`/`Deserialize` so embedders who want file-based configuration
/// can layer that on without this crate needing to own a config-loading
/// story of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub root_dir: PathBuf,
    #[serde(with = "duration_secs")]
    pub lock_timeout: Duration,
    #[serde(with = "duration_millis")]
    pub lock_poll_interval: Duration,
    pub event_log_max_bytes: u64,
    pub backup_enabled: bool,
    pub backup_interval_hours: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            lock_timeout: Duration::from_secs(30),
            lock_poll_interval: Duration::from_millis(10),
            event_log_max_bytes: 100 * 1024 * 1024,
            backup_enabled: true,
            backup_interval_hours: 24,
        }
    }
}

impl RegistryConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// Validates that every duration/size field is strictly positive.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.lock_timeout.is_zero() {
            return Err(RegistryError::Config(
                "lock_timeout must be strictly positive".to_string(),
            ));
        }
        if self.lock_poll_interval.is_zero() {
            return Err(RegistryError::Config(
                "lock_poll_interval must be strictly positive".to_string(),
            ));
        }
        if self.event_log_max_bytes == 0 {
            return Err(RegistryError::Config(
                "event_log_max_bytes must be strictly positive".to_string(),
            ));
        }
        if self.backup_enabled && self.backup_interval_hours == 0 {
            return Err(RegistryError::Config(
                "backup_interval_hours must be strictly positive when backups are enabled"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

mod duration_secs {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

mod duration_millis {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Resolves and idempotently creates the four sibling directories the
/// registry owns: `tasksets/`, `events/`, `locks/`, `backups/`.
#[derive(Debug, Clone)]
pub struct ConfigRoots {
    root: PathBuf,
    tasksets: PathBuf,
    events: PathBuf,
    locks: PathBuf,
    backups: PathBuf,
}

impl ConfigRoots {
    /// Resolves roots from `config` and creates every directory. Creation is
    /// idempotent: an existing directory tree is left untouched.
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        config.validate()?;
        let root = config.root_dir.clone();
        let roots = Self {
            tasksets: root.join("tasksets"),
            events: root.join("events"),
            locks: root.join("locks"),
            backups: root.join("backups"),
            root,
        };
        roots.ensure_created()?;
        Ok(roots)
    }

    fn ensure_created(&self) -> Result<(), RegistryError> {
        for dir in [&self.tasksets, &self.events, &self.locks, &self.backups] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tasksets_dir(&self) -> &Path {
        &self.tasksets
    }

    pub fn events_dir(&self) -> &Path {
        &self.events
    }

    pub fn locks_dir(&self) -> &Path {
        &self.locks
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups
    }
}

//! Per-spec advisory file locking (§4.2).
//!
//! Lock identity is a zero-byte file `locks/<spec_name>.lock`. Acquisition
//! takes an OS-level advisory whole-file lock (`flock(2)`) so correctness
//! holds across processes, not only threads within one process — this is
//! what makes the registry safe for multiple dispatcher/runner processes on
//! the same host (§5).

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crate::errors::RegistryError;

/// Owns the `locks/` directory and hands out scoped [`LockGuard`]s.
#[derive(Debug, Clone)]
pub struct LockManager {
    locks_dir: PathBuf,
}

impl LockManager {
    pub fn new(locks_dir: PathBuf) -> Self {
        Self { locks_dir }
    }

    fn lock_path(&self, spec_name: &str) -> PathBuf {
        self.locks_dir.join(format!("{spec_name}.lock"))
    }

    fn open_lock_file(&self, spec_name: &str) -> Result<File, RegistryError> {
        Ok(OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(spec_name))?)
    }

    /// Blocks (polling at `poll_interval`) until the lock for `spec_name` is
    /// held or `timeout` elapses, whichever comes first. `timeout` of zero
    /// is a single non-blocking attempt.
    pub fn acquire(
        &self,
        spec_name: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<LockGuard, RegistryError> {
        let file = self.open_lock_file(spec_name)?;
        let fd = file.as_raw_fd();
        let deadline = Instant::now() + timeout;

        loop {
            let rc = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
            if rc == 0 {
                return Ok(LockGuard {
                    file,
                    spec_name: spec_name.to_string(),
                });
            }
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::EWOULDBLOCK) {
                return Err(RegistryError::IOError(err));
            }
            if Instant::now() >= deadline {
                return Err(RegistryError::LockTimeout {
                    spec_name: spec_name.to_string(),
                    timeout,
                });
            }
            thread::sleep(poll_interval.min(deadline.saturating_duration_since(Instant::now())));
        }
    }

    /// Non-blocking probe: true iff some other holder currently has the
    /// lock for `spec_name`.
    pub fn is_locked(&self, spec_name: &str) -> Result<bool, RegistryError> {
        let file = self.open_lock_file(spec_name)?;
        let fd = file.as_raw_fd();
        let rc = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
        if rc == 0 {
            // We just took the lock ourselves; release it immediately.
            unsafe { libc::flock(fd, libc::LOCK_UN) };
            Ok(false)
        } else {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
                Ok(true)
            } else {
                Err(RegistryError::IOError(err))
            }
        }
    }

    /// Operator escape hatch: forcibly removes the lock file so a wedged
    /// lock can be cleared. Logs prominently — this bypasses the normal
    /// mutual-exclusion protocol and can allow a concurrent writer in.
    pub fn force_unlock(&self, spec_name: &str) -> Result<(), RegistryError> {
        tracing::warn!(
            spec_name,
            "force-unlocking spec via operator escape hatch; this bypasses the normal \
             mutual-exclusion protocol and may race a legitimate holder"
        );
        let path = self.lock_path(spec_name);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RegistryError::IOError(e)),
        }
    }
}

/// RAII guard returned by [`LockManager::acquire`]. The lock is released on
/// every exit path, including an unwinding panic, because release happens in
/// `Drop` rather than at an explicit call site.
pub struct LockGuard {
    file: File,
    spec_name: String,
}

impl LockGuard {
    pub fn spec_name(&self) -> &str {
        &self.spec_name
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let fd = self.file.as_raw_fd();
        unsafe {
            libc::flock(fd, libc::LOCK_UN);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_and_release_round_trips() {
        let dir = TempDir::new().unwrap();
        let mgr = LockManager::new(dir.path().to_path_buf());
        {
            let _guard = mgr
                .acquire("spec-a", Duration::from_millis(50), Duration::from_millis(5))
                .expect("acquire");
            assert!(mgr.is_locked("spec-a").unwrap());
        }
        assert!(!mgr.is_locked("spec-a").unwrap());
    }

    #[test]
    fn contended_acquire_times_out() {
        let dir = TempDir::new().unwrap();
        let mgr = LockManager::new(dir.path().to_path_buf());
        let _holder = mgr
            .acquire("spec-b", Duration::from_millis(50), Duration::from_millis(5))
            .expect("first acquire");

        let err = mgr
            .acquire("spec-b", Duration::from_millis(20), Duration::from_millis(5))
            .expect_err("should time out while held");
        assert!(matches!(err, RegistryError::LockTimeout { .. }));
    }

    #[test]
    fn zero_timeout_fails_fast_when_contended() {
        let dir = TempDir::new().unwrap();
        let mgr = LockManager::new(dir.path().to_path_buf());
        let _holder = mgr
            .acquire("spec-c", Duration::from_millis(50), Duration::from_millis(5))
            .unwrap();
        let err = mgr
            .acquire("spec-c", Duration::ZERO, Duration::from_millis(1))
            .expect_err("contended");
        assert!(matches!(err, RegistryError::LockTimeout { .. }));
    }

    #[test]
    fn force_unlock_clears_a_wedged_lock() {
        let dir = TempDir::new().unwrap();
        let mgr = LockManager::new(dir.path().to_path_buf());
        let guard = mgr
            .acquire("spec-d", Duration::from_millis(50), Duration::from_millis(5))
            .unwrap();
        std::mem::forget(guard); // simulate a wedged holder that never drops
        mgr.force_unlock("spec-d").expect("force unlock");
        mgr.acquire("spec-d", Duration::from_millis(50), Duration::from_millis(5))
            .expect("lock file recreated and acquirable");
    }
}

//! Per-version locking
//!
//! Serializes unpack work on one version directory across threads and
//! processes. A lock is an in-process mutex keyed by lock file path plus an
//! advisory exclusive `fs2` lock on the file itself. Both are released on
//! drop.

use crate::error::{CacheError, CacheResult};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, TryLockError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const CONTENTION_WARN_AFTER: Duration = Duration::from_millis(500);

/// Exclusive lock on one version directory
#[derive(Debug)]
pub struct VersionLock {
    file: File,
    path: PathBuf,
    _guard: MutexGuard<'static, ()>,
}

impl VersionLock {
    /// Acquire the lock, waiting up to `timeout`
    pub fn acquire(path: &Path, timeout: Duration) -> CacheResult<Self> {
        let start = Instant::now();
        let mut warned = false;

        loop {
            if let Some(lock) = Self::try_acquire(path)? {
                if warned {
                    debug!(
                        "Lock acquired after {:.1}s contention: {}",
                        start.elapsed().as_secs_f64(),
                        path.display()
                    );
                }
                return Ok(lock);
            }

            if start.elapsed() >= timeout {
                return Err(CacheError::LockTimeout {
                    path: path.to_path_buf(),
                    timeout,
                });
            }
            if !warned && start.elapsed() > CONTENTION_WARN_AFTER {
                warn!("Lock contention on {}, waiting...", path.display());
                warned = true;
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Try to acquire the lock without waiting
    ///
    /// Returns `Ok(None)` if another thread or process holds it.
    pub fn try_acquire(path: &Path) -> CacheResult<Option<Self>> {
        let guard = match process_lock_for_path(path).try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Ok(None),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CacheError::io(format!("creating {}", parent.display()), e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| CacheError::io(format!("opening lock file {}", path.display()), e))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self {
                file,
                path: path.to_path_buf(),
                _guard: guard,
            })),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => Ok(None),
            Err(e) => Err(CacheError::io(format!("locking {}", path.display()), e)),
        }
    }

    /// Lock file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for VersionLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn process_lock_for_path(path: &Path) -> &'static Mutex<()> {
    static PROCESS_LOCKS: OnceLock<Mutex<HashMap<PathBuf, &'static Mutex<()>>>> = OnceLock::new();
    let locks = PROCESS_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));

    let mut map = locks
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(existing) = map.get(path) {
        return existing;
    }

    let mutex: &'static Mutex<()> = Box::leak(Box::new(Mutex::new(())));
    map.insert(path.to_path_buf(), mutex);
    mutex
}

//! Scoped working-directory changes
//!
//! The process working directory is global state. Every change goes through [`ScopedWorkingDir`], which holds
//! a process-wide lock for as long as the directory is changed and restores the previous directory when
//! dropped, on every exit path including early returns and unwinding.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

static WORKDIR_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    // A panic while the directory was changed still ran the guard's Drop, so the state is consistent.
    WORKDIR_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Guard that keeps the working directory at `dir` until dropped.
#[derive(Debug)]
pub struct ScopedWorkingDir {
    previous: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedWorkingDir {
    /// Move into `dir`. Blocks while another guard is alive; not reentrant.
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let guard = lock();
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        tracing::trace!(from = %previous.display(), to = %dir.display(), "entered working directory");
        Ok(Self { previous, _lock: guard })
    }
}

impl Drop for ScopedWorkingDir {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            tracing::error!("failed to restore working directory {}: {}", self.previous.display(), e);
        }
    }
}

/// Read the working directory without racing an active guard.
pub fn current_dir() -> io::Result<PathBuf> {
    let _guard = lock();
    env::current_dir()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_restores_on_drop() {
        let before = current_dir().unwrap();
        let target = tempfile::tempdir().unwrap();
        {
            let _scope = ScopedWorkingDir::enter(target.path()).unwrap();
            assert_eq!(
                env::current_dir().unwrap().canonicalize().unwrap(),
                target.path().canonicalize().unwrap()
            );
        }
        assert_eq!(current_dir().unwrap(), before);
    }

    #[test]
    fn test_restores_on_unwind() {
        let before = current_dir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let path = target.path().to_path_buf();

        let result = std::panic::catch_unwind(move || {
            let _scope = ScopedWorkingDir::enter(&path).unwrap();
            panic!("invocation blew up");
        });

        assert!(result.is_err());
        assert_eq!(current_dir().unwrap(), before);
    }

    #[test]
    fn test_missing_dir_leaves_cwd_alone() {
        let before = current_dir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let err = ScopedWorkingDir::enter(&target.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(current_dir().unwrap(), before);
    }
}

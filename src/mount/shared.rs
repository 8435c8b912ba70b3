//! Mutex-guarded mount for threaded hosts.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{CommandReply, Mount, MountStatus};
use crate::axis::Axis;
use crate::coords::{GemTransform, Transform};
use crate::error::CommandResult;
use crate::tls::TimeLocationSource;

/// A [`Mount`] shared between a command thread and a monitor thread.
///
/// Every access takes the same lock, so a command never observes or
/// interleaves with a half-finished monitor tick. Clones share the mount.
pub struct SharedMount<A, S, T = GemTransform>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    inner: Arc<Mutex<Mount<A, S, T>>>,
}

impl<A, S, T> Clone for SharedMount<A, S, T>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, S, T> SharedMount<A, S, T>
where
    A: Axis,
    S: TimeLocationSource,
    T: Transform,
{
    /// Wrap a mount.
    pub fn new(mount: Mount<A, S, T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(mount)),
        }
    }

    // A panic while holding the lock leaves the mount usable; every
    // transition assigns state only after validation succeeds.
    fn lock(&self) -> MutexGuard<'_, Mount<A, S, T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Execute a command. See [`Mount::command`].
    ///
    /// # Errors
    ///
    /// As [`Mount::command`].
    pub fn command(&self, code: &str, parameter: &str) -> CommandResult<CommandReply> {
        self.lock().command(code, parameter)
    }

    /// Run one monitor tick. See [`Mount::monitor`].
    pub fn monitor(&self, now_ms: u64) {
        self.lock().monitor(now_ms);
    }

    /// Snapshot of the mount state.
    pub fn status(&self) -> MountStatus {
        self.lock().status()
    }

    /// Run a closure with exclusive access to the mount.
    pub fn with<R>(&self, f: impl FnOnce(&mut Mount<A, S, T>) -> R) -> R {
        f(&mut self.lock())
    }
}

//! A value paired with its reader/writer lock.
//!
//! The value is only reachable from inside a closure run while the lock is
//! held, so no reference can outlive the guard and no caller can forget to
//! take the lock. Closures are synchronous: nothing is awaited while holding it.

use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct Guarded<T> {
    inner: RwLock<T>,
}

impl<T> Guarded<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    /// Run `f` with shared access. Any number of readers may run at once.
    pub async fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.read().await;
        f(&guard)
    }

    /// Run `f` with exclusive access.
    pub async fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.write().await;
        f(&mut guard)
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

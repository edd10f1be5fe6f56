//! Liveness handles for view-scoped async work.
//!
//! A view takes a handle when it starts a request and revokes it when it goes
//! away. Completions are applied only through a live handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the owning view as gone. Affects every clone.
    pub fn revoke(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Run `apply` only if the owner is still alive.
    pub fn apply<T>(&self, apply: impl FnOnce() -> T) -> Option<T> {
        self.is_alive().then(apply)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

//! Shared tracker handle and the active-scope registry.
//!
//! A host that drives the tracker from more than one place (a periodic tick
//! task and a command handler, say) shares it through [`SharedTracker`], whose
//! mutex serializes every mutation. Code deep in a call stack can reach the
//! tracker installed by [`SharedTracker::enter`] through [`current`].
//! Asking for it outside such a scope is a programmer error and panics.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use crate::tracker::QuestTracker;

#[derive(Clone)]
pub struct SharedTracker {
    inner: Arc<Mutex<QuestTracker>>,
}

impl std::fmt::Debug for SharedTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTracker").finish_non_exhaustive()
    }
}

impl SharedTracker {
    pub fn new(tracker: QuestTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    /// Run `f` with exclusive access to the tracker.
    pub fn with<R>(&self, f: impl FnOnce(&mut QuestTracker) -> R) -> R {
        // Every mutation is all-or-nothing, so state behind a poisoned lock
        // is still consistent.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Install this tracker as the active one for the current thread until
    /// the guard is dropped. Scopes nest.
    pub fn enter(&self) -> ScopeGuard {
        let depth = ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            active.push(self.clone());
            active.len() - 1
        });
        ScopeGuard {
            depth,
            _not_send: PhantomData,
        }
    }

    pub fn ptr_eq(&self, other: &SharedTracker) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

thread_local! {
    static ACTIVE: RefCell<Vec<SharedTracker>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a tracker installed as the active scope. Not `Send`: scopes are per thread.
///
/// Dropping a guard ends its own scope and every scope entered after it,
/// whatever order the guards are dropped in.
#[must_use = "the scope ends when the guard is dropped"]
pub struct ScopeGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().truncate(self.depth);
        });
    }
}

/// The innermost active tracker, if any.
pub fn try_current() -> Option<SharedTracker> {
    ACTIVE.with(|active| active.borrow().last().cloned())
}

/// The innermost active tracker.
///
/// # Panics
///
/// Panics when called outside a [`SharedTracker::enter`] scope.
#[track_caller]
pub fn current() -> SharedTracker {
    match try_current() {
        Some(tracker) => tracker,
        None => panic!("quest tracker accessed outside of an active scope"),
    }
}

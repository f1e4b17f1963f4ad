//! Session storage: a narrow keyed interface plus the in-memory default.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::session::ZkLoginSession;

/// Keyed session storage behind the manager.
///
/// Reads hand out owned copies; updates go back through [`put`], which
/// replaces the stored session wholesale. This read-then-write model keeps
/// implementations free of partial-update logic.
///
/// # Threading
/// All methods are synchronous and must be safe to call from any thread.
/// Trait-object usage via `Arc<dyn SessionStore>`.
///
/// [`put`]: SessionStore::put
pub trait SessionStore: Send + Sync {
    fn get(&self, id: &str) -> Option<ZkLoginSession>;
    fn put(&self, session: ZkLoginSession);
    fn remove(&self, id: &str) -> Option<ZkLoginSession>;
    fn all(&self) -> Vec<ZkLoginSession>;
}

/// The default backing: process-local, nothing survives a restart.
///
/// Interior mutability via `parking_lot::Mutex`; uncontended locks are
/// near-zero overhead and sessions are small.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, ZkLoginSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &str) -> Option<ZkLoginSession> {
        self.sessions.lock().get(id).cloned()
    }

    fn put(&self, session: ZkLoginSession) {
        self.sessions.lock().insert(session.id.clone(), session);
    }

    fn remove(&self, id: &str) -> Option<ZkLoginSession> {
        self.sessions.lock().remove(id)
    }

    fn all(&self) -> Vec<ZkLoginSession> {
        self.sessions.lock().values().cloned().collect()
    }
}

//! Document-level listener lifecycle
//!
//! Pointer moves and releases keep arriving after the pointer leaves the
//! canvas, so the editing surface listens on the whole document while it is
//! attached. [`ListenerGuard`] owns those registrations and removes them when
//! dropped.

use std::sync::Arc;

use parking_lot::Mutex;

/// Document events the editing surface subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    MouseMove,
    MouseUp,
    KeyDown,
}

/// Every document-level listener subscription routed to the editor
pub const EDITOR_LISTENERS: [ListenerKind; 3] = [
    ListenerKind::MouseMove,
    ListenerKind::MouseUp,
    ListenerKind::KeyDown,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registration {
    id: u64,
    kind: ListenerKind,
}

/// Active document-level registrations
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<Registration>,
}

impl ListenerRegistry {
    pub fn is_attached(&self, kind: ListenerKind) -> bool {
        self.listeners.iter().any(|r| r.kind == kind)
    }

    pub fn count(&self) -> usize {
        self.listeners.len()
    }

    fn register(&mut self, kind: ListenerKind) -> u64 {
        self.next_id += 1;
        self.listeners.push(Registration {
            id: self.next_id,
            kind,
        });
        self.next_id
    }

    fn unregister(&mut self, ids: &[u64]) {
        self.listeners.retain(|r| !ids.contains(&r.id));
    }
}

// ============ Shared Registry ============

/// Thread-safe registry handle
#[derive(Debug, Clone, Default)]
pub struct SharedListenerRegistry {
    inner: Arc<Mutex<ListenerRegistry>>,
}

impl SharedListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `kinds`; they stay registered until the guard drops
    pub fn attach(&self, kinds: &[ListenerKind]) -> ListenerGuard {
        let ids = {
            let mut registry = self.inner.lock();
            kinds.iter().map(|&k| registry.register(k)).collect()
        };
        log::debug!("attached {} document listener(s)", kinds.len());
        ListenerGuard {
            registry: Arc::clone(&self.inner),
            ids,
        }
    }

    pub fn is_attached(&self, kind: ListenerKind) -> bool {
        self.inner.lock().is_attached(kind)
    }

    pub fn count(&self) -> usize {
        self.inner.lock().count()
    }
}

/// Scope guard for a set of registrations
#[derive(Debug)]
pub struct ListenerGuard {
    registry: Arc<Mutex<ListenerRegistry>>,
    ids: Vec<u64>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.registry.lock().unregister(&self.ids);
        log::debug!("released {} document listener(s)", self.ids.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let registry = SharedListenerRegistry::new();
        {
            let _guard = registry.attach(&EDITOR_LISTENERS);
            assert_eq!(registry.count(), 3);
            assert!(registry.is_attached(ListenerKind::MouseUp));
        }
        assert_eq!(registry.count(), 0);
        assert!(!registry.is_attached(ListenerKind::MouseUp));
    }

    #[test]
    fn test_guards_are_independent() {
        let registry = SharedListenerRegistry::new();
        let first = registry.attach(&[ListenerKind::KeyDown]);
        let second = registry.attach(&[ListenerKind::KeyDown, ListenerKind::MouseMove]);
        drop(first);
        assert!(registry.is_attached(ListenerKind::KeyDown));
        assert_eq!(registry.count(), 2);
        drop(second);
        assert_eq!(registry.count(), 0);
    }
}

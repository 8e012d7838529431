//! "Materials changed" notifications.
//!
//! Listeners registered with
//! [`MaterialsStore::on_change`](crate::MaterialsStore::on_change) are called
//! once after every successful mutation, after the new state is visible.
//! Fetches, failures and no-op updates never notify.

use std::{
  panic::{AssertUnwindSafe, catch_unwind},
  sync::{
    Arc, PoisonError, RwLock, Weak,
    atomic::{AtomicU64, Ordering},
  },
};

use rata_core::MaterialId;
use serde::Serialize;

/// What changed. Every variant names the affected material(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialsChange {
  Added { id: MaterialId },
  Updated { id: MaterialId },
  Removed { id: MaterialId },
  Trashed { id: MaterialId },
  Restored { id: MaterialId },
  PermanentlyRemoved { id: MaterialId },
  BulkRemoved { ids: Vec<MaterialId> },
  PinToggled { id: MaterialId, pinned: bool },
  VisibilityToggled { id: MaterialId, public: bool },
  InfoUpdated { id: MaterialId },
}

type Listener = Arc<dyn Fn(&MaterialsChange) + Send + Sync>;

#[derive(Default)]
struct Registry {
  next_id:   AtomicU64,
  listeners: RwLock<Vec<(u64, Listener)>>,
}

/// The set of change listeners attached to a store.
#[derive(Default, Clone)]
pub(crate) struct Listeners(Arc<Registry>);

impl Listeners {
  pub(crate) fn add(&self, listener: Listener) -> Subscription {
    let id = self.0.next_id.fetch_add(1, Ordering::Relaxed);
    self
      .0
      .listeners
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .push((id, listener));
    Subscription {
      id,
      registry: Arc::downgrade(&self.0),
    }
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    self.0.listeners.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  /// Call every listener with `change`. A panicking listener is logged and
  /// skipped; it never reaches the caller of the mutation.
  pub(crate) fn emit(&self, change: &MaterialsChange) {
    // Snapshot so listeners can (un)subscribe without deadlocking.
    let listeners: Vec<Listener> = self
      .0
      .listeners
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .iter()
      .map(|(_, l)| l.clone())
      .collect();

    for listener in listeners {
      if catch_unwind(AssertUnwindSafe(|| listener(change))).is_err() {
        tracing::error!(?change, "materials change listener panicked");
      }
    }
  }
}

/// Handle for a registered listener. Dropping it detaches the listener.
#[must_use = "dropping a Subscription immediately detaches the listener"]
pub struct Subscription {
  id:       u64,
  registry: Weak<Registry>,
}

impl Subscription {
  /// Detach the listener now.
  pub fn unsubscribe(self) {}

  /// Keep the listener attached for the lifetime of the store.
  pub fn detach(self) { std::mem::forget(self) }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(registry) = self.registry.upgrade() {
      registry
        .listeners
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .retain(|(id, _)| *id != self.id);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::AtomicUsize;

  use super::*;

  #[test]
  fn drop_detaches() {
    let listeners = Listeners::default();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let sub = listeners.add(Arc::new(move |_| {
      h.fetch_add(1, Ordering::SeqCst);
    }));

    let change = MaterialsChange::Added { id: MaterialId(1) };
    listeners.emit(&change);
    drop(sub);
    listeners.emit(&change);

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(listeners.len(), 0);
  }

  #[test]
  fn panicking_listener_does_not_stop_others() {
    let listeners = Listeners::default();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    listeners.add(Arc::new(|_| panic!("listener bug"))).detach();
    listeners
      .add(Arc::new(move |_| {
        h.fetch_add(1, Ordering::SeqCst);
      }))
      .detach();

    listeners.emit(&MaterialsChange::Removed { id: MaterialId(2) });
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn serialises_with_type_tag() {
    let json = serde_json::to_value(MaterialsChange::PinToggled {
      id:     MaterialId(3),
      pinned: true,
    })
    .unwrap();
    assert_eq!(
      json,
      serde_json::json!({ "type": "pin_toggled", "id": 3, "pinned": true })
    );
  }
}

//! Store state and the reducer that moves it between snapshots.
//!
//! [`StoreState::reduce`] is pure: it never mutates `self`, it builds the next
//! snapshot. The store publishes each snapshot whole, so a reader holding an
//! `Arc<StoreState>` never observes a half-applied transition.

use rata_core::{Material, MaterialId};

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
  /// Active materials, newest creations first.
  pub materials:         Vec<Material>,
  /// Trashed materials, most recently trashed first.
  pub trashed_materials: Vec<Material>,
  /// True while a bulk fetch is outstanding.
  pub loading:           bool,
  /// Message of the last failed fetch, cleared by the next successful one.
  pub error:             Option<String>,
  /// Set by the first successful fetch and never unset.
  pub is_initialized:    bool,
  /// Guard against overlapping fetches.
  pub is_fetching:       bool,
}

// ─── Actions ─────────────────────────────────────────────────────────────────

/// Every transition the store can make.
#[derive(Debug, Clone)]
pub enum Action {
  FetchStarted,
  FetchSucceeded {
    materials: Vec<Material>,
    trashed:   Vec<Material>,
  },
  FetchFailed(String),
  Add(Material),
  Update(Material),
  Remove(MaterialId),
  /// Carries the record with its status already set to `trash`.
  MoveToTrash(Material),
  /// Carries the canonical record returned by the restore call.
  Restore(Material),
  RemoveFromTrash(MaterialId),
  BulkRemoveFromTrash(Vec<MaterialId>),
}

// ─── Reducer ─────────────────────────────────────────────────────────────────

impl StoreState {
  /// Compute the snapshot that follows `action`.
  ///
  /// Returns `None` when the action would leave the state unchanged, such
  /// as a fetch started while one is in flight or an update of an id that
  /// is not present. Updates and restores that carry the record already in
  /// place are no-ops too.
  ///
  /// An update whose status differs from the collection holding the id
  /// moves the record to the front of the other collection.
  pub fn reduce(&self, action: Action) -> Option<Self> {
    match action {
      Action::FetchStarted => {
        if self.is_fetching {
          return None;
        }
        Some(Self {
          loading: true,
          is_fetching: true,
          ..self.clone()
        })
      }

      Action::FetchSucceeded { materials, trashed } => Some(Self {
        materials,
        trashed_materials: trashed,
        loading: false,
        error: None,
        is_initialized: true,
        is_fetching: false,
      }),

      Action::FetchFailed(message) => Some(Self {
        loading: false,
        is_fetching: false,
        error: Some(message),
        ..self.clone()
      }),

      Action::Add(material) => {
        if self.contains(material.id) {
          return self.reduce(Action::Update(material));
        }
        let mut materials = Vec::with_capacity(self.materials.len() + 1);
        materials.push(material);
        materials.extend(self.materials.iter().cloned());
        Some(Self {
          materials,
          ..self.clone()
        })
      }

      Action::Update(material) => {
        let id = material.id;
        let (home, other) = if material.is_active() {
          (&self.materials, &self.trashed_materials)
        } else {
          (&self.trashed_materials, &self.materials)
        };

        if let Some(current) = home.iter().find(|m| m.id == id) {
          if *current == material {
            return None;
          }
          let home = replace(home, &material);
          return Some(self.with_lists(material.is_active(), home, other.clone()));
        }
        if !other.iter().any(|m| m.id == id) {
          return None;
        }
        // The status changed: move the record to the front of its new list.
        let active = material.is_active();
        let home = prepend(material, home);
        Some(self.with_lists(active, home, without(other, &[id])))
      }

      Action::Remove(id) => {
        if !self.materials.iter().any(|m| m.id == id) {
          return None;
        }
        Some(Self {
          materials: without(&self.materials, &[id]),
          ..self.clone()
        })
      }

      Action::MoveToTrash(material) => {
        let id = material.id;
        Some(Self {
          materials: without(&self.materials, &[id]),
          trashed_materials: prepend(material, &self.trashed_materials),
          ..self.clone()
        })
      }

      Action::Restore(material) => {
        let id = material.id;
        if self.materials.first() == Some(&material)
          && !self.trashed_materials.iter().any(|m| m.id == id)
        {
          return None;
        }
        Some(Self {
          trashed_materials: without(&self.trashed_materials, &[id]),
          materials: prepend(material, &self.materials),
          ..self.clone()
        })
      }

      Action::RemoveFromTrash(id) => self.reduce(Action::BulkRemoveFromTrash(vec![id])),

      Action::BulkRemoveFromTrash(ids) => {
        if !self.trashed_materials.iter().any(|m| ids.contains(&m.id)) {
          return None;
        }
        Some(Self {
          trashed_materials: without(&self.trashed_materials, &ids),
          ..self.clone()
        })
      }
    }
  }

  /// Rebuild with `home` as the collection that `active` selects and `other`
  /// as the remaining one.
  fn with_lists(&self, active: bool, home: Vec<Material>, other: Vec<Material>) -> Self {
    let (materials, trashed_materials) = if active { (home, other) } else { (other, home) };
    Self {
      materials,
      trashed_materials,
      ..self.clone()
    }
  }

  /// Whether `id` is present in either collection.
  pub fn contains(&self, id: MaterialId) -> bool {
    self
      .materials
      .iter()
      .chain(&self.trashed_materials)
      .any(|m| m.id == id)
  }
}

fn replace(list: &[Material], material: &Material) -> Vec<Material> {
  list
    .iter()
    .map(|m| if m.id == material.id { material.clone() } else { m.clone() })
    .collect()
}

fn without(list: &[Material], ids: &[MaterialId]) -> Vec<Material> {
  list.iter().filter(|m| !ids.contains(&m.id)).cloned().collect()
}

/// `material` followed by `list`, dropping any older entry with the same id.
fn prepend(material: Material, list: &[Material]) -> Vec<Material> {
  let id = material.id;
  std::iter::once(material)
    .chain(list.iter().filter(|m| m.id != id).cloned())
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use rata_core::MaterialStatus;

  use super::*;

  fn mat(id: i64) -> Material {
    Material::new(MaterialId(id), format!("M{id}"), Utc::now())
  }

  fn ids(list: &[Material]) -> Vec<i64> { list.iter().map(|m| m.id.0).collect() }

  fn populated() -> StoreState {
    StoreState::default()
      .reduce(Action::FetchSucceeded {
        materials: vec![mat(1), mat(2)],
        trashed:   vec![mat(3).with_status(MaterialStatus::Trash)],
      })
      .unwrap()
  }

  #[test]
  fn fetch_started_is_guarded() {
    let s = StoreState::default().reduce(Action::FetchStarted).unwrap();
    assert!(s.is_fetching && s.loading);
    assert!(s.reduce(Action::FetchStarted).is_none());
  }

  #[test]
  fn fetch_failed_keeps_collections() {
    let s = populated().reduce(Action::FetchStarted).unwrap();
    let s = s.reduce(Action::FetchFailed("boom".into())).unwrap();
    assert_eq!(ids(&s.materials), vec![1, 2]);
    assert_eq!(ids(&s.trashed_materials), vec![3]);
    assert_eq!(s.error.as_deref(), Some("boom"));
    assert!(!s.loading && !s.is_fetching);
    assert!(s.is_initialized);
  }

  #[test]
  fn add_prepends_and_dedupes() {
    let s = populated().reduce(Action::Add(mat(9))).unwrap();
    assert_eq!(ids(&s.materials), vec![9, 1, 2]);

    let mut renamed = mat(2);
    renamed.title = "renamed".into();
    let s = s.reduce(Action::Add(renamed)).unwrap();
    assert_eq!(ids(&s.materials), vec![9, 1, 2]);
    assert_eq!(s.materials[2].title, "renamed");
  }

  #[test]
  fn update_replaces_in_either_collection() {
    let mut t = mat(3).with_status(MaterialStatus::Trash);
    t.title = "edited".into();
    let s = populated().reduce(Action::Update(t)).unwrap();
    assert_eq!(s.trashed_materials[0].title, "edited");
    assert_eq!(ids(&s.materials), vec![1, 2]);
  }

  #[test]
  fn update_unknown_id_is_a_no_op() {
    assert!(populated().reduce(Action::Update(mat(42))).is_none());
  }

  #[test]
  fn trash_and_restore_keep_ids_unique() {
    let s = populated();
    let s = s
      .reduce(Action::MoveToTrash(mat(1).with_status(MaterialStatus::Trash)))
      .unwrap();
    assert_eq!(ids(&s.materials), vec![2]);
    assert_eq!(ids(&s.trashed_materials), vec![1, 3]);

    let restored = mat(1);
    let s = s.reduce(Action::Restore(restored.clone())).unwrap();
    assert_eq!(ids(&s.materials), vec![1, 2]);
    assert_eq!(ids(&s.trashed_materials), vec![3]);

    // Restoring the same record again changes nothing.
    assert!(s.reduce(Action::Restore(restored.clone())).is_none());

    // A newer record for the same id replaces it without duplicating.
    let mut newer = restored;
    newer.title = "newer".into();
    let s = s.reduce(Action::Restore(newer)).unwrap();
    assert_eq!(ids(&s.materials), vec![1, 2]);
    assert_eq!(s.materials[0].title, "newer");
  }

  #[test]
  fn update_with_trash_status_moves_to_trash() {
    let s = populated();
    let mut trashed = s.materials[1].with_status(MaterialStatus::Trash);
    trashed.pinned = true;

    let s = s.reduce(Action::Update(trashed)).unwrap();

    assert_eq!(ids(&s.materials), vec![1]);
    assert_eq!(ids(&s.trashed_materials), vec![2, 3]);
    assert!(s.trashed_materials[0].pinned);
    assert!(s.materials.iter().all(Material::is_active));
    assert!(s.trashed_materials.iter().all(Material::is_trashed));
  }

  #[test]
  fn update_with_active_status_leaves_trash() {
    let s = populated();
    let active = s.trashed_materials[0].with_status(MaterialStatus::Active);

    let s = s.reduce(Action::Update(active)).unwrap();

    assert_eq!(ids(&s.materials), vec![3, 1, 2]);
    assert!(s.trashed_materials.is_empty());
  }

  #[test]
  fn update_keeps_position_when_status_is_unchanged() {
    let s = populated();
    let mut edited = s.materials[1].clone();
    edited.title = "edited".into();

    let s = s.reduce(Action::Update(edited)).unwrap();

    assert_eq!(ids(&s.materials), vec![1, 2]);
    assert_eq!(s.materials[1].title, "edited");
  }

  #[test]
  fn update_with_identical_record_is_a_no_op() {
    let s = populated();
    let same = s.materials[0].clone();
    assert!(s.reduce(Action::Update(same)).is_none());
  }

  #[test]
  fn bulk_remove_only_touches_trash() {
    let s = populated()
      .reduce(Action::BulkRemoveFromTrash(vec![MaterialId(1), MaterialId(3)]))
      .unwrap();
    assert_eq!(ids(&s.materials), vec![1, 2]);
    assert!(s.trashed_materials.is_empty());
    assert!(s.reduce(Action::RemoveFromTrash(MaterialId(3))).is_none());
  }

  #[test]
  fn remove_drops_from_active_only() {
    let s = populated().reduce(Action::Remove(MaterialId(2))).unwrap();
    assert_eq!(ids(&s.materials), vec![1]);
    assert!(s.reduce(Action::Remove(MaterialId(3))).is_none());
  }
}

//! In-memory [`MaterialsRemote`] for tests.

use std::{
  collections::{HashMap, HashSet},
  time::Duration,
};

use chrono::Utc;
use rata_core::{
  Material, MaterialId, MaterialPatch, MaterialStatus, MaterialsRemote, NewMaterial,
};
use strum::Display;
use thiserror::Error;
use tokio::sync::Mutex;

/// The remote operations, used to target injected failures and latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Op {
  ListMaterials,
  ListTrashed,
  Create,
  Update,
  TogglePin,
  ToggleVisibility,
  SoftDelete,
  Restore,
  PermanentDelete,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryError {
  #[error("material {0} not found")]
  NotFound(MaterialId),

  #[error("injected failure in {0}")]
  Injected(Op),
}

#[derive(Default)]
struct Inner {
  materials: Vec<Material>,
  next_id:   i64,
  /// `(op, None)` fails every call of `op`; `(op, Some(id))` only that id.
  failures:  HashSet<(Op, Option<MaterialId>)>,
  latency:   HashMap<Op, Duration>,
  calls:     HashMap<Op, usize>,
}

/// A remote that keeps materials in a `Vec` behind a [`Mutex`].
///
/// Mirrors the server's behaviour closely enough for store tests: lists are
/// ordered the way the API orders them, mutations that change a record bump
/// `updated_at`, and unknown ids are rejected. Failures and latency can be
/// injected per operation (and per id).
#[derive(Default)]
pub struct MemoryRemote {
  inner: Mutex<Inner>,
}

impl MemoryRemote {
  pub fn new() -> Self { Self::default() }

  /// A remote pre-populated with `materials`. New ids continue after the
  /// largest one given.
  pub fn with_materials(materials: impl IntoIterator<Item = Material>) -> Self {
    let materials: Vec<Material> = materials.into_iter().collect();
    let next_id = materials.iter().map(|m| m.id.0).max().unwrap_or(0) + 1;
    Self {
      inner: Mutex::new(Inner {
        materials,
        next_id,
        ..Inner::default()
      }),
    }
  }

  /// Make every call of `op` fail.
  pub async fn fail(&self, op: Op) { self.inner.lock().await.failures.insert((op, None)); }

  /// Make calls of `op` for `id` fail.
  pub async fn fail_for(&self, op: Op, id: MaterialId) {
    self.inner.lock().await.failures.insert((op, Some(id)));
  }

  pub async fn clear_failures(&self) { self.inner.lock().await.failures.clear(); }

  /// Delay every call of `op` by `delay`.
  pub async fn set_latency(&self, op: Op, delay: Duration) {
    self.inner.lock().await.latency.insert(op, delay);
  }

  /// How many times `op` has been called, including failed calls.
  pub async fn calls(&self, op: Op) -> usize {
    self.inner.lock().await.calls.get(&op).copied().unwrap_or(0)
  }

  /// The server-side record for `id`, if it still exists.
  pub async fn get(&self, id: MaterialId) -> Option<Material> {
    self.inner.lock().await.materials.iter().find(|m| m.id == id).cloned()
  }

  /// Count the call, wait out any injected latency, then check for an
  /// injected failure.
  async fn enter(&self, op: Op, id: Option<MaterialId>) -> Result<(), MemoryError> {
    let delay = {
      let mut inner = self.inner.lock().await;
      *inner.calls.entry(op).or_default() += 1;
      inner.latency.get(&op).copied()
    };
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    let inner = self.inner.lock().await;
    if inner.failures.contains(&(op, None))
      || id.is_some_and(|id| inner.failures.contains(&(op, Some(id))))
    {
      return Err(MemoryError::Injected(op));
    }
    Ok(())
  }

  async fn mutate<T>(
    &self,
    op: Op,
    id: MaterialId,
    f: impl FnOnce(&mut Material) -> T,
  ) -> Result<T, MemoryError> {
    self.enter(op, Some(id)).await?;
    let mut inner = self.inner.lock().await;
    let material = inner
      .materials
      .iter_mut()
      .find(|m| m.id == id)
      .ok_or(MemoryError::NotFound(id))?;
    let before = material.clone();
    let out = f(material);
    if *material != before {
      material.updated_at = Utc::now();
    }
    Ok(out)
  }

  async fn list(&self, op: Op, status: MaterialStatus) -> Result<Vec<Material>, MemoryError> {
    self.enter(op, None).await?;
    let inner = self.inner.lock().await;
    let mut list: Vec<Material> = inner
      .materials
      .iter()
      .filter(|m| m.status == status)
      .cloned()
      .collect();
    // Pinned first for the active list, then most recently updated.
    list.sort_by(|a, b| {
      let pin = if status == MaterialStatus::Active {
        b.pinned.cmp(&a.pinned)
      } else {
        std::cmp::Ordering::Equal
      };
      pin.then(b.updated_at.cmp(&a.updated_at))
    });
    Ok(list)
  }
}

impl MaterialsRemote for MemoryRemote {
  type Error = MemoryError;

  async fn list_materials(&self) -> Result<Vec<Material>, MemoryError> {
    self.list(Op::ListMaterials, MaterialStatus::Active).await
  }

  async fn list_trashed(&self) -> Result<Vec<Material>, MemoryError> {
    self.list(Op::ListTrashed, MaterialStatus::Trash).await
  }

  async fn create_material(&self, input: NewMaterial) -> Result<Material, MemoryError> {
    self.enter(Op::Create, None).await?;
    let mut inner = self.inner.lock().await;
    let id = MaterialId(inner.next_id.max(1));
    inner.next_id = id.0 + 1;
    let mut material = Material::new(id, input.title, Utc::now());
    material.description = input.description;
    material.public = input.public;
    inner.materials.push(material.clone());
    Ok(material)
  }

  async fn update_material(
    &self,
    id: MaterialId,
    patch: MaterialPatch,
  ) -> Result<Material, MemoryError> {
    self
      .mutate(Op::Update, id, |m| {
        patch.apply_to(m);
      })
      .await?;
    self.get(id).await.ok_or(MemoryError::NotFound(id))
  }

  async fn toggle_pin(&self, id: MaterialId) -> Result<Material, MemoryError> {
    self.mutate(Op::TogglePin, id, |m| m.pinned = !m.pinned).await?;
    self.get(id).await.ok_or(MemoryError::NotFound(id))
  }

  async fn toggle_visibility(&self, id: MaterialId) -> Result<Material, MemoryError> {
    self
      .mutate(Op::ToggleVisibility, id, |m| m.public = !m.public)
      .await?;
    self.get(id).await.ok_or(MemoryError::NotFound(id))
  }

  async fn soft_delete(&self, id: MaterialId) -> Result<(), MemoryError> {
    self
      .mutate(Op::SoftDelete, id, |m| m.status = MaterialStatus::Trash)
      .await
  }

  async fn restore(&self, id: MaterialId) -> Result<Material, MemoryError> {
    self
      .mutate(Op::Restore, id, |m| m.status = MaterialStatus::Active)
      .await?;
    self.get(id).await.ok_or(MemoryError::NotFound(id))
  }

  async fn permanently_delete(&self, id: MaterialId) -> Result<(), MemoryError> {
    self.enter(Op::PermanentDelete, Some(id)).await?;
    let mut inner = self.inner.lock().await;
    let before = inner.materials.len();
    inner.materials.retain(|m| m.id != id);
    if inner.materials.len() == before {
      return Err(MemoryError::NotFound(id));
    }
    Ok(())
  }
}

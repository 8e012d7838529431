//! [`MaterialsStore`]: the client-side mirror of a user's materials.

use std::{future::Future, sync::Arc};

use futures::future::join_all;
use rata_core::{Material, MaterialId, MaterialPatch, MaterialStatus, MaterialsRemote};
use tokio::sync::watch;

use crate::{
  Error, Result,
  config::StoreConfig,
  events::{Listeners, MaterialsChange, Subscription},
  feedback::{Feedback, Loading, Toast},
  state::{Action, StoreState},
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// How a call to [`MaterialsStore::fetch_all`] ended.
///
/// Fetch failures are not errors to the caller; they land in
/// [`StoreState::error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
  Fetched,
  /// Another fetch was in flight; this request was dropped.
  AlreadyFetching,
  Failed,
}

/// Result of [`MaterialsStore::bulk_permanently_remove`].
///
/// Partial success is kept: ids in `removed` left the trash, ids in `failed`
/// are still there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkRemoval {
  pub removed: Vec<MaterialId>,
  pub failed:  Vec<(MaterialId, String)>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A locally consistent mirror of the remote material collection.
///
/// Mutations are remote-gated: local state changes only after the remote
/// call succeeds, and then from the canonical record the remote returned.
/// There is no optimistic apply and therefore nothing to roll back. Local
/// effects land in the order remote calls complete.
///
/// Share it as `Arc<MaterialsStore<R>>`; every method takes `&self`.
pub struct MaterialsStore<R> {
  remote:    R,
  config:    StoreConfig,
  state:     watch::Sender<Arc<StoreState>>,
  listeners: Listeners,
}

impl<R: MaterialsRemote> MaterialsStore<R> {
  pub fn new(remote: R) -> Self { Self::with_config(remote, StoreConfig::default()) }

  pub fn with_config(remote: R, config: StoreConfig) -> Self {
    let (state, _) = watch::channel(Arc::new(StoreState::default()));
    Self {
      remote,
      config,
      state,
      listeners: Listeners::default(),
    }
  }

  pub fn remote(&self) -> &R { &self.remote }

  pub fn config(&self) -> &StoreConfig { &self.config }

  // ── Observation ───────────────────────────────────────────────────────

  /// The current state snapshot.
  pub fn snapshot(&self) -> Arc<StoreState> { self.state.borrow().clone() }

  /// A receiver that sees every new snapshot.
  pub fn subscribe(&self) -> watch::Receiver<Arc<StoreState>> { self.state.subscribe() }

  /// Register a listener for successful mutations.
  pub fn on_change<F>(&self, listener: F) -> Subscription
  where
    F: Fn(&MaterialsChange) + Send + Sync + 'static,
  {
    self.listeners.add(Arc::new(listener))
  }

  // ── Fetch ─────────────────────────────────────────────────────────────

  /// Replace both collections with the remote's lists.
  ///
  /// Dropped if a fetch is already in flight. Both lists are requested
  /// concurrently and applied together; if either fails, neither collection
  /// changes and the failure is recorded in [`StoreState::error`].
  #[tracing::instrument(skip(self))]
  pub async fn fetch_all(&self) -> FetchOutcome {
    if !apply(&self.state, Action::FetchStarted) {
      tracing::debug!("fetch already in flight, dropping request");
      return FetchOutcome::AlreadyFetching;
    }
    let in_flight = InFlight::new(&self.state);

    let lists = tokio::try_join!(
      self.call("list materials", self.remote.list_materials()),
      self.call("list trashed materials", self.remote.list_trashed()),
    );

    match lists {
      Ok((materials, trashed)) => {
        tracing::debug!(
          active = materials.len(),
          trashed = trashed.len(),
          "fetched materials"
        );
        in_flight.finish(Action::FetchSucceeded { materials, trashed });
        FetchOutcome::Fetched
      }
      Err(e) => {
        tracing::warn!(error = %e, "failed to fetch materials");
        in_flight.finish(Action::FetchFailed(e.to_string()));
        FetchOutcome::Failed
      }
    }
  }

  /// Fetch once if the store has never been populated and nothing is in
  /// flight. Returns `None` when no fetch was needed.
  pub async fn ensure_initialized(&self) -> Option<FetchOutcome> {
    let state = self.snapshot();
    if state.is_initialized || state.is_fetching {
      return None;
    }
    Some(self.fetch_all().await)
  }

  // ── Local-only transitions ────────────────────────────────────────────

  /// Insert a material the caller has already persisted at the front of the
  /// active collection. An entry with the same id is replaced instead.
  pub fn add(&self, material: Material) {
    let id = material.id;
    self.commit(Action::Add(material), MaterialsChange::Added { id });
  }

  /// Replace the entry with the same id in whichever collection holds it.
  /// Returns `false` (and changes nothing) if the id is unknown.
  pub fn update(&self, material: Material) -> bool {
    let id = material.id;
    self.commit(Action::Update(material), MaterialsChange::Updated { id })
  }

  /// Drop an active material locally, without a remote call.
  pub fn remove(&self, id: MaterialId) -> bool {
    self.commit(Action::Remove(id), MaterialsChange::Removed { id })
  }

  // ── Remote-gated transitions ──────────────────────────────────────────

  /// Soft-delete an active material and move it to the front of the trash.
  #[tracing::instrument(skip_all, fields(id = %material.id))]
  pub async fn move_to_trash(&self, material: &Material, feedback: &dyn Feedback) -> Result<()> {
    let failed =
      || Toast::error("Error moving to trash", "Failed to move material to trash. Please try again.");

    expect_status(material, MaterialStatus::Active).map_err(|e| reported(e, feedback, failed()))?;
    self
      .call("soft delete", self.remote.soft_delete(material.id))
      .await
      .map_err(|e| reported(e, feedback, failed()))?;

    let id = material.id;
    self.commit(
      Action::MoveToTrash(material.with_status(MaterialStatus::Trash)),
      MaterialsChange::Trashed { id },
    );
    feedback.toast(Toast::success(
      "Material moved to trash",
      format!("\"{}\" has been moved to trash.", material.title),
    ));
    Ok(())
  }

  /// Restore a trashed material. The record put back into the active
  /// collection is the one the remote returns, not the trashed snapshot.
  #[tracing::instrument(skip_all, fields(id = %material.id))]
  pub async fn restore(&self, material: &Material, feedback: &dyn Feedback) -> Result<Material> {
    let failed =
      || Toast::error("Error restoring material", "Failed to restore material. Please try again.");

    expect_status(material, MaterialStatus::Trash).map_err(|e| reported(e, feedback, failed()))?;
    let mut canonical = self
      .call("restore", self.remote.restore(material.id))
      .await
      .map_err(|e| reported(e, feedback, failed()))?;

    if !canonical.is_active() {
      tracing::warn!(status = %canonical.status, "restore returned a non-active record");
      canonical.status = MaterialStatus::Active;
    }

    let id = canonical.id;
    self.commit(Action::Restore(canonical.clone()), MaterialsChange::Restored { id });
    feedback.toast(Toast::success(
      "Material restored",
      format!("\"{}\" has been restored.", material.title),
    ));
    Ok(canonical)
  }

  /// Delete a trashed material for good.
  #[tracing::instrument(skip_all, fields(id = %material.id))]
  pub async fn permanently_remove(&self, material: &Material, feedback: &dyn Feedback) -> Result<()> {
    let failed =
      || Toast::error("Error deleting material", "Failed to permanently delete material. Please try again.");

    expect_status(material, MaterialStatus::Trash).map_err(|e| reported(e, feedback, failed()))?;
    self
      .call("permanent delete", self.remote.permanently_delete(material.id))
      .await
      .map_err(|e| reported(e, feedback, failed()))?;

    let id = material.id;
    self.commit(Action::RemoveFromTrash(id), MaterialsChange::PermanentlyRemoved { id });
    feedback.toast(Toast::success(
      "Material permanently deleted",
      format!("\"{}\" has been permanently deleted.", material.title),
    ));
    Ok(())
  }

  /// Permanently delete several trashed materials concurrently.
  ///
  /// Ids that are not in the trash are reported as failed without a remote
  /// call. Only the ids whose remote delete succeeded leave the trash. Returns
  /// [`Error::BulkFailed`] when nothing could be deleted; otherwise the
  /// report lists what failed.
  #[tracing::instrument(skip_all, fields(count = ids.len()))]
  pub async fn bulk_permanently_remove(
    &self,
    ids: &[MaterialId],
    feedback: &dyn Feedback,
  ) -> Result<BulkRemoval> {
    let mut unique: Vec<MaterialId> = Vec::with_capacity(ids.len());
    for id in ids {
      if !unique.contains(id) {
        unique.push(*id);
      }
    }
    if unique.is_empty() {
      return Ok(BulkRemoval::default());
    }
    let total = unique.len();

    // Only trashed materials may be deleted for good; anything else is
    // reported as failed without touching the server.
    let state = self.snapshot();
    let (targets, rejected): (Vec<MaterialId>, Vec<MaterialId>) = unique
      .into_iter()
      .partition(|id| state.trashed_material_by_id(*id).is_some());

    let mut report = BulkRemoval::default();
    for id in rejected {
      tracing::warn!(%id, "refusing to permanently delete a material that is not in the trash");
      report.failed.push((id, format!("material {id} is not in the trash")));
    }

    let results = join_all(targets.iter().map(|&id| async move {
      let result = self
        .call("permanent delete", self.remote.permanently_delete(id))
        .await;
      (id, result)
    }))
    .await;

    for (id, result) in results {
      match result {
        Ok(()) => report.removed.push(id),
        Err(e) => {
          tracing::warn!(%id, error = %e, "permanent delete failed");
          report.failed.push((id, e.to_string()));
        }
      }
    }

    if !report.removed.is_empty() {
      self.commit(
        Action::BulkRemoveFromTrash(report.removed.clone()),
        MaterialsChange::BulkRemoved {
          ids: report.removed.clone(),
        },
      );
    }

    if report.failed.is_empty() {
      feedback.toast(Toast::success(
        "Materials permanently deleted",
        format!("{} materials have been permanently deleted.", report.removed.len()),
      ));
      return Ok(report);
    }

    if report.removed.is_empty() {
      feedback.toast(Toast::error(
        "Error deleting materials",
        "Failed to delete some materials. Please try again.",
      ));
      return Err(Error::BulkFailed {
        failed: report.failed,
      });
    }

    feedback.toast(Toast::error(
      "Error deleting materials",
      format!(
        "{} of {} materials could not be deleted. Please try again.",
        report.failed.len(),
        total
      ),
    ));
    Ok(report)
  }

  /// Flip `pinned` on the server and adopt the record it returns.
  #[tracing::instrument(skip_all, fields(id = %material.id))]
  pub async fn toggle_pin(&self, material: &Material, feedback: &dyn Feedback) -> Result<Material> {
    let _loading = Loading::show(feedback);
    let canonical = self
      .call("toggle pin", self.remote.toggle_pin(material.id))
      .await
      .map_err(|e| {
        reported(
          e,
          feedback,
          Toast::error("Error updating material", "Failed to update pin status. Please try again."),
        )
      })?;

    let (id, pinned) = (canonical.id, canonical.pinned);
    self.commit(
      Action::Update(canonical.clone()),
      MaterialsChange::PinToggled { id, pinned },
    );
    let (title, verb) = if pinned {
      ("Material pinned", "pinned")
    } else {
      ("Material unpinned", "unpinned")
    };
    feedback.toast(Toast::success(
      title,
      format!("\"{}\" has been {verb}.", material.title),
    ));
    Ok(canonical)
  }

  /// Flip `public` on the server and adopt the record it returns.
  #[tracing::instrument(skip_all, fields(id = %material.id))]
  pub async fn toggle_visibility(
    &self,
    material: &Material,
    feedback: &dyn Feedback,
  ) -> Result<Material> {
    let _loading = Loading::show(feedback);
    let canonical = self
      .call("toggle visibility", self.remote.toggle_visibility(material.id))
      .await
      .map_err(|e| {
        reported(
          e,
          feedback,
          Toast::error("Error updating material", "Failed to update visibility. Please try again."),
        )
      })?;

    let (id, public) = (canonical.id, canonical.public);
    self.commit(
      Action::Update(canonical.clone()),
      MaterialsChange::VisibilityToggled { id, public },
    );
    let (title, state) = if public {
      ("Material made public", "public")
    } else {
      ("Material made private", "private")
    };
    feedback.toast(Toast::success(
      title,
      format!("\"{}\" is now {state}.", material.title),
    ));
    Ok(canonical)
  }

  /// Update title and/or description and adopt the record the server
  /// returns. The failure is returned to the caller as well as toasted;
  /// [`Error::remote_source`] exposes the transport's original error.
  #[tracing::instrument(skip_all, fields(id = %id))]
  pub async fn update_info(
    &self,
    id: MaterialId,
    patch: MaterialPatch,
    feedback: &dyn Feedback,
  ) -> Result<Material> {
    let _loading = Loading::show(feedback);
    let failed =
      || Toast::error("Error updating material", "Failed to update material. Please try again.");

    let patch = patch
      .validated()
      .map_err(|e| reported(e.into(), feedback, failed()))?;
    let canonical = self
      .call("update material", self.remote.update_material(id, patch))
      .await
      .map_err(|e| reported(e, feedback, failed()))?;

    self.commit(
      Action::Update(canonical.clone()),
      MaterialsChange::InfoUpdated { id: canonical.id },
    );
    feedback.toast(Toast::success(
      "Material updated",
      "Title and description have been updated successfully.",
    ));
    Ok(canonical)
  }

  // ── Internals ─────────────────────────────────────────────────────────

  /// Apply `action`; notify listeners only if it changed the state.
  fn commit(&self, action: Action, change: MaterialsChange) -> bool {
    let changed = apply(&self.state, action);
    if changed {
      self.listeners.emit(&change);
    }
    changed
  }

  /// Run one remote call under the configured timeout.
  async fn call<T, E>(&self, op: &'static str, fut: impl Future<Output = Result<T, E>>) -> Result<T>
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    let after = self.config.remote_timeout;
    match tokio::time::timeout(after, fut).await {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(e)) => Err(Error::Remote {
        op,
        source: Box::new(e),
      }),
      Err(_) => Err(Error::Timeout { op, after }),
    }
  }
}

/// Run the reducer and publish the next snapshot. Returns whether anything
/// changed. The check and the publish happen under the channel's lock.
fn apply(state: &watch::Sender<Arc<StoreState>>, action: Action) -> bool {
  state.send_if_modified(|current| match current.reduce(action) {
    Some(next) => {
      *current = Arc::new(next);
      true
    }
    None => false,
  })
}

fn expect_status(material: &Material, expected: MaterialStatus) -> Result<()> {
  if material.status == expected {
    Ok(())
  } else {
    Err(Error::InvalidStatus {
      id: material.id,
      expected,
      actual: material.status,
    })
  }
}

fn reported(err: Error, feedback: &dyn Feedback, toast: Toast) -> Error {
  tracing::warn!(error = %err, "{}", toast.title);
  feedback.toast(toast);
  err
}

/// Clears `is_fetching` even if the fetch future is dropped part-way.
struct InFlight<'a> {
  state: &'a watch::Sender<Arc<StoreState>>,
  done:  bool,
}

impl<'a> InFlight<'a> {
  fn new(state: &'a watch::Sender<Arc<StoreState>>) -> Self { Self { state, done: false } }

  fn finish(mut self, action: Action) {
    self.done = true;
    apply(self.state, action);
  }
}

impl Drop for InFlight<'_> {
  fn drop(&mut self) {
    if !self.done {
      apply(self.state, Action::FetchFailed("fetch cancelled".into()));
    }
  }
}

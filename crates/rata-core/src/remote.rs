//! The `MaterialsRemote` trait: the boundary to the RataTutor REST API.
//!
//! The trait is implemented by transports (e.g. `rata-client`'s `HttpRemote`)
//! and by in-memory fakes. The store depends on this abstraction, never on a
//! concrete transport.

use std::future::Future;

use crate::material::{Material, MaterialId, MaterialPatch, NewMaterial};

/// Abstraction over the server that owns the canonical material records.
///
/// Every method that changes server-side state and returns a [`Material`]
/// returns the canonical post-mutation record. Callers reconcile against that
/// record rather than guessing the resulting state.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded runtimes.
pub trait MaterialsRemote: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// All of the user's active materials.
  fn list_materials(
    &self,
  ) -> impl Future<Output = Result<Vec<Material>, Self::Error>> + Send + '_;

  /// All of the user's trashed materials, most recently trashed first.
  fn list_trashed(
    &self,
  ) -> impl Future<Output = Result<Vec<Material>, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist a new material and return it.
  fn create_material(
    &self,
    input: NewMaterial,
  ) -> impl Future<Output = Result<Material, Self::Error>> + Send + '_;

  /// Partially update title and/or description.
  fn update_material(
    &self,
    id: MaterialId,
    patch: MaterialPatch,
  ) -> impl Future<Output = Result<Material, Self::Error>> + Send + '_;

  /// Flip `pinned` server-side.
  fn toggle_pin(
    &self,
    id: MaterialId,
  ) -> impl Future<Output = Result<Material, Self::Error>> + Send + '_;

  /// Flip `public` server-side.
  fn toggle_visibility(
    &self,
    id: MaterialId,
  ) -> impl Future<Output = Result<Material, Self::Error>> + Send + '_;

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Move a material to the trash. Nothing is returned; the caller applies
  /// the status change locally.
  fn soft_delete(
    &self,
    id: MaterialId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Bring a trashed material back to `active`.
  fn restore(
    &self,
    id: MaterialId,
  ) -> impl Future<Output = Result<Material, Self::Error>> + Send + '_;

  /// Delete a material for good. Irreversible.
  fn permanently_delete(
    &self,
    id: MaterialId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

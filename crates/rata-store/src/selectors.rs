//! Read-only queries over a [`StoreState`] snapshot.
//!
//! Selectors never mutate. Because they run against an immutable snapshot,
//! their result always reflects one complete transition.

use chrono::{DateTime, Utc};
use rata_core::{Material, MaterialId, material::ContentKind};
use strum::{Display, EnumString};

use crate::state::StoreState;

// ─── Lookups ─────────────────────────────────────────────────────────────────

impl StoreState {
  /// Look up an active material by id.
  pub fn material_by_id(&self, id: MaterialId) -> Option<&Material> {
    self.materials.iter().find(|m| m.id == id)
  }

  /// Look up a trashed material by id.
  pub fn trashed_material_by_id(&self, id: MaterialId) -> Option<&Material> {
    self.trashed_materials.iter().find(|m| m.id == id)
  }

  pub fn active_materials(&self) -> Vec<&Material> {
    self.materials.iter().filter(|m| m.is_active()).collect()
  }

  pub fn pinned_materials(&self) -> Vec<&Material> {
    self
      .materials
      .iter()
      .filter(|m| m.pinned && m.is_active())
      .collect()
  }

  pub fn unpinned_materials(&self) -> Vec<&Material> {
    self
      .materials
      .iter()
      .filter(|m| !m.pinned && m.is_active())
      .collect()
  }

  /// Active materials matching `filter`, in collection order.
  pub fn filter(&self, filter: &MaterialFilter, now: DateTime<Utc>) -> Vec<&Material> {
    self
      .materials
      .iter()
      .filter(|m| m.is_active() && filter.matches(m, now))
      .collect()
  }
}

/// Split a selection into `(pinned, unpinned)`, preserving order.
pub fn partition_pinned<'a>(
  materials: impl IntoIterator<Item = &'a Material>,
) -> (Vec<&'a Material>, Vec<&'a Material>) {
  materials.into_iter().partition(|m| m.pinned)
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// How recently a material must have been updated to pass a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum TimeWindow {
  #[default]
  All,
  /// Updated within the last 24 hours.
  Today,
  /// Updated at most 7 whole days ago.
  Week,
  /// Updated at most 30 whole days ago.
  Month,
}

impl TimeWindow {
  pub fn contains(self, updated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let age = now.signed_duration_since(updated_at);
    match self {
      Self::All => true,
      Self::Today => age.num_days() < 1,
      Self::Week => age.num_days() <= 7,
      Self::Month => age.num_days() <= 30,
    }
  }
}

/// Search and filter criteria for the materials list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialFilter {
  /// Case-insensitive substring over title and description.
  pub text:    Option<String>,
  pub within:  TimeWindow,
  /// Only materials owning at least one record of this kind.
  pub content: Option<ContentKind>,
}

impl MaterialFilter {
  pub fn matches(&self, material: &Material, now: DateTime<Utc>) -> bool {
    let text_ok = self
      .text
      .as_deref()
      .filter(|t| !t.is_empty())
      .is_none_or(|t| material.matches_text(t));
    let content_ok = self.content.is_none_or(|k| material.has_content(k));
    text_ok && content_ok && self.within.contains(material.updated_at, now)
  }
}

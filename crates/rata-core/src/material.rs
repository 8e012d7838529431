//! Materials: the user-owned containers that hold notes, flashcard sets,
//! quizzes and attachments.
//!
//! A material is either `active` or in the `trash`. The server owns the
//! canonical record; clients only ever replace their copy with whatever the
//! server returns.

use std::{fmt, num::ParseIntError, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
  Error, Result,
  content::{Attachment, FlashcardSet, Note, Quiz},
};

/// Server-side limits, mirrored so that bad input fails before a round trip.
pub const TITLE_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 5000;

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque, server-assigned identifier of a material.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MaterialId(pub i64);

impl fmt::Display for MaterialId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for MaterialId {
  type Err = ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { s.trim().parse().map(Self) }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Which of the two top-level collections a material belongs to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MaterialStatus {
  #[default]
  Active,
  Trash,
}

/// The kinds of record a material can own.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum ContentKind {
  Notes,
  #[strum(serialize = "flashcards", serialize = "flashcard_sets")]
  FlashcardSets,
  Quizzes,
  Attachments,
}

// ─── Material ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
  pub id:             MaterialId,
  /// Display name of the owner; read-only and absent on some endpoints.
  #[serde(default)]
  pub owner:          Option<String>,
  pub title:          String,
  #[serde(default)]
  pub description:    Option<String>,
  #[serde(default)]
  pub status:         MaterialStatus,
  #[serde(default)]
  pub pinned:         bool,
  #[serde(default)]
  pub public:         bool,
  #[serde(default)]
  pub notes:          Vec<Note>,
  #[serde(default)]
  pub flashcard_sets: Vec<FlashcardSet>,
  #[serde(default)]
  pub quizzes:        Vec<Quiz>,
  #[serde(default)]
  pub attachments:    Vec<Attachment>,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

impl Material {
  /// An empty, active, private, unpinned material created at `now`.
  pub fn new(id: MaterialId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
    Self {
      id,
      owner: None,
      title: title.into(),
      description: None,
      status: MaterialStatus::Active,
      pinned: false,
      public: false,
      notes: Vec::new(),
      flashcard_sets: Vec::new(),
      quizzes: Vec::new(),
      attachments: Vec::new(),
      created_at: now,
      updated_at: now,
    }
  }

  pub fn is_active(&self) -> bool { self.status == MaterialStatus::Active }

  pub fn is_trashed(&self) -> bool { self.status == MaterialStatus::Trash }

  /// A copy of this material with `status` replaced.
  pub fn with_status(&self, status: MaterialStatus) -> Self {
    Self {
      status,
      ..self.clone()
    }
  }

  /// Number of owned records of the given kind.
  pub fn count(&self, kind: ContentKind) -> usize {
    match kind {
      ContentKind::Notes => self.notes.len(),
      ContentKind::FlashcardSets => self.flashcard_sets.len(),
      ContentKind::Quizzes => self.quizzes.len(),
      ContentKind::Attachments => self.attachments.len(),
    }
  }

  pub fn has_content(&self, kind: ContentKind) -> bool { self.count(kind) > 0 }

  /// Case-insensitive substring match over title and description.
  pub fn matches_text(&self, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    self.title.to_lowercase().contains(&needle)
      || self
        .description
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(&needle))
  }
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Partial update of a material's title and/or description.
///
/// Fields left as `None` are not sent and stay unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl MaterialPatch {
  pub fn title(title: impl Into<String>) -> Self {
    Self {
      title: Some(title.into()),
      ..Self::default()
    }
  }

  pub fn description(description: impl Into<String>) -> Self {
    Self {
      description: Some(description.into()),
      ..Self::default()
    }
  }

  /// Check the patch against the server's validators and trim the title.
  pub fn validated(self) -> Result<Self> {
    if self.title.is_none() && self.description.is_none() {
      return Err(Error::EmptyPatch);
    }
    let title = self.title.map(validate_title).transpose()?;
    if let Some(d) = &self.description {
      validate_description(d)?;
    }
    Ok(Self {
      title,
      description: self.description,
    })
  }

  /// Apply the patch to a local record. Used by in-memory remotes.
  pub fn apply_to(&self, material: &mut Material) {
    if let Some(t) = &self.title {
      material.title = t.clone();
    }
    if let Some(d) = &self.description {
      material.description = Some(d.clone());
    }
  }
}

/// Input to [`crate::remote::MaterialsRemote::create_material`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMaterial {
  pub title:       String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub public:      bool,
}

impl NewMaterial {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title:       title.into(),
      description: None,
      public:      false,
    }
  }

  pub fn validated(self) -> Result<Self> {
    let title = validate_title(self.title)?;
    if let Some(d) = &self.description {
      validate_description(d)?;
    }
    Ok(Self { title, ..self })
  }
}

fn validate_title(title: String) -> Result<String> {
  let clean = title.trim();
  if clean.is_empty() {
    return Err(Error::BlankTitle);
  }
  if clean.chars().count() > TITLE_MAX_LEN {
    return Err(Error::TooLong {
      field: "title",
      max:   TITLE_MAX_LEN,
    });
  }
  Ok(clean.to_owned())
}

fn validate_description(description: &str) -> Result<()> {
  if description.chars().count() > DESCRIPTION_MAX_LEN {
    return Err(Error::TooLong {
      field: "description",
      max:   DESCRIPTION_MAX_LEN,
    });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserialises_api_payload() {
    let raw = serde_json::json!({
      "id": 7,
      "owner": "alice",
      "title": "Biology",
      "description": "",
      "status": "trash",
      "pinned": true,
      "public": false,
      "attachments": [],
      "notes": [{
        "id": 1, "material": 7, "title": "Cells", "description": "",
        "content": "Mitochondria", "public": false,
        "created_at": "2025-03-01T10:00:00Z", "updated_at": "2025-03-01T10:00:00Z"
      }],
      "flashcard_sets": [],
      "quizzes": [],
      "created_at": "2025-03-01T09:00:00.123456Z",
      "updated_at": "2025-03-02T09:00:00+00:00"
    });
    let m: Material = serde_json::from_value(raw).unwrap();
    assert_eq!(m.id, MaterialId(7));
    assert_eq!(m.status, MaterialStatus::Trash);
    assert!(m.pinned);
    assert!(m.has_content(ContentKind::Notes));
    assert!(!m.has_content(ContentKind::Quizzes));
  }

  #[test]
  fn missing_collections_default_to_empty() {
    let raw = serde_json::json!({
      "id": 1,
      "title": "Bare",
      "created_at": "2025-03-01T09:00:00Z",
      "updated_at": "2025-03-01T09:00:00Z"
    });
    let m: Material = serde_json::from_value(raw).unwrap();
    assert!(m.is_active());
    assert!(m.notes.is_empty() && m.attachments.is_empty());
  }

  #[test]
  fn with_status_leaves_original_untouched() {
    let m = Material::new(MaterialId(1), "A", Utc::now());
    let t = m.with_status(MaterialStatus::Trash);
    assert!(m.is_active());
    assert!(t.is_trashed());
    assert_eq!(t.id, m.id);
  }

  #[test]
  fn matches_text_checks_title_and_description() {
    let mut m = Material::new(MaterialId(1), "Organic Chemistry", Utc::now());
    m.description = Some("Week 3 reactions".into());
    assert!(m.matches_text("chem"));
    assert!(m.matches_text("REACTIONS"));
    assert!(!m.matches_text("physics"));
  }

  #[test]
  fn patch_validation() {
    assert_eq!(MaterialPatch::default().validated(), Err(Error::EmptyPatch));
    assert_eq!(MaterialPatch::title("   ").validated(), Err(Error::BlankTitle));
    assert_eq!(
      MaterialPatch::title("  Physics ").validated().unwrap().title.as_deref(),
      Some("Physics")
    );
    let long = "x".repeat(TITLE_MAX_LEN + 1);
    assert!(matches!(
      MaterialPatch::title(long).validated(),
      Err(Error::TooLong { field: "title", .. })
    ));
    // An empty description is allowed; it clears the field.
    assert!(MaterialPatch::description("").validated().is_ok());
  }

  #[test]
  fn patch_serialises_only_set_fields() {
    let json = serde_json::to_value(MaterialPatch::title("T")).unwrap();
    assert_eq!(json, serde_json::json!({ "title": "T" }));
  }

  #[test]
  fn status_and_kind_parse() {
    assert_eq!("trash".parse::<MaterialStatus>().unwrap(), MaterialStatus::Trash);
    assert_eq!(MaterialStatus::Active.to_string(), "active");
    assert_eq!(
      "flashcards".parse::<ContentKind>().unwrap(),
      ContentKind::FlashcardSets
    );
    assert!("unknown".parse::<ContentKind>().is_err());
  }
}

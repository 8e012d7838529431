//! Records owned by a material: notes, flashcard sets, quizzes and
//! attachments.
//!
//! The store never inspects these beyond counting them; they are typed so that
//! API responses deserialise into something a consumer can render.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::material::MaterialId;

// ─── Notes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
  pub id:          i64,
  pub material:    MaterialId,
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub content:     String,
  #[serde(default)]
  pub public:      bool,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

// ─── Flashcards ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
  pub id:            i64,
  /// Absent when the card is nested inside its set.
  #[serde(default)]
  pub flashcard_set: Option<i64>,
  pub question:      String,
  pub answer:        String,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardSet {
  pub id:          i64,
  pub material:    MaterialId,
  pub title:       String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub public:      bool,
  #[serde(default)]
  pub flashcards:  Vec<Flashcard>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

// ─── Quizzes ─────────────────────────────────────────────────────────────────

/// A multiple-choice question. `correct_answer` matches one of `choices`
/// exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
  pub id:             i64,
  #[serde(default)]
  pub quiz:           Option<i64>,
  pub question_text:  String,
  pub choices:        Vec<String>,
  pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
  pub id:          i64,
  pub material:    MaterialId,
  pub title:       String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub public:      bool,
  #[serde(default)]
  pub questions:   Vec<QuizQuestion>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

// ─── Attachments ─────────────────────────────────────────────────────────────

/// An uploaded source document. `file` is the URL the server serves it from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
  pub id:          i64,
  pub material:    MaterialId,
  pub file:        String,
  pub uploaded_at: DateTime<Utc>,
}

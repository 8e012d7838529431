//! Terminal rendering of materials and store feedback.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use rata_core::{Material, material::ContentKind};
use rata_store::{Feedback, Toast, ToastVariant};
use strum::IntoEnumIterator;

/// Prints toasts to stderr so stdout stays parseable.
pub struct Stderr;

impl Feedback for Stderr {
  fn toast(&self, toast: Toast) {
    let mark = match toast.variant {
      ToastVariant::Success => "✓",
      ToastVariant::Error => "✗",
    };
    eprintln!("{mark} {toast}");
  }

  fn show_loading(&self) { tracing::debug!("waiting for server"); }
}

/// One line per material: pin marker, id, title, visibility, content counts
/// and age.
pub fn line(material: &Material, now: DateTime<Utc>) -> String {
  let pin = if material.pinned { "*" } else { " " };
  let visibility = if material.public { "public" } else { "private" };
  let counts: Vec<String> = ContentKind::iter()
    .filter_map(|kind| {
      let n = material.count(kind);
      (n > 0).then(|| format!("{n} {kind}"))
    })
    .collect();
  let contents = if counts.is_empty() {
    "empty".to_owned()
  } else {
    counts.join(", ")
  };
  format!(
    "{pin} {:>6}  {}  [{visibility}] ({contents}) {}",
    material.id.0,
    material.title,
    age(material.updated_at, now),
  )
}

fn age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let age = now.signed_duration_since(at);
  match age.num_days() {
    0 if age.num_hours() == 0 => "just now".to_owned(),
    0 => format!("{}h ago", age.num_hours()),
    d => format!("{d}d ago"),
  }
}

/// Print `materials` as lines, or as a JSON array when `json` is set.
pub fn print(materials: &[&Material], json: bool, now: DateTime<Utc>) -> anyhow::Result<()> {
  let mut out = io::stdout().lock();
  if json {
    serde_json::to_writer_pretty(&mut out, materials)?;
    writeln!(out)?;
    return Ok(());
  }
  for material in materials {
    writeln!(out, "{}", line(material, now))?;
  }
  Ok(())
}

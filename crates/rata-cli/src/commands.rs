//! Subcommands, each run against an already-fetched store.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use rata_core::{
  Material, MaterialId, MaterialPatch, MaterialsRemote, NewMaterial, material::ContentKind,
};
use rata_store::{
  Error as StoreError, Feedback, MaterialFilter, MaterialsStore, StoreState, TimeWindow,
  selectors::partition_pinned,
};

use crate::term;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// List active materials, pinned first.
  List {
    /// Case-insensitive text over title and description; falls back to a
    /// fuzzy title match when nothing contains it.
    #[arg(short, long)]
    search: Option<String>,

    /// Only materials updated within this window (today, week, month).
    #[arg(long, default_value_t = TimeWindow::All)]
    within: TimeWindow,

    /// Only materials with this kind of content (notes, flashcards,
    /// quizzes, attachments).
    #[arg(long)]
    kind: Option<ContentKind>,

    #[arg(long)]
    json: bool,
  },

  /// List trashed materials.
  Trash {
    #[arg(long)]
    json: bool,
  },

  /// Create a material.
  New {
    title: String,

    #[arg(short, long)]
    description: Option<String>,

    #[arg(long)]
    public: bool,
  },

  /// Move a material to the trash.
  Rm { id: MaterialId },

  /// Restore a material from the trash.
  Restore { id: MaterialId },

  /// Permanently delete trashed materials.
  Purge {
    #[arg(required = true)]
    ids: Vec<MaterialId>,
  },

  /// Pin or unpin a material.
  Pin { id: MaterialId },

  /// Make a material public or private.
  Visibility { id: MaterialId },

  /// Change a material's title and/or description, in the trash or not.
  Edit {
    id: MaterialId,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,
  },
}

pub async fn run<R>(store: &MaterialsStore<R>, command: Command, feedback: &dyn Feedback) -> Result<()>
where
  R: MaterialsRemote,
{
  let now = Utc::now();
  match command {
    Command::List {
      search,
      within,
      kind,
      json,
    } => {
      let filter = MaterialFilter {
        text: search,
        within,
        content: kind,
      };
      let state = store.snapshot();
      let (pinned, rest) = partition_pinned(matching(&state, &filter, now));
      let ordered: Vec<&Material> = pinned.into_iter().chain(rest).collect();
      term::print(&ordered, json, now)?;
    }

    Command::Trash { json } => {
      let state = store.snapshot();
      let trashed: Vec<&Material> = state.trashed_materials.iter().collect();
      term::print(&trashed, json, now)?;
    }

    Command::New {
      title,
      description,
      public,
    } => {
      let input = NewMaterial {
        title,
        description,
        public,
      }
      .validated()?;
      let created = store
        .remote()
        .create_material(input)
        .await
        .context("failed to create material")?;
      println!("{}", term::line(&created, now));
      store.add(created);
    }

    Command::Rm { id } => {
      let material = active(store, id)?;
      store.move_to_trash(&material, feedback).await?;
    }

    Command::Restore { id } => {
      let material = trashed(store, id)?;
      store.restore(&material, feedback).await?;
    }

    Command::Purge { ids } => {
      if let [id] = ids.as_slice() {
        let material = trashed(store, *id)?;
        store.permanently_remove(&material, feedback).await?;
        return Ok(());
      }
      for id in &ids {
        trashed(store, *id)?;
      }
      let report = match store.bulk_permanently_remove(&ids, feedback).await {
        Ok(report) => report,
        Err(StoreError::BulkFailed { failed }) => {
          for (id, reason) in &failed {
            tracing::warn!(%id, %reason, "permanent delete failed");
          }
          bail!("none of the {} materials could be deleted", failed.len());
        }
        Err(e) => return Err(e.into()),
      };
      if !report.failed.is_empty() {
        let ids: Vec<String> = report.failed.iter().map(|(id, _)| id.to_string()).collect();
        bail!("could not delete {}", ids.join(", "));
      }
    }

    Command::Pin { id } => {
      let material = active(store, id)?;
      store.toggle_pin(&material, feedback).await?;
    }

    Command::Visibility { id } => {
      let material = active(store, id)?;
      store.toggle_visibility(&material, feedback).await?;
    }

    Command::Edit {
      id,
      title,
      description,
    } => {
      editable(&store.snapshot(), id)?;
      let updated = store
        .update_info(id, MaterialPatch { title, description }, feedback)
        .await?;
      println!("{}", term::line(&updated, now));
    }
  }
  Ok(())
}

fn active<R: MaterialsRemote>(store: &MaterialsStore<R>, id: MaterialId) -> Result<Material> {
  store
    .snapshot()
    .material_by_id(id)
    .cloned()
    .ok_or_else(|| anyhow!("no active material with id {id}"))
}

fn trashed<R: MaterialsRemote>(store: &MaterialsStore<R>, id: MaterialId) -> Result<Material> {
  store
    .snapshot()
    .trashed_material_by_id(id)
    .cloned()
    .ok_or_else(|| anyhow!("no trashed material with id {id}"))
}

/// Title and description can be edited from either list.
fn editable(state: &StoreState, id: MaterialId) -> Result<&Material> {
  state
    .material_by_id(id)
    .or_else(|| state.trashed_material_by_id(id))
    .ok_or_else(|| anyhow!("no material with id {id}"))
}

/// Apply `filter`; if its text matches nothing, retry with a fuzzy match on
/// the title, best score first.
fn matching<'a>(
  state: &'a StoreState,
  filter: &MaterialFilter,
  now: DateTime<Utc>,
) -> Vec<&'a Material> {
  let hits = state.filter(filter, now);
  let needle = match filter.text.as_deref() {
    Some(text) if hits.is_empty() && !text.is_empty() => text,
    _ => return hits,
  };

  let matcher = SkimMatcherV2::default();
  let loose = MaterialFilter {
    text: None,
    ..filter.clone()
  };
  let mut scored: Vec<(i64, &Material)> = state
    .filter(&loose, now)
    .into_iter()
    .filter_map(|m| matcher.fuzzy_match(&m.title, needle).map(|score| (score, m)))
    .collect();
  scored.sort_by(|a, b| b.0.cmp(&a.0));
  scored.into_iter().map(|(_, m)| m).collect()
}

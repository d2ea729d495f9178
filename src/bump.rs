use crate::{
  commit::Entry,
  types::{BREAKING_CHANGES, DisplayType, MAJOR_BREAKING_CHANGES, MINOR_BREAKING_CHANGES},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BumpLevel {
  Patch,
  Minor,
  Major,
}

impl BumpLevel {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Patch => "patch",
      Self::Minor => "minor",
      Self::Major => "major",
    }
  }
}

fn entry_bump(entry: &Entry) -> BumpLevel {
  let notes_bump = entry
    .notes
    .iter()
    .map(|note| {
      match note.title.as_str() {
        MAJOR_BREAKING_CHANGES | BREAKING_CHANGES => BumpLevel::Major,
        MINOR_BREAKING_CHANGES => BumpLevel::Minor,
        _ => BumpLevel::Patch,
      }
    })
    .max()
    .unwrap_or(BumpLevel::Patch);

  if entry.is_public_commit && entry.kind == Some(DisplayType::Features) {
    return notes_bump.max(BumpLevel::Minor);
  }

  notes_bump
}

/// The bump a release made of `entries` calls for: major breaking changes
/// (or ungrouped ones) bump major, minor breaking changes and features bump
/// minor.
pub fn infer_bump(entries: &[Entry]) -> BumpLevel {
  entries.iter().map(entry_bump).max().unwrap_or(BumpLevel::Patch)
}

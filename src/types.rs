use serde::Serialize;

/// The changelog group a public entry is rendered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DisplayType {
  #[serde(rename = "Bug fixes")]
  BugFixes,
  #[serde(rename = "Features")]
  Features,
  #[serde(rename = "Other changes")]
  OtherChanges,
}

impl DisplayType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::BugFixes => "Bug fixes",
      Self::Features => "Features",
      Self::OtherChanges => "Other changes",
    }
  }

  pub fn rank(self) -> u8 {
    match self {
      Self::BugFixes => 1,
      Self::Features => 2,
      Self::OtherChanges => 3,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRule {
  pub label: String,
  pub public: bool,
  pub display: Option<DisplayType>,
}

impl TypeRule {
  pub fn public(label: &str, display: DisplayType) -> Self {
    Self {
      label: label.to_string(),
      public: true,
      display: Some(display),
    }
  }

  pub fn internal(label: &str) -> Self {
    Self {
      label: label.to_string(),
      public: false,
      display: None,
    }
  }
}

/// Ordered mapping from raw commit labels (`Fix`, `Docs`, ...) to their
/// classification. Labels are matched case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTable {
  rules: Vec<TypeRule>,
}

impl TypeTable {
  pub fn new(rules: Vec<TypeRule>) -> Self { Self { rules } }

  pub fn get(&self, label: &str) -> Option<&TypeRule> { self.rules.iter().find(|rule| rule.label == label) }

  pub fn is_known(&self, label: &str) -> bool { self.get(label).is_some() }

  pub fn is_public(&self, label: &str) -> bool { self.get(label).is_some_and(|rule| rule.public) }

  pub fn display_type(&self, label: &str) -> Option<DisplayType> {
    self.get(label).filter(|rule| rule.public).and_then(|rule| rule.display)
  }

  pub fn labels(&self) -> impl Iterator<Item = &str> { self.rules.iter().map(|rule| rule.label.as_str()) }
}

impl Default for TypeTable {
  fn default() -> Self {
    Self::new(vec![
      TypeRule::public("Fix", DisplayType::BugFixes),
      TypeRule::public("Feature", DisplayType::Features),
      TypeRule::public("Other", DisplayType::OtherChanges),
      TypeRule::internal("Code style"),
      TypeRule::internal("Docs"),
      TypeRule::internal("Internal"),
      TypeRule::internal("Tests"),
      TypeRule::internal("Revert"),
      TypeRule::internal("Release"),
    ])
  }
}

pub const BREAKING_CHANGES: &str = "BREAKING CHANGES";
pub const MAJOR_BREAKING_CHANGES: &str = "MAJOR BREAKING CHANGES";
pub const MINOR_BREAKING_CHANGES: &str = "MINOR BREAKING CHANGES";

/// Rewrites raw note titles into one of the canonical breaking-change titles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteTitles {
  pub treat_major_as_minor_breaking_change: bool,
  pub use_explicit_breaking_change_groups: bool,
}

impl NoteTitles {
  pub fn canonicalize(&self, title: &str) -> String {
    let title = match title.trim() {
      "BREAKING CHANGE" | BREAKING_CHANGES | "MAJOR BREAKING CHANGE" => MAJOR_BREAKING_CHANGES,
      "MINOR BREAKING CHANGE" => MINOR_BREAKING_CHANGES,
      other => other,
    };

    let title = if self.treat_major_as_minor_breaking_change && title == MAJOR_BREAKING_CHANGES {
      MINOR_BREAKING_CHANGES
    } else {
      title
    };

    if self.use_explicit_breaking_change_groups {
      return title.to_string();
    }

    title
      .strip_prefix("MAJOR ")
      .or_else(|| title.strip_prefix("MINOR "))
      .unwrap_or(title)
      .to_string()
  }
}

pub fn is_breaking_title(title: &str) -> bool { title.ends_with(BREAKING_CHANGES) }

/// Sort key for note groups: breaking changes first (major, minor, flat), then
/// everything else alphabetically.
pub fn note_rank(title: &str) -> (u8, u8) {
  match title {
    MAJOR_BREAKING_CHANGES => (1, 0),
    MINOR_BREAKING_CHANGES => (1, 1),
    BREAKING_CHANGES => (1, 2),
    _ => (2, 0),
  }
}

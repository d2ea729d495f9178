use cronaca::patterns::{
  EntryMarkers, ScopedType, find_issue_references, find_mentions, is_internal_merge, is_reference_line,
  parse_header, parse_note_line, parse_note_scope, parse_revert_header, parse_reverted_hash, parse_scope_list,
  parse_scoped_type, strip_ci_skip,
};

#[test]
fn parses_headers() {
  let header = parse_header("Fix (engine): Foo: bar.").expect("header");
  assert_eq!(header.kind, "Fix (engine)");
  assert_eq!(header.subject, "Foo: bar.");

  assert!(parse_header("Merge pull request #1 from ckeditor/t/1").is_none());
  assert!(parse_header("Fix:no space").is_none());
}

#[test]
fn parses_scoped_types() {
  let scoped = parse_scoped_type("Feature (ui, engine, ui)").expect("scoped type");
  assert_eq!(scoped.raw_type, "Feature");
  assert_eq!(scoped.scope, Some(vec!["engine".to_string(), "ui".to_string()]));

  let empty = parse_scoped_type("Fix ( , )").expect("scoped type");
  assert_eq!(empty.raw_type, "Fix");
  assert_eq!(empty.scope, None);

  assert!(parse_scoped_type("Fix").is_none());
  assert!(parse_scoped_type("Fix(engine)").is_none());
}

#[test]
fn from_prefix_keeps_undecorated_labels_whole() {
  assert_eq!(
    ScopedType::from_prefix("Code style"),
    ScopedType {
      raw_type: "Code style".to_string(),
      scope: None,
    }
  );
}

#[test]
fn scope_lists_are_sorted_and_deduplicated() {
  assert_eq!(
    parse_scope_list("b, a,b ,c"),
    Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
  );
  assert_eq!(parse_scope_list(""), None);
}

#[test]
fn detects_internal_merges() {
  assert!(is_internal_merge("Merge branch 'stable'"));
  assert!(is_internal_merge("Merge branch 'master' into stable"));
  assert!(is_internal_merge("Merge branch 'release' of github.com:ckeditor/ckeditor5"));
  assert!(is_internal_merge("Merge remote-tracking branch 'origin/master'"));
  assert!(is_internal_merge("Merge 'stable' into 'master'"));
  assert!(is_internal_merge("Merge 'master' into release"));

  assert!(!is_internal_merge("Merge branch 't/123'"));
  assert!(!is_internal_merge("Merge 't/123' into 'master'"));
  assert!(!is_internal_merge("Merge pull request #7 from ckeditor/stable"));
  assert!(!is_internal_merge("Fix: Merge branch 'stable'"));
}

#[test]
fn strips_ci_markers() {
  assert_eq!(strip_ci_skip("Foo. [skip ci]"), "Foo.");
  assert_eq!(strip_ci_skip("Foo [CI SKIP]"), "Foo");
  assert_eq!(strip_ci_skip("Foo [skip ci] bar"), "Foo [skip ci] bar");
}

#[test]
fn parses_note_scopes_greedily() {
  let scoped = parse_note_scope("(utils, engine): Removed `foo()`.").expect("note scope");
  assert_eq!(scoped.scope, vec!["engine".to_string(), "utils".to_string()]);
  assert_eq!(scoped.text, "Removed `foo()`.");

  let aside = parse_note_scope("(see below): The API changed.").expect("note scope");
  assert_eq!(aside.scope, vec!["see below".to_string()]);

  assert!(parse_note_scope("Removed (deprecated) foo.").is_none());
}

#[test]
fn parses_note_lines_with_the_longest_keyword() {
  let note = parse_note_line("MAJOR BREAKING CHANGES: Foo.").expect("note");
  assert_eq!(note.title, "MAJOR BREAKING CHANGES");
  assert_eq!(note.text, "Foo.");

  let note = parse_note_line("BREAKING CHANGE: (engine): Bar.").expect("note");
  assert_eq!(note.title, "BREAKING CHANGE");
  assert_eq!(note.text, "(engine): Bar.");

  let note = parse_note_line("MINOR BREAKING CHANGE (ui): Renamed bar.").expect("note");
  assert_eq!(note.title, "MINOR BREAKING CHANGE");
  assert_eq!(note.text, "(ui): Renamed bar.");

  assert!(parse_note_line("NOTES: foo").is_none());
  assert!(parse_note_line("Breaking change: foo").is_none());
  assert!(parse_note_line("See BREAKING CHANGE: foo").is_none());
}

#[test]
fn detects_reference_lines() {
  assert!(is_reference_line("Closes #12."));
  assert!(is_reference_line("fixes ckeditor/ckeditor5#3"));
  assert!(!is_reference_line("See #12."));
  assert!(!is_reference_line("Fix: Closes #12."));
}

#[test]
fn finds_issue_references_with_their_action() {
  let references = find_issue_references("Foo. Closes #1. See ckeditor/ckeditor5#2.");

  assert_eq!(references.len(), 2);
  assert_eq!(references[0].action.as_deref(), Some("Closes"));
  assert_eq!(references[0].issue, "1");
  assert_eq!(references[0].owner, None);
  assert_eq!(references[1].action, None);
  assert_eq!(references[1].owner.as_deref(), Some("ckeditor"));
  assert_eq!(references[1].repository.as_deref(), Some("ckeditor5"));
  assert_eq!(references[1].raw, "ckeditor/ckeditor5#2");
}

#[test]
fn finds_mentions() {
  assert_eq!(
    find_mentions("@reinmar reviewed (@pomek), not foo@bar.com"),
    vec!["reinmar".to_string(), "pomek".to_string()]
  );
}

#[test]
fn parses_reverts() {
  assert_eq!(parse_revert_header("Revert \"Fix: Foo.\""), Some("Fix: Foo."));
  assert_eq!(parse_revert_header("Fix: Revert foo."), None);
  assert_eq!(
    parse_reverted_hash("This reverts commit 76b9e058fb1c3fa00b50059cdc684997d0eb2eca."),
    Some("76b9e058fb1c3fa00b50059cdc684997d0eb2eca")
  );
}

#[test]
fn entry_markers_match_labels_at_line_start() {
  let markers = EntryMarkers::new(["Fix", "Other", "Code style"]).expect("markers");
  let text = "Intro. Fix: inline.\nFix (a): One.\nCode style: Two.\nFixes: no.";

  let found = markers.find(text);

  assert_eq!(found.len(), 2);
  assert_eq!(found[0].kind, "Fix (a)");
  assert_eq!(&text[found[0].start..found[0].end], "Fix (a): ");
  assert_eq!(found[1].kind, "Code style");
  assert_eq!(&text[found[1].end..found[1].end + 4], "Two.");
}

#[test]
fn entry_markers_without_labels_find_nothing() {
  let markers = EntryMarkers::new(std::iter::empty()).expect("markers");
  assert!(markers.find("Fix: Foo.").is_empty());
}

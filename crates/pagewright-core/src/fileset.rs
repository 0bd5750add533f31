//! The in-memory filename→content mapping exchanged between generation,
//! workspace storage, and publishing.
//!
//! Keys are unique relative filenames; iteration order is the sorted key
//! order so commit construction is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Filename the set must contain before it reaches the publisher.
pub const README: &str = "README.md";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileSet(BTreeMap<String, String>);

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.0.insert(name.into(), content.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Keep only entries whose name passes `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|name, _| keep(name));
    }
}

impl FromIterator<(String, String)> for FileSet {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FileSet {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ---------------------------------------------------------------------------
// README postcondition
// ---------------------------------------------------------------------------

/// Ensure the set carries a `README.md`, synthesizing one deterministically
/// from the run inputs when the provider did not return one.
pub fn ensure_readme(
    files: &mut FileSet,
    brief: &str,
    checks: &[String],
    attachment_summary: &str,
    round: u32,
) {
    if files.contains(README) {
        return;
    }
    files.insert(README, fallback_readme(brief, checks, attachment_summary, round));
}

/// Deterministic README used when generation output lacks one.
pub fn fallback_readme(
    brief: &str,
    checks: &[String],
    attachment_summary: &str,
    round: u32,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Auto-generated README (Round {round})\n\n"));
    out.push_str(&format!("**Project brief:** {brief}\n\n"));
    if !attachment_summary.is_empty() {
        out.push_str("**Attachments:**\n");
        out.push_str(attachment_summary);
        out.push_str("\n\n");
    }
    if !checks.is_empty() {
        out.push_str("**Checks to meet:**\n");
        for check in checks {
            out.push_str(&format!("- {check}\n"));
        }
        out.push('\n');
    }
    out.push_str("## Setup\n1. Open `index.html` in a browser.\n2. No build steps required.\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut files = FileSet::new();
        files.insert("index.html", "<h1>Hi</h1>");
        assert_eq!(files.get("index.html"), Some("<h1>Hi</h1>"));
        assert!(files.contains("index.html"));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn iteration_is_sorted_by_name() {
        let mut files = FileSet::new();
        files.insert("zeta.js", "z");
        files.insert("alpha.css", "a");
        files.insert("index.html", "i");
        let names: Vec<&str> = files.file_names().collect();
        assert_eq!(names, vec!["alpha.css", "index.html", "zeta.js"]);
    }

    #[test]
    fn duplicate_insert_overwrites() {
        let mut files = FileSet::new();
        files.insert("index.html", "old");
        files.insert("index.html", "new");
        assert_eq!(files.len(), 1);
        assert_eq!(files.get("index.html"), Some("new"));
    }

    #[test]
    fn ensure_readme_synthesizes_when_absent() {
        let mut files = FileSet::new();
        files.insert("index.html", "<h1>Hi</h1>");
        ensure_readme(&mut files, "a weather page", &["shows forecast".into()], "", 1);
        let readme = files.get(README).expect("README synthesized");
        assert!(readme.contains("Round 1"));
        assert!(readme.contains("a weather page"));
        assert!(readme.contains("- shows forecast"));
    }

    #[test]
    fn ensure_readme_preserves_existing() {
        let mut files = FileSet::new();
        files.insert(README, "# Handwritten");
        ensure_readme(&mut files, "brief", &[], "", 2);
        assert_eq!(files.get(README), Some("# Handwritten"));
    }

    #[test]
    fn fallback_readme_is_deterministic() {
        let a = fallback_readme("b", &["c1".into()], "att", 3);
        let b = fallback_readme("b", &["c1".into()], "att", 3);
        assert_eq!(a, b);
        assert!(a.contains("Round 3"));
        assert!(a.contains("att"));
    }

    #[test]
    fn serde_round_trips_as_plain_object() {
        let mut files = FileSet::new();
        files.insert("index.html", "<h1>Hi</h1>");
        let json = serde_json::to_string(&files).unwrap();
        assert_eq!(json, r#"{"index.html":"<h1>Hi</h1>"}"#);
        let back: FileSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, files);
    }
}

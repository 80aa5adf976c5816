//! Diffs between a document and its fixed version.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// A reviewable diff plus both texts verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffOutput {
    pub unified: String,
    pub before: String,
    pub after: String,
}

impl DiffOutput {
    pub fn has_changes(&self) -> bool {
        self.before != self.after
    }
}

/// Produces diffs for fix previews.
pub trait DiffProducer {
    fn diff(&self, before: &str, after: &str) -> DiffOutput;
}

/// Line-based unified diff.
#[derive(Debug, Clone)]
pub struct UnifiedDiff {
    context: usize,
    old_label: String,
    new_label: String,
}

impl Default for UnifiedDiff {
    fn default() -> Self {
        Self {
            context: 3,
            old_label: "original".to_string(),
            new_label: "fixed".to_string(),
        }
    }
}

impl UnifiedDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label both sides after a file name (`a/x.yml`, `b/x.yml`).
    pub fn for_file(name: &str) -> Self {
        Self {
            old_label: format!("a/{}", name),
            new_label: format!("b/{}", name),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, lines: usize) -> Self {
        self.context = lines;
        self
    }
}

impl DiffProducer for UnifiedDiff {
    fn diff(&self, before: &str, after: &str) -> DiffOutput {
        let diff = TextDiff::from_lines(before, after);
        let unified = if before == after {
            String::new()
        } else {
            diff.unified_diff()
                .context_radius(self.context)
                .header(&self.old_label, &self.new_label)
                .to_string()
        };
        DiffOutput {
            unified,
            before: before.to_string(),
            after: after.to_string(),
        }
    }
}

/// Count inserted and deleted lines.
pub fn line_changes(before: &str, after: &str) -> (usize, usize) {
    let diff = TextDiff::from_lines(before, after);
    let mut inserted = 0;
    let mut deleted = 0;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => inserted += 1,
            ChangeTag::Delete => deleted += 1,
            ChangeTag::Equal => {}
        }
    }
    (inserted, deleted)
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heuristic classification of how two consecutive navigations relate in a
/// breadcrumb-like path hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Fewer than two recorded visits; nothing to compare.
    #[serde(rename = "none")]
    None,
    /// Top-level section changed.
    #[serde(rename = "change")]
    Change,
    /// Same section, different branch.
    #[serde(rename = "change:category")]
    ChangeCategory,
    /// Sibling page under the same parent.
    #[serde(rename = "change:page")]
    ChangePage,
    /// Descended one or more levels below the previous page.
    #[serde(rename = "forward")]
    Forward,
    /// Climbed back toward the previous page's ancestors.
    #[serde(rename = "back")]
    Back,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::None => "none",
            Direction::Change => "change",
            Direction::ChangeCategory => "change:category",
            Direction::ChangePage => "change:page",
            Direction::Forward => "forward",
            Direction::Back => "back",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a path into its non-empty segments, dropping the first
/// `root_hierarchy` of them (e.g. a language or site-root prefix).
fn segments(path: &str, root_hierarchy: usize) -> Vec<&str> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .skip(root_hierarchy)
        .collect()
}

/// Classify the transition from `prev_path` to `current_path`.
///
/// The comparison is index-based breadcrumb depth, not a tree distance:
/// ties are broken by segment-index equality only. The exact heuristic is
/// the observable contract and is kept verbatim.
pub fn classify(prev_path: &str, current_path: &str, root_hierarchy: usize) -> Direction {
    let prev = segments(prev_path, root_hierarchy);
    let current = segments(current_path, root_hierarchy);

    if prev.first() != current.first() {
        return Direction::Change;
    }

    if prev.len() != current.len() {
        if current.len() < prev.len() {
            return Direction::Back;
        }

        // Deeper than before: forward only when we descended from prev's leaf.
        let leaf = prev.len() - 1;
        return if prev.get(leaf) == current.get(leaf) {
            Direction::Forward
        } else {
            Direction::ChangeCategory
        };
    }

    // Same depth, same top segment: siblings share a parent segment.
    match prev.len().checked_sub(2) {
        Some(parent) if prev[parent] != current[parent] => Direction::ChangeCategory,
        _ => Direction::ChangePage,
    }
}

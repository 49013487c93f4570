use crate::direction::{self, Direction};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// One entry in the navigation log, immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Absolute URL as navigated to.
    pub url: String,
    /// `url` with origin, query string, and fragment stripped; the
    /// canonical comparison key.
    pub path: String,
    /// Opaque page-type tag supplied by the page markup.
    pub namespace: Option<String>,
}

/// Strip origin, query string, and fragment from a URL, keeping the path
pub fn derive_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        // Relative or otherwise unparseable input: truncate at the first
        // query or fragment marker.
        Err(_) => match url.find(['?', '#']) {
            Some(idx) => url[..idx].to_string(),
            None => url.to_string(),
        },
    }
}

/// Append-only log of visited pages with pure derived queries.
///
/// Owned by a single navigation driver; independent trackers (e.g. in
/// tests) never share state. The log grows for the lifetime of the page
/// session and resets only when the tracker is dropped.
#[derive(Debug, Clone, Default)]
pub struct HistoryTracker {
    records: Vec<VisitRecord>,
    root_hierarchy: usize,
}

impl HistoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leading path segments to ignore when classifying a
    /// transition (e.g. a language prefix like `/en`).
    pub fn with_root_hierarchy(mut self, root_hierarchy: usize) -> Self {
        self.root_hierarchy = root_hierarchy;
        self
    }

    /// Append a visit. Never fails; an empty namespace normalizes to `None`.
    pub fn record(&mut self, url: &str, namespace: Option<&str>) {
        let namespace = namespace
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);
        let record = VisitRecord {
            url: url.to_string(),
            path: derive_path(url),
            namespace,
        };
        debug!("Recorded visit to {} (namespace: {:?})", record.path, record.namespace);
        self.records.push(record);
    }

    /// The most recent visit, if any has been recorded.
    pub fn current(&self) -> Option<&VisitRecord> {
        self.records.last()
    }

    /// The visit before the current one.
    pub fn previous(&self) -> Option<&VisitRecord> {
        if self.records.len() < 2 {
            return None;
        }
        self.records.get(self.records.len() - 2)
    }

    /// Path of the current visit.
    pub fn current_path(&self) -> Option<&str> {
        self.current().map(|record| record.path.as_str())
    }

    /// Path of the previous visit.
    pub fn previous_path(&self) -> Option<&str> {
        self.previous().map(|record| record.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when the browser returned to the page it was on two steps
    /// earlier (a strict A -> B -> A path pattern). An approximation of
    /// native back/forward detection, not a substitute for it.
    pub fn is_back_navigation(&self) -> bool {
        let len = self.records.len();
        if len < 3 {
            return false;
        }
        self.records[len - 3].path == self.records[len - 1].path
    }

    /// Classify the transition from the previous visit to the current one.
    /// Degrades to [`Direction::None`] while the log holds fewer than two
    /// records; never fails.
    pub fn direction(&self) -> Direction {
        let (Some(previous), Some(current)) = (self.previous(), self.current()) else {
            return Direction::None;
        };
        let classified = direction::classify(&previous.path, &current.path, self.root_hierarchy);
        debug!(
            "Classified transition {} -> {} as {}",
            previous.path, current.path, classified
        );
        classified
    }
}

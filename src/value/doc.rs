//! Docstring stitching for plumbed text, methods and accessors.

use regex::Regex;
use std::sync::OnceLock;

use crate::core::config::{config, PlumbingConfig};

/// Joins the docstring of a link with the docstring of the next link
///
/// A line holding only the continuation marker in the left docstring is
/// replaced by the right docstring. Without a marker the right docstring is
/// appended after a newline.
#[derive(Debug, Clone)]
pub struct DocMerger {
    marker: String,
    marker_line: Option<Regex>,
}

impl DocMerger {
    /// Build a merger for the given continuation marker
    pub fn new(marker: &str) -> Self {
        let pattern = format!(r"\n\s*{}\s*\n", regex::escape(marker));
        let marker_line = match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!("Doc marker {:?} unusable, appending docs instead: {}", marker, e);
                None
            }
        };
        Self {
            marker: marker.to_string(),
            marker_line,
        }
    }

    pub fn from_config(config: &PlumbingConfig) -> Self {
        Self::new(&config.doc_marker)
    }

    /// Merger for the process-wide config
    pub fn global() -> &'static DocMerger {
        static MERGER: OnceLock<DocMerger> = OnceLock::new();
        MERGER.get_or_init(|| DocMerger::from_config(config()))
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Stitch `right` into `left`; a missing side yields the other side
    pub fn merge(&self, left: Option<&str>, right: Option<&str>) -> Option<String> {
        match (left, right) {
            (None, None) => None,
            (Some(l), None) => Some(l.to_string()),
            (None, Some(r)) => Some(r.to_string()),
            (Some(l), Some(r)) => Some(self.merge_text(l, r)),
        }
    }

    /// Stitch two present docstrings
    pub fn merge_text(&self, left: &str, right: &str) -> String {
        match self.marker_line.as_ref().and_then(|re| re.find(left)) {
            Some(m) => [&left[..m.start()], right, &left[m.end()..]].join("\n"),
            None => [left, right].join("\n"),
        }
    }
}

/// Stitch two docstrings with the process-wide continuation marker
pub fn plumb_doc(left: Option<&str>, right: Option<&str>) -> Option<String> {
    DocMerger::global().merge(left, right)
}

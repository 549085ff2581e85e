use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Column holding the job title and, once finished, the result link
pub const TITLE_COLUMN: usize = 1;

/// Column holding the status indicator
pub const STATUS_COLUMN: usize = 5;

/// Marker on the status indicator of a finished job
pub const SUCCESS_MARKER: &str = "text-success";

/// Marker on the status indicator of a failed job
pub const FAILURE_MARKER: &str = "text-error";

/// One read of the most recent row in the job table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobRow {
    /// Visible cell texts, in column order
    pub cells: Vec<String>,

    /// Style tokens found on the status indicator
    #[serde(default)]
    pub markers: BTreeSet<String>,

    /// Result link in the title column, present once the job is done
    #[serde(default)]
    pub link: Option<String>,
}

/// What the status indicator says about the job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSignal {
    Running,
    Succeeded,
    Failed,
}

impl JobRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            markers: BTreeSet::new(),
            link: None,
        }
    }

    /// Take markers from a whitespace separated class attribute
    pub fn with_class_attr(mut self, classes: &str) -> Self {
        self.markers = classes.split_whitespace().map(str::to_string).collect();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Trimmed title text, if the title column exists and is not blank
    pub fn title(&self) -> Option<&str> {
        self.cells
            .get(TITLE_COLUMN)
            .map(|cell| cell.trim())
            .filter(|title| !title.is_empty())
    }

    pub fn status_text(&self) -> Option<&str> {
        self.cells.get(STATUS_COLUMN).map(|cell| cell.trim())
    }

    /// A partially rendered row has no status column yet
    pub fn is_malformed(&self) -> bool {
        self.cells.len() <= STATUS_COLUMN
    }

    /// Success wins if both markers are present; no marker means still running
    pub fn signal(&self) -> StatusSignal {
        if self.markers.contains(SUCCESS_MARKER) {
            StatusSignal::Succeeded
        } else if self.markers.contains(FAILURE_MARKER) {
            StatusSignal::Failed
        } else {
            StatusSignal::Running
        }
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;

use super::{BoardError, JobBoard, JobRow};

/// A [`JobBoard`] that plays back recorded reads.
///
/// `None` entries replay a read that found no row yet. Once the recording runs out
/// every further read fails as an infrastructure fault.
#[derive(Debug, Default)]
pub struct ScriptedBoard {
    reads: VecDeque<Option<JobRow>>,
    navigations: Vec<String>,
}

impl ScriptedBoard {
    pub fn new(reads: impl IntoIterator<Item = Option<JobRow>>) -> Self {
        Self {
            reads: reads.into_iter().collect(),
            navigations: Vec::new(),
        }
    }

    /// Load a recording: a JSON array of rows or `null`
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read row recording")?;
        let reads: Vec<Option<JobRow>> = serde_json::from_str(&content)
            .context("Failed to parse row recording")?;
        Ok(Self::new(reads))
    }

    pub fn remaining(&self) -> usize {
        self.reads.len()
    }

    /// Locators navigated to so far
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }
}

#[async_trait]
impl JobBoard for ScriptedBoard {
    async fn read_latest_row(&mut self) -> Result<JobRow, BoardError> {
        match self.reads.pop_front() {
            Some(Some(row)) => Ok(row),
            Some(None) => Err(BoardError::Transient("job row not rendered yet".into())),
            None => Err(BoardError::Infrastructure(
                "recording ended before the job finished".into(),
            )),
        }
    }

    async fn navigate(&mut self, locator: &str) -> Result<(), BoardError> {
        self.navigations.push(locator.to_string());
        Ok(())
    }
}

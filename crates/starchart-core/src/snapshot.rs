use std::collections::BTreeMap;
use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::CrawlResult;
use crate::types::StarRecord;

/// All crawled star histories, keyed by catalog tool name.
///
/// Keys stay sorted so the committed JSON only changes where the histories
/// themselves changed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarSnapshot {
    repos: BTreeMap<String, Vec<StarRecord>>,
}

impl StarSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, history: Vec<StarRecord>) {
        self.repos.insert(name.into(), history);
    }

    pub fn history(&self, name: &str) -> Option<&[StarRecord]> {
        self.repos.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn to_json_pretty(&self) -> CrawlResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> CrawlResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

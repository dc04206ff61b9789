use std::fmt::{
    self,
    Display,
    Formatter,
};

use chrono::NaiveDate;
use serde::{
    Deserialize,
    Serialize,
};

/// One sampled point of a repository's star history.
///
/// `count` is the approximate cumulative number of stargazers at `date`.
/// Records order by date first, so a sorted history reads chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StarRecord {
    pub date: NaiveDate,
    pub count: usize,
}

/// A crawl target taken from the tools catalog.
///
/// `name` is the catalog key and doubles as the snapshot key; `owner` comes
/// from the entry's GitHub source URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRepo {
    pub owner: String,
    pub name: String,
}

impl Display for CatalogRepo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

//! Shared domain types for the star-history crawler.

pub mod error;
pub mod logging;
pub mod retry;
pub mod snapshot;
pub mod types;

pub use error::{
    CrawlError,
    CrawlResult,
};
pub use retry::RetryPolicy;
pub use snapshot::StarSnapshot;
pub use types::{
    CatalogRepo,
    StarRecord,
};

//! Pipeline entry points for crawler operations.
//!
//! - `run_crawler`: Crawl from a seed URL, tallying or downloading files

pub mod crawl;
pub mod frontier;
pub mod state;
#[cfg(test)]
pub(crate) mod testing;

pub use crawl::run_crawler;
pub use frontier::{Frontier, PushError, TaskGuard};
pub use state::{FileStats, SeenSet};

//! Pipeline entry points for crawler operations.
//!
//! - `run_crawler`: Collect the top entities for a ranking key and store them
//! - `run_bound`: Report the current maximum of a ranking key

pub mod crawl;

pub use crawl::{CrawlRequest, RunSummary, run_bound, run_crawler};

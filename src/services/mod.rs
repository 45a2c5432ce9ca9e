//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Bound discovery (`BoundFinder`)
//! - Score-window enumeration (`RangeCrawler`)
//! - The GitHub search and projection collaborators (`GitHubClient`)

mod accumulator;
mod bound;
mod crawler;
#[cfg(test)]
pub(crate) mod fake;
mod github;
pub mod search;

pub use accumulator::Accumulator;
pub use bound::BoundFinder;
pub use crawler::{CrawlOptions, ProgressSink, RangeCrawler};
pub use github::GitHubClient;
pub use search::{Projection, ScoreFilter, Search, SearchPage, SearchQuery};

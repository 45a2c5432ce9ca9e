//! Collaborator seams used by the crawler.
//!
//! The crawler only knows how to ask for a score filter sorted descending and
//! how to turn a raw hit into a record. Transport, paging and retry belong to
//! the implementations.

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Entity, RankingKey, Window};

/// Numeric predicate on the ranking key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFilter {
    /// Strictly greater than the value
    Above(u64),
    /// Inclusive window
    Within(Window),
}

impl ScoreFilter {
    pub fn matches(&self, value: u64) -> bool {
        match self {
            ScoreFilter::Above(min) => value > *min,
            ScoreFilter::Within(window) => window.contains(value),
        }
    }
}

impl fmt::Display for ScoreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreFilter::Above(min) => write!(f, ">{min}"),
            ScoreFilter::Within(window) => write!(f, "{window}"),
        }
    }
}

/// One search request, always sorted descending by `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery {
    pub key: RankingKey,
    pub filter: ScoreFilter,
    /// Maximum number of hits wanted
    pub limit: usize,
}

impl SearchQuery {
    /// The `q` parameter, e.g. `stars:1..1050`.
    pub fn qualifier(&self) -> String {
        format!("{}:{}", self.key.qualifier(), self.filter)
    }
}

/// Hits for one query, in remote order.
#[derive(Debug, Clone)]
pub struct SearchPage<R> {
    /// Total matches the remote side reports, may exceed `items.len()`
    pub total_count: u64,
    pub items: Vec<R>,
}

impl<R> SearchPage<R> {
    /// True if the page holds every match of its query.
    pub fn is_complete(&self, result_cap: usize) -> bool {
        self.items.len() < result_cap && self.total_count <= self.items.len() as u64
    }
}

/// Search capability over one entity kind.
#[async_trait]
pub trait Search<E: Entity>: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage<E::Raw>>;
}

/// Turns a raw hit into a record.
#[async_trait]
pub trait Projection<E: Entity>: Send + Sync {
    async fn project(&self, raw: E::Raw) -> Result<E>;
}

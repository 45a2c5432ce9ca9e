//! In-memory search backend for crawler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Entity, EntityKind, RankingKey};
use crate::services::search::{Projection, Search, SearchPage, SearchQuery};

/// Minimal entity ranked by stars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scored {
    pub id: u64,
    pub stars: u64,
}

impl Scored {
    pub fn new(id: u64, stars: u64) -> Self {
        Self { id, stars }
    }
}

impl Entity for Scored {
    type Raw = Scored;

    const KIND: EntityKind = EntityKind::Repository;

    fn id(&self) -> u64 {
        self.id
    }

    fn score(&self, key: RankingKey) -> Option<u64> {
        match key {
            RankingKey::Stars => Some(self.stars),
            _ => None,
        }
    }
}

/// Collection that honors score filters, sorts descending and caps results.
pub struct FakeCollection {
    items: Vec<Scored>,
    cap: usize,
    fail_on_call: Option<usize>,
    calls: Mutex<Vec<SearchQuery>>,
}

impl FakeCollection {
    pub fn new(items: Vec<Scored>, cap: usize) -> Self {
        Self {
            items,
            cap,
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Scores become entities with ids `1..`.
    pub fn from_scores(scores: &[u64], cap: usize) -> Self {
        let items = scores
            .iter()
            .enumerate()
            .map(|(i, &stars)| Scored::new(i as u64 + 1, stars))
            .collect();
        Self::new(items, cap)
    }

    /// Fail the `n`th search call (0-based).
    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    pub fn calls(&self) -> Vec<SearchQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Search<Scored> for FakeCollection {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage<Scored>> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(*query);
            calls.len() - 1
        };
        if self.fail_on_call == Some(call) {
            return Err(AppError::validation("simulated remote failure"));
        }

        let mut hits: Vec<Scored> = self
            .items
            .iter()
            .filter(|e| query.filter.matches(e.stars))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.stars.cmp(&a.stars).then(a.id.cmp(&b.id)));

        let total_count = hits.len() as u64;
        hits.truncate(query.limit.min(self.cap));
        Ok(SearchPage {
            total_count,
            items: hits,
        })
    }
}

#[async_trait]
impl Projection<Scored> for FakeCollection {
    async fn project(&self, raw: Scored) -> Result<Scored> {
        Ok(raw)
    }
}

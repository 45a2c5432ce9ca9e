// src/services/bound.rs

//! Discovers the current maximum of a ranking key.

use std::marker::PhantomData;

use crate::error::{AppError, Result};
use crate::models::{Entity, RankingKey};
use crate::services::search::{Projection, Search, ScoreFilter, SearchQuery};

/// Issues a single descending query above a baseline and reads the top score.
pub struct BoundFinder<'a, E, S, P> {
    search: &'a S,
    projection: &'a P,
    baseline: u64,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E, S, P> BoundFinder<'a, E, S, P>
where
    E: Entity,
    S: Search<E>,
    P: Projection<E>,
{
    pub fn new(search: &'a S, projection: &'a P, baseline: u64) -> Self {
        Self {
            search,
            projection,
            baseline,
            _entity: PhantomData,
        }
    }

    /// Maximum observed value of `key` across the collection.
    ///
    /// Fails with `EmptyCollection` when nothing scores above the baseline.
    pub async fn find_bound(&self, key: RankingKey) -> Result<u64> {
        let query = SearchQuery {
            key,
            filter: ScoreFilter::Above(self.baseline),
            limit: 1,
        };
        log::debug!("Bound query: {}", query.qualifier());

        let page = self.search.search(&query).await?;
        let Some(top) = page.items.into_iter().next() else {
            return Err(AppError::EmptyCollection {
                key,
                baseline: self.baseline,
            });
        };

        let top = self.projection.project(top).await?;
        let bound = top
            .score(key)
            .ok_or_else(|| AppError::config(format!("{key} does not rank {}", E::KIND)))?;

        log::info!(
            "Maximum {key} is {bound} ({} matches above {})",
            page.total_count,
            self.baseline
        );
        Ok(bound)
    }
}

// src/services/crawler.rs

//! Range crawler.
//!
//! Enumerates more entities than a single search can expose by walking the
//! score axis downwards. Each window is queried sorted descending; when the
//! remote side cuts the window off, the next window starts at the lowest
//! score seen so ties on the cut are fetched again and collapse by identity.
//! A window that came back complete is never queried again.

use std::marker::PhantomData;

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::error::{AppError, Result};
use crate::models::{
    Config, CrawlOutcome, Entity, Frontier, Progress, RankingKey, StopReason, Window,
};
use crate::services::accumulator::Accumulator;
use crate::services::bound::BoundFinder;
use crate::services::search::{Projection, Search, ScoreFilter, SearchQuery};

/// Observer called after every merged window.
pub type ProgressSink = Box<dyn Fn(&Progress) + Send + Sync>;

/// Tuning knobs for one crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Added to the bound so entities that grew since the bound query still fit
    pub margin: u64,
    /// Maximum window width, `None` for unbounded
    pub span: Option<u64>,
    /// Results the remote side exposes per query
    pub result_cap: usize,
    /// Threshold of the bound query
    pub baseline: u64,
    /// Concurrent projections within a window
    pub concurrency: usize,
}

impl CrawlOptions {
    pub fn from_config(config: &Config, key: RankingKey) -> Self {
        Self {
            margin: config.crawl.margin,
            span: config.crawl.span,
            result_cap: config.crawl.result_cap,
            baseline: config.crawl.baselines.get(key),
            concurrency: config.github.max_concurrent.max(1),
        }
    }
}

enum CrawlState {
    Seeding,
    Windowing(Frontier),
    Done(StopReason),
}

/// What one window contributed.
#[derive(Debug)]
struct Merged {
    hits: usize,
    fresh: usize,
    min_score: Option<u64>,
    complete: bool,
}

pub struct RangeCrawler<'a, E, S, P> {
    search: &'a S,
    projection: &'a P,
    options: CrawlOptions,
    progress: Option<ProgressSink>,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E, S, P> RangeCrawler<'a, E, S, P>
where
    E: Entity,
    S: Search<E>,
    P: Projection<E>,
{
    pub fn new(search: &'a S, projection: &'a P, options: CrawlOptions) -> Self {
        Self {
            search,
            projection,
            options,
            progress: None,
            _entity: PhantomData,
        }
    }

    pub fn with_progress(mut self, sink: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    /// Collect up to `target` unique entities, descending by `key`.
    pub async fn crawl(&self, key: RankingKey, target: usize) -> Result<CrawlOutcome<E>> {
        if key.kind() != E::KIND {
            return Err(AppError::config(format!("{key} does not rank {}", E::KIND)));
        }
        if target == 0 {
            return Ok(CrawlOutcome::empty());
        }

        let mut acc = Accumulator::with_capacity(target.min(self.options.result_cap));
        let mut bound = 0;
        let mut windows = 0;
        let mut state = CrawlState::Seeding;

        let stop = loop {
            state = match state {
                CrawlState::Seeding => {
                    bound = BoundFinder::new(self.search, self.projection, self.options.baseline)
                        .find_bound(key)
                        .await?;
                    CrawlState::Windowing(Frontier::new(bound.saturating_add(self.options.margin)))
                }
                CrawlState::Windowing(mut frontier) => {
                    let window = frontier.window(self.options.span);
                    windows += 1;

                    let merged = self.merge_window(key, window, &mut acc).await?;
                    log::debug!(
                        "Window {window}: {} hits, {} new, {} unique",
                        merged.hits,
                        merged.fresh,
                        acc.len()
                    );
                    self.report(Progress {
                        window_index: windows,
                        unique: acc.len(),
                        target,
                        floor: window.floor,
                        ceiling: window.ceiling,
                    });

                    if acc.len() >= target {
                        CrawlState::Done(StopReason::TargetReached)
                    } else {
                        Self::advance(&mut frontier, window, &merged)?;
                        Self::next_state(frontier, window, &merged)
                    }
                }
                CrawlState::Done(reason) => break reason,
            };
        };

        if stop == StopReason::Exhausted {
            log::info!("Score axis exhausted with {} of {target} {key} entries", acc.len());
        }

        let observed = acc.len();
        Ok(CrawlOutcome {
            entities: acc.into_ranked(key, target),
            bound,
            windows,
            observed,
            stop,
        })
    }

    /// Query one window, project every hit, then merge them all.
    async fn merge_window(
        &self,
        key: RankingKey,
        window: Window,
        acc: &mut Accumulator<E>,
    ) -> Result<Merged> {
        let query = SearchQuery {
            key,
            filter: ScoreFilter::Within(window),
            limit: self.options.result_cap,
        };
        let page = self
            .search
            .search(&query)
            .await
            .map_err(|e| AppError::remote_query(window, e))?;

        let complete = page.is_complete(self.options.result_cap);
        let entities: Vec<E> = stream::iter(page.items)
            .map(|raw| self.projection.project(raw))
            .buffered(self.options.concurrency.max(1))
            .try_collect()
            .await
            .map_err(|e| AppError::remote_query(window, e))?;

        let mut merged = Merged {
            hits: entities.len(),
            fresh: 0,
            min_score: None,
            complete,
        };
        for entity in entities {
            let score = entity.score(key).ok_or_else(|| {
                AppError::remote_query(window, format!("record has no {key} value"))
            })?;
            merged.min_score = Some(merged.min_score.map_or(score, |min| min.min(score)));
            if acc.upsert(entity) {
                merged.fresh += 1;
            }
        }
        Ok(merged)
    }

    /// Lower the frontier past what `window` covered.
    fn advance(frontier: &mut Frontier, window: Window, merged: &Merged) -> Result<()> {
        match merged.min_score {
            Some(min) if !merged.complete => {
                if min >= window.ceiling {
                    return Err(AppError::WindowSaturated {
                        window: window.to_string(),
                        count: merged.hits,
                    });
                }
                frontier.lower_to(min);
            }
            // Empty or complete: everything in the window has been seen.
            _ => frontier.lower_to(window.floor.saturating_sub(1)),
        }
        Ok(())
    }

    fn next_state(frontier: Frontier, window: Window, merged: &Merged) -> CrawlState {
        if frontier.is_exhausted() || (window.reaches_floor() && merged.fresh == 0) {
            CrawlState::Done(StopReason::Exhausted)
        } else {
            CrawlState::Windowing(frontier)
        }
    }

    fn report(&self, progress: Progress) {
        if let Some(sink) = &self.progress {
            sink(&progress);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::services::fake::{FakeCollection, Scored};

    fn options(cap: usize) -> CrawlOptions {
        CrawlOptions {
            margin: 50,
            span: None,
            result_cap: cap,
            baseline: 100,
            concurrency: 4,
        }
    }

    fn window_ceilings(fake: &FakeCollection) -> Vec<u64> {
        fake.calls()
            .iter()
            .filter_map(|q| match q.filter {
                ScoreFilter::Within(window) => Some(window.ceiling),
                ScoreFilter::Above(_) => None,
            })
            .collect()
    }

    fn ids(entities: &[Scored]) -> Vec<u64> {
        entities.iter().map(|e| e.id).collect()
    }

    #[tokio::test]
    async fn single_unbounded_window_covers_small_collection() {
        let fake = FakeCollection::from_scores(&[1000, 950, 950, 10, 5], 1000);
        let outcome = RangeCrawler::<Scored, _, _>::new(&fake, &fake, options(1000))
            .crawl(RankingKey::Stars, 3)
            .await
            .unwrap();

        let calls = fake.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].qualifier(), "stars:1..1050");

        assert_eq!(outcome.bound, 1000);
        assert_eq!(outcome.windows, 1);
        assert_eq!(outcome.observed, 5);
        assert_eq!(outcome.stop, StopReason::TargetReached);
        assert_eq!(ids(&outcome.entities), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn smaller_collection_ends_exhausted() {
        let fake = FakeCollection::from_scores(&[1000, 950, 950, 10, 5], 1000);
        let outcome = RangeCrawler::<Scored, _, _>::new(&fake, &fake, options(1000))
            .crawl(RankingKey::Stars, 10)
            .await
            .unwrap();

        assert_eq!(outcome.stop, StopReason::Exhausted);
        assert_eq!(outcome.windows, 1);
        assert_eq!(ids(&outcome.entities), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn returns_exact_top_n_past_the_cap() {
        let scores: Vec<u64> = (0..250u64).map(|i| (i * 7919) % 97 + 1).collect();
        let fake = FakeCollection::from_scores(&scores, 20);
        let mut opts = options(20);
        opts.baseline = 0;

        let outcome = RangeCrawler::<Scored, _, _>::new(&fake, &fake, opts)
            .crawl(RankingKey::Stars, 100)
            .await
            .unwrap();

        assert_eq!(outcome.entities.len(), 100);
        let returned: HashSet<u64> = outcome.entities.iter().map(|e| e.id).collect();
        assert_eq!(returned.len(), 100);

        let lowest_returned = outcome.entities.iter().map(|e| e.stars).min().unwrap();
        let highest_missing = scores
            .iter()
            .enumerate()
            .filter(|(i, _)| !returned.contains(&(*i as u64 + 1)))
            .map(|(_, &s)| s)
            .max()
            .unwrap();
        assert!(lowest_returned >= highest_missing);

        let sorted = outcome.entities.windows(2).all(|w| w[0].stars >= w[1].stars);
        assert!(sorted);
    }

    #[tokio::test]
    async fn frontier_strictly_decreases() {
        let scores: Vec<u64> = (0..250u64).map(|i| (i * 7919) % 97 + 1).collect();
        let fake = FakeCollection::from_scores(&scores, 20);
        let mut opts = options(20);
        opts.baseline = 0;

        let outcome = RangeCrawler::<Scored, _, _>::new(&fake, &fake, opts)
            .crawl(RankingKey::Stars, 250)
            .await
            .unwrap();

        let ceilings = window_ceilings(&fake);
        assert!(ceilings.len() > 1);
        assert!(ceilings.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(outcome.entities.len(), 250);
        assert_eq!(outcome.stop, StopReason::TargetReached);
    }

    #[tokio::test]
    async fn boundary_ties_are_not_duplicated() {
        let fake = FakeCollection::from_scores(&[1000, 990, 950, 950, 900], 3);
        let outcome = RangeCrawler::<Scored, _, _>::new(&fake, &fake, options(3))
            .crawl(RankingKey::Stars, 10)
            .await
            .unwrap();

        assert_eq!(window_ceilings(&fake), vec![1050, 950, 900]);
        assert_eq!(ids(&outcome.entities), vec![1, 2, 3, 4, 5]);
        assert_eq!(outcome.observed, 5);
        assert_eq!(outcome.stop, StopReason::Exhausted);
    }

    #[tokio::test]
    async fn empty_windows_still_move_the_frontier() {
        let fake = FakeCollection::from_scores(&[1000, 10], 1000);
        let mut opts = options(1000);
        opts.span = Some(100);

        let outcome = RangeCrawler::<Scored, _, _>::new(&fake, &fake, opts)
            .crawl(RankingKey::Stars, 2)
            .await
            .unwrap();

        let ceilings = window_ceilings(&fake);
        assert_eq!(ceilings[0], 1050);
        assert_eq!(ceilings[1], 949);
        assert!(ceilings.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(ids(&outcome.entities), vec![1, 2]);
        assert_eq!(outcome.stop, StopReason::TargetReached);
    }

    #[tokio::test]
    async fn saturated_ties_fail_loudly() {
        let fake = FakeCollection::from_scores(&[100, 100, 100], 2);
        let mut opts = options(2);
        opts.baseline = 10;
        let err = RangeCrawler::<Scored, _, _>::new(&fake, &fake, opts)
            .crawl(RankingKey::Stars, 3)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::WindowSaturated { count: 2, .. }));
    }

    #[tokio::test]
    async fn saturated_ties_past_the_target_still_finish() {
        let fake = FakeCollection::from_scores(&[200, 100, 100, 100, 100], 3);
        let mut opts = options(3);
        opts.baseline = 10;
        let outcome = RangeCrawler::<Scored, _, _>::new(&fake, &fake, opts)
            .crawl(RankingKey::Stars, 4)
            .await
            .unwrap();

        assert_eq!(window_ceilings(&fake), vec![250, 100]);
        assert_eq!(outcome.stop, StopReason::TargetReached);
        assert_eq!(ids(&outcome.entities), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn remote_failure_aborts() {
        let fake = FakeCollection::from_scores(&[1000, 950], 1000).failing_on(1);
        let err = RangeCrawler::<Scored, _, _>::new(&fake, &fake, options(1000))
            .crawl(RankingKey::Stars, 2)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RemoteQuery { ref window, .. } if window == "1..1050"));
    }

    #[tokio::test]
    async fn bound_failure_propagates() {
        let fake = FakeCollection::from_scores(&[50, 40], 1000);
        let err = RangeCrawler::<Scored, _, _>::new(&fake, &fake, options(1000))
            .crawl(RankingKey::Stars, 2)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EmptyCollection { .. }));
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn zero_target_issues_no_queries() {
        let fake = FakeCollection::from_scores(&[1000], 1000);
        let outcome = RangeCrawler::<Scored, _, _>::new(&fake, &fake, options(1000))
            .crawl(RankingKey::Stars, 0)
            .await
            .unwrap();

        assert!(outcome.entities.is_empty());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn rejects_key_of_other_kind() {
        let fake = FakeCollection::from_scores(&[1000], 1000);
        let err = RangeCrawler::<Scored, _, _>::new(&fake, &fake, options(1000))
            .crawl(RankingKey::Followers, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn reports_progress_per_window() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let fake = FakeCollection::from_scores(&[1000, 990, 950, 950, 900], 3);

        RangeCrawler::<Scored, _, _>::new(&fake, &fake, options(3))
            .with_progress(move |p| sink.lock().unwrap().push(*p))
            .crawl(RankingKey::Stars, 10)
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        let unique: Vec<usize> = seen.iter().map(|p| p.unique).collect();
        assert_eq!(unique, vec![3, 5, 5]);
        assert_eq!(seen[0].ceiling, 1050);
        assert_eq!(seen[2].window_index, 3);
        assert!(seen.iter().all(|p| p.target == 10 && p.floor == 1));
    }
}

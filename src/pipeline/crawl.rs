// src/pipeline/crawl.rs

//! Top-N crawling pipeline.

use std::fmt;
use std::path::PathBuf;

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{Config, Entity, Progress, RankingKey, StopReason};
use crate::services::{BoundFinder, CrawlOptions, Projection, RangeCrawler, Search};
use crate::storage::EntityStorage;

/// What to crawl and where to put it.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub key: RankingKey,
    /// Entities to keep
    pub amount: usize,
    /// Leading entities to skip
    pub start: usize,
    /// Output file, relative to the output directory unless absolute
    pub output: Option<PathBuf>,
}

impl CrawlRequest {
    /// `{kind}-{key}.json` unless an explicit output was given.
    pub fn output_name(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}-{}.json", self.key.kind(), self.key)))
    }
}

/// Summary of a pipeline run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub written: usize,
    pub observed: usize,
    pub bound: u64,
    pub windows: usize,
    pub stop: StopReason,
    pub location: String,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stop = match self.stop {
            StopReason::TargetReached => "target reached",
            StopReason::Exhausted => "collection exhausted",
        };
        write!(
            f,
            "{} written to {} ({} observed in {} windows below {}, {stop})",
            self.written, self.location, self.observed, self.windows, self.bound
        )
    }
}

/// Crawl the top entities for `request` and write them to storage.
pub async fn run_crawler<E, C, St>(
    config: &Config,
    client: &C,
    storage: &St,
    request: &CrawlRequest,
) -> Result<RunSummary>
where
    E: Entity,
    C: Search<E> + Projection<E>,
    St: EntityStorage,
{
    let start_time = Utc::now();
    let target = request
        .start
        .checked_add(request.amount)
        .ok_or_else(|| AppError::validation("start + amount overflows"))?;

    log::info!(
        "Crawling top {} {} by {} (skipping {})",
        request.amount,
        E::KIND,
        request.key,
        request.start
    );

    let options = CrawlOptions::from_config(config, request.key);
    let outcome = RangeCrawler::<E, C, C>::new(client, client, options)
        .with_progress(log_progress)
        .crawl(request.key, target)
        .await?;

    let entities: Vec<E> = outcome.entities.into_iter().skip(request.start).collect();
    if outcome.stop == StopReason::Exhausted && entities.len() < request.amount {
        log::warn!(
            "Collection holds fewer entries than requested: {} of {}",
            entities.len(),
            request.amount
        );
    }

    let output = request.output_name();
    let meta = storage.write_entities(&output, &entities).await?;

    let elapsed = Utc::now() - start_time;
    log::info!(
        "Wrote {} {} to {} ({} windows, bound {}, {:.1}s)",
        meta.count,
        E::KIND,
        meta.location,
        outcome.windows,
        outcome.bound,
        elapsed.num_milliseconds() as f64 / 1000.0
    );

    Ok(RunSummary {
        written: meta.count,
        observed: outcome.observed,
        bound: outcome.bound,
        windows: outcome.windows,
        stop: outcome.stop,
        location: meta.location,
    })
}

/// Report the current maximum of `key` without crawling.
pub async fn run_bound<E, C>(config: &Config, client: &C, key: RankingKey) -> Result<u64>
where
    E: Entity,
    C: Search<E> + Projection<E>,
{
    if key.kind() != E::KIND {
        return Err(AppError::config(format!("{key} does not rank {}", E::KIND)));
    }
    BoundFinder::<E, C, C>::new(client, client, config.crawl.baselines.get(key))
        .find_bound(key)
        .await
}

fn log_progress(progress: &Progress) {
    log::info!(
        "[{}/{}] window {} covered {}..{}",
        progress.unique.min(progress.target),
        progress.target,
        progress.window_index,
        progress.floor,
        progress.ceiling
    );
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::services::fake::{FakeCollection, Scored};
    use crate::storage::LocalStorage;

    fn config() -> Config {
        let mut config = Config::default();
        config.crawl.baselines.stars = 100;
        config
    }

    #[tokio::test]
    async fn writes_ranked_slice() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let fake = FakeCollection::from_scores(&[1000, 950, 950, 10, 5], 1000);
        let request = CrawlRequest {
            key: RankingKey::Stars,
            amount: 2,
            start: 1,
            output: None,
        };

        let summary = run_crawler::<Scored, _, _>(&config(), &fake, &storage, &request)
            .await
            .unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(summary.bound, 1000);
        assert_eq!(summary.stop, StopReason::TargetReached);

        let written: Vec<Scored> = storage
            .load_entities(Path::new("repositories-stars.json"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(written, vec![Scored::new(2, 950), Scored::new(3, 950)]);
    }

    #[tokio::test]
    async fn explicit_output_overrides_name() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let fake = FakeCollection::from_scores(&[1000, 950], 1000);
        let request = CrawlRequest {
            key: RankingKey::Stars,
            amount: 5,
            start: 0,
            output: Some(PathBuf::from("custom.json")),
        };

        let summary = run_crawler::<Scored, _, _>(&config(), &fake, &storage, &request)
            .await
            .unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(summary.stop, StopReason::Exhausted);
        assert!(tmp.path().join("custom.json").exists());

        let line = summary.to_string();
        assert!(line.starts_with("2 written to "));
        assert!(line.ends_with("(2 observed in 1 windows below 1000, collection exhausted)"));
    }

    #[tokio::test]
    async fn failed_crawl_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let fake = FakeCollection::from_scores(&[1000, 950], 1000).failing_on(1);
        let request = CrawlRequest {
            key: RankingKey::Stars,
            amount: 2,
            start: 0,
            output: None,
        };

        let result = run_crawler::<Scored, _, _>(&config(), &fake, &storage, &request).await;

        assert!(matches!(result, Err(AppError::RemoteQuery { .. })));
        assert!(!tmp.path().join("repositories-stars.json").exists());
    }

    #[tokio::test]
    async fn bound_uses_configured_baseline() {
        let fake = FakeCollection::from_scores(&[1000, 950], 1000);
        let bound = run_bound::<Scored, _>(&config(), &fake, RankingKey::Stars)
            .await
            .unwrap();

        assert_eq!(bound, 1000);
        assert_eq!(fake.calls()[0].qualifier(), "stars:>100");
    }
}

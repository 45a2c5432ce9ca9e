// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod entity;
mod ranking;
mod repository;
mod user;
mod window;

// Re-export all public types
pub use config::{
    Baselines, Config, CrawlConfig, GitHubConfig, OutputConfig, TOKEN_ENV,
};
pub use entity::Entity;
pub use ranking::{EntityKind, RankingKey};
pub use repository::{RawLicense, RawOwner, RawRepository, Repository, RepositoryDetails};
pub use user::{RawUser, User, UserDetails};
pub use window::{DOMAIN_MIN, Frontier, Window};

/// Observational snapshot emitted after each window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based index of the window just merged
    pub window_index: usize,
    pub unique: usize,
    pub target: usize,
    pub floor: u64,
    pub ceiling: u64,
}

/// Why a crawl stopped issuing windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The accumulator holds at least the requested number of entities
    TargetReached,
    /// The score axis has no more entities to give
    Exhausted,
}

/// Summary of one crawl.
#[derive(Debug, Clone)]
pub struct CrawlOutcome<E> {
    /// Unique entities, descending by ranking key, at most the target count
    pub entities: Vec<E>,
    /// Maximum reported by the bound query
    pub bound: u64,
    /// Windowed queries issued
    pub windows: usize,
    /// Unique entities observed before truncation
    pub observed: usize,
    pub stop: StopReason,
}

impl<E> CrawlOutcome<E> {
    /// An outcome for a crawl that never had to query anything.
    pub fn empty() -> Self {
        Self {
            entities: Vec::new(),
            bound: 0,
            windows: 0,
            observed: 0,
            stop: StopReason::TargetReached,
        }
    }
}

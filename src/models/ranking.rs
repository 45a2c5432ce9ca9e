//! Entity kinds and the ranking keys they can be ordered by.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The kind of entity a crawl enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Repository,
    User,
}

impl EntityKind {
    /// Search endpoint path segment (`/search/{endpoint}`).
    pub fn endpoint(&self) -> &'static str {
        match self {
            EntityKind::Repository => "repositories",
            EntityKind::User => "users",
        }
    }

    /// Ranking keys valid for this kind.
    pub fn keys(&self) -> &'static [RankingKey] {
        match self {
            EntityKind::Repository => &[RankingKey::Stars, RankingKey::Forks],
            EntityKind::User => &[RankingKey::Followers, RankingKey::Repositories],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Scalar field used to sort and window the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingKey {
    Stars,
    Forks,
    Followers,
    Repositories,
}

impl RankingKey {
    pub fn kind(&self) -> EntityKind {
        match self {
            RankingKey::Stars | RankingKey::Forks => EntityKind::Repository,
            RankingKey::Followers | RankingKey::Repositories => EntityKind::User,
        }
    }

    /// Search qualifier used in the `q` parameter.
    ///
    /// The user repository count is filtered with `repos` but sorted with
    /// `repositories`.
    pub fn qualifier(&self) -> &'static str {
        match self {
            RankingKey::Stars => "stars",
            RankingKey::Forks => "forks",
            RankingKey::Followers => "followers",
            RankingKey::Repositories => "repos",
        }
    }

    /// Value of the `sort` parameter.
    pub fn sort(&self) -> &'static str {
        match self {
            RankingKey::Stars => "stars",
            RankingKey::Forks => "forks",
            RankingKey::Followers => "followers",
            RankingKey::Repositories => "repositories",
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.sort()
    }
}

impl fmt::Display for RankingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stars" => Ok(RankingKey::Stars),
            "forks" => Ok(RankingKey::Forks),
            "followers" => Ok(RankingKey::Followers),
            "repositories" | "repos" => Ok(RankingKey::Repositories),
            other => Err(AppError::config(format!("Unknown ranking key '{other}'"))),
        }
    }
}

//! Repository records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, RankingKey};

/// A repository as returned by `/search/repositories`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRepository {
    /// Stable numeric identity
    pub id: u64,
    /// Repository name without the owner
    pub name: String,
    /// `owner/name`
    pub full_name: String,
    pub owner: RawOwner,
    /// Web URL
    pub html_url: String,
    /// Size in kilobytes
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub default_branch: String,
    pub license: Option<RawLicense>,
    /// Primary language as detected by GitHub
    pub language: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Last push, absent for empty repositories
    pub pushed_at: Option<DateTime<Utc>>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    /// Open issues and pull requests
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub has_issues: bool,
    #[serde(default)]
    pub has_discussions: bool,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub has_pages: bool,
    #[serde(default)]
    pub has_projects: bool,
    #[serde(default)]
    pub has_downloads: bool,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub archived: bool,
}

/// Owner stub embedded in a search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOwner {
    /// Account login
    pub login: String,
}

/// License stub embedded in a search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLicense {
    /// SPDX identifier, `NOASSERTION` for unrecognized licenses
    pub spdx_id: Option<String>,
}

/// Fields only available from `/repos/{owner}/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryDetails {
    /// Accounts watching the repository
    pub subscribers_count: u64,
}

/// A crawled repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    /// Stable numeric identity
    pub id: u64,
    /// Owner login
    pub owner: String,
    /// Repository name without the owner
    pub name: String,
    /// Web URL
    pub url: String,
    /// Size in kilobytes
    pub size: u64,
    /// Default branch name
    pub default_branch: String,
    /// SPDX identifier of the license
    pub license: Option<String>,
    /// Primary language
    pub language: Option<String>,
    /// Bytes per language, present only when details were fetched
    pub languages: Option<BTreeMap<String, u64>>,
    /// Short description, `None` when blank
    pub description: Option<String>,
    /// Project homepage, `None` when blank
    pub homepage: Option<String>,
    /// Topic labels
    pub topics: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last metadata update
    pub updated_at: DateTime<Utc>,
    /// Last push, absent for empty repositories
    pub pushed_at: Option<DateTime<Utc>>,
    /// Stars
    pub stargazers_count: u64,
    /// Subscriber count, present only when details were fetched
    pub watchers_count: Option<u64>,
    /// Forks
    pub forks_count: u64,
    /// Open issues and pull requests
    pub open_issues_count: u64,
    /// Issue tracker enabled
    pub has_issues: bool,
    /// Discussions enabled
    pub has_discussions: bool,
    /// Wiki enabled
    pub has_wiki: bool,
    /// GitHub Pages site published
    pub has_pages: bool,
    /// Projects enabled
    pub has_projects: bool,
    /// Downloads enabled
    pub has_downloads: bool,
    /// Forked from another repository
    pub is_fork: bool,
    /// Usable as a template
    pub is_template: bool,
    /// Read-only archive
    pub is_archived: bool,
}

impl Repository {
    /// Attach the counts that the search payload does not carry.
    pub fn with_details(
        mut self,
        details: RepositoryDetails,
        languages: BTreeMap<String, u64>,
    ) -> Self {
        self.watchers_count = Some(details.subscribers_count);
        self.languages = Some(languages);
        self
    }
}

impl From<RawRepository> for Repository {
    fn from(raw: RawRepository) -> Self {
        Self {
            id: raw.id,
            owner: raw.owner.login,
            name: raw.name,
            url: raw.html_url,
            size: raw.size,
            default_branch: raw.default_branch,
            license: raw.license.and_then(|l| l.spdx_id),
            language: non_empty(raw.language),
            languages: None,
            description: non_empty(raw.description),
            homepage: non_empty(raw.homepage),
            topics: raw.topics,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            pushed_at: raw.pushed_at,
            stargazers_count: raw.stargazers_count,
            watchers_count: None,
            forks_count: raw.forks_count,
            open_issues_count: raw.open_issues_count,
            has_issues: raw.has_issues,
            has_discussions: raw.has_discussions,
            has_wiki: raw.has_wiki,
            has_pages: raw.has_pages,
            has_projects: raw.has_projects,
            has_downloads: raw.has_downloads,
            is_fork: raw.fork,
            is_template: raw.is_template,
            is_archived: raw.archived,
        }
    }
}

impl Entity for Repository {
    type Raw = RawRepository;

    const KIND: EntityKind = EntityKind::Repository;

    fn id(&self) -> u64 {
        self.id
    }

    fn score(&self, key: RankingKey) -> Option<u64> {
        match key {
            RankingKey::Stars => Some(self.stargazers_count),
            RankingKey::Forks => Some(self.forks_count),
            _ => None,
        }
    }
}

/// Blank strings are treated as unset.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

//! User and organization account records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::repository::non_empty;
use super::{Entity, EntityKind, RankingKey};

/// An account as returned by `/search/users`. Carries no counts.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    /// Stable numeric identity
    pub id: u64,
    /// Account login
    pub login: String,
    /// `User` or `Organization`
    #[serde(rename = "type")]
    pub account_type: String,
    /// Profile URL
    pub html_url: String,
}

/// An account as returned by `/users/{login}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDetails {
    pub id: u64,
    pub login: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub html_url: String,
    /// Display name
    pub name: Option<String>,
    /// Website field of the profile
    pub blog: Option<String>,
    /// Public email
    pub email: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    /// `None` when the account never set it
    pub hireable: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub followers: u64,
    pub following: u64,
    /// Public repositories owned by the account
    pub public_repos: u64,
    pub public_gists: u64,
}

/// A crawled account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Stable numeric identity
    pub id: u64,
    /// `User` or `Organization`
    #[serde(rename = "type")]
    pub account_type: String,
    /// Account login
    pub username: String,
    /// Profile URL
    pub url: String,
    /// Display name
    pub name: Option<String>,
    /// Website from the profile, `None` when blank
    pub homepage: Option<String>,
    /// Public email
    pub email: Option<String>,
    /// Company field of the profile
    pub company: Option<String>,
    /// Location field of the profile
    pub location: Option<String>,
    /// Open to job offers, false when unset
    pub hireable: bool,
    /// Account creation time
    pub created_at: DateTime<Utc>,
    /// Last profile update
    pub updated_at: DateTime<Utc>,
    /// Followers
    pub followers_count: u64,
    /// Accounts this account follows
    pub following_count: u64,
    /// Public repositories
    pub public_repositories_count: u64,
    /// Public gists
    pub public_gists_count: u64,
}

impl From<UserDetails> for User {
    fn from(details: UserDetails) -> Self {
        Self {
            id: details.id,
            account_type: details.account_type,
            username: details.login,
            url: details.html_url,
            name: non_empty(details.name),
            homepage: non_empty(details.blog),
            email: non_empty(details.email),
            company: non_empty(details.company),
            location: non_empty(details.location),
            hireable: details.hireable.unwrap_or(false),
            created_at: details.created_at,
            updated_at: details.updated_at,
            followers_count: details.followers,
            following_count: details.following,
            public_repositories_count: details.public_repos,
            public_gists_count: details.public_gists,
        }
    }
}

impl Entity for User {
    type Raw = RawUser;

    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> u64 {
        self.id
    }

    fn score(&self, key: RankingKey) -> Option<u64> {
        match key {
            RankingKey::Followers => Some(self.followers_count),
            RankingKey::Repositories => Some(self.public_repositories_count),
            _ => None,
        }
    }
}

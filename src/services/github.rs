// src/services/github.rs

//! GitHub REST API client.
//!
//! Serves as both collaborators of the range crawler: paged search over
//! `/search/{repositories,users}` and projection of raw hits into records.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Result;
use crate::models::{
    Entity, EntityKind, GitHubConfig, RawRepository, RawUser, Repository, RepositoryDetails, User,
    UserDetails,
};
use crate::services::search::{Projection, Search, SearchPage, SearchQuery};
use crate::utils::http;

/// Body of a search response.
#[derive(Debug, Deserialize)]
struct SearchResponse<R> {
    total_count: u64,
    #[serde(default)]
    incomplete_results: bool,
    items: Vec<R>,
}

pub struct GitHubClient {
    client: Client,
    api: Url,
    per_page: usize,
    max_pages: usize,
    delay: Duration,
    fetch_details: bool,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig, token: Option<&str>) -> Result<Self> {
        let mut base = config.api_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client: http::create_client(config, token)?,
            api: Url::parse(&base)?,
            per_page: config.per_page.max(1),
            max_pages: config.max_pages.max(1),
            delay: Duration::from_millis(config.request_delay_ms),
            fetch_details: config.fetch_details,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.api.join(path)?)
    }

    fn search_url(
        &self,
        kind: EntityKind,
        query: &SearchQuery,
        per_page: usize,
        page: usize,
    ) -> Result<Url> {
        let mut url = self.endpoint(&format!("search/{}", kind.endpoint()))?;
        url.query_pairs_mut()
            .append_pair("q", &query.qualifier())
            .append_pair("sort", query.key.sort())
            .append_pair("order", "desc")
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let text = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Run one search, following pages until the limit, the remote total, a
    /// short page, or the page cap is reached.
    pub async fn search_pages<R: DeserializeOwned>(
        &self,
        kind: EntityKind,
        query: &SearchQuery,
    ) -> Result<SearchPage<R>> {
        let limit = query.limit.max(1);
        let (per_page, pages) = page_plan(self.per_page, self.max_pages, limit);

        let mut items = Vec::with_capacity(limit.min(per_page * pages));
        let mut total_count = 0;

        for page in 1..=pages {
            if page > 1 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let url = self.search_url(kind, query, per_page, page)?;
            log::debug!("GET {url}");
            let response: SearchResponse<R> = self.get_json(url).await?;
            if response.incomplete_results {
                log::warn!(
                    "Search {} timed out remotely, page {page} may be partial",
                    query.qualifier()
                );
            }

            total_count = response.total_count;
            let received = response.items.len();
            items.extend(response.items);

            if !wants_next_page(received, per_page, items.len(), limit, total_count) {
                break;
            }
        }

        items.truncate(limit);
        Ok(SearchPage { total_count, items })
    }
}

/// Page size and number of pages needed to collect `limit` results.
fn page_plan(per_page: usize, max_pages: usize, limit: usize) -> (usize, usize) {
    let limit = limit.max(1);
    let per_page = per_page.max(1).min(limit);
    (per_page, limit.div_ceil(per_page).min(max_pages.max(1)))
}

/// False once a page came back short or the limit or remote total is reached.
fn wants_next_page(
    received: usize,
    per_page: usize,
    collected: usize,
    limit: usize,
    total_count: u64,
) -> bool {
    received >= per_page && collected < limit && (collected as u64) < total_count
}

#[async_trait]
impl<E: Entity> Search<E> for GitHubClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage<E::Raw>> {
        self.search_pages(E::KIND, query).await
    }
}

#[async_trait]
impl Projection<Repository> for GitHubClient {
    async fn project(&self, raw: RawRepository) -> Result<Repository> {
        let full_name = raw.full_name.clone();
        let repository = Repository::from(raw);
        if !self.fetch_details {
            return Ok(repository);
        }

        let details: RepositoryDetails = self
            .get_json(self.endpoint(&format!("repos/{full_name}"))?)
            .await?;
        let languages: BTreeMap<String, u64> = self
            .get_json(self.endpoint(&format!("repos/{full_name}/languages"))?)
            .await?;
        Ok(repository.with_details(details, languages))
    }
}

#[async_trait]
impl Projection<User> for GitHubClient {
    async fn project(&self, raw: RawUser) -> Result<User> {
        let details: UserDetails = self
            .get_json(self.endpoint(&format!("users/{}", raw.login))?)
            .await?;
        Ok(User::from(details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RankingKey, Window};
    use crate::services::search::ScoreFilter;

    fn client(api_url: &str) -> GitHubClient {
        let config = GitHubConfig {
            api_url: api_url.to_string(),
            ..GitHubConfig::default()
        };
        GitHubClient::new(&config, None).unwrap()
    }

    #[test]
    fn search_url_carries_window_and_sort() {
        let query = SearchQuery {
            key: RankingKey::Repositories,
            filter: ScoreFilter::Within(Window { floor: 1, ceiling: 1050 }),
            limit: 1000,
        };
        let url = client("https://api.github.com")
            .search_url(EntityKind::User, &query, 100, 3)
            .unwrap();

        assert_eq!(url.path(), "/search/users");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".into(), "repos:1..1050".into()),
                ("sort".into(), "repositories".into()),
                ("order".into(), "desc".into()),
                ("per_page".into(), "100".into()),
                ("page".into(), "3".into()),
            ]
        );
    }

    #[test]
    fn bound_query_asks_for_one_result() {
        assert_eq!(page_plan(100, 10, 1), (1, 1));
    }

    #[test]
    fn page_plan_respects_limit_and_page_cap() {
        assert_eq!(page_plan(100, 10, 1000), (100, 10));
        assert_eq!(page_plan(100, 10, 250), (100, 3));
        assert_eq!(page_plan(100, 3, 1000), (100, 3));
        assert_eq!(page_plan(100, 10, 40), (40, 1));
    }

    #[test]
    fn short_page_stops_paging() {
        assert!(!wants_next_page(37, 100, 137, 1000, 5000));
    }

    #[test]
    fn remote_total_stops_paging() {
        assert!(!wants_next_page(100, 100, 200, 1000, 200));
        assert!(wants_next_page(100, 100, 200, 1000, 201));
    }

    #[test]
    fn limit_stops_paging() {
        assert!(!wants_next_page(100, 100, 300, 300, 5000));
        assert!(!wants_next_page(1, 1, 1, 1, 5000));
        assert!(wants_next_page(100, 100, 200, 300, 5000));
    }

    #[test]
    fn api_prefix_is_kept() {
        let url = client("https://ghe.example.com/api/v3")
            .endpoint("search/repositories")
            .unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/search/repositories");
    }

    #[test]
    fn parses_search_response() {
        let response: SearchResponse<RawUser> = serde_json::from_str(
            r#"{
                "total_count": 2,
                "incomplete_results": false,
                "items": [
                    {"id": 1, "login": "a", "type": "User", "html_url": "https://github.com/a", "score": 1.0},
                    {"id": 2, "login": "b", "type": "Organization", "html_url": "https://github.com/b", "score": 1.0}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(response.total_count, 2);
        assert_eq!(response.items[1].login, "b");
    }
}

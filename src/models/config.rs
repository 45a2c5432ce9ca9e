//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::RankingKey;

/// Environment variable that overrides `github.token_file`.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and search API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Windowing behavior
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Where results are written
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.github.user_agent.trim().is_empty() {
            return Err(AppError::validation("github.user_agent is empty"));
        }
        url::Url::parse(&self.github.api_url)?;
        if self.github.timeout_secs == 0 {
            return Err(AppError::validation("github.timeout_secs must be > 0"));
        }
        if self.github.per_page == 0 || self.github.per_page > 100 {
            return Err(AppError::validation("github.per_page must be within 1..=100"));
        }
        if self.github.max_pages == 0 {
            return Err(AppError::validation("github.max_pages must be > 0"));
        }
        if self.github.max_concurrent == 0 {
            return Err(AppError::validation("github.max_concurrent must be > 0"));
        }
        if self.crawl.result_cap == 0 {
            return Err(AppError::validation("crawl.result_cap must be > 0"));
        }
        if self.crawl.result_cap > self.github.per_page * self.github.max_pages {
            return Err(AppError::validation(
                "crawl.result_cap exceeds github.per_page * github.max_pages",
            ));
        }
        if self.crawl.span == Some(0) {
            return Err(AppError::validation("crawl.span must be > 0 when set"));
        }
        if self.output.dir.as_os_str().is_empty() {
            return Err(AppError::validation("output.dir is empty"));
        }
        Ok(())
    }
}

/// HTTP client and search API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    /// File holding the API token; `GITHUB_TOKEN` takes precedence
    #[serde(default = "defaults::token_file")]
    pub token_file: PathBuf,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Results per search page (API maximum is 100)
    #[serde(default = "defaults::per_page")]
    pub per_page: usize,

    /// Pages the API serves per query before cutting off
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,

    /// Delay between page requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent projection requests within one window
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Fetch subscriber counts and languages per repository
    #[serde(default)]
    pub fetch_details: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::api_url(),
            token_file: defaults::token_file(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            per_page: defaults::per_page(),
            max_pages: defaults::max_pages(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
            fetch_details: false,
        }
    }
}

/// Windowing behavior of the range crawler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Added to the discovered bound before the first window
    #[serde(default = "defaults::margin")]
    pub margin: u64,

    /// Maximum window width; unset means every window reaches down to 1
    #[serde(default)]
    pub span: Option<u64>,

    /// Results the remote API exposes for any single query
    #[serde(default = "defaults::result_cap")]
    pub result_cap: usize,

    /// Lower threshold of the bound query, per ranking key
    #[serde(default)]
    pub baselines: Baselines,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            margin: defaults::margin(),
            span: None,
            result_cap: defaults::result_cap(),
            baselines: Baselines::default(),
        }
    }
}

/// Bound query thresholds. Any value below the true maximum is safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baselines {
    #[serde(default = "defaults::baseline")]
    pub stars: u64,
    #[serde(default = "defaults::baseline")]
    pub forks: u64,
    #[serde(default = "defaults::baseline")]
    pub followers: u64,
    #[serde(default = "defaults::baseline")]
    pub repositories: u64,
}

impl Baselines {
    pub fn get(&self, key: RankingKey) -> u64 {
        match key {
            RankingKey::Stars => self.stars,
            RankingKey::Forks => self.forks,
            RankingKey::Followers => self.followers,
            RankingKey::Repositories => self.repositories,
        }
    }
}

impl Default for Baselines {
    fn default() -> Self {
        Self {
            stars: defaults::baseline(),
            forks: defaults::baseline(),
            followers: defaults::baseline(),
            repositories: defaults::baseline(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory result files are written to
    #[serde(default = "defaults::output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // GitHub defaults
    pub fn api_url() -> String {
        "https://api.github.com".into()
    }
    pub fn token_file() -> PathBuf {
        PathBuf::from("auth.txt")
    }
    pub fn user_agent() -> String {
        "toprank/0.1".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn per_page() -> usize {
        100
    }
    pub fn max_pages() -> usize {
        10
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_concurrent() -> usize {
        5
    }

    // Crawl defaults
    pub fn margin() -> u64 {
        50
    }
    pub fn result_cap() -> usize {
        1000
    }
    pub fn baseline() -> u64 {
        1000
    }

    // Output defaults
    pub fn output_dir() -> PathBuf {
        PathBuf::from("data")
    }
}

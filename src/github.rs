use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use crate::config::GithubConfig;

/// Outbound lookup of a user's most recently created public repositories.
#[async_trait]
pub trait RepoDirectory: Send + Sync {
    /// `Ok(None)` when the API answers with anything but 200.
    async fn recent_repos(&self, username: &str) -> anyhow::Result<Option<serde_json::Value>>;
}

#[derive(Clone)]
pub struct GithubApi {
    client: Client,
    base_url: Url,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl GithubApi {
    pub fn new(cfg: &GithubConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        let base_url = Url::parse(&cfg.api_url).context("parse GITHUB_API_URL")?;
        Ok(Self {
            client,
            base_url,
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
        })
    }

    /// `.` and `..` would be resolved as dot-segments and leave `/users/`.
    fn is_path_safe(username: &str) -> bool {
        !matches!(username, "" | "." | "..")
    }

    fn repos_url(&self, username: &str) -> anyhow::Result<Url> {
        anyhow::ensure!(
            Self::is_path_safe(username),
            "username {username:?} is not a path segment"
        );
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("GITHUB_API_URL cannot be a base"))?
            .pop_if_empty()
            .extend(["users", username, "repos"]);
        url.query_pairs_mut()
            .append_pair("per_page", "5")
            .append_pair("sort", "created:asc");
        Ok(url)
    }
}

#[async_trait]
impl RepoDirectory for GithubApi {
    async fn recent_repos(&self, username: &str) -> anyhow::Result<Option<serde_json::Value>> {
        if !Self::is_path_safe(username) {
            warn!(username, "github lookup for a non-user path");
            return Ok(None);
        }
        let url = self.repos_url(username)?;
        let mut req = self.client.get(url);
        if let Some(id) = &self.client_id {
            req = req.basic_auth(id, self.client_secret.as_deref());
        }

        let res = req.send().await.context("github repos request")?;
        if res.status() != StatusCode::OK {
            warn!(status = %res.status(), username, "github lookup failed");
            return Ok(None);
        }
        let body = res
            .json::<serde_json::Value>()
            .await
            .context("decode github repos")?;
        debug!(username, "github repos fetched");
        Ok(Some(body))
    }
}

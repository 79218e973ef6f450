use std::collections::HashMap;
use std::env;
use std::path::Path;

use async_trait::async_trait;
use progress_core::model::{LearnerId, ProgressTree};
use reqwest::Client;
use url::Url;

use crate::error::{ProgressApiConfigError, ProgressSourceError};

/// Where learner progress trees come from.
#[async_trait]
pub trait ProgressSource: Send + Sync {
    /// Fetch the raw progress tree of one learner.
    ///
    /// # Errors
    ///
    /// Returns `ProgressSourceError` if the tree cannot be fetched or decoded.
    async fn fetch(&self, learner_id: &LearnerId) -> Result<ProgressTree, ProgressSourceError>;
}

//
// ─── HTTP SOURCE ───────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct ProgressApiConfig {
    pub base_url: Url,
    pub token: Option<String>,
}

impl ProgressApiConfig {
    /// Validate a base URL and optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ProgressApiConfigError` if the URL is blank, malformed, or not http(s).
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ProgressApiConfigError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ProgressApiConfigError::MissingBaseUrl);
        }
        let base_url = Url::parse(trimmed)?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ProgressApiConfigError::UnsupportedScheme(
                base_url.scheme().to_string(),
            ));
        }
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(Self { base_url, token })
    }

    /// Reads `PROGRESS_API_BASE_URL` and `PROGRESS_API_TOKEN`.
    ///
    /// Returns `Ok(None)` when no base URL is configured.
    ///
    /// # Errors
    ///
    /// Returns `ProgressApiConfigError` if the configured URL is invalid.
    pub fn from_env() -> Result<Option<Self>, ProgressApiConfigError> {
        let Ok(base_url) = env::var("PROGRESS_API_BASE_URL") else {
            return Ok(None);
        };
        if base_url.trim().is_empty() {
            return Ok(None);
        }
        Self::new(&base_url, env::var("PROGRESS_API_TOKEN").ok()).map(Some)
    }

    /// Endpoint serving one learner's progress tree.
    ///
    /// The learner id is appended as a single escaped path segment.
    #[must_use]
    pub fn progress_url(&self, learner_id: &LearnerId) -> Url {
        let mut url = self.base_url.clone();
        url.set_fragment(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["learner-progress", learner_id.as_str()]);
        }
        url
    }
}

/// Fetches trees from the external progress-reporting API.
#[derive(Clone)]
pub struct HttpProgressSource {
    client: Client,
    config: ProgressApiConfig,
}

impl HttpProgressSource {
    #[must_use]
    pub fn new(config: ProgressApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ProgressSource for HttpProgressSource {
    async fn fetch(&self, learner_id: &LearnerId) -> Result<ProgressTree, ProgressSourceError> {
        let url = self.config.progress_url(learner_id);
        tracing::debug!(%url, "fetching learner progress");

        let mut request = self.client.get(url.clone());
        if let Some(token) = self.config.token.as_deref() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), %url, "progress request rejected");
            return Err(ProgressSourceError::HttpStatus(response.status()));
        }

        let body = response.text().await?;
        Ok(ProgressTree::from_json(&body)?)
    }
}

//
// ─── STATIC SOURCE ─────────────────────────────────────────────────────────────
//

/// Serves pre-loaded trees: per learner, or one tree for everybody.
#[derive(Clone, Debug, Default)]
pub struct StaticProgressSource {
    trees: HashMap<LearnerId, ProgressTree>,
    fallback: Option<ProgressTree>,
}

impl StaticProgressSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `tree` to every learner.
    #[must_use]
    pub fn single(tree: ProgressTree) -> Self {
        Self {
            trees: HashMap::new(),
            fallback: Some(tree),
        }
    }

    /// Load a progress document from disk and serve it to every learner.
    ///
    /// # Errors
    ///
    /// Returns `ProgressSourceError` if the file cannot be read or is not a
    /// progress document.
    pub fn from_file(path: &Path) -> Result<Self, ProgressSourceError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::single(ProgressTree::from_json(&text)?))
    }

    #[must_use]
    pub fn with_tree(mut self, learner_id: LearnerId, tree: ProgressTree) -> Self {
        self.trees.insert(learner_id, tree);
        self
    }
}

#[async_trait]
impl ProgressSource for StaticProgressSource {
    async fn fetch(&self, learner_id: &LearnerId) -> Result<ProgressTree, ProgressSourceError> {
        self.trees
            .get(learner_id)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| ProgressSourceError::UnknownLearner(learner_id.clone()))
    }
}

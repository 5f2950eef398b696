// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the game site.
//!
//! Handles:
//! - Fetching the "who's online" page
//! - Fetching an account's profile page
//! - Bounded request time with a single retry on transient failures

use crate::models::CharacterKey;
use std::time::Duration;

/// Pause before the one retry of a failed request.
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// Errors talking to the game site.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
}

impl SiteError {
    /// Timeouts, connection errors and 5xx/429 responses are worth one retry.
    pub fn is_transient(&self) -> bool {
        match self {
            SiteError::Transport { .. } => true,
            SiteError::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

impl From<SiteError> for crate::error::AppError {
    fn from(err: SiteError) -> Self {
        crate::error::AppError::Site(err.to_string())
    }
}

/// Game site client.
#[derive(Clone)]
pub struct SiteClient {
    http: reqwest::Client,
    base_url: String,
}

impl SiteClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        use anyhow::Context;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("meno-stats/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed building site HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the "who's online" page.
    pub fn online_url(&self) -> String {
        format!("{}/stats", self.base_url)
    }

    /// Profile URL for a character.
    ///
    /// The fragment only matters to browsers; the server returns the whole
    /// account page and the character is picked out by `data-id`.
    pub fn profile_url(&self, key: &CharacterKey) -> String {
        format!(
            "{}/profile/view,{}#char_{},{}",
            self.base_url, key.account_id, key.character_id, key.world
        )
    }

    /// Fetch the "who's online" page body.
    pub async fn fetch_online_page(&self) -> Result<String, SiteError> {
        self.get_text(&self.online_url()).await
    }

    /// Fetch a character's profile page body.
    pub async fn fetch_profile_page(&self, key: &CharacterKey) -> Result<String, SiteError> {
        self.get_text(&self.profile_url(key)).await
    }

    /// GET with one retry on transient failure.
    async fn get_text(&self, url: &str) -> Result<String, SiteError> {
        match self.get_text_once(url).await {
            Err(err) if err.is_transient() => {
                tracing::debug!(url, error = %err, "Retrying site request");
                tokio::time::sleep(RETRY_DELAY).await;
                self.get_text_once(url).await
            }
            result => result,
        }
    }

    async fn get_text_once(&self, url: &str) -> Result<String, SiteError> {
        let transport = |e: reqwest::Error| SiteError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.http.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                tracing::warn!(url, "Game site rate limit hit (429)");
            }
            return Err(SiteError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(transport)
    }
}

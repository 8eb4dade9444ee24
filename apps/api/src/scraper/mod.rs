//! Scrape client for the post-scraper actor.
//!
//! Runs the actor synchronously and maps its dataset items into a [`ProfileSnapshot`].
//! Every failure is swallowed: without a token, or when the live call fails or comes
//! back empty, the caller gets the built-in sample profile instead. Real outages are
//! therefore only visible in the WARN logs.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::profile::{ProfileSnapshot, RecentPost};

pub mod sample;

pub use sample::sample_profile;

pub const DEFAULT_BASE_URL: &str = "https://api.apify.com";
pub const ACTOR_ID: &str = "apify~instagram-post-scraper";
/// Number of posts requested per scrape.
const SEARCH_LIMIT: u32 = 3;
const FALLBACK_USERNAME: &str = "scraped_user";
const PLACEHOLDER_IMAGE: &str = "https://placehold.co/400";

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The request URL carries the token, so it is stripped before wrapping.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Scraper API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No data returned from scraper")]
    Empty,
}

impl From<reqwest::Error> for ScrapeError {
    fn from(e: reqwest::Error) -> Self {
        ScrapeError::Http(e.without_url())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActorInput<'a> {
    start_urls: Vec<StartUrl<'a>>,
    results_type: &'a str,
    search_limit: u32,
    search_type: &'a str,
}

#[derive(Debug, Serialize)]
struct StartUrl<'a> {
    url: &'a str,
}

/// One dataset item from the post scraper. Only the fields the snapshot uses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostItem {
    caption: Option<String>,
    display_url: Option<String>,
    likes_count: Option<i64>,
    owner_username: Option<String>,
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Clone)]
pub struct ScrapeClient {
    client: Client,
    token: Option<String>,
    base_url: String,
    sample_delay: Duration,
}

impl ScrapeClient {
    /// `base_url` comes from config and defaults to [`DEFAULT_BASE_URL`].
    pub fn with_base_url(
        token: Option<String>,
        timeout_secs: u64,
        sample_delay: Duration,
        base_url: &str,
    ) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()?,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            sample_delay,
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Fetches a profile snapshot. Never fails; see the module docs for the fallback rules.
    pub async fn fetch(&self, profile_url: &str) -> ProfileSnapshot {
        info!("Initiating scrape for: {profile_url}");

        let Some(token) = self.token.as_deref() else {
            warn!("APIFY_API_TOKEN not configured, using sample profile");
            // Keep the unconfigured path's timing close to a live call.
            tokio::time::sleep(self.sample_delay).await;
            return sample_profile();
        };

        match self.fetch_live(profile_url, token).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Scraping failed, falling back to sample profile");
                sample_profile()
            }
        }
    }

    async fn fetch_live(&self, profile_url: &str, token: &str) -> Result<ProfileSnapshot, ScrapeError> {
        let url = format!(
            "{}/v2/acts/{ACTOR_ID}/run-sync-get-dataset-items",
            self.base_url
        );
        let payload = ActorInput {
            start_urls: vec![StartUrl { url: profile_url }],
            results_type: "posts",
            search_limit: SEARCH_LIMIT,
            search_type: "posts",
        };

        let response = self
            .client
            .post(&url)
            .query(&[("token", token)])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let items: Vec<PostItem> = response.json().await?;
        info!("Scraper returned {} items", items.len());

        map_items(items)
    }
}

/// Maps dataset items into a snapshot. The post scraper has no profile-level data,
/// so biography and follower count are placeholders.
fn map_items(items: Vec<PostItem>) -> Result<ProfileSnapshot, ScrapeError> {
    let first = items.first().ok_or(ScrapeError::Empty)?;

    let username = non_empty(first.owner_username.clone())
        .unwrap_or_else(|| FALLBACK_USERNAME.to_string());
    let biography = format!(
        "(Bio unavailable from post-scraper) - Analyzed from {} recent posts.",
        items.len()
    );

    let recent_posts = items
        .into_iter()
        .map(|item| RecentPost {
            caption: item.caption.unwrap_or_default(),
            image_url: non_empty(item.display_url)
                .or_else(|| non_empty(item.images.into_iter().next()))
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            likes: item.likes_count.unwrap_or(0),
        })
        .collect();

    Ok(ProfileSnapshot {
        username,
        biography,
        followers_count: 0,
        recent_posts,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

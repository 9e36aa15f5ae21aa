//! Catalog API client
//!
//! Client-credentials authentication with a cached token, request rate
//! limiting, and the two endpoint contracts the extraction pipeline
//! consumes: paginated track search and bulk artist lookup.

use async_trait::async_trait;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use trackmart_common::config::Credentials;
use trackmart_common::models::TrackRecord;

const API_BASE_URL: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const USER_AGENT: &str = "trackmart/0.1.0 (https://github.com/trackmart/trackmart)";
const RATE_LIMIT_PER_SEC: u32 = 8;
/// Refresh the cached token this long before its reported expiry
const TOKEN_EXPIRY_SLACK: Duration = Duration::from_secs(60);

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// One page of track search results
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    /// Tracks on this page, in provider rank order
    pub items: Vec<TrackRecord>,
    /// Provider-reported total result count for the query
    pub total: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: SearchPage,
}

/// Full artist object from the bulk lookup endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub popularity: Option<i64>,
    pub followers: Option<Followers>,
}

/// Follower count wrapper as the provider nests it
#[derive(Debug, Clone, Deserialize)]
pub struct Followers {
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ArtistsResponse {
    artists: Vec<Option<ArtistDetail>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// The catalog surface consumed by the extraction and enrichment loops.
///
/// Injected by the caller so client construction (and its failure) happens
/// at startup, and so tests can substitute a scripted fake.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of track search results
    async fn search_page(
        &self,
        query: &str,
        limit: u32,
        offset: u32,
        market: Option<&str>,
    ) -> Result<SearchPage, CatalogError>;

    /// Bulk artist lookup, one response entry per requested id.
    /// Unresolvable ids come back as None.
    async fn artist_batch(&self, ids: &[String]) -> Result<Vec<Option<ArtistDetail>>, CatalogError>;
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Catalog API client (client-credentials flow)
pub struct SpotifyClient {
    http_client: reqwest::Client,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    credentials: Credentials,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    pub fn new(credentials: Credentials) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        // Safe: RATE_LIMIT_PER_SEC is a non-zero constant
        let quota = governor::Quota::per_second(NonZeroU32::new(RATE_LIMIT_PER_SEC).unwrap());

        Ok(Self {
            http_client,
            rate_limiter: governor::RateLimiter::direct(quota),
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Current access token, fetching a fresh one through the token endpoint
    /// when the cache is empty or within the expiry slack.
    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let response = self
            .http_client
            .post(TOKEN_URL)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status.as_u16() == 400 || status.as_u16() == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Auth(body));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        tracing::debug!(expires_in = token.expires_in, "Obtained catalog access token");

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_SLACK);
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }

    fn map_status(status: reqwest::StatusCode) -> Option<CatalogError> {
        match status.as_u16() {
            401 => Some(CatalogError::Auth("access token rejected".to_string())),
            429 => Some(CatalogError::RateLimited),
            _ => None,
        }
    }
}

#[async_trait]
impl CatalogApi for SpotifyClient {
    async fn search_page(
        &self,
        query: &str,
        limit: u32,
        offset: u32,
        market: Option<&str>,
    ) -> Result<SearchPage, CatalogError> {
        let token = self.access_token().await?;

        self.rate_limiter.until_ready().await;

        let mut params = vec![
            ("q", query.to_string()),
            ("type", "track".to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        if let Some(market) = market {
            params.push(("market", market.to_string()));
        }

        tracing::debug!(query = %query, offset, limit, "Querying catalog search");

        let response = self
            .http_client
            .get(format!("{}/search", API_BASE_URL))
            .bearer_auth(&token)
            .query(&params)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if let Some(err) = Self::map_status(status) {
            return Err(err);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), body));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        tracing::debug!(
            query = %query,
            offset,
            returned = search.tracks.items.len(),
            total = search.tracks.total,
            "Fetched search page"
        );

        Ok(search.tracks)
    }

    async fn artist_batch(&self, ids: &[String]) -> Result<Vec<Option<ArtistDetail>>, CatalogError> {
        let token = self.access_token().await?;

        self.rate_limiter.until_ready().await;

        tracing::debug!(ids = ids.len(), "Querying bulk artist lookup");

        let response = self
            .http_client
            .get(format!("{}/artists", API_BASE_URL))
            .bearer_auth(&token)
            .query(&[("ids", ids.join(","))])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if let Some(err) = Self::map_status(status) {
            return Err(err);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), body));
        }

        let artists: ArtistsResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(artists.artists)
    }
}

//! HTTP client for the SoundCloud API
//!
//! [`SoundCloudClient`] implements [`RemoteClient`] on top of
//! `api.soundcloud.com`.
//!
//! # Example
//!
//! ```no_run
//! use pmosoundcloud::{RemoteClient, SoundCloudClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SoundCloudClient::builder()
//!         .auth_token("1-12345-67890-abcdef")
//!         .build()?;
//!
//!     for track in client.search("field recordings").await? {
//!         println!("{} ({})", track.name, track.uri);
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::config::SoundCloudConfig;
use crate::error::{Result, SoundCloudError};
use crate::models::{ApiActivity, ApiPlaylist, ApiTrack, ApiUser, Listing, Resource, SetSummary};
use crate::remote::RemoteClient;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use moka::future::Cache;
use pmosource::Track;
use reqwest::header::{AUTHORIZATION, LOCATION};
use reqwest::{redirect, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default SoundCloud API base URL
pub const DEFAULT_API_BASE: &str = "https://api.soundcloud.com";

/// Public client id sent with every request
pub const DEFAULT_CLIENT_ID: &str = "93e33e327fd8a9b77becd179652272e2";

/// Default number of items fetched by searches and listings
pub const DEFAULT_EXPLORE_SONGS: usize = 10;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!("PMOMusic/", env!("CARGO_PKG_VERSION"), " (pmosoundcloud)");

/// Catalog tracks stay cached for one hour
const TRACK_CACHE_TTL: Duration = Duration::from_secs(3600);
const TRACK_CACHE_CAPACITY: u64 = 1000;

/// Maximum number of concurrent requests in [`SoundCloudClient::resolve_tracks`]
const MAX_CONCURRENT_LOOKUPS: usize = 16;

/// SoundCloud HTTP client
///
/// Cheap to clone: clones share the connection pool and the track cache.
#[derive(Clone)]
pub struct SoundCloudClient {
    client: Client,
    /// Same settings as `client` but never follows redirects, used to read
    /// stream locations
    head_client: Client,
    api_base: String,
    client_id: String,
    auth_token: Option<String>,
    explore_songs: usize,
    tracks: Cache<String, Option<Track>>,
}

impl std::fmt::Debug for SoundCloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundCloudClient")
            .field("api_base", &self.api_base)
            .field("authenticated", &self.auth_token.is_some())
            .field("explore_songs", &self.explore_songs)
            .finish()
    }
}

impl SoundCloudClient {
    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from the backend configuration
    pub fn from_config(config: &SoundCloudConfig) -> Result<Self> {
        let settings = &config.soundcloud;
        let mut builder = Self::builder()
            .api_base(&settings.api_base)
            .client_id(&settings.client_id)
            .auth_token(&settings.auth_token)
            .explore_songs(settings.explore_songs)
            .timeout(config.timeout());

        if let Some(proxy) = &config.proxy.url {
            builder = builder.proxy(proxy);
        }

        builder.build()
    }

    /// Get the API base URL
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Number of items requested by searches and listings
    pub fn explore_songs(&self) -> usize {
        self.explore_songs
    }

    /// The authenticated user
    pub async fn me(&self) -> Result<ApiUser> {
        self.get("me", &[], false).await
    }

    /// Fetch several tracks, keeping their order and dropping misses
    ///
    /// Up to 16 requests run at once. Failures are logged and skipped.
    pub async fn resolve_tracks(&self, track_ids: &[String]) -> Vec<Track> {
        stream::iter(track_ids)
            .map(|id| async move { (id, self.get_track(id, false).await) })
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .filter_map(|(id, result)| async move {
                match result {
                    Ok(track) => track,
                    Err(e) => {
                        warn!("Failed to fetch track {}: {}", id, e);
                        None
                    }
                }
            })
            .collect()
            .await
    }

    // ========================================================================
    // HTTP plumbing
    // ========================================================================

    /// GET `{api_base}/{path}` and decode the JSON body
    ///
    /// With `limit`, the `limit` parameter is set to `explore_songs`.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        limit: bool,
    ) -> Result<T> {
        let url = format!("{}/{}", self.api_base.trim_end_matches('/'), path);

        let mut request = self
            .client
            .get(&url)
            .query(&[("client_id", self.client_id.as_str())])
            .query(params);

        if limit {
            request = request.query(&[("limit", self.explore_songs)]);
        }
        if let Some(token) = &self.auth_token {
            request = request.header(AUTHORIZATION, format!("OAuth {}", token));
        }

        let response = request.send().await?;
        debug!("Requested {}", response.url());
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED {
                error!("Invalid \"auth_token\" used for SoundCloud authentication!");
            } else {
                warn!("SoundCloud API request failed ({}): {}", status, error_text);
            }
            return Err(SoundCloudError::from_status_code(status.as_u16(), error_text));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse response: {}", e);
            SoundCloudError::Json(e)
        })
    }

    /// Follow a track's `stream_url` one hop to find the media location
    ///
    /// Returns `None` when SoundCloud does not answer with a redirection.
    async fn stream_location(&self, stream_url: &str) -> Result<Option<String>> {
        let mut request = self
            .head_client
            .head(stream_url)
            .query(&[("client_id", self.client_id.as_str())]);
        if let Some(token) = &self.auth_token {
            request = request.header(AUTHORIZATION, format!("OAuth {}", token));
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_redirection() {
            return Ok(response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(String::from));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("SoundCloud daily rate limit exceeded");
        } else {
            debug!("No stream location for {} ({})", stream_url, status);
        }
        Ok(None)
    }

    async fn fetch_track(&self, track_id: &str, must_stream: bool) -> Result<Option<Track>> {
        debug!("Getting info for track with id {}", track_id);

        let resource: Resource = match self.get(&format!("tracks/{}", track_id), &[], false).await {
            Ok(resource) => resource,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        let Resource::Track(api_track) = resource else {
            debug!("{} is not a track", track_id);
            return Ok(None);
        };
        let Some(mut track) = api_track.to_track() else {
            return Ok(None);
        };

        if must_stream {
            let location = match api_track.stream_url.as_deref() {
                Some(stream_url) => self.stream_location(stream_url).await?,
                None => None,
            };
            match location {
                Some(location) => track.uri = location,
                None => {
                    info!("'{}' can't be streamed from SoundCloud", api_track.title());
                    return Ok(None);
                }
            }
        }

        Ok(Some(track))
    }
}

/// Keep the playable tracks of a listing, ignoring other kinds
fn tracks_only(items: Vec<Resource>) -> Vec<Track> {
    items
        .iter()
        .filter_map(|item| match item {
            Resource::Track(track) => track.to_track(),
            Resource::Playlist(playlist) => {
                debug!("Skipping set {} in a track listing", playlist.id);
                None
            }
            Resource::User(user) => {
                debug!("Skipping user {} in a track listing", user.id);
                None
            }
            Resource::Unknown => {
                debug!("Skipping item of unknown kind in a track listing");
                None
            }
        })
        .collect()
}

#[async_trait]
impl RemoteClient for SoundCloudClient {
    async fn get_track(&self, track_id: &str, must_stream: bool) -> Result<Option<Track>> {
        if must_stream {
            return self.fetch_track(track_id, true).await;
        }

        if let Some(track) = self.tracks.get(track_id).await {
            debug!("Track {} found in cache", track_id);
            return Ok(track);
        }

        let track = self.fetch_track(track_id, false).await?;
        self.tracks
            .insert(track_id.to_string(), track.clone())
            .await;
        Ok(track)
    }

    async fn resolve_url(&self, url: &str) -> Result<Vec<Track>> {
        info!("Resolving SoundCloud URL {}", url);

        let resource: Resource = match self.get("resolve", &[("url", url)], false).await {
            Ok(resource) => resource,
            Err(e) if e.is_not_found() => {
                info!("Nothing found at {}", url);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        match resource {
            Resource::User(user) => {
                debug!("{} is user {}, fetching their tracks", url, user.id);
                self.get_user_tracks(&user.id).await
            }
            Resource::Unknown => {
                warn!("Unknown item type at {}", url);
                Ok(Vec::new())
            }
            other => Ok(other.tracks()),
        }
    }

    async fn search(&self, text: &str) -> Result<Vec<Track>> {
        let listing: Listing<Resource> = self.get("tracks", &[("q", text)], true).await?;
        Ok(tracks_only(listing.into_items()))
    }

    async fn get_user_stream(&self) -> Result<Vec<Track>> {
        let listing: Listing<ApiActivity> = self.get("me/activities", &[], true).await?;
        Ok(listing
            .into_items()
            .iter()
            .filter_map(|activity| activity.origin.as_ref())
            .flat_map(Resource::tracks)
            .collect())
    }

    async fn get_followings(&self) -> Result<Vec<ApiUser>> {
        let listing: Listing<ApiUser> = self.get("me/followings", &[], true).await?;
        let users = listing.into_items();
        for user in &users {
            debug!(
                "Fetched user {} with id {}",
                user.username.as_deref().unwrap_or_default(),
                user.id
            );
        }
        Ok(users)
    }

    async fn get_user_tracks(&self, user_id: &str) -> Result<Vec<Track>> {
        let listing: Listing<Resource> =
            self.get(&format!("users/{}/tracks", user_id), &[], false).await?;
        Ok(tracks_only(listing.into_items()))
    }

    async fn get_sets(&self) -> Result<Vec<SetSummary>> {
        let listing: Listing<ApiPlaylist> = self.get("me/playlists", &[], true).await?;
        Ok(listing
            .into_items()
            .into_iter()
            .map(|playlist| {
                let track_count = playlist
                    .track_count
                    .map(|c| c as usize)
                    .unwrap_or(playlist.tracks.len());
                let name = playlist.title.unwrap_or_default();
                debug!("Fetched set {} with id {} ({} tracks)", name, playlist.id, track_count);
                SetSummary {
                    name,
                    id: playlist.id,
                    track_count,
                }
            })
            .collect())
    }

    async fn get_set(&self, set_id: &str) -> Result<Vec<Track>> {
        let playlist: ApiPlaylist = self.get(&format!("playlists/{}", set_id), &[], false).await?;
        Ok(playlist.tracks.iter().filter_map(ApiTrack::to_track).collect())
    }

    async fn get_user_liked(&self) -> Result<Vec<Track>> {
        let listing: Listing<Resource> = self.get("me/favorites", &[], true).await?;
        Ok(tracks_only(listing.into_items()))
    }
}

/// Builder for [`SoundCloudClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    api_base: String,
    client_id: String,
    auth_token: Option<String>,
    explore_songs: usize,
    timeout: Duration,
    user_agent: String,
    proxy: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            api_base: DEFAULT_API_BASE.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            auth_token: None,
            explore_songs: DEFAULT_EXPLORE_SONGS,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client for API requests
    ///
    /// Useful for sharing connection pools. Stream location lookups still
    /// use an internal client that does not follow redirects.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the API base URL
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Set the OAuth token; an empty token means anonymous access
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.auth_token = (!token.trim().is_empty()).then_some(token);
        self
    }

    /// Set the number of items fetched by searches and listings
    pub fn explore_songs(mut self, count: usize) -> Self {
        self.explore_songs = count;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a proxy URL
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    fn http_client(&self, policy: redirect::Policy) -> Result<Client> {
        let mut builder = Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .redirect(policy);

        if let Some(proxy_url) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| SoundCloudError::other(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        Ok(builder.build()?)
    }

    /// Build the client
    pub fn build(self) -> Result<SoundCloudClient> {
        let head_client = self.http_client(redirect::Policy::none())?;
        let client = match self.client.clone() {
            Some(client) => client,
            None => self.http_client(redirect::Policy::default())?,
        };

        Ok(SoundCloudClient {
            client,
            head_client,
            api_base: self.api_base,
            client_id: self.client_id,
            auth_token: self.auth_token,
            explore_songs: self.explore_songs.max(1),
            tracks: Cache::builder()
                .max_capacity(TRACK_CACHE_CAPACITY)
                .time_to_live(TRACK_CACHE_TTL)
                .build(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::default();
        assert_eq!(builder.api_base, DEFAULT_API_BASE);
        assert_eq!(builder.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(builder.explore_songs, DEFAULT_EXPLORE_SONGS);
        assert_eq!(
            builder.timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        assert!(builder.auth_token.is_none());
    }

    #[test]
    fn test_empty_token_is_anonymous() {
        assert!(ClientBuilder::new().auth_token("  ").auth_token.is_none());
        assert_eq!(
            ClientBuilder::new().auth_token("abc").auth_token.as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_invalid_proxy_is_rejected() {
        let result = SoundCloudClient::builder().proxy("http://[bad").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config() {
        let mut config = SoundCloudConfig::default();
        config.soundcloud.auth_token = "token".into();
        config.soundcloud.explore_songs = 3;
        config.soundcloud.api_base = "http://localhost:1234".into();

        let client = SoundCloudClient::from_config(&config).unwrap();
        assert_eq!(client.api_base(), "http://localhost:1234");
        assert_eq!(client.explore_songs(), 3);
        assert!(format!("{:?}", client).contains("authenticated: true"));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = SoundCloudClient::builder()
            .auth_token("secret-token")
            .build()
            .unwrap();
        assert!(!format!("{:?}", client).contains("secret-token"));
    }
}

//! Boundary between the providers and the SoundCloud service
//!
//! The library and playback providers only ever talk to a [`RemoteClient`].
//! [`crate::SoundCloudClient`] is the HTTP implementation; tests plug in
//! their own.

use crate::error::{Result, SoundCloudError};
use crate::models::{ApiUser, SetSummary};
use async_trait::async_trait;
use pmosource::Track;
use std::fmt::Debug;
use tracing::debug;

/// Extract the track id from a track URI
///
/// The id is the last `.`, `:` or `/` separated segment and must be made of
/// ASCII digits: `soundcloud:song/Some title.123` and `soundcloud:123` both
/// give `"123"`.
pub fn parse_track_id(uri: &str) -> Result<String> {
    debug!("Parsing track {}", uri);
    let id = uri.rsplit(['.', ':', '/']).next().unwrap_or_default();
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(id.to_string())
    } else {
        Err(SoundCloudError::InvalidTrackUri(uri.to_string()))
    }
}

/// Operations the backend needs from SoundCloud
#[async_trait]
pub trait RemoteClient: Debug + Send + Sync {
    /// Extract a track id from a track URI
    fn parse_track_uri(&self, uri: &str) -> Result<String> {
        parse_track_id(uri)
    }

    /// Fetch a track
    ///
    /// `Ok(None)` when the track does not exist or cannot be streamed.
    /// With `must_stream`, the returned track's URI is the concrete stream URL.
    async fn get_track(&self, track_id: &str, must_stream: bool) -> Result<Option<Track>>;

    /// Resolve any SoundCloud URL (track, set, user) into its tracks
    async fn resolve_url(&self, url: &str) -> Result<Vec<Track>>;

    /// Full-text search in the catalog
    async fn search(&self, text: &str) -> Result<Vec<Track>>;

    // ============= Browse helpers =============

    /// Tracks from the user's activity stream
    async fn get_user_stream(&self) -> Result<Vec<Track>> {
        Ok(Vec::new())
    }

    /// Users the user follows
    async fn get_followings(&self) -> Result<Vec<ApiUser>> {
        Ok(Vec::new())
    }

    /// Tracks uploaded by a user
    async fn get_user_tracks(&self, user_id: &str) -> Result<Vec<Track>> {
        let _ = user_id;
        Ok(Vec::new())
    }

    /// Sets owned by the user
    async fn get_sets(&self) -> Result<Vec<SetSummary>> {
        Ok(Vec::new())
    }

    /// Tracks of a set
    async fn get_set(&self, set_id: &str) -> Result<Vec<Track>> {
        let _ = set_id;
        Ok(Vec::new())
    }

    /// Tracks liked by the user
    async fn get_user_liked(&self) -> Result<Vec<Track>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track_id() {
        assert_eq!(parse_track_id("soundcloud:song/Some title.123").unwrap(), "123");
        assert_eq!(parse_track_id("soundcloud:song/v1.2 mix.456").unwrap(), "456");
        assert_eq!(parse_track_id("soundcloud:789").unwrap(), "789");
        assert_eq!(parse_track_id("soundcloud:song/42").unwrap(), "42");
    }

    #[test]
    fn test_parse_track_id_rejects_non_numeric() {
        for uri in ["soundcloud:song/title", "soundcloud:song/title.", "", "soundcloud:song/a.12b"] {
            assert!(
                matches!(parse_track_id(uri), Err(SoundCloudError::InvalidTrackUri(_))),
                "{uri:?} should not parse"
            );
        }
    }
}

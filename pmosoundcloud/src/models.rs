//! Data models for SoundCloud API responses
//!
//! These structures mirror the JSON returned by `api.soundcloud.com`.
//! Only the fields the backend uses are declared; everything else is ignored.
//! Conversion to host values ([`pmosource::Track`]) lives here too.

use pmosource::{Album, Artist, Track};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

/// Album name given to every SoundCloud track
pub const ALBUM_NAME: &str = "SoundCloud";

/// Artist name used when neither a label nor a user name is known
pub const UNKNOWN_LABEL: &str = "Unknown label";

/// Prefix of catalog track URIs
pub const TRACK_URI_PREFIX: &str = "soundcloud:song/";

/// Flexible deserializer for ids that may come as strings or integers
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(Error::custom("ID must be a string or number")),
    }
}

// ============================================================================
// Resources
// ============================================================================

/// A SoundCloud user
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiUser {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub permalink_url: Option<String>,
}

/// A SoundCloud track
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiTrack {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub streamable: bool,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub permalink_url: Option<String>,
    #[serde(default)]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub label_name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user: Option<ApiUser>,
}

/// A SoundCloud set (playlist)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiPlaylist {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub track_count: Option<u32>,
    #[serde(default)]
    pub tracks: Vec<ApiTrack>,
}

/// Any resource returned by `resolve`, listings or activities,
/// discriminated by its `kind` field
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resource {
    Track(ApiTrack),
    Playlist(ApiPlaylist),
    User(ApiUser),
    #[serde(other)]
    Unknown,
}

/// A listing: either a bare array or a paginated `collection`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Items(Vec<T>),
    Page {
        collection: Vec<T>,
        #[serde(default)]
        next_href: Option<String>,
    },
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Items(items) => items,
            Listing::Page { collection, .. } => collection,
        }
    }
}

/// An entry of the user's activity stream (`me/activities`)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiActivity {
    #[serde(default, rename = "type")]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub origin: Option<Resource>,
}

/// A set owned by the user, as listed by the browse tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSummary {
    pub name: String,
    pub id: String,
    pub track_count: usize,
}

// ============================================================================
// Conversion to host values
// ============================================================================

/// Reduce a title to characters safe in a URI path segment
///
/// Decomposes accented letters (NFKD) so they keep their base letter, then
/// keeps ASCII letters, digits and `-_.() `, drops everything else,
/// collapses runs of spaces and trims.
pub fn readable_url(title: &str) -> String {
    let kept: String = title
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || "-_.() ".contains(*c))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Catalog URI of a track
pub fn track_uri(title: &str, id: &str) -> String {
    format!("{}{}.{}", TRACK_URI_PREFIX, readable_url(title), id)
}

impl ApiTrack {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Name shown as artist: the label, else the uploader
    pub fn artist_name(&self) -> &str {
        self.label_name
            .as_deref()
            .filter(|l| !l.is_empty())
            .or_else(|| self.user.as_ref().and_then(|u| u.username.as_deref()))
            .unwrap_or(UNKNOWN_LABEL)
    }

    /// Cover image: the artwork, else the uploader's avatar
    pub fn image(&self) -> Option<&str> {
        self.artwork_url
            .as_deref()
            .or_else(|| self.user.as_ref().and_then(|u| u.avatar_url.as_deref()))
    }

    /// Convert to a host track with its catalog URI
    ///
    /// Returns `None` when SoundCloud does not allow streaming it.
    pub fn to_track(&self) -> Option<Track> {
        if !self.streamable {
            info!("'{}' can't be streamed from SoundCloud", self.title());
            return None;
        }

        let images = self.image().map(String::from).into_iter().collect();
        let album = Album::new(ALBUM_NAME).with_images(images);

        Some(Track {
            uri: track_uri(self.title(), &self.id),
            name: self.title().to_string(),
            artists: vec![Artist::new(self.artist_name())],
            album: Some(album),
            length: Some(self.duration.unwrap_or(0)),
            date: self.release_date.clone().or_else(|| self.created_at.clone()),
            comment: Some(self.permalink_url.clone().unwrap_or_default()),
        })
    }
}

impl Resource {
    /// Playable tracks held by this resource, in order
    ///
    /// Users hold no tracks by themselves: resolving them needs another
    /// request, done by the client.
    pub fn tracks(&self) -> Vec<Track> {
        match self {
            Resource::Track(track) => track.to_track().into_iter().collect(),
            Resource::Playlist(playlist) => {
                debug!("Parsing {} playlist track(s)...", playlist.tracks.len());
                playlist.tracks.iter().filter_map(ApiTrack::to_track).collect()
            }
            Resource::User(_) | Resource::Unknown => Vec::new(),
        }
    }
}

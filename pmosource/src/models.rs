//! Value types exchanged between the host and its backends
//!
//! All of these are plain immutable values: backends build them, the host
//! only reads them. None of them carries an identity beyond its fields.

use serde::{Deserialize, Serialize};

/// An artist credited on a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Display name
    pub name: String,
    /// Backend URI of the artist, when the backend exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl Artist {
    /// Create an artist without URI
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: None,
        }
    }
}

/// The album a track belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Album title
    pub name: String,
    /// Cover image URLs, best first
    #[serde(default)]
    pub images: Vec<String>,
}

impl Album {
    /// Create an album without images
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            images: Vec::new(),
        }
    }

    /// Attach cover images
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

/// A playable audio item
///
/// The `uri` is either a backend URI (e.g. `soundcloud:song/title.123`)
/// or, once resolved for playback, a concrete stream URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track URI
    pub uri: String,
    /// Track title
    pub name: String,
    /// Credited artists
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// Containing album
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<Album>,
    /// Duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    /// Release date, as reported by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Free-form comment (SoundCloud uses the permalink URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Track {
    /// Create a track with only a URI and a title
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            artists: Vec::new(),
            album: None,
            length: None,
            date: None,
            comment: None,
        }
    }

    /// Name of the first credited artist, if any
    pub fn artist_name(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }
}

/// Result of a search: a tagged, ordered list of tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result-set tag (e.g. `soundcloud:search`)
    pub uri: String,
    /// Matching tracks, in backend order
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl SearchResult {
    pub fn new(uri: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            uri: uri.into(),
            tracks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Kind of node in the browse tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    Directory,
    Album,
    Artist,
    Playlist,
    Track,
}

/// Lightweight reference to a browsable or playable object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ref {
    pub uri: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RefType,
}

impl Ref {
    pub fn new(kind: RefType, uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            kind,
        }
    }

    /// Reference to a directory node
    pub fn directory(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(RefType::Directory, uri, name)
    }

    /// Reference to a playable track
    pub fn track(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(RefType::Track, uri, name)
    }

    pub fn is_directory(&self) -> bool {
        self.kind == RefType::Directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_constructors() {
        let dir = Ref::directory("soundcloud:directory", "SoundCloud");
        assert!(dir.is_directory());
        assert_eq!(dir.name, "SoundCloud");

        let track = Ref::track("soundcloud:song/x.1", "x");
        assert_eq!(track.kind, RefType::Track);
        assert!(!track.is_directory());
    }

    #[test]
    fn test_ref_serializes_kind_as_type() {
        let json = serde_json::to_value(Ref::directory("a:b", "B")).unwrap();
        assert_eq!(json["type"], "directory");
        assert_eq!(json["uri"], "a:b");
    }

    #[test]
    fn test_track_artist_name() {
        let mut track = Track::new("soundcloud:song/x.1", "x");
        assert_eq!(track.artist_name(), None);

        track.artists.push(Artist::new("Someone"));
        assert_eq!(track.artist_name(), Some("Someone"));
    }

    #[test]
    fn test_track_deserializes_with_defaults() {
        let track: Track =
            serde_json::from_str(r#"{"uri": "soundcloud:song/a.1", "name": "a"}"#).unwrap();
        assert!(track.artists.is_empty());
        assert!(track.album.is_none());
        assert!(track.length.is_none());
    }
}

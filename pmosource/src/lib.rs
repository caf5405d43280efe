//! # PMOSource
//!
//! Contract between the PMOMusic host and its music backends.
//!
//! A backend plugs into the host through three traits:
//!
//! - [`LibraryProvider`]: browse, search and lookup of tracks
//! - [`PlaybackProvider`]: turn a track URI into something the audio
//!   pipeline can play
//! - [`Backend`]: composition root, declares the URI schemes it owns and
//!   exposes its providers
//!
//! The host owns scheduling. Every method is a plain `async fn` awaited on
//! the host runtime; backends keep no hidden threads.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pmosource::{Backend, Query};
//!
//! let backend: Arc<dyn Backend> = Arc::new(my_backend);
//!
//! if let Some(library) = backend.library() {
//!     let result = library.search(Some(&Query::from("daft punk")), None, false).await?;
//!     for track in result.map(|r| r.tracks).unwrap_or_default() {
//!         println!("{} - {}", track.artist_name().unwrap_or("?"), track.name);
//!     }
//! }
//! ```

pub mod models;
pub mod query;

use std::fmt::Debug;

pub use async_trait::async_trait;
pub use models::{Album, Artist, Ref, RefType, SearchResult, Track};
pub use query::{FieldValue, Query};

/// Errors surfaced by a backend to the host
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// A backend-specific failure (remote API, parsing, ...)
    #[error("{backend} backend error: {source}")]
    Backend {
        backend: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Feature not supported: {0}")]
    NotSupported(String),

    #[error("Audio error: {0}")]
    Audio(String),
}

impl BackendError {
    /// Wrap a backend-specific error
    pub fn backend<E>(backend: &'static str, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            backend,
            source: Box::new(error),
        }
    }
}

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Library side of a backend
#[async_trait]
pub trait LibraryProvider: Debug + Send + Sync {
    /// Root node of this backend in the host's browse tree
    fn root_directory(&self) -> &Ref;

    /// List the children of a browse node
    async fn browse(&self, uri: &str) -> Result<Vec<Ref>> {
        let _ = uri;
        Ok(Vec::new())
    }

    /// Search the backend
    ///
    /// `Ok(None)` means "no result" and is not an error.
    ///
    /// # Arguments
    ///
    /// * `query` - The query, possibly absent
    /// * `uris` - Restrict the search to these URI roots
    /// * `exact` - Ask for exact matches instead of fuzzy ones
    async fn search(
        &self,
        query: Option<&Query>,
        uris: Option<&[String]>,
        exact: bool,
    ) -> Result<Option<SearchResult>>;

    /// Resolve a URI to the tracks it designates
    ///
    /// Never fails: a backend that cannot answer returns an empty list.
    async fn lookup(&self, uri: &str) -> Vec<Track>;
}

/// Audio output the playback side hands stream URLs to
pub trait AudioSink: Debug + Send + Sync {
    /// Load a new stream URL
    fn set_uri(&self, uri: &str) -> Result<()>;
}

/// Playback side of a backend
#[async_trait]
pub trait PlaybackProvider: Debug + Send + Sync {
    /// Audio output injected at construction
    fn audio(&self) -> &dyn AudioSink;

    /// Translate a track URI into a playable stream URL
    ///
    /// `Ok(None)` means the track cannot be played.
    async fn translate_uri(&self, uri: &str) -> Result<Option<String>>;

    /// Prepare the audio output for `track`
    ///
    /// Returns `false` when no playable URI could be obtained.
    async fn change_track(&self, track: &Track) -> Result<bool> {
        match self.translate_uri(&track.uri).await? {
            Some(uri) => {
                self.audio().set_uri(&uri)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// A backend as seen by the host
pub trait Backend: Debug + Send + Sync {
    /// URI schemes owned by this backend
    fn uri_schemes(&self) -> &[&'static str];

    fn library(&self) -> Option<&dyn LibraryProvider> {
        None
    }

    fn playback(&self) -> Option<&dyn PlaybackProvider> {
        None
    }

    /// Whether `uri` belongs to this backend
    fn handles_uri(&self, uri: &str) -> bool {
        uri.split_once(':')
            .is_some_and(|(scheme, _)| self.uri_schemes().contains(&scheme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingSink {
        uris: Mutex<Vec<String>>,
    }

    impl AudioSink for RecordingSink {
        fn set_uri(&self, uri: &str) -> Result<()> {
            self.uris.lock().unwrap().push(uri.to_string());
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct TestPlayback {
        sink: RecordingSink,
    }

    #[async_trait]
    impl PlaybackProvider for TestPlayback {
        fn audio(&self) -> &dyn AudioSink {
            &self.sink
        }

        async fn translate_uri(&self, uri: &str) -> Result<Option<String>> {
            match uri.strip_prefix("test:") {
                Some("missing") => Ok(None),
                Some(id) => Ok(Some(format!("http://example.com/{}", id))),
                None => Err(BackendError::InvalidUri(uri.to_string())),
            }
        }
    }

    #[derive(Debug)]
    struct TestBackend;

    impl Backend for TestBackend {
        fn uri_schemes(&self) -> &[&'static str] {
            &["test", "t"]
        }
    }

    #[tokio::test]
    async fn test_change_track_sets_audio_uri() {
        let playback = TestPlayback::default();
        let played = playback
            .change_track(&Track::new("test:42", "x"))
            .await
            .unwrap();

        assert!(played);
        assert_eq!(
            *playback.sink.uris.lock().unwrap(),
            vec!["http://example.com/42".to_string()]
        );
    }

    #[tokio::test]
    async fn test_change_track_without_uri() {
        let playback = TestPlayback::default();
        let played = playback
            .change_track(&Track::new("test:missing", "x"))
            .await
            .unwrap();

        assert!(!played);
        assert!(playback.sink.uris.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_change_track_propagates_errors() {
        let playback = TestPlayback::default();
        let result = playback.change_track(&Track::new("other:1", "x")).await;
        assert!(matches!(result, Err(BackendError::InvalidUri(_))));
    }

    #[test]
    fn test_handles_uri() {
        let backend = TestBackend;
        assert!(backend.handles_uri("test:1"));
        assert!(backend.handles_uri("t:https://example.com"));
        assert!(!backend.handles_uri("other:1"));
        assert!(!backend.handles_uri("test"));
        assert!(backend.library().is_none());
        assert!(backend.playback().is_none());
    }

    #[test]
    fn test_backend_error_keeps_source() {
        let io = std::io::Error::other("boom");
        let err = BackendError::backend("test", io);
        assert_eq!(err.to_string(), "test backend error: boom");
        assert!(std::error::Error::source(&err).is_some());
    }
}

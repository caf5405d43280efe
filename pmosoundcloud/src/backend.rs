//! Composition root of the SoundCloud backend

use crate::client::SoundCloudClient;
use crate::config::SoundCloudConfig;
use crate::error::{Result, SoundCloudError};
use crate::library::SoundCloudLibraryProvider;
use crate::playback::SoundCloudPlaybackProvider;
use crate::remote::RemoteClient;
use pmosource::{AudioSink, Backend, LibraryProvider, PlaybackProvider};
use std::sync::Arc;
use tracing::{info, info_span, Span};

/// URI schemes owned by the backend
pub const URI_SCHEMES: [&str; 2] = ["soundcloud", "sc"];

/// SoundCloud backend: one library and one playback provider sharing a
/// remote client
#[derive(Debug)]
pub struct SoundCloudBackend {
    library: SoundCloudLibraryProvider,
    playback: SoundCloudPlaybackProvider,
    span: Span,
}

impl SoundCloudBackend {
    /// Assemble the backend from its collaborators
    ///
    /// Providers log inside child spans of `parent`.
    pub fn new(remote: Arc<dyn RemoteClient>, audio: Arc<dyn AudioSink>, parent: &Span) -> Self {
        let span = info_span!(parent: parent, "soundcloud.backend");
        Self {
            library: SoundCloudLibraryProvider::new(remote.clone(), &span),
            playback: SoundCloudPlaybackProvider::new(remote, audio, &span),
            span,
        }
    }

    /// Build the HTTP client described by `config` and assemble the backend
    pub fn from_config(config: &SoundCloudConfig, audio: Arc<dyn AudioSink>) -> Result<Self> {
        config.validate().map_err(SoundCloudError::Config)?;
        if !config.soundcloud.enabled {
            return Err(SoundCloudError::other("SoundCloud backend is disabled"));
        }

        let client = SoundCloudClient::from_config(config)?;
        let backend = Self::new(Arc::new(client), audio, &Span::current());
        backend.span.in_scope(|| {
            info!(
                explore_songs = config.soundcloud.explore_songs,
                "SoundCloud backend ready"
            );
        });
        Ok(backend)
    }
}

impl Backend for SoundCloudBackend {
    fn uri_schemes(&self) -> &[&'static str] {
        &URI_SCHEMES
    }

    fn library(&self) -> Option<&dyn LibraryProvider> {
        Some(&self.library)
    }

    fn playback(&self) -> Option<&dyn PlaybackProvider> {
        Some(&self.playback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{stream_url, track, FakeRemote};

    #[derive(Debug)]
    struct NullSink;

    impl AudioSink for NullSink {
        fn set_uri(&self, _uri: &str) -> pmosource::Result<()> {
            Ok(())
        }
    }

    fn backend(remote: FakeRemote) -> SoundCloudBackend {
        SoundCloudBackend::new(Arc::new(remote), Arc::new(NullSink), &Span::none())
    }

    #[test]
    fn test_uri_schemes() {
        let backend = backend(FakeRemote::default());
        assert_eq!(backend.uri_schemes(), ["soundcloud", "sc"]);
        assert!(backend.handles_uri("soundcloud:song/x.1"));
        assert!(backend.handles_uri("sc:https://soundcloud.com/x"));
        assert!(!backend.handles_uri("file:///music/x.flac"));
    }

    #[tokio::test]
    async fn test_providers_share_the_remote() {
        let backend = backend(FakeRemote::with_tracks([("1", track("1", "a"))]));

        let library = backend.library().unwrap();
        assert_eq!(library.root_directory().uri, "soundcloud:directory");
        assert_eq!(library.lookup("soundcloud:song/a.1").await, vec![track("1", "a")]);

        let playback = backend.playback().unwrap();
        assert_eq!(
            playback.translate_uri("soundcloud:song/a.1").await.unwrap(),
            Some(stream_url("1"))
        );
    }

    #[test]
    fn test_from_config_requires_token() {
        let config = SoundCloudConfig::default();
        let result = SoundCloudBackend::from_config(&config, Arc::new(NullSink));
        assert!(matches!(result, Err(SoundCloudError::Config(_))));
    }

    #[test]
    fn test_from_config_disabled() {
        let mut config = SoundCloudConfig::default();
        config.soundcloud.enabled = false;
        assert!(SoundCloudBackend::from_config(&config, Arc::new(NullSink)).is_err());
    }

    #[test]
    fn test_from_config() {
        let mut config = SoundCloudConfig::default();
        config.soundcloud.auth_token = "1-12345-67890-abcdef".into();

        let backend = SoundCloudBackend::from_config(&config, Arc::new(NullSink)).unwrap();
        assert!(backend.library().is_some());
        assert!(backend.playback().is_some());
    }
}

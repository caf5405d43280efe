//! Playback provider: turns catalog URIs into stream URLs

use crate::remote::RemoteClient;
use pmosource::{async_trait, AudioSink, PlaybackProvider, Result};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument, Span};

#[derive(Debug)]
pub struct SoundCloudPlaybackProvider {
    remote: Arc<dyn RemoteClient>,
    audio: Arc<dyn AudioSink>,
    span: Span,
}

impl SoundCloudPlaybackProvider {
    pub fn new(remote: Arc<dyn RemoteClient>, audio: Arc<dyn AudioSink>, parent: &Span) -> Self {
        Self {
            remote,
            audio,
            span: info_span!(parent: parent, "soundcloud.playback"),
        }
    }

    async fn stream_url(&self, uri: &str) -> Result<Option<String>> {
        let track_id = self.remote.parse_track_uri(uri)?;
        match self.remote.get_track(&track_id, true).await? {
            Some(track) => {
                debug!(%uri, stream = %track.uri, "Translated");
                Ok(Some(track.uri))
            }
            None => {
                info!(%uri, "No stream available");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl PlaybackProvider for SoundCloudPlaybackProvider {
    fn audio(&self) -> &dyn AudioSink {
        self.audio.as_ref()
    }

    async fn translate_uri(&self, uri: &str) -> Result<Option<String>> {
        self.stream_url(uri).instrument(self.span.clone()).await
    }
}

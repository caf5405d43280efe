//! In-memory [`RemoteClient`] recording every call, for provider tests

use crate::error::{Result, SoundCloudError};
use crate::models::{ApiUser, SetSummary};
use crate::remote::RemoteClient;
use async_trait::async_trait;
use pmosource::Track;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub(crate) struct FakeRemote {
    pub calls: Mutex<Vec<String>>,
    /// Catalog, by track id
    pub tracks: HashMap<String, Track>,
    pub resolved: Vec<Track>,
    pub found: Vec<Track>,
    pub sets: Vec<SetSummary>,
    pub followings: Vec<ApiUser>,
    /// Tracks returned by every listing helper
    pub listed: Vec<Track>,
    /// Every remote call fails with a 500
    pub failing: bool,
}

pub(crate) fn track(id: &str, name: &str) -> Track {
    Track::new(format!("soundcloud:song/{}.{}", name, id), name)
}

/// Stream URL handed out for `id` when `must_stream` is set
pub(crate) fn stream_url(id: &str) -> String {
    format!("https://cf-media.sndcdn.com/{}.128.mp3", id)
}

impl FakeRemote {
    pub fn with_tracks(tracks: impl IntoIterator<Item = (&'static str, Track)>) -> Self {
        Self {
            tracks: tracks
                .into_iter()
                .map(|(id, t)| (id.to_string(), t))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing {
            Err(SoundCloudError::from_status_code(500, "boom"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteClient for FakeRemote {
    async fn get_track(&self, track_id: &str, must_stream: bool) -> Result<Option<Track>> {
        self.record(format!("get_track {} {}", track_id, must_stream))?;
        Ok(self.tracks.get(track_id).cloned().map(|mut track| {
            if must_stream {
                track.uri = stream_url(track_id);
            }
            track
        }))
    }

    async fn resolve_url(&self, url: &str) -> Result<Vec<Track>> {
        self.record(format!("resolve_url {}", url))?;
        Ok(self.resolved.clone())
    }

    async fn search(&self, text: &str) -> Result<Vec<Track>> {
        self.record(format!("search {}", text))?;
        Ok(self.found.clone())
    }

    async fn get_user_stream(&self) -> Result<Vec<Track>> {
        self.record("get_user_stream".into())?;
        Ok(self.listed.clone())
    }

    async fn get_followings(&self) -> Result<Vec<ApiUser>> {
        self.record("get_followings".into())?;
        Ok(self.followings.clone())
    }

    async fn get_user_tracks(&self, user_id: &str) -> Result<Vec<Track>> {
        self.record(format!("get_user_tracks {}", user_id))?;
        Ok(self.listed.clone())
    }

    async fn get_sets(&self) -> Result<Vec<SetSummary>> {
        self.record("get_sets".into())?;
        Ok(self.sets.clone())
    }

    async fn get_set(&self, set_id: &str) -> Result<Vec<Track>> {
        self.record(format!("get_set {}", set_id))?;
        Ok(self.listed.clone())
    }

    async fn get_user_liked(&self) -> Result<Vec<Track>> {
        self.record("get_user_liked".into())?;
        Ok(self.listed.clone())
    }
}

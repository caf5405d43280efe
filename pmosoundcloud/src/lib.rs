//! # PMOSoundCloud - SoundCloud backend for PMOMusic
//!
//! Lets the host search, browse and play tracks from SoundCloud.
//!
//! The backend owns the `soundcloud:` and `sc:` URI schemes:
//!
//! - `soundcloud:song/<title>.<id>`: a catalog track
//! - `soundcloud:directory[:<path>]`: a node of the browse tree
//! - `sc:<url>`: any SoundCloud web URL, resolved on lookup
//!
//! ## Architecture
//!
//! - [`SoundCloudLibraryProvider`]: search, lookup and browse
//! - [`SoundCloudPlaybackProvider`]: stream URL translation
//! - [`SoundCloudBackend`]: wires both to a [`RemoteClient`]
//! - [`SoundCloudClient`]: the HTTP [`RemoteClient`], with a track cache
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pmosoundcloud::{SoundCloudBackend, SoundCloudConfig};
//! use pmosource::{Backend, Query};
//!
//! let config = SoundCloudConfig::load("soundcloud.yaml")?;
//! let backend = SoundCloudBackend::from_config(&config, audio_sink)?;
//!
//! let library = backend.library().unwrap();
//! if let Some(result) = library.search(Some(&Query::from("ambient")), None, false).await? {
//!     for track in result.tracks {
//!         println!("{}", track.name);
//!     }
//! }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod playback;
pub mod remote;

#[cfg(test)]
mod testing;

pub use backend::{SoundCloudBackend, URI_SCHEMES};
pub use client::{ClientBuilder, SoundCloudClient};
pub use config::SoundCloudConfig;
pub use error::{Result, SoundCloudError};
pub use library::{generate_uri, simplify_search_query, SoundCloudLibraryProvider};
pub use playback::SoundCloudPlaybackProvider;
pub use remote::RemoteClient;

//! Search SoundCloud through the backend and resolve a stream URL
//!
//! ```text
//! PMOSOUNDCLOUD__SOUNDCLOUD__AUTH_TOKEN=<token> RUST_LOG=debug \
//!     cargo run -p pmosoundcloud --example search -- "field recordings"
//! ```
//!
//! An optional second argument is read as a YAML config file.

use pmosoundcloud::{SoundCloudBackend, SoundCloudConfig};
use pmosource::{AudioSink, Backend, Query};
use std::sync::Arc;

/// Prints what the host audio pipeline would receive
#[derive(Debug)]
struct PrintSink;

impl AudioSink for PrintSink {
    fn set_uri(&self, uri: &str) -> pmosource::Result<()> {
        println!("  -> audio uri: {}", uri);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let text = args.next().unwrap_or_else(|| "field recordings".to_string());
    let config = match args.next() {
        Some(path) => SoundCloudConfig::load(path)?,
        None => SoundCloudConfig::from_yaml_str("{}")?,
    };

    println!("=== PMOSoundCloud - search ===\n");
    let backend = SoundCloudBackend::from_config(&config, Arc::new(PrintSink))?;
    let library = backend.library().ok_or_else(|| anyhow::anyhow!("no library"))?;
    let playback = backend.playback().ok_or_else(|| anyhow::anyhow!("no playback"))?;

    let query = Query::fields([("any", text.as_str())]);
    let Some(result) = library.search(Some(&query), None, false).await? else {
        println!("No result for '{}'", text);
        return Ok(());
    };

    println!("{} track(s) for '{}':", result.tracks.len(), text);
    for (i, track) in result.tracks.iter().enumerate() {
        println!(
            "  {}. {} - {} ({}s)",
            i + 1,
            track.artist_name().unwrap_or("?"),
            track.name,
            track.length.unwrap_or(0) / 1000
        );
    }

    if let Some(first) = result.tracks.first() {
        println!("\nPlaying {}", first.uri);
        if !playback.change_track(first).await? {
            println!("  '{}' can't be streamed", first.name);
        }
    }

    println!("\nBrowse root:");
    for entry in library.browse(&library.root_directory().uri).await? {
        println!("  [{:?}] {} ({})", entry.kind, entry.name, entry.uri);
    }

    Ok(())
}

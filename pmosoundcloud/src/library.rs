//! Library provider: search, lookup and browse
//!
//! Every method is a single round-trip through the injected
//! [`RemoteClient`]. Log events are emitted inside the provider's
//! `soundcloud.library` span.

use crate::remote::RemoteClient;
use pmosource::{
    async_trait, BackendError, LibraryProvider, Query, Ref, Result, SearchResult, Track,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument, Span};
use url::Url;

/// URI of the backend's root node in the browse tree
pub const ROOT_DIRECTORY_URI: &str = "soundcloud:directory";

/// Name of the root node
pub const ROOT_DIRECTORY_NAME: &str = "SoundCloud";

/// URI tagging every search result
pub const SEARCH_URI: &str = "soundcloud:search";

const DIRECTORY_PREFIX: &str = "soundcloud:directory:";

/// Folders shown under the root node, in display order
const ROOT_FOLDERS: [(&str, &str); 4] = [
    ("following", "Following"),
    ("liked", "Liked"),
    ("sets", "Sets"),
    ("stream", "Stream"),
];

/// Flatten a query into a single free-text string
///
/// Field values are taken in field order, lists are space-joined, text is
/// returned as is.
pub fn simplify_search_query(query: &Query) -> String {
    match query {
        Query::Text(text) => text.clone(),
        Query::List(items) => items.join(" "),
        Query::Fields(fields) => fields
            .values()
            .flat_map(|value| value.values())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Browse URI of a directory below the root
///
/// The path is joined with `/` and percent-encoded as a whole:
/// `["a", "b c"]` gives `soundcloud:directory:a%2Fb%20c`.
pub fn generate_uri(path: &[&str]) -> String {
    format!("{}{}", DIRECTORY_PREFIX, urlencoding::encode(&path.join("/")))
}

/// Browse entries for tracks, dropping later tracks with an already seen name
fn track_refs(tracks: Vec<Track>) -> Vec<Ref> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|track| seen.insert(track.name.clone()))
        .map(|track| Ref::track(track.uri, track.name))
        .collect()
}

#[derive(Debug)]
pub struct SoundCloudLibraryProvider {
    remote: Arc<dyn RemoteClient>,
    root: Ref,
    span: Span,
}

impl SoundCloudLibraryProvider {
    /// Create the provider; its span is a child of `parent`
    pub fn new(remote: Arc<dyn RemoteClient>, parent: &Span) -> Self {
        Self {
            remote,
            root: Ref::directory(ROOT_DIRECTORY_URI, ROOT_DIRECTORY_NAME),
            span: info_span!(parent: parent, "soundcloud.library"),
        }
    }

    async fn search_tracks(
        &self,
        query: Option<&Query>,
        uris: Option<&[String]>,
        exact: bool,
    ) -> Result<Option<SearchResult>> {
        if exact {
            debug!("Exact search is not supported, searching anyway");
        }
        if let Some(uris) = uris {
            debug!(?uris, "Ignoring URI restriction");
        }

        let Some(query) = query.filter(|q| !q.is_empty()) else {
            info!("No query, nothing to search");
            return Ok(None);
        };
        info!(%query, "Search called");

        if let Some(uri) = query.field("uri") {
            return self.search_url(&uri.concat()).await;
        }

        let text = simplify_search_query(query);
        info!(query = %text, "Searching SoundCloud");
        let tracks = self.remote.search(&text).await?;
        Ok(Some(SearchResult::new(SEARCH_URI, tracks)))
    }

    /// Search by SoundCloud URL: resolve it when the host is SoundCloud's
    async fn search_url(&self, text: &str) -> Result<Option<SearchResult>> {
        match Url::parse(text) {
            Ok(url) if url.host_str().is_some_and(|h| h.contains("soundcloud.com")) => {
                info!(uri = %text, "Resolving SoundCloud URL");
                let tracks = self.remote.resolve_url(text).await?;
                Ok(Some(SearchResult::new(SEARCH_URI, tracks)))
            }
            Ok(_) => {
                info!(uri = %text, "Not a SoundCloud URL, no result");
                Ok(None)
            }
            Err(e) => {
                info!(uri = %text, "Unparsable URL, no result: {}", e);
                Ok(None)
            }
        }
    }

    async fn lookup_tracks(&self, uri: &str) -> Vec<Track> {
        if uri.contains("sc:") {
            let url = uri.replace("sc:", "");
            return match self.remote.resolve_url(&url).await {
                Ok(tracks) => tracks,
                Err(e) => {
                    error!(uri = %url, "Failed to resolve: {}", e);
                    Vec::new()
                }
            };
        }

        let track = match self.remote.parse_track_uri(uri) {
            Ok(id) => self.remote.get_track(&id, false).await,
            Err(e) => Err(e),
        };

        match track {
            Ok(Some(track)) => vec![track],
            Ok(None) => {
                info!(%uri, "Failed to lookup: SoundCloud track not found");
                Vec::new()
            }
            Err(e) => {
                error!(%uri, "Failed to lookup: {}", e);
                Vec::new()
            }
        }
    }

    async fn browse_directory(&self, uri: &str) -> Result<Vec<Ref>> {
        if uri == ROOT_DIRECTORY_URI {
            return Ok(ROOT_FOLDERS
                .iter()
                .map(|(path, name)| Ref::directory(generate_uri(&[*path]), *name))
                .collect());
        }

        let Some(encoded) = uri.strip_prefix(DIRECTORY_PREFIX) else {
            debug!(%uri, "Not a SoundCloud directory");
            return Ok(Vec::new());
        };
        let path = urlencoding::decode(encoded)
            .map_err(|e| BackendError::InvalidUri(format!("{}: {}", uri, e)))?;
        let (kind, id) = match path.split_once('/') {
            Some((kind, id)) => (kind, Some(id)),
            None => (&*path, None),
        };
        debug!(kind, ?id, "Browsing");

        let refs = match (kind, id) {
            ("sets", None) => self
                .remote
                .get_sets()
                .await?
                .into_iter()
                .map(|set| Ref::directory(generate_uri(&["sets", set.id.as_str()]), set.name))
                .collect(),
            ("sets", Some(id)) => track_refs(self.remote.get_set(id).await?),
            ("following", None) => self
                .remote
                .get_followings()
                .await?
                .into_iter()
                .map(|user| {
                    Ref::directory(
                        generate_uri(&["following", user.id.as_str()]),
                        user.username.unwrap_or_default(),
                    )
                })
                .collect(),
            ("following", Some(id)) => track_refs(self.remote.get_user_tracks(id).await?),
            ("liked", None) => track_refs(self.remote.get_user_liked().await?),
            ("stream", None) => track_refs(self.remote.get_user_stream().await?),
            _ => {
                debug!(%uri, "Unknown directory");
                Vec::new()
            }
        };

        Ok(refs)
    }
}

#[async_trait]
impl LibraryProvider for SoundCloudLibraryProvider {
    fn root_directory(&self) -> &Ref {
        &self.root
    }

    async fn browse(&self, uri: &str) -> Result<Vec<Ref>> {
        self.browse_directory(uri)
            .instrument(self.span.clone())
            .await
    }

    async fn search(
        &self,
        query: Option<&Query>,
        uris: Option<&[String]>,
        exact: bool,
    ) -> Result<Option<SearchResult>> {
        self.search_tracks(query, uris, exact)
            .instrument(self.span.clone())
            .await
    }

    async fn lookup(&self, uri: &str) -> Vec<Track> {
        self.lookup_tracks(uri).instrument(self.span.clone()).await
    }
}

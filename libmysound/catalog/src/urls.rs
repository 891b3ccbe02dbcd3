//! Pure URL construction for backend resources. Nothing in here touches the network.

use crate::catalog_error::CatalogError;

const STREAM_PATH: &str = "api/stream";

/// Joins a backend-relative path onto the base url, normalizing the slash between them.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Resolves the artwork location for a track.
///
/// Absolute urls (anything with a `scheme://` prefix) are returned verbatim, everything else is
/// treated as relative to the backend. A missing or blank path means the track has no artwork.
pub fn resolve_artwork_url(base_url: &str, path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    if has_scheme(path) {
        Some(path.to_owned())
    } else {
        Some(endpoint(base_url, path))
    }
}

/// The streaming endpoint for a track. Only numeric ids can be streamed.
pub fn stream_url(base_url: &str, track_id: &str) -> Result<String, CatalogError> {
    let id = parse_track_id(track_id)?;
    Ok(endpoint(base_url, &format!("{STREAM_PATH}/{id}")))
}

pub fn parse_track_id(track_id: &str) -> Result<u64, CatalogError> {
    track_id
        .parse::<u64>()
        .map_err(|_| CatalogError::InvalidTrackIdentifier(track_id.to_owned()))
}

fn has_scheme(path: &str) -> bool {
    match path.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

#[cfg(test)]
#[path = "./urls_test.rs"]
mod urls_test;

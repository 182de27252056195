// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Media URL handling.
//!
//! Rows are bound to YouTube URLs. Three URL shapes carry a video id:
//! `youtube.com/watch?v=ID`, `youtube.com/embed/ID` and `youtu.be/ID`.
//! Only the watch and short forms are accepted as row input.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::duration::DurationLookup;

lazy_static! {
    static ref RE_VALID: Regex =
        Regex::new(r"^(https?://)?(www\.)?(youtube\.com/watch\?v=|youtu\.be/)([a-zA-Z0-9_-]{11})").unwrap();
    static ref RE_WATCH: Regex =
        Regex::new(r"(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([^&]+)").unwrap();
    static ref RE_EMBED: Regex =
        Regex::new(r"(?:https?://)?(?:www\.)?youtube\.com/embed/([^/?]+)").unwrap();
    static ref RE_SHORT: Regex =
        Regex::new(r"(?:https?://)?(?:www\.)?youtu\.be/([^/?]+)").unwrap();
}

/// Check whether a URL is an accepted row media reference
pub fn is_valid_media_url(url: &str) -> bool {
    RE_VALID.is_match(url)
}

/// Pull the video id out of a watch, embed or short URL.
///
/// Shapes are tried in that order and the first match wins.
pub fn extract_media_id(url: &str) -> Option<String> {
    [&*RE_WATCH, &*RE_EMBED, &*RE_SHORT]
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Default thumbnail image for a video URL
pub fn thumbnail_url(url: &str) -> Option<String> {
    extract_media_id(url).map(|id| format!("https://img.youtube.com/vi/{}/default.jpg", id))
}

/// Look up a video's natural length in seconds.
///
/// Yields `None` when the URL carries no id or the lookup finds nothing;
/// lookup failures are never surfaced.
pub async fn resolve_duration(url: &str, lookup: &dyn DurationLookup) -> Option<f64> {
    let Some(id) = extract_media_id(url) else {
        debug!(url, "no video id in media reference");
        return None;
    };
    lookup.lookup_duration(&id).await.filter(|secs| *secs > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::duration::DurationFuture;

    const ID: &str = "dQw4w9WgXcQ";

    struct FixedLookup(Option<f64>);

    impl DurationLookup for FixedLookup {
        fn lookup_duration<'a>(&'a self, _media_id: &'a str) -> DurationFuture<'a> {
            let value = self.0;
            Box::pin(async move { value })
        }
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid_media_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_valid_media_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_valid_media_url("youtube.com/watch?v=dQw4w9WgXcQ&t=42"));
        assert!(!is_valid_media_url("not a url"));
        assert!(!is_valid_media_url("https://youtu.be/short"));
        assert!(!is_valid_media_url("https://vimeo.com/12345678901"));
    }

    #[test]
    fn test_extract_id_all_shapes() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=abc",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?start=3",
            "https://youtu.be/dQw4w9WgXcQ",
            "youtu.be/dQw4w9WgXcQ?t=10",
        ] {
            assert_eq!(extract_media_id(url).as_deref(), Some(ID), "{}", url);
        }
        assert_eq!(extract_media_id("not a url"), None);
    }

    #[test]
    fn test_thumbnail() {
        assert_eq!(
            thumbnail_url("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/default.jpg")
        );
        assert_eq!(thumbnail_url("nope"), None);
    }

    #[tokio::test]
    async fn test_resolve_duration() {
        let url = "https://youtu.be/dQw4w9WgXcQ";
        assert_eq!(resolve_duration(url, &FixedLookup(Some(213.0))).await, Some(213.0));
        assert_eq!(resolve_duration(url, &FixedLookup(None)).await, None);
        assert_eq!(resolve_duration(url, &FixedLookup(Some(0.0))).await, None);
        assert_eq!(resolve_duration("nope", &FixedLookup(Some(5.0))).await, None);
    }
}

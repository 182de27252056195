// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Clip duration lookup.
//!
//! When a row gets a new video and has no end offset yet, the end is
//! filled in from the video's natural length, fetched from the YouTube
//! Data API.

use std::future::Future;
use std::pin::Pin;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

lazy_static! {
    static ref RE_ISO_DURATION: Regex = Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").unwrap();
}

/// Endpoint for video metadata
pub const YOUTUBE_VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Future returned by a duration lookup
pub type DurationFuture<'a> = Pin<Box<dyn Future<Output = Option<f64>> + Send + 'a>>;

/// Looks up a video's natural length by id.
///
/// Implementations resolve to `None` on any failure.
pub trait DurationLookup: Send + Sync {
    fn lookup_duration<'a>(&'a self, media_id: &'a str) -> DurationFuture<'a>;
}

/// Convert an ISO-8601 duration such as `PT1H2M3S` to whole seconds.
///
/// Text without a `PT` duration yields 0.
pub fn parse_iso8601_duration(text: &str) -> f64 {
    let Some(caps) = RE_ISO_DURATION.captures(text) else {
        return 0.0;
    };
    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    part(1)
        .saturating_mul(3600)
        .saturating_add(part(2).saturating_mul(60))
        .saturating_add(part(3)) as f64
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

/// Duration lookup backed by the YouTube Data API
#[derive(Debug, Clone)]
pub struct YouTubeDataApi {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl YouTubeDataApi {
    /// Create a lookup using the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: YOUTUBE_VIDEOS_URL.to_string(),
        }
    }

    /// Point the lookup at a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch(&self, media_id: &str) -> reqwest::Result<Option<f64>> {
        let response: VideoListResponse = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("id", media_id),
                ("part", "contentDetails"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .items
            .first()
            .map(|item| parse_iso8601_duration(&item.content_details.duration)))
    }
}

impl DurationLookup for YouTubeDataApi {
    fn lookup_duration<'a>(&'a self, media_id: &'a str) -> DurationFuture<'a> {
        Box::pin(async move {
            match self.fetch(media_id).await {
                Ok(duration) => duration,
                Err(e) => {
                    debug!(media_id, error = %e, "duration lookup failed");
                    None
                }
            }
        })
    }
}

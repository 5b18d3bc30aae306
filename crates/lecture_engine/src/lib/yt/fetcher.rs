use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use crate::{
    error::FetchError,
    types::{TranscriptBundle, VideoReference},
    yt::{
        player::{self, parse_player_response, parse_timedtext, select_caption_track},
        ContentFetcher,
    },
};

/// Fetches the watch page, resolves a caption track, and downloads the
/// transcript as `json3` timedtext. Transient HTTP failures are retried at
/// most once by the middleware; everything else is permanent.
#[derive(Debug)]
pub struct YouTubeFetcher {
    http: ClientWithMiddleware,
}

impl YouTubeFetcher {
    pub fn new() -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(1);
        let http = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        YouTubeFetcher { http }
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_watch_page(&self, url: &str) -> Result<String, FetchError> {
        let html = self
            .http
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .text()
            .await?;

        Ok(html)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_timedtext(&self, base_url: &str) -> Result<String, FetchError> {
        let separator = if base_url.contains('?') { '&' } else { '?' };
        let url = format!("{base_url}{separator}fmt=json3");

        let body = self.http.get(&url).send().await?.text().await?;
        Ok(body)
    }
}

impl Default for YouTubeFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentFetcher for YouTubeFetcher {
    #[tracing::instrument(skip(self), fields(video_id = %video.video_id))]
    async fn fetch(&self, video: &VideoReference) -> Result<TranscriptBundle, FetchError> {
        let watch_url = format!("https://www.youtube.com/watch?v={}", video.video_id);
        let html = self.fetch_watch_page(&watch_url).await?;
        let player = parse_player_response(&html)?;

        if let Some(status) = &player.playability_status {
            if status.status != "OK" {
                let reason = status.reason.clone().unwrap_or_else(|| status.status.clone());
                return Err(FetchError::Unavailable(reason));
            }
        }

        let details = player
            .video_details
            .ok_or(FetchError::Parse("player response has no videoDetails"))?;

        let tracks = player
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default();
        let track = select_caption_track(&tracks).ok_or(FetchError::NoTranscript)?;

        let timedtext = self.fetch_timedtext(&track.base_url).await?;
        let segments = parse_timedtext(&timedtext)?;
        if segments.is_empty() {
            return Err(FetchError::NoTranscript);
        }

        let transcript = player::full_text(&segments);
        tracing::info!(
            chars = transcript.len(),
            segments = segments.len(),
            "Transcript fetched"
        );

        Ok(TranscriptBundle {
            video_id: details.video_id,
            title: details.title,
            channel: details.author,
            duration_seconds: details
                .length_seconds
                .as_deref()
                .and_then(|s| s.parse().ok()),
            transcript,
            segments,
        })
    }
}

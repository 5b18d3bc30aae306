//! # Player Response Parser
//!
//! Extracts `ytInitialPlayerResponse` from a YouTube watch page and maps the
//! pieces the fetcher needs: video details, playability, and the caption
//! track list. Also decodes the `json3` timedtext document a caption track
//! points at.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::{error::FetchError, types::TranscriptSegment};

static PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)var\s+ytInitialPlayerResponse\s*=\s*(\{.*?\});\s*(?:var\s|</script>)")
        .unwrap()
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub playability_status: Option<PlayabilityStatus>,
    pub video_details: Option<VideoDetails>,
    pub captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayabilityStatus {
    pub status: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    pub author: String,
    pub length_seconds: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Captions {
    pub player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracklistRenderer {
    pub caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: Option<String>,
    /// `"asr"` marks an auto-generated track.
    pub kind: Option<String>,
}

/// Pulls `ytInitialPlayerResponse` out of the watch page HTML.
pub fn parse_player_response(html: &str) -> Result<PlayerResponse, FetchError> {
    let captures = PLAYER_RESPONSE_RE.captures(html).ok_or(FetchError::Parse(
        "ytInitialPlayerResponse not found, page structure might have changed",
    ))?;

    serde_json::from_str(&captures[1])
        .map_err(|_| FetchError::Parse("ytInitialPlayerResponse is not valid JSON"))
}

/// Picks the transcript track to download: a manually-authored English track
/// first, then any English track, then whatever comes first.
pub fn select_caption_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    let is_english =
        |t: &&CaptionTrack| t.language_code.as_deref().is_some_and(|l| l.starts_with("en"));
    let is_manual = |t: &&CaptionTrack| t.kind.as_deref() != Some("asr");

    tracks
        .iter()
        .find(|t| is_english(t) && is_manual(t))
        .or_else(|| tracks.iter().find(is_english))
        .or_else(|| tracks.first())
}

#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    t_start_ms: Option<u64>,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    utf8: Option<String>,
}

/// Decodes a `json3` timedtext document into timed transcript segments.
pub fn parse_timedtext(json: &str) -> Result<Vec<TranscriptSegment>, FetchError> {
    let document: Json3Document = serde_json::from_str(json)
        .map_err(|_| FetchError::Parse("timedtext document is not valid json3"))?;

    let mut segments = Vec::new();
    for event in document.events {
        let Some(segs) = event.segs else { continue };
        let text = segs
            .into_iter()
            .filter_map(|s| s.utf8)
            .collect::<String>()
            .trim()
            .to_string();
        if text.is_empty() {
            continue;
        }
        segments.push(TranscriptSegment {
            start: event.t_start_ms.unwrap_or(0) as f64 / 1000.0,
            text,
        });
    }

    Ok(segments)
}

/// Joins segment texts into the single transcript string shared by all
/// generation tasks.
pub fn full_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

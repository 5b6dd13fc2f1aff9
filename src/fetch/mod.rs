use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::video::VideoId;
use crate::{Result, TubescrubError};

const WATCH_URL: &str = "https://www.youtube.com/watch";
const OEMBED_URL: &str = "https://www.youtube.com/oembed";

/// Desktop user agent, required for the watch page to include caption data
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// One timestamped unit of caption text, in chronological order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start offset from the beginning of the video, in seconds
    pub start: f64,

    /// Duration the segment stays on screen, in seconds
    pub duration: f64,

    /// Caption text
    pub text: String,
}

/// Source of transcript segments for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the ordered segment sequence for a video
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Vec<TranscriptSegment>>;

    /// Best-effort title lookup; `None` when the title cannot be resolved
    async fn video_title(&self, video_id: &VideoId) -> Option<String>;
}

/// Production transcript source backed by YouTube's caption endpoints
///
/// Fetches the watch page, reads the caption track list out of the embedded
/// player response, then downloads the selected track in `json3` format.
pub struct YoutubeTranscriptSource {
    client: Client,
    language: Option<String>,
}

impl YoutubeTranscriptSource {
    pub fn new(client: Client, language: Option<String>) -> Self {
        Self { client, language }
    }

    async fn fetch_watch_page(&self, video_id: &VideoId) -> Result<String> {
        let html = self
            .client
            .get(WATCH_URL)
            .query(&[("v", video_id.as_str())])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(html)
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Vec<TranscriptSegment>> {
        tracing::info!("Fetching caption track list for video: {}", video_id);

        let html = self.fetch_watch_page(video_id).await?;
        let tracks = parse_caption_tracks(&html, video_id)?;
        let track = select_track(&tracks, self.language.as_deref(), video_id)?;

        tracing::debug!(
            "Selected {} track in language {}",
            if track.is_generated() { "auto-generated" } else { "manual" },
            track.language_code
        );

        let body = self
            .client
            .get(track.json3_url())
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let segments = parse_json3(&body)?;
        tracing::info!("Fetched {} transcript segments", segments.len());

        Ok(segments)
    }

    async fn video_title(&self, video_id: &VideoId) -> Option<String> {
        let watch_url = format!("{}?v={}", WATCH_URL, video_id);
        let oembed_url = format!(
            "{}?url={}&format=json",
            OEMBED_URL,
            urlencoding::encode(&watch_url)
        );

        #[derive(Deserialize)]
        struct OembedResponse {
            title: String,
        }

        match self.client.get(&oembed_url).send().await {
            Ok(response) => match response.error_for_status() {
                Ok(response) => response
                    .json::<OembedResponse>()
                    .await
                    .map(|body| body.title)
                    .ok(),
                Err(e) => {
                    tracing::debug!("oEmbed lookup rejected for {}: {}", video_id, e);
                    None
                }
            },
            Err(e) => {
                tracing::debug!("oEmbed lookup failed for {}: {}", video_id, e);
                None
            }
        }
    }
}

/// Caption track entry from the player response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    /// `"asr"` marks an auto-generated track
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn json3_url(&self) -> String {
        format!("{}&fmt=json3", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsJson {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    caption_tracks: Option<Vec<CaptionTrack>>,
}

/// Extract the caption track list embedded in the watch page HTML
fn parse_caption_tracks(html: &str, video_id: &VideoId) -> Result<Vec<CaptionTrack>> {
    let Some((_, after)) = html.split_once("\"captions\":") else {
        if html.contains("\"status\":\"ERROR\"") {
            return Err(TubescrubError::VideoUnavailable {
                video_id: video_id.to_string(),
                reason: "the id does not resolve to a playable video".to_string(),
            });
        }
        if html.contains("\"status\":\"LOGIN_REQUIRED\"") {
            return Err(TubescrubError::VideoUnavailable {
                video_id: video_id.to_string(),
                reason: "the video requires sign-in".to_string(),
            });
        }
        return Err(TubescrubError::TranscriptsDisabled {
            video_id: video_id.to_string(),
        });
    };

    // The captions object ends where the videoDetails key begins
    let json = after
        .split_once(",\"videoDetails\"")
        .map(|(captions, _)| captions)
        .ok_or_else(|| TubescrubError::UnexpectedResponse {
            service: "youtube",
            detail: "caption data not delimited as expected".to_string(),
        })?;

    let captions: CaptionsJson = serde_json::from_str(json)?;

    captions
        .player_captions_tracklist_renderer
        .and_then(|renderer| renderer.caption_tracks)
        .filter(|tracks| !tracks.is_empty())
        .ok_or_else(|| TubescrubError::TranscriptsDisabled {
            video_id: video_id.to_string(),
        })
}

/// Pick a track, honoring the language preference and preferring manually
/// created tracks over auto-generated ones
fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    language: Option<&str>,
    video_id: &VideoId,
) -> Result<&'a CaptionTrack> {
    let matches_language = |track: &CaptionTrack, lang: &str| {
        track.language_code == lang
            || track
                .language_code
                .split('-')
                .next()
                .is_some_and(|base| base == lang)
    };

    match language {
        Some(lang) => tracks
            .iter()
            .filter(|track| matches_language(track, lang))
            .min_by_key(|track| track.is_generated())
            .ok_or_else(|| TubescrubError::NoTranscriptFound {
                video_id: video_id.to_string(),
                language: lang.to_string(),
            }),
        None => tracks
            .iter()
            .min_by_key(|track| track.is_generated())
            .ok_or_else(|| TubescrubError::TranscriptsDisabled {
                video_id: video_id.to_string(),
            }),
    }
}

#[derive(Debug, Deserialize)]
struct Json3Transcript {
    events: Option<Vec<Json3Event>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    t_start_ms: Option<u64>,
    d_duration_ms: Option<u64>,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    utf8: Option<String>,
}

/// Decode a `json3` caption document into transcript segments
fn parse_json3(body: &str) -> Result<Vec<TranscriptSegment>> {
    let transcript: Json3Transcript = serde_json::from_str(body)?;

    let segments = transcript
        .events
        .unwrap_or_default()
        .into_iter()
        .filter_map(|event| {
            let text = event
                .segs
                .as_ref()?
                .iter()
                .filter_map(|seg| seg.utf8.as_deref())
                .collect::<String>()
                .replace('\n', " ")
                .trim()
                .to_string();

            if text.is_empty() {
                return None;
            }

            Some(TranscriptSegment {
                start: event.t_start_ms.unwrap_or(0) as f64 / 1000.0,
                duration: event.d_duration_ms.unwrap_or(0) as f64 / 1000.0,
                text,
            })
        })
        .collect();

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_id() -> VideoId {
        VideoId::extract("dQw4w9WgXcQ").unwrap()
    }

    fn page_with_tracks(tracks_json: &str) -> String {
        format!(
            "<html>var ytInitialPlayerResponse = {{\"playabilityStatus\":{{\"status\":\"OK\"}},\"captions\":{{\"playerCaptionsTracklistRenderer\":{{\"captionTracks\":{}}}}},\"videoDetails\":{{\"videoId\":\"dQw4w9WgXcQ\"}}}};</html>",
            tracks_json
        )
    }

    #[test]
    fn parses_caption_tracks_from_watch_page() {
        let html = page_with_tracks(
            r#"[{"baseUrl":"https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ","languageCode":"en","kind":"asr"},
                {"baseUrl":"https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&x=1","languageCode":"de"}]"#,
        );

        let tracks = parse_caption_tracks(&html, &video_id()).unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(tracks[0].is_generated());
        assert_eq!(tracks[1].language_code, "de");
        assert!(tracks[0].json3_url().ends_with("&fmt=json3"));
    }

    #[test]
    fn missing_captions_means_transcripts_disabled() {
        let html = r#"<html>{"playabilityStatus":{"status":"OK"},"videoDetails":{}}</html>"#;
        let err = parse_caption_tracks(html, &video_id()).unwrap_err();
        assert!(matches!(err, TubescrubError::TranscriptsDisabled { .. }));
    }

    #[test]
    fn empty_track_list_means_transcripts_disabled() {
        let html = page_with_tracks("[]");
        let err = parse_caption_tracks(&html, &video_id()).unwrap_err();
        assert!(matches!(err, TubescrubError::TranscriptsDisabled { .. }));
    }

    #[test]
    fn playability_error_means_video_unavailable() {
        let html = r#"<html>{"playabilityStatus":{"status":"ERROR","reason":"Video unavailable"}}</html>"#;
        let err = parse_caption_tracks(html, &video_id()).unwrap_err();
        assert!(matches!(err, TubescrubError::VideoUnavailable { .. }));
    }

    #[test]
    fn selects_requested_language_with_prefix_match() {
        let html = page_with_tracks(
            r#"[{"baseUrl":"u1","languageCode":"de"},{"baseUrl":"u2","languageCode":"en-US"}]"#,
        );
        let tracks = parse_caption_tracks(&html, &video_id()).unwrap();

        let track = select_track(&tracks, Some("en"), &video_id()).unwrap();
        assert_eq!(track.language_code, "en-US");
    }

    #[test]
    fn prefers_manual_track_over_generated() {
        let html = page_with_tracks(
            r#"[{"baseUrl":"u1","languageCode":"en","kind":"asr"},{"baseUrl":"u2","languageCode":"en"}]"#,
        );
        let tracks = parse_caption_tracks(&html, &video_id()).unwrap();

        let track = select_track(&tracks, Some("en"), &video_id()).unwrap();
        assert!(!track.is_generated());

        let track = select_track(&tracks, None, &video_id()).unwrap();
        assert!(!track.is_generated());
    }

    #[test]
    fn absent_language_means_no_transcript_found() {
        let html = page_with_tracks(r#"[{"baseUrl":"u1","languageCode":"en"}]"#);
        let tracks = parse_caption_tracks(&html, &video_id()).unwrap();

        let err = select_track(&tracks, Some("fr"), &video_id()).unwrap_err();
        assert!(matches!(
            err,
            TubescrubError::NoTranscriptFound { language, .. } if language == "fr"
        ));
    }

    #[test]
    fn decodes_json3_events_into_segments() {
        let body = r#"{"events":[
            {"tStartMs":0,"dDurationMs":5000,"segs":[{"utf8":"um so"}]},
            {"tStartMs":2500,"dDurationMs":0},
            {"tStartMs":5000,"dDurationMs":4000,"segs":[{"utf8":"this is"},{"utf8":"\n"},{"utf8":"a test"}]},
            {"tStartMs":9000,"dDurationMs":1000,"segs":[{"utf8":"\n"}]}
        ]}"#;

        let segments = parse_json3(body).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "um so");
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[1].text, "this is a test");
        assert_eq!(segments[1].start, 5.0);
        assert_eq!(segments[1].duration, 4.0);
    }

    #[test]
    fn empty_event_list_yields_no_segments() {
        assert!(parse_json3(r#"{"events":[]}"#).unwrap().is_empty());
        assert!(parse_json3(r#"{}"#).unwrap().is_empty());
    }
}

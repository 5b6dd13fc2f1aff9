use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Result, TubescrubError};

/// YouTube ids are 11 characters today; accept a narrow range around that
const VIDEO_ID_MIN_LEN: usize = 10;
const VIDEO_ID_MAX_LEN: usize = 12;

/// Canonical identifier of a video on YouTube
///
/// Extracted from any of the accepted URL forms (`watch?v=`, `youtu.be/`,
/// `/embed/`, `/shorts/`, `/v/`, `/live/`) or accepted verbatim when the
/// input is already a bare id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoId(String);

impl VideoId {
    /// Extract a video id from a URL or bare id string
    pub fn extract(input: &str) -> Result<Self> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(TubescrubError::InvalidUrl(input.to_string()));
        }

        if is_valid_id(trimmed) {
            return Ok(Self(trimmed.to_string()));
        }

        let parsed = parse_lenient(trimmed)
            .ok_or_else(|| TubescrubError::InvalidUrl(input.to_string()))?;

        id_from_url(&parsed)
            .filter(|id| is_valid_id(id))
            .map(Self)
            .ok_or_else(|| TubescrubError::InvalidUrl(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VideoId {
    type Err = TubescrubError;

    fn from_str(s: &str) -> Result<Self> {
        Self::extract(s)
    }
}

/// Parse a URL, tolerating a missing scheme ("www.youtube.com/watch?v=...")
fn parse_lenient(input: &str) -> Option<Url> {
    match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(_) => None,
        Err(_) if input.contains('.') => Url::parse(&format!("https://{}", input)).ok(),
        Err(_) => None,
    }
}

/// Pull the id out of a parsed YouTube URL, if the host and path shape match
fn id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .or_else(|| host.strip_prefix("music."))
        .unwrap_or(host);

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    match host {
        // Short links carry the id as the first path segment
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" => match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            "embed" | "shorts" | "v" | "live" => segments.next().map(str::to_string),
            _ => None,
        },
        _ => None,
    }
}

fn is_valid_id(candidate: &str) -> bool {
    (VIDEO_ID_MIN_LEN..=VIDEO_ID_MAX_LEN).contains(&candidate.len())
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

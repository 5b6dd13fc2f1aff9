use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::fetch::TranscriptSegment;
use crate::utils::format_timestamp;

/// How segment texts are joined into the raw transcript
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStyle {
    /// Single space between segments
    #[default]
    Space,
    /// One segment per line
    Newline,
}

/// Rendering options for the raw transcript
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    pub join: JoinStyle,

    /// Prefix each segment with its `[H:MM:SS]` start offset; forces
    /// newline joining
    pub timestamps: bool,
}

/// Render an ordered segment sequence into a single raw transcript string
///
/// Total and deterministic: an empty sequence yields an empty string.
pub fn render_transcript(segments: &[TranscriptSegment], options: FormatOptions) -> String {
    if options.timestamps {
        return segments
            .iter()
            .map(|segment| format!("[{}] {}", format_timestamp(segment.start), segment.text))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let separator = match options.join {
        JoinStyle::Space => " ",
        JoinStyle::Newline => "\n",
    };

    segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start,
            duration: 1.0,
            text: text.to_string(),
        }
    }

    #[test]
    fn empty_sequence_yields_empty_string() {
        assert_eq!(render_transcript(&[], FormatOptions::default()), "");
    }

    #[test]
    fn joins_with_single_space_by_default() {
        let segments = [segment(0.0, "hello"), segment(5.0, "world")];
        assert_eq!(render_transcript(&segments, FormatOptions::default()), "hello world");
    }

    #[test]
    fn joins_with_newline_when_configured() {
        let segments = [segment(0.0, "hello"), segment(5.0, "world")];
        let options = FormatOptions {
            join: JoinStyle::Newline,
            timestamps: false,
        };
        assert_eq!(render_transcript(&segments, options), "hello\nworld");
    }

    #[test]
    fn timestamp_mode_prefixes_each_line() {
        let segments = [segment(0.0, "um so"), segment(5.0, "this is a test")];
        let options = FormatOptions {
            join: JoinStyle::Space,
            timestamps: true,
        };
        assert_eq!(
            render_transcript(&segments, options),
            "[0:00:00] um so\n[0:00:05] this is a test"
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let segments = [segment(0.0, "hello"), segment(5.0, "world")];
        let first = render_transcript(&segments, FormatOptions::default());
        let second = render_transcript(&segments, FormatOptions::default());
        assert_eq!(first, second);
    }
}

use std::path::{Path, PathBuf};

use crate::video::VideoId;
use crate::Result;

/// Sink for raw and cleaned transcript artifacts, keyed by video id
///
/// Files are plain text: `<id>_raw.txt` and `<id>_cleaned.txt`. Writes
/// truncate, so re-running a video overwrites the previous artifacts.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    output_dir: PathBuf,
}

impl TranscriptStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn raw_path(&self, video_id: &VideoId) -> PathBuf {
        self.output_dir.join(format!("{}_raw.txt", video_id))
    }

    pub fn cleaned_path(&self, video_id: &VideoId) -> PathBuf {
        self.output_dir.join(format!("{}_cleaned.txt", video_id))
    }

    /// Write the raw transcript, creating the output directory on demand
    pub fn write_raw(&self, video_id: &VideoId, raw_transcript: &str) -> Result<PathBuf> {
        let path = self.raw_path(video_id);
        self.write(&path, raw_transcript)?;
        Ok(path)
    }

    /// Write the cleaned transcript, creating the output directory on demand
    pub fn write_cleaned(&self, video_id: &VideoId, cleaned_transcript: &str) -> Result<PathBuf> {
        let path = self.cleaned_path(video_id);
        self.write(&path, cleaned_transcript)?;
        Ok(path)
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        fs_err::create_dir_all(&self.output_dir)?;
        fs_err::write(path, content)?;
        tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_id() -> VideoId {
        VideoId::extract("TESTID12345").unwrap()
    }

    #[test]
    fn writes_artifacts_keyed_by_video_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        let raw = store.write_raw(&video_id(), "um so this is a test").unwrap();
        let cleaned = store.write_cleaned(&video_id(), "This is a test.").unwrap();

        assert_eq!(raw.file_name().unwrap(), "TESTID12345_raw.txt");
        assert_eq!(cleaned.file_name().unwrap(), "TESTID12345_cleaned.txt");
        assert_eq!(fs_err::read_to_string(&raw).unwrap(), "um so this is a test");
        assert_eq!(fs_err::read_to_string(&cleaned).unwrap(), "This is a test.");
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("transcripts");
        let store = TranscriptStore::new(&nested);

        store.write_raw(&video_id(), "hello").unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn rerun_overwrites_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        store.write_raw(&video_id(), "first run with a longer body").unwrap();
        let path = store.write_raw(&video_id(), "second").unwrap();

        assert_eq!(fs_err::read_to_string(&path).unwrap(), "second");
    }
}

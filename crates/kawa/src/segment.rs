use std::{
    fmt,
    path::{Path, PathBuf},
};

use url::Url;

/// One unit of work for the downloader: a single chunk of a variant's stream,
/// addressed by its logical position.
///
/// `sequence` is the ordering key for reassembly. Completion order over the
/// network is arbitrary; the writer side only ever appends segments in
/// ascending `sequence`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSegment {
    pub sequence: u64,
    pub url: Url,
}

impl MediaSegment {
    pub fn new(sequence: u64, url: Url) -> Self {
        Self { sequence, url }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// Intermediate output path for this stream, e.g. `20240131-042_video.mp4`.
    pub fn phase_output(&self, stem: &Path) -> PathBuf {
        let mut name = stem.as_os_str().to_os_string();
        name.push(format!("_{}.mp4", self.as_str()));
        PathBuf::from(name)
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_output_naming() {
        let stem = Path::new("output/20240131-042");
        assert_eq!(
            StreamKind::Video.phase_output(stem),
            PathBuf::from("output/20240131-042_video.mp4")
        );
        assert_eq!(
            StreamKind::Audio.phase_output(stem),
            PathBuf::from("output/20240131-042_audio.mp4")
        );
    }
}

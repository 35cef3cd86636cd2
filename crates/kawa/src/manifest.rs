use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::{
    error::{KawaError, KawaResult},
    segment::MediaSegment,
};

/// Root manifest document. Parsed once, immutable afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub base_url: String,
    pub video: Vec<Variant>,
    #[serde(default)]
    pub audio: Vec<Variant>,
}

/// One selectable encoding of a stream.
#[derive(Debug, Clone, Deserialize)]
pub struct Variant {
    pub id: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub codecs: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub framerate: Option<f64>,
    #[serde(default)]
    pub bitrate: Option<u64>,
    #[serde(default)]
    pub avg_bitrate: Option<u64>,
    pub base_url: String,
    pub init_segment: String,
    #[serde(default)]
    pub index_segment: Option<String>,
    pub segments: Vec<SegmentRef>,
}

/// A segment address fragment. Its position in [`Variant::segments`] is the
/// logical index.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentRef {
    pub url: String,
}

impl Variant {
    pub fn pixels(&self) -> u64 {
        self.width.unwrap_or(0) as u64 * self.height.unwrap_or(0) as u64
    }

    /// Decoded initialization block, written to the sink before any segment.
    pub fn init_data(&self) -> KawaResult<Vec<u8>> {
        Ok(STANDARD.decode(&self.init_segment)?)
    }

    pub fn resolve_base(&self, manifest_base: &Url) -> KawaResult<Url> {
        join_url(manifest_base, &self.base_url)
    }

    pub fn index_url(&self, variant_base: &Url) -> KawaResult<Option<Url>> {
        self.index_segment
            .as_deref()
            .map(|index| join_url(variant_base, index))
            .transpose()
    }

    /// Segments with their logical index and absolute fetch address.
    pub fn media_segments(&self, variant_base: &Url) -> KawaResult<Vec<MediaSegment>> {
        self.segments
            .iter()
            .enumerate()
            .map(|(sequence, segment)| {
                let url = join_url(variant_base, &segment.url)?;
                Ok(MediaSegment::new(sequence as u64, url))
            })
            .collect()
    }
}

static TITLE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<title>(.+?)</title>").unwrap());

/// Fetches and parses the manifest, returning it together with the resolved
/// base address for variant lookups.
///
/// A non-200 response is fatal. The response body is searched for an HTML
/// title to give the user something better than a bare status code.
pub async fn fetch_manifest(
    client: &reqwest::Client,
    manifest_url: &Url,
) -> KawaResult<(Manifest, Url)> {
    let response = client.get(manifest_url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        let title = response.text().await.ok().and_then(|body| {
            TITLE_REGEX
                .captures(&body)
                .map(|captures| captures[1].trim().to_string())
        });
        return Err(KawaError::ManifestError { status, title });
    }

    let manifest: Manifest = serde_json::from_slice(&response.bytes().await?)?;
    let base_url = join_url(manifest_url, &manifest.base_url)?;
    Ok((manifest, base_url))
}

fn is_absolute_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}

/// Joins a relative address fragment against a base URL.
///
/// The query portion of the base (typically carrying access tokens) is kept
/// unless the fragment brings its own.
pub fn join_url(current: &Url, new: &str) -> KawaResult<Url> {
    if is_absolute_url(new) {
        Ok(Url::parse(new)?)
    } else {
        let mut merged = current.join(new)?;
        if merged.query().is_none() {
            merged.set_query(current.query());
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_relative() {
        let base = Url::parse("https://example.com/streams/master.json").unwrap();
        assert_eq!(
            join_url(&base, "../parcel/video/").unwrap().as_str(),
            "https://example.com/parcel/video/"
        );
    }

    #[test]
    fn test_join_url_absolute() {
        let base = Url::parse("https://example.com/streams/master.json").unwrap();
        assert_eq!(
            join_url(&base, "https://cdn.example.com/seg.m4s").unwrap().as_str(),
            "https://cdn.example.com/seg.m4s"
        );
    }

    #[test]
    fn test_join_url_keeps_base_query() {
        let base = Url::parse("https://example.com/master.json?auth=secret").unwrap();
        assert_eq!(
            join_url(&base, "video/segment-1.m4s").unwrap().as_str(),
            "https://example.com/video/segment-1.m4s?auth=secret"
        );
        assert_eq!(
            join_url(&base, "video/segment-1.m4s?auth=new").unwrap().as_str(),
            "https://example.com/video/segment-1.m4s?auth=new"
        );
    }
}

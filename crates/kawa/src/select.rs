use std::fmt;

use crate::manifest::Variant;

/// Composite ranking key, descending: pixel count, then frame rate, then
/// nominal bitrate (average bitrate as fallback). Missing values rank as 0,
/// so audio variants compare on bitrate alone.
fn rank_key(variant: &Variant) -> (u64, u64, u64) {
    let framerate = variant
        .framerate
        .map(|rate| (rate * 1000.0) as u64)
        .unwrap_or(0);
    let bitrate = variant.bitrate.or(variant.avg_bitrate).unwrap_or(0);
    (variant.pixels(), framerate, bitrate)
}

/// Picks the best variant. Ties resolve to the earliest candidate.
pub fn best(variants: &[Variant]) -> Option<&Variant> {
    variants.iter().reduce(|best, candidate| {
        if rank_key(candidate) > rank_key(best) {
            candidate
        } else {
            best
        }
    })
}

/// Read-only projection of a variant for informational display.
#[derive(Debug, Clone)]
pub struct VariantSummary {
    pub id: String,
    pub resolution: Option<(u32, u32)>,
    pub framerate: Option<f64>,
    pub bitrate: Option<u64>,
    pub codecs: Option<String>,
}

pub fn summaries(variants: &[Variant]) -> Vec<VariantSummary> {
    variants
        .iter()
        .map(|variant| VariantSummary {
            id: variant.id.clone(),
            resolution: variant.width.zip(variant.height),
            framerate: variant.framerate,
            bitrate: variant.bitrate.or(variant.avg_bitrate),
            codecs: variant.codecs.clone(),
        })
        .collect()
}

impl fmt::Display for VariantSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolution = match self.resolution {
            Some((width, height)) => format!("{width}x{height}"),
            None => "-".to_string(),
        };
        let framerate = match self.framerate {
            Some(rate) => format!("{rate}fps"),
            None => "-".to_string(),
        };
        let bitrate = match self.bitrate {
            Some(bitrate) => format!("{}kbps", bitrate / 1000),
            None => "-".to_string(),
        };
        write!(
            f,
            "{:<24} {:>9} {:>9} {:>10} {}",
            self.id,
            resolution,
            framerate,
            bitrate,
            self.codecs.as_deref().unwrap_or("-")
        )
    }
}

pub mod download;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod merge;
pub mod progress;
pub mod segment;
pub mod select;
pub mod sink;

pub use error::{KawaError, KawaResult};
pub use fetch::{Fetcher, RetryPolicy};
pub use manifest::{Manifest, Variant};
pub use segment::{MediaSegment, StreamKind};

/// ┌───────────────────────┐                ┌────────────────────┐
/// │                       │   Segment 0    │                    ├───┐
/// │                       ├────────────────►                    │   │fetch_segment
/// │                       │   Segment 1    │                    ◄───┘
/// │        Variant        ├────────────────►     Downloader     │
/// │      (manifest)       │      ...       │       [MPSC]       ├───┐
/// │                       ├────────────────►                    │   │fetch_segment
/// │                       │  Segment Last  │                    ◄───┘
/// │                       ├────────────────►                    │
/// └───────────────────────┘                └─────────┬──────────┘
///                                                    │ ascending sequence
///                                          ┌─────────▼──────────┐
///                                          │   Output Stream    │
///                                          └────────────────────┘
pub trait SegmentSource: Send + Sync {
    fn fetch_segment(
        &self,
        segment: &segment::MediaSegment,
    ) -> impl std::future::Future<Output = error::KawaResult<bytes::Bytes>> + Send;
}

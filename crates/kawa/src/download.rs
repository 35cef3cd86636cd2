pub mod ordered;
pub mod parallel;

pub use ordered::ReorderBuffer;
pub use parallel::{DownloadState, ParallelDownloader};

use std::{num::NonZeroU32, path::Path};

use url::Url;

use crate::{
    error::KawaResult,
    fetch::Fetcher,
    manifest::Variant,
    progress::ProgressReporter,
    segment::{MediaSegment, StreamKind},
    sink::StreamSink,
};

/// Per-phase knobs, threaded in from the command line.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub concurrency: NonZeroU32,
    /// Report the selection without any network or filesystem activity.
    pub simulate: bool,
    /// Cap the phase to the first N segments.
    pub limit: Option<usize>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            concurrency: NonZeroU32::new(10).unwrap(),
            simulate: false,
            limit: None,
        }
    }
}

/// Downloads one variant to `output`: initialization block, optional index
/// block, then every segment in logical order.
///
/// A terminal failure anywhere fails the whole phase; the partial stream is
/// kept under its `.dl` name and the final path is never created.
pub async fn download_variant(
    fetcher: &Fetcher,
    manifest_base: &Url,
    variant: &Variant,
    kind: StreamKind,
    output: &Path,
    options: &DownloadOptions,
) -> KawaResult<()> {
    let variant_base = variant.resolve_base(manifest_base)?;
    let mut segments = variant.media_segments(&variant_base)?;
    if let Some(limit) = options.limit {
        segments.truncate(limit);
    }

    if options.simulate {
        tracing::info!(
            "Selected {kind} variant {}: {} segments from {variant_base}",
            variant.id,
            segments.len(),
        );
        return Ok(());
    }

    tracing::info!("{kind} base url: {variant_base}");

    let mut sink = StreamSink::create(output).await?;
    tracing::info!("Saving {kind} stream to {}", sink.temp_path().display());

    let progress = ProgressReporter::new(kind, segments.len() as u64);
    let result = run_phase(
        fetcher,
        variant,
        &variant_base,
        segments,
        &mut sink,
        &progress,
        options,
    )
    .await;
    progress.finish();

    match result {
        Ok(()) => {
            let path = sink.finalize().await?;
            tracing::info!("{kind} stream finished: {}", path.display());
            Ok(())
        }
        Err(error) => {
            if let Ok(kept) = sink.abandon().await {
                tracing::warn!("Partial {kind} stream kept at {}", kept.display());
            }
            Err(error)
        }
    }
}

async fn run_phase(
    fetcher: &Fetcher,
    variant: &Variant,
    variant_base: &Url,
    segments: Vec<MediaSegment>,
    sink: &mut StreamSink,
    progress: &ProgressReporter,
    options: &DownloadOptions,
) -> KawaResult<()> {
    sink.write_all(&variant.init_data()?).await?;

    if let Some(index_url) = variant.index_url(variant_base)? {
        let index = fetcher.fetch(&index_url).await?;
        sink.write_all(&index).await?;
    }

    let mut downloader = ParallelDownloader::new(fetcher.clone(), options.concurrency);
    downloader.download(segments, sink, progress).await
}

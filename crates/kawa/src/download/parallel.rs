use std::{
    num::NonZeroU32,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tokio::sync::{mpsc, Semaphore};

use crate::{
    error::{KawaError, KawaResult},
    progress::ProgressReporter,
    segment::MediaSegment,
    sink::StreamSink,
    SegmentSource,
};

use super::ordered::ReorderBuffer;

/// Lifecycle of one variant download. Terminal states are final; retries
/// happen inside the fetcher, never at this level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadState {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// The fetch-and-reassemble engine for one variant.
///
/// Up to `concurrency` fetches run at once; completions arrive over a channel
/// in arbitrary order and are staged in a [`ReorderBuffer`] until their turn,
/// so the sink only ever sees segments in ascending sequence. The buffer and
/// the sink are touched exclusively by the single consumer loop.
pub struct ParallelDownloader<S>
where
    S: SegmentSource,
{
    source: Arc<S>,
    concurrency: NonZeroU32,
    permits: Arc<Semaphore>,
    state: DownloadState,
}

impl<S> ParallelDownloader<S>
where
    S: SegmentSource + Send + Sync + 'static,
{
    pub fn new(source: S, concurrency: NonZeroU32) -> Self {
        let permits = Arc::new(Semaphore::new(concurrency.get() as usize));

        Self {
            source: Arc::new(source),
            concurrency,
            permits,
            state: DownloadState::Pending,
        }
    }

    pub fn state(&self) -> DownloadState {
        self.state
    }

    /// Downloads all segments, writing them to `sink` strictly in ascending
    /// sequence regardless of completion order.
    ///
    /// All-or-nothing: the first terminal fetch failure stops dispatch, exits
    /// immediately without waiting for queued work, and fails the phase.
    /// In-flight fetches drain naturally; their results are discarded.
    pub async fn download(
        &mut self,
        segments: Vec<MediaSegment>,
        sink: &mut StreamSink,
        progress: &ProgressReporter,
    ) -> KawaResult<()> {
        self.state = DownloadState::Running;
        let total = segments.len() as u64;
        tracing::info!(
            "Start downloading {total} segments with {} thread(s).",
            self.concurrency.get()
        );

        let stopped = Arc::new(AtomicBool::new(false));
        let (completions, mut receiver) = mpsc::unbounded_channel();

        let _dispatcher = {
            let permits = self.permits.clone();
            let source = self.source.clone();
            let stopped = stopped.clone();
            tokio::spawn(async move {
                for segment in segments {
                    if stopped.load(Ordering::Relaxed) {
                        break;
                    }

                    let permit = permits.clone().acquire_owned().await.unwrap();
                    let source = source.clone();
                    let completions = completions.clone();
                    tokio::spawn(async move {
                        let sequence = segment.sequence;
                        let result = source.fetch_segment(&segment).await;
                        // the receiver is gone once the phase has failed
                        let _ = completions.send((sequence, result));
                        drop(permit);
                    });
                }
            })
        };

        let mut buffer = ReorderBuffer::new();
        let mut failure = None;

        'recv: while let Some((sequence, result)) = receiver.recv().await {
            match result {
                Ok(bytes) => {
                    buffer.insert(sequence, bytes);
                    // Drain the run of consecutive segments that are now
                    // ready. A late low sequence can release many buffered
                    // entries at once.
                    while let Some(bytes) = buffer.pop_next() {
                        if let Err(error) = sink.write_all(&bytes).await {
                            stopped.store(true, Ordering::Relaxed);
                            failure = Some(error);
                            break 'recv;
                        }
                        progress.advance(1);
                    }
                }
                Err(error) => {
                    stopped.store(true, Ordering::Relaxed);
                    failure = Some(error);
                    break 'recv;
                }
            }
        }

        if let Some(error) = failure {
            self.state = DownloadState::Failed;
            return Err(error);
        }

        let written = buffer.next_sequence();
        if written != total {
            self.state = DownloadState::Failed;
            return Err(KawaError::IncompleteStream { written, total });
        }

        self.state = DownloadState::Succeeded;
        Ok(())
    }
}

//! Background fetching.
//!
//! Headline fetches and thumbnail loads run as tokio tasks.  Each task sends
//! exactly one [`WorkerMsg`] back to the UI thread over an unbounded channel;
//! the main loop drains it every tick and is the only code that touches
//! [`App`](crate::app::App) state.
//!
//! ## For contributors
//!
//! Tasks are fire-and-forget: nothing cancels them.  Ordering is sorted out
//! on the receiving side with the tags carried in each message (sequence
//! number for fetches, row generation for thumbnails), so a task never needs
//! to know whether its result is still wanted.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::app::ThumbnailRequest;
use crate::error::FetchOutcome;
use crate::source::{HeadlineSource, Thumbnail, ThumbnailLoader};

/// Messages sent from background tasks to the UI thread.
#[derive(Debug)]
pub enum WorkerMsg {
    /// A headline fetch finished.
    Fetched { seq: u64, outcome: FetchOutcome },
    /// A thumbnail load finished for `row` as it was at `generation`.
    Thumbnail {
        row: usize,
        generation: u64,
        thumbnail: Thumbnail,
    },
}

/// Spawns fetch and thumbnail tasks onto a tokio runtime.
pub struct Worker {
    handle: Handle,
    tx: mpsc::UnboundedSender<WorkerMsg>,
    source: Arc<dyn HeadlineSource>,
    thumbnails: Arc<ThumbnailLoader>,
    timeout: Duration,
}

impl Worker {
    /// Create a worker and the receiver the main loop should drain.
    pub fn new(
        handle: Handle,
        source: Arc<dyn HeadlineSource>,
        thumbnails: ThumbnailLoader,
        timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<WorkerMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Self {
            handle,
            tx,
            source,
            thumbnails: Arc::new(thumbnails),
            timeout,
        };
        (worker, rx)
    }

    /// Start headline fetch number `seq`.
    pub fn spawn_fetch(&self, seq: u64) {
        let tx = self.tx.clone();
        let source = Arc::clone(&self.source);
        let timeout = self.timeout;

        self.handle.spawn(async move {
            info!(seq, source = source.name(), "fetch started");
            let outcome = source.fetch(timeout).await;
            // If the receiver is gone the UI has exited; drop the result.
            if tx.send(WorkerMsg::Fetched { seq, outcome }).is_err() {
                debug!(seq, "fetch finished after shutdown");
            }
        });
    }

    /// Start a thumbnail load for one row assignment.
    pub fn spawn_thumbnail(&self, request: ThumbnailRequest) {
        let tx = self.tx.clone();
        let loader = Arc::clone(&self.thumbnails);

        self.handle.spawn(async move {
            let thumbnail = loader.load(request.image_url.as_deref()).await;
            let _ = tx.send(WorkerMsg::Thumbnail {
                row: request.row,
                generation: request.generation,
                thumbnail,
            });
        });
    }
}

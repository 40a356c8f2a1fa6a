//! Docwatch Watch - The watch-and-process pipeline.
//!
//! This crate provides:
//! - The watch registry (attach/detach/list with pause/resume)
//! - The debounced event router (per-path coalescing of write bursts)
//! - File enumeration into document stubs with fingerprints
//! - The pipeline coordinator driving recognize → fingerprint →
//!   chunk/embed → persist per document

mod enumerate;
mod error;
mod pipeline;
mod registry;
mod router;

pub use enumerate::{enumerate, folder_for, EnumerateContext};
pub use error::{WatchError, WatchResult};
pub use pipeline::Pipeline;
pub use registry::WatchRegistry;
pub use router::{run as run_router, should_ignore, RouterConfig};

use docwatch_config::Config;
use glob::Pattern;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// The assembled watcher: registry, router, and dispatch loop.
///
/// Dropping or shutting down the watcher stops event consumption;
/// in-flight document processing that already started runs to completion.
pub struct Watcher {
    registry: Arc<WatchRegistry>,
    pipeline: Arc<Pipeline>,
    router_task: JoinHandle<()>,
    dispatch_task: JoinHandle<()>,
}

impl Watcher {
    /// Construct the OS watch primitive and start the router and dispatch
    /// loops. Failure to construct the primitive is the only fatal error.
    pub fn start(config: &Config, pipeline: Arc<Pipeline>) -> WatchResult<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let registry = Arc::new(WatchRegistry::new(event_tx)?);

        let router_config = RouterConfig::from_config(&config.watch);
        let ignore_patterns = router_config.ignore_patterns.clone();
        let settle = Duration::from_millis(config.watch.settle_ms);

        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let router_task = tokio::spawn(router::run(
            Arc::clone(&registry),
            router_config,
            event_rx,
            trigger_tx,
        ));

        let dispatch_task = tokio::spawn(dispatch_loop(
            trigger_rx,
            Arc::clone(&registry),
            Arc::clone(&pipeline),
            settle,
            ignore_patterns,
        ));

        Ok(Self {
            registry,
            pipeline,
            router_task,
            dispatch_task,
        })
    }

    /// The registry, for the administrative surface
    /// (attach/detach/list/pause/resume).
    pub fn registry(&self) -> &Arc<WatchRegistry> {
        &self.registry
    }

    /// The pipeline, for the administrative pop of recognized documents.
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Detach all directories and stop the event loops.
    pub fn shutdown(self) {
        if let Err(e) = self.registry.detach_all() {
            warn!("Shutdown detach: {}", e);
        }
        self.router_task.abort();
        self.dispatch_task.abort();
    }
}

/// Consume debounced triggers, enumerating each and handing the batch to
/// the pipeline on its own task so one slow batch never delays the next
/// trigger.
async fn dispatch_loop(
    mut triggers: mpsc::UnboundedReceiver<PathBuf>,
    registry: Arc<WatchRegistry>,
    pipeline: Arc<Pipeline>,
    settle: Duration,
    ignore_patterns: Vec<Pattern>,
) {
    while let Some(path) = triggers.recv().await {
        let roots = registry.list();
        let Some((folder_id, folder_path)) = folder_for(&roots, &path) else {
            warn!("Trigger outside any watch root, dropping: {:?}", path);
            continue;
        };

        let ctx = EnumerateContext {
            folder_id,
            folder_path,
            settle,
            ignore_patterns: ignore_patterns.clone(),
        };
        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move {
            let documents = enumerate(&path, &ctx).await;
            pipeline.process_batch(documents).await;
        });
    }
}

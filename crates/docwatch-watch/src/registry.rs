//! Watch registry: the set of directories currently under observation.

use crate::error::{WatchError, WatchResult};
use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// The authoritative set of watched directories plus the pause switch.
///
/// `notify` exposes no list operation, so every successful watch/unwatch is
/// recorded under the same lock that performs it; no other code path touches
/// the underlying watcher, so the record cannot drift from the OS watch set.
pub struct WatchRegistry {
    inner: Mutex<Inner>,
    paused: AtomicBool,
}

struct Inner {
    watcher: RecommendedWatcher,
    watched: BTreeSet<PathBuf>,
}

impl WatchRegistry {
    /// Construct the underlying OS watch primitive, forwarding raw events
    /// into `events`. Failure here is the only unrecoverable startup error.
    pub fn new(events: UnboundedSender<notify::Result<notify::Event>>) -> WatchResult<Self> {
        let watcher = notify::recommended_watcher(move |res| {
            let _ = events.send(res);
        })?;

        Ok(Self {
            inner: Mutex::new(Inner {
                watcher,
                watched: BTreeSet::new(),
            }),
            paused: AtomicBool::new(false),
        })
    }

    /// Add each path to the watch set. Failing paths are collected and
    /// reported together; the paths that succeed stay attached.
    ///
    /// Roots are stored canonicalized. Trigger paths arrive canonicalized
    /// from the router, so a root attached through a symlink would
    /// otherwise never contain its own triggers.
    pub fn attach(&self, paths: &[PathBuf]) -> WatchResult<()> {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        let mut failures = Vec::new();

        for path in paths {
            let root = match path.canonicalize() {
                Ok(root) => root,
                Err(e) => {
                    warn!("Failed to resolve {:?}: {}", path, e);
                    failures.push(format!("{}: {}", path.display(), e));
                    continue;
                }
            };
            match inner.watcher.watch(&root, RecursiveMode::Recursive) {
                Ok(()) => {
                    info!("Watching directory: {:?}", root);
                    inner.watched.insert(root);
                }
                Err(e) => {
                    warn!("Failed to watch {:?}: {}", root, e);
                    failures.push(format!("{}: {}", path.display(), e));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(WatchError::Registry { failures })
        }
    }

    /// Remove each path from the watch set, with the same best-effort,
    /// combined-error semantics as `attach`.
    pub fn detach(&self, paths: &[PathBuf]) -> WatchResult<()> {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        let mut failures = Vec::new();

        for path in paths {
            // The watch set holds canonical roots; a vanished path cannot
            // canonicalize, so fall back to the path as given
            let root = path.canonicalize().unwrap_or_else(|_| path.clone());
            match inner.watcher.unwatch(&root) {
                Ok(()) => {
                    info!("Stopped watching directory: {:?}", root);
                    inner.watched.remove(&root);
                }
                Err(e) => {
                    warn!("Failed to unwatch {:?}: {}", path, e);
                    failures.push(format!("{}: {}", path.display(), e));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(WatchError::Registry { failures })
        }
    }

    /// The current watch set.
    pub fn list(&self) -> Vec<PathBuf> {
        let inner = self.inner.lock().expect("registry lock poisoned");
        inner.watched.iter().cloned().collect()
    }

    pub fn contains(&self, path: &Path) -> bool {
        let inner = self.inner.lock().expect("registry lock poisoned");
        inner.watched.contains(path)
    }

    /// Stop dispatching events. Events arriving while paused are dropped,
    /// not queued; resume does not replay them.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        info!("Watch registry paused");
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        info!("Watch registry resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Detach every watched directory; used at shutdown.
    pub fn detach_all(&self) -> WatchResult<()> {
        let paths = self.list();
        self.detach(&paths)
    }
}

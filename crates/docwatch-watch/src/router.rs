//! Debounced event router.
//!
//! A single coordinating task owns the per-path deadline map: each path is
//! either idle (absent) or pending with a deadline. A new event for a
//! pending path resets its deadline rather than arming a second timer, so a
//! burst of writes to one path yields exactly one processing trigger once
//! the quiet period elapses.

use crate::registry::WatchRegistry;
use glob::Pattern;
use notify::EventKind;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Router settings.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Quiet period before a burst of events fires one trigger.
    pub debounce: Duration,
    /// Patterns for files that never trigger processing.
    pub ignore_patterns: Vec<Pattern>,
}

impl RouterConfig {
    pub fn from_config(config: &docwatch_config::WatchConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            ignore_patterns: config
                .ignore_patterns
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }
}

/// Consume raw watcher events until the event channel closes, sending one
/// resolved trigger path per debounced burst into `triggers`.
///
/// The loop never blocks on downstream processing; the trigger receiver is
/// responsible for spawning work. Resolution errors drop the single trigger
/// and never stop the loop.
pub async fn run(
    registry: Arc<WatchRegistry>,
    config: RouterConfig,
    mut events: UnboundedReceiver<notify::Result<notify::Event>>,
    triggers: UnboundedSender<PathBuf>,
) {
    let mut pending: HashMap<PathBuf, Instant> = HashMap::new();

    loop {
        let next_deadline = pending.values().min().copied();
        // Placeholder far-future deadline keeps select! well-formed while idle
        let sleep_target =
            next_deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        tokio::select! {
            received = events.recv() => {
                match received {
                    None => break,
                    Some(Err(e)) => {
                        error!("Watcher error: {}", e);
                    }
                    Some(Ok(event)) => {
                        if registry.is_paused() {
                            debug!("Paused, dropping event for {:?}", event.paths);
                            continue;
                        }
                        // Only create and write operations trigger processing
                        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                            continue;
                        }
                        for path in event.paths {
                            if should_ignore(&path, &config.ignore_patterns) {
                                debug!("Ignoring file: {:?}", path);
                                continue;
                            }
                            pending.insert(path, Instant::now() + config.debounce);
                        }
                    }
                }
            }
            _ = tokio::time::sleep_until(sleep_target), if next_deadline.is_some() => {
                let now = Instant::now();
                let due: Vec<PathBuf> = pending
                    .iter()
                    .filter(|(_, deadline)| **deadline <= now)
                    .map(|(path, _)| path.clone())
                    .collect();

                for path in due {
                    pending.remove(&path);
                    if registry.is_paused() {
                        debug!("Paused, dropping trigger for {:?}", path);
                        continue;
                    }
                    match path.canonicalize() {
                        Ok(resolved) => {
                            debug!("Trigger: {:?}", resolved);
                            if triggers.send(resolved).is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!("Failed to resolve {:?}: {}", path, e);
                        }
                    }
                }
            }
        }
    }
}

/// Check whether a path should never trigger processing.
pub fn should_ignore(path: &Path, patterns: &[Pattern]) -> bool {
    if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
        // Hidden files
        if filename.starts_with('.') {
            return true;
        }

        for pattern in patterns {
            if pattern.matches(filename) {
                return true;
            }
        }
    }

    let path_str = path.to_string_lossy();
    patterns.iter().any(|p| p.matches(&path_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use notify::Event;
    use tokio::sync::mpsc;

    fn registry() -> Arc<WatchRegistry> {
        let (tx, _rx) = mpsc::unbounded_channel();
        Arc::new(WatchRegistry::new(tx).unwrap())
    }

    fn config() -> RouterConfig {
        RouterConfig {
            debounce: Duration::from_millis(20),
            ignore_patterns: vec![Pattern::new("*.tmp").unwrap()],
        }
    }

    fn write_event(path: &Path) -> notify::Result<Event> {
        Ok(Event::new(EventKind::Modify(ModifyKind::Any)).add_path(path.to_path_buf()))
    }

    fn create_event(path: &Path) -> notify::Result<Event> {
        Ok(Event::new(EventKind::Create(CreateKind::File)).add_path(path.to_path_buf()))
    }

    fn remove_event(path: &Path) -> notify::Result<Event> {
        Ok(Event::new(EventKind::Remove(RemoveKind::File)).add_path(path.to_path_buf()))
    }

    async fn collect_triggers(
        rx: &mut mpsc::UnboundedReceiver<PathBuf>,
        window: Duration,
    ) -> Vec<PathBuf> {
        let mut out = Vec::new();
        let deadline = tokio::time::sleep(window);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                Some(path) = rx.recv() => out.push(path),
                _ = &mut deadline => break,
            }
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_writes_fires_single_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "hello").unwrap();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel();
        let router = tokio::spawn(run(registry(), config(), event_rx, trigger_tx));

        for _ in 0..5 {
            event_tx.send(write_event(&file)).unwrap();
        }

        let triggers = collect_triggers(&mut trigger_rx, Duration::from_millis(200)).await;
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0], file.canonicalize().unwrap());

        // Closing the event channel ends the router loop
        drop(event_tx);
        router.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_paths_fire_separately() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "a").unwrap();
        std::fs::write(&b, "b").unwrap();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(registry(), config(), event_rx, trigger_tx));

        event_tx.send(create_event(&a)).unwrap();
        event_tx.send(create_event(&b)).unwrap();

        let mut triggers = collect_triggers(&mut trigger_rx, Duration::from_millis(200)).await;
        triggers.sort();
        assert_eq!(triggers.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_events_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "a").unwrap();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(registry(), config(), event_rx, trigger_tx));

        event_tx.send(remove_event(&file)).unwrap();

        let triggers = collect_triggers(&mut trigger_rx, Duration::from_millis(100)).await;
        assert!(triggers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_events_are_dropped_and_resume_does_not_replay() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "a").unwrap();

        let reg = registry();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(reg.clone(), config(), event_rx, trigger_tx));

        reg.pause();
        event_tx.send(write_event(&file)).unwrap();
        let triggers = collect_triggers(&mut trigger_rx, Duration::from_millis(100)).await;
        assert!(triggers.is_empty());

        // Resuming does not replay the dropped event; a new event fires
        reg.resume();
        let triggers = collect_triggers(&mut trigger_rx, Duration::from_millis(100)).await;
        assert!(triggers.is_empty());

        event_tx.send(write_event(&file)).unwrap();
        let triggers = collect_triggers(&mut trigger_rx, Duration::from_millis(200)).await;
        assert_eq!(triggers.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignored_and_missing_paths_never_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join("scratch.tmp");
        std::fs::write(&tmp, "x").unwrap();
        let missing = dir.path().join("vanished.txt");

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(registry(), config(), event_rx, trigger_tx));

        event_tx.send(write_event(&tmp)).unwrap();
        // Resolution of a path deleted during the quiet period drops the
        // trigger without stopping the loop
        event_tx.send(write_event(&missing)).unwrap();

        let triggers = collect_triggers(&mut trigger_rx, Duration::from_millis(200)).await;
        assert!(triggers.is_empty());
    }

    #[test]
    fn test_should_ignore() {
        let patterns = vec![
            Pattern::new("*.tmp").unwrap(),
            Pattern::new(".DS_Store").unwrap(),
        ];

        assert!(should_ignore(Path::new("/foo/bar/.hidden"), &patterns));
        assert!(should_ignore(Path::new("/foo/bar/file.tmp"), &patterns));
        assert!(should_ignore(Path::new("/foo/.DS_Store"), &patterns));
        assert!(!should_ignore(Path::new("/foo/bar/file.txt"), &patterns));
    }
}

//! Re-run on file edits
//!
//! A `notify` watcher forwards change events into a tokio channel. Each
//! wake-up drains whatever else arrived and handles every changed file
//! once, so a burst of saves collapses into a single run with the latest
//! text.

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Quiet period before a burst of events is handled
const SETTLE_DELAY: Duration = Duration::from_millis(150);

#[derive(Debug)]
enum WatchEvent {
    Changed(PathBuf),
    Error(notify::Error),
}

/// Watch `files` and call `on_change` with each changed file until the
/// watcher shuts down. Errors from `on_change` are logged, not fatal.
pub async fn watch_files<F>(files: &[PathBuf], mut on_change: F) -> Result<()>
where
    F: FnMut(&Path) -> Result<()>,
{
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if let EventKind::Create(_) | EventKind::Modify(_) = event.kind {
                    for path in event.paths {
                        let _ = tx.send(WatchEvent::Changed(path));
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(WatchEvent::Error(e));
            }
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    )?;

    // Editors often replace the file, so watch the directory and filter
    let mut watched = Vec::new();
    let mut dirs = BTreeSet::new();
    for file in files {
        let file = canonical(file);
        if let Some(dir) = file.parent() {
            dirs.insert(dir.to_path_buf());
        }
        watched.push(file);
    }
    for dir in &dirs {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
    }

    log::info!("Watching {} file(s) for changes", watched.len());

    while let Some(event) = rx.recv().await {
        let mut changed = BTreeSet::new();
        collect(event, &watched, &mut changed);

        tokio::time::sleep(SETTLE_DELAY).await;
        while let Ok(event) = rx.try_recv() {
            collect(event, &watched, &mut changed);
        }

        for path in changed {
            log::debug!("Program changed: {}", path.display());
            if let Err(e) = on_change(&path) {
                log::error!("Failed to re-run {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(())
}

fn collect(event: WatchEvent, watched: &[PathBuf], changed: &mut BTreeSet<PathBuf>) {
    match event {
        WatchEvent::Changed(path) => {
            let path = canonical(&path);
            if watched.contains(&path) {
                changed.insert(path);
            }
        }
        WatchEvent::Error(e) => log::error!("File watcher error: {}", e),
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

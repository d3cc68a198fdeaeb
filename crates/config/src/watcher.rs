use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Watches the graph config file and signals when the palette or canvas
/// settings need to be reloaded.
///
/// Bursts of filesystem events collapse into a single pending signal, so a
/// consumer re-renders at most once per batch of writes.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// let (_watcher, mut rx) = activity_config::ConfigWatcher::spawn("/tmp/graph.toml");
/// while rx.recv().await.is_some() {
///     println!("config changed, re-rendering");
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path`. Must be called inside a tokio
    /// runtime.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let path = path.as_ref().to_path_buf();
        let watcher = Self { path: path.clone() };

        tokio::spawn(watch_loop(path, tx));

        (watcher, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<()>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;

    let (event_tx, mut event_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = event_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create config watcher: {e}");
            return;
        }
    };

    // Editors often save by renaming a temp file over the original, which
    // drops a watch placed on the file itself.
    let watched_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    if let Err(e) = watcher.watch(&watched_dir, RecursiveMode::NonRecursive) {
        error!("Failed to watch '{}': {e}", watched_dir.display());
        return;
    }

    info!("Watching graph config: {}", path.display());

    while let Some(event) = event_rx.recv().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!("Config watcher error: {e}");
                continue;
            }
        };

        if !is_relevant(&event, &path) {
            continue;
        }

        match tx.try_send(()) {
            Ok(()) => debug!("Config change queued: {:?}", event.kind),
            Err(mpsc::error::TrySendError::Full(())) => {}
            Err(mpsc::error::TrySendError::Closed(())) => break,
        }
    }
}

fn is_relevant(event: &notify::Event, path: &Path) -> bool {
    use notify::EventKind::{Create, Modify};

    matches!(event.kind, Modify(_) | Create(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == path.file_name())
}

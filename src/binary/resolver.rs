use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;

use super::locator::{BinaryLocator, ReleaseLocator};

/// Resolves the checker executable at most once for the resolver's lifetime.
///
/// Concurrent callers of [`resolve`](Self::resolve) share a single lookup and
/// at most one download; the outcome, including "unavailable", is kept.
#[derive(Debug)]
pub struct BinaryResolver<L = ReleaseLocator> {
    locator: Arc<L>,
    resolved: OnceCell<Option<PathBuf>>,
}

impl<L: BinaryLocator> BinaryResolver<L> {
    pub fn new(locator: L) -> Self {
        Self {
            locator: Arc::new(locator),
            resolved: OnceCell::new(),
        }
    }

    pub fn locator(&self) -> &L {
        self.locator.as_ref()
    }

    /// Installed lookup first, download second; the result is cached either way.
    pub async fn resolve(&self) -> Option<PathBuf> {
        self.resolved
            .get_or_init(|| async {
                // Filesystem probing stays off the async workers.
                let locator = Arc::clone(&self.locator);
                match tokio::task::spawn_blocking(move || locator.find_installed()).await {
                    Ok(Some(path)) => {
                        tracing::debug!(path = %path.display(), "Using installed comment-checker");
                        return Some(path);
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "Installed lookup did not complete"),
                }
                self.locator.download().await
            })
            .await
            .clone()
    }

    /// Never waits and never downloads: the settled value, or an installed lookup.
    pub fn resolve_sync(&self) -> Option<PathBuf> {
        match self.resolved.get() {
            Some(settled) => settled.clone(),
            None => self.locator.find_installed(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.initialized()
    }

    /// Start resolution in the background so the first check rarely waits.
    pub fn warm_up(self: &Arc<Self>) -> tokio::task::JoinHandle<Option<PathBuf>> {
        let resolver = Arc::clone(self);
        tokio::spawn(async move { resolver.resolve().await })
    }
}

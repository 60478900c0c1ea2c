use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use std::time::Duration;

use comment_checker_hooks::{BinaryLocator, BinaryResolver};

struct CountingLocator {
    installed: Option<PathBuf>,
    downloaded: Option<PathBuf>,
    lookups: AtomicUsize,
    downloads: AtomicUsize,
    lookup_thread: Mutex<Option<ThreadId>>,
}

impl CountingLocator {
    fn new(installed: Option<&str>, downloaded: Option<&str>) -> Self {
        Self {
            installed: installed.map(PathBuf::from),
            downloaded: downloaded.map(PathBuf::from),
            lookups: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
            lookup_thread: Mutex::new(None),
        }
    }
}

impl BinaryLocator for CountingLocator {
    fn find_installed(&self) -> Option<PathBuf> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        *self.lookup_thread.lock().unwrap() = Some(std::thread::current().id());
        self.installed.clone()
    }

    async fn download(&self) -> Option<PathBuf> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        // Keep the download in flight long enough for every caller to pile up.
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.downloaded.clone()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolves_share_one_download() {
    let resolver = Arc::new(BinaryResolver::new(CountingLocator::new(None, Some("/cache/comment-checker"))));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let resolver = Arc::clone(&resolver);
        handles.push(tokio::spawn(async move { resolver.resolve().await }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Some(PathBuf::from("/cache/comment-checker")));
    }
    assert_eq!(resolver.locator().downloads.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.locator().lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_resolution_is_cached_for_the_session() {
    let resolver = BinaryResolver::new(CountingLocator::new(None, None));

    assert_eq!(resolver.resolve().await, None);
    assert_eq!(resolver.resolve().await, None);
    assert!(resolver.is_resolved());
    assert_eq!(resolver.locator().downloads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn installed_binary_skips_download() {
    let resolver = BinaryResolver::new(CountingLocator::new(Some("/opt/comment-checker"), Some("/never")));

    assert_eq!(resolver.resolve().await, Some(PathBuf::from("/opt/comment-checker")));
    assert_eq!(resolver.locator().downloads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn installed_lookup_runs_on_blocking_pool() {
    let resolver = BinaryResolver::new(CountingLocator::new(Some("/opt/comment-checker"), None));

    assert_eq!(resolver.resolve().await, Some(PathBuf::from("/opt/comment-checker")));
    let lookup_thread = resolver.locator().lookup_thread.lock().unwrap().expect("lookup ran");
    // current_thread runtime: the test body owns the only async worker.
    assert_ne!(lookup_thread, std::thread::current().id());
}

#[tokio::test]
async fn resolve_sync_never_downloads() {
    let resolver = BinaryResolver::new(CountingLocator::new(None, Some("/cache/comment-checker")));

    assert_eq!(resolver.resolve_sync(), None);
    assert!(!resolver.is_resolved());
    assert_eq!(resolver.locator().downloads.load(Ordering::SeqCst), 0);

    resolver.resolve().await;
    // Settled value wins over a fresh lookup.
    assert_eq!(resolver.resolve_sync(), Some(PathBuf::from("/cache/comment-checker")));
    assert_eq!(resolver.locator().downloads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn resolve_sync_reports_installed_binary_before_resolution() {
    let resolver = BinaryResolver::new(CountingLocator::new(Some("/opt/comment-checker"), None));
    assert_eq!(resolver.resolve_sync(), Some(PathBuf::from("/opt/comment-checker")));
    assert!(!resolver.is_resolved());
}

#[tokio::test]
async fn warm_up_settles_resolution_in_background() {
    let resolver = Arc::new(BinaryResolver::new(CountingLocator::new(None, Some("/cache/cc"))));
    let handle = resolver.warm_up();

    // A caller arriving mid-flight joins the same resolution.
    assert_eq!(resolver.resolve().await, Some(PathBuf::from("/cache/cc")));
    assert_eq!(handle.await.unwrap(), Some(PathBuf::from("/cache/cc")));
    assert_eq!(resolver.locator().downloads.load(Ordering::SeqCst), 1);
}

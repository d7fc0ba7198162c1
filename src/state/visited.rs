use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Run-wide set of URLs that have already been fetched or claimed
///
/// Every crawl of every package in a run shares one `VisitedSet`, so a page
/// reachable from several packages (a common releases index, for instance)
/// is fetched at most once. The set only grows.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL for fetching
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not seen before; the caller owns the fetch
    /// * `false` - Someone already claimed it
    pub fn insert_if_absent(&self, url: &str) -> bool {
        let mut urls = self.lock();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // A panicking holder cannot leave a half-inserted string behind.
        self.urls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

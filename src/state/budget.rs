use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Cooperative limits for one run
///
/// Crawls check the budget between work items and the coordinator checks it
/// between packages. Once exhausted, a budget stays exhausted.
#[derive(Debug)]
pub struct RunBudget {
    max_packages: u64,
    packages_started: AtomicU64,
    deadline: Option<Instant>,
    stopped: AtomicBool,
}

impl RunBudget {
    /// Creates a budget
    ///
    /// # Arguments
    ///
    /// * `max_packages` - Packages that may be crawled; 0 means unlimited
    /// * `max_duration` - Wall-clock limit for the run, if any
    pub fn new(max_packages: u64, max_duration: Option<Duration>) -> Self {
        Self {
            max_packages,
            packages_started: AtomicU64::new(0),
            deadline: max_duration.map(|d| Instant::now() + d),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0, None)
    }

    /// Takes one package slot from the budget
    ///
    /// Returns false once the package limit is reached or the run is stopped.
    /// Reaching the package limit does not stop crawls already in flight.
    pub fn try_start_package(&self) -> bool {
        if self.is_exhausted() {
            return false;
        }

        if self.max_packages == 0 {
            self.packages_started.fetch_add(1, Ordering::SeqCst);
            return true;
        }

        self.packages_started
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.max_packages).then_some(n + 1)
            })
            .is_ok()
    }

    /// Whether the package limit has been used up
    pub fn packages_exhausted(&self) -> bool {
        self.max_packages > 0 && self.packages_started() >= self.max_packages
    }

    /// Whether in-flight work should wind down
    pub fn is_exhausted(&self) -> bool {
        if self.stopped.load(Ordering::SeqCst) {
            return true;
        }

        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.stop();
            return true;
        }

        false
    }

    /// Requests a stop; in-flight crawls notice at their next check
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn packages_started(&self) -> u64 {
        self.packages_started.load(Ordering::SeqCst)
    }
}

impl Default for RunBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}

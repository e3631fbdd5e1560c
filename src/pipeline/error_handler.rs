//! Run-scoped collection of branch failures. Diagnostics only; never steers control flow.

use log::{debug, warn};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::BranchError;

/// Thread-safe list of branch failures plus a lock-free count.
pub struct ScanErrors {
    count: AtomicU64,
    errors: Mutex<Vec<BranchError>>,
}

impl ScanErrors {
    pub fn with_capacity(projects: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            errors: Mutex::new(Vec::with_capacity(projects)),
        }
    }

    pub fn add(&self, err: BranchError) {
        self.count.fetch_add(1, Ordering::Relaxed);
        match self.errors.lock() {
            Ok(mut errors) => errors.push(err),
            Err(poisoned) => poisoned.into_inner().push(err),
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Take the collected failures, in recording order.
    pub fn take(&self) -> Vec<BranchError> {
        match self.errors.lock() {
            Ok(mut errors) => std::mem::take(&mut *errors),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

/// Log the end-of-run summary: warn with the count, list each failure at debug
/// (or on stderr when `verbose`).
pub fn report_scan_errors(errors: &[BranchError], verbose: bool) {
    if errors.is_empty() {
        return;
    }
    warn!(
        "encountered {} errors while scanning; affected projects were skipped",
        errors.len()
    );
    for err in errors {
        if verbose {
            eprintln!("  failed: {}", err);
        } else {
            debug!("{}", err);
        }
    }
}

//! Scan progress: atomic counters shared by workers, optionally mirrored on a kdam bar.

use kdam::{Animation, Bar, BarExt};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a project bar with a known total.
pub fn create_progress_bar(total: usize, desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = total,
        desc = desc,
        animation = Animation::Classic,
        unit = " projects"
    )))
}

/// Update the bar's total once the project list is known. Refreshes the display.
pub fn set_bar_total(pb: &ProgressBar, total: usize) {
    if let Ok(mut bar) = pb.try_lock() {
        bar.total = total;
        let _ = bar.refresh();
    }
}

/// Update progress bar if available
/// Uses try_lock to avoid blocking if mutex is contended (non-blocking)
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Counters for one run. Shared by reference across project workers.
#[derive(Default)]
pub struct ScanProgress {
    total: AtomicUsize,
    done: AtomicUsize,
    chunks: AtomicU64,
    bar: Option<ProgressBar>,
}

impl ScanProgress {
    pub fn new(bar: Option<ProgressBar>) -> Self {
        Self {
            bar,
            ..Default::default()
        }
    }

    /// Reset the counters for a run over `total` projects.
    pub fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
        self.chunks.store(0, Ordering::Relaxed);
        if let Some(bar) = &self.bar {
            set_bar_total(bar, total);
        }
    }

    /// Mark one project walk finished (completed or abandoned). Returns the new done count.
    pub fn project_done(&self) -> usize {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(bar) = &self.bar {
            update_progress_bar(bar, 1);
        }
        done
    }

    pub fn chunk_emitted(&self) {
        self.chunks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    pub fn chunks(&self) -> u64 {
        self.chunks.load(Ordering::Relaxed)
    }

    /// 0..=100. An empty run is complete.
    pub fn percent_complete(&self) -> u8 {
        let total = self.total();
        if total == 0 {
            return 100;
        }
        ((self.done().min(total) * 100) / total) as u8
    }

    pub fn message(&self) -> String {
        format!("scanned {}/{} projects", self.done(), self.total())
    }
}

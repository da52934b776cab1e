//! Work-queue accounting and profiling
//!
//! Tracks the queue high-water mark (bounded by node count)
//! and, when enabled, the order in which nodes were processed.

mod tracker;

pub use tracker::QueueTracker;

use crate::tree::NodeId;

/// Detailed pass profile (if enabled)
#[derive(Debug, Clone, Default)]
pub struct PassProfile {
    /// Nodes in the order they were processed
    pub visit_order: Vec<NodeId>,

    /// Maximum work-queue length observed
    pub max_queue_len: usize,

    /// Queue entries dropped as duplicates or not yet ready
    pub skipped: usize,
}

impl PassProfile {
    /// Number of aggregate computations performed
    pub fn visits(&self) -> usize {
        self.visit_order.len()
    }

    /// Node processed last (the root for a well-formed tree)
    pub fn last_visited(&self) -> Option<NodeId> {
        self.visit_order.last().copied()
    }

    /// Generate report
    pub fn report(&self) -> String {
        format!(
            "Visits: {}\nMax queue: {}\nSkipped entries: {}",
            self.visits(),
            self.max_queue_len,
            self.skipped
        )
    }
}

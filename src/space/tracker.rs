//! Queue tracking for the aggregation sweep

use crate::tree::NodeId;

/// Tracks work-queue usage during a pass
#[derive(Debug)]
pub struct QueueTracker {
    /// Maximum queue length seen
    max: usize,

    /// Aggregate computations performed
    visits: usize,

    /// Profile data (if enabled)
    profile: Option<super::PassProfile>,
}

impl QueueTracker {
    /// Create new tracker
    pub fn new(profile_enabled: bool) -> Self {
        Self {
            max: 0,
            visits: 0,
            profile: profile_enabled.then(super::PassProfile::default),
        }
    }

    /// Observe the current queue length
    pub fn observe_queue(&mut self, len: usize) {
        self.max = self.max.max(len);

        if let Some(ref mut p) = self.profile {
            p.max_queue_len = self.max;
        }
    }

    /// Record one processed node
    pub fn record_visit(&mut self, id: NodeId) {
        self.visits += 1;

        if let Some(ref mut p) = self.profile {
            p.visit_order.push(id);
        }
    }

    /// Record a dropped queue entry
    pub fn record_skip(&mut self) {
        if let Some(ref mut p) = self.profile {
            p.skipped += 1;
        }
    }

    /// Get maximum queue length
    pub fn max_queue_len(&self) -> usize {
        self.max
    }

    /// Get number of processed nodes
    pub fn visits(&self) -> usize {
        self.visits
    }

    /// Take profile (leaves `None` behind)
    pub fn take_profile(&mut self) -> Option<super::PassProfile> {
        self.profile.take()
    }
}

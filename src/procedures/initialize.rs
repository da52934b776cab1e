//! Bottom-up sigma / xi initialization
//!
//! Sweep from the leaf queue to the root, children before parents,
//! every node exactly once:
//!   pop front → combine children → notify parent
//! A parent is queued when its last real child completes.
//! The queue drains right after the root is processed.

use tracing::{debug, trace, warn};

use crate::{
    ledger::PendingLedger,
    space::{PassProfile, QueueTracker},
    tree::JobTree,
    PassConfig, ShavingError,
};

/// Compute tau, sigma and xi of every node with the default configuration
///
/// The tree's leaf queue is drained by the call.
pub fn initialize_sigma_and_xi(tree: &mut JobTree) -> Result<(), ShavingError> {
    AggregationPass::new(PassConfig::default()).run(tree)
}

/// Single upward aggregation sweep
#[derive(Debug)]
pub struct AggregationPass {
    config: PassConfig,
    tracker: QueueTracker,
}

impl AggregationPass {
    /// Create a pass
    pub fn new(config: PassConfig) -> Self {
        Self {
            tracker: QueueTracker::new(config.profile),
            config,
        }
    }

    /// Run the sweep, writing aggregates into every node in place
    ///
    /// Fails with `ShavingError::Precondition` before touching any node if
    /// the entry point is missing or unknown, or the leaf queue is empty.
    pub fn run(&mut self, tree: &mut JobTree) -> Result<(), ShavingError> {
        let root = Self::check_precondition(tree)?;
        debug!(
            nodes = tree.len(),
            leaves = tree.leaves().len(),
            %root,
            "initializing sigma and xi"
        );

        let mut ledger = PendingLedger::new(tree);
        self.tracker.observe_queue(tree.leaves().len());

        while let Some(id) = tree.leaves_mut().pop_front() {
            if !tree.contains(id) || ledger.is_processed(id) || !ledger.is_ready(id) {
                trace!(node = %id, "skipping queue entry");
                self.tracker.record_skip();
                continue;
            }

            let aggregates = tree.combine(id)?;
            let node = tree.node_mut(id);
            node.aggregates = Some(aggregates);
            let parent = node.parent();

            ledger.mark_processed(id);
            self.tracker.record_visit(id);
            trace!(node = %id, %aggregates, "processed");

            if let Some(parent) = parent {
                if ledger.child_complete(parent) {
                    tree.leaves_mut().push_back(parent);
                    self.tracker.observe_queue(tree.leaves().len());
                }
            }
        }

        if !ledger.is_processed(root) {
            let (processed, ready, waiting) = ledger.completion_stats();
            warn!(
                processed,
                ready,
                waiting,
                "work queue drained before the root was reached"
            );
        }
        debug!(
            visits = self.tracker.visits(),
            max_queue = self.tracker.max_queue_len(),
            "initialization finished"
        );

        if self.config.verify {
            tree.verify()?;
        }

        Ok(())
    }

    fn check_precondition(tree: &JobTree) -> Result<crate::tree::NodeId, ShavingError> {
        let root = tree.root().ok_or_else(|| {
            ShavingError::Precondition("job tree has no root; build it before initializing".to_string())
        })?;
        if !tree.contains(root) {
            return Err(ShavingError::Precondition(format!(
                "root {root} is not a node of this tree"
            )));
        }
        if tree.leaves().is_empty() {
            return Err(ShavingError::Precondition(
                "leaf queue is empty; set the leaves before initializing".to_string(),
            ));
        }
        Ok(root)
    }

    /// Number of aggregate computations performed so far
    pub fn visits(&self) -> usize {
        self.tracker.visits()
    }

    /// Take the profile recorded when profiling is enabled
    pub fn take_profile(&mut self) -> Option<PassProfile> {
        self.tracker.take_profile()
    }
}

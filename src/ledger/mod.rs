//! Pending-children ledger
//!
//! One counter per node (real children not yet processed, 0-2)
//! plus one processed bit per node.
//! A parent becomes ready exactly when its last child completes,
//! independent of the order in which the work queue is drained.

use crate::tree::{JobTree, NodeId};
use bitvec::prelude::*;

/// Completion bookkeeping for one aggregation sweep
#[derive(Debug)]
pub struct PendingLedger {
    /// Unprocessed real children per node
    pending: Vec<u8>,

    /// Processed flag per node
    processed: BitVec,
}

impl PendingLedger {
    /// Ledger for every node of `tree`, nothing processed yet
    pub fn new(tree: &JobTree) -> Self {
        let pending = tree.ids().map(|id| tree.node(id).child_count()).collect();
        Self {
            pending,
            processed: bitvec![0; tree.len()],
        }
    }

    /// All children of `id` have been processed
    pub fn is_ready(&self, id: NodeId) -> bool {
        self.pending[id.index()] == 0
    }

    /// `id` was already processed in this sweep
    pub fn is_processed(&self, id: NodeId) -> bool {
        self.processed[id.index()]
    }

    /// Record that `id` has been processed
    pub fn mark_processed(&mut self, id: NodeId) {
        self.processed.set(id.index(), true);
    }

    /// Record that one child of `parent` completed
    ///
    /// Returns `true` exactly once: when the last pending child completes.
    pub fn child_complete(&mut self, parent: NodeId) -> bool {
        let count = &mut self.pending[parent.index()];
        match *count {
            0 => false,
            _ => {
                *count -= 1;
                *count == 0
            }
        }
    }

    /// Number of nodes processed so far
    pub fn processed_count(&self) -> usize {
        self.processed.count_ones()
    }

    /// Every node has been processed
    pub fn all_processed(&self) -> bool {
        self.processed.all()
    }

    /// Get completion statistics
    ///
    /// Returns (processed, ready_but_unprocessed, waiting)
    pub fn completion_stats(&self) -> (usize, usize, usize) {
        let mut processed = 0;
        let mut ready = 0;
        let mut waiting = 0;

        for (idx, &count) in self.pending.iter().enumerate() {
            if self.processed[idx] {
                processed += 1;
            } else if count == 0 {
                ready += 1;
            } else {
                waiting += 1;
            }
        }

        (processed, ready, waiting)
    }
}

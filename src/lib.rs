//! # Bottom-up statistics for balanced job trees
//!
//! A single-machine scheduling optimizer keeps its candidate job sequence
//! in a balanced binary tree (in-order = sequence order). Before the
//! optimizer can search, rotate or merge, every node needs three subtree
//! statistics so that queries run in O(1) instead of rescanning subtrees.
//!
//! ## Per-node aggregates
//!
//! With `p` the processing time and `q` the penalty of the node's job:
//!
//! 1. **tau**   = tau(left) + tau(right) + p
//! 2. **sigma** = p + tau(right)
//! 3. **xi**    = max(xi(left) + sigma, q + sigma, xi(right))
//!
//! An empty subtree contributes tau = 0 and xi = -inf.
//!
//! ## Usage Example
//!
//! ```
//! use shaving::{initialize_sigma_and_xi, Job, JobTree};
//!
//! let jobs = vec![
//!     Job::new(0, 2.0, 1.0)?,
//!     Job::new(1, 1.0, 0.0)?,
//!     Job::new(2, 4.0, 6.0)?,
//! ];
//! let mut tree = JobTree::build_and_set_leaves(&jobs)?;
//! initialize_sigma_and_xi(&mut tree)?;
//!
//! let root = tree.root_aggregates().unwrap();
//! assert_eq!((root.tau, root.sigma, root.xi), (7.0, 5.0, 10.0));
//! # Ok::<(), shaving::ShavingError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod tree;       // Arena job tree, construction, paths
pub mod ledger;     // Pending-children bookkeeping
pub mod space;      // Work-queue accounting
pub mod procedures; // Aggregation pass

// Re-exports for convenience
pub use tree::{Aggregates, Job, JobNode, JobTree, NodeId};
pub use procedures::{initialize_sigma_and_xi, AggregationPass};
pub use space::PassProfile;

use thiserror::Error;

/// Configuration of an aggregation pass
#[derive(Debug, Clone, Default)]
pub struct PassConfig {
    /// Record visit order and queue usage
    pub profile: bool,

    /// Check every node's invariants after the sweep
    pub verify: bool,
}

impl PassConfig {
    /// Enable profiling
    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profile = enabled;
        self
    }

    /// Enable post-sweep verification
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }
}

/// Errors raised by tree construction and the aggregation pass
#[derive(Error, Debug)]
pub enum ShavingError {
    /// Tree not ready for aggregation; nothing was mutated
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// No jobs to build a tree from
    #[error("cannot build a job tree from an empty job list")]
    EmptyJobList,

    /// Job parameters out of domain
    #[error("invalid job {index}: {reason}")]
    InvalidJob {
        /// Position of the job in the input list
        index: usize,
        /// What was wrong
        reason: String,
    },

    /// Handle does not belong to the tree
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Child slot already filled, or child already linked
    #[error("cannot attach {child} as {side} child of {parent}")]
    SlotOccupied {
        /// Intended parent
        parent: NodeId,
        /// Intended child
        child: NodeId,
        /// Intended slot
        side: tree::Side,
    },

    /// Link would make `parent` its own descendant
    #[error("cannot attach {child} under {parent}: {child} is an ancestor of {parent}")]
    Cycle {
        /// Intended parent
        parent: NodeId,
        /// Intended child
        child: NodeId,
    },

    /// Aggregates read before they were computed
    #[error("aggregates of node {0} have not been computed")]
    NotInitialized(NodeId),

    /// Stored aggregates disagree with the combination formulas
    #[error("{quantity} of node {node} is {actual}, expected {expected}")]
    InvariantViolated {
        /// Offending node
        node: NodeId,
        /// `tau`, `sigma` or `xi`
        quantity: &'static str,
        /// Value the formulas give
        expected: f64,
        /// Value stored on the node
        actual: f64,
    },
}

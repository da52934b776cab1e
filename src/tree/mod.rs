//! Balanced job tree
//!
//! Arena of `JobNode`s addressed by `NodeId`. Child links own,
//! parent links refer back; both are plain handles.
//!
//! In-order position of a node = position of its job in the sequence.

mod node;
mod traversal;

pub use node::{Aggregates, Job, JobNode, NodeId, Span};
pub use traversal::{Direction, TreePath};

use std::collections::VecDeque;

use crate::ShavingError;

/// Which child slot of a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left child slot
    Left,
    /// Right child slot
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Binary tree of jobs with a leaf work queue
#[derive(Debug, Clone, Default)]
pub struct JobTree {
    nodes: Vec<JobNode>,

    /// Entry point (unchecked until the aggregation pass runs)
    root: Option<NodeId>,

    /// Leaf nodes, consumed as the aggregation work queue
    leaves: VecDeque<NodeId>,
}

impl JobTree {
    /// Create an empty tree (no root, no leaves)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a balanced tree over `jobs` and populate the leaf queue
    ///
    /// Midpoint recursion: the middle job of each range becomes the
    /// subtree root, so in-order order equals list order and
    /// height = ⌈log2(n + 1)⌉.
    pub fn build_and_set_leaves(jobs: &[Job]) -> Result<Self, ShavingError> {
        if jobs.is_empty() {
            return Err(ShavingError::EmptyJobList);
        }

        let mut tree = Self {
            nodes: Vec::with_capacity(jobs.len()),
            root: None,
            leaves: VecDeque::new(),
        };
        let root = tree.build_span(jobs, Span::new(0, jobs.len()), None);
        tree.root = root;
        tree.collect_leaves();

        Ok(tree)
    }

    fn build_span(&mut self, jobs: &[Job], span: Span, parent: Option<NodeId>) -> Option<NodeId> {
        if span.is_empty() {
            return None;
        }

        let id = self.add_job(jobs[span.midpoint()]);
        self.nodes[id.0].parent = parent;

        let (left_span, right_span) = span.split();
        let left = self.build_span(jobs, left_span, Some(id));
        let right = self.build_span(jobs, right_span, Some(id));
        self.nodes[id.0].left = left;
        self.nodes[id.0].right = right;

        Some(id)
    }

    /// Add a detached job node
    pub fn add_job(&mut self, job: Job) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(JobNode::new(job));
        id
    }

    /// Link `child` as the left child of `parent`
    pub fn attach_left(&mut self, parent: NodeId, child: NodeId) -> Result<(), ShavingError> {
        self.attach(parent, child, Side::Left)
    }

    /// Link `child` as the right child of `parent`
    pub fn attach_right(&mut self, parent: NodeId, child: NodeId) -> Result<(), ShavingError> {
        self.attach(parent, child, Side::Right)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, side: Side) -> Result<(), ShavingError> {
        self.check(parent)?;
        self.check(child)?;

        let occupied = match side {
            Side::Left => self.nodes[parent.0].left.is_some(),
            Side::Right => self.nodes[parent.0].right.is_some(),
        };
        if occupied || parent == child || self.nodes[child.0].parent.is_some() {
            return Err(ShavingError::SlotOccupied { parent, child, side });
        }
        if self.is_ancestor(child, parent) {
            return Err(ShavingError::Cycle { parent, child });
        }

        match side {
            Side::Left => self.nodes[parent.0].left = Some(child),
            Side::Right => self.nodes[parent.0].right = Some(child),
        }
        self.nodes[child.0].parent = Some(parent);

        Ok(())
    }

    /// `ancestor` lies on the parent chain of `id`
    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.nodes[id.0].parent;
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes[node.0].parent;
        }
        false
    }

    /// Set the entry point
    ///
    /// Not validated here; the aggregation pass rejects unknown roots.
    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    /// Entry point, if any
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Aggregates of the root, once computed
    pub fn root_aggregates(&self) -> Option<Aggregates> {
        self.root.and_then(|id| self.get(id)).and_then(|node| node.aggregates)
    }

    /// `id` refers to a node of this arena
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    fn check(&self, id: NodeId) -> Result<(), ShavingError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(ShavingError::UnknownNode(id))
        }
    }

    /// Node lookup
    pub fn get(&self, id: NodeId) -> Option<&JobNode> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node(&self, id: NodeId) -> &JobNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut JobNode {
        &mut self.nodes[id.0]
    }

    /// All node ids in arena order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Number of job nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Tree holds no job nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Leaf work queue
    pub fn leaves(&self) -> &VecDeque<NodeId> {
        &self.leaves
    }

    /// Leaf work queue (mutable)
    pub fn leaves_mut(&mut self) -> &mut VecDeque<NodeId> {
        &mut self.leaves
    }

    /// Refill the leaf queue from the tree structure, left to right
    pub fn collect_leaves(&mut self) {
        let leaves: VecDeque<NodeId> = self
            .sequence()
            .into_iter()
            .filter(|&id| self.nodes[id.0].is_leaf())
            .collect();
        self.leaves = leaves;
    }

    /// Number of levels below and including the root (0 for no root)
    pub fn height(&self) -> usize {
        let Some(root) = self.root.filter(|&id| self.contains(id)) else {
            return 0;
        };

        let mut height = 0;
        let mut level = vec![root];
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|&id| [self.nodes[id.0].left, self.nodes[id.0].right])
                .flatten()
                .collect();
        }
        height
    }

    /// `(tau, xi)` of a subtree; `None` is the empty sentinel
    fn subtree(&self, link: Option<NodeId>) -> Result<(f64, f64), ShavingError> {
        match link {
            None => Ok((Aggregates::EMPTY_TAU, Aggregates::EMPTY_XI)),
            Some(child) => {
                let agg = self.nodes[child.0]
                    .aggregates
                    .ok_or(ShavingError::NotInitialized(child))?;
                Ok((agg.tau, agg.xi))
            }
        }
    }

    /// Evaluate the aggregates of `id` from its job and its children
    pub fn combine(&self, id: NodeId) -> Result<Aggregates, ShavingError> {
        self.check(id)?;
        let node = &self.nodes[id.0];
        let left = self.subtree(node.left)?;
        let right = self.subtree(node.right)?;
        Ok(Aggregates::combine(&node.job, left, right))
    }

    /// Recompute `id` and all of its ancestors
    ///
    /// Used after a local structural change below `id`; the children of
    /// every node on the path must already carry aggregates.
    pub fn refresh_upward(&mut self, id: NodeId) -> Result<(), ShavingError> {
        let mut current = Some(id);
        while let Some(node) = current {
            let agg = self.combine(node)?;
            let slot = &mut self.nodes[node.0];
            slot.aggregates = Some(agg);
            current = slot.parent;
        }
        Ok(())
    }

    /// Check the tau / sigma / xi invariants at every node reachable from the root
    ///
    /// Detached nodes are not part of the tree and are not checked.
    pub fn verify(&self) -> Result<(), ShavingError> {
        for id in self.sequence() {
            let actual = self.nodes[id.0]
                .aggregates
                .ok_or(ShavingError::NotInitialized(id))?;
            let expected = self.combine(id)?;

            let checks = [
                ("tau", expected.tau, actual.tau),
                ("sigma", expected.sigma, actual.sigma),
                ("xi", expected.xi, actual.xi),
            ];
            for (quantity, expected, actual) in checks {
                if expected != actual {
                    return Err(ShavingError::InvariantViolated {
                        node: id,
                        quantity,
                        expected,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }
}

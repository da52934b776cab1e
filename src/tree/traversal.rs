//! Root-to-node paths and in-order sequence
//!
//! A path is a stack of directions, one per level below the root.
//! Node handles are recovered by walking the path from the root.

use std::fmt;

use super::{JobTree, NodeId};

/// Which child a path step descends into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Descend into the left child
    Left,

    /// Descend into the right child
    Right,
}

/// Path from the root to a node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreePath {
    steps: Vec<Direction>,
}

impl TreePath {
    /// Path of the root itself
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one level
    pub fn push_level(&mut self, direction: Direction) {
        self.steps.push(direction);
    }

    /// Remove the deepest level
    pub fn pop_level(&mut self) -> Option<Direction> {
        self.steps.pop()
    }

    /// Number of levels below the root
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Steps from the root downwards
    pub fn steps(&self) -> &[Direction] {
        &self.steps
    }

    /// Walk the path from the tree's root
    ///
    /// Returns `None` if the path leaves the tree through an empty subtree.
    pub fn resolve(&self, tree: &JobTree) -> Option<NodeId> {
        let mut node = tree.root().filter(|&id| tree.contains(id))?;

        for step in &self.steps {
            let current = tree.node(node);
            node = match step {
                Direction::Left => current.left()?,
                Direction::Right => current.right()?,
            };
        }

        Some(node)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("root");
        }
        for step in &self.steps {
            f.write_str(match step {
                Direction::Left => "L",
                Direction::Right => "R",
            })?;
        }
        Ok(())
    }
}

impl JobTree {
    /// Path from the root to `id`, rebuilt from parent links
    pub fn path_to(&self, id: NodeId) -> Option<TreePath> {
        if !self.contains(id) {
            return None;
        }

        let mut steps = Vec::new();
        let mut child = id;
        while let Some(parent) = self.node(child).parent() {
            let direction = if self.node(parent).left() == Some(child) {
                Direction::Left
            } else {
                Direction::Right
            };
            steps.push(direction);
            child = parent;
        }

        if Some(child) != self.root() {
            return None;
        }
        steps.reverse();
        Some(TreePath { steps })
    }

    /// Job nodes in in-order order (the job sequence the tree encodes)
    pub fn sequence(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack = Vec::new();
        let mut current = self.root().filter(|&id| self.contains(id));

        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                stack.push(id);
                current = self.node(id).left();
            }
            if let Some(id) = stack.pop() {
                order.push(id);
                current = self.node(id).right();
            }
        }

        order
    }
}

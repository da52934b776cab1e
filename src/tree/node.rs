//! Job node representation
//!
//! Nodes live in the `JobTree` arena and refer to each other by `NodeId`.
//! An absent child (`None`) is the empty sentinel subtree:
//!   tau(empty) = 0
//!   xi(empty)  = -inf

use std::fmt;

use crate::ShavingError;

/// Handle of a node inside a `JobTree` arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A job of the single-machine problem
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize, serde::Deserialize))]
pub struct Job {
    /// Position of the job in the raw job list
    pub index: usize,

    /// Processing time (non-negative)
    pub p: f64,

    /// Penalty / weight, same scale as `p`
    pub q: f64,
}

impl Job {
    /// Create a job, rejecting non-finite values and negative processing times
    pub fn new(index: usize, p: f64, q: f64) -> Result<Self, ShavingError> {
        if !p.is_finite() || p < 0.0 {
            return Err(ShavingError::InvalidJob {
                index,
                reason: format!("processing time must be finite and non-negative, got {p}"),
            });
        }
        if !q.is_finite() {
            return Err(ShavingError::InvalidJob {
                index,
                reason: format!("penalty must be finite, got {q}"),
            });
        }
        Ok(Self { index, p, q })
    }
}

/// Derived subtree statistics of a job node
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize, serde::Deserialize))]
pub struct Aggregates {
    /// Total processing time of the subtree
    pub tau: f64,

    /// Offset of the node together with its right subtree
    pub sigma: f64,

    /// Best potential value attainable within the subtree
    pub xi: f64,
}

impl Aggregates {
    /// `tau` contributed by an empty subtree
    pub const EMPTY_TAU: f64 = 0.0;

    /// `xi` contributed by an empty subtree (identity of `max`)
    pub const EMPTY_XI: f64 = f64::NEG_INFINITY;

    /// Combine a job with the `(tau, xi)` of its two subtrees
    ///
    /// tau   = tau_l + tau_r + p
    /// sigma = p + tau_r
    /// xi    = max(xi_l + sigma, q + sigma, xi_r)
    #[inline]
    pub fn combine(job: &Job, left: (f64, f64), right: (f64, f64)) -> Self {
        let (left_tau, left_xi) = left;
        let (right_tau, right_xi) = right;

        let sigma = job.p + right_tau;
        let xi = (left_xi + sigma).max(job.q + sigma).max(right_xi);

        Self {
            tau: left_tau + right_tau + job.p,
            sigma,
            xi,
        }
    }
}

impl fmt::Display for Aggregates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tau={} sigma={} xi={}", self.tau, self.sigma, self.xi)
    }
}

/// Job placed at a position of the tree
#[derive(Debug, Clone)]
pub struct JobNode {
    /// The job's fixed parameters
    pub job: Job,

    /// Derived values, `None` until computed
    pub aggregates: Option<Aggregates>,

    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl JobNode {
    pub(crate) fn new(job: Job) -> Self {
        Self {
            job,
            aggregates: None,
            left: None,
            right: None,
            parent: None,
        }
    }

    /// Left child (`None` = empty subtree)
    #[inline]
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// Right child (`None` = empty subtree)
    #[inline]
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Parent back-reference, absent only for the root
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Both children are empty subtrees
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Number of real (non-empty) children, 0-2
    #[inline]
    pub fn child_count(&self) -> u8 {
        u8::from(self.left.is_some()) + u8::from(self.right.is_some())
    }
}

/// Half-open range `[start, end)` of the job list
///
/// Balanced construction places the midpoint job at the node and
/// recurses into the two flanking ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// First job index (inclusive)
    pub start: usize,

    /// One past the last job index
    pub end: usize,
}

impl Span {
    /// Create span `[start, end)`
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// No jobs in range
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Number of jobs in range
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// m = ⌊(start + end - 1) / 2⌋
    #[inline]
    pub fn midpoint(&self) -> usize {
        debug_assert!(!self.is_empty(), "Empty span has no midpoint");
        self.start + (self.len() - 1) / 2
    }

    /// Ranges left and right of the midpoint
    ///
    /// Returns: ([start, m), [m+1, end))
    pub fn split(&self) -> (Span, Span) {
        let mid = self.midpoint();
        (Span::new(self.start, mid), Span::new(mid + 1, self.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_split() {
        let span = Span::new(0, 7);
        let (left, right) = span.split();

        assert_eq!(span.midpoint(), 3);
        assert_eq!(left, Span::new(0, 3));
        assert_eq!(right, Span::new(4, 7));
    }

    #[test]
    fn test_split_shrinks_geometrically() {
        let mut span = Span::new(0, 128);
        let mut lengths = vec![span.len()];

        while !span.is_empty() {
            let (_, right) = span.split();
            span = right;
            lengths.push(span.len());
        }

        for window in lengths.windows(2) {
            assert!(window[1] <= window[0] / 2, "{} -> {}", window[0], window[1]);
        }
    }

    #[test]
    fn test_combine_with_empty_children() {
        let job = Job::new(0, 5.0, 3.0).unwrap();
        let empty = (Aggregates::EMPTY_TAU, Aggregates::EMPTY_XI);
        let agg = Aggregates::combine(&job, empty, empty);

        assert_eq!(agg.tau, 5.0);
        assert_eq!(agg.sigma, 5.0);
        assert_eq!(agg.xi, 8.0);
    }

    #[test]
    fn test_job_rejects_bad_values() {
        assert!(Job::new(0, -1.0, 0.0).is_err());
        assert!(Job::new(1, f64::NAN, 0.0).is_err());
        assert!(Job::new(2, 1.0, f64::INFINITY).is_err());
        assert!(Job::new(3, 0.0, -4.0).is_ok());
    }
}

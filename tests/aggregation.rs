//! Aggregation pass: worked cases and precondition handling

use shaving::{initialize_sigma_and_xi, AggregationPass, JobTree, PassConfig, ShavingError};
use test_case::test_case;
use test_helpers::*;

#[test_case(5.0, 3.0 => (5.0, 5.0, 8.0) ; "single leaf p5 q3")]
#[test_case(0.0, 0.0 => (0.0, 0.0, 0.0) ; "zero job")]
#[test_case(2.0, -7.0 => (2.0, 2.0, -5.0) ; "negative penalty")]
fn test_single_leaf(p: f64, q: f64) -> (f64, f64, f64) {
    let mut tree = JobTree::build_and_set_leaves(&[job(0, p, q)]).unwrap();
    initialize_sigma_and_xi(&mut tree).unwrap();

    assert!(tree.leaves().is_empty());
    aggregates(&tree, tree.root().unwrap())
}

#[test]
fn test_two_level_tree() {
    let (mut tree, root, left, right) = two_level_tree();
    initialize_sigma_and_xi(&mut tree).unwrap();

    assert_eq!(aggregates(&tree, left), (2.0, 2.0, 3.0));
    assert_eq!(aggregates(&tree, right), (4.0, 4.0, 10.0));
    assert_eq!(aggregates(&tree, root), (7.0, 5.0, 10.0));
}

#[test]
fn test_balanced_build_matches_manual_tree() {
    let mut built = JobTree::build_and_set_leaves(&jobs_from(&[(2.0, 1.0), (1.0, 0.0), (4.0, 6.0)])).unwrap();
    initialize_sigma_and_xi(&mut built).unwrap();

    let root = built.root_aggregates().unwrap();
    assert_eq!((root.tau, root.sigma, root.xi), (7.0, 5.0, 10.0));
}

#[test]
fn test_xi_ties_keep_value() {
    // Left candidate and own candidate both give 6
    let mut tree = JobTree::new();
    let left = tree.add_job(job(0, 1.0, 2.0));
    let root = tree.add_job(job(1, 3.0, 3.0));
    tree.attach_left(root, left).unwrap();
    tree.set_root(root);
    tree.collect_leaves();

    initialize_sigma_and_xi(&mut tree).unwrap();

    assert_eq!(aggregates(&tree, root), (4.0, 3.0, 6.0));
}

#[test]
fn test_missing_root_fails_without_mutation() {
    let mut tree = JobTree::new();
    let a = tree.add_job(job(0, 1.0, 1.0));
    let b = tree.add_job(job(1, 2.0, 2.0));
    tree.attach_left(a, b).unwrap();
    tree.collect_leaves();

    let err = initialize_sigma_and_xi(&mut tree).unwrap_err();
    assert!(matches!(err, ShavingError::Precondition(_)));
    assert!(snapshot(&tree).iter().all(Option::is_none));
}

#[test]
fn test_foreign_root_fails_without_mutation() {
    let other = JobTree::build_and_set_leaves(&jobs_from(&[(1.0, 1.0); 10])).unwrap();
    let foreign = other.ids().last().unwrap();

    let mut tree = JobTree::build_and_set_leaves(&jobs_from(&[(1.0, 1.0); 3])).unwrap();
    tree.set_root(foreign);
    let leaves_before = tree.leaves().clone();

    let err = initialize_sigma_and_xi(&mut tree).unwrap_err();
    assert!(matches!(err, ShavingError::Precondition(_)));
    assert!(snapshot(&tree).iter().all(Option::is_none));
    assert_eq!(tree.leaves(), &leaves_before);
}

#[test]
fn test_empty_leaf_queue_fails_without_mutation() {
    let mut tree = JobTree::build_and_set_leaves(&jobs_from(&[(3.0, 1.0), (2.0, 5.0)])).unwrap();
    initialize_sigma_and_xi(&mut tree).unwrap();
    let before = snapshot(&tree);

    // Queue was drained by the first run
    let err = initialize_sigma_and_xi(&mut tree).unwrap_err();
    assert!(matches!(err, ShavingError::Precondition(_)));
    assert_eq!(snapshot(&tree), before);
}

#[test]
fn test_rerun_is_idempotent() {
    let params: Vec<(f64, f64)> = (0..31).map(|i| ((i % 7) as f64, (i * 3 % 11) as f64)).collect();
    let mut tree = JobTree::build_and_set_leaves(&jobs_from(&params)).unwrap();

    initialize_sigma_and_xi(&mut tree).unwrap();
    let first = snapshot(&tree);

    tree.collect_leaves();
    initialize_sigma_and_xi(&mut tree).unwrap();
    assert_eq!(snapshot(&tree), first);
}

#[test]
fn test_chain_visits_bottom_up() {
    let params: Vec<(f64, f64)> = (0..6).map(|i| (1.0 + i as f64, 0.0)).collect();
    let mut tree = right_chain(&params);
    assert_eq!(tree.leaves().len(), 1);

    let mut pass = AggregationPass::new(PassConfig::default().with_profiling(true));
    pass.run(&mut tree).unwrap();

    let profile = pass.take_profile().unwrap();
    let expected: Vec<_> = tree.ids().collect::<Vec<_>>().into_iter().rev().collect();
    assert_eq!(profile.visit_order, expected);
    assert_eq!(profile.max_queue_len, 1);
    assert!(tree.leaves().is_empty());
    assert_eq!(tree.root_aggregates().unwrap().tau, 21.0);
}

#[test]
fn test_verification_flag() {
    let mut tree = JobTree::build_and_set_leaves(&jobs_from(&[(1.0, 2.0); 12])).unwrap();
    let mut pass = AggregationPass::new(PassConfig::default().with_verification(true));
    pass.run(&mut tree).unwrap();
    tree.verify().unwrap();
}

#[test]
fn test_refresh_after_structural_change() {
    let (mut tree, root, _, right) = two_level_tree();
    initialize_sigma_and_xi(&mut tree).unwrap();

    let added = tree.add_job(job(3, 3.0, 9.0));
    tree.attach_right(right, added).unwrap();
    tree.refresh_upward(added).unwrap();

    tree.verify().unwrap();
    assert_eq!(aggregates(&tree, added), (3.0, 3.0, 12.0));
    assert_eq!(aggregates(&tree, right), (7.0, 7.0, 13.0));
    assert_eq!(aggregates(&tree, root), (10.0, 8.0, 13.0));
}

#[test]
fn test_verify_detects_stale_aggregates() {
    let (mut tree, _, _, right) = two_level_tree();
    initialize_sigma_and_xi(&mut tree).unwrap();

    let added = tree.add_job(job(3, 3.0, 9.0));
    tree.attach_left(right, added).unwrap();

    // New node has no aggregates yet
    assert!(matches!(tree.verify(), Err(ShavingError::NotInitialized(id)) if id == added));

    tree.refresh_upward(added).unwrap();
    tree.verify().unwrap();
}

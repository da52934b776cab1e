//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use shaving::{initialize_sigma_and_xi, Job, JobTree};

fn balanced_tree(n: usize) -> JobTree {
    let jobs: Vec<Job> = (0..n)
        .map(|i| Job::new(i, (i % 13) as f64, (i % 29) as f64).expect("valid job"))
        .collect();
    JobTree::build_and_set_leaves(&jobs).expect("tree builds")
}

fn benchmark_initialize(c: &mut Criterion) {
    for n in [1_000, 100_000] {
        let tree = balanced_tree(n);
        c.bench_function(&format!("initialize_n={n}"), |b| {
            b.iter_batched(
                || tree.clone(),
                |mut tree| {
                    initialize_sigma_and_xi(&mut tree).expect("pass succeeds");
                    black_box(tree.root_aggregates())
                },
                BatchSize::LargeInput,
            );
        });
    }
}

criterion_group!(benches, benchmark_initialize);
criterion_main!(benches);

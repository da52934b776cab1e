//! Procedures run over a constructed job tree

mod initialize;

pub use initialize::{initialize_sigma_and_xi, AggregationPass};

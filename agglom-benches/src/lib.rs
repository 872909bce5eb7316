//! Benchmark support crate for agglom.
//!
//! Generates seeded planted-partition graphs and groups the parameters used
//! by the Criterion benchmarks for aggregation, the multi-level pipeline and
//! the scoring passes.

pub mod error;
pub mod params;
pub mod planted;

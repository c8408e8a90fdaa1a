pub mod benchmarks;
pub mod engine;

//! @ai:module:intent Session execution against the platform shell
//! @ai:module:layer application
//! @ai:module:public_api BenchmarkExecutor, RunOptions, create_executor

pub mod executor;

pub use executor::{create_executor, BenchmarkExecutor, RunOptions};

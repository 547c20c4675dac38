//! Internal helpers.

pub mod indent;
pub mod pool;

pub use pool::{Pool, Pooled, Reset};

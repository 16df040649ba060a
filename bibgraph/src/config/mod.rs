//! Configuration and dependency wiring for the ingester.

pub mod dependencies;

pub use dependencies::Dependencies;

//! HTTP object repository implementation.

mod client;

pub use client::HttpRepository;

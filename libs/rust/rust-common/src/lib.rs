//! Shared library for cross-cutting concerns in awsu crates.
//!
//! This crate provides centralized implementations for:
//! - Tracing subscriber setup that keeps stdout free for supervised children
//! - Human-readable duration formatting for log lines

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod duration;
pub mod tracing_config;

pub use duration::human_duration;
pub use tracing_config::{TracingConfig, init_tracing};

//! Shared test utilities for awsu crates.
//!
//! This crate provides:
//! - Proptest generators for credentials and environments
//! - A scripted mock credential provider
//! - Test fixtures with sample data

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use fixtures::*;
pub use generators::*;
pub use mocks::{MockCall, MockCredentialProvider, MockOutcome};

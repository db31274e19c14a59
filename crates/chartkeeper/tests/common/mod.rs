//! Shared test utilities for chartkeeper integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated test execution with temp data roots
//! - Helpers for writing legacy UTF-16LE files

pub mod harness;

pub use harness::TestHarness;

//! Shared utilities.

pub mod atomic;

//! The guardian background daemon.
//!
//! Drives fixed-interval cycles of: invoke the external analyzer, persist
//! its output as a bounded snapshot history, log summary health metrics,
//! and run a compliance probe — surviving individual failures and shutting
//! down cleanly on signal.

pub mod analyzer;
pub mod daemon;
pub mod logging;
pub mod metrics;
pub mod probe;
pub mod shutdown;

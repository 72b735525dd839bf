//! Core building blocks for the guardian daemon.
//!
//! This crate holds the leaf pieces the daemon loop is assembled from:
//! - Configuration loading and validation ([`config`])
//! - The tolerant analyzer report contract ([`report`])
//! - The file-backed snapshot store with bounded retention ([`snapshot`])
//! - State-directory journals and the pid file ([`journal`])
//! - The external-command capability seam ([`runner`])

pub mod config;
pub mod journal;
pub mod report;
pub mod runner;
pub mod snapshot;

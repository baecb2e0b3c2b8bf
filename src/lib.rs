//! RIGWATCH: mining rig hashrate and profitability dashboard
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod error;
pub mod sources;
pub mod storage;
pub mod engine;
pub mod dashboard;

//! Metricgate workspace-level test utilities.
//!
//! This crate exists solely to support workspace-level integration tests,
//! particularly the BDD/cucumber tests in `tests/cucumber.rs`.
//!
//! The actual metricgate functionality is in the workspace member crates:
//! - `metricgate-error`: Error taxonomy and codes
//! - `metricgate-types`: Snapshot, rule, and report types plus JSON schemas
//! - `metricgate-validation`: Input validation
//! - `metricgate-domain`: Comparison, rule, and trend logic
//! - `metricgate-app`: Application use cases
//! - `metricgate` (metricgate-cli): CLI interface

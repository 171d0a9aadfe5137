//! Test support utilities
//!
//! Unified logging initialization, problem-details assertions and credential
//! fixtures shared by the gateway and service test suites.

pub mod fixtures;
pub mod logging;
pub mod problem_details;

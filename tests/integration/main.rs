//! Integration test harness entry point.
//!
//! Cargo only compiles `tests/*.rs` as test targets; this root wires the
//! `api_tests` module in the subdirectory into a single `integration`
//! test binary.

mod api_tests;

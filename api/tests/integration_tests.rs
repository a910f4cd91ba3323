//! Integration tests for the Rolldice API.
//!
//! These tests drive the full router, middleware included, with scripted
//! dice and an in-memory log sink.

#[path = "integration_tests/common/mod.rs"]
mod common;

#[path = "integration_tests/diagnostics_tests.rs"]
mod diagnostics_tests;

#[path = "integration_tests/dice_tests.rs"]
mod dice_tests;

#[path = "integration_tests/health_tests.rs"]
mod health_tests;

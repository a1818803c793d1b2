//! Integration tests module
//!
//! End-to-end tests for the docsieve pipeline against a mock server:
//! - Complete index → download → search → report pipeline
//! - Error handling and partial failure scenarios

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;

//! Host-side integration tests for the crossing engine

pub mod fixtures;

mod capture_tests;
mod crossing_tests;

//! Common test utilities for carbonarr.
//!
//! This module provides shared fixtures and assertions for the map
//! composition tests.

pub mod assertions;
pub mod test_data;

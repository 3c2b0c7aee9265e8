//! Common test utilities for skope-session.
//!
//! This module provides shared fixtures and assertions for the integration tests.

pub mod assertions;
pub mod fixtures;

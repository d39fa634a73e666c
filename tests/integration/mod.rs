//! Integration test suite for rpz-params
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **provider**: the library API against a [`MockFetcher`](rpz_params::test_utils::MockFetcher)
//! - **remote**: the real HTTP fetcher against a local server
//! - **cli**: the `rpz-params` binary

mod common;

mod cli;
mod provider;
mod remote;

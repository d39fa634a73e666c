//! Core types shared across rpz-params.
//!
//! - [`ParamsError`] - errors that are surfaced to callers
//! - [`ErrorContext`] - user-friendly wrapper with details and suggestions
//! - [`user_friendly_error`] - convert any error for CLI display

pub mod error;

pub use error::{ErrorContext, ParamsError, user_friendly_error};

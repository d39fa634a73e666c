//! Error handling for rpz-params
//!
//! The error system is split along the line the resolver draws between
//! recoverable and visible failures:
//!
//! - Transport failures, malformed downloads and incompatible document
//!   versions never reach the caller. They are recorded as a
//!   [`FallbackReason`](crate::source::FallbackReason) and the bundled
//!   parameters are used instead.
//! - [`ParamsError`] covers everything that *is* surfaced: broken patterns in
//!   a dataset, requests for sections that do not exist, configuration
//!   problems and cache maintenance failures.
//!
//! [`ErrorContext`] and [`user_friendly_error`] turn any error into a colored,
//! actionable message for the command-line front end.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rpz_params::core::{ParamsError, user_friendly_error};
//!
//! let error = ParamsError::SectionNotFound {
//!     section: "docker_image".to_string(),
//!     suggestions: vec!["docker_images".to_string()],
//! };
//! user_friendly_error(error.into()).display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for rpz-params operations.
///
/// # Error Categories
///
/// ## Dataset integrity
/// - [`InvalidPattern`] - a catalog pattern is not a valid regular expression
/// - [`InvalidSection`] - a section does not have the expected shape
///
/// ## Caller misuse
/// - [`SectionNotFound`] - the requested section is absent from the dataset
/// - [`UnknownArchitecture`] - a section has no value for the architecture
/// - [`UnknownBoxArchitecture`] - a box record has no box for the architecture
///
/// ## Environment
/// - [`ConfigError`] - the configuration file or an override is unusable
/// - [`TrustAnchorError`] - the pinned certificate authority cannot be loaded
/// - [`NetworkError`] - an explicit network operation failed
/// - [`IoError`] - standard I/O errors from [`std::io::Error`]
///
/// [`InvalidPattern`]: ParamsError::InvalidPattern
/// [`InvalidSection`]: ParamsError::InvalidSection
/// [`SectionNotFound`]: ParamsError::SectionNotFound
/// [`UnknownArchitecture`]: ParamsError::UnknownArchitecture
/// [`UnknownBoxArchitecture`]: ParamsError::UnknownBoxArchitecture
/// [`ConfigError`]: ParamsError::ConfigError
/// [`TrustAnchorError`]: ParamsError::TrustAnchorError
/// [`NetworkError`]: ParamsError::NetworkError
/// [`IoError`]: ParamsError::IoError
#[derive(Error, Debug)]
pub enum ParamsError {
    /// A catalog entry carries a pattern that does not compile.
    ///
    /// Bundled and remote datasets are expected to be well-formed, so this is
    /// reported instead of skipping the entry.
    #[error("Invalid pattern '{pattern}' in section '{section}'")]
    InvalidPattern {
        /// Section containing the pattern
        section: String,
        /// The pattern text as found in the dataset
        pattern: String,
        /// Compilation error from the regex engine
        #[source]
        source: regex::Error,
    },

    /// A section exists but does not have the shape the caller asked for.
    #[error("Section '{section}' is malformed: {reason}")]
    InvalidSection {
        /// Name of the malformed section
        section: String,
        /// What was wrong with it
        reason: String,
    },

    /// The requested section is not present in the loaded dataset.
    #[error("Section '{section}' not found in parameters")]
    SectionNotFound {
        /// Name of the requested section
        section: String,
        /// Existing section names close to the requested one
        suggestions: Vec<String>,
    },

    /// A per-architecture mapping has no value for the requested architecture.
    #[error("No entry for architecture '{arch}' in '{section}'")]
    UnknownArchitecture {
        /// Section that was searched
        section: String,
        /// The requested architecture id
        arch: String,
        /// Architectures that are available
        available: Vec<String>,
    },

    /// A resolved virtual-machine box has no box for the requested architecture.
    #[error("No box for architecture '{arch}' in '{record}'")]
    UnknownBoxArchitecture {
        /// Display name of the resolved record
        record: String,
        /// The requested architecture id
        arch: String,
        /// Architectures that are available
        available: Vec<String>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// The pinned certificate authority could not be loaded.
    #[error("Cannot load certificate authority from {path}: {reason}")]
    TrustAnchorError {
        /// Where the certificate was read from
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// Network error
    #[error("Network error: {operation}")]
    NetworkError {
        /// The network operation that failed
        operation: String,
        /// Reason for the network failure
        reason: String,
    },

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// An error paired with details and a suggestion for the user.
#[derive(Debug)]
pub struct ErrorContext {
    /// The rendered error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no details or suggestion.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with details and suggestions.
///
/// Known [`ParamsError`] variants anywhere in the error chain get tailored
/// advice; anything else is rendered with its full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let Some(params_error) = error.chain().find_map(|cause| cause.downcast_ref::<ParamsError>())
    else {
        return ErrorContext::new(format!("{error:#}"));
    };

    let context = create_error_context(params_error);
    if context.details.is_none() && error.chain().count() > 1 {
        context.with_details(format!("{error:#}"))
    } else {
        context
    }
}

fn create_error_context(error: &ParamsError) -> ErrorContext {
    let context = ErrorContext::new(error.to_string());

    match error {
        ParamsError::InvalidPattern { source, .. } => context
            .with_details(source.to_string())
            .with_suggestion(
                "The parameter dataset is broken. Run 'rpz-params cache clear' or set \
                 REPROZIP_PARAMETERS=off to use the bundled parameters",
            ),
        ParamsError::InvalidSection { .. } => context.with_suggestion(
            "Check that the section is the kind you asked for ('rpz-params show <section>')",
        ),
        ParamsError::SectionNotFound { suggestions, .. } => {
            let context = context.with_details("Run 'rpz-params sections' to list known sections");
            if suggestions.is_empty() {
                context
            } else {
                context.with_suggestion(format!("Did you mean: {}?", suggestions.join(", ")))
            }
        }
        ParamsError::UnknownArchitecture { available, .. }
        | ParamsError::UnknownBoxArchitecture { available, .. } => {
            context.with_suggestion(format!("Available architectures: {}", available.join(", ")))
        }
        ParamsError::ConfigError { .. } => context.with_suggestion(
            "Check ~/.rpz-params/config.toml or the file named by RPZ_PARAMS_CONFIG",
        ),
        ParamsError::TrustAnchorError { .. } => context
            .with_suggestion("Point 'ca_certificate' in the configuration to a PEM encoded CA"),
        ParamsError::NetworkError { reason, .. } => context
            .with_details(reason.clone())
            .with_suggestion("Check your internet connection and try again"),
        ParamsError::IoError(_) => {
            context.with_suggestion("Check permissions on the cache directory")
        }
    }
}

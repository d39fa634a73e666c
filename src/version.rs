//! Loose version ordering for parameter documents.
//!
//! Parameter documents carry versions such as `"1.1"`, `"1.1.0"` or `"1.1.9"`,
//! which are not all valid semantic versions. This module implements the
//! permissive ordering used by the version gate:
//!
//! - the string is split into runs of digits, runs of lowercase letters and
//!   any other non-separator text; `.` separators are dropped
//! - digit runs compare numerically
//! - any textual component sorts after any numeric component
//! - components compare left to right; a shorter prefix sorts first, so
//!   `1.1 < 1.1.0 < 1.1.9 < 1.2`
//!
//! # Examples
//!
//! ```rust
//! use rpz_params::version::LooseVersion;
//!
//! let low = LooseVersion::parse("1.1");
//! let high = LooseVersion::parse("1.2");
//! assert!(low <= LooseVersion::parse("1.1.9"));
//! assert!(LooseVersion::parse("1.1.9") < high);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{MAX_COMPATIBLE_VERSION, MIN_COMPATIBLE_VERSION};

static COMPONENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+|[a-z]+|\.").expect("version tokenizer pattern is valid")
});

/// A single component of a [`LooseVersion`].
///
/// Variant order matters: numeric components sort before textual ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum VersionComponent {
    /// A run of decimal digits.
    Number(u64),
    /// Anything else that is not a `.` separator.
    Text(String),
}

/// A permissively parsed, totally ordered version string.
#[derive(Debug, Clone)]
pub struct LooseVersion {
    original: String,
    components: Vec<VersionComponent>,
}

impl LooseVersion {
    /// Parse a version string. Parsing never fails; unrecognized text becomes
    /// textual components.
    pub fn parse(version: &str) -> Self {
        let mut components = Vec::new();
        let mut last_end = 0;

        for m in COMPONENT_RE.find_iter(version) {
            push_text(&mut components, &version[last_end..m.start()]);
            last_end = m.end();

            let token = m.as_str();
            if token == "." {
                continue;
            }
            match token.parse::<u64>() {
                Ok(n) => components.push(VersionComponent::Number(n)),
                // Digit runs too long for u64 still order after shorter numbers
                Err(_) if token.bytes().all(|b| b.is_ascii_digit()) => {
                    components.push(VersionComponent::Number(u64::MAX));
                }
                Err(_) => components.push(VersionComponent::Text(token.to_string())),
            }
        }
        push_text(&mut components, &version[last_end..]);

        Self {
            original: version.to_string(),
            components,
        }
    }

    /// The components this version was split into.
    pub fn components(&self) -> &[VersionComponent] {
        &self.components
    }

    /// The original version string.
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

fn push_text(components: &mut Vec<VersionComponent>, text: &str) {
    if !text.is_empty() {
        components.push(VersionComponent::Text(text.to_string()));
    }
}

impl PartialEq for LooseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for LooseVersion {}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LooseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Half-open range `[min, max)` of accepted document versions.
#[derive(Debug, Clone)]
pub struct CompatibilityWindow {
    min: LooseVersion,
    max: LooseVersion,
}

impl CompatibilityWindow {
    /// Create a window accepting `min <= v < max`.
    pub fn new(min: &str, max: &str) -> Self {
        Self {
            min: LooseVersion::parse(min),
            max: LooseVersion::parse(max),
        }
    }

    /// Whether `version` falls inside the window.
    pub fn contains(&self, version: &LooseVersion) -> bool {
        &self.min <= version && version < &self.max
    }
}

impl Default for CompatibilityWindow {
    /// The window this release understands: `[1.1, 1.2)`.
    fn default() -> Self {
        Self::new(MIN_COMPATIBLE_VERSION, MAX_COMPATIBLE_VERSION)
    }
}

impl fmt::Display for CompatibilityWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> LooseVersion {
        LooseVersion::parse(s)
    }

    #[test]
    fn test_components() {
        assert_eq!(
            v("1.10.2").components(),
            &[
                VersionComponent::Number(1),
                VersionComponent::Number(10),
                VersionComponent::Number(2)
            ]
        );
        assert_eq!(
            v("1.1b3").components(),
            &[
                VersionComponent::Number(1),
                VersionComponent::Number(1),
                VersionComponent::Text("b".to_string()),
                VersionComponent::Number(3)
            ]
        );
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(v("1.2") < v("1.10"));
        assert!(v("1.1") < v("1.1.0"));
        assert!(v("1.1.0") < v("1.1.9"));
        assert!(v("1.1.9") < v("1.2"));
        assert_eq!(v("1.1.0"), v("1.1.0"));
    }

    #[test]
    fn test_text_sorts_after_numbers() {
        assert!(v("1.1.9") < v("1.1.rc1"));
        assert!(v("1.1rc1") < v("1.2"));
        assert!(v("2") < v("dev"));
    }

    #[test]
    fn test_default_window() {
        let window = CompatibilityWindow::default();

        assert!(window.contains(&v("1.1")));
        assert!(window.contains(&v("1.1.0")));
        assert!(window.contains(&v("1.1.9")));

        assert!(!window.contains(&v("1.0")));
        assert!(!window.contains(&v("1.2")));
        assert!(!window.contains(&v("2.0")));
        assert!(!window.contains(&v("0.9")));

        assert_eq!(window.to_string(), "[1.1, 1.2)");
    }
}

//! Distribution catalogs: ordered pattern matching from an OS name and
//! version to a container image or virtual-machine box.
//!
//! A catalog section looks like this (boxes use the key `boxes` instead of
//! `images`):
//!
//! ```json
//! {
//!   "default": { "distribution": "debian", "image": "debian:jessie", "name": "Debian 8 'Jessie'" },
//!   "images": [
//!     {
//!       "name": "^ubuntu$",
//!       "versions": [
//!         { "version": "^14\\.04$", "distribution": "ubuntu", "image": "ubuntu:14.04", "name": "Ubuntu 14.04 'Trusty'" }
//!       ],
//!       "default": { "distribution": "ubuntu", "image": "ubuntu:15.10", "name": "Ubuntu 15.10 'Wily'" }
//!     }
//!   ]
//! }
//! ```
//!
//! # Matching rules
//!
//! 1. Entries are scanned in order; the first whose `name` pattern matches the
//!    distribution name (case-insensitively) is selected. No match: the
//!    catalog `default`.
//! 2. Within that entry, version rules are scanned in order; the first whose
//!    `version` pattern matches the raw version string wins. No match: the
//!    entry's own `default`.
//!
//! Patterns are searched, not anchored: a pattern without `^`/`$` matches
//! anywhere in the subject. The shipped patterns rely on this.
//!
//! All patterns are compiled when the catalog is built, so a broken dataset
//! is reported up front by [`ImageCatalog::from_section`].

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::core::ParamsError;

/// A container image to run a distribution in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerImage {
    /// Distribution family, e.g. `"ubuntu"`
    pub distribution: String,
    /// Image reference, e.g. `"ubuntu:14.04"`
    pub image: String,
    /// Human-readable name, e.g. `"Ubuntu 14.04 'Trusty'"`
    #[serde(rename = "name")]
    pub display_name: String,
}

/// A virtual-machine box, available for one or more architectures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VagrantBox {
    /// Distribution family, e.g. `"debian"`
    pub distribution: String,
    /// Box identifier per architecture id
    pub architectures: BTreeMap<String, String>,
    /// Human-readable name
    #[serde(rename = "name")]
    pub display_name: String,
}

impl VagrantBox {
    /// The box for `arch`.
    pub fn box_for(&self, arch: &str) -> Result<&str, ParamsError> {
        self.architectures.get(arch).map(String::as_str).ok_or_else(|| {
            ParamsError::UnknownBoxArchitecture {
                record: self.display_name.clone(),
                arch: arch.to_string(),
                available: self.architectures.keys().cloned().collect(),
            }
        })
    }
}

/// Either kind of catalog record, decided by the fields present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolvedRecord {
    /// A record with an `image` field
    Image(ContainerImage),
    /// A record with an `architectures` field
    Box(VagrantBox),
}

impl ResolvedRecord {
    /// The container image, if this is one.
    pub fn as_image(&self) -> Option<&ContainerImage> {
        match self {
            Self::Image(image) => Some(image),
            Self::Box(_) => None,
        }
    }

    /// The virtual-machine box, if this is one.
    pub fn as_box(&self) -> Option<&VagrantBox> {
        match self {
            Self::Box(vm) => Some(vm),
            Self::Image(_) => None,
        }
    }
}

/// Fields every catalog record has.
pub trait Record {
    /// Distribution family.
    fn distribution(&self) -> &str;
    /// Human-readable name.
    fn display_name(&self) -> &str;
}

impl Record for ContainerImage {
    fn distribution(&self) -> &str {
        &self.distribution
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl Record for VagrantBox {
    fn distribution(&self) -> &str {
        &self.distribution
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl Record for ResolvedRecord {
    fn distribution(&self) -> &str {
        match self {
            Self::Image(image) => image.distribution(),
            Self::Box(vm) => vm.distribution(),
        }
    }

    fn display_name(&self) -> &str {
        match self {
            Self::Image(image) => image.display_name(),
            Self::Box(vm) => vm.display_name(),
        }
    }
}

#[derive(Deserialize)]
struct RawCatalog<R> {
    default: R,
    #[serde(rename = "images", alias = "boxes")]
    entries: Vec<RawEntry<R>>,
}

#[derive(Deserialize)]
struct RawEntry<R> {
    name: String,
    #[serde(default = "Vec::new")]
    versions: Vec<RawRule<R>>,
    default: R,
}

#[derive(Deserialize)]
struct RawRule<R> {
    version: String,
    #[serde(flatten)]
    record: R,
}

/// One version rule of a [`CatalogEntry`].
#[derive(Debug, Clone)]
pub struct VersionRule<R> {
    pattern: Regex,
    record: R,
}

impl<R> VersionRule<R> {
    /// The version pattern source.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The record this rule selects.
    pub fn record(&self) -> &R {
        &self.record
    }
}

/// A distribution entry: name pattern, ordered version rules, fallback record.
#[derive(Debug, Clone)]
pub struct CatalogEntry<R> {
    name: Regex,
    rules: Vec<VersionRule<R>>,
    default: R,
}

impl<R> CatalogEntry<R> {
    /// The name pattern source.
    pub fn name_pattern(&self) -> &str {
        self.name.as_str()
    }

    /// Version rules in match order.
    pub fn rules(&self) -> &[VersionRule<R>] {
        &self.rules
    }

    /// Record used when no version rule matches.
    pub fn default_record(&self) -> &R {
        &self.default
    }

    fn resolve(&self, version: &str) -> &R {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(version))
            .map_or(&self.default, |rule| &rule.record)
    }
}

/// A compiled distribution catalog.
#[derive(Debug, Clone)]
pub struct ImageCatalog<R> {
    section: String,
    default: R,
    entries: Vec<CatalogEntry<R>>,
}

impl<R: DeserializeOwned> ImageCatalog<R> {
    /// Build a catalog from the payload of section `section`.
    ///
    /// # Errors
    ///
    /// - [`ParamsError::InvalidSection`] if the payload is not catalog-shaped
    /// - [`ParamsError::InvalidPattern`] for the first pattern that fails to compile
    pub fn from_section(section: &str, value: &Value) -> Result<Self, ParamsError> {
        let raw = RawCatalog::<R>::deserialize(value).map_err(|e| ParamsError::InvalidSection {
            section: section.to_string(),
            reason: e.to_string(),
        })?;

        let mut entries = Vec::with_capacity(raw.entries.len());
        for entry in raw.entries {
            let name = compile(section, &entry.name, true)?;
            let mut rules = Vec::with_capacity(entry.versions.len());
            for rule in entry.versions {
                rules.push(VersionRule {
                    pattern: compile(section, &rule.version, false)?,
                    record: rule.record,
                });
            }
            entries.push(CatalogEntry {
                name,
                rules,
                default: entry.default,
            });
        }

        Ok(Self {
            section: section.to_string(),
            default: raw.default,
            entries,
        })
    }
}

impl<R> ImageCatalog<R> {
    /// Resolve a distribution name and version to a record.
    ///
    /// Never fails: every catalog has a top-level default.
    pub fn resolve(&self, distribution: &str, version: &str) -> &R {
        let distribution = distribution.to_lowercase();

        match self.entries.iter().find(|entry| entry.name.is_match(&distribution)) {
            Some(entry) => {
                trace!(
                    "{}: '{}' matched entry '{}'",
                    self.section,
                    distribution,
                    entry.name.as_str()
                );
                entry.resolve(version)
            }
            None => {
                trace!("{}: no entry for '{}', using default", self.section, distribution);
                &self.default
            }
        }
    }

    /// The section this catalog was built from.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Record used when no entry matches.
    pub fn default_record(&self) -> &R {
        &self.default
    }

    /// Entries in match order.
    pub fn entries(&self) -> &[CatalogEntry<R>] {
        &self.entries
    }
}

fn compile(section: &str, pattern: &str, case_insensitive: bool) -> Result<Regex, ParamsError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| ParamsError::InvalidPattern {
            section: section.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

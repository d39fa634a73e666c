//! The parameter dataset and the bundled default copy.
//!
//! A [`Dataset`] is the root JSON object of a parameter document: a `version`
//! string plus an open-ended set of named sections. Known sections are
//!
//! | Section           | Shape                                   |
//! |-------------------|-----------------------------------------|
//! | `busybox_url`     | architecture -> download URL            |
//! | `rpzsudo_url`     | architecture -> download URL            |
//! | `docker_images`   | [`ImageCatalog`](crate::catalog::ImageCatalog) of container images |
//! | `vagrant_boxes`   | catalog of virtual-machine boxes        |
//! | `vagrant_boxes_x` | catalog of boxes with a graphical session |
//!
//! A copy of the parameters is compiled into the binary (see [`BUNDLED_PARAMETERS`])
//! so the resolver always has a usable dataset, even offline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{DEFAULT_DOCUMENT_VERSION, MAX_SUGGESTION_DISTANCE};
use crate::core::ParamsError;
use crate::version::LooseVersion;

/// The parameter document shipped with this release.
///
/// Its version must stay inside [`CompatibilityWindow::default`](crate::version::CompatibilityWindow).
pub const BUNDLED_PARAMETERS: &str = include_str!("bundled.json");

fn default_version() -> String {
    DEFAULT_DOCUMENT_VERSION.to_string()
}

/// A loaded parameter document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Document version, `"1.0"` when the document does not say.
    #[serde(default = "default_version")]
    version: String,

    /// Every other top-level key, by name.
    #[serde(flatten)]
    sections: Map<String, Value>,
}

impl Dataset {
    /// Parse a parameter document.
    ///
    /// The document must be a JSON object; a non-string `version` is rejected.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// The dataset compiled into this binary.
    ///
    /// # Panics
    ///
    /// Panics if [`BUNDLED_PARAMETERS`] is not a valid document, which is a
    /// build defect rather than a runtime condition.
    pub fn bundled() -> Self {
        Self::from_json(BUNDLED_PARAMETERS).expect("bundled parameters are a valid document")
    }

    /// The raw `version` string.
    pub fn version_str(&self) -> &str {
        &self.version
    }

    /// The document version, parsed for ordering.
    pub fn version(&self) -> LooseVersion {
        LooseVersion::parse(&self.version)
    }

    /// Payload of `name`, or `None` if the section is absent.
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.sections.get(name)
    }

    /// Payload of `name`, or [`ParamsError::SectionNotFound`] with suggestions.
    pub fn require_section(&self, name: &str) -> Result<&Value, ParamsError> {
        self.section(name).ok_or_else(|| ParamsError::SectionNotFound {
            section: name.to_string(),
            suggestions: self.similar_sections(name),
        })
    }

    /// Names of all sections, sorted.
    pub fn section_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// A per-architecture download URL section such as `busybox_url`.
    pub fn binary_urls(&self, name: &str) -> Result<BinaryUrls, ParamsError> {
        let value = self.require_section(name)?;
        let urls = BTreeMap::<String, String>::deserialize(value).map_err(|e| {
            ParamsError::InvalidSection {
                section: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(BinaryUrls {
            section: name.to_string(),
            urls,
        })
    }

    fn similar_sections(&self, name: &str) -> Vec<String> {
        let mut scored: Vec<(usize, &String)> = self
            .sections
            .keys()
            .map(|key| (strsim::levenshtein(name, key), key))
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .collect();
        scored.sort();
        scored.into_iter().take(3).map(|(_, key)| key.clone()).collect()
    }
}

/// Download URLs of an auxiliary binary, keyed by architecture id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryUrls {
    section: String,
    urls: BTreeMap<String, String>,
}

impl BinaryUrls {
    /// URL for `arch` (e.g. `"x86_64"`, `"i686"`).
    pub fn url_for(&self, arch: &str) -> Result<&str, ParamsError> {
        self.urls.get(arch).map(String::as_str).ok_or_else(|| {
            ParamsError::UnknownArchitecture {
                section: self.section.clone(),
                arch: arch.to_string(),
                available: self.urls.keys().cloned().collect(),
            }
        })
    }

    /// Architectures with a known URL.
    pub fn architectures(&self) -> impl Iterator<Item = &str> {
        self.urls.keys().map(String::as_str)
    }
}

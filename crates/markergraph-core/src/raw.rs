//! Raw input records, as delivered by external collaborators.
//!
//! Names are kept exactly as supplied; normalization happens in the builder.

use crate::diagnostic::Diagnostic;
use crate::id::MarkerId;
use crate::variant::VariantTable;
use serde::{Deserialize, Serialize};

/// One way to produce `output` from `materials`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecipe {
    pub output: String,
    pub materials: Vec<String>,
}

impl RawRecipe {
    pub fn new<I, S>(output: impl Into<String>, materials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output: output.into(),
            materials: materials.into_iter().map(Into::into).collect(),
        }
    }
}

/// A marker item. The first identifier is the marker's primary id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMarker {
    pub name: String,
    #[serde(default)]
    pub identifiers: Vec<u32>,
    /// Provenance tags (collection log tabs).
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RawMarker {
    pub fn new(name: impl Into<String>, identifiers: impl IntoIterator<Item = u32>) -> Self {
        Self {
            name: name.into(),
            identifiers: identifiers.into_iter().collect(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A known item and every numeric identifier recorded for its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub name: String,
    #[serde(default)]
    pub identifiers: Vec<u32>,
}

impl RawItem {
    pub fn new(name: impl Into<String>, identifiers: impl IntoIterator<Item = u32>) -> Self {
        Self {
            name: name.into(),
            identifiers: identifiers.into_iter().collect(),
        }
    }
}

/// A hand-written derived item entry. Replaces whatever the resolver computed
/// for the same name, for items whose dependencies cannot be detected from
/// recipes (e.g. items that share a display name with a marker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualDerived {
    pub name: String,
    pub item_ids: Vec<u32>,
    pub markers: Vec<MarkerId>,
}

/// Everything the pipeline consumes for one run.
#[derive(Debug, Clone, Default)]
pub struct CatalogSources {
    pub markers: Vec<RawMarker>,
    pub recipes: Vec<RawRecipe>,
    pub items: Vec<RawItem>,
    pub overrides: Vec<ManualDerived>,
    pub variants: VariantTable,
    /// Diagnostics recorded while the raw records were gathered.
    pub diagnostics: Vec<Diagnostic>,
}

//! Non-fatal findings recorded while building, linking, and resolving.
//!
//! Nothing in the resolution core aborts on bad data. Each data-quality or
//! structural problem is recorded as a [`Diagnostic`] together with the
//! fallback that was applied, and logged through the `log` facade at the time
//! it is recorded.

use crate::id::MarkerId;
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Diagnostic kinds
// ---------------------------------------------------------------------------

/// How loudly a diagnostic is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Expected in real catalogs, such as cycles or repeated variant links.
    Info,
    /// Input data was dropped or degraded.
    Warning,
}

/// Why a raw recipe record was not added to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The record names no materials at all.
    EmptyMaterials,
    /// Every material is the output itself.
    SelfReference,
    /// The record has no usable output name.
    MissingOutput,
}

/// A single non-fatal finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A raw record could not be interpreted and was skipped.
    MalformedRecord { origin: String, detail: String },

    /// A recipe record was dropped.
    RecipeDropped { output: String, reason: DropReason },

    /// A recipe repeated an earlier recipe of the same output and was dropped.
    DuplicateRecipe { output: String },

    /// A marker record had no identifier; it is treated as a plain item.
    MarkerWithoutId { name: String },

    /// A second marker record shares a name with an earlier one; both ids
    /// address the same entity.
    DuplicateMarkerName { name: String, id: MarkerId },

    /// A material is neither a declared item, a marker, nor a recipe output.
    /// Only reported when an item index was supplied.
    UnresolvedMaterial { material: String, used_by: String },

    /// Every recipe of `dependent` already required `base`.
    VariantAlreadyApplied { dependent: String, base: String },

    /// The variant that would receive the requirement is itself a marker.
    VariantDependentIsMarker { dependent: String, base: String },

    /// A recipe of `entity` was excluded because `via` loops back onto the
    /// current resolution path.
    CycleExcluded { entity: String, via: String },

    /// A caller asked for an entity the catalog has never seen.
    UnknownEntity { name: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::MalformedRecord { .. }
            | Diagnostic::RecipeDropped { .. }
            | Diagnostic::MarkerWithoutId { .. }
            | Diagnostic::UnresolvedMaterial { .. } => Severity::Warning,
            Diagnostic::DuplicateRecipe { .. }
            | Diagnostic::DuplicateMarkerName { .. }
            | Diagnostic::VariantAlreadyApplied { .. }
            | Diagnostic::VariantDependentIsMarker { .. }
            | Diagnostic::CycleExcluded { .. }
            | Diagnostic::UnknownEntity { .. } => Severity::Info,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedRecord { origin, detail } => {
                write!(f, "malformed record in {origin}: {detail}")
            }
            Diagnostic::RecipeDropped { output, reason } => {
                let why = match reason {
                    DropReason::EmptyMaterials => "no materials",
                    DropReason::SelfReference => "only requires itself",
                    DropReason::MissingOutput => "no output name",
                };
                write!(f, "dropped recipe for '{output}': {why}")
            }
            Diagnostic::DuplicateRecipe { output } => {
                write!(f, "dropped duplicate recipe for '{output}'")
            }
            Diagnostic::MarkerWithoutId { name } => {
                write!(f, "marker '{name}' has no identifier; treated as a plain item")
            }
            Diagnostic::DuplicateMarkerName { name, id } => {
                write!(f, "marker {id} shares the name '{name}' with an earlier marker")
            }
            Diagnostic::UnresolvedMaterial { material, used_by } => {
                write!(f, "material '{material}' (used by '{used_by}') is not a known item")
            }
            Diagnostic::VariantAlreadyApplied { dependent, base } => {
                write!(f, "'{dependent}' already requires '{base}'")
            }
            Diagnostic::VariantDependentIsMarker { dependent, base } => {
                write!(f, "skipped variant link '{dependent}' -> '{base}': '{dependent}' is a marker")
            }
            Diagnostic::CycleExcluded { entity, via } => {
                write!(f, "excluded a recipe of '{entity}': '{via}' is already being resolved")
            }
            Diagnostic::UnknownEntity { name } => {
                write!(f, "unknown entity '{name}' resolves as unrestricted")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Ordered list of diagnostics. Each entry is logged as it is recorded:
/// warnings at `warn`, everything else at `debug`.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Warning => log::warn!("{diagnostic}"),
            Severity::Info => log::debug!("{diagnostic}"),
        }
        self.entries.push(diagnostic);
    }

    /// Append diagnostics that were already logged by another stage.
    pub fn absorb(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.entries.extend(other);
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity() == severity)
            .count()
    }

    /// Take all recorded diagnostics, leaving the collector empty.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_order() {
        let mut diags = Diagnostics::new();
        diags.record(Diagnostic::UnknownEntity {
            name: "a".to_string(),
        });
        diags.record(Diagnostic::DuplicateRecipe {
            output: "b".to_string(),
        });
        assert_eq!(diags.len(), 2);
        assert!(matches!(
            diags.as_slice()[0],
            Diagnostic::UnknownEntity { .. }
        ));
    }

    #[test]
    fn counts_by_severity() {
        let mut diags = Diagnostics::new();
        diags.record(Diagnostic::RecipeDropped {
            output: "gold bar".to_string(),
            reason: DropReason::EmptyMaterials,
        });
        diags.record(Diagnostic::CycleExcluded {
            entity: "a".to_string(),
            via: "b".to_string(),
        });
        diags.record(Diagnostic::CycleExcluded {
            entity: "b".to_string(),
            via: "a".to_string(),
        });
        assert_eq!(diags.count(Severity::Warning), 1);
        assert_eq!(diags.count(Severity::Info), 2);
    }

    #[test]
    fn drain_empties_collector() {
        let mut diags = Diagnostics::new();
        diags.record(Diagnostic::MarkerWithoutId {
            name: "pet rock".to_string(),
        });
        let drained = diags.drain();
        assert_eq!(drained.len(), 1);
        assert!(diags.is_empty());
    }

    #[test]
    fn display_messages() {
        let d = Diagnostic::RecipeDropped {
            output: "gold bar".to_string(),
            reason: DropReason::SelfReference,
        };
        assert!(d.to_string().contains("gold bar"));
        assert!(d.to_string().contains("itself"));

        let d = Diagnostic::DuplicateMarkerName {
            name: "chompy bird hat".to_string(),
            id: MarkerId(13071),
        };
        let msg = d.to_string();
        assert!(msg.contains("#13071"));
        assert!(msg.contains("chompy bird hat"));

        let d = Diagnostic::CycleExcluded {
            entity: "a".to_string(),
            via: "b".to_string(),
        };
        assert!(d.to_string().contains("'b'"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let d = Diagnostic::UnresolvedMaterial {
            material: "mystery ore".to_string(),
            used_by: "mystery bar".to_string(),
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "unresolved_material");
        assert_eq!(json["material"], "mystery ore");
    }
}

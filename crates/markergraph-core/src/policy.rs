//! Resolution policy knobs.
//!
//! By default zero-recipe items are free and craftability groups are
//! marker-only. Variants of derived items are linked along with variants of
//! markers.

use serde::{Deserialize, Serialize};

/// What a non-marker material with no recipes contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafPolicy {
    /// Zero recipes means freely obtainable: contributes no markers. An
    /// undocumented production chain therefore never restricts an item.
    #[default]
    Unrestricted,
    /// Materials that were never declared (not an item, marker, or recipe
    /// output) invalidate the recipe using them, the same way a cycle does.
    /// Declared leaves stay unrestricted.
    BlockUnresolved,
}

/// Which marker recipes count as "craftable from other markers".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraftabilityMode {
    /// Every material of the recipe must be a marker.
    #[default]
    MarkerOnly,
    /// At least one material is a marker; other materials are treated as
    /// freely obtainable and left out of the group.
    AnyMarkerMaterial,
}

/// Policy shared by the variant linker, resolver, and craftability resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverPolicy {
    pub leaf: LeafPolicy,
    pub craftability: CraftabilityMode,
    /// Also link naming-pattern variants of derived (restricted, non-marker)
    /// items, not only variants of markers.
    pub link_derived_variants: bool,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            leaf: LeafPolicy::Unrestricted,
            craftability: CraftabilityMode::MarkerOnly,
            link_derived_variants: true,
        }
    }
}

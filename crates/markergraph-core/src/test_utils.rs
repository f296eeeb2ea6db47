//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::builder::RecipeGraphBuilder;
use crate::catalog::Catalog;
use crate::raw::{RawItem, RawMarker, RawRecipe};

// ===========================================================================
// Record constructors
// ===========================================================================

pub fn marker(name: &str, id: u32) -> RawMarker {
    RawMarker::new(name, [id])
}

pub fn recipe(output: &str, materials: &[&str]) -> RawRecipe {
    RawRecipe::new(output, materials.iter().copied())
}

pub fn item(name: &str, ids: &[u32]) -> RawItem {
    RawItem::new(name, ids.iter().copied())
}

/// Build a catalog from `(name, id)` markers and `(output, materials)`
/// recipes, without an item index.
pub fn build_catalog(markers: &[(&str, u32)], recipes: &[(&str, &[&str])]) -> Catalog {
    let mut builder = RecipeGraphBuilder::new();
    builder
        .add_markers(markers.iter().map(|&(name, id)| marker(name, id)))
        .add_recipes(recipes.iter().map(|&(output, materials)| recipe(output, materials)));
    builder.build()
}

// ===========================================================================
// Fixtures
// ===========================================================================

/// `gold_bar` with three recipes, none of which needs a marker.
pub fn gold_bar_catalog() -> Catalog {
    build_catalog(
        &[],
        &[
            ("gold_bar", &["gold_ore"]),
            ("gold_bar", &["gold_ore", "nature_rune", "fire_rune"]),
            ("gold_bar", &["gold_ore", "nature_rune"]),
        ],
    )
}

/// Markers `onyx` (1) and `zenyte_shard` (2) feeding a four-step chain up to
/// `tormented_bracelet`.
pub fn zenyte_catalog() -> Catalog {
    build_catalog(
        &[("onyx", 1), ("zenyte_shard", 2)],
        &[
            ("uncut_zenyte", &["onyx", "zenyte_shard"]),
            ("zenyte", &["uncut_zenyte"]),
            ("zenyte_bracelet", &["zenyte"]),
            ("tormented_bracelet", &["zenyte_bracelet"]),
        ],
    )
}

// ===========================================================================
// Synthetic catalogs
// ===========================================================================

/// SplitMix64, for reproducible synthetic catalogs.
#[derive(Debug, Clone)]
pub struct SeedRng {
    state: u64,
}

impl SeedRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `0..bound`. `bound` must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}

/// Raw records for a random catalog of `size` entities named `item <n>`.
/// Roughly one entity in eight is a marker (id `n + 1`); about two thirds
/// have one to three recipes over arbitrary other entities, so cycles and
/// shared sub-chains are common.
pub fn synthetic_sources(seed: u64, size: usize) -> (Vec<RawMarker>, Vec<RawRecipe>) {
    let mut rng = SeedRng::new(seed);
    let size = size.max(1);
    let name = |n: usize| format!("item {n}");

    let mut markers = Vec::new();
    let mut recipes = Vec::new();
    for n in 0..size {
        if rng.below(8) == 0 {
            markers.push(RawMarker::new(name(n), [n as u32 + 1]));
        }
        if rng.below(3) == 0 {
            continue;
        }
        for _ in 0..=rng.below(3) {
            let materials: Vec<String> = (0..=rng.below(3)).map(|_| name(rng.below(size))).collect();
            recipes.push(RawRecipe::new(name(n), materials));
        }
    }
    (markers, recipes)
}

pub fn synthetic_catalog(seed: u64, size: usize) -> Catalog {
    let (markers, recipes) = synthetic_sources(seed, size);
    let mut builder = RecipeGraphBuilder::new();
    builder.add_markers(markers).add_recipes(recipes);
    builder.build()
}

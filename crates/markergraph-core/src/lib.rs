//! Markergraph Core -- marker dependency resolution for item/recipe catalogs.
//!
//! Given a catalog of recipes (each entity may have several alternative
//! recipes) and a set of *marker* items, this crate computes for every entity
//! the smallest set of markers that must be unlocked before the entity can be
//! produced, and whether the entity is *restricted* (every known way to make it
//! needs at least one marker).
//!
//! # Pipeline
//!
//! 1. **Build** -- [`builder::RecipeGraphBuilder`] normalizes raw records into
//!    an arena-backed [`catalog::Catalog`].
//! 2. **Link** -- [`variant::VariantLinker`] injects additive requirements for
//!    naming-pattern variants (charged/uncharged, locked, degraded, ...).
//! 3. **Resolve** -- [`resolver::Resolver`] runs a memoized depth-first search
//!    over the frozen catalog. Cycles exclude the recipe that closes them,
//!    never the whole resolution.
//! 4. **Craftability** -- [`craftability::CraftabilityResolver`] lists how
//!    markers can be made from other markers.
//!
//! [`report::DependencyReport`] runs all four stages and collects the
//! per-marker and per-derived-item views plus every [`diagnostic::Diagnostic`]
//! recorded along the way.
//!
//! ```rust,ignore
//! let mut builder = RecipeGraphBuilder::new();
//! builder.add_marker(RawMarker::new("Onyx", [6573]));
//! builder.add_recipe(RawRecipe::new("Onyx bolt tips", ["Onyx", "Chisel"]));
//! let catalog = builder.build();
//!
//! let mut resolver = Resolver::new(&catalog);
//! assert!(resolver.resolve("onyx bolt tips").restricted);
//! ```

pub mod builder;
pub mod catalog;
pub mod craftability;
pub mod diagnostic;
pub mod id;
pub mod name;
pub mod policy;
pub mod raw;
pub mod report;
pub mod resolver;
pub mod variant;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use builder::RecipeGraphBuilder;
pub use catalog::{Catalog, Entity, Recipe};
pub use craftability::CraftabilityResolver;
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use id::{EntityId, MarkerId};
pub use policy::{CraftabilityMode, LeafPolicy, ResolverPolicy};
pub use raw::{CatalogSources, ManualDerived, RawItem, RawMarker, RawRecipe};
pub use report::DependencyReport;
pub use resolver::{ResolutionResult, Resolver};
pub use variant::{VariantLink, VariantLinker, VariantPattern, VariantTable};

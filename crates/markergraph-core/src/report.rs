//! End-to-end report: build, link, resolve, and summarize one catalog.

use crate::builder::RecipeGraphBuilder;
use crate::craftability::CraftabilityResolver;
use crate::diagnostic::{Diagnostic, Severity};
use crate::id::MarkerId;
use crate::name::normalize;
use crate::policy::ResolverPolicy;
use crate::raw::CatalogSources;
use crate::resolver::Resolver;
use crate::variant::{VariantLink, VariantLinker};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Format version of [`DependencyReport`].
pub const REPORT_FORMAT_VERSION: &str = "1.1.0";

/// One marker and everything known about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerEntry {
    pub name: String,
    pub tags: Vec<String>,
    /// The marker's own id plus every identifier of the same name that is not
    /// itself a marker id, sorted.
    pub all_ids: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub craftable_from: Vec<Vec<MarkerId>>,
}

/// A non-marker entity that needs at least one marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedEntry {
    pub name: String,
    pub item_ids: Vec<u32>,
    pub markers: Vec<MarkerId>,
    /// Hand-written rather than computed.
    pub manual: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub total_markers: usize,
    pub total_derived: usize,
    /// Craftable non-markers with at least one marker-free recipe.
    pub unrestricted_craftable: usize,
    pub derived_with_multiple_ids: usize,
    /// Derived entities left out of `derived` because they have no identifier.
    pub derived_without_ids: usize,
    pub markers_with_multiple_ids: usize,
    pub markers_craftable_from_markers: usize,
    pub variant_links: usize,
    pub warnings: usize,
}

/// Deterministic summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub version: String,
    pub stats: ReportStats,
    pub markers: BTreeMap<MarkerId, MarkerEntry>,
    pub derived: BTreeMap<String, DerivedEntry>,
    pub links: Vec<VariantLink>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DependencyReport {
    /// Run the full pipeline over `sources`.
    pub fn generate(sources: CatalogSources, policy: &ResolverPolicy) -> Self {
        let CatalogSources {
            markers,
            recipes,
            items,
            overrides,
            variants,
            diagnostics,
        } = sources;

        let mut builder = RecipeGraphBuilder::new();
        builder
            .carry_diagnostics(diagnostics)
            .add_markers(markers)
            .add_items(items)
            .add_recipes(recipes);
        let mut catalog = builder.build();

        let links = VariantLinker::new(variants)
            .with_policy(policy.clone())
            .link(&mut catalog);

        let mut stats = ReportStats {
            variant_links: links.len(),
            ..ReportStats::default()
        };

        // -- Derived items --

        let mut resolver = Resolver::with_policy(&catalog, policy.clone());
        let resolved = resolver.derived_items();
        let craftable_items = catalog
            .craftable()
            .filter(|&id| !catalog.is_marker(id))
            .count();
        stats.unrestricted_craftable = craftable_items - resolved.len();

        let mut derived = BTreeMap::new();
        for (key, result) in resolved {
            let item_ids = catalog
                .lookup_key(&key)
                .and_then(|id| catalog.entity(id))
                .map(|e| e.identifiers.clone())
                .unwrap_or_default();
            if item_ids.is_empty() {
                log::debug!("derived item '{key}' has no identifier; left out");
                stats.derived_without_ids += 1;
                continue;
            }
            if item_ids.len() > 1 {
                stats.derived_with_multiple_ids += 1;
            }
            derived.insert(
                key.clone(),
                DerivedEntry {
                    name: key,
                    item_ids,
                    markers: result.markers.into_iter().collect(),
                    manual: false,
                },
            );
        }

        // -- Markers --

        let marker_ids: BTreeSet<u32> = catalog.markers().map(|(m, _)| m.0).collect();
        let crafts = CraftabilityResolver::new(&catalog, policy.craftability);
        let mut markers = BTreeMap::new();
        for (marker, entity_id) in catalog.markers() {
            let Some(entity) = catalog.entity(entity_id) else {
                continue;
            };
            let mut all_ids: Vec<u32> = entity
                .identifiers
                .iter()
                .copied()
                .filter(|id| !marker_ids.contains(id))
                .collect();
            all_ids.push(marker.0);
            all_ids.sort_unstable();
            all_ids.dedup();
            if all_ids.len() > 1 {
                stats.markers_with_multiple_ids += 1;
            }

            let craftable_from = crafts.for_marker(marker);
            if !craftable_from.is_empty() {
                stats.markers_craftable_from_markers += 1;
            }

            let tags = entity.marker.as_ref().map(|m| m.tags.clone()).unwrap_or_default();
            markers.insert(
                marker,
                MarkerEntry {
                    name: entity.display_name.clone(),
                    tags,
                    all_ids,
                    craftable_from,
                },
            );
        }

        // -- Manual overrides --

        for entry in overrides {
            let removed: BTreeSet<u32> = entry.item_ids.iter().copied().collect();
            for marker in markers.values_mut() {
                marker.all_ids.retain(|id| !removed.contains(id));
            }
            let key = normalize(&entry.name);
            derived.insert(
                key.clone(),
                DerivedEntry {
                    name: key,
                    item_ids: entry.item_ids,
                    markers: entry.markers,
                    manual: true,
                },
            );
        }

        stats.total_markers = markers.len();
        stats.total_derived = derived.len();

        let mut diagnostics = catalog.diagnostics().as_slice().to_vec();
        diagnostics.extend(resolver.drain_diagnostics());
        stats.warnings = diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
            .count();

        log::info!(
            "report: {} markers, {} derived items, {} variant links, {} warnings",
            stats.total_markers,
            stats.total_derived,
            stats.variant_links,
            stats.warnings
        );

        Self {
            version: REPORT_FORMAT_VERSION.to_string(),
            stats,
            markers,
            derived,
            links,
            diagnostics,
        }
    }
}

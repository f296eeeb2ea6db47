//! Builds a [`Catalog`] from raw records.
//!
//! Records are buffered and interpreted in a fixed order at [`build`] time --
//! markers, then items, then recipes -- so the result does not depend on the
//! order in which the caller registered them. Recipe order per output is
//! preserved, which is what makes resolver tie-breaking deterministic.
//!
//! [`build`]: RecipeGraphBuilder::build

use crate::catalog::{Catalog, MarkerInfo, Recipe, RecipeOrigin};
use crate::diagnostic::{Diagnostic, Diagnostics, DropReason};
use crate::id::{EntityId, MarkerId};
use crate::name::normalize;
use crate::raw::{RawItem, RawMarker, RawRecipe};
use std::collections::HashSet;

/// Collects raw marker, item, and recipe records and turns them into a
/// [`Catalog`]. Never fails: bad records are dropped with a diagnostic.
#[derive(Debug, Default)]
pub struct RecipeGraphBuilder {
    markers: Vec<RawMarker>,
    items: Vec<RawItem>,
    recipes: Vec<RawRecipe>,
    diagnostics: Diagnostics,
}

impl RecipeGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Registration --

    pub fn add_marker(&mut self, marker: RawMarker) -> &mut Self {
        self.markers.push(marker);
        self
    }

    pub fn add_markers(&mut self, markers: impl IntoIterator<Item = RawMarker>) -> &mut Self {
        self.markers.extend(markers);
        self
    }

    pub fn add_item(&mut self, item: RawItem) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn add_items(&mut self, items: impl IntoIterator<Item = RawItem>) -> &mut Self {
        self.items.extend(items);
        self
    }

    pub fn add_recipe(&mut self, recipe: RawRecipe) -> &mut Self {
        self.recipes.push(recipe);
        self
    }

    pub fn add_recipes(&mut self, recipes: impl IntoIterator<Item = RawRecipe>) -> &mut Self {
        self.recipes.extend(recipes);
        self
    }

    /// Carry diagnostics from an earlier stage (e.g. data loading) into the
    /// catalog's diagnostic list. They are assumed to be logged already.
    pub fn carry_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) -> &mut Self {
        self.diagnostics.absorb(diagnostics);
        self
    }

    // -- Finalization --

    /// Interpret every buffered record and produce the catalog.
    pub fn build(self) -> Catalog {
        let RecipeGraphBuilder {
            markers,
            items,
            recipes,
            diagnostics,
        } = self;

        let mut catalog = Catalog::empty();
        catalog.diagnostics = diagnostics;
        catalog.has_item_index = !items.is_empty();

        for marker in markers {
            register_marker(&mut catalog, marker);
        }
        for item in items {
            register_item(&mut catalog, item);
        }

        let mut used_by: Vec<(EntityId, EntityId)> = Vec::new();
        for recipe in recipes {
            register_recipe(&mut catalog, recipe, &mut used_by);
        }

        for entity in catalog.entities.values_mut() {
            entity.identifiers.sort_unstable();
            entity.identifiers.dedup();
        }

        if catalog.has_item_index {
            report_unresolved(&mut catalog, &used_by);
        }

        log::info!(
            "built catalog: {} entities, {} recipes across {} craftable entities, {} markers",
            catalog.entity_count(),
            catalog.recipe_count(),
            catalog.craftable().count(),
            catalog.marker_count(),
        );

        catalog
    }
}

fn register_marker(catalog: &mut Catalog, marker: RawMarker) {
    let key = normalize(&marker.name);
    if key.is_empty() {
        catalog.diagnostics.record(Diagnostic::MalformedRecord {
            origin: "markers".to_string(),
            detail: "marker record without a name".to_string(),
        });
        return;
    }
    let Some(&primary) = marker.identifiers.first() else {
        catalog.diagnostics.record(Diagnostic::MarkerWithoutId {
            name: marker.name.trim().to_string(),
        });
        let id = catalog.intern(&key, &marker.name);
        if let Some(entity) = catalog.entity_mut(id) {
            entity.declared = true;
        }
        return;
    };
    let marker_id = MarkerId(primary);

    let id = catalog.intern(&key, &marker.name);
    let Some(entity) = catalog.entity_mut(id) else {
        return;
    };
    entity.declared = true;
    entity.identifiers.extend(marker.identifiers.iter().copied());
    let shared_name = match &mut entity.marker {
        Some(info) => {
            for tag in marker.tags {
                if !info.tags.contains(&tag) {
                    info.tags.push(tag);
                }
            }
            true
        }
        None => {
            entity.marker = Some(MarkerInfo {
                id: marker_id,
                tags: marker.tags,
            });
            false
        }
    };
    if shared_name {
        catalog.diagnostics.record(Diagnostic::DuplicateMarkerName {
            name: key,
            id: marker_id,
        });
    }
    catalog.markers.entry(marker_id).or_insert(id);
}

fn register_item(catalog: &mut Catalog, item: RawItem) {
    let key = normalize(&item.name);
    if key.is_empty() {
        catalog.diagnostics.record(Diagnostic::MalformedRecord {
            origin: "items".to_string(),
            detail: "item record without a name".to_string(),
        });
        return;
    }
    let id = catalog.intern(&key, &item.name);
    if let Some(entity) = catalog.entity_mut(id) {
        entity.declared = true;
        entity.identifiers.extend(item.identifiers);
    }
}

fn register_recipe(catalog: &mut Catalog, recipe: RawRecipe, used_by: &mut Vec<(EntityId, EntityId)>) {
    let output_key = normalize(&recipe.output);
    if output_key.is_empty() {
        catalog.diagnostics.record(Diagnostic::RecipeDropped {
            output: recipe.output,
            reason: DropReason::MissingOutput,
        });
        return;
    }

    let mut keys: Vec<(String, &str)> = Vec::with_capacity(recipe.materials.len());
    for material in &recipe.materials {
        let key = normalize(material);
        if !key.is_empty() && !keys.iter().any(|(k, _)| *k == key) {
            keys.push((key, material.as_str()));
        }
    }

    if keys.is_empty() {
        catalog.diagnostics.record(Diagnostic::RecipeDropped {
            output: output_key,
            reason: DropReason::EmptyMaterials,
        });
        return;
    }
    if keys.iter().all(|(k, _)| *k == output_key) {
        catalog.diagnostics.record(Diagnostic::RecipeDropped {
            output: output_key,
            reason: DropReason::SelfReference,
        });
        return;
    }

    let output = catalog.intern(&output_key, &recipe.output);
    if let Some(entity) = catalog.entity_mut(output) {
        entity.declared = true;
    }
    let materials: Vec<EntityId> = keys
        .iter()
        .map(|(key, display)| catalog.intern(key, display))
        .collect();

    let mut signature = materials.clone();
    signature.sort_unstable();
    let duplicate = catalog.recipes(output).iter().any(|existing| {
        let mut other = existing.materials.clone();
        other.sort_unstable();
        other == signature
    });
    if duplicate {
        catalog.diagnostics.record(Diagnostic::DuplicateRecipe { output: output_key });
        return;
    }

    used_by.extend(materials.iter().map(|&m| (m, output)));
    catalog.push_recipe(
        output,
        Recipe {
            materials,
            origin: RecipeOrigin::Listed,
        },
    );
}

/// One diagnostic per undeclared material, naming the first recipe output
/// that used it.
fn report_unresolved(catalog: &mut Catalog, used_by: &[(EntityId, EntityId)]) {
    let mut seen: HashSet<EntityId> = HashSet::new();
    for &(material, output) in used_by {
        let declared = catalog.entity(material).is_some_and(|e| e.declared);
        if declared || !seen.insert(material) {
            continue;
        }
        let diagnostic = Diagnostic::UnresolvedMaterial {
            material: catalog.key(material).to_string(),
            used_by: catalog.key(output).to_string(),
        };
        catalog.diagnostics.record(diagnostic);
    }
}

//! Minimal marker-set resolution.
//!
//! The resolver walks the frozen [`Catalog`] depth-first and memoizes one
//! [`ResolutionResult`] per entity. Every entity is in one of three states:
//! unvisited (absent from the memo), in progress, or done. Reaching an
//! in-progress entity yields a sentinel that excludes the recipe that led to
//! it, so cycles terminate without failing the whole resolution.
//!
//! Results for entities on a cycle depend on which entity the walk entered
//! the cycle from. The walk order is the catalog's insertion order, so the
//! results are still deterministic for a given input.

use crate::catalog::{Catalog, Recipe};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::id::{EntityId, MarkerId};
use crate::policy::{LeafPolicy, ResolverPolicy};
use serde::Serialize;
use slotmap::SecondaryMap;
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The minimal marker set for one entity and its restriction verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub markers: BTreeSet<MarkerId>,
    /// At least one recipe is usable and every usable recipe needs a marker.
    /// Always `true` for markers themselves.
    pub restricted: bool,
    /// Index into the entity's recipe list of the recipe that produced
    /// `markers`. `None` for markers and for entities with no usable recipe.
    pub chosen_recipe: Option<usize>,
}

impl ResolutionResult {
    fn marker(id: MarkerId) -> Self {
        Self {
            markers: BTreeSet::from([id]),
            restricted: true,
            chosen_recipe: None,
        }
    }
}

/// Per-recipe view of an entity, for explaining a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeAnalysis {
    pub index: usize,
    pub materials: Vec<String>,
    /// Markers this recipe needs, or `None` when the recipe is excluded
    /// because it loops back onto the entity or uses a blocked material.
    pub markers: Option<BTreeSet<MarkerId>>,
}

#[derive(Debug, Clone)]
enum VisitState {
    InProgress,
    Done(ResolutionResult),
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Memoizing resolver over a borrowed catalog. One resolver is one run: its
/// memo table and diagnostics live as long as it does.
#[derive(Debug)]
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    policy: ResolverPolicy,
    states: SecondaryMap<EntityId, VisitState>,
    diagnostics: Diagnostics,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_policy(catalog, ResolverPolicy::default())
    }

    pub fn with_policy(catalog: &'a Catalog, policy: ResolverPolicy) -> Self {
        Self {
            catalog,
            policy,
            states: SecondaryMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn policy(&self) -> &ResolverPolicy {
        &self.policy
    }

    // -- Queries --

    /// Resolve an entity by name. Unknown names resolve to the empty,
    /// unrestricted result and are recorded as a diagnostic.
    pub fn resolve(&mut self, name: &str) -> ResolutionResult {
        match self.catalog.lookup(name) {
            Some(id) => self.resolve_id(id),
            None => {
                self.diagnostics.record(Diagnostic::UnknownEntity {
                    name: name.to_string(),
                });
                ResolutionResult::default()
            }
        }
    }

    /// Resolve an entity by id.
    pub fn resolve_id(&mut self, id: EntityId) -> ResolutionResult {
        // A top-level call never sees its own sentinel.
        self.visit(id).unwrap_or_default()
    }

    pub fn is_restricted(&mut self, name: &str) -> bool {
        self.resolve(name).restricted
    }

    /// Resolve every entity, keyed by normalized name.
    pub fn resolve_all(&mut self) -> BTreeMap<String, ResolutionResult> {
        let catalog = self.catalog;
        catalog
            .entities()
            .map(|(id, entity)| (entity.key.clone(), self.resolve_id(id)))
            .collect()
    }

    /// Every non-marker entity whose minimal marker set is non-empty, keyed by
    /// normalized name.
    pub fn derived_items(&mut self) -> BTreeMap<String, ResolutionResult> {
        let catalog = self.catalog;
        let mut derived = BTreeMap::new();
        for id in catalog.craftable() {
            if catalog.is_marker(id) {
                continue;
            }
            let result = self.resolve_id(id);
            if !result.markers.is_empty() {
                derived.insert(catalog.key(id).to_string(), result);
            }
        }
        log::info!("found {} derived items", derived.len());
        derived
    }

    /// Marker sets of every recipe of `name`, as seen from the entity itself.
    ///
    /// Leaves the memo table and diagnostics as they were, apart from
    /// resolving `name` if that had not happened yet.
    pub fn recipe_breakdown(&mut self, name: &str) -> Vec<RecipeAnalysis> {
        let Some(id) = self.catalog.lookup(name) else {
            return Vec::new();
        };
        self.resolve_id(id);

        let catalog = self.catalog;
        let states = self.states.clone();
        let diagnostics = std::mem::take(&mut self.diagnostics);
        self.states.insert(id, VisitState::InProgress);

        let analyses = catalog
            .recipes(id)
            .iter()
            .enumerate()
            .map(|(index, recipe)| RecipeAnalysis {
                index,
                materials: catalog.material_names(recipe),
                markers: self.recipe_markers(id, recipe),
            })
            .collect();

        self.states = states;
        self.diagnostics = diagnostics;
        analyses
    }

    // -- Diagnostics --

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn drain_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.drain()
    }

    // -- Search --

    /// Iterative depth-first search with an explicit frame stack, so chain
    /// depth is bounded by memory rather than by the thread's stack.
    ///
    /// `None` is the in-progress sentinel.
    fn visit(&mut self, root: EntityId) -> Option<ResolutionResult> {
        if let Some(marker) = self.catalog.marker_of(root) {
            return Some(ResolutionResult::marker(marker));
        }
        match self.states.get(root) {
            Some(VisitState::Done(result)) => return Some(result.clone()),
            Some(VisitState::InProgress) => return None,
            None => {}
        }
        self.states.insert(root, VisitState::InProgress);

        let mut stack = vec![Frame::new(root)];
        while let Some(frame) = stack.last_mut() {
            match self.advance(frame) {
                Step::Descend(material) => {
                    self.states.insert(material, VisitState::InProgress);
                    stack.push(Frame::new(material));
                }
                Step::Finished(result) => {
                    let entity = frame.entity;
                    log::trace!(
                        "resolved '{}': {} markers, restricted={}",
                        self.catalog.key(entity),
                        result.markers.len(),
                        result.restricted
                    );
                    stack.pop();
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.partial.extend(result.markers.iter().copied());
                            parent.material += 1;
                            self.states.insert(entity, VisitState::Done(result));
                        }
                        None => {
                            self.states.insert(entity, VisitState::Done(result.clone()));
                            return Some(result);
                        }
                    }
                }
            }
        }
        None
    }

    /// Run `frame` forward until it needs an unvisited material or has
    /// finished every recipe it is going to evaluate.
    fn advance(&mut self, frame: &mut Frame) -> Step {
        let catalog = self.catalog;
        loop {
            let Some(recipe) = catalog.recipes(frame.entity).get(frame.recipe) else {
                return Step::Finished(frame.finish());
            };
            let Some(&material) = recipe.materials.get(frame.material) else {
                let markers = std::mem::take(&mut frame.partial);
                frame.valid += 1;
                if frame.best.as_ref().is_none_or(|(_, min)| markers.len() < min.len()) {
                    let free = markers.is_empty();
                    frame.best = Some((frame.recipe, markers));
                    if free {
                        return Step::Finished(frame.finish());
                    }
                }
                frame.next_recipe();
                continue;
            };
            match self.material_state(frame.entity, material) {
                MaterialState::Resolved(markers) => {
                    frame.partial.extend(markers);
                    frame.material += 1;
                }
                MaterialState::Excluded => frame.next_recipe(),
                MaterialState::Unvisited => return Step::Descend(material),
            }
        }
    }

    /// What `material` contributes to a recipe of `owner`, short of
    /// descending into it.
    fn material_state(&mut self, owner: EntityId, material: EntityId) -> MaterialState {
        let catalog = self.catalog;
        if let Some(marker) = catalog.marker_of(material) {
            return MaterialState::Resolved(BTreeSet::from([marker]));
        }
        if self.policy.leaf == LeafPolicy::BlockUnresolved && is_unresolved_leaf(catalog, material) {
            log::trace!(
                "excluded a recipe of '{}': '{}' is unresolved",
                catalog.key(owner),
                catalog.key(material)
            );
            return MaterialState::Excluded;
        }
        match self.states.get(material) {
            Some(VisitState::Done(result)) => MaterialState::Resolved(result.markers.clone()),
            Some(VisitState::InProgress) => {
                self.diagnostics.record(Diagnostic::CycleExcluded {
                    entity: catalog.key(owner).to_string(),
                    via: catalog.key(material).to_string(),
                });
                MaterialState::Excluded
            }
            None => MaterialState::Unvisited,
        }
    }

    /// Union of the marker sets of a recipe's materials, or `None` when the
    /// recipe is excluded.
    fn recipe_markers(&mut self, owner: EntityId, recipe: &Recipe) -> Option<BTreeSet<MarkerId>> {
        let mut markers = BTreeSet::new();
        for &material in &recipe.materials {
            match self.material_state(owner, material) {
                MaterialState::Resolved(found) => markers.extend(found),
                MaterialState::Excluded => return None,
                MaterialState::Unvisited => markers.extend(self.visit(material)?.markers),
            }
        }
        Some(markers)
    }
}

// ---------------------------------------------------------------------------
// Search stack
// ---------------------------------------------------------------------------

/// One entity being resolved: the recipe and material the search is at, the
/// markers gathered for that recipe so far, and the best recipe seen.
#[derive(Debug)]
struct Frame {
    entity: EntityId,
    recipe: usize,
    material: usize,
    partial: BTreeSet<MarkerId>,
    valid: usize,
    best: Option<(usize, BTreeSet<MarkerId>)>,
}

impl Frame {
    fn new(entity: EntityId) -> Self {
        Self {
            entity,
            recipe: 0,
            material: 0,
            partial: BTreeSet::new(),
            valid: 0,
            best: None,
        }
    }

    fn next_recipe(&mut self) {
        self.recipe += 1;
        self.material = 0;
        self.partial.clear();
    }

    fn finish(&mut self) -> ResolutionResult {
        match self.best.take() {
            Some((index, markers)) => ResolutionResult {
                restricted: self.valid > 0 && !markers.is_empty(),
                markers,
                chosen_recipe: Some(index),
            },
            None => ResolutionResult::default(),
        }
    }
}

enum Step {
    Descend(EntityId),
    Finished(ResolutionResult),
}

enum MaterialState {
    Resolved(BTreeSet<MarkerId>),
    /// Blocked leaf or cycle; the whole recipe is skipped.
    Excluded,
    Unvisited,
}

fn is_unresolved_leaf(catalog: &Catalog, id: EntityId) -> bool {
    catalog.recipes(id).is_empty() && catalog.entity(id).is_some_and(|e| !e.declared)
}

//! The normalized recipe graph.
//!
//! A [`Catalog`] is produced by [`crate::builder::RecipeGraphBuilder`] and
//! receives variant requirements from [`crate::variant::VariantLinker`].
//! After that it is only ever borrowed immutably: the resolver keeps its memo
//! table separately, so one catalog can back any number of resolvers.

use crate::diagnostic::Diagnostics;
use crate::id::{EntityId, MarkerId};
use crate::name::normalize;
use serde::Serialize;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{BTreeMap, HashMap};

// ---------------------------------------------------------------------------
// Entities and recipes
// ---------------------------------------------------------------------------

/// Marker flag and provenance for a marker entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerInfo {
    /// Primary id; what resolution results refer to.
    pub id: MarkerId,
    pub tags: Vec<String>,
}

/// An item in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// Normalized identity key.
    pub key: String,
    /// Name as first supplied.
    pub display_name: String,
    /// Every numeric identifier recorded for this name, sorted.
    pub identifiers: Vec<u32>,
    pub marker: Option<MarkerInfo>,
    /// Declared by a marker record, an item record, or as a recipe output.
    /// Entities that only ever appear as materials are undeclared.
    pub declared: bool,
}

impl Entity {
    pub fn is_marker(&self) -> bool {
        self.marker.is_some()
    }

    pub fn marker_id(&self) -> Option<MarkerId> {
        self.marker.as_ref().map(|m| m.id)
    }
}

/// Where a recipe came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeOrigin {
    /// Listed in the raw recipe data (possibly with variant materials appended).
    Listed,
    /// Synthesized by the variant linker for an entity without recipes.
    Variant,
}

/// One alternative way to produce an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub materials: Vec<EntityId>,
    pub origin: RecipeOrigin,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Arena of entities plus the recipe lists that produce them.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub(crate) entities: SlotMap<EntityId, Entity>,
    pub(crate) by_key: HashMap<String, EntityId>,
    pub(crate) recipes: SecondaryMap<EntityId, Vec<Recipe>>,
    /// Every marker record's primary id. Two ids may share one entity when
    /// marker records share a name.
    pub(crate) markers: BTreeMap<MarkerId, EntityId>,
    pub(crate) has_item_index: bool,
    pub(crate) diagnostics: Diagnostics,
}

impl Catalog {
    pub(crate) fn empty() -> Self {
        Self {
            entities: SlotMap::with_key(),
            by_key: HashMap::new(),
            recipes: SecondaryMap::new(),
            markers: BTreeMap::new(),
            has_item_index: false,
            diagnostics: Diagnostics::new(),
        }
    }

    // -- Lookup --

    /// Look up an entity by any spelling of its name.
    pub fn lookup(&self, name: &str) -> Option<EntityId> {
        self.by_key.get(&normalize(name)).copied()
    }

    /// Look up an entity by an already-normalized key.
    pub fn lookup_key(&self, key: &str) -> Option<EntityId> {
        self.by_key.get(key).copied()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Normalized key of an entity issued by this catalog.
    pub fn key(&self, id: EntityId) -> &str {
        self.entities.get(id).map(|e| e.key.as_str()).unwrap_or("")
    }

    pub fn is_marker(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(Entity::is_marker)
    }

    /// Primary marker id of an entity, if it is a marker.
    pub fn marker_of(&self, id: EntityId) -> Option<MarkerId> {
        self.entities.get(id).and_then(Entity::marker_id)
    }

    /// Entity addressed by a marker id.
    pub fn marker_entity(&self, marker: MarkerId) -> Option<EntityId> {
        self.markers.get(&marker).copied()
    }

    /// Recipes that produce an entity. Empty for leaves.
    pub fn recipes(&self, id: EntityId) -> &[Recipe] {
        self.recipes.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    // -- Iteration --

    /// All entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    /// Entities with at least one recipe, in insertion order.
    pub fn craftable(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities
            .keys()
            .filter(|&id| self.recipes.get(id).is_some_and(|r| !r.is_empty()))
    }

    /// Marker ids and their entities, ordered by id.
    pub fn markers(&self) -> impl Iterator<Item = (MarkerId, EntityId)> + '_ {
        self.markers.iter().map(|(&m, &e)| (m, e))
    }

    // -- Counts --

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.values().map(Vec::len).sum()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Whether the catalog was built with an item index, i.e. whether
    /// undeclared materials are meaningful.
    pub fn has_item_index(&self) -> bool {
        self.has_item_index
    }

    /// Diagnostics recorded while building and linking this catalog.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Material names of a recipe, for reporting.
    pub fn material_names(&self, recipe: &Recipe) -> Vec<String> {
        recipe
            .materials
            .iter()
            .map(|&m| self.key(m).to_string())
            .collect()
    }

    // -- Graph construction (builder and linker only) --

    /// Return the entity for `key`, creating an undeclared one if needed.
    pub(crate) fn intern(&mut self, key: &str, display_name: &str) -> EntityId {
        if let Some(&id) = self.by_key.get(key) {
            return id;
        }
        let id = self.entities.insert(Entity {
            key: key.to_string(),
            display_name: display_name.trim().to_string(),
            identifiers: Vec::new(),
            marker: None,
            declared: false,
        });
        self.by_key.insert(key.to_string(), id);
        id
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub(crate) fn push_recipe(&mut self, output: EntityId, recipe: Recipe) {
        match self.recipes.get_mut(output) {
            Some(list) => list.push(recipe),
            None => {
                self.recipes.insert(output, vec![recipe]);
            }
        }
    }

    /// Make `required` a material of every recipe of `dependent`, or give
    /// `dependent` a single-material recipe if it has none. Returns `false`
    /// when nothing changed because every recipe already required it.
    pub(crate) fn require(&mut self, dependent: EntityId, required: EntityId) -> bool {
        match self.recipes.get_mut(dependent) {
            Some(list) if !list.is_empty() => {
                let mut changed = false;
                for recipe in list.iter_mut() {
                    if !recipe.materials.contains(&required) {
                        recipe.materials.push(required);
                        changed = true;
                    }
                }
                changed
            }
            _ => {
                self.recipes.insert(
                    dependent,
                    vec![Recipe {
                        materials: vec![required],
                        origin: RecipeOrigin::Variant,
                    }],
                );
                true
            }
        }
    }
}

//! Which markers can be produced from other markers.
//!
//! The answer for one marker is an OR-list of AND-groups: any one group of
//! markers is enough to make it. Only the marker's own recipes are inspected;
//! there is no transitive search and no call into the resolver.

use crate::catalog::Catalog;
use crate::id::MarkerId;
use crate::policy::CraftabilityMode;
use std::collections::BTreeMap;

/// Craftability queries over a frozen catalog.
#[derive(Debug, Clone, Copy)]
pub struct CraftabilityResolver<'a> {
    catalog: &'a Catalog,
    mode: CraftabilityMode,
}

impl<'a> CraftabilityResolver<'a> {
    pub fn new(catalog: &'a Catalog, mode: CraftabilityMode) -> Self {
        Self { catalog, mode }
    }

    /// Marker groups that produce `marker`, in recipe order. Each group is
    /// sorted; repeated groups are listed once. Empty when the marker is
    /// unknown or cannot be made from other markers.
    pub fn for_marker(&self, marker: MarkerId) -> Vec<Vec<MarkerId>> {
        let Some(entity) = self.catalog.marker_entity(marker) else {
            return Vec::new();
        };
        let own = self.catalog.marker_of(entity);

        let mut groups: Vec<Vec<MarkerId>> = Vec::new();
        for recipe in self.catalog.recipes(entity) {
            let ids: Vec<Option<MarkerId>> = recipe
                .materials
                .iter()
                .map(|&m| self.catalog.marker_of(m))
                .collect();
            let mut group: Vec<MarkerId> = match self.mode {
                CraftabilityMode::MarkerOnly => match ids.into_iter().collect::<Option<Vec<_>>>() {
                    Some(group) => group,
                    None => continue,
                },
                CraftabilityMode::AnyMarkerMaterial => ids.into_iter().flatten().collect(),
            };
            if group.is_empty() || group.iter().any(|id| Some(*id) == own) {
                continue;
            }
            group.sort_unstable();
            group.dedup();
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
        groups
    }

    /// Every marker that has at least one group, ordered by marker id.
    pub fn all(&self) -> BTreeMap<MarkerId, Vec<Vec<MarkerId>>> {
        let all: BTreeMap<_, _> = self
            .catalog
            .markers()
            .filter_map(|(marker, _)| {
                let groups = self.for_marker(marker);
                (!groups.is_empty()).then_some((marker, groups))
            })
            .collect();
        log::info!("{} markers are craftable from other markers", all.len());
        all
    }
}

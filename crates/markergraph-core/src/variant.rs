//! Naming-pattern variants and the linker that turns them into additive
//! requirements.
//!
//! A variant pattern says "an entity named `<stem><base_suffix>` has a variant
//! named `<stem><variant_suffix>`, and the variant needs the base". When both
//! entities exist the linker appends the base to every recipe of the variant,
//! or gives the variant a single-material recipe when it has none. Links are
//! AND edges: they never add an alternative recipe.

use crate::catalog::Catalog;
use crate::diagnostic::Diagnostic;
use crate::id::EntityId;
use crate::name::{normalize, normalize_affix};
use crate::policy::ResolverPolicy;
use crate::resolver::Resolver;
use serde::{Deserialize, Serialize};

/// Version of [`VariantTable::standard`]. Bumped whenever the built-in
/// patterns change.
pub const STANDARD_TABLE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A pattern that cannot be used for linking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariantPatternError {
    #[error("variant pattern '{kind}' maps every name onto itself")]
    Identity { kind: String },

    #[error("variant pattern ('{base_suffix}', '{variant_suffix}') has no kind")]
    MissingKind {
        base_suffix: String,
        variant_suffix: String,
    },
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Which side of a matched pair receives the requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkDirection {
    /// The variant needs the base (e.g. a charged weapon needs the uncharged
    /// one).
    #[default]
    VariantRequiresBase,
    /// The base needs the variant.
    BaseRequiresVariant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPattern {
    /// Suffix the base name must end with. Empty matches every name.
    #[serde(default)]
    pub base_suffix: String,
    /// Suffix that replaces `base_suffix` to form the variant name.
    #[serde(default)]
    pub variant_suffix: String,
    pub kind: String,
    #[serde(default)]
    pub direction: LinkDirection,
}

impl VariantPattern {
    pub fn new(base_suffix: &str, variant_suffix: &str, kind: &str) -> Self {
        Self {
            base_suffix: base_suffix.to_string(),
            variant_suffix: variant_suffix.to_string(),
            kind: kind.to_string(),
            direction: LinkDirection::VariantRequiresBase,
        }
    }

    pub fn with_direction(mut self, direction: LinkDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Name of the variant of `base_key`, if the pattern applies to it.
    /// `base_key` must already be normalized.
    pub fn variant_of(&self, base_key: &str) -> Option<String> {
        let base_suffix = normalize_affix(&self.base_suffix);
        let stem = if base_suffix.is_empty() {
            base_key
        } else {
            base_key.strip_suffix(base_suffix.as_str())?
        };
        let candidate = normalize(&format!("{stem}{}", normalize_affix(&self.variant_suffix)));
        (!candidate.is_empty() && candidate != base_key).then_some(candidate)
    }

    pub fn validate(&self) -> Result<(), VariantPatternError> {
        if self.kind.trim().is_empty() {
            return Err(VariantPatternError::MissingKind {
                base_suffix: self.base_suffix.clone(),
                variant_suffix: self.variant_suffix.clone(),
            });
        }
        if normalize_affix(&self.base_suffix) == normalize_affix(&self.variant_suffix) {
            return Err(VariantPatternError::Identity {
                kind: self.kind.clone(),
            });
        }
        Ok(())
    }
}

/// Versioned, ordered list of variant patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantTable {
    pub version: u32,
    pub patterns: Vec<VariantPattern>,
}

impl VariantTable {
    /// Build a table, rejecting unusable patterns.
    pub fn new(version: u32, patterns: Vec<VariantPattern>) -> Result<Self, VariantPatternError> {
        let table = Self { version, patterns };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), VariantPatternError> {
        self.patterns.iter().try_for_each(VariantPattern::validate)
    }

    /// The built-in Old School RuneScape naming conventions.
    pub fn standard() -> Self {
        let p = VariantPattern::new;
        Self {
            version: STANDARD_TABLE_VERSION,
            patterns: vec![
                // "X (uncharged)" -> "X"
                p(" (uncharged)", "", "charged"),
                p(" (u)", "", "charged"),
                p(" (uncharged)", " of the dead", "charged_of_the_dead"),
                // "Black mask (10)" -> "Black mask"
                p(" (10)", "", "degraded"),
                p("", " (l)", "locked"),
                p("", " (locked)", "locked"),
                p("", " (broken)", "broken"),
                p("", " (damaged)", "damaged"),
                p(" (inactive)", "", "active"),
                p("", " (inactive)", "inactive"),
                p(" (empty)", "", "filled"),
                p("", " (s)", "silver"),
                p(" (disassembled)", "", "assembled"),
                // Barrows degradation has no parentheses.
                p("", " 0", "barrows_degraded"),
                p("", " 25", "barrows_degraded"),
                p("", " 50", "barrows_degraded"),
                p("", " 75", "barrows_degraded"),
                p("", " 100", "barrows_degraded"),
            ],
        }
    }
}

impl Default for VariantTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Linker
// ---------------------------------------------------------------------------

/// A requirement injected by the linker: `dependent` additionally needs
/// `base`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantLink {
    pub dependent: String,
    pub base: String,
    pub kind: String,
}

/// Applies a [`VariantTable`] to a catalog.
#[derive(Debug, Clone)]
pub struct VariantLinker {
    table: VariantTable,
    policy: ResolverPolicy,
}

impl VariantLinker {
    pub fn new(table: VariantTable) -> Self {
        Self {
            table,
            policy: ResolverPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ResolverPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn table(&self) -> &VariantTable {
        &self.table
    }

    /// Link variants of every marker, then (if the policy asks for it)
    /// variants of every derived item. Returns the links that changed the
    /// graph, in application order.
    pub fn link(&self, catalog: &mut Catalog) -> Vec<VariantLink> {
        let mut links = Vec::new();

        let markers: Vec<EntityId> = catalog
            .entities()
            .filter(|(_, entity)| entity.is_marker())
            .map(|(id, _)| id)
            .collect();
        for base in markers {
            self.link_base(catalog, base, &mut links);
        }
        let marker_links = links.len();
        log::info!("linked {marker_links} variants of markers");

        if self.policy.link_derived_variants {
            let derived: Vec<EntityId> = {
                let mut resolver = Resolver::with_policy(catalog, self.policy.clone());
                let candidates: Vec<EntityId> = catalog
                    .craftable()
                    .filter(|&id| !catalog.is_marker(id))
                    .collect();
                candidates
                    .into_iter()
                    .filter(|&id| !resolver.resolve_id(id).markers.is_empty())
                    .collect()
            };
            for base in derived {
                self.link_base(catalog, base, &mut links);
            }
            log::info!(
                "linked {} variants of derived items",
                links.len() - marker_links
            );
        }

        links
    }

    fn link_base(&self, catalog: &mut Catalog, base: EntityId, links: &mut Vec<VariantLink>) {
        let base_key = catalog.key(base).to_string();
        for pattern in &self.table.patterns {
            let Some(candidate) = pattern.variant_of(&base_key) else {
                continue;
            };
            let Some(found) = catalog.lookup_key(&candidate) else {
                continue;
            };
            let (dependent, required) = match pattern.direction {
                LinkDirection::VariantRequiresBase => (found, base),
                LinkDirection::BaseRequiresVariant => (base, found),
            };
            let dependent_key = catalog.key(dependent).to_string();
            let required_key = catalog.key(required).to_string();

            if catalog.is_marker(dependent) {
                catalog.diagnostics.record(Diagnostic::VariantDependentIsMarker {
                    dependent: dependent_key,
                    base: required_key,
                });
            } else if catalog.require(dependent, required) {
                log::trace!("'{dependent_key}' now requires '{required_key}' ({})", pattern.kind);
                links.push(VariantLink {
                    dependent: dependent_key,
                    base: required_key,
                    kind: pattern.kind.clone(),
                });
            } else {
                catalog.diagnostics.record(Diagnostic::VariantAlreadyApplied {
                    dependent: dependent_key,
                    base: required_key,
                });
            }
        }
    }
}

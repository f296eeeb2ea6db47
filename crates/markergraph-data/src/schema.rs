//! Serde data file structs for catalog content.
//!
//! These structs define the on-disk format for markers, items, recipes, wiki
//! production records, and manual overrides. They are deserialized from RON,
//! JSON, or TOML data files and then converted into raw core records by the
//! loader.

use serde::Deserialize;

// ===========================================================================
// Identifiers
// ===========================================================================

/// One identifier as written in a data file. Wiki exports often quote
/// numbers, so both forms are accepted. Anything else (null, negative,
/// fractional) is kept as `Invalid` so one bad id never rejects its row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Num(u32),
    Text(String),
    Invalid(serde_json::Value),
}

impl IdValue {
    pub fn parse(&self) -> Result<u32, String> {
        match self {
            IdValue::Num(n) => Ok(*n),
            IdValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("'{s}' is not a numeric identifier")),
            IdValue::Invalid(value) => Err(format!("{value} is not a numeric identifier")),
        }
    }
}

/// A list of identifiers or a single one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdList {
    Many(Vec<IdValue>),
    One(IdValue),
}

impl Default for IdList {
    fn default() -> Self {
        IdList::Many(Vec::new())
    }
}

impl IdList {
    pub fn values(&self) -> &[IdValue] {
        match self {
            IdList::One(v) => std::slice::from_ref(v),
            IdList::Many(vs) => vs.as_slice(),
        }
    }
}

// ===========================================================================
// Markers and items
// ===========================================================================

/// A marker (collection log slot) definition.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkerData {
    pub name: String,
    #[serde(default, alias = "id", alias = "ids")]
    pub identifiers: IdList,
    #[serde(default, alias = "tabs")]
    pub tags: Vec<String>,
}

/// An item index entry: a name and every identifier it is known by.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: String,
    #[serde(default, alias = "id", alias = "ids")]
    pub identifiers: IdList,
}

// ===========================================================================
// Recipes
// ===========================================================================

/// A recipe material, either a bare name or a full entry. Quantities are
/// accepted but do not affect resolution.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MaterialData {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        quantity: Option<u32>,
    },
}

impl MaterialData {
    pub fn name(&self) -> &str {
        match self {
            MaterialData::Name(name) | MaterialData::Full { name, .. } => name.as_str(),
        }
    }
}

/// A recipe in the native format.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub output: String,
    #[serde(default)]
    pub materials: Vec<MaterialData>,
}

// ===========================================================================
// Wiki production records
// ===========================================================================

/// One row of the wiki recipe bucket. The recipe is an embedded JSON
/// document, usually as a string and sometimes already expanded.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductionRecord {
    #[serde(default)]
    pub production_json: Option<serde_json::Value>,
}

/// The embedded production document.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductionData {
    #[serde(default)]
    pub output: Option<ProductionOutput>,
    #[serde(default)]
    pub materials: Vec<ProductionMaterial>,
}

/// The wiki writes an empty string when a production has no output item.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductionOutput {
    Item {
        #[serde(default)]
        name: String,
    },
    Blank(String),
}

impl ProductionOutput {
    pub fn name(&self) -> Option<&str> {
        match self {
            ProductionOutput::Item { name } if !name.trim().is_empty() => Some(name.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductionMaterial {
    #[serde(default)]
    pub name: String,
}

// ===========================================================================
// Manual overrides
// ===========================================================================

/// A hand-written derived item.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideData {
    pub name: String,
    #[serde(default)]
    pub item_ids: Vec<u32>,
    #[serde(default, alias = "clog_dependencies")]
    pub markers: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_list_accepts_single_and_quoted_values() {
        let one: IdList = serde_json::from_str("6573").unwrap();
        assert_eq!(one.values(), &[IdValue::Num(6573)]);

        let many: IdList = serde_json::from_str(r#"[6573, "19529"]"#).unwrap();
        let parsed: Vec<u32> = many.values().iter().map(|v| v.parse().unwrap()).collect();
        assert_eq!(parsed, vec![6573, 19529]);

        assert!(IdValue::Text("onyx".to_string()).parse().is_err());
    }

    #[test]
    fn unusable_ids_are_kept_as_invalid() {
        let null: IdList = serde_json::from_str("null").unwrap();
        assert_eq!(null.values(), &[IdValue::Invalid(serde_json::Value::Null)]);

        let mixed: IdList = serde_json::from_str("[2357, -1, 1.5]").unwrap();
        let parsed: Vec<Result<u32, String>> = mixed.values().iter().map(IdValue::parse).collect();
        assert_eq!(parsed[0], Ok(2357));
        assert_eq!(parsed[1], Err("-1 is not a numeric identifier".to_string()));
        assert!(parsed[2].is_err());
    }

    #[test]
    fn marker_aliases() {
        let marker: MarkerData =
            serde_json::from_str(r#"{"name": "Onyx", "id": 6573, "tabs": ["Other"]}"#).unwrap();
        assert_eq!(marker.identifiers.values(), &[IdValue::Num(6573)]);
        assert_eq!(marker.tags, vec!["Other"]);
    }

    #[test]
    fn materials_short_and_full() {
        let recipe: RecipeData = serde_json::from_str(
            r#"{"output": "Zenyte", "materials": ["Uncut zenyte", {"name": "Chisel", "quantity": 1}]}"#,
        )
        .unwrap();
        let names: Vec<&str> = recipe.materials.iter().map(MaterialData::name).collect();
        assert_eq!(names, vec!["Uncut zenyte", "Chisel"]);
    }

    #[test]
    fn production_output_forms() {
        let data: ProductionData = serde_json::from_str(
            r#"{"output": {"name": "Gold bar", "quantity": "1"}, "materials": [{"name": "Gold ore", "quantity": "1"}]}"#,
        )
        .unwrap();
        assert_eq!(data.output.as_ref().and_then(ProductionOutput::name), Some("Gold bar"));
        assert_eq!(data.materials[0].name, "Gold ore");

        let blank: ProductionData = serde_json::from_str(r#"{"output": "", "materials": []}"#).unwrap();
        assert_eq!(blank.output.as_ref().and_then(ProductionOutput::name), None);
    }

    #[test]
    fn override_accepts_legacy_field_name() {
        let entry: OverrideData = serde_json::from_str(
            r#"{"name": "Blood moon chestplate (used)", "item_ids": [29037], "clog_dependencies": [29022]}"#,
        )
        .unwrap();
        assert_eq!(entry.markers, vec![29022]);
    }

    #[test]
    fn ron_marker() {
        let marker: MarkerData =
            ron::from_str(r#"(name: "Zenyte shard", identifiers: [19529], tags: ["Gauntlet"])"#).unwrap();
        assert_eq!(marker.identifiers.values(), &[IdValue::Num(19529)]);
    }
}

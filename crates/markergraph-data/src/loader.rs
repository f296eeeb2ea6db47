//! Loading pipeline: reads data files from a directory and turns them into
//! core records.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers used by [`load_data_dir`]. Files that cannot be
//! read or parsed are errors; individual entries that make no sense become
//! [`Diagnostic::MalformedRecord`] values and are skipped.

use markergraph_core::variant::VariantPatternError;
use markergraph_core::{
    CatalogSources, DependencyReport, Diagnostic, Diagnostics, ManualDerived, MarkerId, RawItem,
    RawMarker, RawRecipe, ResolverPolicy, VariantTable,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::schema::{
    IdList, ItemData, MarkerData, OverrideData, ProductionData, ProductionRecord, RecipeData,
};

/// Base names of the files [`load_data_dir`] looks for.
pub const MARKERS_FILE: &str = "markers";
pub const RECIPES_FILE: &str = "recipes";
pub const PRODUCTION_FILE: &str = "production";
pub const ITEMS_FILE: &str = "items";
pub const VARIANTS_FILE: &str = "variants";
pub const OVERRIDES_FILE: &str = "overrides";
pub const POLICY_FILE: &str = "policy";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The variant table parsed but contains an unusable pattern.
    #[error("invalid variant table in {file}: {source}")]
    InvalidVariantTable {
        file: PathBuf,
        #[source]
        source: VariantPatternError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file one row at a time. For TOML files, reads
/// the array at the given `toml_key` from a top-level table (a missing key is
/// an empty list). For RON and JSON, the file itself is the list.
///
/// Only a file that is not a list is an error. A row that does not match `T`
/// is recorded as [`Diagnostic::MalformedRecord`] and skipped.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    let rows: Vec<Result<T, String>> = match format {
        Format::Ron => {
            let rows: Vec<ron::Value> = ron::from_str(&content).map_err(|e| parse_error(path, e))?;
            rows.into_iter()
                .map(|row| row.into_rust().map_err(|e| e.to_string()))
                .collect()
        }
        Format::Json => {
            let rows: Vec<serde_json::Value> =
                serde_json::from_str(&content).map_err(|e| parse_error(path, e))?;
            rows.into_iter()
                .map(|row| serde_json::from_value(row).map_err(|e| e.to_string()))
                .collect()
        }
        Format::Toml => {
            let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let rows: Vec<toml::Value> = match table.remove(toml_key) {
                Some(array) => array
                    .try_into()
                    .map_err(|e: toml::de::Error| parse_error(path, e))?,
                None => Vec::new(),
            };
            rows.into_iter()
                .map(|row| row.try_into().map_err(|e: toml::de::Error| e.to_string()))
                .collect()
        }
    };

    let origin = file_label(path);
    let mut list = Vec::with_capacity(rows.len());
    for (row, result) in rows.into_iter().enumerate() {
        match result {
            Ok(value) => list.push(value),
            Err(detail) => malformed(diagnostics, &origin, format!("row {row}: {detail}")),
        }
    }
    Ok(list)
}

// ===========================================================================
// Conversion to core records
// ===========================================================================

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn malformed(diagnostics: &mut Diagnostics, origin: &str, detail: String) {
    diagnostics.record(Diagnostic::MalformedRecord {
        origin: origin.to_string(),
        detail,
    });
}

fn parse_ids(ids: &IdList, owner: &str, origin: &str, diagnostics: &mut Diagnostics) -> Vec<u32> {
    ids.values()
        .iter()
        .filter_map(|value| match value.parse() {
            Ok(id) => Some(id),
            Err(detail) => {
                malformed(diagnostics, origin, format!("'{owner}': {detail}"));
                None
            }
        })
        .collect()
}

fn convert_markers(data: Vec<MarkerData>, origin: &str, diagnostics: &mut Diagnostics) -> Vec<RawMarker> {
    data.into_iter()
        .map(|m| {
            let ids = parse_ids(&m.identifiers, &m.name, origin, diagnostics);
            RawMarker::new(m.name, ids).with_tags(m.tags)
        })
        .collect()
}

fn convert_items(data: Vec<ItemData>, origin: &str, diagnostics: &mut Diagnostics) -> Vec<RawItem> {
    data.into_iter()
        .map(|i| {
            let ids = parse_ids(&i.identifiers, &i.name, origin, diagnostics);
            RawItem::new(i.name, ids)
        })
        .collect()
}

fn convert_recipes(data: Vec<RecipeData>) -> Vec<RawRecipe> {
    data.into_iter()
        .map(|r| RawRecipe::new(r.output, r.materials.iter().map(|m| m.name().to_string())))
        .collect()
}

/// Unpack wiki production rows. Rows without a production document are
/// skipped quietly; documents that do not parse or have no output item are
/// recorded as malformed.
fn convert_production(
    data: Vec<ProductionRecord>,
    origin: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<RawRecipe> {
    let mut recipes = Vec::new();
    for (row, record) in data.into_iter().enumerate() {
        let parsed = match record.production_json {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(json)) if json.trim().is_empty() => None,
            Some(serde_json::Value::String(json)) => Some(serde_json::from_str::<ProductionData>(&json)),
            Some(document @ serde_json::Value::Object(_)) => Some(serde_json::from_value(document)),
            Some(other) => {
                malformed(
                    diagnostics,
                    origin,
                    format!("row {row}: production document is {other}, not an object or string"),
                );
                continue;
            }
        };
        let production = match parsed {
            None => {
                log::trace!("{origin} row {row}: no production document");
                continue;
            }
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                malformed(diagnostics, origin, format!("row {row}: {e}"));
                continue;
            }
        };
        let Some(output) = production.output.as_ref().and_then(|o| o.name()) else {
            malformed(diagnostics, origin, format!("row {row}: production has no output item"));
            continue;
        };
        let materials = production
            .materials
            .iter()
            .map(|m| m.name.clone())
            .filter(|name| !name.trim().is_empty());
        recipes.push(RawRecipe::new(output, materials));
    }
    recipes
}

fn convert_overrides(data: Vec<OverrideData>) -> Vec<ManualDerived> {
    data.into_iter()
        .map(|o| ManualDerived {
            name: o.name,
            item_ids: o.item_ids,
            markers: o.markers.into_iter().map(MarkerId).collect(),
        })
        .collect()
}

// ===========================================================================
// Directory loading
// ===========================================================================

/// Everything read from one data directory.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub sources: CatalogSources,
    pub policy: ResolverPolicy,
}

/// Load a data directory.
///
/// `markers.*` is required, as is at least one of `recipes.*` (native format)
/// and `production.*` (wiki rows). `items.*`, `overrides.*`, `variants.*`, and
/// `policy.*` are optional; without them there is no item index, no
/// overrides, the standard variant table, and the default policy.
pub fn load_data_dir(dir: &Path) -> Result<LoadedData, DataLoadError> {
    let mut diagnostics = Diagnostics::new();

    let markers_path = require_data_file(dir, MARKERS_FILE)?;
    let markers = convert_markers(
        deserialize_list(&markers_path, "markers", &mut diagnostics)?,
        &file_label(&markers_path),
        &mut diagnostics,
    );

    let recipes_path = find_data_file(dir, RECIPES_FILE)?;
    let production_path = find_data_file(dir, PRODUCTION_FILE)?;
    if recipes_path.is_none() && production_path.is_none() {
        return Err(DataLoadError::MissingRequired {
            file: format!("{RECIPES_FILE}' or '{PRODUCTION_FILE}"),
            dir: dir.to_path_buf(),
        });
    }
    let mut recipes = Vec::new();
    if let Some(path) = &recipes_path {
        recipes.extend(convert_recipes(deserialize_list(path, "recipes", &mut diagnostics)?));
    }
    if let Some(path) = &production_path {
        recipes.extend(convert_production(
            deserialize_list(path, "production", &mut diagnostics)?,
            &file_label(path),
            &mut diagnostics,
        ));
    }

    let items = match find_data_file(dir, ITEMS_FILE)? {
        Some(path) => {
            let rows = deserialize_list(&path, "items", &mut diagnostics)?;
            convert_items(rows, &file_label(&path), &mut diagnostics)
        }
        None => Vec::new(),
    };

    let overrides = match find_data_file(dir, OVERRIDES_FILE)? {
        Some(path) => convert_overrides(deserialize_list(&path, "overrides", &mut diagnostics)?),
        None => Vec::new(),
    };

    let variants = match find_data_file(dir, VARIANTS_FILE)? {
        Some(path) => {
            let table: VariantTable = deserialize_file(&path)?;
            table
                .validate()
                .map_err(|source| DataLoadError::InvalidVariantTable { file: path, source })?;
            table
        }
        None => VariantTable::standard(),
    };

    let policy = match find_data_file(dir, POLICY_FILE)? {
        Some(path) => deserialize_file(&path)?,
        None => ResolverPolicy::default(),
    };

    log::info!(
        "loaded {} markers, {} recipes, {} items, {} overrides from {}",
        markers.len(),
        recipes.len(),
        items.len(),
        overrides.len(),
        dir.display()
    );

    Ok(LoadedData {
        sources: CatalogSources {
            markers,
            recipes,
            items,
            overrides,
            variants,
            diagnostics: diagnostics.into_vec(),
        },
        policy,
    })
}

/// Load a data directory and run the full pipeline with the policy found
/// there.
pub fn generate_report(dir: &Path) -> Result<DependencyReport, DataLoadError> {
    let LoadedData { sources, policy } = load_data_dir(dir)?;
    Ok(DependencyReport::generate(sources, &policy))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use markergraph_core::policy::LeafPolicy;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "markergraph_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("markers.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("markers.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("markers.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        assert!(matches!(
            detect_format(Path::new("markers.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("markers")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // find_data_file / require_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn find_data_file_found_and_missing() {
        let dir = make_test_dir("find");
        fs::write(dir.join("markers.json"), "[]").unwrap();

        assert_eq!(find_data_file(&dir, "markers").unwrap(), Some(dir.join("markers.json")));
        assert_eq!(find_data_file(&dir, "items").unwrap(), None);

        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("conflict");
        fs::write(dir.join("markers.ron"), "[]").unwrap();
        fs::write(dir.join("markers.json"), "[]").unwrap();

        assert!(matches!(
            find_data_file(&dir, "markers"),
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn require_data_file_missing() {
        let dir = make_test_dir("require");

        let err = require_data_file(&dir, "markers").unwrap_err();
        assert!(matches!(err, DataLoadError::MissingRequired { ref file, .. } if file == "markers"));
        assert!(err.to_string().contains("markers"));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // deserialize_list
    // -----------------------------------------------------------------------

    #[test]
    fn toml_list_under_key() {
        let dir = make_test_dir("toml_list");
        let path = dir.join("markers.toml");
        fs::write(
            &path,
            r#"
[[markers]]
name = "Onyx"
identifiers = [6573]
tags = ["Other"]
"#,
        )
        .unwrap();

        let mut diagnostics = Diagnostics::new();
        let markers: Vec<MarkerData> = deserialize_list(&path, "markers", &mut diagnostics).unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].name, "Onyx");

        let empty: Vec<MarkerData> = deserialize_list(&path, "other", &mut diagnostics).unwrap();
        assert!(empty.is_empty());
        assert!(diagnostics.is_empty());

        cleanup(&dir);
    }

    #[test]
    fn parse_error_names_file() {
        let dir = make_test_dir("parse_error");
        let path = dir.join("markers.json");
        fs::write(&path, "[{").unwrap();

        let err = deserialize_list::<MarkerData>(&path, "markers", &mut Diagnostics::new()).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { .. }));
        assert!(err.to_string().contains("markers.json"));

        cleanup(&dir);
    }

    #[test]
    fn bad_rows_are_skipped_not_fatal() {
        let dir = make_test_dir("bad_rows");
        let json = dir.join("items.json");
        fs::write(
            &json,
            r#"[
                {"name": "Gold ore", "id": 444},
                {"id": 2357},
                "Gold bar",
                {"name": "Iron ore", "id": 440}
            ]"#,
        )
        .unwrap();
        let mut diagnostics = Diagnostics::new();
        let items: Vec<ItemData> = deserialize_list(&json, "items", &mut diagnostics).unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Gold ore", "Iron ore"]);
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(
            &diagnostics.as_slice()[0],
            Diagnostic::MalformedRecord { origin, detail } if origin == "items.json" && detail.contains("row 1")
        ));

        let toml_path = dir.join("markers.toml");
        fs::write(
            &toml_path,
            r#"
[[markers]]
identifiers = [6573]

[[markers]]
name = "Onyx"
identifiers = [6573]
"#,
        )
        .unwrap();
        let mut diagnostics = Diagnostics::new();
        let markers: Vec<MarkerData> = deserialize_list(&toml_path, "markers", &mut diagnostics).unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(diagnostics.len(), 1);

        let ron_path = dir.join("recipes.ron");
        fs::write(
            &ron_path,
            r#"[(materials: ["Gold ore"]), (output: "Gold bar", materials: ["Gold ore"])]"#,
        )
        .unwrap();
        let mut diagnostics = Diagnostics::new();
        let recipes: Vec<RecipeData> = deserialize_list(&ron_path, "recipes", &mut diagnostics).unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].output, "Gold bar");
        assert_eq!(diagnostics.len(), 1);

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_data_dir
    // -----------------------------------------------------------------------

    #[test]
    fn load_minimal_json_dir() {
        let dir = make_test_dir("minimal");
        fs::write(dir.join("markers.json"), r#"[{"name": "Onyx", "id": "6573"}]"#).unwrap();
        fs::write(
            dir.join("recipes.json"),
            r#"[{"output": "Onyx amulet (u)", "materials": ["Onyx", "Gold bar"]}]"#,
        )
        .unwrap();

        let loaded = load_data_dir(&dir).unwrap();
        assert_eq!(loaded.sources.markers[0].identifiers, vec![6573]);
        assert_eq!(loaded.sources.recipes.len(), 1);
        assert!(loaded.sources.items.is_empty());
        assert_eq!(loaded.sources.variants, VariantTable::standard());
        assert_eq!(loaded.policy, ResolverPolicy::default());
        assert!(loaded.sources.diagnostics.is_empty());

        cleanup(&dir);
    }

    #[test]
    fn load_requires_some_recipes() {
        let dir = make_test_dir("no_recipes");
        fs::write(dir.join("markers.json"), "[]").unwrap();

        let err = load_data_dir(&dir).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingRequired { .. }));
        assert!(err.to_string().contains("production"));

        cleanup(&dir);
    }

    #[test]
    fn load_requires_markers() {
        let dir = make_test_dir("no_markers");
        fs::write(dir.join("recipes.json"), "[]").unwrap();

        assert!(matches!(
            load_data_dir(&dir),
            Err(DataLoadError::MissingRequired { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn bad_identifiers_become_diagnostics() {
        let dir = make_test_dir("bad_ids");
        fs::write(
            dir.join("markers.json"),
            r#"[{"name": "Onyx", "ids": [6573, "six"]}]"#,
        )
        .unwrap();
        fs::write(dir.join("recipes.json"), "[]").unwrap();

        let loaded = load_data_dir(&dir).unwrap();
        assert_eq!(loaded.sources.markers[0].identifiers, vec![6573]);
        assert!(matches!(
            loaded.sources.diagnostics.as_slice(),
            [Diagnostic::MalformedRecord { origin, .. }] if origin == "markers.json"
        ));

        cleanup(&dir);
    }

    #[test]
    fn null_negative_and_nameless_entries_load_around() {
        let dir = make_test_dir("lenient_items");
        fs::write(dir.join("markers.json"), r#"[{"name": "Onyx", "id": 6573}, {"name": "Zenyte shard", "id": null}]"#).unwrap();
        fs::write(dir.join("recipes.json"), "[]").unwrap();
        fs::write(
            dir.join("items.json"),
            r#"[
                {"name": "Gold ore", "id": 444},
                {"name": "Gold bar", "id": null},
                {"name": "Gold ring", "ids": [1635, -1]},
                {"id": 2357}
            ]"#,
        )
        .unwrap();

        let loaded = load_data_dir(&dir).unwrap();
        let items: Vec<(&str, Vec<u32>)> = loaded
            .sources
            .items
            .iter()
            .map(|i| (i.name.as_str(), i.identifiers.clone()))
            .collect();
        assert_eq!(
            items,
            vec![
                ("Gold ore", vec![444]),
                ("Gold bar", vec![]),
                ("Gold ring", vec![1635]),
            ]
        );
        assert_eq!(loaded.sources.markers.len(), 2);
        assert!(loaded.sources.markers[1].identifiers.is_empty());

        // Null marker id, null item id, negative item id, nameless item row.
        assert_eq!(loaded.sources.diagnostics.len(), 4);
        assert!(
            loaded
                .sources
                .diagnostics
                .iter()
                .all(|d| matches!(d, Diagnostic::MalformedRecord { .. }))
        );

        // The run still completes; the id-less marker is reported, not fatal.
        let report = generate_report(&dir).unwrap();
        assert_eq!(report.stats.total_markers, 1);

        cleanup(&dir);
    }

    #[test]
    fn production_documents_as_objects_or_strings() {
        let dir = make_test_dir("production_forms");
        fs::write(dir.join("markers.json"), "[]").unwrap();
        let rows = serde_json::json!([
            { "production_json": {"output": {"name": "Iron bar"}, "materials": [{"name": "Iron ore"}]} },
            { "production_json": 42 },
            { "production_json": null },
            { "production_json": r#"{"output": {"name": "Gold bar"}, "materials": [{"name": "Gold ore"}]}"# }
        ]);
        fs::write(dir.join("production.json"), rows.to_string()).unwrap();

        let loaded = load_data_dir(&dir).unwrap();
        assert_eq!(
            loaded.sources.recipes,
            vec![
                RawRecipe::new("Iron bar", ["Iron ore"]),
                RawRecipe::new("Gold bar", ["Gold ore"]),
            ]
        );
        assert!(matches!(
            loaded.sources.diagnostics.as_slice(),
            [Diagnostic::MalformedRecord { detail, .. }] if detail.contains("row 1")
        ));

        cleanup(&dir);
    }

    #[test]
    fn production_rows_are_unpacked() {
        let dir = make_test_dir("production");
        fs::write(dir.join("markers.json"), "[]").unwrap();
        let rows = serde_json::json!([
            { "production_json": r#"{"output": {"name": "Gold bar"}, "materials": [{"name": "Gold ore"}, {"name": ""}]}"# },
            { "production_json": r#"{"output": "", "materials": [{"name": "Gold ore"}]}"# },
            { "production_json": "{not json" },
            { "production_json": "" },
            { "uses_material": "Gold ore" }
        ]);
        fs::write(dir.join("production.json"), rows.to_string()).unwrap();

        let loaded = load_data_dir(&dir).unwrap();
        assert_eq!(loaded.sources.recipes, vec![RawRecipe::new("Gold bar", ["Gold ore"])]);
        assert_eq!(loaded.sources.diagnostics.len(), 2);

        cleanup(&dir);
    }

    #[test]
    fn optional_files_are_read() {
        let dir = make_test_dir("optional");
        fs::write(dir.join("markers.ron"), r#"[(name: "Fire cape", identifiers: [6570])]"#).unwrap();
        fs::write(dir.join("recipes.ron"), r#"[(output: "Infernal cape", materials: ["Fire cape"])]"#).unwrap();
        fs::write(dir.join("items.ron"), r#"[(name: "Fire cape", identifiers: [6570, 10566])]"#).unwrap();
        fs::write(dir.join("policy.toml"), "leaf = \"block_unresolved\"\n").unwrap();
        fs::write(
            dir.join("variants.toml"),
            r#"
version = 3

[[patterns]]
variant_suffix = " (l)"
kind = "locked"
"#,
        )
        .unwrap();
        fs::write(
            dir.join("overrides.json"),
            r#"[{"name": "Fire cape (broken)", "item_ids": [20445], "clog_dependencies": [6570]}]"#,
        )
        .unwrap();

        let loaded = load_data_dir(&dir).unwrap();
        assert_eq!(loaded.policy.leaf, LeafPolicy::BlockUnresolved);
        assert_eq!(loaded.sources.variants.version, 3);
        assert_eq!(loaded.sources.variants.patterns.len(), 1);
        assert_eq!(loaded.sources.items[0].identifiers, vec![6570, 10566]);
        assert_eq!(loaded.sources.overrides[0].markers, vec![MarkerId(6570)]);

        cleanup(&dir);
    }

    #[test]
    fn invalid_variant_table_is_an_error() {
        let dir = make_test_dir("bad_variants");
        fs::write(dir.join("markers.json"), "[]").unwrap();
        fs::write(dir.join("recipes.json"), "[]").unwrap();
        fs::write(
            dir.join("variants.json"),
            r#"{"version": 2, "patterns": [{"base_suffix": " (l)", "variant_suffix": " (l)", "kind": "locked"}]}"#,
        )
        .unwrap();

        assert!(matches!(
            load_data_dir(&dir),
            Err(DataLoadError::InvalidVariantTable { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn generate_report_from_dir() {
        let dir = make_test_dir("report");
        fs::write(
            dir.join("markers.json"),
            r#"[{"name": "Onyx", "id": 6573}, {"name": "Zenyte shard", "id": 19529}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("recipes.json"),
            r#"[{"output": "Uncut zenyte", "materials": ["Onyx", "Zenyte shard"]}]"#,
        )
        .unwrap();
        fs::write(dir.join("items.json"), r#"[{"name": "Uncut zenyte", "id": 19496}]"#).unwrap();

        let report = generate_report(&dir).unwrap();
        assert_eq!(
            report.derived["uncut zenyte"].markers,
            vec![MarkerId(6573), MarkerId(19529)]
        );

        cleanup(&dir);
    }
}

use crate::technique::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_technique_defaults() {
    let jab = Technique::new("Jab", "jab.mp3", Category::Punches);

    assert!(jab.selected);
    assert_eq!(jab.weight, 1.0);
    assert_eq!(jab.priority, Priority::Medium);
    assert!(jab.level.is_none());
}

#[test]
fn test_category_serde_labels() {
    let json = serde_json::to_string(&Category::DefensesGrabs).unwrap();
    assert_eq!(json, "\"Defenses/Grabs\"");

    let grip: Category = serde_json::from_str("\"Hand-Grip\"").unwrap();
    assert_eq!(grip, Category::HandGrip);

    for category in Category::ALL {
        let encoded = serde_json::to_string(&category).unwrap();
        assert_eq!(encoded, format!("\"{}\"", category.label()));
    }
}

#[test]
fn test_static_catalog_filters_selected() {
    let mut catalog = StaticCatalog::new(vec![
        Technique::new("Jab", "jab.mp3", Category::Punches),
        Technique::new("Cross", "cross.mp3", Category::Punches).deselected(),
        Technique::new("Front kick", "front_kick.mp3", Category::Kicks),
    ]);

    let names: Vec<String> = catalog
        .selected_techniques()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Jab", "Front kick"]);

    assert_eq!(catalog.set_selected("Jab", false), 1);
    assert_eq!(catalog.selected_techniques().len(), 1);
    assert_eq!(catalog.techniques().len(), 3);
}

#[test]
fn test_file_catalog_toml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("techniques.toml");
    fs::write(
        &path,
        r#"
[[techniques]]
name = "Jab"
audio = "jab.mp3"
category = "Punches"
weight = 2.0
priority = "high"
level = "high"
side = "left"

[[techniques]]
name = "Knee to body"
audio = "knee.mp3"
category = "Knees"
selected = false
"#,
    )
    .unwrap();

    let catalog = FileCatalog::load(&path).unwrap();
    let all = catalog.techniques();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].weight, 2.0);
    assert_eq!(all[0].priority, Priority::High);
    assert_eq!(all[0].side, Some(Side::Left));
    assert_eq!(all[1].weight, 1.0);

    let selected = catalog.selected_techniques();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].name, "Jab");
}

#[test]
fn test_file_catalog_json_array_and_document() {
    let temp_dir = TempDir::new().unwrap();

    let array_path = temp_dir.path().join("array.json");
    fs::write(
        &array_path,
        r#"[{"name":"Elbow","audio":"elbow.mp3","category":"Strikes"}]"#,
    )
    .unwrap();
    assert_eq!(FileCatalog::load(&array_path).unwrap().techniques().len(), 1);

    let doc_path = temp_dir.path().join("doc.json");
    fs::write(
        &doc_path,
        r#"{"techniques":[{"name":"Knife threat","audio":"knife.mp3","category":"Knife"}]}"#,
    )
    .unwrap();
    let catalog = FileCatalog::load(&doc_path).unwrap();
    assert_eq!(catalog.techniques()[0].category, Category::Knife);
}

#[test]
fn test_file_catalog_errors() {
    let temp_dir = TempDir::new().unwrap();

    let missing = FileCatalog::load(temp_dir.path().join("missing.toml"));
    assert!(matches!(missing, Err(CatalogError::Io { .. })));

    let yaml = temp_dir.path().join("techniques.yaml");
    fs::write(&yaml, "techniques: []").unwrap();
    assert!(matches!(
        FileCatalog::load(&yaml),
        Err(CatalogError::UnsupportedFormat(_))
    ));

    let broken = temp_dir.path().join("broken.toml");
    fs::write(&broken, "[[techniques]]\nname = 3").unwrap();
    assert!(matches!(
        FileCatalog::load(&broken),
        Err(CatalogError::Parse { .. })
    ));
}

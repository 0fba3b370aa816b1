//! Version-store and extension-build scenarios over a seeded project tree.

use std::{fs, path::Path};

use plume_build_core::{
    BuildConfig, Error, ReleaseContext, VersionStore, build_extensions,
};

fn touch(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn test_config() -> BuildConfig {
    BuildConfig {
        copy_dirs: vec!["client/css".into(), "client/fonts".into()],
        copy_files: vec!["index.html".into(), "version.json".into(), "help.json".into()],
        ..BuildConfig::default()
    }
}

fn seed_project(root: &Path) {
    touch(
        &root.join("version.json"),
        concat!(
            "{\n",
            "    \"version\": \"1.2.0\",\n",
            "    \"changelog\": {\n",
            "        \"1.2.0\": {\n",
            "            \"date\": \"2025-05-01\",\n",
            "            \"changes\": {\n",
            "                \"zh\": [\"初版\"],\n",
            "                \"en\": [\"Initial release\"]\n",
            "            }\n",
            "        }\n",
            "    }\n",
            "}\n",
        ),
    );
    touch(&root.join("README.md"), "# 羽笺 (v1.2.0)\n\n一个网页阅读器。\n");
    touch(&root.join("README_EN.md"), "# PlumeReader (v1.2.0)\n\nA web reader.\n");
    touch(&root.join("help.json"), r#"{"tips": ["打开书籍"]}"#);
    touch(&root.join("index.html"), "<html></html>");
    touch(
        &root.join("client/manifests/Chrome/manifest.json"),
        r#"{"name": "Plume Reader", "version": "1.2.0"}"#,
    );
    touch(
        &root.join("client/manifests/Firefox/manifest.json"),
        r#"{"name": "Plume Reader", "version": "1.2.0"}"#,
    );
    touch(&root.join("client/css/variables.css"), ":root { --serif: '羽笺'; }");
    touch(&root.join("client/fonts/local-wenkai.css"), "@font-face{}");
}

#[test]
fn current_version_comes_from_the_version_document() {
    let dir = tempfile::tempdir().unwrap();
    seed_project(dir.path());

    let config = test_config();
    let store = VersionStore::new(dir.path(), &config);
    assert_eq!(store.current().unwrap().as_deref(), Some("1.2.0"));
}

#[test]
fn current_version_falls_back_to_agreeing_manifests() {
    let dir = tempfile::tempdir().unwrap();
    seed_project(dir.path());
    fs::remove_file(dir.path().join("version.json")).unwrap();

    let config = test_config();
    let store = VersionStore::new(dir.path(), &config);
    assert_eq!(store.current().unwrap().as_deref(), Some("1.2.0"));
}

#[test]
fn disagreeing_manifests_are_a_consistency_error() {
    let dir = tempfile::tempdir().unwrap();
    seed_project(dir.path());
    fs::remove_file(dir.path().join("version.json")).unwrap();
    touch(
        &dir.path().join("client/manifests/Firefox/manifest.json"),
        r#"{"name": "Plume Reader", "version": "1.0.1"}"#,
    );
    touch(
        &dir.path().join("client/manifests/Chrome/manifest.json"),
        r#"{"name": "Plume Reader", "version": "1.0.0"}"#,
    );

    let config = test_config();
    let store = VersionStore::new(dir.path(), &config);
    assert!(matches!(store.current().unwrap_err(), Error::Consistency(_)));
}

#[test]
fn setting_a_new_version_adds_a_dated_empty_entry_sorted_first() {
    let dir = tempfile::tempdir().unwrap();
    seed_project(dir.path());

    let config = test_config();
    VersionStore::new(dir.path(), &config).set("1.3.0").unwrap();

    let text = fs::read_to_string(dir.path().join("version.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["version"], "1.3.0");

    let changelog = doc["changelog"].as_object().unwrap();
    let keys: Vec<&String> = changelog.keys().collect();
    assert_eq!(keys, ["1.3.0", "1.2.0"]);

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    assert_eq!(doc["changelog"]["1.3.0"]["date"], today.as_str());
    assert_eq!(doc["changelog"]["1.3.0"]["changes"]["zh"], serde_json::json!([]));
    assert_eq!(doc["changelog"]["1.3.0"]["changes"]["en"], serde_json::json!([]));
}

#[test]
fn setting_an_existing_version_preserves_recorded_changes() {
    let dir = tempfile::tempdir().unwrap();
    seed_project(dir.path());

    let config = test_config();
    VersionStore::new(dir.path(), &config).set("1.2.0").unwrap();

    let text = fs::read_to_string(dir.path().join("version.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["changelog"]["1.2.0"]["date"], "2025-05-01");
    assert_eq!(doc["changelog"]["1.2.0"]["changes"]["zh"], serde_json::json!(["初版"]));
    assert_eq!(
        doc["changelog"]["1.2.0"]["changes"]["en"],
        serde_json::json!(["Initial release"])
    );
}

#[test]
fn setting_a_version_backfills_missing_entry_fields() {
    let dir = tempfile::tempdir().unwrap();
    seed_project(dir.path());
    touch(
        &dir.path().join("version.json"),
        r#"{"version": "1.2.0", "changelog": {"1.2.0": {}}}"#,
    );

    let config = test_config();
    VersionStore::new(dir.path(), &config).set("1.2.0").unwrap();

    let text = fs::read_to_string(dir.path().join("version.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    assert_eq!(doc["changelog"]["1.2.0"]["date"], today.as_str());
    assert_eq!(doc["changelog"]["1.2.0"]["changes"]["zh"], serde_json::json!([]));
    assert_eq!(doc["changelog"]["1.2.0"]["changes"]["en"], serde_json::json!([]));
}

#[test]
fn setting_a_version_restamps_the_readmes() {
    let dir = tempfile::tempdir().unwrap();
    seed_project(dir.path());

    let config = test_config();
    VersionStore::new(dir.path(), &config).set("1.3.0").unwrap();

    let zh = fs::read_to_string(dir.path().join("README.md")).unwrap();
    assert!(zh.contains("羽笺 (v1.3.0)"), "zh README not restamped: {zh}");
    assert!(!zh.contains("1.2.0"));

    let en = fs::read_to_string(dir.path().join("README_EN.md")).unwrap();
    assert!(en.contains("PlumeReader (v1.3.0)"), "en README not restamped: {en}");
}

#[test]
fn rejects_a_malformed_version() {
    let dir = tempfile::tempdir().unwrap();
    seed_project(dir.path());

    let config = test_config();
    let err = VersionStore::new(dir.path(), &config).set("1.2.x").unwrap_err();
    assert!(matches!(err, Error::Format(_)));
}

#[test]
fn build_extensions_syncs_manifests_and_archives_each_target() {
    let dir = tempfile::tempdir().unwrap();
    seed_project(dir.path());

    let ctx = ReleaseContext {
        root: dir.path().to_path_buf(),
        config: test_config(),
        version: "1.3.0".to_string(),
    };
    build_extensions(&ctx).unwrap();

    for browser in ["Chrome", "Firefox"] {
        let manifest = fs::read_to_string(
            dir.path().join("client/manifests").join(browser).join("manifest.json"),
        )
        .unwrap();
        let doc: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(doc["version"], "1.3.0");

        assert!(dir.path().join(format!("dist/{browser}.zip")).exists());
        assert!(dir.path().join(format!("dist/{browser}/manifest.json")).exists());
        assert!(dir.path().join(format!("dist/{browser}/index.html")).exists());
    }
}

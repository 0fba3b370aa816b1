//! Per-target manifest synchronization.

use std::{fs, path::Path};

use serde::Serialize;

use crate::error::{Error, Result};

/// Overwrite the `version` field of a browser target's manifest.json,
/// leaving every other key (and their order) untouched. A missing manifest
/// is fatal for that target's build.
pub fn sync_manifest(path: &Path, version: &str) -> Result<()> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let mut doc: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| Error::json(path, e))?;

    let Some(object) = doc.as_object_mut() else {
        return Err(Error::Format(format!("{}: manifest is not a JSON object", path.display())));
    };
    object.insert("version".to_string(), serde_json::Value::String(version.to_string()));

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut serializer).map_err(|e| Error::json(path, e))?;
    fs::write(path, buf).map_err(|e| Error::io(path, e))
}

/// Read the `version` field out of a manifest.json.
pub fn read_manifest_version(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let doc: serde_json::Value = serde_json::from_str(&text).map_err(|e| Error::json(path, e))?;
    doc.get("version")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            Error::Format(format!("{}: manifest has no \"version\" field", path.display()))
        })
}

//! Version document handling.
//!
//! The version document (`version.json`) holds the current version and a
//! per-version changelog. Setting a version rewrites the document in place
//! (creating or backfilling the changelog entry, then re-sorting descending)
//! and restamps the ` (vX.Y.Z)` suffix in the configured README files.

use std::{fmt, fs, path::{Path, PathBuf}, str::FromStr};

use chrono::Local;
use indexmap::IndexMap;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    config::BuildConfig,
    error::{Error, Result},
    manifest::read_manifest_version,
};

/// A dotted numeric version (`1.4.7`), ordered by pointwise numeric
/// comparison of its components, so `1.10.0` sorts above `1.9.0`.
///
/// Versions with differing component counts compare lexicographically
/// (`1.2` below `1.2.0`); no normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(Vec<u64>);

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let components = s
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(Error::Format(s.to_string()));
                }
                part.parse::<u64>().map_err(|_| Error::Format(s.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(components))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Validate a version string, returning it unchanged.
pub fn validate_version(s: &str) -> Result<&str> {
    s.parse::<Version>()?;
    Ok(s)
}

/// Per-locale change description lists. Both locales are always present
/// after a set-version pass, possibly empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeLists {
    #[serde(default)]
    pub zh: Vec<String>,
    #[serde(default)]
    pub en: Vec<String>,
}

/// One changelog entry, keyed by version in [`VersionDocument::changelog`].
/// Fields beyond `date` and `changes` round-trip untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangelogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(
        default,
        deserialize_with = "changes_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub changes: Option<ChangeLists>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

/// A `changes` value that is not an object is treated as absent, so the
/// backfill pass rebuilds it with empty locale lists.
fn changes_or_absent<'de, D>(deserializer: D) -> std::result::Result<Option<ChangeLists>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// The on-disk version document. Keys other than `version` and `changelog`
/// round-trip untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDocument {
    pub version: String,
    #[serde(default)]
    pub changelog: IndexMap<String, ChangelogEntry>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

/// Reads and updates the version document and the version stamps in
/// documentation files.
pub struct VersionStore<'a> {
    root: &'a Path,
    config: &'a BuildConfig,
}

impl<'a> VersionStore<'a> {
    pub fn new(root: &'a Path, config: &'a BuildConfig) -> Self {
        Self { root, config }
    }

    fn version_path(&self) -> PathBuf {
        self.root.join(&self.config.version_file)
    }

    /// Current version: from the version document if present, otherwise
    /// from the target manifests, which must agree pairwise.
    pub fn current(&self) -> Result<Option<String>> {
        let path = self.version_path();
        if path.exists() {
            return Ok(Some(self.load()?.version));
        }

        if self.config.browsers.is_empty() {
            return Ok(None);
        }

        let mut versions = Vec::new();
        for browser in &self.config.browsers {
            let manifest = self.config.manifest_path(self.root, browser);
            versions.push((browser.clone(), read_manifest_version(&manifest)?));
        }

        let (_, first) = &versions[0];
        if versions.iter().any(|(_, v)| v != first) {
            let listing: Vec<String> =
                versions.iter().map(|(b, v)| format!("{b}={v}")).collect();
            return Err(Error::Consistency(listing.join(", ")));
        }
        Ok(Some(first.clone()))
    }

    /// Set the version: update the version document (changelog entry
    /// created or backfilled, changelog re-sorted descending) and restamp
    /// the README files.
    pub fn set(&self, version: &str) -> Result<()> {
        validate_version(version)?;

        let path = self.version_path();
        let mut doc = self.load()?;
        doc.version = version.to_string();

        let today = Local::now().format("%Y-%m-%d").to_string();
        let entry = doc.changelog.entry(version.to_string()).or_default();
        entry.date.get_or_insert(today);
        entry.changes.get_or_insert_default();

        sort_changelog(&mut doc.changelog)?;
        self.save(&path, &doc)?;
        self.stamp_readmes(version)
    }

    fn load(&self) -> Result<VersionDocument> {
        let path = self.version_path();
        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        serde_json::from_str(&text).map_err(|e| Error::json(&path, e))
    }

    fn save(&self, path: &Path, doc: &VersionDocument) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        doc.serialize(&mut serializer).map_err(|e| Error::json(path, e))?;
        buf.push(b'\n');
        fs::write(path, buf).map_err(|e| Error::io(path, e))
    }

    fn stamp_readmes(&self, version: &str) -> Result<()> {
        for stamp in &self.config.readme_stamps {
            let path = self.root.join(&stamp.file);
            if !path.exists() {
                continue;
            }

            let pattern = format!(r"{} \(v[\d.]+\)", regex::escape(&stamp.product));
            let re = Regex::new(&pattern)
                .map_err(|e| Error::Format(format!("README version pattern: {e}")))?;
            let replacement = format!("{} (v{})", stamp.product, version);

            let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            let updated = re.replace_all(&content, NoExpand(&replacement));
            fs::write(&path, updated.as_bytes()).map_err(|e| Error::io(&path, e))?;
        }
        Ok(())
    }
}

/// Sort the changelog descending by numeric version order. Every key must
/// be a valid version.
fn sort_changelog(changelog: &mut IndexMap<String, ChangelogEntry>) -> Result<()> {
    let mut entries: Vec<(Version, String, ChangelogEntry)> = std::mem::take(changelog)
        .into_iter()
        .map(|(key, entry)| Ok((key.parse()?, key, entry)))
        .collect::<Result<_>>()?;
    entries.sort_by(|a, b| b.0.cmp(&a.0));
    *changelog = entries.into_iter().map(|(_, key, entry)| (key, entry)).collect();
    Ok(())
}

//! Character collection for derived-mode subsetting.

use std::{collections::BTreeSet, fs, path::Path};

use anyhow::{Context, Result, bail};

/// Distinct characters appearing in the given files, sorted. Every listed
/// file must exist.
pub fn collect_chars<P: AsRef<Path>>(files: &[P]) -> Result<String> {
    let mut chars = BTreeSet::new();

    for file in files {
        let path = file.as_ref();
        if !path.exists() {
            bail!("file does not exist: {}", path.display());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        chars.extend(content.chars());
    }

    Ok(chars.into_iter().collect())
}

/// Sorted, deduplicated form of an explicit character set.
pub fn dedup_chars(chars: &str) -> String {
    chars.chars().collect::<BTreeSet<_>>().into_iter().collect()
}

//! Font name table inspection.

use std::{collections::BTreeSet, fs, path::Path};

use anyhow::{Context, Result};
use read_fonts::{FontRef, TableProvider};

/// One decoded name-table record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NameEntry {
    pub name_id: u16,
    pub platform_id: u16,
    pub language_id: u16,
    pub value: String,
}

/// Decoded name records of a font, deduplicated and in table order of IDs.
pub fn name_entries(data: &[u8]) -> Result<Vec<NameEntry>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let name = font.name().context("font has no name table")?;

    let mut entries = BTreeSet::new();
    for record in name.name_record() {
        let value = match record.string(name.string_data()) {
            Ok(s) => s.chars().collect::<String>(),
            Err(_) => continue,
        };
        entries.insert(NameEntry {
            name_id: record.name_id().to_u16(),
            platform_id: record.platform_id(),
            language_id: record.language_id(),
            value,
        });
    }

    Ok(entries.into_iter().collect())
}

/// Print every name record of a font file.
pub fn print_names(path: &Path) -> Result<()> {
    let data =
        fs::read(path).with_context(|| format!("Failed to read font: {}", path.display()))?;

    println!("\nFont file: {}", path.display());
    for entry in name_entries(&data)? {
        println!(
            "NameID={}, LangID={:#x}, PlatformID={}: {}",
            entry.name_id, entry.language_id, entry.platform_id, entry.value
        );
    }
    println!("------");
    Ok(())
}

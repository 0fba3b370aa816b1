//! Character-set font subsetting around hb-subset.
//!
//! The web reader ships fonts trimmed to the characters its own UI text
//! actually uses. [`charset`] collects that character set from project
//! files, [`Subsetter`] drives hb-subset over bare sfnt data (harfbuzz
//! closes the glyph set over composite and ligature references), and
//! [`container`] round-trips WOFF/WOFF2 containers through the external
//! woff tools.
//!
//! # Example
//!
//! ```no_run
//! use plume_font_subset::Subsetter;
//!
//! let font_data: &[u8] = &[];
//! let subset = Subsetter::new()
//!     .with_chars("羽笺".chars())
//!     .retain_glyph_names(true)
//!     .subset(font_data);
//! ```

pub mod charset;
pub mod container;
pub mod coverage;
pub mod names;

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use hb_subset::{Blob, FontFace, SubsetInput};
use log::info;

use crate::container::Flavor;

/// Font subsetter with builder pattern.
#[derive(Default)]
pub struct Subsetter {
    chars: Vec<char>,
    retain_glyph_names: bool,
}

impl Subsetter {
    /// Creates a new subsetter with an empty character set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds characters the subset must retain. Glyphs those characters
    /// reach through composition or ligatures are retained transitively.
    pub fn with_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.chars.extend(chars);
        self
    }

    /// Sets whether to retain glyph names in the subset.
    pub fn retain_glyph_names(mut self, retain: bool) -> Self {
        self.retain_glyph_names = retain;
        self
    }

    /// Subsets bare sfnt font data. The input must carry a character map.
    pub fn subset(&self, data: &[u8]) -> Result<Vec<u8>> {
        if !coverage::has_cmap(data) {
            bail!("font has no character-to-glyph mapping (cmap) table");
        }

        let mut subset_input = SubsetInput::new()?;

        if self.retain_glyph_names {
            subset_input.flags().retain_glyph_names();
        }

        {
            let mut unicode_set = subset_input.unicode_set();
            for c in &self.chars {
                unicode_set.insert(*c);
            }
        }

        let font = FontFace::new(Blob::from_bytes(data)?)?;
        let subset_font = subset_input.subset_font(&font)?;
        Ok(subset_font.underlying_blob().to_vec())
    }
}

/// Subsets a font file to the given characters, preserving the container
/// format implied by each path's extension.
pub fn subset_file(input: &Path, output: &Path, chars: &str) -> Result<()> {
    let data =
        fs::read(input).with_context(|| format!("Failed to read font: {}", input.display()))?;
    let sfnt = container::to_sfnt(&data, Flavor::from_path(input))?;

    let mapped = coverage::mapped_codepoints(&sfnt)?;
    println!("Font maps {} characters", mapped.len());
    println!("Subsetting font to keep {} characters...", chars.chars().count());
    let subset = Subsetter::new().with_chars(chars.chars()).retain_glyph_names(true).subset(&sfnt)?;

    let packed = container::from_sfnt(&subset, Flavor::from_path(output))?;
    fs::write(output, &packed)
        .with_context(|| format!("Failed to write font: {}", output.display()))?;

    info!(
        "subset {} -> {} ({:.2} MB -> {:.2} MB)",
        input.display(),
        output.display(),
        data.len() as f64 / 1024.0 / 1024.0,
        packed.len() as f64 / 1024.0 / 1024.0,
    );
    println!("Subset font saved to: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let subsetter = Subsetter::new().with_chars("abca".chars()).retain_glyph_names(true);

        assert!(subsetter.retain_glyph_names);
        // Deduplication is harfbuzz's job; the builder just accumulates.
        assert_eq!(subsetter.chars.len(), 4);
    }

    #[test]
    fn test_default_builder_is_empty() {
        let subsetter = Subsetter::new();
        assert!(subsetter.chars.is_empty());
        assert!(!subsetter.retain_glyph_names);
    }

    #[test]
    fn test_subset_rejects_non_font_data() {
        let subsetter = Subsetter::new().with_chars("a".chars());
        assert!(subsetter.subset(b"not a font").is_err());
    }
}

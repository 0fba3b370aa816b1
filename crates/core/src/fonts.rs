//! Split-font stylesheet preprocessing.
//!
//! Converts each configured stylesheet source into a patched copy under
//! the font asset root, renaming the family to its canonical name and
//! applying any size-adjust override.

use std::path::Path;

use log::{info, warn};
use plume_css_manifest::{ConvertOptions, Source, convert_source, save_css};

use crate::{
    config::BuildConfig,
    error::Result,
};

/// Run the conversion map. Existing outputs are kept unless `force` is
/// set; a missing local source is logged and skipped.
pub fn process_font_css(root: &Path, config: &BuildConfig, force: bool) -> Result<()> {
    let font_root = config.fonts_dir.to_string_lossy();

    for entry in &config.font_css {
        let source = match Source::parse(&entry.source) {
            Source::Remote(url) => Source::Remote(url),
            Source::Local(path) => {
                let absolute = root.join(&path);
                if !absolute.exists() {
                    warn!("stylesheet not found, skipping: {}", absolute.display());
                    continue;
                }
                Source::Local(absolute)
            }
        };

        let prefix = if source.is_remote() { "remote" } else { "local" };
        let out_css = root.join(&config.fonts_dir).join(format!("{prefix}-{}.css", entry.name));
        if !force && out_css.is_file() {
            info!("up to date: {}", out_css.display());
            continue;
        }

        let options = ConvertOptions {
            family_rename: Some(&entry.name),
            size_adjust: entry.size_adjust.as_deref(),
            font_root: &font_root,
        };
        let converted = convert_source(&source, root, &options)?;
        save_css(&converted.css, &out_css)?;
        println!(
            "Converted {} ({} font-face blocks) -> {}",
            entry.source,
            converted.records.len(),
            out_css.display()
        );
    }

    println!("CSS fonts processed successfully!");
    Ok(())
}

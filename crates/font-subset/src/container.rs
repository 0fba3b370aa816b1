//! WOFF/WOFF2 container handling via the external woff tools.
//!
//! hb-subset operates on bare sfnt data; compressed containers are
//! round-tripped through `woff2_compress`/`woff2_decompress` (WOFF2) and
//! `sfnt2woff`/`woff2sfnt` (WOFF), located on PATH.

use std::{ffi::OsStr, fs, path::Path, process::Command};

use anyhow::{Context, Result, anyhow, bail};
use which::which;

/// Font container format, decided by a path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Bare TTF/OTF.
    Sfnt,
    Woff,
    Woff2,
}

impl Flavor {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some(ext) if ext.eq_ignore_ascii_case("woff2") => Self::Woff2,
            Some(ext) if ext.eq_ignore_ascii_case("woff") => Self::Woff,
            _ => Self::Sfnt,
        }
    }
}

/// Decompress font data into bare sfnt.
pub fn to_sfnt(data: &[u8], flavor: Flavor) -> Result<Vec<u8>> {
    match flavor {
        Flavor::Sfnt => Ok(data.to_vec()),
        Flavor::Woff2 => run_sibling_tool("woff2_decompress", data, "woff2", "ttf"),
        Flavor::Woff => woff_to_sfnt(data),
    }
}

/// Compress bare sfnt data into the requested container.
pub fn from_sfnt(data: &[u8], flavor: Flavor) -> Result<Vec<u8>> {
    match flavor {
        Flavor::Sfnt => Ok(data.to_vec()),
        Flavor::Woff2 => run_sibling_tool("woff2_compress", data, "ttf", "woff2"),
        Flavor::Woff => run_sibling_tool("sfnt2woff", data, "ttf", "woff"),
    }
}

fn require_tool(name: &str) -> Result<std::path::PathBuf> {
    which(name).map_err(|_| anyhow!("{name} is not available: install the woff tools"))
}

/// Runs a converter that writes its output next to its input, in a scratch
/// directory.
fn run_sibling_tool(tool: &str, data: &[u8], in_ext: &str, out_ext: &str) -> Result<Vec<u8>> {
    let tool_path = require_tool(tool)?;

    let dir = tempfile::tempdir().context("Failed to create scratch directory")?;
    let input = dir.path().join(format!("font.{in_ext}"));
    let output = dir.path().join(format!("font.{out_ext}"));
    fs::write(&input, data)
        .with_context(|| format!("Failed to write scratch font: {}", input.display()))?;

    let status =
        Command::new(&tool_path).arg(&input).status().with_context(|| format!("Failed to run {tool}"))?;
    if !status.success() {
        bail!("{tool} failed with {status}");
    }

    fs::read(&output).with_context(|| format!("{tool} produced no output"))
}

/// `woff2sfnt` prints the decompressed font to stdout.
fn woff_to_sfnt(data: &[u8]) -> Result<Vec<u8>> {
    let tool_path = require_tool("woff2sfnt")?;

    let dir = tempfile::tempdir().context("Failed to create scratch directory")?;
    let input = dir.path().join("font.woff");
    fs::write(&input, data)
        .with_context(|| format!("Failed to write scratch font: {}", input.display()))?;

    let output = Command::new(&tool_path)
        .arg(&input)
        .output()
        .context("Failed to run woff2sfnt")?;
    if !output.status.success() {
        bail!("woff2sfnt failed with {}", output.status);
    }

    Ok(output.stdout)
}

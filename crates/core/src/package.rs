//! Per-target bundle assembly: staging tree plus stored zip archive.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{
    config::BuildConfig,
    error::{Error, Result},
};

/// Archive entries skipped regardless of location in the staged tree.
const ARCHIVE_SKIP_PREFIX: &str = ".git";
const ARCHIVE_SKIP_NAME: &str = ".DS_Store";

/// Assemble one browser target: recreate its staging directory under the
/// dist dir, copy the configured trees and files into it, strip
/// development-only and documentation content, and write the bundle
/// archive. Returns the archive path.
pub fn assemble(root: &Path, config: &BuildConfig, browser: &str) -> Result<PathBuf> {
    let staging = root.join(&config.dist_dir).join(browser);
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| Error::io(&staging, e))?;
    }
    fs::create_dir_all(&staging).map_err(|e| Error::io(&staging, e))?;

    let manifest = config.manifest_path(root, browser);
    fs::copy(&manifest, staging.join("manifest.json")).map_err(|e| Error::io(&manifest, e))?;

    for dir in &config.copy_dirs {
        copy_tree(&root.join(dir), &staging.join(dir), &config.exclude_fonts)?;
    }

    let debug_dir = staging.join(&config.debug_dir);
    if debug_dir.exists() {
        // Best effort, like the rest of the dev-asset cleanup.
        let _ = fs::remove_dir_all(&debug_dir);
    }

    for file in &config.copy_files {
        let src = root.join(file);
        fs::copy(&src, staging.join(file)).map_err(|e| Error::io(&src, e))?;
    }

    purge_docs(&staging, &config.purge_docs)?;

    let archive = root.join(&config.dist_dir).join(format!("{browser}.zip"));
    write_archive(&staging, &archive)?;
    Ok(archive)
}

/// Recursively copy `src` into `dst`, skipping any entry whose file name
/// appears in `exclude`.
fn copy_tree(src: &Path, dst: &Path, exclude: &[String]) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| Error::io(dst, e))?;

    for entry in sorted_entries(src)? {
        let name = entry.file_name();
        if exclude.iter().any(|x| name.to_string_lossy() == x.as_str()) {
            debug!("excluded {}", entry.path().display());
            continue;
        }

        let from = entry.path();
        let to = dst.join(&name);
        let file_type = entry.file_type().map_err(|e| Error::io(&from, e))?;
        if file_type.is_dir() {
            copy_tree(&from, &to, exclude)?;
        } else {
            fs::copy(&from, &to).map_err(|e| Error::io(&from, e))?;
        }
    }
    Ok(())
}

/// Remove every file in the tree whose name matches a purged document name.
fn purge_docs(dir: &Path, names: &[String]) -> Result<()> {
    for entry in sorted_entries(dir)? {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        if file_type.is_dir() {
            purge_docs(&path, names)?;
        } else if names.iter().any(|n| entry.file_name().to_string_lossy() == n.as_str()) {
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        }
    }
    Ok(())
}

/// Write the staged tree as a stored (uncompressed) zip archive. Member
/// paths are relative to the staging root; version-control and OS metadata
/// entries are skipped.
fn write_archive(staging: &Path, archive: &Path) -> Result<()> {
    let file = fs::File::create(archive).map_err(|e| Error::io(archive, e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    add_tree(&mut writer, staging, staging, options)?;
    writer.finish()?;
    Ok(())
}

fn add_tree(
    writer: &mut ZipWriter<fs::File>,
    base: &Path,
    dir: &Path,
    options: SimpleFileOptions,
) -> Result<()> {
    for entry in sorted_entries(dir)? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(ARCHIVE_SKIP_PREFIX) || name == ARCHIVE_SKIP_NAME {
            continue;
        }

        let path = entry.path();
        let member = member_name(base, &path);
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        if file_type.is_dir() {
            writer.add_directory(format!("{member}/"), options)?;
            add_tree(writer, base, &path, options)?;
        } else {
            writer.start_file(member, options)?;
            let data = fs::read(&path).map_err(|e| Error::io(&path, e))?;
            writer.write_all(&data).map_err(|e| Error::io(&path, e))?;
        }
    }
    Ok(())
}

/// Archive member name: base-relative, forward slashes.
fn member_name(base: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    let parts: Vec<String> =
        rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
    parts.join("/")
}

/// Directory entries in stable name order.
fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::io(dir, e))?;
    entries.sort_by_key(fs::DirEntry::file_name);
    Ok(entries)
}

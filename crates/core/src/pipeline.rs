//! Release pipeline: stage sequencing for extension, container image, and
//! deployment builds.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use log::error;

use crate::{
    config::BuildConfig,
    deploy, docker,
    error::{Error, Result},
    fonts,
    manifest::sync_manifest,
    package,
    version::{VersionStore, validate_version},
};

/// Which stages a `build` invocation runs.
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    /// Explicit version override; falls back to the resolved current version.
    pub version: Option<String>,
    /// Build the browser extension bundles.
    pub extension: bool,
    /// Build and push the container image.
    pub docker: bool,
    /// Everything: fonts, extensions, container image.
    pub all: bool,
    /// Deploy to the remote host afterwards.
    pub deploy: bool,
}

/// Resolved state shared by all stages of one release run.
pub struct ReleaseContext {
    pub root: PathBuf,
    pub config: BuildConfig,
    pub version: String,
}

impl ReleaseContext {
    /// Resolve and validate the version, then persist it everywhere
    /// (version document, changelog, READMEs) before any stage runs.
    pub fn new(root: PathBuf, config: BuildConfig, version: Option<String>) -> Result<Self> {
        let version = {
            let store = VersionStore::new(&root, &config);
            let current = store.current()?;
            let version = match version.filter(|v| !v.is_empty()).or_else(|| current.clone()) {
                Some(v) => v,
                None => return Err(Error::NoVersion),
            };
            validate_version(&version)?;

            println!("Current Version: {}", current.as_deref().unwrap_or("<none>"));
            println!("New Version: {version}");

            store.set(&version)?;
            version
        };

        Ok(Self { root, config, version })
    }
}

/// Run one numbered, timed pipeline step.
pub fn run_step(
    name: &str,
    step_num: usize,
    total: usize,
    f: impl FnOnce() -> Result<()>,
) -> Result<()> {
    println!("\n[{step_num}/{total}] {name}");
    let start = Instant::now();
    f()?;
    println!("  ✓ {name} ({:.2}s)", start.elapsed().as_secs_f64());
    Ok(())
}

/// Build every browser target: synchronize its manifest, stage, archive.
pub fn build_extensions(ctx: &ReleaseContext) -> Result<()> {
    println!("Building extensions...");
    for browser in &ctx.config.browsers {
        println!("Building {browser} extension...");
        sync_manifest(&ctx.config.manifest_path(&ctx.root, browser), &ctx.version)?;
        let archive = package::assemble(&ctx.root, &ctx.config, browser)?;
        println!("  {}", archive.display());
    }
    println!("Built extensions successfully!");
    Ok(())
}

/// Run the release per `opts`. With no build kind selected, defaults to a
/// full build plus deployment. Optional stages (container image in a full
/// build, deployment) log their failure and let the run continue; a
/// container-only build propagates its failure.
pub fn run_release(root: &Path, config: BuildConfig, mut opts: ReleaseOptions) -> Result<()> {
    if !(opts.docker || opts.extension || opts.all) {
        opts.all = true;
        opts.deploy = true;
    }

    let start = Instant::now();
    let ctx = ReleaseContext::new(root.to_path_buf(), config, opts.version.clone())?;

    if opts.all {
        let total = if opts.deploy { 4 } else { 3 };
        run_step("process-fonts", 1, total, || {
            fonts::process_font_css(&ctx.root, &ctx.config, true)
        })?;
        run_step("build-extensions", 2, total, || build_extensions(&ctx))?;
        run_step("build-image", 3, total, || {
            if let Err(e) = docker::build_images(&ctx.root, &ctx.config, &ctx.version) {
                error!("container build skipped: {e}");
            }
            Ok(())
        })?;
        if opts.deploy {
            run_step("deploy", 4, total, || {
                if let Err(e) = deploy::deploy(&ctx.config) {
                    error!("deployment failed: {e}");
                }
                Ok(())
            })?;
        }
    } else {
        if opts.extension {
            build_extensions(&ctx)?;
        }
        if opts.docker {
            // Explicitly requested container-only build: failure is fatal.
            docker::build_images(&ctx.root, &ctx.config, &ctx.version)?;
        }
        if opts.deploy {
            if let Err(e) = deploy::deploy(&ctx.config) {
                error!("deployment failed: {e}");
            }
        }
    }

    println!("\n✨ Release complete in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

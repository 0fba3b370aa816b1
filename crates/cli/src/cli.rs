//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use plume_build_core::{
    BuildConfig, ReleaseOptions, fonts::process_font_css, pipeline::run_release,
};
use plume_css_manifest::{ConvertOptions, Source, convert_source, save_css, save_manifest};
use plume_font_subset::{charset, names, subset_file};

#[derive(Parser)]
#[command(name = "plume-build")]
#[command(about = "Build, package, and release tooling for Plume Reader")]
pub struct Cli {
    /// Project root directory.
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the extension bundles and/or the container image.
    ///
    /// Without a build kind this runs everything and deploys, like a full
    /// release.
    Build {
        /// Version to build; defaults to the current version.
        #[arg(short, long)]
        version: Option<String>,
        /// Build the browser extensions.
        #[arg(short, long)]
        extension: bool,
        /// Build and push the container image.
        #[arg(short, long)]
        docker: bool,
        /// Build both extensions and container image.
        #[arg(short, long)]
        all: bool,
        /// Deploy to the remote server after building.
        #[arg(short = 'p', long)]
        deploy: bool,
    },
    /// Convert one split-font stylesheet to a manifest and patched CSS.
    Convert {
        /// URL or path of the split-font stylesheet.
        #[arg(short, long)]
        url: String,
        /// Output manifest path (.json); the patched CSS lands beside it.
        #[arg(short, long)]
        out: PathBuf,
        /// Rename font-family to this value.
        #[arg(short, long)]
        rename: Option<String>,
        /// Override/add size-adjust (e.g. 125%).
        #[arg(short, long)]
        size_adjust: Option<String>,
    },
    /// Convert every stylesheet in the configured font map.
    Fonts {
        /// Re-convert even when the output already exists.
        #[arg(long)]
        force: bool,
    },
    /// Subset a font under the font asset root to the characters in use.
    Subset {
        /// Input font file name (ttf, otf, woff, woff2).
        input: String,
        /// Output subset font file name.
        output: String,
        /// Characters to keep; skips scanning the project files.
        #[arg(short, long)]
        chars: Option<String>,
    },
    /// Print the name table records of font files.
    Names { fonts: Vec<PathBuf> },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = BuildConfig::default();
        let root = self.root;

        match self.command {
            Commands::Build { version, extension, docker, all, deploy } => {
                let options = ReleaseOptions { version, extension, docker, all, deploy };
                run_release(&root, config, options)?;
            }
            Commands::Convert { url, out, rename, size_adjust } => {
                let source = match Source::parse(&url) {
                    Source::Local(path) => Source::Local(root.join(path)),
                    remote => remote,
                };
                let font_root = config.fonts_dir.to_string_lossy();
                let options = ConvertOptions {
                    family_rename: rename.as_deref(),
                    size_adjust: size_adjust.as_deref(),
                    font_root: &font_root,
                };

                let converted = convert_source(&source, &root, &options)?;
                println!("Parsed {} font-face blocks", converted.records.len());

                save_manifest(&converted.records, &out)?;
                println!("Manifest saved to: {}", out.display());
                let css_out = out.with_extension("css");
                save_css(&converted.css, &css_out)?;
                println!("Patched CSS saved to: {}", css_out.display());
            }
            Commands::Fonts { force } => {
                process_font_css(&root, &config, force)?;
            }
            Commands::Subset { input, output, chars } => {
                let fonts_dir = root.join(&config.fonts_dir);
                let input = fonts_dir.join(input);
                let output = fonts_dir.join(output);
                if !input.exists() {
                    bail!("input font {} does not exist", input.display());
                }

                let keep = match chars {
                    Some(chars) => charset::dedup_chars(&chars),
                    None => {
                        let files: Vec<PathBuf> =
                            config.charset_files.iter().map(|f| root.join(f)).collect();
                        charset::collect_chars(&files)?
                    }
                };
                subset_file(&input, &output, &keep)?;
            }
            Commands::Names { fonts } => {
                for font in &fonts {
                    names::print_names(font)?;
                }
            }
        }

        Ok(())
    }
}

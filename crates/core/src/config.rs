//! Build configuration for Plume Reader releases.
//!
//! Every deployment-specific value lives here and is passed into the
//! pipeline explicitly, so the components stay testable against arbitrary
//! project layouts. [`BuildConfig::default`] carries the production values.

use std::path::PathBuf;

/// Chinese product name, as stamped into README.md.
pub const PRODUCT_NAME_ZH: &str = "羽笺";

/// English product name, as stamped into README_EN.md.
pub const PRODUCT_NAME_EN: &str = "PlumeReader";

/// Container image pushed to the registry.
pub const DOCKER_IMAGE: &str = "plumereader/web";

/// Platforms built for the container image.
pub const DOCKER_PLATFORMS: &str = "linux/amd64,linux/arm64";

/// Named buildx builder used for multi-arch builds.
pub const BUILDX_BUILDER: &str = "multiarch_builder";

/// Host the web reader is deployed to.
pub const REMOTE_HOST: &str = "ext-web-01";

/// Long-running container serving the reader on the remote host.
pub const REMOTE_CONTAINER: &str = "website--plumereader";

/// Checkout of this repository on the remote host.
pub const REMOTE_PROJECT_PATH: &str = "/srv/docker/website--plumereader/plume-reader";

/// A README file and the product name whose ` (vX.Y.Z)` suffix gets restamped.
#[derive(Debug, Clone)]
pub struct ReadmeStamp {
    pub file: PathBuf,
    pub product: String,
}

/// One entry of the split-font conversion map: a stylesheet source
/// (project-relative path or HTTP(S) URL) converted under a canonical
/// family name, with an optional size-adjust override.
#[derive(Debug, Clone)]
pub struct FontCss {
    pub name: String,
    pub source: String,
    pub size_adjust: Option<String>,
}

impl FontCss {
    fn new(name: &str, source: &str, size_adjust: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            source: source.to_string(),
            size_adjust: size_adjust.map(str::to_string),
        }
    }
}

/// Everything the release pipeline needs to know about the project.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Browser targets, one distributable bundle each.
    pub browsers: Vec<String>,
    /// Directory holding one manifest.json per browser target.
    pub manifests_dir: PathBuf,
    /// Staging/output directory for bundles.
    pub dist_dir: PathBuf,
    /// Source trees copied into each bundle.
    pub copy_dirs: Vec<PathBuf>,
    /// Top-level files copied into each bundle root.
    pub copy_files: Vec<PathBuf>,
    /// Font files never shipped in a bundle.
    pub exclude_fonts: Vec<String>,
    /// Development-only subtree removed after copying.
    pub debug_dir: PathBuf,
    /// Documentation file names purged from the staged tree.
    pub purge_docs: Vec<String>,
    /// Version document path.
    pub version_file: PathBuf,
    /// README files restamped with the current version.
    pub readme_stamps: Vec<ReadmeStamp>,
    /// Font asset root; patched stylesheet URLs are rewritten relative to it.
    pub fonts_dir: PathBuf,
    /// Files scanned for the characters a subset font must retain.
    pub charset_files: Vec<PathBuf>,
    /// Split-font stylesheets converted during the font preprocessing stage.
    pub font_css: Vec<FontCss>,
    /// Container image name (pushed with `latest` and the version tag).
    pub docker_image: String,
    /// Comma-separated buildx platform list.
    pub docker_platforms: String,
    /// Named buildx builder for multi-arch builds.
    pub buildx_builder: String,
    /// Deployment host reachable over ssh.
    pub remote_host: String,
    /// Repository checkout on the deployment host.
    pub remote_project_path: String,
    /// Container kept running on the deployment host.
    pub remote_container: String,
    /// Host-side command that (re)starts a container by name.
    pub remote_container_ctl: String,
    /// Command run inside the container to purge its cache.
    pub remote_purge_cmd: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            browsers: vec!["Chrome".into(), "Firefox".into()],
            manifests_dir: "client/manifests".into(),
            dist_dir: "dist".into(),
            copy_dirs: vec![
                "client/css".into(),
                "client/fonts".into(),
                "client/images".into(),
                "client/app".into(),
                "shared".into(),
            ],
            copy_files: vec!["index.html".into(), "version.json".into(), "help.json".into()],
            exclude_fonts: vec![
                "FZSKBXKK.woff2".into(),
                "KX_47043_14.woff".into(),
                "LXGWWenKaiScreen.woff2".into(),
            ],
            debug_dir: "client/app/debug".into(),
            purge_docs: vec!["README.md".into()],
            version_file: "version.json".into(),
            readme_stamps: vec![
                ReadmeStamp { file: "README.md".into(), product: PRODUCT_NAME_ZH.into() },
                ReadmeStamp { file: "README_EN.md".into(), product: PRODUCT_NAME_EN.into() },
            ],
            fonts_dir: "client/fonts".into(),
            charset_files: vec![
                "client/css/variables.css".into(),
                "help.json".into(),
                "version.json".into(),
            ],
            font_css: vec![
                FontCss::new("wenkai", "client/fonts/LXGWWenKaiScreen/result.css", None),
                FontCss::new("kinghwa", "client/fonts/KingHwa_OldSong/result.css", None),
                FontCss::new("zhuque", "client/fonts/ZhuqueFangsong-Regular/result.css", None),
                FontCss::new(
                    "qiji",
                    "https://fontsapi.zeoseven.com/81/main/result.css",
                    Some("125%"),
                ),
                FontCss::new("neoxihei", "https://fontsapi.zeoseven.com/19/main/result.css", None),
                FontCss::new(
                    "chillkai",
                    "https://fontsapi.zeoseven.com/5/main/result.css",
                    Some("102%"),
                ),
                FontCss::new(
                    "chillroundm",
                    "https://fontsapi.zeoseven.com/243/main/result.css",
                    None,
                ),
                FontCss::new("quanlai", "https://fontsapi.zeoseven.com/200/main/result.css", None),
                FontCss::new("clearhan", "https://fontsapi.zeoseven.com/79/main/result.css", None),
            ],
            docker_image: DOCKER_IMAGE.into(),
            docker_platforms: DOCKER_PLATFORMS.into(),
            buildx_builder: BUILDX_BUILDER.into(),
            remote_host: REMOTE_HOST.into(),
            remote_project_path: REMOTE_PROJECT_PATH.into(),
            remote_container: REMOTE_CONTAINER.into(),
            remote_container_ctl: "dctl".into(),
            remote_purge_cmd: "sh /purge-cache.sh".into(),
        }
    }
}

impl BuildConfig {
    /// Path of a browser target's manifest.json under the project root.
    pub fn manifest_path(&self, root: &std::path::Path, browser: &str) -> PathBuf {
        root.join(&self.manifests_dir).join(browser).join("manifest.json")
    }
}

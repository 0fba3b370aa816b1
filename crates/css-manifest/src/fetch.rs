//! Stylesheet sources and fetching.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// Browser-like request headers; some font APIs reject default clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ACCEPT: &str = "text/css,*/*;q=0.1";

/// Where a stylesheet comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// HTTP(S) URL.
    Remote(String),
    /// Path on disk.
    Local(PathBuf),
}

impl Source {
    /// Classify a source string: anything with an `http(s)://` scheme is
    /// remote, everything else is a local path.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Remote(s.to_string())
        } else {
            Self::Local(PathBuf::from(s))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Fetch the raw stylesheet text.
pub fn fetch_text(source: &Source) -> Result<String> {
    match source {
        Source::Remote(url) => {
            let response = reqwest::blocking::Client::new()
                .get(url)
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .header(reqwest::header::ACCEPT, ACCEPT)
                .header(reqwest::header::REFERER, referer_for(url))
                .send()
                .map_err(|e| Error::Fetch { url: url.clone(), source: e })?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::Status { url: url.clone(), status });
            }
            response.text().map_err(|e| Error::Fetch { url: url.clone(), source: e })
        }
        Source::Local(path) => fs::read_to_string(path).map_err(|e| Error::io(path, e)),
    }
}

/// Prefix substituted for `./` in relative asset URLs: the URL's own
/// directory for remote sources, the source file's project-relative
/// directory for local sources (forward slashes on every platform).
pub fn base_prefix(source: &Source, project_root: &Path) -> Result<String> {
    match source {
        Source::Remote(url) => Ok(match url.rfind('/') {
            Some(slash) => url[..=slash].to_string(),
            None => format!("{url}/"),
        }),
        Source::Local(path) => {
            let parent = path.parent().unwrap_or_else(|| Path::new(""));
            let rel = parent
                .strip_prefix(project_root)
                .map_err(|_| Error::OutsideRoot { path: path.clone() })?;
            let parts: Vec<String> =
                rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
            let joined = parts.join("/");
            Ok(if joined.is_empty() { "./".to_string() } else { format!("./{joined}/") })
        }
    }
}

/// Fetch a stylesheet and rewrite its relative asset URLs against the
/// resolved base location.
pub fn load(source: &Source, project_root: &Path) -> Result<String> {
    let text = fetch_text(source)?;
    let base = base_prefix(source, project_root)?;
    Ok(crate::rewrite_relative_urls(&text, &base))
}

fn referer_for(url: &str) -> String {
    let end = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[end..].find('/') {
        Some(slash) => url[..end + slash + 1].to_string(),
        None => format!("{url}/"),
    }
}

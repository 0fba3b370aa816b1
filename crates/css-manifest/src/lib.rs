//! Split-font stylesheet conversion.
//!
//! A split web font ships as one `@font-face` rule per Unicode range. This
//! crate parses those rules into a font-loading manifest (one record per
//! rule) and produces a patched copy of the stylesheet: family renamed,
//! size-adjust overridden, and relative asset URLs rewritten against the
//! font asset root.
//!
//! Parsing and patching are pure text transforms over `&str`; fetching and
//! base-path resolution live in [`fetch`] so the transforms stay testable
//! without network or filesystem access. Patches are spliced back by block
//! byte span, so textually identical blocks patch independently.
//!
//! Malformed blocks degrade to records with default/empty fields; they are
//! never an error.

mod error;
mod fetch;

pub use error::{Error, Result};
pub use fetch::{Source, base_prefix, fetch_text, load};

use std::{fs, ops::Range, path::Path, sync::LazyLock};

use regex::{Captures, NoExpand, Regex};
use serde::Serialize;

static FAMILY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(font-family\s*:\s*["'])([^"']+)(["'])"#).unwrap());
static WOFF2_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*["']?([^"')]+\.woff2)["']?\s*\)"#).unwrap());
static UNICODE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"unicode-range\s*:\s*([^;]+);").unwrap());
static FONT_WEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"font-weight\s*:\s*([^;]+);").unwrap());
static FONT_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"font-style\s*:\s*([^;]+);").unwrap());
static FONT_DISPLAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"font-display\s*:\s*([^;]+);").unwrap());
static SIZE_ADJUST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(size-adjust\s*:\s*)([^;]+);").unwrap());
static ASCENT_OVERRIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ascent-override\s*:\s*([^;]+);").unwrap());
static RELATIVE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*["']\./"#).unwrap());

/// One parsed `@font-face` rule. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFaceRecord {
    pub family: String,
    pub url: String,
    pub unicode_range: String,
    pub font_weight: String,
    pub font_style: String,
    pub font_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_adjust: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascent_override: Option<String>,
}

/// Conversion overrides and the font asset root that local URLs are
/// rewritten against.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions<'a> {
    /// Replace every block's family name with this one.
    pub family_rename: Option<&'a str>,
    /// Override (or insert) each block's size-adjust declaration.
    pub size_adjust: Option<&'a str>,
    /// Font asset root (e.g. `client/fonts`); relative `.woff2` URLs under
    /// it are rewritten relative to it.
    pub font_root: &'a str,
}

/// Conversion output: the manifest records and the patched stylesheet.
#[derive(Debug, Clone)]
pub struct Converted {
    pub records: Vec<FontFaceRecord>,
    pub css: String,
}

/// Byte spans of every `@font-face { ... }` block. Blocks cannot nest, so
/// each block ends at the first closing brace after its opening one.
pub fn font_face_spans(css: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(found) = css[pos..].find("@font-face") {
        let start = pos + found;
        let after = start + "@font-face".len();

        let Some(open_offset) = css[after..].find('{') else { break };
        if !css[after..after + open_offset].trim().is_empty() {
            // "@font-face" inside some other construct, not a rule.
            pos = after;
            continue;
        }

        let open = after + open_offset;
        let Some(close_offset) = css[open..].find('}') else { break };
        let end = open + close_offset + 1;
        spans.push(start..end);
        pos = end;
    }

    spans
}

/// Extract one record from a block. Missing properties fall back to their
/// defaults (`normal`/`normal`/`swap`) or stay empty/absent.
pub fn parse_block(block: &str) -> FontFaceRecord {
    FontFaceRecord {
        family: FAMILY
            .captures(block)
            .map(|c| c[2].to_string())
            .unwrap_or_else(|| "UnknownFamily".to_string()),
        url: WOFF2_URL.captures(block).map(|c| c[1].to_string()).unwrap_or_default(),
        unicode_range: UNICODE_RANGE
            .captures(block)
            .map(|c| c[1].split_whitespace().collect())
            .unwrap_or_default(),
        font_weight: capture_value(&FONT_WEIGHT, block).unwrap_or_else(|| "normal".to_string()),
        font_style: capture_value(&FONT_STYLE, block).unwrap_or_else(|| "normal".to_string()),
        font_display: capture_value(&FONT_DISPLAY, block).unwrap_or_else(|| "swap".to_string()),
        size_adjust: SIZE_ADJUST.captures(block).map(|c| c[2].trim().to_string()),
        ascent_override: capture_value(&ASCENT_OVERRIDE, block),
    }
}

/// Convert a stylesheet: parse every font-face block, apply the overrides,
/// and splice each patched block back at its original span.
pub fn convert(css: &str, options: &ConvertOptions) -> Converted {
    let spans = font_face_spans(css);
    let mut records = Vec::with_capacity(spans.len());
    let mut out = String::with_capacity(css.len());
    let mut cursor = 0;

    for span in spans {
        let block = &css[span.clone()];
        let mut record = parse_block(block);
        if let Some(name) = options.family_rename {
            record.family = name.to_string();
        }
        if let Some(value) = options.size_adjust {
            record.size_adjust = Some(value.to_string());
        }

        out.push_str(&css[cursor..span.start]);
        out.push_str(&patch_block(block, &record, options));
        cursor = span.end;
        records.push(record);
    }

    out.push_str(&css[cursor..]);
    Converted { records, css: out }
}

/// Fetch a stylesheet source, fix its relative asset URLs, and convert it.
pub fn convert_source(
    source: &Source,
    project_root: &Path,
    options: &ConvertOptions,
) -> Result<Converted> {
    let css = load(source, project_root)?;
    Ok(convert(&css, options))
}

/// Prefix every relative `url("./...")` with the resolved base location.
pub fn rewrite_relative_urls(css: &str, base: &str) -> String {
    RELATIVE_URL.replace_all(css, NoExpand(&format!("url(\"{base}"))).into_owned()
}

/// Write the manifest as compact JSON.
pub fn save_manifest(records: &[FontFaceRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string(records)?;
    fs::write(path, json).map_err(|e| Error::io(path, e))
}

/// Write the patched stylesheet.
pub fn save_css(css: &str, path: &Path) -> Result<()> {
    fs::write(path, css).map_err(|e| Error::io(path, e))
}

fn capture_value(re: &Regex, block: &str) -> Option<String> {
    re.captures(block).map(|c| c[1].trim().to_string())
}

fn patch_block(block: &str, record: &FontFaceRecord, options: &ConvertOptions) -> String {
    let mut patched = block.to_string();

    if !record.url.is_empty() && !is_remote_url(&record.url) {
        if let Some(relative) = strip_font_root(&record.url, options.font_root) {
            patched = WOFF2_URL
                .replace_all(&patched, NoExpand(&format!("url(\"{relative}\")")))
                .into_owned();
        }
    }

    if let Some(name) = options.family_rename {
        patched = FAMILY
            .replace_all(&patched, |caps: &Captures| format!("{}{}{}", &caps[1], name, &caps[3]))
            .into_owned();
    }

    if let Some(value) = options.size_adjust {
        if SIZE_ADJUST.is_match(&patched) {
            patched = SIZE_ADJUST
                .replace_all(&patched, |caps: &Captures| format!("{}{};", &caps[1], value))
                .into_owned();
        } else if let Some(brace) = patched.rfind('}') {
            patched.insert_str(brace, &format!("size-adjust:{value};"));
        }
    }

    patched
}

fn is_remote_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Relative URL under the font asset root, or `None` when it is not under
/// the root (left unchanged, best effort).
fn strip_font_root(url: &str, font_root: &str) -> Option<String> {
    let trimmed = url.strip_prefix("./").unwrap_or(url);
    let root = font_root.trim_matches('/');
    if root.is_empty() {
        return None;
    }
    let rest = trimmed.strip_prefix(root)?.strip_prefix('/')?;
    (!rest.is_empty()).then(|| rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = r#"@font-face{font-family:"WenKai TC";src:url("./client/fonts/WenKai/part-07.woff2")format("woff2");font-display:swap;font-style:normal;font-weight:400;unicode-range:U+4E00-4EFF, U+9F00-9FFF;}"#;

    #[test]
    fn parses_a_minified_block() {
        let record = parse_block(BLOCK);
        assert_eq!(record.family, "WenKai TC");
        assert_eq!(record.url, "./client/fonts/WenKai/part-07.woff2");
        assert_eq!(record.unicode_range, "U+4E00-4EFF,U+9F00-9FFF");
        assert_eq!(record.font_weight, "400");
        assert_eq!(record.font_style, "normal");
        assert_eq!(record.font_display, "swap");
        assert!(record.size_adjust.is_none());
        assert!(record.ascent_override.is_none());
    }

    #[test]
    fn parses_a_spaced_block_with_property_order_shuffled() {
        let block = r#"@font-face {
            unicode-range : U+0000-00FF;
            font-weight : bold ;
            font-family : 'Old Song' ;
            src: url( "./part-01.woff2" );
        }"#;
        let record = parse_block(block);
        assert_eq!(record.family, "Old Song");
        assert_eq!(record.url, "./part-01.woff2");
        assert_eq!(record.unicode_range, "U+0000-00FF");
        assert_eq!(record.font_weight, "bold");
        assert_eq!(record.font_style, "normal");
    }

    #[test]
    fn malformed_block_degrades_to_defaults() {
        let record = parse_block("@font-face{color:red}");
        assert_eq!(record.family, "UnknownFamily");
        assert!(record.url.is_empty());
        assert!(record.unicode_range.is_empty());
        assert_eq!(record.font_weight, "normal");
        assert_eq!(record.font_display, "swap");
    }

    #[test]
    fn finds_every_block_span() {
        let css = format!("/* head */\n{BLOCK}\nbody {{ margin: 0; }}\n{BLOCK}");
        let spans = font_face_spans(&css);
        assert_eq!(spans.len(), 2);
        for span in &spans {
            assert!(css[span.clone()].starts_with("@font-face"));
            assert!(css[span.clone()].ends_with('}'));
        }
    }

    #[test]
    fn duplicate_blocks_patch_independently() {
        let css = format!("{BLOCK}\n{BLOCK}");
        let options =
            ConvertOptions { size_adjust: Some("102%"), font_root: "client/fonts", ..Default::default() };
        let converted = convert(&css, &options);
        assert_eq!(converted.records.len(), 2);
        assert_eq!(converted.css.matches("size-adjust:102%;").count(), 2);
    }

    #[test]
    fn rename_rewrites_every_family_value() {
        let css = format!(
            "{BLOCK}\n@font-face{{font-family:\"Other Font\";src:url(\"x.woff2\");}}"
        );
        let options = ConvertOptions {
            family_rename: Some("wenkai"),
            font_root: "client/fonts",
            ..Default::default()
        };
        let converted = convert(&css, &options);

        assert!(converted.records.iter().all(|r| r.family == "wenkai"));
        assert!(!converted.css.contains("WenKai TC"));
        assert!(!converted.css.contains("Other Font"));
        assert_eq!(converted.css.matches("font-family:\"wenkai\"").count(), 2);
    }

    #[test]
    fn size_adjust_is_replaced_when_present_and_inserted_when_absent() {
        let with = r#"@font-face{font-family:"A";size-adjust: 95%;src:url("a.woff2");}"#;
        let without = r#"@font-face{font-family:"A";src:url("a.woff2");}"#;
        let options =
            ConvertOptions { size_adjust: Some("125%"), font_root: "client/fonts", ..Default::default() };

        let replaced = convert(with, &options).css;
        assert_eq!(replaced.matches("size-adjust").count(), 1);
        assert!(replaced.contains("size-adjust: 125%;"));
        assert!(!replaced.contains("95%"));

        let inserted = convert(without, &options).css;
        assert_eq!(inserted.matches("size-adjust").count(), 1);
        assert!(inserted.contains("size-adjust:125%;}"));
    }

    #[test]
    fn local_urls_are_rewritten_relative_to_the_font_root() {
        let options = ConvertOptions { font_root: "client/fonts", ..Default::default() };
        let converted = convert(BLOCK, &options);
        assert!(converted.css.contains("url(\"WenKai/part-07.woff2\")"));
    }

    #[test]
    fn urls_outside_the_font_root_are_left_alone() {
        let css = r#"@font-face{font-family:"A";src:url("./vendor/a.woff2");}"#;
        let options = ConvertOptions { font_root: "client/fonts", ..Default::default() };
        assert!(convert(css, &options).css.contains("url(\"./vendor/a.woff2\")"));
    }

    #[test]
    fn remote_urls_are_never_rewritten() {
        let css = r#"@font-face{font-family:"A";src:url("https://cdn.example.com/a.woff2");}"#;
        let options = ConvertOptions { font_root: "client/fonts", ..Default::default() };
        assert!(convert(css, &options).css.contains("https://cdn.example.com/a.woff2"));
    }

    #[test]
    fn relative_url_rewrite_prefixes_the_base() {
        let css = r#"src:url("./part-01.woff2") format("woff2"), url('./part-02.woff2');"#;
        let out = rewrite_relative_urls(css, "https://fonts.example.com/81/main/");
        assert_eq!(out.matches("https://fonts.example.com/81/main/part-0").count(), 2);
        assert!(!out.contains("./part"));
    }

    #[test]
    fn manifest_serializes_camel_case_and_omits_absent_overrides() {
        let record = parse_block(BLOCK);
        let json = serde_json::to_string(&[record]).unwrap();
        assert!(json.contains("\"unicodeRange\""));
        assert!(json.contains("\"fontWeight\""));
        assert!(!json.contains("sizeAdjust"));
        assert!(!json.contains("ascentOverride"));
    }
}

//! End-to-end conversion over a local split-font stylesheet.

use std::fs;

use plume_css_manifest::{ConvertOptions, Source, convert, convert_source, load};

const STYLESHEET: &str = concat!(
    "@font-face{font-family:\"Old Song\";src:url(\"./part-01.woff2\")format(\"woff2\");",
    "font-display:swap;font-style:normal;font-weight:400;unicode-range:U+4E00-4EFF;}\n",
    "@font-face{font-family:\"Old Song\";src:url(\"./part-02.woff2\")format(\"woff2\");",
    "font-display:swap;font-style:italic;font-weight:700;unicode-range:U+9F00-9FFF;",
    "ascent-override:88%;}\n",
);

#[test]
fn local_conversion_resolves_urls_against_the_source_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let css_dir = root.join("client/fonts/KingHwa_OldSong");
    fs::create_dir_all(&css_dir).unwrap();
    fs::write(css_dir.join("result.css"), STYLESHEET).unwrap();

    let source = Source::Local(css_dir.join("result.css"));
    let options = ConvertOptions {
        family_rename: Some("kinghwa"),
        size_adjust: None,
        font_root: "client/fonts",
    };
    let converted = convert_source(&source, root, &options).unwrap();

    assert_eq!(converted.records.len(), 2);
    // Relative URL -> project-relative -> font-root-relative.
    assert_eq!(converted.records[0].url, "./client/fonts/KingHwa_OldSong/part-01.woff2");
    assert!(converted.css.contains("url(\"KingHwa_OldSong/part-01.woff2\")"));
    assert!(converted.css.contains("url(\"KingHwa_OldSong/part-02.woff2\")"));
    assert!(!converted.css.contains("Old Song"));
}

#[test]
fn conversion_preserves_ranges_and_variants_unless_overridden() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("result.css"), STYLESHEET).unwrap();

    let source = Source::Local(root.join("result.css"));
    let css = load(&source, root).unwrap();
    let converted = convert(&css, &ConvertOptions { font_root: "client/fonts", ..Default::default() });

    let reparsed = convert(&converted.css, &ConvertOptions::default());
    assert_eq!(reparsed.records.len(), converted.records.len());
    for (before, after) in converted.records.iter().zip(&reparsed.records) {
        assert_eq!(before.unicode_range, after.unicode_range);
        assert_eq!(before.font_weight, after.font_weight);
        assert_eq!(before.font_style, after.font_style);
        assert_eq!(before.font_display, after.font_display);
        assert_eq!(before.ascent_override, after.ascent_override);
    }
}

#[test]
fn renaming_two_families_leaves_no_trace_of_either() {
    let css = concat!(
        "@font-face{font-family:\"A\";src:url(\"a.woff2\");}\n",
        "@font-face{font-family:\"B\";src:url(\"b.woff2\");}\n",
    );
    let options = ConvertOptions {
        family_rename: Some("C"),
        size_adjust: None,
        font_root: "client/fonts",
    };
    let converted = convert(css, &options);

    assert!(converted.records.iter().all(|r| r.family == "C"));
    assert!(!converted.css.contains("font-family:\"A\""));
    assert!(!converted.css.contains("font-family:\"B\""));
    assert_eq!(converted.css.matches("font-family:\"C\"").count(), 2);
}

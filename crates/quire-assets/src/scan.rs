//! Finding local image references in markdown bodies.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// `![alt](images/path "optional title")`
static IMAGE_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[(?P<alt>.*?)\]\((?P<target>images/[^)]+?)(?P<title>\s+"[^"]*")?\)"#)
        .expect("image link regex")
});

/// One `![alt](images/...)` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub alt_text: String,
    /// Target exactly as written; always starts with `images/`.
    pub relative_path: String,
    /// Byte range of the target inside the body.
    pub target_span: Range<usize>,
}

/// All local image references, in body order.
#[must_use]
pub fn scan_references(body: &str) -> Vec<AssetReference> {
    IMAGE_LINK_REGEX
        .captures_iter(body)
        .filter_map(|captures| {
            let target = captures.name("target")?;
            Some(AssetReference {
                alt_text: captures
                    .name("alt")
                    .map(|alt| alt.as_str().to_string())
                    .unwrap_or_default(),
                relative_path: target.as_str().to_string(),
                target_span: target.range(),
            })
        })
        .collect()
}

/// Replace the targets at the given spans. Spans must not overlap.
#[must_use]
pub fn rewrite_targets(body: &str, replacements: &[(Range<usize>, String)]) -> String {
    let mut sorted: Vec<&(Range<usize>, String)> = replacements.iter().collect();
    sorted.sort_by_key(|(span, _)| span.start);

    let mut out = String::with_capacity(body.len());
    let mut cursor = 0;
    for (span, url) in sorted {
        out.push_str(&body[cursor..span.start]);
        out.push_str(url);
        cursor = span.end;
    }
    out.push_str(&body[cursor..]);
    out
}

/// `image/png` for `.png` (any case), `image/jpeg` otherwise.
#[must_use]
pub fn content_type_for(path: &str) -> &'static str {
    let is_png = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png { "image/png" } else { "image/jpeg" }
}

//! File → [`Document`].

use std::path::Path;

use quire_core::{Category, Document, DocumentMeta, RelDir};

use crate::error::ParseError;
use crate::front_matter::split_front_matter;
use crate::metadata::{MetadataDefaults, post_meta, wiki_meta};

/// Read and parse one markdown file.
///
/// `category_root` is the directory the category was discovered from; the
/// file's directory relative to it becomes [`Document::rel_dir`].
///
/// # Errors
///
/// Returns [`ParseError::Io`] if the file cannot be read,
/// [`ParseError::Decode`] if it is not UTF-8, and [`ParseError::Location`] if
/// it does not live under `category_root`.
pub async fn parse_document(
    category: Category,
    path: &Path,
    category_root: &Path,
    defaults: &MetadataDefaults,
) -> Result<Document, ParseError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| ParseError::Decode {
        path: path.to_path_buf(),
    })?;
    parse_source(category, path, category_root, &text, defaults)
}

/// Parse already-decoded text as if it were read from `path`.
///
/// # Errors
///
/// Returns [`ParseError::Location`] if `path` is not under `category_root`.
pub fn parse_source(
    category: Category,
    path: &Path,
    category_root: &Path,
    text: &str,
    defaults: &MetadataDefaults,
) -> Result<Document, ParseError> {
    let rel_dir = relative_dir(path, category_root)?;
    let split = split_front_matter(text);
    let mut notes: Vec<String> = split.note.into_iter().collect();

    let title = split
        .front_matter
        .text("title")
        .unwrap_or_else(|| file_stem(path));

    let meta = match category {
        Category::Blog => DocumentMeta::Post(post_meta(&split.front_matter, defaults, &mut notes)),
        Category::Wiki => DocumentMeta::Wiki(wiki_meta(&split.front_matter)),
    };

    Ok(Document {
        category,
        title,
        body: split.body,
        meta,
        source_path: path.to_path_buf(),
        rel_dir,
        notes,
    })
}

fn relative_dir(path: &Path, category_root: &Path) -> Result<RelDir, ParseError> {
    let location_error = |reason: String| ParseError::Location {
        path: path.to_path_buf(),
        reason,
    };
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let relative = parent.strip_prefix(category_root).map_err(|_| {
        location_error(format!("not under '{}'", category_root.display()))
    })?;
    RelDir::from_relative_path(relative).map_err(|error| location_error(error.to_string()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().trim().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| String::from("untitled"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quire_core::WikiMeta;

    #[test]
    fn title_defaults_to_file_stem() {
        let doc = parse_source(
            Category::Blog,
            Path::new("/site/blog/hello-world.md"),
            Path::new("/site/blog"),
            "Body only",
            &MetadataDefaults::default(),
        )
        .unwrap();
        assert_eq!(doc.title, "hello-world");
        assert_eq!(doc.body, "Body only");
        assert!(doc.rel_dir.is_root());
        assert_eq!(doc.post_meta().unwrap().category, "thoughts");
    }

    #[test]
    fn front_matter_title_is_trimmed() {
        let doc = parse_source(
            Category::Blog,
            Path::new("/site/blog/a.md"),
            Path::new("/site/blog"),
            "---\ntitle: '  My Post  '\n---\nBody",
            &MetadataDefaults::default(),
        )
        .unwrap();
        assert_eq!(doc.title, "My Post");
    }

    #[test]
    fn wiki_document_records_relative_dir() {
        let doc = parse_source(
            Category::Wiki,
            Path::new("/site/wiki/guides/setup/install.md"),
            Path::new("/site/wiki"),
            "Install steps",
            &MetadataDefaults::default(),
        )
        .unwrap();
        assert_eq!(doc.title, "install");
        assert_eq!(doc.rel_dir, RelDir::from_segments(["guides", "setup"]));
        assert_eq!(doc.meta, DocumentMeta::Wiki(WikiMeta::default()));
    }

    #[test]
    fn file_outside_root_is_rejected() {
        let err = parse_source(
            Category::Wiki,
            Path::new("/elsewhere/x.md"),
            Path::new("/site/wiki"),
            "",
            &MetadataDefaults::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Location { .. }));
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.md");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = parse_document(Category::Blog, &path, dir.path(), &MetadataDefaults::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::Decode { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_document(
            Category::Blog,
            &dir.path().join("gone.md"),
            dir.path(),
            &MetadataDefaults::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }

    #[test]
    fn malformed_front_matter_becomes_a_note() {
        let doc = parse_source(
            Category::Blog,
            Path::new("/site/blog/x.md"),
            Path::new("/site/blog"),
            "---\ntitle: [unclosed\n---\nBody",
            &MetadataDefaults::default(),
        )
        .unwrap();
        assert_eq!(doc.title, "x");
        assert_eq!(doc.notes.len(), 1);
    }
}

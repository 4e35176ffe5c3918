//! Typed metadata extraction with per-category defaults.
//!
//! | Key           | Field            | Default                      |
//! |---------------|------------------|------------------------------|
//! | `category`    | `category`       | `defaults.post_category`     |
//! | `post_type`   | `post_type`      | empty                        |
//! | `language`    | `language`       | empty                        |
//! | `open_source` | `is_open_source` | `false`                      |
//! | `project`     | `project_name`   | empty                        |
//! | `thumb`       | `thumbnail_url`  | `defaults.thumbnail`         |
//! | `date`        | `published_at`   | store clock                  |
//! | `parent_title`| `parent_title`   | none (wiki only)             |

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use quire_core::{PostMeta, WikiMeta};

use crate::front_matter::FrontMatter;

/// Fallbacks for keys a post may omit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataDefaults {
    pub post_category: String,
    pub thumbnail: String,
}

impl Default for MetadataDefaults {
    fn default() -> Self {
        Self {
            post_category: String::from("thoughts"),
            thumbnail: String::from("backgrounds/wall1.jpg"),
        }
    }
}

/// Extract blog metadata. Unparseable dates are dropped and reported in
/// `notes`.
pub fn post_meta(
    front: &FrontMatter,
    defaults: &MetadataDefaults,
    notes: &mut Vec<String>,
) -> PostMeta {
    let published_at = front.text("date").and_then(|raw| {
        let parsed = parse_date(&raw);
        if parsed.is_none() {
            notes.push(format!("unrecognised date '{raw}'; store time used"));
        }
        parsed
    });

    PostMeta {
        category: front
            .text("category")
            .unwrap_or_else(|| defaults.post_category.clone()),
        post_type: front.text("post_type").unwrap_or_default(),
        language: front.text("language").unwrap_or_default(),
        is_open_source: front.flag("open_source"),
        project_name: front.text("project").unwrap_or_default(),
        thumbnail_url: front
            .text("thumb")
            .unwrap_or_else(|| defaults.thumbnail.clone()),
        published_at,
    }
}

#[must_use]
pub fn wiki_meta(front: &FrontMatter) -> WikiMeta {
    WikiMeta {
        parent_title: front.text("parent_title"),
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM:SS` and bare dates.
fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front_matter::split_front_matter;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn front(yaml: &str) -> FrontMatter {
        split_front_matter(&format!("---\n{yaml}\n---\n")).front_matter
    }

    #[test]
    fn empty_front_matter_gets_defaults() {
        let mut notes = Vec::new();
        let meta = post_meta(&FrontMatter::default(), &MetadataDefaults::default(), &mut notes);
        assert_eq!(meta.category, "thoughts");
        assert_eq!(meta.thumbnail_url, "backgrounds/wall1.jpg");
        assert_eq!(meta.post_type, "");
        assert!(!meta.is_open_source);
        assert_eq!(meta.published_at, None);
        assert!(notes.is_empty());
    }

    #[test]
    fn recognised_keys_are_read() {
        let mut notes = Vec::new();
        let meta = post_meta(
            &front(
                "category: tech\npost_type: tutorial\nlanguage: Rust\nopen_source: yes\nproject: quire\nthumb: covers/q.png",
            ),
            &MetadataDefaults::default(),
            &mut notes,
        );
        assert_eq!(meta.category, "tech");
        assert_eq!(meta.post_type, "tutorial");
        assert_eq!(meta.language, "Rust");
        assert!(meta.is_open_source);
        assert_eq!(meta.project_name, "quire");
        assert_eq!(meta.thumbnail_url, "covers/q.png");
    }

    #[test]
    fn configured_defaults_apply() {
        let defaults = MetadataDefaults {
            post_category: "notes".into(),
            thumbnail: "t.jpg".into(),
        };
        let meta = post_meta(&FrontMatter::default(), &defaults, &mut Vec::new());
        assert_eq!(meta.category, "notes");
        assert_eq!(meta.thumbnail_url, "t.jpg");
    }

    #[rstest]
    #[case("2024-03-05", "2024-03-05 00:00:00")]
    #[case("2024-03-05 10:20:30", "2024-03-05 10:20:30")]
    #[case("2024-03-05T10:20:30", "2024-03-05 10:20:30")]
    #[case("2024-03-05T10:20:30+02:00", "2024-03-05 08:20:30")]
    fn dates_parse(#[case] raw: &str, #[case] expected: &str) {
        let parsed = parse_date(raw).expect("date parses");
        assert_eq!(parsed.format("%Y-%m-%d %H:%M:%S").to_string(), expected);
    }

    #[test]
    fn bad_date_is_noted() {
        let mut notes = Vec::new();
        let meta = post_meta(
            &front("date: last tuesday"),
            &MetadataDefaults::default(),
            &mut notes,
        );
        assert_eq!(meta.published_at, None);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("last tuesday"));
    }

    #[test]
    fn wiki_parent_title_is_optional() {
        assert_eq!(wiki_meta(&FrontMatter::default()).parent_title, None);
        assert_eq!(
            wiki_meta(&front("parent_title: Linux")).parent_title.as_deref(),
            Some("Linux")
        );
    }
}

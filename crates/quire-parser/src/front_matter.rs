//! YAML front-matter splitting.
//!
//! A front-matter block is a YAML mapping fenced by `---` lines at the very
//! top of the file:
//!
//! ```text
//! ---
//! title: My Post
//! open_source: true
//! ---
//! Body starts here.
//! ```
//!
//! Only scalar values are kept. Strings stay strings, numbers become their
//! decimal text, booleans stay booleans; sequences and nested mappings are
//! ignored because no recognised key uses them.

use std::collections::BTreeMap;

use serde_yaml::Value;

const FENCE: &str = "---";

/// A scalar front-matter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Text(String),
    Bool(bool),
}

impl MetaValue {
    /// Text form of the value (`true`/`false` for booleans).
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Bool(flag) => flag.to_string(),
        }
    }

    /// Loose truthiness: `true`, non-zero numbers, `yes`/`on`/`y`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(flag) => *flag,
            Self::Text(text) => {
                let text = text.trim().to_ascii_lowercase();
                matches!(text.as_str(), "true" | "yes" | "on" | "y")
                    || text.parse::<f64>().is_ok_and(|n| n != 0.0)
            }
        }
    }
}

/// Parsed front matter as a key → scalar map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    values: BTreeMap<String, MetaValue>,
}

impl FrontMatter {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.values.get(key)
    }

    /// Trimmed text of `key`, `None` when absent or blank.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(MetaValue::as_text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }

    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(MetaValue::is_truthy)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    fn from_yaml(value: Value) -> Result<Self, String> {
        let mapping = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            _ => return Err("front matter is not a key/value mapping".to_string()),
        };

        let mut values = BTreeMap::new();
        for (key, value) in mapping {
            let Some(key) = scalar_text(&key) else {
                continue;
            };
            let value = match value {
                Value::Bool(flag) => MetaValue::Bool(flag),
                other => match scalar_text(&other) {
                    Some(text) => MetaValue::Text(text),
                    None => continue,
                },
            };
            values.insert(key, value);
        }
        Ok(Self { values })
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Result of splitting a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSource {
    pub front_matter: FrontMatter,
    /// Body with surrounding whitespace trimmed.
    pub body: String,
    /// Set when a front-matter block was present but had to be ignored.
    pub note: Option<String>,
}

/// Split raw text into front matter and body. Never fails.
#[must_use]
pub fn split_front_matter(text: &str) -> SplitSource {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let Some((yaml, body)) = fenced_block(text) else {
        let note = is_fence(text.lines().next().unwrap_or_default())
            .then(|| "front matter has no closing '---'; treated as body".to_string());
        return SplitSource {
            front_matter: FrontMatter::default(),
            body: text.trim().to_string(),
            note,
        };
    };

    let parsed = if yaml.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_yaml::from_str::<Value>(yaml)
    };
    let (front_matter, note) = match parsed {
        Ok(value) => match FrontMatter::from_yaml(value) {
            Ok(front_matter) => (front_matter, None),
            Err(reason) => (FrontMatter::default(), Some(reason)),
        },
        Err(error) => (
            FrontMatter::default(),
            Some(format!("front matter ignored: {error}")),
        ),
    };

    SplitSource {
        front_matter,
        body: body.trim().to_string(),
        note,
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

/// Locate `---\n<yaml>\n---\n<body>`; returns `(yaml, body)`.
fn fenced_block(text: &str) -> Option<(&str, &str)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if !is_fence(first) {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_fence(line) {
            return Some((&text[yaml_start..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

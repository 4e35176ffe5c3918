//! Reading the JSON envelope wrangler prints for `--json`:
//!
//! ```text
//! [ { "results": [ { "id": 7 } ], "success": true, "meta": { ... } } ]
//! ```
//!
//! npm and wrangler sometimes print banners before the JSON, so parsing
//! starts at the first line that opens an array and decodes successfully.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// One statement's result set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub results: Vec<Map<String, Value>>,
    #[serde(default = "default_success")]
    pub success: bool,
}

const fn default_success() -> bool {
    true
}

/// Parse all statement results from executor stdout.
///
/// # Errors
///
/// Returns [`StoreError::Response`] when no JSON envelope can be found.
pub fn parse_results(stdout: &str) -> Result<Vec<StatementResult>, StoreError> {
    let mut offset = 0;
    for line in stdout.split_inclusive('\n') {
        if line.trim_start().starts_with('[') {
            let candidate = &stdout[offset..];
            let mut stream =
                serde_json::Deserializer::from_str(candidate).into_iter::<Vec<StatementResult>>();
            if let Some(Ok(results)) = stream.next() {
                return Ok(results);
            }
        }
        offset += line.len();
    }
    Err(StoreError::Response(format!(
        "no JSON result envelope in output: {}",
        truncate(stdout.trim(), 200)
    )))
}

/// Whether an envelope in `stdout` marks any statement as failed. Output
/// without an envelope reports nothing.
#[must_use]
pub fn reports_failure(stdout: &str) -> bool {
    parse_results(stdout).is_ok_and(|results| results.iter().any(|statement| !statement.success))
}

/// All rows of every statement, in order.
///
/// # Errors
///
/// Returns [`StoreError::Response`] when no JSON envelope can be found.
pub fn rows(stdout: &str) -> Result<Vec<Map<String, Value>>, StoreError> {
    Ok(parse_results(stdout)?
        .into_iter()
        .flat_map(|statement| statement.results)
        .collect())
}

/// The `id` column of the first row, if any.
///
/// # Errors
///
/// Returns [`StoreError::Response`] when no JSON envelope can be found or
/// the `id` is not an integer.
pub fn first_row_id(stdout: &str) -> Result<Option<i64>, StoreError> {
    let Some(row) = rows(stdout)?.into_iter().next() else {
        return Ok(None);
    };
    match row.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => integer(value)
            .map(Some)
            .ok_or_else(|| StoreError::Response(format!("non-integer id: {value}"))),
    }
}

/// Integers may arrive as JSON numbers or numeric strings.
pub(crate) fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

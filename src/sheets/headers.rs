use std::sync::LazyLock;

use regex::Regex;

use crate::models::Record;

pub const TIMESTAMP_HEADER: &str = "Timestamp";
pub const FORM_TYPE_HEADER: &str = "Form Type";

static UPPERCASE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([A-Z])").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_]").unwrap());

/// `first_name` / `firstName` -> `First Name`.
pub fn key_to_header(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let spaced = UPPERCASE_RE.replace_all(&spaced, " $1");

    let mut out = String::with_capacity(spaced.len());
    let mut prev_is_word = false;
    for c in spaced.chars() {
        let is_word = c.is_ascii_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }

    out.trim().to_string()
}

/// `First Name` -> `first_name`.
pub fn header_to_key(header: &str) -> String {
    let lowered = header.to_lowercase();
    let joined = WHITESPACE_RE.replace_all(&lowered, "_");
    NON_KEY_RE.replace_all(&joined, "").into_owned()
}

/// Header row for a sheet created from `record`.
pub fn header_for_record(record: &Record) -> Vec<String> {
    let mut header = vec![TIMESTAMP_HEADER.to_string(), FORM_TYPE_HEADER.to_string()];
    header.extend(record.keys().map(key_to_header));
    header
}

/// Columns `record` would contribute that `header` does not hold yet, in record order.
pub fn missing_columns(header: &[String], record: &Record) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for column in record.keys().map(key_to_header) {
        if !header.contains(&column) && !missing.contains(&column) {
            missing.push(column);
        }
    }
    missing
}

/// Lay `record` out along `header`. Unknown fields are dropped, absent ones are empty.
pub fn build_row(header: &[String], form_type: &str, timestamp: &str, record: &Record) -> Vec<String> {
    header
        .iter()
        .map(|column| match column.as_str() {
            TIMESTAMP_HEADER => timestamp.to_string(),
            FORM_TYPE_HEADER => form_type.to_string(),
            other => record
                .get(&header_to_key(other))
                .map(|value| value.render())
                .unwrap_or_default(),
        })
        .collect()
}

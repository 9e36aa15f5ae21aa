//! Genre field normalization
//!
//! The mart's genre column arrives in whatever shape the upstream transform
//! produced: a native list, a delimited string with optional bracket and
//! quote wrapping, a bare scalar, or nothing at all. This module is the
//! contract boundary that absorbs every one of those shapes: no input
//! makes it fail, malformed values degrade to an empty label list.

use serde_json::Value;

/// A raw genre field, classified once at ingestion into a closed set of
/// shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum GenreField {
    /// A native sequence of labels
    List(Vec<String>),
    /// A delimited string, possibly bracket/quote wrapped
    Text(String),
    /// Null or absent
    Missing,
    /// Any other scalar, carried as its string form
    Scalar(String),
}

impl GenreField {
    /// Classify a raw JSON value. Total: every value maps to a shape.
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Null => GenreField::Missing,
            Value::Array(items) => GenreField::List(items.iter().map(element_string).collect()),
            Value::String(s) => GenreField::Text(s.clone()),
            // Best-effort iteration over map shapes yields their keys
            Value::Object(map) => GenreField::List(map.keys().cloned().collect()),
            other => GenreField::Scalar(other.to_string()),
        }
    }

    /// Flatten into an ordered list of lowercase, trimmed labels. Labels
    /// that come out empty are dropped, never aggregated.
    pub fn normalize(&self) -> Vec<String> {
        match self {
            GenreField::Missing => Vec::new(),
            GenreField::List(items) => items
                .iter()
                .map(|item| item.to_lowercase().trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            GenreField::Text(text) => split_delimited(text),
            GenreField::Scalar(scalar) => {
                let label = scalar.to_lowercase().trim().to_string();
                if label.is_empty() {
                    Vec::new()
                } else {
                    vec![label]
                }
            }
        }
    }
}

/// Normalize one raw genre value into a flat list of clean lowercase tokens.
pub fn normalize_genre_field(value: &Value) -> Vec<String> {
    GenreField::classify(value).normalize()
}

/// String form of a sequence element: strings pass through as-is, anything
/// else keeps its JSON rendering. A nested list stays bracketed here and is
/// unwrapped by the cleaning pass.
fn element_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Delimited-string rule: unify `;` to `,`, drop bracket characters, split,
/// then per piece trim whitespace, trim one quote character per side, and
/// lowercase.
fn split_delimited(text: &str) -> Vec<String> {
    let unified = text.replace(';', ",");
    let stripped: String = unified
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '{' | '}'))
        .collect();

    stripped
        .split(',')
        .map(|piece| trim_quotes(piece.trim()).to_lowercase())
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn trim_quotes(piece: &str) -> &str {
    let quotes: &[char] = &['\'', '"'];
    let piece = piece.strip_prefix(quotes).unwrap_or(piece);
    piece.strip_suffix(quotes).unwrap_or(piece)
}

/// Clean one exploded genre label: strip bracket, brace and quote
/// characters, lowercase, trim. Returns None rather than an empty string so
/// callers can filter without relying on emptiness.
pub fn clean_label(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '{' | '}' | '"' | '\''))
        .collect();
    let cleaned = cleaned.trim().to_lowercase();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

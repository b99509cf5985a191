//! Validation failure trees and their normalization into one localized
//! message per failing field.

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::i18n::Translate;

/// Prefix of the keys synthesized for violations that carry no key
pub const FIELD_KEY_PREFIX: &str = "error.fields";

/// One failing field, or one embedded object with failing fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationFailureNode {
    pub field_path: String,
    /// Violated rule names mapped to their failure keys, in the order the
    /// rules were evaluated
    pub violated: IndexMap<String, Option<String>>,
    /// Failures of nested fields. When present they shadow `violated`.
    pub children: Vec<ValidationFailureNode>,
}

impl ValidationFailureNode {
    pub fn new(field_path: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            violated: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Record a violated rule. A rule that is already recorded keeps its
    /// position and takes the new key.
    pub fn violate(mut self, rule: impl Into<String>, failure_key: Option<String>) -> Self {
        self.violated.insert(rule.into(), failure_key);
        self
    }

    pub fn with_child(mut self, child: ValidationFailureNode) -> Self {
        self.children.push(child);
        self
    }

    /// Neither violations nor children
    pub fn is_empty(&self) -> bool {
        self.violated.is_empty() && self.children.is_empty()
    }

    /// Number of leaf fields that would be reported
    pub fn failing_fields(&self) -> usize {
        if self.children.is_empty() {
            usize::from(!self.violated.is_empty())
        } else {
            self.children.iter().map(Self::failing_fields).sum()
        }
    }
}

/// Lookup key for a violation: the engine-supplied key, or
/// `error.fields.<snake_case(rule)>` when it is missing or empty.
pub fn failure_key(rule: &str, key: Option<&str>) -> String {
    match key {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => format!("{}.{}", FIELD_KEY_PREFIX, snake_case(rule)),
    }
}

/// Copy of the tree with every missing failure key filled in.
pub fn sanitize(node: &ValidationFailureNode) -> ValidationFailureNode {
    ValidationFailureNode {
        field_path: node.field_path.clone(),
        violated: node
            .violated
            .iter()
            .map(|(rule, key)| (rule.clone(), Some(failure_key(rule, key.as_deref()))))
            .collect(),
        children: node.children.iter().map(sanitize).collect(),
    }
}

/// Flatten a failure tree into `field path -> localized message`.
///
/// Nested failures shadow the violations of their parent. Each leaf field
/// reports only its first violated rule. Nodes with neither violations nor
/// children are skipped.
pub fn normalize<T>(node: &ValidationFailureNode, translator: &T) -> IndexMap<String, String>
where
    T: Translate + ?Sized,
{
    normalize_all(std::slice::from_ref(node), translator)
}

/// [`normalize`] over a list of sibling nodes, in order. A field reported by
/// an earlier node keeps its message.
pub fn normalize_all<T>(nodes: &[ValidationFailureNode], translator: &T) -> IndexMap<String, String>
where
    T: Translate + ?Sized,
{
    let mut messages = IndexMap::new();
    for node in nodes {
        collect(node, translator, &mut messages);
    }
    messages
}

fn collect<T>(node: &ValidationFailureNode, translator: &T, messages: &mut IndexMap<String, String>)
where
    T: Translate + ?Sized,
{
    if !node.children.is_empty() {
        for child in &node.children {
            collect(child, translator, messages);
        }
        return;
    }

    if let Some((rule, key)) = node.violated.first() {
        let key = failure_key(rule, key.as_deref());
        messages
            .entry(node.field_path.clone())
            .or_insert_with(|| translator.translate(&key));
    }
}

/// Convert `camelCase`, `PascalCase`, `kebab-case` or spaced words to
/// `snake_case`. Acronyms stay together (`isUUID` -> `is_uuid`) and digit
/// runs become their own word.
pub fn snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase() && c.is_uppercase() && next_is_lower)
                || (prev.is_ascii_digit() != c.is_ascii_digit());
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// The response payload of a failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedError {
    pub code: u16,
    pub timestamp: String,
    pub path: String,
    pub message: IndexMap<String, String>,
}

impl NormalizedError {
    pub fn new<T>(code: u16, path: impl Into<String>, failure: &ValidationFailureNode, translator: &T) -> Self
    where
        T: Translate + ?Sized,
    {
        Self {
            code,
            timestamp: iso_timestamp(),
            path: path.into(),
            message: normalize(failure, translator),
        }
    }
}

/// Current time as ISO-8601 with millisecond precision, e.g.
/// `2024-05-01T12:00:00.000Z`
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

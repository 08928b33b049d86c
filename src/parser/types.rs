use std::sync::LazyLock;

use regex::Regex;

use crate::schema::{ItemType, SchemaType};

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Tokens that name composite or callback types, never literal enum members.
const SENTINEL_TOKENS: &[&str] = &["StyleAttr", "Function"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeClass {
    Array(ItemType),
    Enumerated(Vec<String>),
    /// Cannot be expressed in the schema vocabulary; the attribute is dropped.
    Any,
    Scalar(SchemaType),
}

/// Classify the italic type text of a metadata block. Rules are tried in a
/// fixed order and the first match wins.
pub fn classify(raw: &str) -> TypeClass {
    if raw.is_empty() {
        return TypeClass::Scalar(SchemaType::String);
    }

    if raw.contains("[]") {
        let item = if raw.contains("number") {
            ItemType::Number
        } else {
            ItemType::String
        };
        TypeClass::Array(item)
    } else if raw.contains("array object") {
        TypeClass::Array(ItemType::Object)
    } else if raw.contains("array") {
        TypeClass::Array(ItemType::String)
    } else if raw.contains('|') {
        TypeClass::Enumerated(enum_members(raw))
    } else if raw.contains("any") {
        TypeClass::Any
    } else {
        TypeClass::Scalar(SchemaType::from_token(raw))
    }
}

/// Word runs of a union type, first-seen order, sentinels removed.
pub fn enum_members(raw: &str) -> Vec<String> {
    let compact: String = raw.split_whitespace().collect();
    let mut members: Vec<String> = Vec::new();
    for m in WORD_RE.find_iter(&compact) {
        let token = m.as_str();
        if SENTINEL_TOKENS.contains(&token) || members.iter().any(|t| t == token) {
            continue;
        }
        members.push(token.to_string());
    }
    members
}

//! Tolerant field deserializers for media-server payloads.
//!
//! Server payloads are partial and loosely typed: a field may be absent,
//! `null`, or carry an unexpected JSON type. These helpers collapse every
//! unusable shape to `None` instead of failing the whole page.

use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
#[allow(dead_code)]
enum LooseNumber {
    Int(i64),
    Float(f64),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
#[allow(dead_code)]
enum LooseList {
    List(Vec<LooseText>),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
#[allow(dead_code)]
enum LooseMap {
    Map(BTreeMap<String, LooseText>),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
#[allow(dead_code)]
enum LooseBool {
    Bool(bool),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
#[allow(dead_code)]
enum LooseText {
    Text(String),
    Int(i64),
    Other(IgnoredAny),
}

/// Accept a JSON number that fits in `i32`; strings, booleans and
/// fractional values read as absent.
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseNumber>::deserialize(deserializer)?;
    Ok(match value {
        Some(LooseNumber::Int(n)) => i32::try_from(n).ok(),
        Some(LooseNumber::Float(f))
            if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 =>
        {
            Some(f as i32)
        }
        _ => None,
    })
}

/// Accept a non-empty JSON string. Empty strings count as absent.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseText>::deserialize(deserializer)?;
    Ok(match value {
        Some(LooseText::Text(text)) if !text.is_empty() => Some(text),
        _ => None,
    })
}

/// Item ids are strings on Emby, but some proxies emit them as integers.
pub fn identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseText>::deserialize(deserializer)?;
    Ok(match value {
        Some(LooseText::Text(text)) => text,
        Some(LooseText::Int(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// A list of strings where non-string members are skipped.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Option::<LooseList>::deserialize(deserializer)? {
        Some(LooseList::List(entries)) => entries,
        _ => return Ok(Vec::new()),
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            LooseText::Text(text) if !text.is_empty() => Some(text),
            _ => None,
        })
        .collect())
}

fn loose_map<'de, D>(
    deserializer: D,
    keep_numbers: bool,
) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Option::<LooseMap>::deserialize(deserializer)? {
        Some(LooseMap::Map(entries)) => entries,
        _ => return Ok(BTreeMap::new()),
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| match value {
            LooseText::Text(text) if !text.is_empty() => Some((key, text)),
            LooseText::Int(n) if keep_numbers => Some((key, n.to_string())),
            _ => None,
        })
        .collect())
}

/// A string-to-string object. `null` or a non-object reads as empty and
/// entries with non-string values are skipped.
pub fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    loose_map(deserializer, false)
}

/// Like [`string_map`], but integer values are kept in their decimal form.
/// Provider ids such as `Tmdb` arrive as numbers from some servers.
pub fn identifier_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    loose_map(deserializer, true)
}

/// A boolean flag. Anything that is not a JSON boolean reads as `false`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(
        Option::<LooseBool>::deserialize(deserializer)?,
        Some(LooseBool::Bool(true))
    ))
}

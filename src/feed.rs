// src/feed.rs
//! Feed model: the JSON document published at `news/latest.json`.
//!
//! Decoding is lenient: a missing or `null` string becomes `""`, a missing
//! list becomes empty, a malformed star count becomes 0 and a sub-object of
//! the wrong type (`source`, `highlight`, list entries) is dropped. Only a
//! body that is not a JSON object fails to decode.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// The four sections the page knows how to render, in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Business,
    Tools,
    Company,
    Sns,
}

impl SectionId {
    pub const ALL: [SectionId; 4] = [
        SectionId::Business,
        SectionId::Tools,
        SectionId::Company,
        SectionId::Sns,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionId::Business => "business",
            SectionId::Tools => "tools",
            SectionId::Company => "company",
            SectionId::Sns => "sns",
        }
    }

    /// Case-insensitive lookup, so `/sections/SNS` works too.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    #[serde(default, deserialize_with = "string_or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(default, deserialize_with = "string_or_default")]
    pub category: String,
    #[serde(default, deserialize_with = "stars_or_zero")]
    pub stars: i64,
    #[serde(default, deserialize_with = "string_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "list_or_default")]
    pub sources: Vec<SourceLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, deserialize_with = "string_or_default")]
    pub category: String,
    #[serde(default, deserialize_with = "stars_or_zero")]
    pub stars: i64,
    #[serde(default, deserialize_with = "string_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub blurb: String,
    /// Display date as published by the feed builder; empty when absent.
    #[serde(default, deserialize_with = "string_or_default")]
    pub date: String,
    #[serde(default, deserialize_with = "object_or_none")]
    pub source: Option<SourceLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    #[serde(default, deserialize_with = "object_or_none")]
    pub highlight: Option<Highlight>,
    /// Keyed by section id. Only the ids in [`SectionId::ALL`] are decoded;
    /// any other key is skipped whatever its value.
    #[serde(default, deserialize_with = "known_sections")]
    pub sections: HashMap<String, Vec<Item>>,
    /// Timestamp text; a numeric value (epoch milliseconds) is stored as RFC 3339.
    #[serde(default, deserialize_with = "timestamp_or_none")]
    pub generated_at: Option<String>,
}

impl Feed {
    /// Decode a feed body. A literal `null` counts as "no feed".
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let v: Value = serde_json::from_slice(bytes).context("decoding feed json")?;
        match v {
            Value::Object(_) => serde_json::from_value(v).context("decoding feed object"),
            Value::Null => bail!("feed body is null"),
            _ => bail!("feed body is not an object"),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Self::from_slice(s.as_bytes())
    }

    /// Items for a section, empty when the section is missing.
    pub fn section(&self, id: SectionId) -> &[Item] {
        self.sections
            .get(id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn item_count(&self) -> usize {
        SectionId::ALL.iter().map(|id| self.section(*id).len()).sum()
    }
}

fn string_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

fn stars_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
            .unwrap_or(0),
        _ => 0,
    })
}

/// Decode an object-shaped value; anything else (or a decode error) is `None`.
fn from_object<T: DeserializeOwned>(v: Value) -> Option<T> {
    if v.is_object() {
        serde_json::from_value(v).ok()
    } else {
        None
    }
}

fn object_or_none<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(d)?.and_then(from_object))
}

fn objects_in(v: Value) -> Vec<Value> {
    match v {
        Value::Array(a) => a,
        _ => Vec::new(),
    }
}

fn list_or_default<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Option::<Value>::deserialize(d)?.unwrap_or(Value::Null);
    Ok(objects_in(v).into_iter().filter_map(from_object).collect())
}

fn known_sections<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<HashMap<String, Vec<Item>>, D::Error> {
    let raw = match Option::<Value>::deserialize(d)? {
        Some(Value::Object(m)) => m,
        _ => return Ok(HashMap::new()),
    };
    Ok(raw
        .into_iter()
        .filter(|(k, _)| SectionId::ALL.iter().any(|id| id.as_str() == k.as_str()))
        .map(|(k, v)| {
            let items = objects_in(v).into_iter().filter_map(from_object).collect();
            (k, items)
        })
        .collect())
}

fn timestamp_or_none<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        _ => None,
    })
}

//! JSON persistence for group and game records.
//!
//! Records come from a document store that omits empty collections, stores
//! nulls for removed entries and writes timestamps in several shapes. The
//! helpers here keep decoding tolerant of all of that.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ScoreError;
use crate::game::Game;
use crate::group::GameGroup;

pub fn parse_group(json: &str) -> Result<GameGroup, ScoreError> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_game(json: &str) -> Result<Game, ScoreError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_group(path: impl AsRef<Path>) -> Result<GameGroup, ScoreError> {
    let path = path.as_ref();
    let group = parse_group(&fs::read_to_string(path)?)?;
    tracing::info!(
        path = %path.display(),
        group = %group.id,
        games = group.games().len(),
        "loaded group"
    );
    Ok(group)
}

pub fn load_game(path: impl AsRef<Path>) -> Result<Game, ScoreError> {
    let path = path.as_ref();
    let game = parse_game(&fs::read_to_string(path)?)?;
    tracing::info!(
        path = %path.display(),
        game = %game.id,
        rounds = game.rounds().len(),
        "loaded game"
    );
    Ok(game)
}

pub fn save_group(path: impl AsRef<Path>, group: &GameGroup) -> Result<(), ScoreError> {
    write_json(path.as_ref(), group)
}

pub fn save_game(path: impl AsRef<Path>, game: &Game) -> Result<(), ScoreError> {
    write_json(path.as_ref(), game)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ScoreError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), "wrote record");
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawItem<T> {
    Item(T),
    Malformed(IgnoredAny),
}

/// Decodes a missing or null list as empty, drops null entries and skips
/// entries that do not decode.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries: Option<Vec<Option<RawItem<T>>>> = Option::deserialize(deserializer)?;
    let mut items = Vec::new();
    for entry in entries.into_iter().flatten().flatten() {
        match entry {
            RawItem::Item(item) => items.push(item),
            RawItem::Malformed(_) => tracing::warn!("unreadable list entry, skipping it"),
        }
    }
    Ok(items)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Integer(i64),
    Float(f64),
    Text(String),
    Malformed(IgnoredAny),
}

impl RawNumber {
    fn to_f64(&self) -> Option<f64> {
        let value = match self {
            RawNumber::Integer(n) => *n as f64,
            RawNumber::Float(f) => *f,
            RawNumber::Text(text) => text.trim().parse::<f64>().ok()?,
            RawNumber::Malformed(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Fractions are rounded and out-of-range values saturate.
    fn to_i64(&self) -> Option<i64> {
        match self {
            RawNumber::Integer(n) => Some(*n),
            RawNumber::Text(text) => match text.trim().parse::<i64>() {
                Ok(n) => Some(n),
                Err(_) => self.to_f64().map(|f| f.round() as i64),
            },
            _ => self.to_f64().map(|f| f.round() as i64),
        }
    }
}

/// Whole number stored as a number or a numeric string. Null and missing
/// decode as `None`; anything else unreadable decodes as `None` with a warning.
pub(crate) fn lenient_optional_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<RawNumber>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let parsed = raw.to_i64();
    if parsed.is_none() {
        tracing::warn!("unreadable number, ignoring it");
    }
    Ok(parsed)
}

/// Like [`lenient_optional_int`], with zero for absent or unreadable values.
pub(crate) fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_int(deserializer)?.unwrap_or(0))
}

/// Decimal stored as a number or a numeric string, zero when unreadable.
pub(crate) fn lenient_float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<RawNumber>::deserialize(deserializer)? else {
        return Ok(0.0);
    };
    Ok(raw.to_f64().unwrap_or_else(|| {
        tracing::warn!("unreadable decimal, using zero");
        0.0
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Integer(i64),
    Text(String),
    Malformed(IgnoredAny),
}

/// Boolean stored as `true`/`false`, `1`/`0` or their string forms.
pub(crate) fn lenient_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<RawFlag>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(RawFlag::Bool(flag)) => Some(flag),
        Some(RawFlag::Integer(n)) => Some(n != 0),
        Some(RawFlag::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Some(RawFlag::Malformed(_)) => None,
    };
    if parsed.is_none() {
        tracing::warn!("unreadable flag, ignoring it");
    }
    Ok(parsed)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
    FractionalMillis(f64),
    Document {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    Malformed(IgnoredAny),
}

/// Accepts RFC 3339 strings, epoch milliseconds and `{seconds, nanoseconds}`
/// documents. Anything else decodes as no timestamp.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<RawTimestamp>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(RawTimestamp::Text(text)) => DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|date| date.with_timezone(&Utc)),
        Some(RawTimestamp::Millis(millis)) => DateTime::from_timestamp_millis(millis),
        Some(RawTimestamp::FractionalMillis(millis)) => {
            DateTime::from_timestamp_millis(millis as i64)
        }
        Some(RawTimestamp::Document {
            seconds,
            nanoseconds,
        }) => DateTime::from_timestamp(seconds, nanoseconds),
        Some(RawTimestamp::Malformed(_)) => None,
    };
    if parsed.is_none() {
        tracing::warn!("unreadable timestamp, ignoring it");
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Stamped {
        #[serde(default, deserialize_with = "lenient_timestamp")]
        at: Option<DateTime<Utc>>,
    }

    fn stamp(json: &str) -> Option<DateTime<Utc>> {
        serde_json::from_str::<Stamped>(json).expect("always decodes").at
    }

    #[derive(Deserialize)]
    struct Counted {
        #[serde(default, deserialize_with = "lenient_int")]
        points: i64,
        #[serde(default, deserialize_with = "lenient_optional_flag")]
        flag: Option<bool>,
    }

    fn counted(json: &str) -> (i64, Option<bool>) {
        let decoded = serde_json::from_str::<Counted>(json).expect("always decodes");
        (decoded.points, decoded.flag)
    }

    #[test]
    fn numbers_in_text_and_fraction_form() {
        assert_eq!(counted(r#"{"points": 5}"#).0, 5);
        assert_eq!(counted(r#"{"points": "5"}"#).0, 5);
        assert_eq!(counted(r#"{"points": " -3 "}"#).0, -3);
        assert_eq!(counted(r#"{"points": 2.6}"#).0, 3);
        assert_eq!(counted(r#"{"points": "2.5"}"#).0, 3);
        assert_eq!(counted(r#"{"points": 1e300}"#).0, i64::MAX);
    }

    #[test]
    fn unreadable_numbers_count_as_zero() {
        assert_eq!(counted("{}").0, 0);
        assert_eq!(counted(r#"{"points": null}"#).0, 0);
        assert_eq!(counted(r#"{"points": "five"}"#).0, 0);
        assert_eq!(counted(r#"{"points": [5]}"#).0, 0);
        assert_eq!(counted(r#"{"points": {"n": 5}}"#).0, 0);
    }

    #[test]
    fn flags_in_every_stored_shape() {
        assert_eq!(counted(r#"{"flag": true}"#).1, Some(true));
        assert_eq!(counted(r#"{"flag": 0}"#).1, Some(false));
        assert_eq!(counted(r#"{"flag": "TRUE"}"#).1, Some(true));
        assert_eq!(counted(r#"{"flag": "sometimes"}"#).1, None);
        assert_eq!(counted(r#"{"flag": null}"#).1, None);
    }

    #[derive(Deserialize)]
    struct Listed {
        #[serde(default, deserialize_with = "lenient_list")]
        items: Vec<u8>,
    }

    #[test]
    fn lists_keep_every_readable_entry() {
        let json = r#"{"items": [1, null, "x", 2, -7, 3]}"#;
        let listed: Listed = serde_json::from_str(json).unwrap();
        assert_eq!(listed.items, vec![1, 2, 3]);
        let listed: Listed = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(listed.items.is_empty());
    }

    #[test]
    fn timestamps_in_every_stored_shape() {
        let expected = DateTime::from_timestamp(1_700_000_000, 0);
        assert_eq!(stamp(r#"{"at": "2023-11-14T22:13:20Z"}"#), expected);
        assert_eq!(stamp(r#"{"at": 1700000000000}"#), expected);
        assert_eq!(stamp(r#"{"at": {"seconds": 1700000000, "nanoseconds": 0}}"#), expected);
        assert_eq!(stamp(r#"{"at": {"_seconds": 1700000000}}"#), expected);
    }

    #[test]
    fn missing_or_broken_timestamps_are_none() {
        assert_eq!(stamp("{}"), None);
        assert_eq!(stamp(r#"{"at": null}"#), None);
        assert_eq!(stamp(r#"{"at": "yesterday"}"#), None);
        assert_eq!(stamp(r#"{"at": true}"#), None);
    }
}

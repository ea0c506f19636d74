//! Preference export string parser
//!
//! The external generator exports preferences as `role=level` pairs joined by `&`,
//! e.g. `rifleman=sometimes&medic=never&sniper=always`. There is no escaping,
//! nesting or URL decoding.

use std::collections::BTreeMap;
use thiserror::Error;

/// Why a preferences string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("the preferences string is empty")]
    Empty,

    #[error("`{0}` is not a key=value pair")]
    MalformedSegment(String),
}

/// Split an export string into role key -> raw label
///
/// Each segment is split on its first `=`; when a key repeats, the last
/// occurrence wins. Labels are returned as-is and not yet checked against
/// the level vocabulary.
pub fn parse_preference_string(input: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let mut pairs = BTreeMap::new();

    for segment in input.trim().split('&') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let (key, value) = segment
            .split_once('=')
            .ok_or_else(|| ParseError::MalformedSegment(segment.to_string()))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(ParseError::MalformedSegment(segment.to_string()));
        }

        pairs.insert(key.to_string(), value.trim().to_string());
    }

    if pairs.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(pairs)
}

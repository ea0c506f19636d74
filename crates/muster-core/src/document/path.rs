//! Dotted field paths into a JSON document

use serde_json::Value;
use std::fmt;

/// Path to a field inside a document, e.g. `preferences.roles.medic`
///
/// Segments are kept separately, so a key containing `-` or `_` never needs
/// escaping. Keys containing `.` are not representable through [`FieldPath::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parse a dotted path; empty segments are dropped
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|segment| !segment.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    /// Build a path from individual segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Append a segment, returning the longer path
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into parent segments and the final key
    pub fn split_last(&self) -> Option<(&String, &[String])> {
        self.0.split_last()
    }

    /// Resolve the path against a document
    pub fn lookup<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.0
            .iter()
            .try_fold(document, |current, segment| current.as_object()?.get(segment))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_and_display() {
        let path = FieldPath::parse("preferences.roles.fixed-wing_pilot");
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.to_string(), "preferences.roles.fixed-wing_pilot");
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        assert_eq!(FieldPath::parse("a..b."), FieldPath::from_segments(["a", "b"]));
        assert!(FieldPath::parse("").is_empty());
    }

    #[test]
    fn test_child() {
        let roles = FieldPath::parse("preferences.roles");
        assert_eq!(roles.child("medic").to_string(), "preferences.roles.medic");
    }

    #[test]
    fn test_lookup() {
        let doc = json!({ "preferences": { "roles": { "medic": { "value": 1 } } } });
        let value = FieldPath::parse("preferences.roles.medic.value").lookup(&doc);
        assert_eq!(value, Some(&json!(1)));

        assert!(FieldPath::parse("preferences.roles.sniper").lookup(&doc).is_none());
        assert!(FieldPath::parse("preferences.roles.medic.value.deeper").lookup(&doc).is_none());
    }
}

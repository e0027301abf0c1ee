//! Named request parameters.
//!
//! `ParameterSet` keeps insertion order so that the encoded query string or
//! body is identical for the same logical call.

use std::time::{SystemTime, UNIX_EPOCH};

/// A single parameter value before form encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Bool(bool),
    /// Seconds since the Unix epoch.
    Timestamp(i64),
}

impl ParamValue {
    /// Canonical string form sent on the wire.
    pub fn to_wire(&self) -> String {
        match self {
            ParamValue::Text(s) => s.clone(),
            ParamValue::Int(n) | ParamValue::Timestamp(n) => n.to_string(),
            ParamValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<SystemTime> for ParamValue {
    /// Times before the epoch are sent as negative seconds.
    fn from(value: SystemTime) -> Self {
        let secs = match value.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        };
        ParamValue::Timestamp(secs)
    }
}

/// Insertion-ordered mapping from parameter name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(String, ParamValue)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`. A replaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Insert `name` only when `value` is present. Absent values are never
    /// encoded, not even as an empty string.
    pub fn insert_opt<V: Into<ParamValue>>(&mut self, name: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_opt<V: Into<ParamValue>>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.insert_opt(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn keeps_insertion_order() {
        let params = ParameterSet::new()
            .with("padID", "p1")
            .with("rev", 2)
            .with("force", true);
        let names: Vec<&str> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["padID", "rev", "force"]);
    }

    #[test]
    fn replacing_keeps_position() {
        let params = ParameterSet::new()
            .with("a", "1")
            .with("b", "2")
            .with("a", "3");
        assert_eq!(params.len(), 2);
        let pairs: Vec<(&str, String)> = params.iter().map(|(n, v)| (n, v.to_wire())).collect();
        assert_eq!(pairs, vec![("a", "3".to_string()), ("b", "2".to_string())]);
    }

    #[test]
    fn absent_values_are_omitted() {
        let params = ParameterSet::new()
            .with("padID", "p1")
            .with_opt("rev", None::<i64>)
            .with_opt("text", Some("hello"));
        assert_eq!(params.len(), 2);
        assert!(!params.contains("rev"));
        assert!(params.contains("text"));
    }

    #[test]
    fn wire_forms() {
        assert_eq!(ParamValue::from(true).to_wire(), "true");
        assert_eq!(ParamValue::from(false).to_wire(), "false");
        assert_eq!(ParamValue::from(-7i64).to_wire(), "-7");
        assert_eq!(ParamValue::from("x y").to_wire(), "x y");
    }

    #[test]
    fn system_time_becomes_epoch_seconds() {
        let t = UNIX_EPOCH + Duration::from_millis(1_550_319_910_999);
        assert_eq!(ParamValue::from(t), ParamValue::Timestamp(1_550_319_910));
    }

    #[test]
    fn collects_from_pairs() {
        let params: ParameterSet = vec![("groupID", "g.1"), ("padName", "n")].into_iter().collect();
        assert_eq!(params.get("padName"), Some(&ParamValue::Text("n".to_string())));
    }
}

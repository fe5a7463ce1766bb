//! Entity id lists as they appear in build graphs.
//!
//! Meraki encodes `buildsFrom`/`buildsInto` entries sometimes as strings and
//! sometimes as numbers. Both are normalized to `String` here so nothing past
//! the parse boundary has to care.

use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdList(Vec<String>);

impl IdList {
    /// Read an id list out of an already parsed document value.
    /// Anything that is not an array yields an empty list; entries that are
    /// neither strings nor integral numbers are skipped.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Array(entries)) = value else {
            return Self::default();
        };

        let ids = entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => n
                    .as_i64()
                    .map(|v| v.to_string())
                    .or_else(|| n.as_u64().map(|v| v.to_string()))
                    .or_else(|| {
                        n.as_f64()
                            .filter(|f| f.fract() == 0.0)
                            .map(|f| (f as i64).to_string())
                    }),
                _ => None,
            })
            .collect();

        IdList(ids)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_mixed_encodings() {
        let value = json!(["1001", 3006, 3078.0]);
        let ids = IdList::from_value(Some(&value));
        assert_eq!(ids.as_slice(), ["1001", "3006", "3078"]);
    }

    #[test]
    fn test_from_value_skips_junk() {
        let value = json!(["1036", 1037, null, {"id": 1}, 2.5, true]);
        let ids = IdList::from_value(Some(&value));
        assert_eq!(ids.into_vec(), vec!["1036".to_string(), "1037".to_string()]);
    }

    #[test]
    fn test_from_value_non_array_is_empty() {
        assert!(IdList::from_value(None).is_empty());
        assert!(IdList::from_value(Some(&json!("3031"))).is_empty());
    }
}

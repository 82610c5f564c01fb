use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// A single tag value: plain text or an ordered list (e.g. repeated IPTC keywords).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    List(Vec<String>),
}

impl TagValue {
    /// Flatten to one string. Lists are joined with `", "`.
    pub fn as_text(&self) -> String {
        match self {
            TagValue::Text(s) => s.clone(),
            TagValue::List(items) => items.join(", "),
        }
    }

    /// `true` when the value carries no visible text.
    pub fn is_blank(&self) -> bool {
        match self {
            TagValue::Text(s) => s.trim().is_empty(),
            TagValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::Text(s)
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::Text(s.to_string())
    }
}

impl From<Vec<String>> for TagValue {
    fn from(items: Vec<String>) -> Self {
        TagValue::List(items)
    }
}

/// The flat, string-keyed tag map every source produces and [`ImageInfo`](super::ImageInfo)
/// consumes.
///
/// Keys are the English canonical tag names (`"Image Width"`, `"GPS Latitude"`,
/// `"Creator Work Email"`, ...). No key is required; a missing or blank value means
/// "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMap {
    entries: BTreeMap<String, TagValue>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.entries.get(key)
    }

    /// Text of a tag, or `None` if it is missing or blank.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .filter(|v| !v.is_blank())
            .map(TagValue::as_text)
    }

    /// First non-blank value among `keys`, in precedence order.
    pub fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get_str(key))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TagValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Insert only when `key` has no non-blank value yet.
    pub fn insert_if_absent(&mut self, key: &str, value: impl Into<TagValue>) {
        if self.get_str(key).is_none() {
            self.entries.insert(key.to_string(), value.into());
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<TagValue> {
        self.entries.remove(key)
    }

    /// Copy every entry of `other` whose key is not yet set here.
    pub fn fill_from(&mut self, other: TagMap) {
        for (key, value) in other.entries {
            if self.get_str(&key).is_none() {
                self.entries.insert(key, value);
            }
        }
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, TagValue> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Build a map from a decoded JSON object.
    ///
    /// Strings are kept, numbers and booleans are stringified, arrays become lists of their
    /// scalar items. `null` and nested objects are skipped. Returns `None` if `value` is not
    /// an object.
    pub fn from_json_value(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut map = TagMap::new();
        for (key, value) in object {
            match value {
                serde_json::Value::Array(items) => {
                    let items: Vec<String> = items.iter().filter_map(json_scalar).collect();
                    map.insert(key.clone(), TagValue::List(items));
                }
                other => {
                    if let Some(text) = json_scalar(other) {
                        map.insert(key.clone(), TagValue::Text(text));
                    }
                }
            }
        }
        Some(map)
    }
}

fn json_scalar(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        _ => None,
    }
}

impl<'a> IntoIterator for &'a TagMap {
    type Item = (&'a String, &'a TagValue);
    type IntoIter = btree_map::Iter<'a, String, TagValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for TagMap {
    type Item = (String, TagValue);
    type IntoIter = btree_map::IntoIter<String, TagValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<TagValue>> FromIterator<(K, V)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TagMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Split a comma separated tag value into trimmed, non-empty items.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_of_follows_precedence_and_skips_blank() {
        let map: TagMap = [("Rights", "r"), ("Copyright", "  "), ("Copyright Notice", "n")]
            .into_iter()
            .collect();
        assert_eq!(
            map.first_of(&["Copyright", "Copyright Notice", "Rights"]),
            Some("n".to_string())
        );
        assert_eq!(map.first_of(&["Missing"]), None);
    }

    #[test]
    fn list_values_flatten_with_comma() {
        let mut map = TagMap::new();
        map.insert("Keywords", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(map.get_str("Keywords").as_deref(), Some("a, b"));
    }

    #[test]
    fn fill_from_keeps_existing_values() {
        let mut xmp: TagMap = [("Make", "Canon")].into_iter().collect();
        let exif: TagMap = [("Make", "Nikon"), ("ISO", "200")].into_iter().collect();
        xmp.fill_from(exif);
        assert_eq!(xmp.get_str("Make").as_deref(), Some("Canon"));
        assert_eq!(xmp.get_str("ISO").as_deref(), Some("200"));
    }

    #[test]
    fn insert_if_absent_overwrites_blank_only() {
        let mut map: TagMap = [("Headline", "")].into_iter().collect();
        map.insert_if_absent("Headline", "news");
        map.insert_if_absent("Headline", "later");
        assert_eq!(map.get_str("Headline").as_deref(), Some("news"));
    }

    #[test]
    fn from_json_value_converts_scalars_and_arrays() {
        let value = json!({
            "Image Width": 800,
            "Keywords": ["cat", "dog"],
            "Copyright Flag": true,
            "Ignored": null,
            "Nested": { "a": 1 }
        });
        let map = TagMap::from_json_value(&value).unwrap();
        assert_eq!(map.get_str("Image Width").as_deref(), Some("800"));
        assert_eq!(map.get_str("Keywords").as_deref(), Some("cat, dog"));
        assert_eq!(map.get_str("Copyright Flag").as_deref(), Some("True"));
        assert!(!map.contains_key("Ignored"));
        assert!(!map.contains_key("Nested"));
    }

    #[test]
    fn from_json_value_rejects_non_objects() {
        assert!(TagMap::from_json_value(&json!(["a"])).is_none());
        assert!(TagMap::from_json_value(&json!("a")).is_none());
    }

    #[test]
    fn split_list_trims_and_drops_empty() {
        assert_eq!(split_list(" a, ,b ,, c"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}

use super::{TagGroup, put_all};
use crate::exif::TagMap;

/// Object name, label and title of an image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Labels {
    pub object_name: Option<String>,
    pub label: Option<String>,
    pub title: Option<String>,
}

impl Labels {
    /// The first set label in `preferences` order.
    ///
    /// Preferences are matched case-insensitively against `"label"`, `"title"` and
    /// `"object"` (plus a few English/German aliases such as `"object name"` or
    /// `"titel"`). If none of them is set, falls back to label, title, object name, and
    /// finally an empty string. An empty `preferences` slice means
    /// `["label", "title", "object"]`.
    pub fn preferred_label(&self, preferences: &[&str]) -> String {
        let defaults = ["label", "title", "object"];
        let preferences = if preferences.is_empty() {
            &defaults[..]
        } else {
            preferences
        };

        for pref in preferences {
            let candidate = match pref.to_lowercase().as_str() {
                "object" | "objekt" | "name" | "objectname" | "objektname" | "object-name"
                | "objekt-name" | "object.name" | "objekt.name" | "object name"
                | "objekt name" => &self.object_name,
                "label" | "etikett" | "beschriftung" | "aufschrift" => &self.label,
                "title" | "titel" | "überschrift" | "ueberschrift" | "bezeichnung" => {
                    &self.title
                }
                _ => continue,
            };
            if let Some(value) = candidate.as_ref().filter(|v| !v.is_empty()) {
                return value.clone();
            }
        }

        self.label
            .iter()
            .chain(&self.title)
            .chain(&self.object_name)
            .find(|v| !v.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Labels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.preferred_label(&[]))
    }
}

impl TagGroup for Labels {
    fn from_tags(tags: &TagMap) -> Self {
        Self {
            object_name: tags.first_of(&["Object-Name", "Object Name"]),
            label: tags.get_str("Label"),
            title: tags.get_str("Title"),
        }
    }

    fn add_to_map(&self, map: &mut TagMap) {
        put_all(map, &["Label"], self.label.as_deref());
        put_all(map, &["Title"], self.title.as_deref());
        put_all(map, &["Object-Name"], self.object_name.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Labels {
        Labels {
            object_name: Some("obj".into()),
            label: None,
            title: Some("A title".into()),
        }
    }

    #[test]
    fn preferred_label_defaults() {
        assert_eq!(labels().preferred_label(&[]), "A title");
        assert_eq!(labels().to_string(), "A title");
    }

    #[test]
    fn preferred_label_honours_order_and_aliases() {
        assert_eq!(labels().preferred_label(&["Object Name", "title"]), "obj");
        assert_eq!(labels().preferred_label(&["label", "Titel"]), "A title");
        assert_eq!(labels().preferred_label(&["unknown"]), "A title");
    }

    #[test]
    fn preferred_label_empty_when_nothing_set() {
        assert_eq!(Labels::default().preferred_label(&[]), "");
    }

    #[test]
    fn object_name_aliases() {
        let tags: TagMap = [("Object Name", "b")].into_iter().collect();
        assert_eq!(Labels::from_tags(&tags).object_name.as_deref(), Some("b"));
        let tags: TagMap = [("Object Name", "b"), ("Object-Name", "a")].into_iter().collect();
        assert_eq!(Labels::from_tags(&tags).object_name.as_deref(), Some("a"));
    }
}

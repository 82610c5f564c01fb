use super::{TagGroup, put_all};
use crate::exif::TagMap;

/// Editorial workflow fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workflow {
    pub instructions: Option<String>,
    pub transmission_reference: Option<String>,
    pub credit: Option<String>,
    pub source: Option<String>,
}

impl TagGroup for Workflow {
    fn from_tags(tags: &TagMap) -> Self {
        Self {
            instructions: tags.first_of(&["Instructions", "Special Instructions"]),
            transmission_reference: tags
                .first_of(&["Transmission Reference", "Original Transmission Reference"]),
            credit: tags.get_str("Credit"),
            source: tags.get_str("Source"),
        }
    }

    fn add_to_map(&self, map: &mut TagMap) {
        put_all(
            map,
            &["Instructions", "Special Instructions"],
            self.instructions.as_deref(),
        );
        put_all(
            map,
            &["Transmission Reference", "Original Transmission Reference"],
            self.transmission_reference.as_deref(),
        );
        put_all(map, &["Credit"], self.credit.as_deref());
        put_all(map, &["Source"], self.source.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_and_source_stay_separate() {
        let tags: TagMap = [("Credit", "Agency"), ("Source", "Archive")].into_iter().collect();
        let workflow = Workflow::from_tags(&tags);
        let mut map = TagMap::new();
        workflow.add_to_map(&mut map);
        assert_eq!(map.get_str("Credit").as_deref(), Some("Agency"));
        assert_eq!(map.get_str("Source").as_deref(), Some("Archive"));
        assert_eq!(Workflow::from_tags(&map), workflow);
    }

    #[test]
    fn alias_fallbacks() {
        let tags: TagMap = [
            ("Special Instructions", "embargo"),
            ("Original Transmission Reference", "JOB-1"),
        ]
        .into_iter()
        .collect();
        let workflow = Workflow::from_tags(&tags);
        assert_eq!(workflow.instructions.as_deref(), Some("embargo"));
        assert_eq!(workflow.transmission_reference.as_deref(), Some("JOB-1"));
    }
}

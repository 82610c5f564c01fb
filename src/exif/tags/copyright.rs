use super::{TagGroup, put_all};
use crate::exif::TagMap;

const NOTICE_KEYS: &[&str] = &["Copyright", "Copyright Notice", "Rights"];

/// Copyright notice, rights URL, usage terms and the "marked" flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Copyright {
    pub notice: Option<String>,
    pub info_url: Option<String>,
    pub usage_terms: Option<String>,
    pub flag: bool,
}

impl TagGroup for Copyright {
    fn from_tags(tags: &TagMap) -> Self {
        Self {
            notice: tags.first_of(NOTICE_KEYS),
            info_url: tags.get_str("URL").map(|u| u.trim().to_string()),
            usage_terms: tags.get_str("Usage Terms"),
            flag: tags
                .get_str("Copyright Flag")
                .is_some_and(|f| f.trim().eq_ignore_ascii_case("true")),
        }
    }

    fn add_to_map(&self, map: &mut TagMap) {
        put_all(map, NOTICE_KEYS, self.notice.as_deref());
        put_all(map, &["URL"], self.info_url.as_deref());
        put_all(map, &["Usage Terms"], self.usage_terms.as_deref());
        if self.flag {
            map.insert("Copyright Flag", "True");
        }
    }
}

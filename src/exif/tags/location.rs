use super::{TagGroup, put_all};
use crate::exif::TagMap;

/// Where the picture was taken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PictureLocation {
    pub region: Option<String>,
    pub state: Option<String>,
    pub country_code: Option<String>,
    /// Read from `"Creator City"`, not `"City"`, but written back as `"City"`.
    pub city: Option<String>,
    pub country: Option<String>,
    pub genre: Option<String>,
    pub scene: Option<String>,
}

impl TagGroup for PictureLocation {
    fn from_tags(tags: &TagMap) -> Self {
        Self {
            region: tags.first_of(&["Location", "Sub-location"]),
            state: tags.first_of(&["State", "Province-State"]),
            country_code: tags.first_of(&["Country Code", "Country-Primary Location Code"]),
            city: tags.get_str("Creator City"),
            country: tags.first_of(&["Country", "Country-Primary Location Name"]),
            genre: tags.get_str("Intellectual Genre"),
            scene: tags.get_str("Scene"),
        }
    }

    fn add_to_map(&self, map: &mut TagMap) {
        put_all(map, &["Location", "Sub-location"], self.region.as_deref());
        put_all(map, &["State", "Province-State"], self.state.as_deref());
        put_all(
            map,
            &["Country Code", "Country-Primary Location Code"],
            self.country_code.as_deref(),
        );
        put_all(map, &["City"], self.city.as_deref());
        put_all(
            map,
            &["Country", "Country-Primary Location Name"],
            self.country.as_deref(),
        );
        put_all(map, &["Intellectual Genre"], self.genre.as_deref());
        put_all(map, &["Scene"], self.scene.as_deref());
    }
}

use super::{TagGroup, put_all};
use crate::exif::TagMap;

/// Camera and exposure settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Photo {
    pub make: Option<String>,
    pub camera_model: Option<String>,
    /// Exposure time, usually `1/nnn`.
    pub exposure: Option<String>,
    pub aperture: Option<String>,
    /// `0` when unknown.
    pub iso: u32,
    pub lens_id: Option<String>,
    pub exposure_program: Option<String>,
    pub exposure_compensation: Option<String>,
    pub metering_mode: Option<String>,
    pub flash: Option<String>,
    pub focal_length: Option<String>,
    pub exposure_mode: Option<String>,
}

impl TagGroup for Photo {
    fn from_tags(tags: &TagMap) -> Self {
        // A purely numeric lens ID is a vendor code, the lens info reads better.
        let lens_id = match tags.get_str("Lens ID") {
            Some(id) if !id.trim().chars().all(|c| c.is_ascii_digit()) => Some(id),
            id => tags.get_str("Lens Info").or(id),
        };

        Self {
            make: tags.get_str("Make"),
            camera_model: tags.get_str("Camera Model Name"),
            exposure: tags.first_of(&["Exposure Time", "Shutter Speed Value", "Shutter Speed"]),
            aperture: tags.first_of(&["F Number", "Aperture Value"]),
            iso: tags.get_str("ISO").map(|v| leading_int(&v)).unwrap_or(0),
            lens_id,
            exposure_program: tags.get_str("Exposure Program"),
            exposure_compensation: tags.get_str("Exposure Compensation"),
            metering_mode: tags.get_str("Metering Mode"),
            flash: tags.get_str("Flash"),
            focal_length: tags.get_str("Focal Length"),
            exposure_mode: tags.get_str("Exposure Mode"),
        }
    }

    fn add_to_map(&self, map: &mut TagMap) {
        put_all(map, &["Make"], self.make.as_deref());
        put_all(map, &["Camera Model Name"], self.camera_model.as_deref());
        put_all(
            map,
            &["Exposure Time", "Shutter Speed Value", "Shutter Speed"],
            self.exposure.as_deref(),
        );
        put_all(map, &["F Number", "Aperture Value"], self.aperture.as_deref());
        if self.iso > 0 {
            map.insert("ISO", self.iso.to_string());
        }
        put_all(map, &["Lens ID"], self.lens_id.as_deref());
        put_all(map, &["Exposure Program"], self.exposure_program.as_deref());
        put_all(
            map,
            &["Exposure Compensation"],
            self.exposure_compensation.as_deref(),
        );
        put_all(map, &["Metering Mode"], self.metering_mode.as_deref());
        put_all(map, &["Flash"], self.flash.as_deref());
        put_all(map, &["Focal Length"], self.focal_length.as_deref());
        put_all(map, &["Exposure Mode"], self.exposure_mode.as_deref());
    }
}

/// Integer value of the leading digits, `0` if there are none.
fn leading_int(value: &str) -> u32 {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposure_and_aperture_aliases() {
        let tags: TagMap = [("Shutter Speed", "1/200"), ("Aperture Value", "4.0")]
            .into_iter()
            .collect();
        let photo = Photo::from_tags(&tags);
        assert_eq!(photo.exposure.as_deref(), Some("1/200"));
        assert_eq!(photo.aperture.as_deref(), Some("4.0"));
    }

    #[test]
    fn numeric_lens_id_replaced_by_lens_info() {
        let tags: TagMap = [("Lens ID", "254"), ("Lens Info", "24-70mm f/2.8")]
            .into_iter()
            .collect();
        assert_eq!(Photo::from_tags(&tags).lens_id.as_deref(), Some("24-70mm f/2.8"));

        let tags: TagMap = [("Lens ID", "254")].into_iter().collect();
        assert_eq!(Photo::from_tags(&tags).lens_id.as_deref(), Some("254"));

        let tags: TagMap = [("Lens Info", "50mm f/1.8")].into_iter().collect();
        assert_eq!(Photo::from_tags(&tags).lens_id.as_deref(), Some("50mm f/1.8"));

        let tags: TagMap = [("Lens ID", "EF50mm f/1.8 STM"), ("Lens Info", "50mm")]
            .into_iter()
            .collect();
        assert_eq!(Photo::from_tags(&tags).lens_id.as_deref(), Some("EF50mm f/1.8 STM"));
    }

    #[test]
    fn iso_parses_leading_digits() {
        let tags: TagMap = [("ISO", "400")].into_iter().collect();
        assert_eq!(Photo::from_tags(&tags).iso, 400);
        let tags: TagMap = [("ISO", "800, 0")].into_iter().collect();
        assert_eq!(Photo::from_tags(&tags).iso, 800);
        let tags: TagMap = [("ISO", "auto")].into_iter().collect();
        assert_eq!(Photo::from_tags(&tags).iso, 0);
    }

    #[test]
    fn unset_fields_are_not_written() {
        let photo = Photo {
            make: Some("Canon".into()),
            ..Default::default()
        };
        let mut map = TagMap::new();
        photo.add_to_map(&mut map);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get_str("Make").as_deref(), Some("Canon"));
    }
}

use super::{TagGroup, put_all};
use crate::exif::TagMap;

/// Contact data of the image creator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub author: Option<String>,
    pub job_title: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub urls: Vec<String>,
}

impl TagGroup for Contact {
    fn from_tags(tags: &TagMap) -> Self {
        let urls = tags
            .get_str("Creator Work URL")
            .map(|value| {
                value
                    .split(' ')
                    .map(|url| url.trim_matches(&[' ', '\t', ';', '.', ':'][..]))
                    .filter(|url| !url.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            author: tags.first_of(&["Creator", "Artist", "By-line", "Owner Name"]),
            job_title: tags.first_of(&["Authors Position", "By-line Title"]),
            address: tags.get_str("Creator Address"),
            city: tags.get_str("Creator City"),
            region: tags.get_str("Creator Region"),
            postal_code: tags.get_str("Creator Postal Code"),
            country: tags.get_str("Creator Country"),
            telephone: tags.get_str("Creator Work Telephone"),
            email: tags
                .get_str("Creator Work Email")
                .map(|e| e.trim().to_string())
                .filter(|e| is_mail_address(e)),
            urls,
        }
    }

    fn add_to_map(&self, map: &mut TagMap) {
        put_all(map, &["Creator", "Artist", "By-line"], self.author.as_deref());
        put_all(map, &["Authors Position", "By-line Title"], self.job_title.as_deref());
        put_all(map, &["Creator Address"], self.address.as_deref());
        put_all(map, &["Creator City"], self.city.as_deref());
        put_all(map, &["Creator Region"], self.region.as_deref());
        put_all(map, &["Creator Postal Code"], self.postal_code.as_deref());
        put_all(map, &["Creator Country"], self.country.as_deref());
        put_all(map, &["Creator Work Telephone"], self.telephone.as_deref());
        put_all(map, &["Creator Work Email"], self.email.as_deref());
        if !self.urls.is_empty() {
            map.insert("Creator Work URL", self.urls.join(" "));
        }
    }
}

/// Loose syntactic check: one `@`, non-empty local part, dotted domain, no whitespace.
fn is_mail_address(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::tag_map::split_list;
use super::tags::{
    Axis, Contact, Copyright, Dates, Gps, Labels, Photo, PictureLocation, TagGroup, Workflow,
    format_axis,
};
use super::TagMap;
use crate::pipeline;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Everything known about one image: file facts plus the normalized tag groups.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub file: PathBuf,
    pub url: Option<String>,
    /// Filesystem modification time, local wall clock.
    pub file_date: Option<NaiveDateTime>,
    pub size: Option<Size>,
    pub mimetype: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub headline: Option<String>,
    pub category: Option<String>,
    pub other_categories: Vec<String>,
    pub caption_writer: Option<String>,
    pub copyright: Copyright,
    pub contact: Contact,
    pub location: PictureLocation,
    pub dates: Dates,
    pub workflow: Workflow,
    pub gps: Gps,
    pub labels: Labels,
    pub photo: Photo,
}

impl ImageInfo {
    /// Build the record from a flat tag map and the image file it describes.
    ///
    /// Size and MIME type fall back to probing `path` when the tags carry none.
    pub fn new(tags: &TagMap, path: &Path, url: Option<&str>) -> Self {
        let file = tags
            .get_str("Image-File")
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf());

        let size = match (tags.get_str("Image Width"), tags.get_str("Image Height")) {
            (Some(w), Some(h)) => match (leading_u32(&w), leading_u32(&h)) {
                (Some(width), Some(height)) => Some(Size { width, height }),
                _ => pipeline::probe_size(path),
            },
            _ => pipeline::probe_size(path),
        };

        let mimetype = tags
            .first_of(&["MIME Type", "Format"])
            .or_else(|| pipeline::mime_type_for_path(path).map(str::to_string));

        Self {
            file,
            url: url.map(str::to_string),
            file_date: file_date(path),
            size,
            mimetype,
            description: tags.first_of(&["Description", "Image Description", "Caption-Abstract"]),
            keywords: merge_keywords(tags),
            headline: tags.get_str("Headline"),
            category: tags.get_str("Category"),
            other_categories: tags
                .get_str("Supplemental Categories")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            caption_writer: tags.first_of(&["Caption Writer", "Writer-Editor"]),
            copyright: Copyright::from_tags(tags),
            contact: Contact::from_tags(tags),
            location: PictureLocation::from_tags(tags),
            dates: Dates::from_tags(tags),
            workflow: Workflow::from_tags(tags),
            gps: Gps::from_tags(tags),
            labels: Labels::from_tags(tags),
            photo: Photo::from_tags(tags),
        }
    }

    /// Build the record from a JSON object of tags. `None` if `json` is not an object.
    pub fn parse_json(json: &str, path: &Path) -> Option<Self> {
        if json.trim().is_empty() {
            return None;
        }
        let value: serde_json::Value = serde_json::from_str(json).ok()?;
        let tags = TagMap::from_json_value(&value)?;
        Some(Self::new(&tags, path, None))
    }

    /// Rebuild every field from `tags`, keeping file and URL.
    pub fn reinit_from_tags(&mut self, tags: &TagMap) {
        let file = self.file.clone();
        let url = self.url.take();
        *self = Self::new(tags, &file, url.as_deref());
    }

    /// Flatten back into a tag map, writing every alias of every set field.
    pub fn to_tag_map(&self) -> TagMap {
        let mut map = TagMap::new();

        if let Some(size) = self.size {
            map.insert("Image Width", size.width.to_string());
            map.insert("Image Height", size.height.to_string());
        }
        if let Some(mimetype) = self.mimetype.as_deref().filter(|m| !m.is_empty()) {
            map.insert("MIME Type", mimetype);
            map.insert("Format", mimetype);
        }
        if let Some(description) = self.description.as_deref() {
            for key in ["Description", "Image Description", "Caption-Abstract"] {
                map.insert(key, description);
            }
        }
        if !self.keywords.is_empty() {
            let joined = self.keywords.join(", ");
            map.insert("Keywords", joined.as_str());
            map.insert("Subject", joined);
        }
        map.insert("Image-File", self.file.to_string_lossy().into_owned());

        self.copyright.add_to_map(&mut map);
        self.contact.add_to_map(&mut map);
        self.location.add_to_map(&mut map);
        self.dates.add_to_map(&mut map);
        self.workflow.add_to_map(&mut map);
        self.gps.add_to_map(&mut map);
        self.labels.add_to_map(&mut map);

        if let Some(headline) = self.headline.as_deref() {
            map.insert("Headline", headline);
        }
        if let Some(category) = self.category.as_deref() {
            map.insert("Category", category);
        }
        if !self.other_categories.is_empty() {
            map.insert("Supplemental Categories", self.other_categories.join(", "));
        }

        self.photo.add_to_map(&mut map);

        if let Some(writer) = self.caption_writer.as_deref() {
            map.insert("Caption Writer", writer);
            map.insert("Writer-Editor", writer);
        }
        map
    }

    /// The copyright notice, or `©{year} {who}` built from the oldest known date and the
    /// creator's email, name or the caption writer.
    pub fn copyright_text(&self) -> String {
        if let Some(notice) = &self.copyright.notice {
            return notice.clone();
        }

        let mut text = String::from("©");
        if let Some(date) = self.dates.oldest().or(self.file_date) {
            text.push_str(&date.format("%Y").to_string());
        }
        let who = self
            .contact
            .email
            .as_ref()
            .or(self.contact.author.as_ref())
            .or(self.caption_writer.as_ref());
        if let Some(who) = who {
            text.push(' ');
            text.push_str(who);
        }
        text
    }

    /// Short summary rows: author, date and the main camera settings.
    pub fn to_info_map(&self, show_model: bool, date_format: &str) -> Vec<(String, String)> {
        let mut rows = Rows::default();

        rows.push("Author", self.contact.author.as_ref().or(self.caption_writer.as_ref()));
        rows.push(
            "Date",
            self.dates
                .oldest()
                .or(self.file_date)
                .map(|d| format_date(&d, date_format)),
        );
        if show_model {
            rows.push(
                "Camera",
                self.photo.camera_model.as_ref().or(self.photo.make.as_ref()),
            );
        }
        rows.push("Lens", self.photo.lens_id.as_ref());
        rows.push("Aperture", self.photo.aperture.as_ref());
        rows.push("Focal Length", self.photo.focal_length.as_ref());
        rows.push("ISO", (self.photo.iso > 0).then(|| self.photo.iso.to_string()));
        rows.push("Exposure", self.photo.exposure.as_ref().map(|e| format!("{e} s")));
        rows.0
    }

    /// Detailed metadata rows in a fixed display order.
    pub fn to_metadata_map(&self, show_model: bool, date_format: &str) -> Vec<(String, String)> {
        let mut rows = Rows::default();
        let date = |d: &Option<NaiveDateTime>| d.map(|d| format_date(&d, date_format));

        rows.push("Description", self.description.as_ref());
        rows.push("Keywords", (!self.keywords.is_empty()).then(|| self.keywords.join(", ")));
        rows.push("Last Modified", date(&self.dates.last_modified));
        rows.push("Created", date(&self.dates.created));
        rows.push("Digitized", date(&self.dates.digitized));
        rows.push("Label", self.labels.label.as_ref());
        rows.push("Title", self.labels.title.as_ref());
        rows.push("Headline", self.headline.as_ref());
        rows.push("Author", self.contact.author.as_ref());
        rows.push("Author Country", self.contact.country.as_ref());
        rows.push(
            "Author URLs",
            (!self.contact.urls.is_empty()).then(|| self.contact.urls.join(", ")),
        );
        rows.push("Location City", self.location.city.as_ref());
        rows.push("Location Region", self.location.region.as_ref());
        rows.push("Location State", self.location.state.as_ref());
        rows.push("Location Country Code", self.location.country_code.as_ref());
        rows.push("Location Country", self.location.country.as_ref());
        if let Some(coordinate) = self.gps.coordinate.filter(|c| c.is_valid()) {
            rows.push("GPS Latitude", Some(format_axis(coordinate.latitude, Axis::Latitude)));
            rows.push("GPS Longitude", Some(format_axis(coordinate.longitude, Axis::Longitude)));
        }
        rows.push("Category", self.category.as_ref());
        rows.push(
            "Other Categories",
            (!self.other_categories.is_empty()).then(|| self.other_categories.join(", ")),
        );
        if show_model {
            rows.push("Make", self.photo.make.as_ref());
            rows.push("Model", self.photo.camera_model.as_ref());
        }
        rows.push("Exposure", self.photo.exposure.as_ref().map(|e| format!("{e} s")));
        rows.push("Aperture", self.photo.aperture.as_ref().map(|a| format!("f/{a}")));
        rows.push("ISO", (self.photo.iso > 0).then(|| self.photo.iso.to_string()));
        rows.push("Lens", self.photo.lens_id.as_ref());
        rows.push("Exposure Program", self.photo.exposure_program.as_ref());
        rows.push("Exposure Compensation", self.photo.exposure_compensation.as_ref());
        rows.push("Metering Mode", self.photo.metering_mode.as_ref());
        rows.push("Flash", self.photo.flash.as_ref());
        rows.push("Focal Length", self.photo.focal_length.as_ref());
        rows.0
    }
}

/// Ordered display rows; blank values are skipped.
#[derive(Default)]
struct Rows(Vec<(String, String)>);

impl Rows {
    fn push(&mut self, label: &str, value: Option<impl AsRef<str>>) {
        if let Some(value) = value {
            let value = value.as_ref().trim();
            if !value.is_empty() {
                self.0.push((label.to_string(), value.to_string()));
            }
        }
    }
}

/// `Keywords` and `Subject` merged, trimmed, de-duplicated case-insensitively. The first
/// spelling of a keyword wins.
fn merge_keywords(tags: &TagMap) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ["Keywords", "Subject"]
        .iter()
        .filter_map(|key| tags.get_str(key))
        .flat_map(|value| split_list(&value))
        .filter(|keyword| seen.insert(keyword.to_lowercase()))
        .collect()
}

fn leading_u32(value: &str) -> Option<u32> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok().filter(|n| *n > 0)
}

fn file_date(path: &Path) -> Option<NaiveDateTime> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Local>::from(modified).naive_local())
}

/// Format with a strftime pattern, falling back to [`DEFAULT_DATE_FORMAT`] if the pattern
/// is invalid.
fn format_date(date: &NaiveDateTime, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_ok() {
        return out;
    }
    date.format(DEFAULT_DATE_FORMAT).to_string()
}

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::tool;
use super::{SourceOptions, TagSource};
use crate::error::LoaderError;
use crate::exif::{TagMap, TagValue};

/// Keys of `exiv2 -p a` that carry nothing worth normalizing.
static IGNORED_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(Xmp\.(crs|xmpMM)\.|Xmp\.iptc\.CreatorContactInfo|",
        r"Xmp\.aux\.(FlashCompensation|MetadataDate|CreatorTool|Firmware|ApproximateFocusDistance|ImageNumber|SerialNumber)|",
        r"Iptc\.Application2\.RecordVersion|Exif\.Thumbnail\.|",
        r"Exif\.Photo\.(BodySerialNumber|CameraOwnerName|SceneCaptureType|WhiteBalance|CustomRendered|FocalPlaneResolutionUnit|FocalPlaneYResolution|FocalPlaneXResolution|SubSecTimeDigitized|SubSecTimeOriginal|UserComment|ExifVersion)|",
        r"Exif\.Image\.(ExifTag|Software|ResolutionUnit|YResolution|XResolution))",
    ))
    .expect("static regex")
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

static LANG_QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^lang="[^"]+"\s(.+)"#).expect("static regex"));

/// How a raw exiv2 value is reshaped before it is stored.
#[derive(Clone, Copy)]
enum Convert {
    Plain,
    /// Repeated values joined by newlines instead of kept as a list.
    Lines,
    /// `"1/200 s"` → `"1/200"`.
    Seconds,
    /// `"F2.8"` → `"2.8"`.
    FNumber,
    /// `"South"` → `"S"`, anything else `"N"`.
    LatitudeRef,
    /// `"West"` → `"W"`, anything else `"E"`.
    LongitudeRef,
}

/// exiv2 key → canonical tag name.
///
/// Rules run in order. EXIF and IPTC rules overwrite, `Xmp.*` rules only fill tags that are
/// still missing, so EXIF wins over IPTC wins over XMP.
const RULES: &[(&str, &str, Convert)] = &[
    ("Exif.Image.ImageDescription", "Image Description", Convert::Lines),
    ("Exif.Image.Make", "Make", Convert::Plain),
    ("Exif.Image.Model", "Camera Model Name", Convert::Plain),
    ("Exif.Image.Artist", "Artist", Convert::Plain),
    ("Exif.Image.Copyright", "Copyright", Convert::Plain),
    ("Exif.Image.DateTime", "Modify Date", Convert::Plain),
    ("Exif.Photo.ExposureTime", "Exposure Time", Convert::Seconds),
    ("Exif.Photo.FNumber", "F Number", Convert::FNumber),
    ("Exif.Photo.ExposureProgram", "Exposure Program", Convert::Plain),
    ("Exif.Photo.ISOSpeedRatings", "ISO", Convert::Plain),
    ("Exif.Photo.DateTimeOriginal", "Date/Time Original", Convert::Plain),
    ("Exif.Photo.DateTimeDigitized", "Digital Creation Date/Time", Convert::Plain),
    ("Exif.Photo.ShutterSpeedValue", "Shutter Speed Value", Convert::Seconds),
    ("Exif.Photo.ApertureValue", "Aperture Value", Convert::FNumber),
    ("Exif.Photo.ExposureBiasValue", "Exposure Compensation", Convert::Plain),
    ("Exif.Photo.MeteringMode", "Metering Mode", Convert::Plain),
    ("Exif.Photo.Flash", "Flash", Convert::Plain),
    ("Exif.Photo.FocalLength", "Focal Length", Convert::Plain),
    ("Exif.Photo.ExposureMode", "Exposure Mode", Convert::Plain),
    ("Exif.Photo.LensModel", "Lens ID", Convert::Plain),
    ("Exif.GPSInfo.GPSLatitudeRef", "GPS Latitude Ref", Convert::LatitudeRef),
    ("Exif.GPSInfo.GPSLongitudeRef", "GPS Longitude Ref", Convert::LongitudeRef),
    ("Exif.GPSInfo.GPSLatitude", "GPS Latitude", Convert::Plain),
    ("Exif.GPSInfo.GPSLongitude", "GPS Longitude", Convert::Plain),
    ("Iptc.Application2.ObjectName", "Object Name", Convert::Plain),
    ("Iptc.Application2.Category", "Category", Convert::Plain),
    ("Iptc.Application2.SuppCategory", "Supplemental Categories", Convert::Plain),
    ("Iptc.Application2.Keywords", "Keywords", Convert::Plain),
    ("Iptc.Application2.SpecialInstructions", "Special Instructions", Convert::Lines),
    ("Iptc.Application2.Byline", "By-line", Convert::Plain),
    ("Iptc.Application2.BylineTitle", "By-line Title", Convert::Plain),
    ("Iptc.Application2.City", "Creator City", Convert::Plain),
    ("Iptc.Application2.SubLocation", "Sub-location", Convert::Plain),
    ("Iptc.Application2.ProvinceState", "Province-State", Convert::Plain),
    ("Iptc.Application2.CountryCode", "Country Code", Convert::Plain),
    ("Iptc.Application2.CountryCode", "Country-Primary Location Code", Convert::Plain),
    ("Iptc.Application2.CountryName", "Country", Convert::Plain),
    ("Iptc.Application2.CountryName", "Country-Primary Location Name", Convert::Plain),
    ("Iptc.Application2.TransmissionReference", "Transmission Reference", Convert::Plain),
    (
        "Iptc.Application2.TransmissionReference",
        "Original Transmission Reference",
        Convert::Plain,
    ),
    ("Iptc.Application2.Headline", "Headline", Convert::Plain),
    ("Iptc.Application2.Credit", "Credit", Convert::Plain),
    ("Iptc.Application2.Source", "Source", Convert::Plain),
    ("Iptc.Application2.Copyright", "Copyright Notice", Convert::Plain),
    ("Iptc.Application2.Caption", "Caption-Abstract", Convert::Lines),
    ("Iptc.Application2.Writer", "Writer-Editor", Convert::Plain),
    ("Xmp.dc.format", "Format", Convert::Plain),
    ("Xmp.dc.title", "Title", Convert::Plain),
    ("Xmp.dc.creator", "Creator", Convert::Plain),
    ("Xmp.dc.rights", "Rights", Convert::Plain),
    ("Xmp.dc.subject", "Subject", Convert::Plain),
    ("Xmp.dc.description", "Description", Convert::Plain),
    ("Xmp.aux.LensInfo", "Lens Info", Convert::Plain),
    ("Xmp.aux.Lens", "Lens ID", Convert::Plain),
    ("Xmp.xmp.ModifyDate", "Modify Date", Convert::Plain),
    ("Xmp.xmp.CreateDate", "Create Date", Convert::Plain),
    ("Xmp.xmp.Label", "Label", Convert::Plain),
    ("Xmp.photoshop.AuthorsPosition", "Authors Position", Convert::Plain),
    ("Xmp.photoshop.Headline", "Headline", Convert::Plain),
    ("Xmp.photoshop.CaptionWriter", "Caption Writer", Convert::Plain),
    ("Xmp.photoshop.Category", "Category", Convert::Plain),
    ("Xmp.photoshop.City", "Creator City", Convert::Plain),
    ("Xmp.photoshop.State", "State", Convert::Plain),
    ("Xmp.photoshop.Country", "Country", Convert::Plain),
    ("Xmp.photoshop.DateCreated", "Date Created", Convert::Plain),
    ("Xmp.photoshop.TransmissionReference", "Transmission Reference", Convert::Plain),
    ("Xmp.photoshop.Instructions", "Instructions", Convert::Plain),
    ("Xmp.photoshop.Credit", "Credit", Convert::Plain),
    ("Xmp.photoshop.Source", "Source", Convert::Plain),
    ("Xmp.photoshop.SupplementalCategories", "Supplemental Categories", Convert::Plain),
    ("Xmp.iptc.IntellectualGenre", "Intellectual Genre", Convert::Plain),
    ("Xmp.iptc.Location", "Location", Convert::Plain),
    ("Xmp.iptc.CountryCode", "Country Code", Convert::Plain),
    ("Xmp.iptc.Scene", "Scene", Convert::Plain),
    ("Xmp.xmpRights.Marked", "Copyright Flag", Convert::Plain),
    ("Xmp.xmpRights.WebStatement", "URL", Convert::Plain),
    ("Xmp.xmpRights.UsageTerms", "Usage Terms", Convert::Plain),
];

/// Metadata from the `exiv2` command line tool (`exiv2 -p a <file>`).
#[derive(Debug, Clone, Default)]
pub struct Exiv2Source {
    path: Option<PathBuf>,
}

impl Exiv2Source {
    /// A source using the first `exiv2` found on `PATH`, `/usr/bin` or `/bin`.
    pub fn discover() -> Self {
        let path = tool::find_executable("exiv2");
        match &path {
            Some(p) => log::debug!("Found exiv2 at {}", p.display()),
            None => log::debug!("exiv2 not found"),
        }
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl TagSource for Exiv2Source {
    fn name(&self) -> &'static str {
        "exiv2"
    }

    fn is_configured(&self) -> bool {
        self.path.is_some()
    }

    fn configure(&mut self, options: &SourceOptions) -> Result<(), LoaderError> {
        self.path = Some(tool::validate("exiv2", options.path.as_deref())?);
        Ok(())
    }

    fn load_tags(&self, path: &Path) -> Result<TagMap, LoaderError> {
        let program = self.path.as_deref().ok_or(LoaderError::NotConfigured)?;
        if !path.is_file() {
            return Err(LoaderError::MissingFile(path.to_path_buf()));
        }

        let output = tool::run(program, &[OsStr::new("-p"), OsStr::new("a"), path.as_os_str()])?;
        Ok(translate(&parse_report(&output)))
    }
}

/// Parse `exiv2 -p a` output into raw `key → value` pairs.
///
/// Lines are `key type count value`; any other shape is skipped. Repeated keys collect
/// into a list.
pub(crate) fn parse_report(output: &str) -> BTreeMap<String, TagValue> {
    let mut raw: BTreeMap<String, TagValue> = BTreeMap::new();

    for line in tool::report_lines(output) {
        let columns: Vec<&str> = WHITESPACE.splitn(line, 4).collect();
        let &[key, kind, _count, value] = columns.as_slice() else {
            continue;
        };
        if IGNORED_KEY.is_match(key) {
            continue;
        }

        let value = normalize_value(kind, value.trim());
        match raw.get_mut(key) {
            Some(TagValue::List(items)) => items.push(value),
            Some(existing) => {
                let first = existing.as_text();
                *existing = TagValue::List(vec![first, value]);
            }
            None => {
                raw.insert(key.to_string(), TagValue::Text(value));
            }
        }
    }

    raw
}

/// Drop the `lang="x-default"` qualifier of language alternatives.
fn normalize_value(kind: &str, value: &str) -> String {
    if kind == "LangAlt" {
        if let Some(caps) = LANG_QUALIFIER.captures(value) {
            return caps[1].to_string();
        }
    }
    value.to_string()
}

/// Map raw exiv2 keys onto canonical tag names.
pub(crate) fn translate(raw: &BTreeMap<String, TagValue>) -> TagMap {
    let mut tags = TagMap::new();

    for (from, to, convert) in RULES {
        let Some(value) = raw.get(*from).filter(|v| !v.is_blank()) else {
            continue;
        };
        let value = apply(*convert, value);
        if from.starts_with("Xmp.") {
            tags.insert_if_absent(to, value);
        } else {
            tags.insert(*to, value);
        }
    }

    // IPTC keeps date and time apart.
    let date = raw.get("Iptc.Application2.DateCreated").map(TagValue::as_text);
    let time = raw.get("Iptc.Application2.TimeCreated").map(TagValue::as_text);
    if let (Some(date), Some(time)) = (date, time) {
        let created = format!("{} {}", date.trim(), time.trim());
        tags.insert_if_absent("Create Date", created.as_str());
        tags.insert_if_absent("Date Created", created.as_str());
        tags.insert("Date/Time Created", created);
    }

    tags
}

fn apply(convert: Convert, value: &TagValue) -> TagValue {
    let text = || value.as_text();
    match convert {
        Convert::Plain => value.clone(),
        Convert::Lines => match value {
            TagValue::List(items) => TagValue::Text(items.join("\n")),
            text => text.clone(),
        },
        Convert::Seconds => text().trim_end_matches(['s', ' ']).into(),
        Convert::FNumber => text().trim_start_matches(['F', 'f']).into(),
        Convert::LatitudeRef => {
            let south = text().trim().to_ascii_lowercase().starts_with('s');
            TagValue::from(if south { "S" } else { "N" })
        }
        Convert::LongitudeRef => {
            let west = text().trim().to_ascii_lowercase().starts_with('w');
            TagValue::from(if west { "W" } else { "E" })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Exif.Image.Make                              Ascii       6  Canon
Exif.Image.Model                             Ascii      14  Canon EOS R5
Exif.Image.XResolution                       Rational    1  72
Exif.Photo.ExposureTime                      Rational    1  1/250 s
Exif.Photo.FNumber                           Rational    1  F2.8
Exif.Photo.DateTimeOriginal                  Ascii      20  2020:05:01 06:30:00
Exif.GPSInfo.GPSLatitudeRef                  Ascii       2  North
Exif.GPSInfo.GPSLatitude                     Rational    3  53deg 33' 0\"
Exif.GPSInfo.GPSLongitudeRef                 Ascii       2  West
Exif.GPSInfo.GPSLongitude                    Rational    3  9deg 59' 0\"
Exif.Thumbnail.JPEGInterchangeFormat         Long        1  1234
Iptc.Application2.RecordVersion              Short       1  4
Iptc.Application2.Keywords                   String      5  boats
Iptc.Application2.Keywords                   String      4  dawn
Iptc.Application2.Caption                    String      7  Harbour
Iptc.Application2.Headline                   String      4  Dawn
Iptc.Application2.DateCreated                Date        8  2020-05-01
Iptc.Application2.TimeCreated                Time       11  06:30:00+02:00
Iptc.Application2.CountryCode                String      3  DEU
Xmp.dc.title                                 LangAlt     1  lang=\"x-default\" Morning harbour
Xmp.photoshop.Headline                       XmpText     9  Ignored headline
Xmp.photoshop.City                           XmpText     7  Hamburg
Xmp.xmpMM.DocumentID                         XmpText    10  xmp.did:1
Exif.Image.Artist                            Ascii       0
";

    // ── parse_report ──

    #[test]
    fn report_skips_ignored_and_malformed_lines() {
        let raw = parse_report(REPORT);
        assert!(raw.contains_key("Exif.Image.Make"));
        assert!(!raw.contains_key("Exif.Image.XResolution"));
        assert!(!raw.contains_key("Exif.Thumbnail.JPEGInterchangeFormat"));
        assert!(!raw.contains_key("Iptc.Application2.RecordVersion"));
        assert!(!raw.contains_key("Xmp.xmpMM.DocumentID"));
        assert!(!raw.contains_key("Exif.Image.Artist"));
    }

    #[test]
    fn report_collects_repeated_keys() {
        let raw = parse_report(REPORT);
        assert_eq!(
            raw["Iptc.Application2.Keywords"],
            TagValue::List(vec!["boats".into(), "dawn".into()])
        );
        assert_eq!(raw["Exif.Image.Model"], TagValue::Text("Canon EOS R5".into()));
    }

    #[test]
    fn report_unwraps_lang_alt() {
        let raw = parse_report(REPORT);
        assert_eq!(raw["Xmp.dc.title"], TagValue::Text("Morning harbour".into()));
    }

    // ── translate ──

    #[test]
    fn translate_maps_canonical_names() {
        let tags = translate(&parse_report(REPORT));
        assert_eq!(tags.get_str("Make").as_deref(), Some("Canon"));
        assert_eq!(tags.get_str("Camera Model Name").as_deref(), Some("Canon EOS R5"));
        assert_eq!(tags.get_str("Exposure Time").as_deref(), Some("1/250"));
        assert_eq!(tags.get_str("F Number").as_deref(), Some("2.8"));
        assert_eq!(tags.get_str("GPS Latitude Ref").as_deref(), Some("N"));
        assert_eq!(tags.get_str("GPS Longitude Ref").as_deref(), Some("W"));
        assert_eq!(tags.get_str("Keywords").as_deref(), Some("boats, dawn"));
        assert_eq!(tags.get_str("Caption-Abstract").as_deref(), Some("Harbour"));
        assert_eq!(tags.get_str("Title").as_deref(), Some("Morning harbour"));
        assert_eq!(tags.get_str("Country Code").as_deref(), Some("DEU"));
        assert_eq!(
            tags.get_str("Country-Primary Location Code").as_deref(),
            Some("DEU")
        );
        assert_eq!(tags.get_str("Creator City").as_deref(), Some("Hamburg"));
    }

    #[test]
    fn iptc_wins_over_xmp() {
        let tags = translate(&parse_report(REPORT));
        assert_eq!(tags.get_str("Headline").as_deref(), Some("Dawn"));
    }

    #[test]
    fn iptc_date_and_time_are_combined() {
        let tags = translate(&parse_report(REPORT));
        assert_eq!(
            tags.get_str("Date/Time Created").as_deref(),
            Some("2020-05-01 06:30:00+02:00")
        );
        assert_eq!(
            tags.get_str("Create Date").as_deref(),
            Some("2020-05-01 06:30:00+02:00")
        );
    }

    #[test]
    fn translated_report_builds_image_info() {
        let tags = translate(&parse_report(REPORT));
        let info = crate::exif::ImageInfo::new(&tags, Path::new("/nonexistent/a.jpg"), None);
        let coordinate = info.gps.coordinate.unwrap();
        assert!((coordinate.latitude - 53.55).abs() < 1e-9);
        assert!((coordinate.longitude + (9.0 + 59.0 / 60.0)).abs() < 1e-9);
        assert_eq!(info.keywords, vec!["boats", "dawn"]);
        assert_eq!(info.photo.aperture.as_deref(), Some("2.8"));
    }

    // ── TagSource ──

    #[test]
    fn unconfigured_source_refuses_to_load() {
        let source = Exiv2Source::default();
        assert!(!source.is_configured());
        let err = source.load(Path::new("/nonexistent/a.jpg")).unwrap_err();
        assert!(matches!(err, LoaderError::NotConfigured));
    }

    #[test]
    fn configure_rejects_bad_path() {
        let mut source = Exiv2Source::default();
        let err = source.configure(&SourceOptions::default()).unwrap_err();
        assert!(matches!(err, LoaderError::Configuration(_)));
        assert!(!source.is_configured());
    }

    #[cfg(unix)]
    #[test]
    fn loads_through_fake_tool() {
        let dir = tempfile::TempDir::new().unwrap();
        let exiv2 = tool::fake_tool(dir.path(), "exiv2", REPORT);
        let image = dir.path().join("photo.jpg");
        std::fs::write(&image, b"jpeg").unwrap();

        let mut source = Exiv2Source::default();
        source.configure(&SourceOptions::with_path(&exiv2)).unwrap();
        assert_eq!(source.path(), Some(exiv2.as_path()));

        let info = source.load(&image).unwrap();
        assert_eq!(info.photo.make.as_deref(), Some("Canon"));

        let err = source.load(&dir.path().join("missing.jpg")).unwrap_err();
        assert!(matches!(err, LoaderError::MissingFile(_)));
    }
}

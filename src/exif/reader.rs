use std::collections::BTreeMap;
use std::path::Path;

use nom_exif::{EntryValue, Exif, ExifIter, LatLng, MediaParser, MediaSource};

use super::{TagMap, TagValue};
use crate::error::LoaderError;

// IFD0 / Exif IFD tag IDs
const TAG_IMAGE_DESCRIPTION: u16 = 0x010E;
const TAG_MAKE: u16 = 0x010F;
const TAG_MODEL: u16 = 0x0110;
const TAG_ARTIST: u16 = 0x013B;
const TAG_COPYRIGHT: u16 = 0x8298;
const TAG_EXPOSURE_TIME: u16 = 0x829A;
const TAG_F_NUMBER: u16 = 0x829D;
const TAG_ISO_SPEED_RATINGS: u16 = 0x8827;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TAG_DATE_TIME_DIGITIZED: u16 = 0x9004;
const TAG_APERTURE_VALUE: u16 = 0x9202;
const TAG_FOCAL_LENGTH: u16 = 0x920A;
const TAG_LENS_MODEL: u16 = 0xA434;

const NATIVE_TAGS: &[(u16, &str)] = &[
    (TAG_IMAGE_DESCRIPTION, "ImageDescription"),
    (TAG_MAKE, "Make"),
    (TAG_MODEL, "Model"),
    (TAG_ARTIST, "Artist"),
    (TAG_COPYRIGHT, "Copyright"),
    (TAG_EXPOSURE_TIME, "ExposureTime"),
    (TAG_F_NUMBER, "FNumber"),
    (TAG_ISO_SPEED_RATINGS, "ISOSpeedRatings"),
    (TAG_DATE_TIME_ORIGINAL, "DateTimeOriginal"),
    (TAG_DATE_TIME_DIGITIZED, "DateTimeDigitized"),
    (TAG_APERTURE_VALUE, "ApertureValue"),
    (TAG_FOCAL_LENGTH, "FocalLength"),
    (TAG_LENS_MODEL, "LensModel"),
];

/// Native EXIF fields keyed by their EXIF names (`Make`, `FNumber`, `GPSLatitude`, ...).
///
/// Rationals are kept as `"num/den"` strings; GPS coordinates are lists of three of them.
pub type NativeExifMap = BTreeMap<String, TagValue>;

/// Read the embedded EXIF block of an image into a [`NativeExifMap`].
///
/// A file without EXIF data gives an empty map.
pub fn read_native_exif(path: &Path) -> Result<NativeExifMap, LoaderError> {
    if !path.is_file() {
        return Err(LoaderError::MissingFile(path.to_path_buf()));
    }

    let mut parser = MediaParser::new();
    let ms = MediaSource::file_path(path).map_err(|e| LoaderError::Parse(e.to_string()))?;

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found in {}", path.display());
            return Ok(NativeExifMap::new());
        }
    };

    // Parse GPS info before converting to Exif (consumes the iterator)
    let gps_info = iter.parse_gps_info().ok().flatten();
    let exif: Exif = iter.into();

    let mut native = NativeExifMap::new();
    for (code, name) in NATIVE_TAGS {
        if let Some(text) = exif.get_by_ifd_tag_code(0, *code).and_then(entry_to_string) {
            native.insert(name.to_string(), TagValue::Text(text));
        }
    }

    if let Some(gps) = gps_info {
        native.insert("GPSLatitudeRef".into(), gps.latitude_ref.to_string().into());
        native.insert("GPSLatitude".into(), latlng_to_rationals(&gps.latitude).into());
        native.insert("GPSLongitudeRef".into(), gps.longitude_ref.to_string().into());
        native.insert("GPSLongitude".into(), latlng_to_rationals(&gps.longitude).into());
    }

    Ok(native)
}

/// Convert an EntryValue to an Option<String>.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = match val {
        EntryValue::URational(r) => format!("{}/{}", r.0, r.1),
        EntryValue::Text(s) => s.trim_end_matches('\0').to_string(),
        other => other.to_string(),
    };
    let s = s.trim().trim_matches('"').to_string();
    if s.is_empty() { None } else { Some(s) }
}

fn latlng_to_rationals(latlng: &LatLng) -> Vec<String> {
    [&latlng.0, &latlng.1, &latlng.2]
        .into_iter()
        .map(|r| format!("{}/{}", r.0, r.1))
        .collect()
}

/// Rename and reshape native EXIF fields into canonical tag names.
///
/// Fields are handled independently: a missing or malformed field only drops its own
/// output key.
pub fn extract(native: &NativeExifMap) -> TagMap {
    let text = |key: &str| native.get(key).filter(|v| !v.is_blank()).map(TagValue::as_text);
    let mut result = TagMap::new();

    let renames = [
        ("Make", "Make"),
        ("Model", "Camera Model Name"),
        ("Artist", "Artist"),
        ("Copyright", "Copyright"),
        ("ExposureTime", "Exposure Time"),
        ("ISOSpeedRatings", "ISO"),
        ("DateTimeOriginal", "Date/Time Original"),
        ("DateTimeDigitized", "Digital Creation Date/Time"),
        ("FocalLength", "Focal Length"),
        ("LensModel", "Lens ID"),
        ("ImageDescription", "Image Description"),
        ("GPSLatitudeRef", "GPS Latitude Ref"),
        ("GPSLongitudeRef", "GPS Longitude Ref"),
    ];
    for (native_key, key) in renames {
        if let Some(value) = text(native_key) {
            result.insert(key, value);
        }
    }

    if let Some(value) = text("FNumber") {
        result.insert("F Number", decode_rational(&value));
    }
    if let Some(value) = text("ApertureValue") {
        result.insert("Aperture Value", decode_rational(&value));
    }

    let latitude = native
        .get("GPSLatitude")
        .and_then(|v| format_gps(v, text("GPSLatitudeRef").as_deref().unwrap_or("")));
    let longitude = native
        .get("GPSLongitude")
        .and_then(|v| format_gps(v, text("GPSLongitudeRef").as_deref().unwrap_or("")));
    if let (Some(lat), Some(lon)) = (&latitude, &longitude) {
        result.insert("GPS Position", format!("{lat}, {lon}"));
    }
    if let Some(lat) = latitude {
        result.insert("GPS Latitude", lat);
    }
    if let Some(lon) = longitude {
        result.insert("GPS Longitude", lon);
    }

    result
}

/// Decode an EXIF fraction string.
///
/// `"8/1"` becomes `"8"`, `"28/10"` becomes `"2.8"` (two decimals), and quotients below
/// `0.01` keep two significant digits (`"1/250"` becomes `"0.004"`). Anything that is not
/// a fraction of two numbers with a non-zero denominator is returned unchanged.
pub fn decode_rational(value: &str) -> String {
    if let Some(whole) = value.strip_suffix("/1") {
        return whole.to_string();
    }
    let Some((num, den)) = value.split_once('/') else {
        return value.to_string();
    };
    let (Ok(num), Ok(den)) = (num.trim().parse::<f64>(), den.trim().parse::<f64>()) else {
        return value.to_string();
    };
    if den == 0.0 {
        return value.to_string();
    }

    let quotient = num / den;
    let rounded = if quotient != 0.0 && quotient.abs() < 0.01 {
        let magnitude = quotient.abs().log10().floor() as i32;
        let factor = 10f64.powi(1 - magnitude);
        (quotient * factor).round() / factor
    } else {
        (quotient * 100.0).round() / 100.0
    };
    rounded.to_string()
}

/// Compose `"{deg} deg {min}\" {sec}' {ref}"` from three `"num/den"` components.
fn format_gps(value: &TagValue, reference: &str) -> Option<String> {
    let TagValue::List(parts) = value else {
        return None;
    };
    let [deg, min, sec] = parts.as_slice() else {
        return None;
    };
    let (deg, min, sec) = (component(deg)?, component(min)?, component(sec)?);
    Some(format!("{deg} deg {min}\" {sec}' {reference}").trim_end().to_string())
}

/// One GPS component; a non-positive denominator means the numerator is the value.
fn component(value: &str) -> Option<f64> {
    match value.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            Some(if den <= 0.0 { num } else { num / den })
        }
        None => value.trim().parse().ok(),
    }
}

/// A minimal JPEG whose APP1 segment holds a little-endian TIFF with Make and Model in
/// IFD0 and a GPS IFD. Coordinates are `(ref, [deg, min, sec])` with denominators of 1.
#[cfg(test)]
pub(crate) fn exif_jpeg(
    make: &str,
    model: &str,
    latitude: (char, [u32; 3]),
    longitude: (char, [u32; 3]),
) -> Vec<u8> {
    const ASCII: u16 = 2;
    const LONG: u16 = 4;
    const RATIONAL: u16 = 5;

    fn entry(out: &mut Vec<u8>, tag: u16, kind: u16, count: usize, value: [u8; 4]) {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&(count as u32).to_le_bytes());
        out.extend_from_slice(&value);
    }
    fn offset(at: usize) -> [u8; 4] {
        (at as u32).to_le_bytes()
    }
    // NUL-terminated, padded to a word boundary; returns (bytes, count)
    fn ascii(text: &str) -> (Vec<u8>, usize) {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        let count = bytes.len();
        if bytes.len() % 2 == 1 {
            bytes.push(0);
        }
        (bytes, count)
    }
    fn rationals(parts: [u32; 3]) -> Vec<u8> {
        parts
            .iter()
            .flat_map(|part| [part.to_le_bytes(), 1u32.to_le_bytes()].concat())
            .collect()
    }

    let (make, make_count) = ascii(make);
    let (model, model_count) = ascii(model);
    assert!(make_count > 4 && model_count > 4, "short strings would be stored inline");

    let make_at = 8 + 2 + 3 * 12 + 4;
    let model_at = make_at + make.len();
    let gps_at = model_at + model.len();
    let latitude_at = gps_at + 2 + 4 * 12 + 4;
    let longitude_at = latitude_at + 24;

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());

    tiff.extend_from_slice(&3u16.to_le_bytes());
    entry(&mut tiff, TAG_MAKE, ASCII, make_count, offset(make_at));
    entry(&mut tiff, TAG_MODEL, ASCII, model_count, offset(model_at));
    entry(&mut tiff, 0x8825, LONG, 1, offset(gps_at));
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(&make);
    tiff.extend_from_slice(&model);

    tiff.extend_from_slice(&4u16.to_le_bytes());
    entry(&mut tiff, 0x0001, ASCII, 2, [latitude.0 as u8, 0, 0, 0]);
    entry(&mut tiff, 0x0002, RATIONAL, 3, offset(latitude_at));
    entry(&mut tiff, 0x0003, ASCII, 2, [longitude.0 as u8, 0, 0, 0]);
    entry(&mut tiff, 0x0004, RATIONAL, 3, offset(longitude_at));
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend(rationals(latitude.1));
    tiff.extend(rationals(longitude.1));

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend(tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(entries: &[(&str, TagValue)]) -> NativeExifMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn triple(a: &str, b: &str, c: &str) -> TagValue {
        TagValue::List(vec![a.into(), b.into(), c.into()])
    }

    // ── rationals ──

    #[test]
    fn decode_rational_rules() {
        assert_eq!(decode_rational("1/1"), "1");
        assert_eq!(decode_rational("8/1"), "8");
        assert_eq!(decode_rational("1/250"), "0.004");
        assert_eq!(decode_rational("28/10"), "2.8");
        assert_eq!(decode_rational("1/3"), "0.33");
        assert_eq!(decode_rational("abc/def"), "abc/def");
        assert_eq!(decode_rational("5/0"), "5/0");
        assert_eq!(decode_rational("4.5"), "4.5");
    }

    // ── gps ──

    #[test]
    fn gps_composition() {
        let map = native(&[
            ("GPSLatitude", triple("40/1", "30/1", "0/1")),
            ("GPSLatitudeRef", "N".into()),
        ]);
        let tags = extract(&map);
        assert_eq!(tags.get_str("GPS Latitude").as_deref(), Some("40 deg 30\" 0' N"));
        assert_eq!(tags.get_str("GPS Latitude Ref").as_deref(), Some("N"));
        assert!(!tags.contains_key("GPS Longitude"));
        assert!(!tags.contains_key("GPS Position"));
    }

    #[test]
    fn gps_position_needs_both_axes() {
        let map = native(&[
            ("GPSLatitude", triple("48/1", "8/1", "1234/100")),
            ("GPSLatitudeRef", "N".into()),
            ("GPSLongitude", triple("11/1", "34/1", "0/0")),
            ("GPSLongitudeRef", "E".into()),
        ]);
        let tags = extract(&map);
        assert_eq!(
            tags.get_str("GPS Position").as_deref(),
            Some("48 deg 8\" 12.34' N, 11 deg 34\" 0' E")
        );
    }

    #[test]
    fn malformed_gps_component_skips_only_that_key() {
        let map = native(&[
            ("GPSLatitude", triple("x/1", "30/1", "0/1")),
            ("Make", "Canon".into()),
        ]);
        let tags = extract(&map);
        assert!(!tags.contains_key("GPS Latitude"));
        assert_eq!(tags.get_str("Make").as_deref(), Some("Canon"));
    }

    // ── renames ──

    #[test]
    fn renames_native_fields() {
        let map = native(&[
            ("Model", "EOS R5".into()),
            ("FNumber", "28/10".into()),
            ("ApertureValue", "3/1".into()),
            ("ExposureTime", "1/250".into()),
            ("LensModel", "RF24-70mm F2.8 L IS USM".into()),
            ("DateTimeDigitized", "2020:05:01 10:20:30".into()),
            ("ImageDescription", "".into()),
        ]);
        let tags = extract(&map);
        assert_eq!(tags.get_str("Camera Model Name").as_deref(), Some("EOS R5"));
        assert_eq!(tags.get_str("F Number").as_deref(), Some("2.8"));
        assert_eq!(tags.get_str("Aperture Value").as_deref(), Some("3"));
        assert_eq!(tags.get_str("Exposure Time").as_deref(), Some("1/250"));
        assert_eq!(tags.get_str("Lens ID").as_deref(), Some("RF24-70mm F2.8 L IS USM"));
        assert_eq!(
            tags.get_str("Digital Creation Date/Time").as_deref(),
            Some("2020:05:01 10:20:30")
        );
        assert!(!tags.contains_key("Image Description"));
    }

    // ── file reading ──

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = read_native_exif(&dir.path().join("nope.jpg")).unwrap_err();
        assert!(matches!(err, LoaderError::MissingFile(_)));
    }

    #[test]
    fn reads_ifd0_and_gps_from_jpeg() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hamburg.jpg");
        let jpeg = exif_jpeg("Canon", "EOS R5", ('N', [53, 33, 0]), ('E', [9, 59, 0]));
        std::fs::write(&path, jpeg).unwrap();

        let map = read_native_exif(&path).unwrap();
        assert_eq!(map.get("Make"), Some(&TagValue::from("Canon")));
        assert_eq!(map.get("Model"), Some(&TagValue::from("EOS R5")));
        assert_eq!(map.get("GPSLatitudeRef"), Some(&TagValue::from("N")));
        assert_eq!(map.get("GPSLatitude"), Some(&triple("53/1", "33/1", "0/1")));
        assert_eq!(map.get("GPSLongitudeRef"), Some(&TagValue::from("E")));
        assert_eq!(map.get("GPSLongitude"), Some(&triple("9/1", "59/1", "0/1")));

        let tags = extract(&map);
        assert_eq!(tags.get_str("Camera Model Name").as_deref(), Some("EOS R5"));
        assert_eq!(
            tags.get_str("GPS Position").as_deref(),
            Some("53 deg 33\" 0' N, 9 deg 59\" 0' E")
        );
    }

    #[test]
    fn file_without_exif_gives_empty_map() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plain.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        match read_native_exif(&path) {
            Ok(map) => assert!(map.is_empty()),
            Err(LoaderError::Parse(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}

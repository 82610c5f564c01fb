use super::TagGroup;
use crate::exif::TagMap;

/// Which half of a coordinate a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    /// Cardinal letter for a signed decimal-degree value.
    pub fn direction(self, value: f64) -> char {
        match (self, value < 0.0) {
            (Axis::Latitude, false) => 'N',
            (Axis::Latitude, true) => 'S',
            (Axis::Longitude, false) => 'E',
            (Axis::Longitude, true) => 'W',
        }
    }

    /// Sign for a direction word (`N`, `North`, `s`, ...), or `None` if it does not
    /// belong to this axis.
    fn sign_of(self, word: &str) -> Option<f64> {
        match (self, word.to_ascii_uppercase().as_str()) {
            (Axis::Latitude, "N" | "NORTH") | (Axis::Longitude, "E" | "EAST") => Some(1.0),
            (Axis::Latitude, "S" | "SOUTH") | (Axis::Longitude, "W" | "WEST") => Some(-1.0),
            _ => None,
        }
    }
}

/// A latitude/longitude pair in signed decimal degrees (north and east positive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate from two axis strings, with optional reference tags
    /// (`"N"`, `"South"`, ...) supplying the direction when the strings carry none.
    pub fn from_parts(
        latitude: &str,
        longitude: &str,
        latitude_ref: Option<&str>,
        longitude_ref: Option<&str>,
    ) -> Option<Self> {
        let coordinate = Self {
            latitude: parse_axis(latitude, Axis::Latitude, latitude_ref)?,
            longitude: parse_axis(longitude, Axis::Longitude, longitude_ref)?,
        };
        coordinate.is_valid().then_some(coordinate)
    }

    /// Parse a `"<latitude>, <longitude>"` position string.
    pub fn parse(position: &str) -> Option<Self> {
        let (latitude, longitude) = position.split_once(',')?;
        Self::from_parts(latitude, longitude, None, None)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= Axis::Latitude.limit()
            && self.longitude.abs() <= Axis::Longitude.limit()
    }

    pub fn latitude_direction(&self) -> char {
        Axis::Latitude.direction(self.latitude)
    }

    pub fn longitude_direction(&self) -> char {
        Axis::Longitude.direction(self.longitude)
    }

    /// `40 deg 26' 46.30" N, 79 deg 58' 56.00" W`
    pub fn format_exif_like(&self) -> String {
        format!(
            "{}, {}",
            format_axis(self.latitude, Axis::Latitude),
            format_axis(self.longitude, Axis::Longitude)
        )
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_exif_like())
    }
}

/// Format one axis as `D deg M' S.SS" X`.
///
/// Works in whole centiseconds of arc so that parsing the output and formatting it
/// again gives the same string.
pub fn format_axis(value: f64, axis: Axis) -> String {
    let total = (value.abs() * 360_000.0).round() as u64;
    let degrees = total / 360_000;
    let minutes = (total % 360_000) / 6_000;
    let centis = total % 6_000;
    format!(
        "{degrees} deg {minutes}' {}.{:02}\" {}",
        centis / 100,
        centis % 100,
        axis.direction(value)
    )
}

/// Parse one axis value into signed decimal degrees.
///
/// Numbers are read in order as degrees, minutes and seconds whatever unit symbols
/// (`deg`, `°`, `'`, `"`) sit between them. The direction comes from a cardinal word in
/// the value itself, else from `reference`, else the sign of the degrees.
pub fn parse_axis(value: &str, axis: Axis, reference: Option<&str>) -> Option<f64> {
    let mut numbers = Vec::new();
    let mut sign = None;

    for token in tokenize(value) {
        match token {
            Token::Number(n) => numbers.push(n.parse::<f64>().ok()?),
            Token::Word(w) if w.eq_ignore_ascii_case("deg") => {}
            Token::Word(w) => sign = Some(axis.sign_of(w)?),
        }
    }

    let magnitude = match numbers.as_slice() {
        [d] => d.abs(),
        [d, m] => d.abs() + m / 60.0,
        [d, m, s] => d.abs() + m / 60.0 + s / 3600.0,
        _ => return None,
    };
    let sign = match sign {
        Some(sign) => sign,
        None => match reference.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => axis.sign_of(r)?,
            None if numbers[0] < 0.0 => -1.0,
            None => 1.0,
        },
    };

    let degrees = sign * magnitude;
    (degrees.is_finite() && degrees.abs() <= axis.limit()).then_some(degrees)
}

enum Token<'a> {
    Number(&'a str),
    Word(&'a str),
}

fn tokenize(value: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    // (start index, numeric?) of the token being read
    let mut current: Option<(usize, bool)> = None;

    for (idx, c) in value.char_indices() {
        let class = if c.is_ascii_digit() || c == '.' || c == '-' {
            Some(true)
        } else if c.is_alphabetic() {
            Some(false)
        } else {
            None
        };
        if let Some((start, numeric)) = current {
            if class == Some(numeric) {
                continue;
            }
            tokens.push(make_token(&value[start..idx], numeric));
        }
        current = class.map(|numeric| (idx, numeric));
    }
    if let Some((start, numeric)) = current {
        tokens.push(make_token(&value[start..], numeric));
    }
    tokens
}

fn make_token(text: &str, numeric: bool) -> Token<'_> {
    if numeric {
        Token::Number(text)
    } else {
        Token::Word(text)
    }
}

/// GPS position of the shot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gps {
    pub coordinate: Option<Coordinate>,
}

impl TagGroup for Gps {
    fn from_tags(tags: &TagMap) -> Self {
        let from_pair = match (tags.get_str("GPS Latitude"), tags.get_str("GPS Longitude")) {
            (Some(lat), Some(lon)) => Coordinate::from_parts(
                &lat,
                &lon,
                tags.get_str("GPS Latitude Ref").as_deref(),
                tags.get_str("GPS Longitude Ref").as_deref(),
            ),
            _ => None,
        };
        let coordinate =
            from_pair.or_else(|| tags.get_str("GPS Position").and_then(|p| Coordinate::parse(&p)));
        Self { coordinate }
    }

    fn add_to_map(&self, map: &mut TagMap) {
        let Some(coordinate) = self.coordinate.filter(Coordinate::is_valid) else {
            return;
        };
        map.insert("GPS Latitude", format_axis(coordinate.latitude, Axis::Latitude));
        map.insert("GPS Longitude", format_axis(coordinate.longitude, Axis::Longitude));
        map.insert("GPS Position", coordinate.format_exif_like());
        map.insert(
            "GPS Latitude Ref",
            if coordinate.latitude_direction() == 'N' { "North" } else { "South" },
        );
        map.insert(
            "GPS Longitude Ref",
            if coordinate.longitude_direction() == 'E' { "East" } else { "West" },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ── parsing ──

    #[test]
    fn parses_reader_output() {
        let lat = parse_axis("40 deg 30\" 0' N", Axis::Latitude, None).unwrap();
        assert!(close(lat, 40.5));
    }

    #[test]
    fn parses_common_notations() {
        let cases = [
            ("40 deg 26' 46.30\" N", 40.0 + 26.0 / 60.0 + 46.3 / 3600.0),
            ("40°26'46.30\"S", -(40.0 + 26.0 / 60.0 + 46.3 / 3600.0)),
            ("12.5", 12.5),
            ("-12.5", -12.5),
            ("12 30", 12.5),
        ];
        for (input, expected) in cases {
            let value = parse_axis(input, Axis::Latitude, None).unwrap();
            assert!(close(value, expected), "{input}: {value}");
        }
    }

    #[test]
    fn reference_supplies_direction() {
        let lon = parse_axis("74 deg 0' 0.00\"", Axis::Longitude, Some("West")).unwrap();
        assert!(close(lon, -74.0));
        assert!(parse_axis("74", Axis::Longitude, Some("N")).is_none());
    }

    #[test]
    fn rejects_out_of_range_and_junk() {
        assert!(parse_axis("91", Axis::Latitude, None).is_none());
        assert!(parse_axis("181 E", Axis::Longitude, None).is_none());
        assert!(parse_axis("abc", Axis::Latitude, None).is_none());
        assert!(parse_axis("", Axis::Latitude, None).is_none());
        assert!(parse_axis("10 E", Axis::Latitude, None).is_none());
    }

    // ── group ──

    #[test]
    fn position_is_fallback() {
        let tags: TagMap = [("GPS Position", "48.1 N, 11.5 E")].into_iter().collect();
        let coordinate = Gps::from_tags(&tags).coordinate.unwrap();
        assert!(close(coordinate.latitude, 48.1));
        assert!(close(coordinate.longitude, 11.5));
    }

    #[test]
    fn pair_needs_both_axes() {
        let tags: TagMap = [("GPS Latitude", "48.1 N")].into_iter().collect();
        assert_eq!(Gps::from_tags(&tags).coordinate, None);
    }

    #[test]
    fn writes_exif_like_strings() {
        let gps = Gps {
            coordinate: Some(Coordinate {
                latitude: 40.5,
                longitude: -74.0,
            }),
        };
        let mut map = TagMap::new();
        gps.add_to_map(&mut map);
        assert_eq!(map.get_str("GPS Latitude").as_deref(), Some("40 deg 30' 0.00\" N"));
        assert_eq!(map.get_str("GPS Longitude").as_deref(), Some("74 deg 0' 0.00\" W"));
        assert_eq!(map.get_str("GPS Latitude Ref").as_deref(), Some("North"));
        assert_eq!(map.get_str("GPS Longitude Ref").as_deref(), Some("West"));
        assert_eq!(
            map.get_str("GPS Position").as_deref(),
            Some("40 deg 30' 0.00\" N, 74 deg 0' 0.00\" W")
        );
    }

    #[test]
    fn formatting_is_stable_after_reparse() {
        let gps = Gps {
            coordinate: Some(Coordinate {
                latitude: 40.123456789,
                longitude: 7.654321,
            }),
        };
        let mut first = TagMap::new();
        gps.add_to_map(&mut first);
        let mut second = TagMap::new();
        Gps::from_tags(&first).add_to_map(&mut second);
        assert_eq!(first, second);
    }
}

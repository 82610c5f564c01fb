use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use super::TagGroup;
use crate::exif::TagMap;

const CREATED_KEYS: &[&str] = &[
    "Create Date",
    "Date Created",
    "Date/Time Created",
    "Date/Time Original",
];

const EXIF_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Last-modified, creation and digitization timestamps of an image.
///
/// Whenever at least one of the three is known after construction, all three are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dates {
    pub last_modified: Option<NaiveDateTime>,
    pub created: Option<NaiveDateTime>,
    pub digitized: Option<NaiveDateTime>,
}

impl Dates {
    /// The earliest of the known timestamps.
    pub fn oldest(&self) -> Option<NaiveDateTime> {
        [self.last_modified, self.digitized, self.created]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn has_value(&self) -> bool {
        self.last_modified.is_some() || self.created.is_some() || self.digitized.is_some()
    }

    fn backfill(&mut self) {
        match (self.last_modified, self.created, self.digitized) {
            (None, None, None) => {}
            (None, None, Some(digitized)) => {
                self.created = Some(digitized);
                self.last_modified = Some(digitized);
            }
            (None, Some(created), digitized) => {
                self.digitized = digitized.or(Some(created));
                self.last_modified = Some(created);
            }
            (Some(modified), None, digitized) => {
                let created = digitized.unwrap_or(modified);
                self.created = Some(created);
                self.digitized = Some(digitized.unwrap_or(created));
            }
            (Some(_), Some(created), None) => self.digitized = Some(created),
            (Some(_), Some(_), Some(_)) => {}
        }
    }
}

impl TagGroup for Dates {
    fn from_tags(tags: &TagMap) -> Self {
        let parse = |key: &str| tags.get_str(key).and_then(|v| parse_date_time(&v));

        let created = CREATED_KEYS.iter().filter_map(|key| parse(key)).min();

        let digital_pair = match (
            tags.get_str("Digital Creation Date"),
            tags.get_str("Digital Creation Time"),
        ) {
            (Some(date), Some(time)) => parse_date_time(&format!("{date} {time}")),
            _ => None,
        };
        let digitized = [parse("Digital Creation Date/Time"), digital_pair, created]
            .into_iter()
            .flatten()
            .min();

        let mut dates = Self {
            last_modified: parse("Modify Date"),
            created,
            digitized,
        };
        dates.backfill();
        dates
    }

    fn add_to_map(&self, map: &mut TagMap) {
        if let Some(modified) = self.last_modified {
            map.insert("Modify Date", modified.format(EXIF_FORMAT).to_string());
        }
        if let Some(created) = self.created {
            let value = created.format(EXIF_FORMAT).to_string();
            for key in CREATED_KEYS {
                map.insert(*key, value.as_str());
            }
        }
        if let Some(digitized) = self.digitized {
            map.insert(
                "Digital Creation Date/Time",
                digitized.format(EXIF_FORMAT).to_string(),
            );
            map.insert("Digital Creation Date", digitized.format("%Y:%m:%d").to_string());
            map.insert("Digital Creation Time", digitized.format("%H:%M:%S").to_string());
        }
    }
}

/// Parse the date formats the metadata sources emit.
///
/// Accepts EXIF (`2020:05:01 10:20:30`), ISO (`2020-05-01 10:20`, `2020-05-01T10:20:30`),
/// a trailing UTC offset or `Z` (dropped, the local wall time is kept), fractional seconds
/// (dropped) and a bare date (midnight). Returns `None` for anything else.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        let local = dt.naive_local();
        return Some(local.with_nanosecond(0).unwrap_or(local));
    }

    let (date, time) = match value.split_once(['T', ' ']) {
        Some((date, time)) => (date, Some(time.trim())),
        None => (value, None),
    };
    let date = NaiveDate::parse_from_str(&date.replace(':', "-"), "%Y-%m-%d").ok()?;
    let time = match time {
        None | Some("") => NaiveTime::MIN,
        Some(time) => parse_time(time)?,
    };
    Some(date.and_time(time))
}

fn parse_time(time: &str) -> Option<NaiveTime> {
    let time = time.trim_end_matches('Z');
    // Offset sign, if any, follows the clock part.
    let time = match time.rfind(['+', '-']) {
        Some(idx) if idx > 0 => &time[..idx],
        _ => time,
    };
    let time = time.split('.').next().unwrap_or(time).trim();
    NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .ok()
}

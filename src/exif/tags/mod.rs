//! Typed sub-records of an [`ImageInfo`](super::ImageInfo).
//!
//! Each group reads a fixed set of tag names (with alias precedence) from a [`TagMap`]
//! and writes all of its aliases back with [`TagGroup::add_to_map`]. Reconstructing a
//! group from its own output yields the same group.

mod contact;
mod copyright;
mod dates;
mod gps;
mod labels;
mod location;
mod photo;
mod workflow;

pub use contact::Contact;
pub use copyright::Copyright;
pub use dates::{Dates, parse_date_time};
pub use gps::{Axis, Coordinate, Gps, format_axis, parse_axis};
pub use labels::Labels;
pub use location::PictureLocation;
pub use photo::Photo;
pub use workflow::Workflow;

use super::TagMap;

/// A record built from, and serializable back into, a flat tag map.
pub trait TagGroup: Sized {
    fn from_tags(tags: &TagMap) -> Self;

    /// Write every canonical alias of every set field into `map`.
    fn add_to_map(&self, map: &mut TagMap);

    /// Rebuild this group in place from `tags`.
    fn reinit_from_tags(&mut self, tags: &TagMap) {
        *self = Self::from_tags(tags);
    }
}

/// Insert `value` under every key in `keys` when it is set and non-blank.
pub(crate) fn put_all(map: &mut TagMap, keys: &[&str], value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        for key in keys {
            map.insert(*key, value);
        }
    }
}

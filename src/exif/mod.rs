//! Normalized image metadata.
//!
//! Every metadata source produces a flat [`TagMap`] keyed by human-readable tag names
//! (`"Camera Model Name"`, `"Date/Time Original"`, ...). [`ImageInfo`] turns such a map
//! into typed groups and can flatten itself back into the same vocabulary:
//!
//! - [`reader`] reads EXIF blocks natively and maps them onto tag names
//! - [`xmp`] scans a file for an embedded XMP packet and maps its fields
//! - [`tags`] holds the typed groups (copyright, contact, location, dates, ...)
//! - [`locale`] translates tag names and display labels

mod image_info;
pub mod locale;
pub mod reader;
mod tag_map;
pub mod tags;
pub mod xmp;

pub use image_info::{DEFAULT_DATE_FORMAT, ImageInfo, Size};
pub use tag_map::{TagMap, TagValue, split_list};

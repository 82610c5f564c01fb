//! # image-meta
//!
//! EXIF, IPTC and XMP metadata extraction that normalizes whatever source is available
//! (`exiv2`, `exiftool`, embedded EXIF/XMP, sidecar JSON) into one image record.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use image_meta::config::Config;
//! use image_meta::loader::LoaderChain;
//! use image_meta::pipeline::{collect_images, process_image};
//! use std::path::PathBuf;
//!
//! fn main() -> anyhow::Result<()> {
//!     // Load config from file (source order, tool paths, display options)
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!
//!     // Build the source fallback chain from config
//!     let chain = LoaderChain::from_config(&config.loaders);
//!
//!     // Collect supported image files from paths (files or directories)
//!     let images = collect_images(&[PathBuf::from("./photos")]);
//!
//!     for path in &images {
//!         let result = process_image(path, &chain);
//!         match result.info {
//!             Some(info) => println!("{}: {}", path.display(), info.copyright_text()),
//!             None => eprintln!("{}: {:?}", path.display(), result.error),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! Every source produces a flat [`TagMap`](exif::TagMap); [`ImageInfo`](exif::ImageInfo)
//! is built from it and flattens back into the same vocabulary:
//!
//! ```rust,no_run
//! use image_meta::exif::ImageInfo;
//! use image_meta::loader::{NativeSource, TagSource};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), image_meta::error::LoaderError> {
//! let path = Path::new("photo.jpg");
//! let tags = NativeSource::default().load_tags(path)?;
//! let info = ImageInfo::new(&tags, path, None);
//! println!("Camera: {:?}", info.photo.camera_model);
//! println!("Position: {:?}", info.gps.coordinate.map(|c| c.to_string()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration types and loading/saving
//! - [`error`]: Errors reported by metadata sources
//! - [`exif`]: Tag maps, typed tag groups, EXIF/XMP readers, localized labels
//! - [`loader`]: Metadata sources and the fallback chain
//! - [`pipeline`]: Image collection, MIME/size probing, per-image processing

pub mod config;
pub mod error;
pub mod exif;
pub mod loader;
pub mod pipeline;

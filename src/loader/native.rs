use std::path::Path;

use super::{SourceOptions, TagSource};
use crate::error::LoaderError;
use crate::exif::{TagMap, reader, xmp};

/// Embedded metadata read in-process: the XMP packet first, EXIF filling the gaps.
#[derive(Debug, Clone)]
pub struct NativeSource {
    chunk_size: usize,
}

impl Default for NativeSource {
    fn default() -> Self {
        Self::new(xmp::DEFAULT_CHUNK_SIZE)
    }
}

impl NativeSource {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }
}

impl TagSource for NativeSource {
    fn name(&self) -> &'static str {
        "native"
    }

    fn configure(&mut self, options: &SourceOptions) -> Result<(), LoaderError> {
        if let Some(chunk_size) = options.xmp_chunk_size {
            if chunk_size == 0 {
                return Err(LoaderError::Configuration(
                    "xmp_chunk_size must be greater than zero".into(),
                ));
            }
            self.chunk_size = chunk_size;
        }
        Ok(())
    }

    fn load_tags(&self, path: &Path) -> Result<TagMap, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::MissingFile(path.to_path_buf()));
        }

        let mut tags = xmp::extract_file(path, self.chunk_size)?.unwrap_or_default();

        match reader::read_native_exif(path) {
            Ok(native) => tags.fill_from(reader::extract(&native)),
            Err(e) => log::debug!("No native EXIF for {}: {e}", path.display()),
        }

        Ok(tags)
    }
}

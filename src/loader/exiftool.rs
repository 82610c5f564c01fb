use std::path::{Path, PathBuf};

use super::tool;
use super::{SourceOptions, TagSource};
use crate::error::LoaderError;
use crate::exif::TagMap;

/// Metadata from Phil Harvey's `exiftool`, read from its default `Name : value` report.
///
/// exiftool already prints the canonical tag names, so no translation is needed.
#[derive(Debug, Clone, Default)]
pub struct ExifToolSource {
    path: Option<PathBuf>,
}

impl ExifToolSource {
    /// A source using the first `exiftool` found on `PATH`, `/usr/bin` or `/bin`.
    pub fn discover() -> Self {
        let path = tool::find_executable("exiftool");
        match &path {
            Some(p) => log::debug!("Found exiftool at {}", p.display()),
            None => log::debug!("exiftool not found"),
        }
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl TagSource for ExifToolSource {
    fn name(&self) -> &'static str {
        "exiftool"
    }

    fn is_configured(&self) -> bool {
        self.path.is_some()
    }

    fn configure(&mut self, options: &SourceOptions) -> Result<(), LoaderError> {
        self.path = Some(tool::validate("exiftool", options.path.as_deref())?);
        Ok(())
    }

    fn load_tags(&self, path: &Path) -> Result<TagMap, LoaderError> {
        let program = self.path.as_deref().ok_or(LoaderError::NotConfigured)?;
        if !path.is_file() {
            return Err(LoaderError::MissingFile(path.to_path_buf()));
        }

        let output = tool::run(program, &[path.as_os_str()])?;
        Ok(parse_report(&output))
    }
}

/// Split each line on its first `:`. The first occurrence of a name wins.
pub(crate) fn parse_report(output: &str) -> TagMap {
    let mut tags = TagMap::new();
    for line in tool::report_lines(output) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        tags.insert_if_absent(name, value.trim());
    }
    tags
}

//! Metadata sources and the fallback chain that picks between them.
//!
//! Each [`TagSource`] turns an image file into a flat [`TagMap`]. The sources shipped with
//! the crate are:
//!
//! - [`Exiv2Source`] runs `exiv2 -p a` and translates its namespaced keys
//! - [`ExifToolSource`] runs `exiftool` and reads its `Name : value` report
//! - [`NativeSource`] reads embedded EXIF and XMP without any external tool
//! - [`SidecarSource`] reads a JSON file stored next to the image
//!
//! [`LoaderChain`] tries them in order and returns the first usable result.

mod exiftool;
mod exiv2;
mod native;
mod sidecar;
mod tool;

pub use exiftool::ExifToolSource;
pub use exiv2::Exiv2Source;
pub use native::NativeSource;
pub use sidecar::SidecarSource;

use std::path::{Path, PathBuf};

use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::exif::{ImageInfo, TagMap};

/// Options passed to [`TagSource::configure`].
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Path of the external executable, for tool-backed sources.
    pub path: Option<PathBuf>,
    /// Read size used while scanning for an XMP packet.
    pub xmp_chunk_size: Option<usize>,
}

impl SourceOptions {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }
}

/// A single way of reading image metadata.
///
/// Implement this trait to add a custom source to a [`LoaderChain`].
pub trait TagSource: Send + Sync {
    /// Short lowercase name, as used in `source_order`.
    fn name(&self) -> &'static str;

    /// `false` if the source cannot run yet, e.g. because its tool was not found.
    fn is_configured(&self) -> bool {
        true
    }

    /// Apply `options`. Fails with [`LoaderError::Configuration`] if they are unusable.
    fn configure(&mut self, options: &SourceOptions) -> Result<(), LoaderError> {
        let _ = options;
        Ok(())
    }

    /// Read the flat tag map of `path`.
    fn load_tags(&self, path: &Path) -> Result<TagMap, LoaderError>;

    /// Read `path` into an [`ImageInfo`]. An empty tag map is [`LoaderError::NoMetadata`].
    fn load(&self, path: &Path) -> Result<ImageInfo, LoaderError> {
        if !self.is_configured() {
            return Err(LoaderError::NotConfigured);
        }
        let tags = self.load_tags(path)?;
        if tags.is_empty() {
            return Err(LoaderError::NoMetadata);
        }
        Ok(ImageInfo::new(&tags, path, None))
    }
}

/// Ordered list of sources; the first one that yields metadata wins.
pub struct LoaderChain {
    sources: Vec<Box<dyn TagSource>>,
}

impl LoaderChain {
    pub fn new(sources: Vec<Box<dyn TagSource>>) -> Self {
        Self { sources }
    }

    /// Build the chain named by `config.source_order`.
    ///
    /// Unknown names are skipped with a warning. A tool source whose configured path is
    /// unusable stays in the chain but only runs if discovery found the tool.
    pub fn from_config(config: &LoaderConfig) -> Self {
        let mut sources: Vec<Box<dyn TagSource>> = Vec::new();

        for name in &config.source_order {
            match name.to_ascii_lowercase().as_str() {
                "exiv2" => {
                    let mut source = if config.discover_tools {
                        Exiv2Source::discover()
                    } else {
                        Exiv2Source::default()
                    };
                    if let Some(path) = &config.exiv2_path {
                        if let Err(e) = source.configure(&SourceOptions::with_path(path)) {
                            log::warn!("exiv2: {e}");
                        }
                    }
                    sources.push(Box::new(source));
                }
                "exiftool" => {
                    let mut source = if config.discover_tools {
                        ExifToolSource::discover()
                    } else {
                        ExifToolSource::default()
                    };
                    if let Some(path) = &config.exiftool_path {
                        if let Err(e) = source.configure(&SourceOptions::with_path(path)) {
                            log::warn!("exiftool: {e}");
                        }
                    }
                    sources.push(Box::new(source));
                }
                "native" => sources.push(Box::new(NativeSource::new(config.xmp_chunk_size))),
                "sidecar" | "json" => sources.push(Box::new(SidecarSource)),
                other => log::warn!("Unknown metadata source in source_order: {other}"),
            }
        }

        Self::new(sources)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Names of all sources, in the order they are tried.
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Names of the sources that are ready to run.
    pub fn configured_sources(&self) -> Vec<&'static str> {
        self.sources
            .iter()
            .filter(|s| s.is_configured())
            .map(|s| s.name())
            .collect()
    }

    /// Metadata of `path` from the first source that has any, `None` if none has.
    pub fn load(&self, path: &Path) -> Option<ImageInfo> {
        self.load_with_source(path).map(|(info, _)| info)
    }

    /// Like [`load`](Self::load), also naming the source that succeeded.
    pub fn load_with_source(&self, path: &Path) -> Option<(ImageInfo, &'static str)> {
        for source in &self.sources {
            if !source.is_configured() {
                log::debug!("  {} not configured, skipping", source.name());
                continue;
            }

            match source.load(path) {
                Ok(info) => {
                    log::debug!("  {} succeeded for {}", source.name(), path.display());
                    return Some((info, source.name()));
                }
                Err(e) if e.is_absence() => {
                    log::debug!("  {}: {e}", source.name());
                }
                Err(e) => {
                    log::warn!("  {} failed for {}: {e}", source.name(), path.display());
                }
            }
        }

        log::debug!("No metadata source produced data for {}", path.display());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct FailingSource;

    impl TagSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn load_tags(&self, _path: &Path) -> Result<TagMap, LoaderError> {
            Err(LoaderError::Tool("exit status 1".into()))
        }
    }

    struct Unconfigured;

    impl TagSource for Unconfigured {
        fn name(&self) -> &'static str {
            "unconfigured"
        }

        fn is_configured(&self) -> bool {
            false
        }

        fn load_tags(&self, _path: &Path) -> Result<TagMap, LoaderError> {
            panic!("must not be called")
        }
    }

    struct EmptySource;

    impl TagSource for EmptySource {
        fn name(&self) -> &'static str {
            "empty"
        }

        fn load_tags(&self, _path: &Path) -> Result<TagMap, LoaderError> {
            Ok(TagMap::new())
        }
    }

    fn image_with_sidecar(dir: &TempDir) -> PathBuf {
        let image = dir.path().join("photo.jpg");
        fs::write(&image, b"not really a jpeg").unwrap();
        fs::write(dir.path().join("photo.jpg.json"), r#"{"Headline": "From JSON"}"#).unwrap();
        image
    }

    // ── LoaderChain::load ──

    #[test]
    fn failing_source_falls_through_to_sidecar() {
        let dir = TempDir::new().unwrap();
        let image = image_with_sidecar(&dir);
        let chain = LoaderChain::new(vec![Box::new(FailingSource), Box::new(SidecarSource)]);

        let (info, source) = chain.load_with_source(&image).unwrap();
        assert_eq!(source, "sidecar");
        assert_eq!(info.headline.as_deref(), Some("From JSON"));
    }

    #[test]
    fn unconfigured_and_empty_sources_are_skipped() {
        let dir = TempDir::new().unwrap();
        let image = image_with_sidecar(&dir);
        let chain = LoaderChain::new(vec![
            Box::new(Unconfigured),
            Box::new(EmptySource),
            Box::new(SidecarSource),
        ]);
        assert_eq!(chain.load_with_source(&image).unwrap().1, "sidecar");
        assert_eq!(chain.configured_sources(), vec!["empty", "sidecar"]);
    }

    #[test]
    fn exhausted_chain_returns_none() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("plain.jpg");
        fs::write(&image, b"plain").unwrap();
        let chain = LoaderChain::new(vec![Box::new(FailingSource), Box::new(SidecarSource)]);
        assert!(chain.load(&image).is_none());
        assert!(LoaderChain::new(Vec::new()).load(&image).is_none());
    }

    // ── LoaderChain::from_config ──

    #[test]
    fn from_config_follows_source_order() {
        let config = LoaderConfig {
            source_order: vec!["sidecar".into(), "bogus".into(), "native".into()],
            discover_tools: false,
            ..Default::default()
        };
        let chain = LoaderChain::from_config(&config);
        assert_eq!(chain.source_names(), vec!["sidecar", "native"]);
    }

    #[test]
    fn from_config_keeps_undiscovered_tools_unconfigured() {
        let config = LoaderConfig {
            discover_tools: false,
            exiv2_path: Some(PathBuf::from("/nonexistent/exiv2")),
            ..Default::default()
        };
        let chain = LoaderChain::from_config(&config);
        assert_eq!(
            chain.source_names(),
            vec!["exiv2", "exiftool", "native", "sidecar"]
        );
        assert_eq!(chain.configured_sources(), vec!["native", "sidecar"]);
    }
}

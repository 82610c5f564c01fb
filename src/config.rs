use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::exif::DEFAULT_DATE_FORMAT;
use crate::exif::xmp::DEFAULT_CHUNK_SIZE;

/// Top-level configuration for the image-meta library.
///
/// Controls which metadata sources are tried, in which order, and how results are
/// displayed.
///
/// # Loading
///
/// ```rust,no_run
/// use image_meta::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.loaders.exiv2_path = Some("/opt/exiv2/bin/exiv2".into());
/// config.output.language = Some("de".into());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metadata sources and their order.
    pub loaders: LoaderConfig,
    /// Display options.
    pub output: OutputConfig,
}

/// Configuration of the [`LoaderChain`](crate::loader::LoaderChain).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Order in which sources are tried: `exiv2`, `exiftool`, `native`, `sidecar`.
    pub source_order: Vec<String>,
    /// Explicit `exiv2` executable.
    pub exiv2_path: Option<PathBuf>,
    /// Explicit `exiftool` executable.
    pub exiftool_path: Option<PathBuf>,
    /// Look for the tools on `PATH`, `/usr/bin` and `/bin` when no path is given.
    pub discover_tools: bool,
    /// Read size in bytes used while scanning for an embedded XMP packet.
    pub xmp_chunk_size: usize,
}

/// How metadata is shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// strftime pattern for dates.
    pub date_format: String,
    /// Include camera make and model in the summary.
    pub show_model: bool,
    /// Language of the labels, e.g. `"de"`. English when unset.
    pub language: Option<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            source_order: vec![
                "exiv2".to_string(),
                "exiftool".to_string(),
                "native".to_string(),
                "sidecar".to_string(),
            ],
            exiv2_path: None,
            exiftool_path: None,
            discover_tools: true,
            xmp_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            show_model: true,
            language: None,
        }
    }
}

impl Config {
    /// Resolve the config file path: the same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Get the ordered list of sources that can run with this configuration.
    ///
    /// Tool sources count only when discovery is on or a path is configured.
    pub fn enabled_sources(&self) -> Vec<String> {
        let loaders = &self.loaders;
        loaders
            .source_order
            .iter()
            .filter(|name| match name.as_str() {
                "exiv2" => loaders.discover_tools || loaders.exiv2_path.is_some(),
                "exiftool" => loaders.discover_tools || loaders.exiftool_path.is_some(),
                "native" | "sidecar" | "json" => true,
                _ => false,
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(
            config.loaders.source_order,
            vec!["exiv2", "exiftool", "native", "sidecar"]
        );
        assert_eq!(config.loaders.xmp_chunk_size, 2048);
        assert_eq!(config.output.date_format, "%Y-%m-%d %H:%M");
        assert!(config.output.show_model);
        assert_eq!(config.output.language, None);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert!(config.loaders.discover_tools);
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.loaders.exiftool_path = Some("/opt/exiftool".into());
        config.output.language = Some("de".into());
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.loaders.exiftool_path, Some(PathBuf::from("/opt/exiftool")));
        assert_eq!(loaded.output.language.as_deref(), Some("de"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"output": {"show_model": false}}"#).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert!(!config.output.show_model);
        assert_eq!(config.output.date_format, "%Y-%m-%d %H:%M");
        assert_eq!(config.loaders.source_order.len(), 4);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn enabled_sources_respects_discovery() {
        let mut config = Config::default();
        config.loaders.discover_tools = false;
        config.loaders.source_order.push("unknown".into());
        assert_eq!(config.enabled_sources(), vec!["native", "sidecar"]);

        config.loaders.exiv2_path = Some("/usr/local/bin/exiv2".into());
        assert_eq!(config.enabled_sources(), vec!["exiv2", "native", "sidecar"]);
    }
}

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::TagSource;
use crate::error::LoaderError;
use crate::exif::TagMap;

/// Tags stored as a JSON object next to the image, in `photo.jpg.json` or `photo.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarSource;

impl SidecarSource {
    /// The first existing sidecar path for `image`.
    pub fn sidecar_path(image: &Path) -> Option<PathBuf> {
        let mut appended = OsString::from(image.as_os_str());
        appended.push(".json");

        [PathBuf::from(appended), image.with_extension("json")]
            .into_iter()
            .find(|candidate| candidate.is_file())
    }
}

impl TagSource for SidecarSource {
    fn name(&self) -> &'static str {
        "sidecar"
    }

    fn load_tags(&self, path: &Path) -> Result<TagMap, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::MissingFile(path.to_path_buf()));
        }
        let Some(json_path) = Self::sidecar_path(path) else {
            return Err(LoaderError::NoMetadata);
        };

        let json = std::fs::read_to_string(&json_path).map_err(|e| LoaderError::io(&json_path, e))?;
        let value: serde_json::Value = serde_json::from_str(&json)
            .map_err(|e| LoaderError::Parse(format!("{}: {e}", json_path.display())))?;
        TagMap::from_json_value(&value).ok_or_else(|| {
            LoaderError::Parse(format!("{} is not a JSON object", json_path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn image(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("photo.jpg");
        fs::write(&path, b"jpeg").unwrap();
        path
    }

    #[test]
    fn appended_name_is_preferred() {
        let dir = TempDir::new().unwrap();
        let image = image(&dir);
        fs::write(dir.path().join("photo.json"), r#"{"Headline": "replaced"}"#).unwrap();
        fs::write(dir.path().join("photo.jpg.json"), r#"{"Headline": "appended"}"#).unwrap();

        let tags = SidecarSource.load_tags(&image).unwrap();
        assert_eq!(tags.get_str("Headline").as_deref(), Some("appended"));
    }

    #[test]
    fn replaced_extension_is_the_fallback() {
        let dir = TempDir::new().unwrap();
        let image = image(&dir);
        fs::write(
            dir.path().join("photo.json"),
            r#"{"Keywords": ["a", "b"], "ISO": 200}"#,
        )
        .unwrap();

        let info = SidecarSource.load(&image).unwrap();
        assert_eq!(info.keywords, vec!["a", "b"]);
        assert_eq!(info.photo.iso, 200);
    }

    #[test]
    fn empty_or_non_object_json_is_rejected() {
        let dir = TempDir::new().unwrap();
        let image = image(&dir);
        let sidecar = dir.path().join("photo.jpg.json");

        fs::write(&sidecar, "{}").unwrap();
        assert!(matches!(
            SidecarSource.load(&image),
            Err(LoaderError::NoMetadata)
        ));

        fs::write(&sidecar, "[1, 2]").unwrap();
        assert!(matches!(
            SidecarSource.load(&image),
            Err(LoaderError::Parse(_))
        ));

        fs::write(&sidecar, "{broken").unwrap();
        assert!(matches!(
            SidecarSource.load(&image),
            Err(LoaderError::Parse(_))
        ));
    }

    #[test]
    fn no_sidecar_or_no_image() {
        let dir = TempDir::new().unwrap();
        let image = image(&dir);
        assert!(matches!(
            SidecarSource.load_tags(&image),
            Err(LoaderError::NoMetadata)
        ));
        assert!(matches!(
            SidecarSource.load_tags(&dir.path().join("gone.jpg")),
            Err(LoaderError::MissingFile(_))
        ));
    }
}

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::exif::{ImageInfo, Size};
use crate::loader::LoaderChain;

/// Supported image extensions.
const IMAGE_EXTENSIONS: &[&str] = &[
    // Decodable by the `image` crate (size probing works)
    "jpg", "jpeg", "png", "webp", "tif", "tiff", "gif", "bmp",
    // HEIC/HEIF/AVIF, metadata only
    "heic", "heif", "avif",
    // RAW formats, metadata only
    "cr3", "cr2", "dng", "nef", "arw", "raf", "orf", "rw2", "pef", "srw",
];

/// MIME type derived from the file extension, `None` for unknown extensions.
///
/// # Example
///
/// ```rust
/// use image_meta::pipeline::mime_type_for_path;
/// use std::path::Path;
///
/// assert_eq!(mime_type_for_path(Path::new("photo.JPG")), Some("image/jpeg"));
/// assert_eq!(mime_type_for_path(Path::new("photo.nef")), Some("image/x-nikon-nef"));
/// assert_eq!(mime_type_for_path(Path::new("notes.txt")), None);
/// ```
pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        "cr2" => "image/x-canon-cr2",
        "cr3" => "image/x-canon-cr3",
        "dng" => "image/x-adobe-dng",
        "nef" => "image/x-nikon-nef",
        "arw" => "image/x-sony-arw",
        "raf" => "image/x-fuji-raf",
        "orf" => "image/x-olympus-orf",
        "rw2" => "image/x-panasonic-rw2",
        "pef" => "image/x-pentax-pef",
        "srw" => "image/x-samsung-srw",
        _ => return None,
    };
    Some(mime)
}

/// Pixel size read from the image header, `None` if the format cannot be decoded.
pub fn probe_size(path: &Path) -> Option<Size> {
    match image::image_dimensions(path) {
        Ok((width, height)) => Some(Size { width, height }),
        Err(e) => {
            log::debug!("Could not read dimensions of {}: {e}", path.display());
            None
        }
    }
}

/// The result of reading the metadata of a single image.
///
/// # Example
///
/// ```rust,no_run
/// # use image_meta::config::Config;
/// # use image_meta::loader::LoaderChain;
/// # use image_meta::pipeline::process_image;
/// let chain = LoaderChain::from_config(&Config::default().loaders);
/// let result = process_image("photo.jpg".as_ref(), &chain);
///
/// if let Some(info) = &result.info {
///     println!("Source: {:?}", result.source_used);
///     println!("Keywords: {}", info.keywords.join(", "));
/// }
/// ```
#[derive(Debug)]
pub struct ProcessResult {
    pub path: PathBuf,
    pub info: Option<ImageInfo>,
    /// Name of the source that produced [`info`](Self::info).
    pub source_used: Option<String>,
    pub error: Option<String>,
}

/// Collect supported image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks). Only files with supported image extensions
/// are included.
///
/// # Example
///
/// ```rust,no_run
/// use image_meta::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[
///     PathBuf::from("photo.jpg"),       // single file
///     PathBuf::from("./photos/"),        // entire directory
/// ]);
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported image extension.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read the metadata of one image through the loader chain.
///
/// Never fails: a missing file or an exhausted chain is reported in
/// [`ProcessResult::error`].
pub fn process_image(path: &Path, chain: &LoaderChain) -> ProcessResult {
    let mut result = ProcessResult {
        path: path.to_path_buf(),
        info: None,
        source_used: None,
        error: None,
    };

    if !path.is_file() {
        result.error = Some("File not found".to_string());
        return result;
    }

    log::info!("Reading {}", path.display());
    match chain.load_with_source(path) {
        Some((info, source)) => {
            result.info = Some(info);
            result.source_used = Some(source.to_string());
        }
        None => {
            let tried = chain.configured_sources().join(", ");
            result.error = Some(if tried.is_empty() {
                "No metadata source is configured".to_string()
            } else {
                format!("No metadata found (tried: {tried})")
            });
        }
    }

    result
}

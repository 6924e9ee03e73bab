//! Card image lookup and copying.
//!
//! Images are pre-downloaded into a flat source directory, one file per
//! printing named by identifier (`209.webp`, `1234.jpg`). WebP is preferred;
//! the other formats are tried in a fixed order. A found image is copied into
//! `<output>/images/` under its original file name.

use crate::types::PrintingId;
use std::fs;
use std::path::{Path, PathBuf};

/// Accepted extensions, in lookup order.
pub const IMAGE_EXTENSIONS: &[&str] = &["webp", "jpg", "jpeg", "png", "gif"];

/// Output subdirectory (and URL prefix) for copied images.
pub const IMAGES_DIR: &str = "images";

/// Find the source image for a printing, if any.
pub fn find_card_image(images_dir: &Path, id: PrintingId) -> Option<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| images_dir.join(format!("{}.{}", id, ext)))
        .find(|path| path.is_file())
}

/// Copy `source` into `<output_dir>/images/` and return its site-relative path.
pub fn copy_card_image(source: &Path, output_dir: &Path) -> std::io::Result<String> {
    let filename = source
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "image path has no file name"))?;
    let target_dir = output_dir.join(IMAGES_DIR);
    fs::create_dir_all(&target_dir)?;
    fs::copy(source, target_dir.join(&filename))?;
    Ok(format!("{}/{}", IMAGES_DIR, filename))
}

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder, RgbaImage};
use rfd::FileDialog;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::{DeskError, DeskResult};

/// Extensions offered by the open/save dialogs.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// File name of the pre-stroke snapshot inside the scratch directory.
pub const SCRATCH_FILE_NAME: &str = "pre_stroke.png";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
}

impl SaveFormat {
    /// Format implied by the path's extension; unknown or missing means PNG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => SaveFormat::Jpeg,
            _ => SaveFormat::Png,
        }
    }

    /// Parse a `--format` style name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "png" => Some(SaveFormat::Png),
            "jpg" | "jpeg" => Some(SaveFormat::Jpeg),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
        }
    }
}

/// Decode any supported image file into RGBA.
pub fn load_image_sync(path: &Path) -> DeskResult<RgbaImage> {
    let img = image::open(path).map_err(|source| DeskError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

// ============================================================================
// IMAGE ENCODING
// ============================================================================

/// Encode and write an image to a file.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode_and_write(
    image: &RgbaImage,
    path: &Path,
    format: SaveFormat,
    quality: u8,
) -> DeskResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        SaveFormat::Png => {
            let encoder = PngEncoder::new(&mut writer);
            encoder.write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
        SaveFormat::Jpeg => {
            let rgb_image = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
            encoder.encode(
                rgb_image.as_raw(),
                rgb_image.width(),
                rgb_image.height(),
                image::ColorType::Rgb8,
            )?;
        }
    }

    Ok(())
}

// ============================================================================
// FILE HANDLER
// ============================================================================

pub struct FileHandler {
    /// Current file path (None if new/unsaved file)
    pub current_path: Option<PathBuf>,
    pub last_format: SaveFormat,
    /// JPEG quality used by `save_image`
    pub last_quality: u8,
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHandler {
    pub fn new() -> Self {
        Self {
            current_path: None,
            last_format: SaveFormat::Png,
            last_quality: 90,
        }
    }

    /// Show native file dialog to pick an image to open
    pub fn pick_open_path(&self) -> Option<PathBuf> {
        FileDialog::new()
            .set_title("Open File")
            .add_filter("Image", IMAGE_EXTENSIONS)
            .add_filter("All Files", &["*"])
            .pick_file()
    }

    /// Show native file dialog to pick a save destination
    pub fn pick_save_path(&self) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .set_title("Save File As")
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"]);
        if let Some(current) = &self.current_path {
            if let Some(dir) = current.parent() {
                dialog = dialog.set_directory(dir);
            }
            if let Some(name) = current.file_name().and_then(|n| n.to_str()) {
                dialog = dialog.set_file_name(name);
            }
        }
        dialog.save_file()
    }

    /// Make `path` the current document without touching the disk.
    pub fn remember(&mut self, path: &Path) {
        self.current_path = Some(path.to_path_buf());
        self.last_format = SaveFormat::from_path(path);
    }

    /// Write `image` to `path` (format by extension) and remember the path.
    pub fn save_image(&mut self, image: &RgbaImage, path: &Path) -> DeskResult<()> {
        let format = SaveFormat::from_path(path);
        encode_and_write(image, path, format, self.last_quality)?;
        self.current_path = Some(path.to_path_buf());
        self.last_format = format;
        Ok(())
    }

    /// Reload the current document from disk, if there is one.
    pub fn reload(&self) -> Option<DeskResult<RgbaImage>> {
        self.current_path.as_deref().map(load_image_sync)
    }
}

// ============================================================================
// PRE-STROKE SNAPSHOT — scratch file shared by the moves of one shape drag
// ============================================================================

/// Fixed-path PNG holding the canvas as it was when a shape drag began.
///
/// When the file cannot be written the snapshot is kept in memory instead,
/// so the preview still restores a clean canvas on every move.
pub struct ScratchFile {
    path: PathBuf,
    fallback: Option<RgbaImage>,
}

impl ScratchFile {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SCRATCH_FILE_NAME),
            fallback: None,
        }
    }

    /// Default scratch directory under the OS temp dir.
    pub fn default_dir() -> PathBuf {
        std::env::temp_dir().join("Desk")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_in_memory(&self) -> bool {
        self.fallback.is_some()
    }

    /// Persist the snapshot, overwriting the previous gesture's file.
    pub fn store(&mut self, image: &RgbaImage) {
        self.fallback = None;
        if let Err(e) = self.write(image) {
            crate::log_warn!(
                "Pre-stroke snapshot: could not write {} ({}), keeping it in memory",
                self.path.display(),
                e
            );
            self.fallback = Some(image.clone());
        }
    }

    fn write(&self, image: &RgbaImage) -> DeskResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        encode_and_write(image, &self.path, SaveFormat::Png, 100)
    }

    /// Read the snapshot back. `None` only if it was never stored or the
    /// file became unreadable.
    pub fn restore(&self) -> Option<RgbaImage> {
        if let Some(image) = &self.fallback {
            return Some(image.clone());
        }
        match load_image_sync(&self.path) {
            Ok(image) => Some(image),
            Err(e) => {
                crate::log_warn!("Pre-stroke snapshot: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(6, 4, Rgba([255, 255, 255, 255]));
        img.put_pixel(2, 1, Rgba([10, 20, 30, 255]));
        img
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(SaveFormat::from_path(Path::new("a.JPG")), SaveFormat::Jpeg);
        assert_eq!(SaveFormat::from_path(Path::new("a.jpeg")), SaveFormat::Jpeg);
        assert_eq!(SaveFormat::from_path(Path::new("a.png")), SaveFormat::Png);
        assert_eq!(SaveFormat::from_path(Path::new("noext")), SaveFormat::Png);
    }

    #[test]
    fn png_save_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut handler = FileHandler::new();
        handler.save_image(&sample(), &path).unwrap();
        assert_eq!(handler.current_path.as_deref(), Some(path.as_path()));
        assert_eq!(load_image_sync(&path).unwrap(), sample());
    }

    #[test]
    fn jpeg_save_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let mut handler = FileHandler::new();
        handler.save_image(&sample(), &path).unwrap();
        assert_eq!(handler.last_format, SaveFormat::Jpeg);
        let back = load_image_sync(&path).unwrap();
        assert_eq!(back.dimensions(), (6, 4));
    }

    #[test]
    fn loading_a_missing_file_names_the_path() {
        let err = load_image_sync(Path::new("/nonexistent/missing.png")).unwrap_err();
        assert!(matches!(err, DeskError::Open { .. }));
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn remember_tracks_path_and_format() {
        let mut handler = FileHandler::new();
        assert!(handler.current_path.is_none());
        handler.remember(Path::new("photo.jpeg"));
        assert_eq!(handler.current_path.as_deref(), Some(Path::new("photo.jpeg")));
        assert_eq!(handler.last_format, SaveFormat::Jpeg);
    }

    #[test]
    fn scratch_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut scratch = ScratchFile::new(dir.path().join("nested"));
        assert!(scratch.restore().is_none());
        scratch.store(&sample());
        assert!(!scratch.is_in_memory());
        assert!(scratch.path().exists());
        assert_eq!(scratch.restore().unwrap(), sample());
    }

    #[test]
    fn unwritable_scratch_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();
        let mut scratch = ScratchFile::new(&blocker);
        scratch.store(&sample());
        assert!(scratch.is_in_memory());
        assert_eq!(scratch.restore().unwrap(), sample());
    }
}

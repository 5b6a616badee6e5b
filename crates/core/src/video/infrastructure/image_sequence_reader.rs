use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Treats a directory of still images as a video.
///
/// Files with a known image extension are played in file-name order. The
/// sequence has no native frame rate (`fps = 0`) and every image must have
/// the dimensions of the first one.
pub struct ImageSequenceReader {
    files: Vec<PathBuf>,
    dimensions: Option<(u32, u32)>,
}

impl ImageSequenceReader {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            dimensions: None,
        }
    }
}

impl Default for ImageSequenceReader {
    fn default() -> Self {
        Self::new()
    }
}

/// True if `path` has one of the supported image extensions.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_frame(path: &Path, index: usize, expected: (u32, u32)) -> Result<Frame, Box<dyn Error>> {
    let img = image::open(path)
        .map_err(|e| format!("failed to decode {}: {e}", path.display()))?
        .to_rgb8();
    if img.dimensions() != expected {
        return Err(format!(
            "{} is {}x{}, expected {}x{}",
            path.display(),
            img.width(),
            img.height(),
            expected.0,
            expected.1
        )
        .into());
    }
    Ok(Frame::from_rgb_image(img, index))
}

impl VideoReader for ImageSequenceReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn Error>> {
        let mut files: Vec<PathBuf> = fs::read_dir(path)
            .map_err(|e| format!("cannot read image directory {}: {e}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image_file(p))
            .collect();
        files.sort();

        let first = files
            .first()
            .ok_or_else(|| format!("no image files found in {}", path.display()))?;
        let (width, height) = image::image_dimensions(first)
            .map_err(|e| format!("failed to read {}: {e}", first.display()))?;

        log::info!(
            "Opened image sequence {} ({} images, {}x{})",
            path.display(),
            files.len(),
            width,
            height
        );

        let metadata = VideoMetadata {
            width,
            height,
            fps: 0.0,
            total_frames: files.len(),
            codec: String::new(),
            source_path: Some(path.to_path_buf()),
        };
        self.files = files;
        self.dimensions = Some((width, height));
        Ok(metadata)
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn Error>>> + '_> {
        let Some(expected) = self.dimensions else {
            return Box::new(std::iter::once(Err("ImageSequenceReader: not opened".into())));
        };
        Box::new(
            self.files
                .iter()
                .enumerate()
                .map(move |(index, path)| load_frame(path, index, expected)),
        )
    }

    fn close(&mut self) {
        self.files.clear();
        self.dimensions = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32, value: u8) {
        RgbImage::from_pixel(width, height, Rgb([value, value / 2, 255 - value]))
            .save(dir.join(name))
            .unwrap();
    }

    fn sequence(values: &[u8]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (i, v) in values.iter().enumerate() {
            write_image(dir.path(), &format!("img_{i:03}.png"), 24, 16, *v);
        }
        dir
    }

    #[test]
    fn test_open_returns_metadata() {
        let dir = sequence(&[10, 20, 30]);
        let mut reader = ImageSequenceReader::new();
        let meta = reader.open(dir.path()).unwrap();
        assert_eq!((meta.width, meta.height), (24, 16));
        assert_eq!(meta.total_frames, 3);
        assert_eq!(meta.fps, 0.0);
        assert_eq!(meta.source_path.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_frames_follow_file_name_order() {
        let dir = TempDir::new().unwrap();
        write_image(dir.path(), "b.png", 24, 16, 200);
        write_image(dir.path(), "a.png", 24, 16, 100);
        write_image(dir.path(), "c.png", 24, 16, 50);

        let mut reader = ImageSequenceReader::new();
        reader.open(dir.path()).unwrap();
        let frames: Vec<Frame> = reader.frames().map(|f| f.unwrap()).collect();

        let reds: Vec<u8> = frames.iter().map(|f| f.data()[0]).collect();
        assert_eq!(reds, vec![100, 200, 50]);
        let indices: Vec<usize> = frames.iter().map(|f| f.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(frames.iter().all(|f| f.channels() == 3));
    }

    #[test]
    fn test_non_image_files_are_skipped() {
        let dir = sequence(&[10, 20]);
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let mut reader = ImageSequenceReader::new();
        assert_eq!(reader.open(dir.path()).unwrap().total_frames, 2);
        assert_eq!(reader.frames().count(), 2);
    }

    #[test]
    fn test_empty_directory_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let mut reader = ImageSequenceReader::new();
        assert!(reader.open(dir.path()).is_err());
    }

    #[test]
    fn test_missing_directory_fails_to_open() {
        let mut reader = ImageSequenceReader::new();
        assert!(reader.open(Path::new("/nonexistent/frames")).is_err());
    }

    #[test]
    fn test_mismatched_dimensions_error_mid_stream() {
        let dir = sequence(&[10, 20]);
        write_image(dir.path(), "img_002.png", 12, 16, 30);

        let mut reader = ImageSequenceReader::new();
        reader.open(dir.path()).unwrap();
        let results: Vec<_> = reader.frames().collect();
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());
    }

    #[test]
    fn test_frames_without_open_returns_error() {
        let mut reader = ImageSequenceReader::new();
        assert!(reader.frames().next().unwrap().is_err());
    }

    #[test]
    fn test_close_idempotent() {
        let dir = sequence(&[10]);
        let mut reader = ImageSequenceReader::new();
        reader.open(dir.path()).unwrap();
        reader.close();
        reader.close();
        assert!(reader.frames().next().unwrap().is_err());
    }

    #[test]
    fn test_is_image_file_is_case_insensitive() {
        assert!(is_image_file(Path::new("a/B.PNG")));
        assert!(is_image_file(Path::new("x.jpeg")));
        assert!(!is_image_file(Path::new("clip.mp4")));
        assert!(!is_image_file(Path::new("noext")));
    }
}

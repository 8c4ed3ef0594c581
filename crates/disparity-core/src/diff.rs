//! Naive per-pixel differencing of two rasters.
//!
//! Each pixel is packed as a 32-bit ARGB integer and the two packed values are
//! subtracted. The absolute difference is unpacked again into channels, so a
//! borrow between neighbouring channels shows up in the result exactly as the
//! integer arithmetic produces it. The output triple is `[red, blue, blue]`:
//! green is never read from the difference. Only the first channel is stored
//! in the grayscale output.

use crate::error::Error;
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, Luma, RgbaImage};
use std::collections::HashSet;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Formats difference images are written in. Anything else is written as PNG.
const OUTPUT_FORMATS: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Bmp];

#[derive(Debug, Clone)]
pub struct DiffImage {
    /// Difference raster covering the overlap of both inputs.
    pub raster: GrayImage,
    pub different_pixels: u64,
    pub total_pixels: u64,
    pub percent_different: u8,
}

pub fn diff_images(reference: &DynamicImage, comparison: &DynamicImage, fuzziness: u32) -> DiffImage {
    let width = reference.width().min(comparison.width());
    let height = reference.height().min(comparison.height());

    let reference = reference.to_rgba8();
    let comparison = comparison.to_rgba8();
    let mut raster = GrayImage::new(width, height);
    let mut different_pixels = 0u64;

    for y in 0..height {
        for x in 0..width {
            let raw = packed_difference(&reference, &comparison, x, y);
            let channels = apply_fuzziness(unpack_channels(raw), fuzziness);
            if channels.iter().any(|&c| c > 0) {
                different_pixels += 1;
            }
            raster.put_pixel(x, y, Luma([channels[0]]));
        }
    }

    let total_pixels = u64::from(width) * u64::from(height);
    DiffImage {
        raster,
        different_pixels,
        total_pixels,
        percent_different: percent_of(different_pixels, total_pixels),
    }
}

/// `floor(100 * different / total)`, or 100 when there is nothing to count.
pub fn percent_of(different_pixels: u64, total_pixels: u64) -> u8 {
    if total_pixels == 0 {
        return 100;
    }
    // different <= total, so the quotient is at most 100
    ((100 * different_pixels) / total_pixels) as u8
}

fn pack_argb(image: &RgbaImage, x: u32, y: u32) -> i32 {
    let [r, g, b, a] = image.get_pixel(x, y).0;
    (u32::from(a) << 24 | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b)) as i32
}

fn packed_difference(reference: &RgbaImage, comparison: &RgbaImage, x: u32, y: u32) -> i32 {
    pack_argb(reference, x, y)
        .wrapping_sub(pack_argb(comparison, x, y))
        .wrapping_abs()
}

fn unpack_channels(raw: i32) -> [u8; 3] {
    let bits = raw as u32;
    let red = (bits >> 16) as u8;
    let blue = bits as u8;
    [red, blue, blue]
}

fn apply_fuzziness(channels: [u8; 3], fuzziness: u32) -> [u8; 3] {
    channels.map(|c| u32::from(c).saturating_sub(fuzziness) as u8)
}

/// Decode an image, rejecting files that decode to zero pixels. The format is
/// sniffed from the file contents, so the extension does not have to match.
pub fn decode_image(path: &Path) -> Result<DynamicImage, Error> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    if image.width() == 0 || image.height() == 0 {
        return Err(Error::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok(image)
}

/// Encoder for `path`, chosen from its extension.
pub fn output_format(path: &Path) -> ImageFormat {
    ImageFormat::from_path(path)
        .ok()
        .filter(|format| OUTPUT_FORMATS.contains(format))
        .unwrap_or(ImageFormat::Png)
}

/// Where the difference image for `relative_name` is written. Names without a
/// supported image extension get `.png` appended.
pub fn diff_output_path(diff_dir: &Path, relative_name: &str) -> PathBuf {
    let path = diff_dir.join(relative_name);
    let supported = ImageFormat::from_path(&path)
        .map(|format| OUTPUT_FORMATS.contains(&format))
        .unwrap_or(false);
    if supported {
        path
    } else {
        let mut name = path.clone().into_os_string();
        name.push(".png");
        PathBuf::from(name)
    }
}

/// Reserve `path` in `taken`, numbering it `name-1.ext`, `name-2.ext`, ... when
/// an earlier pair already claimed it.
pub fn unique_output_path(path: PathBuf, taken: &mut HashSet<PathBuf>) -> PathBuf {
    if taken.insert(path.clone()) {
        return path;
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());
    (1usize..)
        .map(|n| {
            let name = match &extension {
                Some(ext) => format!("{}-{}.{}", stem, n, ext),
                None => format!("{}-{}", stem, n),
            };
            path.with_file_name(name)
        })
        .find(|candidate| taken.insert(candidate.clone()))
        .unwrap_or(path)
}

/// Encode the raster in memory, write it next to `path` and move it into place.
/// A failed encode or write leaves neither a partial image nor the temp file.
pub fn encode_diff(raster: &GrayImage, path: &Path) -> Result<(), Error> {
    let mut buffer = Cursor::new(Vec::new());
    raster.write_to(&mut buffer, output_format(path))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let partial = partial_path(path);
    let written = fs::write(&partial, buffer.into_inner()).and_then(|()| fs::rename(&partial, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_ignores_green() {
        assert_eq!(unpack_channels(0x00_12_34_56), [0x12, 0x56, 0x56]);
    }

    #[test]
    fn test_fuzziness_saturates() {
        assert_eq!(apply_fuzziness([10, 3, 0], 5), [5, 0, 0]);
        assert_eq!(apply_fuzziness([255, 255, 255], 1000), [0, 0, 0]);
    }

    #[test]
    fn test_percent_floor_and_empty() {
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(2, 3), 66);
        assert_eq!(percent_of(0, 0), 100);
        assert_eq!(percent_of(5, 5), 100);
    }

    #[test]
    fn test_output_format_from_extension() {
        assert_eq!(output_format(Path::new("a.jpg")), ImageFormat::Jpeg);
        assert_eq!(output_format(Path::new("a.bmp")), ImageFormat::Bmp);
        assert_eq!(output_format(Path::new("a")), ImageFormat::Png);
        assert_eq!(output_format(Path::new("a.txt")), ImageFormat::Png);
    }

    #[test]
    fn test_diff_output_path() {
        let dir = Path::new("/out/diff");
        assert_eq!(diff_output_path(dir, "a.png"), PathBuf::from("/out/diff/a.png"));
        assert_eq!(diff_output_path(dir, "sub/b.JPG"), PathBuf::from("/out/diff/sub/b.JPG"));
        assert_eq!(diff_output_path(dir, "noext"), PathBuf::from("/out/diff/noext.png"));
        assert_eq!(diff_output_path(dir, "c.webp"), PathBuf::from("/out/diff/c.webp.png"));
    }

    #[test]
    fn test_unique_output_path_numbers_collisions() {
        let mut taken = HashSet::new();
        let first = unique_output_path(PathBuf::from("/out/diff/shot.png"), &mut taken);
        let second = unique_output_path(PathBuf::from("/out/diff/shot.png"), &mut taken);
        let third = unique_output_path(PathBuf::from("/out/diff/shot.png"), &mut taken);
        assert_eq!(first, PathBuf::from("/out/diff/shot.png"));
        assert_eq!(second, PathBuf::from("/out/diff/shot-1.png"));
        assert_eq!(third, PathBuf::from("/out/diff/shot-2.png"));

        // A later pair genuinely named shot-1.png moves on to the next free name.
        let real = unique_output_path(PathBuf::from("/out/diff/shot-1.png"), &mut taken);
        assert_eq!(real, PathBuf::from("/out/diff/shot-1-1.png"));
    }

    #[test]
    fn test_encode_diff_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let raster = GrayImage::from_pixel(2, 2, Luma([7]));

        let path = dir.path().join("a.png");
        encode_diff(&raster, &path).unwrap();
        assert!(path.is_file());
        assert!(!partial_path(&path).exists());

        // The rename cannot replace a non-empty directory, so the write fails.
        let blocked = dir.path().join("blocked.png");
        fs::create_dir_all(blocked.join("inside")).unwrap();
        assert!(encode_diff(&raster, &blocked).is_err());
        assert!(blocked.join("inside").is_dir());
        assert!(!partial_path(&blocked).exists());
    }
}

use anyhow::{bail, Context, Result};
use image::{ImageFormat, RgbImage};
use serde::Serialize;
use std::io::Cursor;
use std::sync::Arc;

const BYTES_PER_KB: f64 = 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFormat {
    Png,
    Jpeg,
}

impl AssetFormat {
    fn from_image_format(format: ImageFormat) -> Result<Self> {
        match format {
            ImageFormat::Png => Ok(AssetFormat::Png),
            ImageFormat::Jpeg => Ok(AssetFormat::Jpeg),
            other => bail!("unsupported image format {other:?}; upload a PNG or JPEG"),
        }
    }
}

/// An uploaded creative: decoded pixels plus the size of the original upload.
///
/// Pixels sit behind an `Arc` so blocking workers (OCR, contour scan) can
/// hold them without copying the grid.
#[derive(Debug, Clone)]
pub struct Asset {
    pixels: Arc<RgbImage>,
    byte_size: u64,
    format: AssetFormat,
}

impl Asset {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            bail!("uploaded file is empty");
        }
        let detected = image::guess_format(bytes).context("unrecognised image data")?;
        let format = AssetFormat::from_image_format(detected)?;
        let decoded = image::load_from_memory_with_format(bytes, detected)
            .with_context(|| format!("failed to decode {format:?} image"))?;

        Ok(Self {
            pixels: Arc::new(decoded.to_rgb8()),
            byte_size: bytes.len() as u64,
            format,
        })
    }

    /// Builds an asset from an already-decoded grid, reporting `byte_size` as
    /// the upload size.
    pub fn from_parts(pixels: RgbImage, byte_size: u64, format: AssetFormat) -> Self {
        Self {
            pixels: Arc::new(pixels),
            byte_size,
            format,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub fn size_kb(&self) -> f64 {
        self.byte_size as f64 / BYTES_PER_KB
    }

    pub fn format(&self) -> AssetFormat {
        self.format
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn shared_pixels(&self) -> Arc<RgbImage> {
        Arc::clone(&self.pixels)
    }

    /// Re-encodes the decoded grid as PNG for collaborators that take image files.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.pixels)
    }
}

pub fn encode_png(pixels: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    pixels
        .write_to(&mut buffer, ImageFormat::Png)
        .context("failed to encode PNG")?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn decodes_png_and_keeps_upload_size() {
        let pixels = RgbImage::from_pixel(12, 8, Rgb([10, 20, 30]));
        let bytes = encode_png(&pixels).unwrap();

        let asset = Asset::decode(&bytes).unwrap();
        assert_eq!((asset.width(), asset.height()), (12, 8));
        assert_eq!(asset.byte_size(), bytes.len() as u64);
        assert_eq!(asset.format(), AssetFormat::Png);
        assert_eq!(asset.pixels().get_pixel(3, 3), &Rgb([10, 20, 30]));
    }

    #[test]
    fn rejects_non_image_bytes() {
        assert!(Asset::decode(b"definitely not an image").is_err());
        assert!(Asset::decode(&[]).is_err());
    }

    #[test]
    fn rejects_formats_outside_png_and_jpeg() {
        let pixels = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let mut bmp = Cursor::new(Vec::new());
        pixels.write_to(&mut bmp, ImageFormat::Bmp).unwrap();

        let err = Asset::decode(bmp.get_ref()).unwrap_err();
        assert!(err.to_string().contains("unsupported image format"));
    }

    #[test]
    fn kilobytes_use_binary_units() {
        let asset = Asset::from_parts(RgbImage::new(1, 1), 2048, AssetFormat::Jpeg);
        assert_eq!(asset.size_kb(), 2.0);
    }
}

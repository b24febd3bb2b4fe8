use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, ImageError, ImageReader, Luma};
use std::io::Cursor;
use thiserror::Error;

/// Receipt photos are enlarged before OCR; dot-matrix glyphs such as `0`
/// drop out at native resolution.
pub const UPSCALE_FACTOR: u32 = 2;
/// Higher values wash out faint thermal-printer ink.
pub const CONTRAST_FACTOR: f32 = 1.5;

/// 3x3 sharpen kernel, normalised by `SHARPEN_SCALE`.
const SHARPEN_KERNEL: [i32; 9] = [-2, -2, -2, -2, 32, -2, -2, -2, -2];
const SHARPEN_SCALE: i32 = 16;

/// Largest accepted source width or height, before upscaling.
pub const MAX_SOURCE_SIDE: u32 = 10_000;
/// Largest accepted source pixel count, before upscaling. Lanczos resampling
/// holds a 16-byte-per-pixel intermediate, so this bounds memory per scan.
pub const MAX_SOURCE_PIXELS: u64 = 24_000_000;

// ITU-R BT.601 luma weights in 16.16 fixed point; they sum to 65536.
const LUMA_R: u32 = 19_595;
const LUMA_G: u32 = 38_470;
const LUMA_B: u32 = 7_471;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image too large: {width}x{height}")]
    TooLarge { width: u32, height: u32 },
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Grayscale image ready to hand to a recognizer.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    luma: GrayImage,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.luma.width()
    }

    pub fn height(&self) -> u32 {
        self.luma.height()
    }

    pub fn as_luma(&self) -> &GrayImage {
        &self.luma
    }

    /// Lossless PNG encoding, the interchange format for external engines.
    pub fn to_png(&self) -> Result<Vec<u8>, PreprocessError> {
        let mut buf = Vec::new();
        self.luma
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| PreprocessError::Encode(e.to_string()))?;
        Ok(buf)
    }
}

/// Decode raw JPEG / PNG bytes and normalize them.
///
/// Dimensions are read from the header first, so oversized images are
/// rejected before any pixel buffer is allocated.
pub fn normalize_bytes(data: &[u8]) -> Result<NormalizedImage, PreprocessError> {
    let (width, height) = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(ImageError::IoError)?
        .into_dimensions()?;
    check_dimensions(width, height)?;

    let img = image::load_from_memory(data)?;
    normalize(img)
}

/// Upscale → grayscale → contrast → sharpen. The order is fixed.
pub fn normalize(img: DynamicImage) -> Result<NormalizedImage, PreprocessError> {
    check_dimensions(img.width(), img.height())?;
    let upscaled = img.resize_exact(
        img.width() * UPSCALE_FACTOR,
        img.height() * UPSCALE_FACTOR,
        FilterType::Lanczos3,
    );
    let gray = to_gray(&upscaled);
    let contrasted = enhance_contrast(&gray, CONTRAST_FACTOR);
    Ok(NormalizedImage { luma: sharpen(&contrasted) })
}

pub fn check_dimensions(width: u32, height: u32) -> Result<(), PreprocessError> {
    let pixels = u64::from(width) * u64::from(height);
    if width > MAX_SOURCE_SIDE || height > MAX_SOURCE_SIDE || pixels > MAX_SOURCE_PIXELS {
        return Err(PreprocessError::TooLarge { width, height });
    }
    Ok(())
}

/// Grayscale with BT.601 weights, rounded to nearest. Alpha is discarded.
pub fn to_gray(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    ImageBuffer::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let l = (u32::from(r) * LUMA_R + u32::from(g) * LUMA_G + u32::from(b) * LUMA_B + 0x8000) >> 16;
        Luma([l as u8])
    })
}

/// Push every pixel away from the mean luminance by `factor`.
/// A factor of 1.0 is the identity; 0.0 yields a flat gray image.
pub fn enhance_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let count = u64::from(gray.width()) * u64::from(gray.height());
    if count == 0 {
        return gray.clone();
    }
    let sum: u64 = gray.pixels().map(|p| u64::from(p[0])).sum();
    let mean = (sum as f32 / count as f32).round();

    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0] as f32;
        let v = mean + factor * (p - mean);
        Luma([v.round().clamp(0.0, 255.0) as u8])
    })
}

/// Apply the sharpen kernel to interior pixels. Border pixels are copied
/// unchanged since they lack a full neighbourhood.
pub fn sharpen(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    ImageBuffer::from_fn(width, height, |x, y| {
        if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
            return *gray.get_pixel(x, y);
        }
        let mut acc = 0i32;
        for (i, weight) in SHARPEN_KERNEL.iter().enumerate() {
            let nx = x + (i as u32 % 3) - 1;
            let ny = y + (i as u32 / 3) - 1;
            acc += weight * i32::from(gray.get_pixel(nx, ny)[0]);
        }
        let v = (acc as f32 / SHARPEN_SCALE as f32).round();
        Luma([v.clamp(0.0, 255.0) as u8])
    })
}

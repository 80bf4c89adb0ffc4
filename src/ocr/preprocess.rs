use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};

/// Converts a capture to grayscale and upscales it by `scale`.
///
/// Club list text is small; Tesseract reads it far more reliably at 2x.
/// A scale of 0 or 1 leaves the size unchanged.
pub fn prepare_for_ocr(img: &DynamicImage, scale: u32) -> GrayImage {
    let gray = img.to_luma8();
    if scale <= 1 {
        return gray;
    }

    let (width, height) = gray.dimensions();
    image::imageops::resize(&gray, width * scale, height * scale, FilterType::CatmullRom)
}

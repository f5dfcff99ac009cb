//! Image preprocessing for OCR.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

use crate::models::OcrConfig;

/// 3x3 sharpening kernel.
const SHARPEN: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Strong 3x3 edge enhancement kernel.
const EDGE_ENHANCE_MORE: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0];

/// Enhances scanned drawings before recognition: grayscale, contrast
/// stretch, binarization, upscaling, then sharpening and edge enhancement.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    /// Gray level below which a pixel becomes black.
    threshold: u8,
    /// Integer upscale factor; 1 keeps the size.
    upscale_factor: u32,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self {
            threshold: 150,
            upscale_factor: 2,
        }
    }

    /// Create a preprocessor from OCR configuration.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new()
            .with_threshold(config.binarize_threshold)
            .with_upscale_factor(config.upscale_factor)
    }

    /// Set the binarization threshold.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the upscale factor.
    pub fn with_upscale_factor(mut self, factor: u32) -> Self {
        self.upscale_factor = factor.max(1);
        self
    }

    /// Run the full enhancement pipeline.
    pub fn process(&self, image: &DynamicImage) -> DynamicImage {
        let gray = stretch_contrast(&image.to_luma8());
        let binary = self.binarize(&gray);

        let (width, height) = binary.dimensions();
        let mut output = DynamicImage::ImageLuma8(binary);
        if self.upscale_factor > 1 {
            output = output.resize_exact(
                width * self.upscale_factor,
                height * self.upscale_factor,
                FilterType::Lanczos3,
            );
        }

        debug!(
            "Preprocessed {}x{} -> {}x{}",
            width,
            height,
            output.width(),
            output.height()
        );
        enhance_edges(&output)
    }

    fn binarize(&self, image: &GrayImage) -> GrayImage {
        let mut result = image.clone();
        for pixel in result.pixels_mut() {
            *pixel = Luma([if pixel[0] < self.threshold { 0 } else { 255 }]);
        }
        result
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Sharpen, then strengthen edges.
fn enhance_edges(image: &DynamicImage) -> DynamicImage {
    image.filter3x3(&SHARPEN).filter3x3(&EDGE_ENHANCE_MORE)
}

/// Map the darkest pixel to 0 and the brightest to 255.
fn stretch_contrast(image: &GrayImage) -> GrayImage {
    let (min, max) = image
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if max <= min {
        return image.clone();
    }

    let range = (max - min) as u32;
    let mut result = image.clone();
    for pixel in result.pixels_mut() {
        let value = (pixel[0] - min) as u32 * 255 / range;
        *pixel = Luma([value as u8]);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> DynamicImage {
        let mut image = GrayImage::new(4, 1);
        for (x, value) in [100u8, 120, 160, 180].into_iter().enumerate() {
            image.put_pixel(x as u32, 0, Luma([value]));
        }
        DynamicImage::ImageLuma8(image)
    }

    #[test]
    fn test_stretch_contrast() {
        let stretched = stretch_contrast(&gradient().to_luma8());
        let values: Vec<u8> = stretched.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![0, 63, 191, 255]);
    }

    #[test]
    fn test_binarize() {
        let preprocessor = ImagePreprocessor::new();
        let binary = preprocessor.binarize(&stretch_contrast(&gradient().to_luma8()));
        let values: Vec<u8> = binary.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_process_upscales() {
        let processed = ImagePreprocessor::new().process(&gradient());
        assert_eq!((processed.width(), processed.height()), (8, 2));
    }

    #[test]
    fn test_enhance_edges() {
        let mut image = GrayImage::new(6, 5);
        for (x, _, pixel) in image.enumerate_pixels_mut() {
            *pixel = Luma([if x < 3 { 100 } else { 150 }]);
        }

        let enhanced = enhance_edges(&DynamicImage::ImageLuma8(image)).to_luma8();
        assert!(enhanced.get_pixel(2, 2)[0] < 100);
        assert!(enhanced.get_pixel(3, 2)[0] > 150);
    }

    #[test]
    fn test_enhance_edges_keeps_flat_areas() {
        let flat = DynamicImage::ImageLuma8(GrayImage::from_pixel(5, 5, Luma([120])));
        assert_eq!(enhance_edges(&flat).to_luma8().get_pixel(2, 2)[0], 120);
    }

    #[test]
    fn test_from_config() {
        let config = OcrConfig {
            binarize_threshold: 90,
            upscale_factor: 0,
            ..OcrConfig::default()
        };
        let processed = ImagePreprocessor::from_config(&config).process(&gradient());
        assert_eq!(processed.width(), 4);
    }
}

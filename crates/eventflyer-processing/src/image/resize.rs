use eventflyer_core::models::{ImageDimensions, TargetBox};
use image::imageops::FilterType;

/// Image resize geometry
pub struct ImageResize;

impl ImageResize {
    /// Fit `source` inside `target` preserving aspect ratio.
    ///
    /// Never upscales: a source already within the box keeps its dimensions.
    /// Each computed side is rounded to nearest and clamped to `[1, box side]`.
    pub fn fit_inside(source: ImageDimensions, target: TargetBox) -> ImageDimensions {
        if source.width <= target.width && source.height <= target.height {
            return source;
        }

        let scale_width = target.width as f64 / source.width as f64;
        let scale_height = target.height as f64 / source.height as f64;
        let scale = scale_width.min(scale_height);

        let width = (source.width as f64 * scale).round() as u32;
        let height = (source.height as f64 * scale).round() as u32;

        ImageDimensions::new(
            width.clamp(1, target.width.max(1)),
            height.clamp(1, target.height.max(1)),
        )
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(source: ImageDimensions, resized: ImageDimensions) -> FilterType {
        let width_ratio = source.width as f32 / resized.width.max(1) as f32;
        let height_ratio = source.height as f32 / resized.height.max(1) as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            FilterType::Triangle
        } else if max_ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }
}

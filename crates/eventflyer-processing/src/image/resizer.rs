//! Image resizer - one re-encoded derivative per size profile

use bytes::Bytes;
use eventflyer_core::models::{ImageDimensions, ImageFormat, SizeProfile};
use image::{DynamicImage, GenericImageView, ImageError};

use super::resize::ImageResize;
use crate::compression;

/// An uploaded image whose format and dimensions have already been sniffed
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub data: Bytes,
    pub format: ImageFormat,
    pub dimensions: ImageDimensions,
}

/// Resized/re-encoded copy of an upload for one profile
#[derive(Debug, Clone)]
pub struct Derivative {
    pub size: String,
    pub bytes: Bytes,
    pub content_type: String,
    pub extension: String,
    pub dimensions: ImageDimensions,
    /// Set when resizing failed and `bytes` are the original upload
    pub degraded: bool,
}

pub struct ImageResizer;

impl ImageResizer {
    /// Produce the derivative for `profile`.
    ///
    /// Never fails: when decoding or encoding fails the original bytes are
    /// returned under the profile's name with the source content type.
    pub fn resize(source: &SourceImage, profile: &SizeProfile) -> Derivative {
        match Self::try_resize(source, profile) {
            Ok(derivative) => derivative,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    size = profile.name,
                    format = %source.format,
                    "Resize failed, storing original bytes"
                );
                Self::fallback(source, profile)
            }
        }
    }

    /// The original upload stored under the profile's name
    pub fn fallback(source: &SourceImage, profile: &SizeProfile) -> Derivative {
        Derivative {
            size: profile.name.to_string(),
            bytes: source.data.clone(),
            content_type: source.format.mime_type().to_string(),
            extension: source.format.extension().to_string(),
            dimensions: source.dimensions,
            degraded: true,
        }
    }

    fn try_resize(source: &SourceImage, profile: &SizeProfile) -> Result<Derivative, ImageError> {
        let img = image::load_from_memory_with_format(&source.data, codec_format(source.format))?;
        let (width, height) = img.dimensions();
        let decoded = ImageDimensions::new(width, height);

        let resized = match profile.target {
            Some(target) => {
                let fitted = ImageResize::fit_inside(decoded, target);
                if fitted == decoded {
                    img
                } else {
                    let filter = ImageResize::select_filter(decoded, fitted);
                    img.resize_exact(fitted.width, fitted.height, filter)
                }
            }
            None => img,
        };

        let dimensions = dimensions_of(&resized);
        let bytes = compression::encode(&resized, profile.output_format, profile.quality)?;

        Ok(Derivative {
            size: profile.name.to_string(),
            bytes,
            content_type: profile.output_format.content_type().to_string(),
            extension: profile.output_format.extension().to_string(),
            dimensions,
            degraded: false,
        })
    }
}

fn dimensions_of(img: &DynamicImage) -> ImageDimensions {
    let (width, height) = img.dimensions();
    ImageDimensions::new(width, height)
}

fn codec_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::WebP => image::ImageFormat::WebP,
        ImageFormat::Gif => image::ImageFormat::Gif,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventflyer_core::constants::SIZE_PROFILES;
    use eventflyer_core::models::{OutputFormat, TargetBox};
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    fn source(width: u32, height: u32, codec: image::ImageFormat, format: ImageFormat) -> SourceImage {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([10, 120, 200, 255]),
        ));
        let img = match codec {
            image::ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
            _ => img,
        };
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, codec).unwrap();
        SourceImage {
            data: Bytes::from(buf.into_inner()),
            format,
            dimensions: ImageDimensions::new(width, height),
        }
    }

    fn profile(name: &str) -> SizeProfile {
        *SIZE_PROFILES.iter().find(|p| p.name == name).unwrap()
    }

    #[test]
    fn test_resize_fits_box_and_reencodes_jpeg() {
        let src = source(1600, 800, image::ImageFormat::Png, ImageFormat::Png);
        let derivative = ImageResizer::resize(&src, &profile("medium"));

        assert_eq!(derivative.size, "medium");
        assert!(!derivative.degraded);
        assert_eq!(derivative.content_type, "image/jpeg");
        assert_eq!(derivative.extension, "jpg");
        assert_eq!(derivative.dimensions, ImageDimensions::new(600, 300));

        let decoded = image::load_from_memory(&derivative.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (600, 300));
    }

    #[test]
    fn test_resize_never_upscales() {
        let src = source(200, 150, image::ImageFormat::Jpeg, ImageFormat::Jpeg);
        let derivative = ImageResizer::resize(&src, &profile("large"));
        assert!(!derivative.degraded);
        assert_eq!(derivative.dimensions, ImageDimensions::new(200, 150));
    }

    #[test]
    fn test_original_profile_keeps_dimensions() {
        let src = source(900, 700, image::ImageFormat::Gif, ImageFormat::Gif);
        let derivative = ImageResizer::resize(&src, &profile("original"));
        assert!(!derivative.degraded);
        assert_eq!(derivative.dimensions, ImageDimensions::new(900, 700));
        assert_eq!(derivative.content_type, "image/jpeg");
    }

    #[test]
    fn test_undecodable_source_falls_back_to_original_bytes() {
        // Valid PNG header, garbage after it
        let mut data = source(10, 10, image::ImageFormat::Png, ImageFormat::Png)
            .data
            .to_vec();
        data.truncate(33);
        data.extend_from_slice(&[0xAB; 64]);

        let src = SourceImage {
            data: Bytes::from(data),
            format: ImageFormat::Png,
            dimensions: ImageDimensions::new(10, 10),
        };
        let derivative = ImageResizer::resize(&src, &profile("thumbnail"));

        assert!(derivative.degraded);
        assert_eq!(derivative.size, "thumbnail");
        assert_eq!(derivative.bytes, src.data);
        assert_eq!(derivative.content_type, "image/png");
        assert_eq!(derivative.extension, "png");
    }

    #[test]
    fn test_png_output_profile() {
        let src = source(400, 400, image::ImageFormat::Jpeg, ImageFormat::Jpeg);
        let png_profile = SizeProfile {
            name: "square",
            target: Some(TargetBox {
                width: 100,
                height: 100,
            }),
            quality: 80,
            output_format: OutputFormat::Png,
        };
        let derivative = ImageResizer::resize(&src, &png_profile);
        assert_eq!(derivative.content_type, "image/png");
        assert_eq!(derivative.dimensions, ImageDimensions::new(100, 100));
    }
}

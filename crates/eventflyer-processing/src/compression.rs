//! Derivative encoding

use bytes::Bytes;
use eventflyer_core::models::OutputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ImageResult, Rgb, RgbImage};

/// Encode `img` in `format`. `quality` (1-100) drives the JPEG quantizer and
/// picks the PNG compression effort.
pub fn encode(img: &DynamicImage, format: OutputFormat, quality: u8) -> ImageResult<Bytes> {
    let mut buf = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
            DynamicImage::ImageRgb8(flatten_alpha(img)).write_with_encoder(encoder)?;
        }
        OutputFormat::Png => {
            let compression = if quality >= 90 {
                CompressionType::Best
            } else {
                CompressionType::Default
            };
            let encoder = PngEncoder::new_with_quality(&mut buf, compression, PngFilter::Adaptive);
            img.write_with_encoder(encoder)?;
        }
    }

    Ok(Bytes::from(buf))
}

/// Composite transparent pixels onto white; JPEG has no alpha channel.
fn flatten_alpha(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    #[test]
    fn test_encode_jpeg_flattens_transparency_to_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0])));
        let encoded = encode(&img, OutputFormat::Jpeg, 90).unwrap();

        let decoded = image::load_from_memory(&encoded).unwrap();
        assert_eq!(decoded.dimensions(), (16, 16));
        let pixel = decoded.to_rgb8().get_pixel(8, 8).0;
        assert!(pixel.iter().all(|&c| c > 240), "pixel {:?}", pixel);
    }

    #[test]
    fn test_encode_png() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 128])));
        let encoded = encode(&img, OutputFormat::Png, 85).unwrap();
        assert!(encoded.starts_with(&[0x89, b'P', b'N', b'G']));
        let decoded = image::load_from_memory(&encoded).unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
    }

    #[test]
    fn test_lower_quality_jpeg_is_smaller() {
        let mut img = RgbaImage::new(64, 64);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgba([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, 255]);
        }
        let img = DynamicImage::ImageRgba8(img);

        let high = encode(&img, OutputFormat::Jpeg, 95).unwrap();
        let low = encode(&img, OutputFormat::Jpeg, 20).unwrap();
        assert!(low.len() < high.len());
    }
}

//! Image sniffer - format and pixel dimensions from raw header bytes
//!
//! Only the header bytes each format needs are read; nothing is decoded.
//! A result is either exact or an error, never a guess.

use eventflyer_core::models::{ImageDimensions, ImageFormat};

const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const GIF_SIGNATURE: &[u8] = b"GIF8";
const RIFF_SIGNATURE: &[u8] = b"RIFF";
const WEBP_TAG: &[u8] = b"WEBP";

const PNG_HEADER_LEN: usize = 24;
const GIF_HEADER_LEN: usize = 10;
const WEBP_CHUNK_TAG_END: usize = 16;
const VP8_HEADER_LEN: usize = 30;
const VP8L_HEADER_LEN: usize = 25;
const VP8X_HEADER_LEN: usize = 30;

const VP8_START_CODE: [u8; 3] = [0x9D, 0x01, 0x2A];
const VP8L_SIGNATURE: u8 = 0x2F;

/// Sniffing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SniffError {
    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Truncated {format} header: need {needed} bytes, have {available}")]
    Truncated {
        format: ImageFormat,
        needed: usize,
        available: usize,
    },

    #[error("Malformed {format} header: {reason}")]
    Malformed {
        format: ImageFormat,
        reason: &'static str,
    },
}

/// Determine the format and pixel dimensions of an encoded image.
pub fn sniff(data: &[u8]) -> Result<(ImageFormat, ImageDimensions), SniffError> {
    let format = detect_format(data)?;

    let dimensions = match format {
        ImageFormat::Jpeg => jpeg_dimensions(data)?,
        ImageFormat::Png => png_dimensions(data)?,
        ImageFormat::WebP => webp_dimensions(data)?,
        ImageFormat::Gif => gif_dimensions(data)?,
    };

    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(SniffError::Malformed {
            format,
            reason: "zero image dimension",
        });
    }

    Ok((format, dimensions))
}

fn detect_format(data: &[u8]) -> Result<ImageFormat, SniffError> {
    if data.is_empty() {
        return Err(SniffError::UnsupportedFormat);
    }

    let signatures = [
        (JPEG_SIGNATURE, ImageFormat::Jpeg),
        (PNG_SIGNATURE, ImageFormat::Png),
        (RIFF_SIGNATURE, ImageFormat::WebP),
        (GIF_SIGNATURE, ImageFormat::Gif),
    ];

    for (signature, format) in signatures {
        if data.starts_with(signature) {
            return Ok(format);
        }
        if data.len() < signature.len() && signature.starts_with(data) {
            return Err(truncated(format, signature.len(), data.len()));
        }
    }

    Err(SniffError::UnsupportedFormat)
}

fn truncated(format: ImageFormat, needed: usize, available: usize) -> SniffError {
    SniffError::Truncated {
        format,
        needed,
        available,
    }
}

fn require(data: &[u8], format: ImageFormat, needed: usize) -> Result<(), SniffError> {
    if data.len() < needed {
        return Err(truncated(format, needed, data.len()));
    }
    Ok(())
}

fn be16(data: &[u8], at: usize) -> u32 {
    u32::from(u16::from_be_bytes([data[at], data[at + 1]]))
}

fn le16(data: &[u8], at: usize) -> u32 {
    u32::from(u16::from_le_bytes([data[at], data[at + 1]]))
}

fn le24(data: &[u8], at: usize) -> u32 {
    u32::from(data[at]) | (u32::from(data[at + 1]) << 8) | (u32::from(data[at + 2]) << 16)
}

/// SOF0-SOF15, excluding DHT (C4), JPG (C8) and DAC (CC)
fn is_start_of_frame(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

/// Markers that carry no length field
fn is_standalone(marker: u8) -> bool {
    matches!(marker, 0x01 | 0xD0..=0xD7)
}

fn jpeg_dimensions(data: &[u8]) -> Result<ImageDimensions, SniffError> {
    let format = ImageFormat::Jpeg;
    let mut i = 2;

    loop {
        require(data, format, i + 1)?;
        if data[i] != 0xFF {
            return Err(SniffError::Malformed {
                format,
                reason: "expected segment marker",
            });
        }

        // Fill bytes: any number of 0xFF before the marker code
        while i < data.len() && data[i] == 0xFF {
            i += 1;
        }
        require(data, format, i + 1)?;

        let marker = data[i];
        i += 1;

        if is_standalone(marker) {
            continue;
        }

        match marker {
            0xD9 => {
                return Err(SniffError::Malformed {
                    format,
                    reason: "end of image before frame header",
                })
            }
            0xDA => {
                return Err(SniffError::Malformed {
                    format,
                    reason: "scan data before frame header",
                })
            }
            _ => {}
        }

        require(data, format, i + 2)?;
        let segment_len = be16(data, i) as usize;
        if segment_len < 2 {
            return Err(SniffError::Malformed {
                format,
                reason: "invalid segment length",
            });
        }

        if is_start_of_frame(marker) {
            // length(2) precision(1) height(2) width(2)
            if segment_len < 7 {
                return Err(SniffError::Malformed {
                    format,
                    reason: "frame header too short",
                });
            }
            require(data, format, i + 7)?;
            let height = be16(data, i + 3);
            let width = be16(data, i + 5);
            return Ok(ImageDimensions::new(width, height));
        }

        i += segment_len;
    }
}

fn png_dimensions(data: &[u8]) -> Result<ImageDimensions, SniffError> {
    let format = ImageFormat::Png;
    require(data, format, PNG_HEADER_LEN)?;

    if &data[12..16] != b"IHDR" {
        return Err(SniffError::Malformed {
            format,
            reason: "first chunk is not IHDR",
        });
    }

    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Ok(ImageDimensions::new(width, height))
}

fn gif_dimensions(data: &[u8]) -> Result<ImageDimensions, SniffError> {
    require(data, ImageFormat::Gif, GIF_HEADER_LEN)?;
    Ok(ImageDimensions::new(le16(data, 6), le16(data, 8)))
}

fn webp_dimensions(data: &[u8]) -> Result<ImageDimensions, SniffError> {
    let format = ImageFormat::WebP;
    require(data, format, 12)?;

    // A RIFF container holding something other than WebP
    if &data[8..12] != WEBP_TAG {
        return Err(SniffError::UnsupportedFormat);
    }

    require(data, format, WEBP_CHUNK_TAG_END)?;

    match &data[12..16] {
        b"VP8 " => {
            require(data, format, VP8_HEADER_LEN)?;
            if data[23..26] != VP8_START_CODE {
                return Err(SniffError::Malformed {
                    format,
                    reason: "missing VP8 start code",
                });
            }
            Ok(ImageDimensions::new(
                le16(data, 26) & 0x3FFF,
                le16(data, 28) & 0x3FFF,
            ))
        }
        b"VP8L" => {
            require(data, format, VP8L_HEADER_LEN)?;
            if data[20] != VP8L_SIGNATURE {
                return Err(SniffError::Malformed {
                    format,
                    reason: "missing VP8L signature",
                });
            }
            let b0 = u32::from(data[21]);
            let b1 = u32::from(data[22]);
            let b2 = u32::from(data[23]);
            let b3 = u32::from(data[24]);
            let width = 1 + (((b1 & 0x3F) << 8) | b0);
            let height = 1 + (((b3 & 0x0F) << 10) | (b2 << 2) | ((b1 & 0xC0) >> 6));
            Ok(ImageDimensions::new(width, height))
        }
        b"VP8X" => {
            require(data, format, VP8X_HEADER_LEN)?;
            Ok(ImageDimensions::new(1 + le24(data, 24), 1 + le24(data, 27)))
        }
        _ => Err(SniffError::UnsupportedFormat),
    }
}

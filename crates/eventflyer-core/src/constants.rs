//! Shared constants

use crate::models::{OutputFormat, SizeProfile, TargetBox};

/// Default upload byte limit, in MiB
pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 5;

/// Largest accepted `MAX_FILE_SIZE_MB`; uploads are buffered in memory
pub const MAX_FILE_SIZE_LIMIT_MB: usize = 1024;

/// Default maximum accepted width and height of an uploaded image
pub const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 1920;

/// Default timeout applied to each storage `put`
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 30;

/// MIME types accepted by the upload endpoint. `image/jpg` is a common alias of `image/jpeg`.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Profile whose URL becomes the event's flyer reference
pub const CANONICAL_PROFILE: &str = "medium";

/// Flyer derivatives produced for every upload
pub const SIZE_PROFILES: &[SizeProfile] = &[
    SizeProfile {
        name: "thumbnail",
        target: Some(TargetBox {
            width: 300,
            height: 300,
        }),
        quality: 85,
        output_format: OutputFormat::Jpeg,
    },
    SizeProfile {
        name: "medium",
        target: Some(TargetBox {
            width: 600,
            height: 600,
        }),
        quality: 85,
        output_format: OutputFormat::Jpeg,
    },
    SizeProfile {
        name: "large",
        target: Some(TargetBox {
            width: 1200,
            height: 1200,
        }),
        quality: 90,
        output_format: OutputFormat::Jpeg,
    },
    SizeProfile {
        name: "original",
        target: None,
        quality: 90,
        output_format: OutputFormat::Jpeg,
    },
];

/// Maximum length of a generated event slug
pub const MAX_SLUG_LENGTH: usize = 80;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_profile_is_configured() {
        assert!(SIZE_PROFILES.iter().any(|p| p.name == CANONICAL_PROFILE));
    }

    #[test]
    fn test_profile_qualities_in_range() {
        for profile in SIZE_PROFILES {
            assert!((1..=100).contains(&profile.quality), "{}", profile.name);
        }
    }
}

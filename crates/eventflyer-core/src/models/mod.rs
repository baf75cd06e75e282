pub mod event;
pub mod image;

pub use event::{CreateEventRequest, Event, EventChanges, NewEvent, UpdateEventRequest};
pub use image::{
    ImageDimensions, ImageFormat, OutputFormat, SizeProfile, StoredAsset, TargetBox,
    UploadOutcome, UploadResponse,
};

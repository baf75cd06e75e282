pub mod resize;
pub mod resizer;

pub use resize::ImageResize;
pub use resizer::{Derivative, ImageResizer, SourceImage};

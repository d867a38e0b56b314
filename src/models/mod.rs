//! Shared data records exchanged with downstream services.

pub mod lesson;

pub use lesson::{decode_images, encode_images, normalize_images, LessonImage};

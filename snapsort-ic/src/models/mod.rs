//! Request-scoped data models

pub mod uploaded_image;

pub use uploaded_image::{UploadedImage, FALLBACK_MEDIA_TYPE};

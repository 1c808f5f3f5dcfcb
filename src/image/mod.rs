//! Image generation use case.

pub mod service;

pub use service::{GeneratedImage, ImageClient, ImageError, ImageRequest, ImageService};

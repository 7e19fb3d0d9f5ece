//! Image processing for lazy-load previews, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Preview** | `resize_exact` (Lanczos3) + Gaussian `blur` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{
    GeneratedPreview, PreviewConfig, create_preview, get_dimensions, preview_file_name,
};
pub use params::{Blur, PreviewParams};
pub use rust_backend::RustBackend;

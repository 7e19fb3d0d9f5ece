//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how*. They are the interface
//! between [`operations`](super::operations), which decides what to create,
//! and the [`backend`](super::backend), which does the pixel work.

use std::path::PathBuf;

/// Gaussian blur strength (sigma). Negative and non-finite values become 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blur(f32);

impl Blur {
    pub fn new(sigma: f32) -> Self {
        if sigma.is_finite() && sigma > 0.0 {
            Self(sigma)
        } else {
            Self(0.0)
        }
    }

    pub fn sigma(self) -> f32 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0.0
    }
}

impl Default for Blur {
    fn default() -> Self {
        Self(8.0)
    }
}

/// Parameters for one preview: resize to exact dimensions, then blur.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub blur: Blur,
}

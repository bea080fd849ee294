// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors produced when creating, loading or saving a [`Surface`](crate::Surface).
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// A dimension is zero or the pixel count does not fit in memory.
    #[error("invalid surface size {width}x{height}")]
    InvalidSize {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The row stride is smaller than the width.
    #[error("stride {stride} is smaller than width {width}")]
    StrideTooSmall {
        /// Row stride in pixels.
        stride: usize,
        /// Width in pixels.
        width: u32,
    },
    /// The pixel buffer cannot hold `height` rows of `stride` pixels.
    #[error("buffer holds {len} pixels, {required} required")]
    BufferTooSmall {
        /// Length of the supplied buffer.
        len: usize,
        /// Minimum number of pixels.
        required: usize,
    },
    /// PNG decoding failed.
    #[cfg(feature = "png")]
    #[error("PNG decoding failed: {0}")]
    Png(#[from] png::DecodingError),
    /// PNG encoding failed.
    #[cfg(feature = "png")]
    #[error("PNG encoding failed: {0}")]
    PngEncode(#[from] png::EncodingError),
    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

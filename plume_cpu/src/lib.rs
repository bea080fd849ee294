// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate implements a CPU renderer that composites coverage spans into 32-bit
//! premultiplied ARGB surfaces.
//!
//! A [`Canvas`] owns a [`Surface`] and keeps a graphics state (paint, transform, stroke
//! style, fill rule, compositing operator, opacity and clip) together with a current path.
//! Paths are rasterized by [`plume_common`] and blended here.
//!
//! ```
//! use plume_cpu::{Canvas, Surface};
//! use plume_cpu::color::Color;
//!
//! let mut canvas = Canvas::new(Surface::new(16, 16).unwrap());
//! canvas.set_color(Color::from_rgba8(255, 0, 0, 255));
//! canvas.fill_rect(4.0, 4.0, 8.0, 8.0);
//! assert_eq!(canvas.surface().pixel(8, 8), Some(0xFFFF_0000));
//! ```
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![expect(
    clippy::cast_possible_truncation,
    reason = "Pixel coordinates and channel values are range-checked before narrowing."
)]

mod blend;
mod canvas;
mod error;
pub mod paint;
mod surface;

pub use blend::COLOR_TABLE_SIZE;
pub use canvas::Canvas;
pub use error::SurfaceError;
pub use paint::{Gradient, GradientKind, GradientStop, Paint, Texture, TextureKind};
pub use plume_common::{color, kurbo, peniko};
pub use surface::{argb_to_rgba, convert_argb_to_rgba, convert_rgba_to_argb, rgba_to_argb, Surface};

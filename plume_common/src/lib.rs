// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate includes the geometry and coverage machinery shared by the Plume renderers.
//!
//! # Usage
//!
//! Most users want [Plume CPU][plume_cpu], which composites the spans produced here into
//! pixel surfaces, or [Plume SVG][plume_svg], which renders SVG documents.
//!
//! # Contents
//!
//! - A [`Path`][crate::path::Path] model with builders, shapes and SVG path-data parsing
//! - Adaptive Bézier [flattening](crate::flatten) and [dashing](crate::dash)
//! - A fixed-point [stroker](crate::stroke) producing fillable outlines
//! - An exact-area cell [rasterizer](crate::raster) producing [span buffers](crate::span)
//! - CSS [color](crate::color) and SVG [transform](crate::transform) parsing
//!
//! [plume_cpu]: https://crates.io/crates/plume_cpu
//! [plume_svg]: https://crates.io/crates/plume_svg
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
    reason = "Fixed-point conversions truncate by construction."
)]

pub mod color;
pub mod dash;
mod error;
pub mod flatten;
pub mod math;
pub mod parse;
pub mod path;
mod path_data;
pub mod raster;
pub mod rasterize;
pub mod span;
pub mod stroke;
pub mod transform;

pub use error::ParseError;
pub use peniko;
pub use peniko::kurbo;

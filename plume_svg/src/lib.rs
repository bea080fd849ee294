// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate renders a practical subset of SVG with the Plume CPU canvas.
//!
//! Documents are parsed into an arena of the elements the renderer understands (`svg`,
//! `g`, `defs`, `use`, `symbol`, basic shapes, `path`, gradients and `clipPath`); any other
//! element is skipped along with its content. Presentation attributes and `style`
//! declarations are both honored.
//!
//! ```
//! use plume_svg::Document;
//! use plume_cpu::color::Color;
//!
//! let svg = br##"<svg width="100" height="100">
//!   <rect x="10" y="10" width="80" height="80" fill="#ff0000"/>
//! </svg>"##;
//! let document = Document::load_from_data(svg, None, None).unwrap();
//! let surface = document
//!     .render_to_surface(None, None, None, Color::BLACK, None)
//!     .unwrap();
//! assert_eq!(surface.pixel(50, 50), Some(0xFFFF_0000));
//! assert_eq!(surface.pixel(1, 1), Some(0));
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
    reason = "Surface sizes and opacities are clamped before narrowing."
)]

mod document;
mod error;
mod parser;
mod render;
mod style;
mod tree;

pub use document::{Document, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use error::Error;
pub use render::{Palette, MAX_GRADIENT_CHAIN};

// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning user-space paths into device-space coverage.

use crate::kurbo::{Affine, Rect, Stroke};
use crate::path::Path;
use crate::peniko::Fill;
use crate::raster::Rasterizer;
use crate::span::SpanBuffer;
use crate::stroke;

/// Rasterize the interior of `path` drawn under `transform`.
pub fn fill(
    rasterizer: &mut Rasterizer,
    path: &Path,
    transform: &Affine,
    fill_rule: Fill,
    clip: Option<Rect>,
    out: &mut SpanBuffer,
) {
    let iter = path.iter().map(|el| *transform * el);
    rasterizer.render(iter, fill_rule, clip, out);
}

/// Rasterize the stroke of `path` drawn under `transform`.
///
/// Dashing happens in user space, before the outline is expanded in device space.
pub fn stroke(
    rasterizer: &mut Rasterizer,
    path: &Path,
    transform: &Affine,
    style: &Stroke,
    clip: Option<Rect>,
    out: &mut SpanBuffer,
) {
    let outline = if style.dash_pattern.is_empty() {
        stroke::stroke(path.iter(), style, transform)
    } else {
        let dashed = path.clone_dashed(style.dash_offset, &style.dash_pattern);
        stroke::stroke(dashed.iter(), style, transform)
    };
    rasterizer.render(outline.iter(), Fill::NonZero, clip, out);
}

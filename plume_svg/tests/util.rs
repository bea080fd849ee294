// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions shared across different tests.

use plume_cpu::color::Color;
use plume_cpu::Surface;
use plume_svg::Document;

pub(crate) const RED: u32 = 0xFFFF_0000;
pub(crate) const GREEN: u32 = 0xFF00_FF00;
pub(crate) const BLUE: u32 = 0xFF00_00FF;

pub(crate) fn blue() -> Color {
    Color::from_rgba8(0, 0, 255, 255)
}

pub(crate) fn load(svg: &str) -> Document {
    Document::load_from_data(svg.as_bytes(), None, None).unwrap()
}

/// Render a whole document at its natural size.
pub(crate) fn render(svg: &str) -> Surface {
    load(svg)
        .render_to_surface(None, None, None, Color::BLACK, None)
        .unwrap()
}

pub(crate) fn pixel(surface: &Surface, x: u32, y: u32) -> u32 {
    surface.pixel(x, y).unwrap()
}

/// Split a premultiplied pixel into `[a, r, g, b]`.
pub(crate) fn channels(pixel: u32) -> [u8; 4] {
    pixel.to_be_bytes()
}

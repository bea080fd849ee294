// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions shared across different tests.

use plume_cpu::color::Color;
use plume_cpu::{Canvas, Surface};

pub(crate) const RED: u32 = 0xFFFF_0000;
pub(crate) const BLUE: u32 = 0xFF00_00FF;

pub(crate) fn red() -> Color {
    Color::from_rgba8(255, 0, 0, 255)
}

pub(crate) fn blue() -> Color {
    Color::from_rgba8(0, 0, 255, 255)
}

pub(crate) fn get_canvas(width: u32, height: u32) -> Canvas {
    Canvas::new(Surface::new(width, height).unwrap())
}

pub(crate) fn pixel(canvas: &Canvas, x: u32, y: u32) -> u32 {
    canvas.surface().pixel(x, y).unwrap()
}

pub(crate) fn alpha(pixel: u32) -> u8 {
    (pixel >> 24) as u8
}

/// Split a premultiplied pixel into `[a, r, g, b]`.
pub(crate) fn channels(pixel: u32) -> [u8; 4] {
    pixel.to_be_bytes()
}

/// The number of pixels with any coverage at all.
pub(crate) fn painted_pixels(canvas: &Canvas) -> usize {
    let surface = canvas.surface();
    (0..surface.height())
        .flat_map(|y| surface.row(y).iter())
        .filter(|p| alpha(**p) != 0)
        .count()
}

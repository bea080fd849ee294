// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for surfaces and pixel conversion.

use crate::util::{get_canvas, red, RED};
use plume_cpu::color::Color;
use plume_cpu::{argb_to_rgba, convert_argb_to_rgba, convert_rgba_to_argb, rgba_to_argb};
use plume_cpu::{Surface, SurfaceError};

#[test]
fn surface_invalid_sizes() {
    assert!(matches!(
        Surface::new(0, 10),
        Err(SurfaceError::InvalidSize { .. })
    ));
    assert!(matches!(
        Surface::from_data(vec![0; 8], 4, 2, 3),
        Err(SurfaceError::StrideTooSmall { .. })
    ));
    assert!(matches!(
        Surface::from_data(vec![0; 8], 4, 3, 4),
        Err(SurfaceError::BufferTooSmall { required: 12, .. })
    ));
}

#[test]
fn surface_stride_padding_untouched() {
    let data = vec![0xDEAD_BEEF; 6 * 3];
    let surface = Surface::from_data(data, 4, 3, 6).unwrap();
    let mut canvas = plume_cpu::Canvas::new(surface);
    canvas.set_color(red());
    canvas.paint();
    let surface = canvas.into_surface();

    assert_eq!(surface.row(1), &[RED; 4]);
    assert_eq!(surface.data()[4], 0xDEAD_BEEF);
    assert_eq!(surface.data()[11], 0xDEAD_BEEF);
    assert_eq!(surface.pixel(4, 0), None);
}

#[test]
fn surface_clear() {
    let mut surface = Surface::new(3, 3).unwrap();
    surface.clear(Color::from_rgba8(255, 0, 0, 128));
    assert!(surface.data().iter().all(|&p| p == 0x8080_0000));
}

#[test]
fn pixel_conversions() {
    assert_eq!(argb_to_rgba(0x8080_0000), [255, 0, 0, 128]);
    assert_eq!(argb_to_rgba(0), [0, 0, 0, 0]);
    assert_eq!(rgba_to_argb([255, 0, 0, 128]), 0x8080_0000);
    assert_eq!(rgba_to_argb([10, 20, 30, 255]), 0xFF0A_141E);

    let mut pixels = [0xFF0A_141E, 0x8080_0000];
    convert_argb_to_rgba(&mut pixels);
    assert_eq!(pixels[0].to_ne_bytes(), [10, 20, 30, 255]);
    convert_rgba_to_argb(&mut pixels);
    assert_eq!(pixels, [0xFF0A_141E, 0x8080_0000]);
}

#[test]
fn rgba8_round_trip() {
    let mut canvas = get_canvas(5, 5);
    canvas.set_color(red());
    canvas.fill_rect(1.0, 1.0, 3.0, 3.0);
    let surface = canvas.into_surface();
    let rgba = surface.to_rgba8_unpremultiplied();
    assert_eq!(rgba.len(), 5 * 5 * 4);
    assert_eq!(&rgba[(2 * 5 + 2) * 4..][..4], &[255, 0, 0, 255]);
    let back = Surface::from_rgba8_unpremultiplied(&rgba, 5, 5).unwrap();
    assert_eq!(back, surface);
}

#[cfg(feature = "png")]
#[test]
fn png_round_trip() {
    let mut canvas = get_canvas(8, 4);
    canvas.set_color(Color::from_rgba8(0, 128, 255, 255));
    canvas.fill_rect(0.0, 0.0, 4.0, 4.0);
    let surface = canvas.into_surface();

    let mut encoded = Vec::new();
    surface.write_to_png(&mut encoded).unwrap();
    let decoded = Surface::from_png(encoded.as_slice()).unwrap();
    assert_eq!(decoded, surface);
}

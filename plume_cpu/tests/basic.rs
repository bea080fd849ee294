// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for basic filling and state handling.

use crate::util::{alpha, blue, get_canvas, painted_pixels, pixel, red, BLUE, RED};
use plume_cpu::kurbo::{Affine, Point, Rect};
use plume_cpu::peniko::Fill;

#[test]
fn fill_rect_aligned() {
    let mut canvas = get_canvas(100, 100);
    canvas.set_color(red());
    canvas.fill_rect(10.0, 10.0, 80.0, 80.0);

    assert_eq!(pixel(&canvas, 50, 50), RED);
    assert_eq!(pixel(&canvas, 10, 10), RED);
    assert_eq!(pixel(&canvas, 89, 89), RED);
    assert_eq!(pixel(&canvas, 1, 1), 0);
    assert_eq!(pixel(&canvas, 90, 50), 0);
    assert_eq!(painted_pixels(&canvas), 80 * 80);
}

#[test]
fn fill_half_pixel_edge() {
    let mut canvas = get_canvas(10, 10);
    canvas.set_color(red());
    canvas.fill_rect(2.5, 0.0, 5.0, 10.0);

    assert_eq!(alpha(pixel(&canvas, 2, 5)), 128);
    assert_eq!(pixel(&canvas, 4, 5), RED);
    assert_eq!(alpha(pixel(&canvas, 7, 5)), 128);
    assert_eq!(pixel(&canvas, 8, 5), 0);
}

#[test]
fn fill_consumes_path_preserve_keeps_it() {
    let mut canvas = get_canvas(20, 20);
    canvas.rect(0.0, 0.0, 5.0, 5.0);
    canvas.fill_preserve();
    assert!(!canvas.path().is_empty());
    canvas.fill();
    assert!(canvas.path().is_empty());
    assert_eq!(canvas.current_point(), None);
}

#[test]
fn fill_rect_keeps_current_path() {
    let mut canvas = get_canvas(20, 20);
    canvas.move_to(1.0, 1.0);
    canvas.line_to(5.0, 1.0);
    canvas.fill_rect(0.0, 0.0, 2.0, 2.0);
    assert_eq!(canvas.current_point(), Some(Point::new(5.0, 1.0)));
}

#[test]
fn fill_rule_even_odd_hole() {
    let mut canvas = get_canvas(30, 30);
    canvas.set_color(blue());
    canvas.rect(0.0, 0.0, 30.0, 30.0);
    canvas.rect(10.0, 10.0, 10.0, 10.0);
    canvas.set_fill_rule(Fill::EvenOdd);
    canvas.fill();

    assert_eq!(pixel(&canvas, 5, 5), BLUE);
    assert_eq!(pixel(&canvas, 15, 15), 0);
}

#[test]
fn transform_applies_to_paths() {
    let mut canvas = get_canvas(40, 40);
    canvas.set_color(red());
    canvas.translate(10.0, 10.0);
    canvas.scale(2.0, 2.0);
    canvas.fill_rect(0.0, 0.0, 5.0, 5.0);

    assert_eq!(pixel(&canvas, 10, 10), RED);
    assert_eq!(pixel(&canvas, 19, 19), RED);
    assert_eq!(pixel(&canvas, 20, 20), 0);
    assert_eq!(pixel(&canvas, 9, 9), 0);
    assert_eq!(
        canvas.map_rect(Rect::new(0.0, 0.0, 5.0, 5.0)),
        Rect::new(10.0, 10.0, 20.0, 20.0)
    );
}

#[test]
fn save_restore_state() {
    let mut canvas = get_canvas(10, 10);
    canvas.set_opacity(0.5);
    canvas.save();
    canvas.set_opacity(1.0);
    canvas.translate(3.0, 0.0);
    canvas.set_fill_rule(Fill::EvenOdd);
    canvas.restore();

    assert_eq!(canvas.opacity(), 0.5);
    assert_eq!(canvas.matrix(), Affine::IDENTITY);
    assert_eq!(canvas.fill_rule(), Fill::NonZero);
    // Unbalanced restores leave the state alone.
    canvas.restore();
    assert_eq!(canvas.opacity(), 0.5);
}

#[test]
fn opacity_scales_alpha() {
    let mut canvas = get_canvas(4, 4);
    canvas.set_color(red());
    canvas.set_opacity(0.5);
    canvas.fill_rect(0.0, 0.0, 4.0, 4.0);
    assert_eq!(pixel(&canvas, 1, 1), 0x8080_0000);
}

#[test]
fn nan_path_draws_nothing() {
    let mut canvas = get_canvas(10, 10);
    canvas.set_color(red());
    canvas.move_to(0.0, 0.0);
    canvas.line_to(f64::NAN, 5.0);
    canvas.line_to(5.0, 5.0);
    canvas.fill();
    assert_eq!(painted_pixels(&canvas), 0);
}

#[test]
fn paint_fills_surface() {
    let mut canvas = get_canvas(8, 8);
    canvas.set_color(blue());
    canvas.paint();
    assert_eq!(painted_pixels(&canvas), 64);
}

#[test]
fn extents_in_device_space() {
    let mut canvas = get_canvas(100, 100);
    canvas.scale(2.0, 2.0);
    canvas.rect(5.0, 5.0, 10.0, 10.0);
    assert_eq!(canvas.fill_extents(), Rect::new(10.0, 10.0, 30.0, 30.0));

    canvas.set_line_width(2.0);
    canvas.set_line_join(plume_cpu::kurbo::Join::Bevel);
    assert_eq!(canvas.stroke_extents(), Rect::new(8.0, 8.0, 32.0, 32.0));
    assert_eq!(canvas.clip_extents(), Rect::new(0.0, 0.0, 100.0, 100.0));
}

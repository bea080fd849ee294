// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for gradient paints.

use crate::util::{channels, get_canvas, pixel};
use plume_cpu::color::Color;
use plume_cpu::kurbo::Affine;
use plume_cpu::peniko::Extend;
use plume_cpu::{Canvas, Gradient, GradientStop};

fn white_to_black() -> [GradientStop; 2] {
    [
        GradientStop {
            offset: 0.0,
            color: Color::WHITE,
        },
        GradientStop {
            offset: 1.0,
            color: Color::BLACK,
        },
    ]
}

fn red_channel(canvas: &Canvas, x: u32, y: u32) -> u8 {
    channels(pixel(canvas, x, y))[1]
}

fn assert_close(canvas: &Canvas, a: u32, b: u32) {
    let (ra, rb) = (red_channel(canvas, a, 0), red_channel(canvas, b, 0));
    assert!(ra.abs_diff(rb) <= 2, "x={a}: {ra}, x={b}: {rb}");
}

#[test]
fn gradient_radial_center_is_lighter() {
    let mut canvas = get_canvas(100, 100);
    canvas.set_radial_gradient(
        (50.0, 50.0, 40.0),
        (50.0, 50.0, 0.0),
        Extend::Pad,
        &white_to_black(),
        Affine::IDENTITY,
    );
    canvas.fill_rect(0.0, 0.0, 100.0, 100.0);

    let center = red_channel(&canvas, 50, 50);
    let edge = red_channel(&canvas, 88, 50);
    assert!(center > 240, "{center}");
    assert!(edge < 20, "{edge}");
    assert!(center > edge);
    // Padding keeps the outer color beyond the radius.
    assert_eq!(channels(pixel(&canvas, 99, 99))[0], 255);
    assert!(red_channel(&canvas, 99, 99) <= 1);
}

#[test]
fn gradient_linear_is_monotonic() {
    let mut canvas = get_canvas(100, 4);
    canvas.set_linear_gradient(
        (0.0, 0.0),
        (100.0, 0.0),
        Extend::Pad,
        &white_to_black(),
        Affine::IDENTITY,
    );
    canvas.paint();

    let reds: Vec<u8> = (0..100).map(|x| red_channel(&canvas, x, 2)).collect();
    assert!(reds.windows(2).all(|w| w[0] >= w[1]));
    assert!(reds[0] > 250);
    assert!(reds[99] < 5);
    assert!((120..=135).contains(&reds[50]), "{}", reds[50]);
}

#[test]
fn gradient_linear_repeat_and_reflect() {
    let stops = white_to_black();
    let mut repeat = get_canvas(40, 1);
    repeat.set_linear_gradient(
        (0.0, 0.0),
        (10.0, 0.0),
        Extend::Repeat,
        &stops,
        Affine::IDENTITY,
    );
    repeat.paint();
    assert_close(&repeat, 2, 12);
    assert_close(&repeat, 7, 27);
    assert!(red_channel(&repeat, 10, 0) > 240);

    let mut reflect = get_canvas(40, 1);
    reflect.set_linear_gradient(
        (0.0, 0.0),
        (10.0, 0.0),
        Extend::Reflect,
        &stops,
        Affine::IDENTITY,
    );
    reflect.paint();
    // Mirrored around x = 10.
    assert_close(&reflect, 2, 17);
    assert!(red_channel(&reflect, 10, 0) < 40);
}

#[test]
fn gradient_transform_moves_geometry() {
    let mut canvas = get_canvas(100, 1);
    let gradient = Gradient::new_linear(0.0, 0.0, 50.0, 0.0)
        .with_transform(Affine::translate((50.0, 0.0)))
        .with_stops([(0.0, Color::WHITE), (1.0, Color::BLACK)]);
    canvas.set_paint(gradient);
    canvas.paint();
    assert_eq!(pixel(&canvas, 10, 0), 0xFFFF_FFFF);
    assert!(red_channel(&canvas, 75, 0) < 140);
}

#[test]
fn gradient_without_stops_paints_nothing() {
    let mut canvas = get_canvas(10, 10);
    canvas.set_paint(Gradient::new_linear(0.0, 0.0, 10.0, 0.0));
    canvas.paint();
    assert_eq!(pixel(&canvas, 5, 5), 0);
}

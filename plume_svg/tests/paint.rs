// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gradients, `currentColor` and palette variables.

use plume_cpu::color::Color;
use plume_svg::MAX_GRADIENT_CHAIN;

use crate::util::{blue, channels, load, pixel, render, BLUE, GREEN, RED};

const SQUARE: &str = r#"<rect width="10" height="10" fill="currentColor"/>"#;

fn wrap(body: &str) -> String {
    format!(r#"<svg width="10" height="10">{body}</svg>"#)
}

#[test]
fn radial_gradient_center_is_lighter() {
    let surface = render(
        r#"<svg width="100" height="100">
          <defs>
            <radialGradient id="g">
              <stop offset="0" stop-color="white"/>
              <stop offset="1" stop-color="black"/>
            </radialGradient>
          </defs>
          <rect width="100" height="100" fill="url(#g)"/>
        </svg>"#,
    );
    let [a, center, _, _] = channels(pixel(&surface, 50, 50));
    let [_, near_edge, _, _] = channels(pixel(&surface, 50, 95));
    let [_, corner, _, _] = channels(pixel(&surface, 1, 1));
    assert_eq!(a, 255);
    assert!(center > 245, "center {center}");
    assert!(near_edge < 40, "edge {near_edge}");
    assert!(corner <= 2, "padded corner {corner}");
}

#[test]
fn linear_gradient_through_href() {
    let surface = render(
        r##"<svg width="100" height="10">
          <linearGradient id="base">
            <stop offset="0" stop-color="#ff0000"/>
            <stop offset="100%" stop-color="#0000ff"/>
          </linearGradient>
          <linearGradient id="g" xlink:href="#base" gradientUnits="userSpaceOnUse"
                          x1="0" y1="0" x2="100" y2="0"/>
          <rect width="100" height="10" fill="url(#g)"/>
        </svg>"##,
    );
    let [_, r0, _, b0] = channels(pixel(&surface, 0, 5));
    let [_, r1, _, b1] = channels(pixel(&surface, 99, 5));
    let [_, rm, _, bm] = channels(pixel(&surface, 50, 5));
    assert!(r0 > 245 && b0 < 10);
    assert!(r1 < 10 && b1 > 245);
    assert!((100..156).contains(&rm) && (100..156).contains(&bm));
}

#[test]
fn gradient_transform_and_spread() {
    // A horizontal gradient rotated to run top to bottom over the upper half only.
    let surface = render(
        r##"<svg width="10" height="100">
          <linearGradient id="g" gradientTransform="rotate(90) scale(0.5)" spreadMethod="reflect">
            <stop offset="0" stop-color="#ff0000"/>
            <stop offset="1" stop-color="#0000ff"/>
          </linearGradient>
          <rect width="10" height="100" fill="url(#g)"/>
        </svg>"##,
    );
    let [_, r_top, _, _] = channels(pixel(&surface, 5, 0));
    let [_, _, _, b_mid] = channels(pixel(&surface, 5, 49));
    let [_, r_bottom, _, _] = channels(pixel(&surface, 5, 99));
    assert!(r_top > 240);
    assert!(b_mid > 240);
    assert!(r_bottom > 240, "reflected back to red, got {r_bottom}");
}

#[test]
fn single_stop_is_solid() {
    let surface = render(&wrap(
        r##"<linearGradient id="g"><stop stop-color="#00ff00"/></linearGradient>
            <rect width="10" height="10" fill="url(#g)"/>"##,
    ));
    assert_eq!(pixel(&surface, 5, 5), GREEN);
}

#[test]
fn stop_opacity() {
    let surface = render(&wrap(
        r#"<linearGradient id="g"><stop stop-color="red" stop-opacity="0.5"/></linearGradient>
           <rect width="10" height="10" fill="url(#g)"/>"#,
    ));
    let [a, r, g, b] = channels(pixel(&surface, 5, 5));
    assert!((127..=129).contains(&a));
    assert_eq!((r, g, b), (a, 0, 0));
}

#[test]
fn gradient_without_stops_paints_nothing() {
    let surface = render(&wrap(
        r#"<linearGradient id="g"/><rect width="10" height="10" fill="url(#g)"/>"#,
    ));
    assert_eq!(pixel(&surface, 5, 5), 0);
}

#[test]
fn missing_reference_uses_fallback() {
    let surface = render(&wrap(
        r#"<rect width="5" height="10" fill="url(#missing) blue"/>
           <rect x="5" width="5" height="10" fill="url(#missing)"/>"#,
    ));
    assert_eq!(pixel(&surface, 2, 5), BLUE);
    assert_eq!(pixel(&surface, 7, 5), 0);
}

#[test]
fn cyclic_gradient_references_terminate() {
    let surface = render(&wrap(
        r##"<linearGradient id="a" href="#b"/>
            <linearGradient id="b" href="#a"/>
            <rect width="10" height="10" fill="url(#a)"/>"##,
    ));
    assert_eq!(pixel(&surface, 5, 5), 0);
}

/// A chain of `len` gradients where only the last one has stops.
fn gradient_chain(len: usize) -> String {
    let mut body = String::new();
    for i in 0..len - 1 {
        body.push_str(&format!(
            r##"<linearGradient id="g{i}" href="#g{}"/>"##,
            i + 1
        ));
    }
    body.push_str(&format!(
        r##"<linearGradient id="g{}"><stop stop-color="#00ff00"/></linearGradient>"##,
        len - 1
    ));
    body.push_str(r#"<rect width="10" height="10" fill="url(#g0)"/>"#);
    wrap(&body)
}

#[test]
fn gradient_chain_is_bounded() {
    let within = render(&gradient_chain(MAX_GRADIENT_CHAIN));
    assert_eq!(pixel(&within, 5, 5), GREEN);
    let beyond = render(&gradient_chain(MAX_GRADIENT_CHAIN + 1));
    assert_eq!(pixel(&beyond, 5, 5), 0);
}

#[test]
fn current_color_comes_from_the_caller() {
    let surface = load(&wrap(SQUARE))
        .render_to_surface(None, None, None, blue(), None)
        .unwrap();
    assert_eq!(pixel(&surface, 5, 5), BLUE);
}

#[test]
fn color_property_overrides_current_color() {
    let document = load(&wrap(&format!(r#"<g color="red">{SQUARE}</g>"#)));
    let surface = document
        .render_to_surface(None, None, None, blue(), None)
        .unwrap();
    assert_eq!(pixel(&surface, 5, 5), RED);
}

#[test]
fn current_color_in_stops() {
    let document = load(&wrap(
        r#"<linearGradient id="g" color="red"><stop stop-color="currentColor"/></linearGradient>
           <rect width="10" height="10" fill="url(#g)"/>"#,
    ));
    let surface = document
        .render_to_surface(None, None, None, blue(), None)
        .unwrap();
    assert_eq!(pixel(&surface, 5, 5), RED);
}

#[test]
fn palette_variables() {
    let document = load(&wrap(
        r#"<rect width="5" height="10" fill="var(--accent)"/>
           <rect x="5" width="5" height="10" fill="var(--other, red)"/>"#,
    ));
    let palette = |name: &str| (name == "accent").then(|| Color::from_rgba8(0, 0, 255, 255));
    let surface = document
        .render_to_surface(None, None, None, Color::BLACK, Some(&palette))
        .unwrap();
    assert_eq!(pixel(&surface, 2, 5), BLUE);
    assert_eq!(pixel(&surface, 7, 5), RED);

    let surface = document
        .render_to_surface(None, None, None, Color::BLACK, None)
        .unwrap();
    assert_eq!(pixel(&surface, 2, 5), 0);
    assert_eq!(pixel(&surface, 7, 5), RED);
}

// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading, sizing and the rendering entry points.

use plume_cpu::color::Color;
use plume_cpu::kurbo::{Affine, Rect};
use plume_cpu::{Canvas, Surface};
use plume_svg::{Document, Error, DEFAULT_HEIGHT, DEFAULT_WIDTH};

use crate::util::{load, pixel, RED};

fn size(svg: &str) -> (f64, f64) {
    let document = load(svg);
    (document.width(), document.height())
}

#[test]
fn size_falls_back_to_view_box_then_default() {
    assert_eq!(size(r#"<svg width="30" height="20"/>"#), (30.0, 20.0));
    assert_eq!(size(r#"<svg viewBox="0 0 40 20"/>"#), (40.0, 20.0));
    assert_eq!(size(r#"<svg width="100" viewBox="0 0 40 20"/>"#), (100.0, 50.0));
    assert_eq!(size(r#"<svg height="10" viewBox="0 0 40 20"/>"#), (20.0, 10.0));
    assert_eq!(size("<svg/>"), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
    assert_eq!(size(r#"<svg width="1in" height="12pt"/>"#), (96.0, 16.0));
}

#[test]
fn percentages_resolve_against_the_container() {
    let svg = br#"<svg width="50%" height="25%"/>"#;
    let document = Document::load_from_data(svg, Some(200.0), Some(400.0)).unwrap();
    assert_eq!((document.width(), document.height()), (100.0, 100.0));
    let document = Document::load_from_data(svg, None, None).unwrap();
    assert_eq!((document.width(), document.height()), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
}

#[test]
fn malformed_input_is_rejected() {
    let inputs: [&[u8]; 6] = [
        b"<svg><g></svg>",
        b"<svg>",
        b"<svg width=10/>",
        b"<rect/>",
        b"",
        b"<svg>\xff</svg>",
    ];
    for svg in inputs {
        let result = Document::load_from_data(svg, None, None);
        assert!(matches!(result, Err(Error::Parse { .. })), "{result:?}");
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let result = Document::load_from_file("/nonexistent/drawing.svg", None, None);
    assert!(matches!(result, Err(Error::Io(_))));
}

const NESTED: &str = r#"<svg width="100" height="100">
  <g transform="translate(10 20)">
    <rect id="r" x="5" y="5" width="10" height="30"/>
    <g id="empty"/>
  </g>
</svg>"#;

#[test]
fn extents_of_elements() {
    let document = load(NESTED);
    assert_eq!(
        document.extents(None).unwrap(),
        Rect::new(0.0, 0.0, 100.0, 100.0)
    );
    assert_eq!(
        document.extents(Some("r")).unwrap(),
        Rect::new(15.0, 25.0, 25.0, 55.0)
    );
    assert_eq!(document.extents(Some("empty")).unwrap(), Rect::ZERO);
    assert!(matches!(
        document.extents(Some("nope")),
        Err(Error::ElementNotFound(id)) if id == "nope"
    ));
}

#[test]
fn render_element_to_surface() {
    let document = load(NESTED);
    let surface = document
        .render_to_surface(Some("r"), None, None, Color::BLACK, None)
        .unwrap();
    assert_eq!((surface.width(), surface.height()), (10, 30));
    assert_eq!(pixel(&surface, 0, 0), 0xFF00_0000);
    assert_eq!(pixel(&surface, 9, 29), 0xFF00_0000);

    let scaled = document
        .render_to_surface(Some("r"), None, Some(60), Color::BLACK, None)
        .unwrap();
    assert_eq!((scaled.width(), scaled.height()), (20, 60));
}

#[test]
fn render_to_surface_failures() {
    let document = load(NESTED);
    assert!(matches!(
        document.render_to_surface(Some("nope"), None, None, Color::BLACK, None),
        Err(Error::ElementNotFound(_))
    ));
    assert!(matches!(
        document.render_to_surface(Some("empty"), None, None, Color::BLACK, None),
        Err(Error::EmptyExtents)
    ));
    let flat = load(r#"<svg width="0" height="10"/>"#);
    assert!(matches!(
        flat.render_to_surface(None, None, None, Color::BLACK, None),
        Err(Error::EmptyExtents)
    ));
}

#[test]
fn document_scales_to_requested_width() {
    let document = load(
        r#"<svg width="100" height="50"><rect width="50" height="50" fill="red"/></svg>"#,
    );
    let surface = document
        .render_to_surface(None, Some(200), None, Color::BLACK, None)
        .unwrap();
    assert_eq!((surface.width(), surface.height()), (200, 100));
    assert_eq!(pixel(&surface, 99, 99), RED);
    assert_eq!(pixel(&surface, 100, 50), 0);
}

#[test]
fn render_respects_canvas_state() {
    let document = load(
        r#"<svg width="10" height="10"><rect width="10" height="10" fill="red"/></svg>"#,
    );
    let mut canvas = Canvas::new(Surface::new(30, 30).unwrap());
    canvas.translate(10.0, 10.0);
    canvas.clip_rect(0.0, 0.0, 5.0, 10.0);
    document
        .render(None, &mut canvas, Color::BLACK, None)
        .unwrap();
    assert_eq!(canvas.matrix(), Affine::translate((10.0, 10.0)));
    let surface = canvas.surface();
    assert_eq!(pixel(surface, 5, 5), 0);
    assert_eq!(pixel(surface, 12, 15), RED);
    assert_eq!(pixel(surface, 17, 15), 0);
}

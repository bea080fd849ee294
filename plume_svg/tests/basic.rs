// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shapes, presentation attributes and group effects.

use crate::util::{channels, pixel, render, BLUE, GREEN, RED};

#[test]
fn red_rect_on_transparent() {
    let surface = render(
        r##"<svg width="100" height="100">
          <rect x="10" y="10" width="80" height="80" fill="#ff0000"/>
        </svg>"##,
    );
    assert_eq!((surface.width(), surface.height()), (100, 100));
    assert_eq!(pixel(&surface, 50, 50), RED);
    assert_eq!(pixel(&surface, 1, 1), 0);
}

#[test]
fn view_box_scales_content() {
    let surface = render(
        r#"<svg width="100" height="100" viewBox="0 0 10 10">
          <rect x="1" y="1" width="8" height="8" fill="blue"/>
        </svg>"#,
    );
    assert_eq!(pixel(&surface, 50, 50), BLUE);
    assert_eq!(pixel(&surface, 10, 10), BLUE);
    assert_eq!(pixel(&surface, 9, 9), 0);
    assert_eq!(pixel(&surface, 90, 90), 0);
}

#[test]
fn view_box_keeps_aspect_ratio() {
    // The 10x10 view box is centered horizontally in the 100x50 viewport.
    let surface = render(
        r#"<svg width="100" height="50" viewBox="0 0 10 10">
          <rect width="10" height="10" fill="blue"/>
        </svg>"#,
    );
    assert_eq!(pixel(&surface, 20, 25), 0);
    assert_eq!(pixel(&surface, 30, 25), BLUE);
    assert_eq!(pixel(&surface, 70, 25), BLUE);
    assert_eq!(pixel(&surface, 80, 25), 0);
}

#[test]
fn stroke_without_fill() {
    let surface = render(
        r##"<svg width="100" height="100">
          <rect x="10" y="10" width="80" height="80" fill="none"
                stroke="#00ff00" stroke-width="4"/>
        </svg>"##,
    );
    assert_eq!(pixel(&surface, 50, 50), 0);
    assert_eq!(pixel(&surface, 10, 50), GREEN);
    assert_eq!(pixel(&surface, 50, 89), GREEN);
    assert_eq!(pixel(&surface, 50, 5), 0);
}

#[test]
fn basic_shapes() {
    let surface = render(
        r#"<svg width="100" height="100">
          <circle cx="20" cy="20" r="10" fill="red"/>
          <ellipse cx="70" cy="20" rx="20" ry="5" fill="red"/>
          <polygon points="10,90 40,90 10,60" fill="red"/>
          <polyline points="60 60, 90 60, 90 90" fill="red"/>
          <path d="M45 45 h10 v10 h-10 z" fill="red"/>
        </svg>"#,
    );
    assert_eq!(pixel(&surface, 20, 20), RED);
    assert_eq!(pixel(&surface, 11, 11), 0);
    assert_eq!(pixel(&surface, 85, 20), RED);
    assert_eq!(pixel(&surface, 70, 28), 0);
    assert_eq!(pixel(&surface, 15, 85), RED);
    assert_eq!(pixel(&surface, 35, 65), 0);
    assert_eq!(pixel(&surface, 85, 65), RED);
    assert_eq!(pixel(&surface, 65, 85), 0);
    assert_eq!(pixel(&surface, 50, 50), RED);
}

#[test]
fn degenerate_shapes_draw_nothing() {
    let surface = render(
        r#"<svg width="20" height="20">
          <rect width="0" height="10" fill="red"/>
          <circle cx="10" cy="10" r="-1" fill="red"/>
          <ellipse cx="10" cy="10" rx="5" ry="0" fill="red"/>
          <polygon points="" fill="red"/>
          <line x1="0" y1="0" x2="20" y2="20"/>
        </svg>"#,
    );
    assert!(surface.data().iter().all(|&p| p == 0));
}

#[test]
fn line_stroke_and_dashes() {
    let surface = render(
        r#"<svg width="40" height="10">
          <line x1="0" y1="5" x2="40" y2="5" stroke="red" stroke-width="2"
                stroke-dasharray="10"/>
        </svg>"#,
    );
    assert_eq!(pixel(&surface, 5, 4), RED);
    assert_eq!(pixel(&surface, 5, 5), RED);
    assert_eq!(pixel(&surface, 5, 3), 0);
    assert_eq!(pixel(&surface, 15, 5), 0);
    assert_eq!(pixel(&surface, 25, 5), RED);
}

#[test]
fn groups_transform_and_inherit() {
    let surface = render(
        r##"<svg width="100" height="20">
          <g fill="#0000ff" transform="translate(50 0)">
            <rect width="10" height="10"/>
            <rect x="20" width="10" height="10" fill="red"/>
          </g>
        </svg>"##,
    );
    assert_eq!(pixel(&surface, 5, 5), 0);
    assert_eq!(pixel(&surface, 55, 5), BLUE);
    assert_eq!(pixel(&surface, 75, 5), RED);
}

#[test]
fn style_attribute_wins() {
    let surface = render(
        r#"<svg width="10" height="10">
          <rect width="10" height="10" style="fill: blue" fill="red"/>
        </svg>"#,
    );
    assert_eq!(pixel(&surface, 5, 5), BLUE);
}

#[test]
fn display_and_visibility() {
    let surface = render(
        r#"<svg width="40" height="10">
          <g display="none"><rect width="10" height="10" fill="red"/></g>
          <g visibility="hidden">
            <rect x="10" width="10" height="10" fill="red"/>
            <rect x="20" width="10" height="10" fill="red" visibility="visible"/>
          </g>
        </svg>"#,
    );
    assert_eq!(pixel(&surface, 5, 5), 0);
    assert_eq!(pixel(&surface, 15, 5), 0);
    assert_eq!(pixel(&surface, 25, 5), RED);
}

#[test]
fn group_opacity_composites_once() {
    let surface = render(
        r#"<svg width="20" height="10">
          <g opacity="0.5">
            <rect width="10" height="10" fill="red"/>
            <rect x="5" width="10" height="10" fill="red"/>
          </g>
        </svg>"#,
    );
    // The overlap is no darker than the rest of the group.
    let [a, r, g, b] = channels(pixel(&surface, 7, 5));
    assert!((127..=129).contains(&a), "alpha {a}");
    assert_eq!((r, g, b), (a, 0, 0));
    assert_eq!(pixel(&surface, 7, 5), pixel(&surface, 2, 5));
    assert_eq!(pixel(&surface, 17, 5), 0);
}

#[test]
fn fill_and_stroke_opacity() {
    let surface = render(
        r#"<svg width="10" height="10">
          <rect width="10" height="10" fill="red" fill-opacity="50%"/>
        </svg>"#,
    );
    let [a, r, _, _] = channels(pixel(&surface, 5, 5));
    assert!((127..=129).contains(&a));
    assert_eq!(r, a);
}

#[test]
fn even_odd_fill_rule() {
    let surface = render(
        r#"<svg width="30" height="30">
          <path d="M0 0h30v30h-30z M10 10h10v10h-10z" fill="red" fill-rule="evenodd"/>
        </svg>"#,
    );
    assert_eq!(pixel(&surface, 5, 5), RED);
    assert_eq!(pixel(&surface, 15, 15), 0);
}

#[test]
fn unknown_elements_are_skipped() {
    let surface = render(
        r#"<svg width="10" height="10">
          <foreignObject><rect width="10" height="10" fill="red"/></foreignObject>
          <text x="0" y="10">hello</text>
        </svg>"#,
    );
    assert!(surface.data().iter().all(|&p| p == 0));
}

#[test]
fn invalid_path_tail_keeps_prefix() {
    let surface = render(
        r#"<svg width="10" height="10">
          <path d="M0 0 L10 0 L10 10 L0 10 Z X 1 2" fill="red"/>
        </svg>"#,
    );
    assert_eq!(pixel(&surface, 5, 5), RED);
}

#[test]
fn huge_coordinates_still_render() {
    let surface = render(
        r#"<svg width="10" height="10">
          <line x1="-1e20" y1="5" x2="1e20" y2="5" stroke="red" stroke-width="2"/>
        </svg>"#,
    );
    assert_eq!(pixel(&surface, 5, 4), RED);
    assert_eq!(pixel(&surface, 5, 5), RED);
    assert_eq!(pixel(&surface, 5, 2), 0);
}

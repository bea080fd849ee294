// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parsing of attribute values: lengths, numbers, view boxes, aspect-ratio rules and paints.

use plume_common::color::{parse_color, ParsedColor};
use plume_common::kurbo::{Affine, Cap, Join, Rect};
use plume_common::parse::Scanner;
use plume_common::peniko::{Extend, Fill};
use smallvec::SmallVec;

/// Font size that `em` and `ex` units are resolved against.
const FONT_SIZE: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unit {
    None,
    Px,
    Percent,
    Em,
    Ex,
    Pt,
    Pc,
    In,
    Cm,
    Mm,
}

/// Which viewport dimension a percentage refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Horizontal,
    Vertical,
    /// The normalized diagonal, used by radii and stroke widths.
    Diagonal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Length {
    pub(crate) value: f64,
    pub(crate) unit: Unit,
}

impl Length {
    pub(crate) const ZERO: Self = Self::new(0.0, Unit::None);

    pub(crate) const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub(crate) fn percent(value: f64) -> Self {
        Self::new(value, Unit::Percent)
    }

    /// Resolve to user units. `viewport` is the width and height percentages refer to.
    pub(crate) fn resolve(self, axis: Axis, viewport: (f64, f64)) -> f64 {
        let v = self.value;
        match self.unit {
            Unit::None | Unit::Px => v,
            Unit::Percent => {
                let (w, h) = viewport;
                let base = match axis {
                    Axis::Horizontal => w,
                    Axis::Vertical => h,
                    Axis::Diagonal => (w * w + h * h).sqrt() / core::f64::consts::SQRT_2,
                };
                v * base / 100.0
            }
            Unit::Em => v * FONT_SIZE,
            Unit::Ex => v * FONT_SIZE / 2.0,
            Unit::Pt => v * 96.0 / 72.0,
            Unit::Pc => v * 96.0 / 6.0,
            Unit::In => v * 96.0,
            Unit::Cm => v * 96.0 / 2.54,
            Unit::Mm => v * 96.0 / 25.4,
        }
    }

    /// Resolve a coordinate given in object bounding box units: plain numbers are fractions
    /// of the box and percentages are hundredths.
    pub(crate) fn fraction(self) -> f64 {
        match self.unit {
            Unit::Percent => self.value / 100.0,
            _ => self.value,
        }
    }
}

fn length_at(s: &mut Scanner<'_>) -> Option<Length> {
    let value = s.number().ok()?;
    let unit = if s.eat(b'%') {
        Unit::Percent
    } else {
        match s.ident() {
            "" => Unit::None,
            "px" => Unit::Px,
            "em" => Unit::Em,
            "ex" => Unit::Ex,
            "pt" => Unit::Pt,
            "pc" => Unit::Pc,
            "in" => Unit::In,
            "cm" => Unit::Cm,
            "mm" => Unit::Mm,
            _ => return None,
        }
    };
    Some(Length::new(value, unit))
}

pub(crate) fn parse_length(input: &str) -> Option<Length> {
    let mut s = Scanner::new(input);
    s.skip_ws();
    let length = length_at(&mut s)?;
    (!s.skip_ws()).then_some(length)
}

pub(crate) fn parse_number(input: &str) -> Option<f64> {
    let mut s = Scanner::new(input);
    s.skip_ws();
    let v = s.number().ok()?;
    (!s.skip_ws()).then_some(v)
}

/// A number or percentage, as used by opacities and stop offsets, clamped to `0..=1`.
pub(crate) fn parse_unit_interval(input: &str) -> Option<f32> {
    let mut s = Scanner::new(input);
    s.skip_ws();
    let mut v = s.number().ok()?;
    if s.eat(b'%') {
        v /= 100.0;
    }
    if s.skip_ws() {
        return None;
    }
    Some(v.clamp(0.0, 1.0) as f32)
}

/// Parse a `viewBox`; boxes without a positive size are rejected.
pub(crate) fn parse_view_box(input: &str) -> Option<Rect> {
    let mut s = Scanner::new(input);
    s.skip_ws();
    let x = s.list_number().ok()?;
    let y = s.list_number().ok()?;
    let w = s.list_number().ok()?;
    let h = s.number().ok()?;
    if s.skip_ws() || w <= 0.0 || h <= 0.0 {
        return None;
    }
    Some(Rect::new(x, y, x + w, y + h))
}

/// Parse a list of points, dropping a trailing odd coordinate.
pub(crate) fn parse_points(input: &str) -> Vec<(f64, f64)> {
    let mut s = Scanner::new(input);
    let mut points = Vec::new();
    s.skip_ws();
    while s.at_number() {
        let Ok(x) = s.list_number() else { break };
        let Ok(y) = s.list_number() else { break };
        points.push((x, y));
    }
    points
}

/// Parse a dash array. Returns `None` when dashing is disabled.
pub(crate) fn parse_dash_array(input: &str, viewport: (f64, f64)) -> Option<SmallVec<[f64; 4]>> {
    let input = input.trim();
    if input == "none" {
        return None;
    }
    let mut s = Scanner::new(input);
    let mut dashes = SmallVec::<[f64; 4]>::new();
    while !s.is_at_end() {
        let v = length_at(&mut s)?.resolve(Axis::Diagonal, viewport);
        if v < 0.0 {
            return None;
        }
        dashes.push(v);
        s.skip_ws_comma();
    }
    if dashes.iter().sum::<f64>() <= 0.0 {
        return None;
    }
    if dashes.len() % 2 == 1 {
        let first = dashes.clone();
        dashes.extend_from_slice(&first);
    }
    Some(dashes)
}

pub(crate) fn parse_fill_rule(input: &str) -> Option<Fill> {
    match input.trim() {
        "nonzero" => Some(Fill::NonZero),
        "evenodd" => Some(Fill::EvenOdd),
        _ => None,
    }
}

pub(crate) fn parse_line_cap(input: &str) -> Option<Cap> {
    match input.trim() {
        "butt" => Some(Cap::Butt),
        "round" => Some(Cap::Round),
        "square" => Some(Cap::Square),
        _ => None,
    }
}

pub(crate) fn parse_line_join(input: &str) -> Option<Join> {
    match input.trim() {
        "miter" | "miter-clip" | "arcs" => Some(Join::Miter),
        "round" => Some(Join::Round),
        "bevel" => Some(Join::Bevel),
        _ => None,
    }
}

pub(crate) fn parse_spread_method(input: &str) -> Extend {
    match input.trim() {
        "reflect" => Extend::Reflect,
        "repeat" => Extend::Repeat,
        _ => Extend::Pad,
    }
}

/// Whether a `gradientUnits` or `clipPathUnits` value selects the bounding box of the
/// referencing element.
pub(crate) fn is_object_bounding_box(input: Option<&str>, default: bool) -> bool {
    match input.map(str::trim) {
        Some("objectBoundingBox") => true,
        Some("userSpaceOnUse") => false,
        _ => default,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Min,
    Mid,
    Max,
}

impl Align {
    fn offset(self, space: f64) -> f64 {
        match self {
            Self::Min => 0.0,
            Self::Mid => space / 2.0,
            Self::Max => space,
        }
    }
}

/// How a view box is fitted into a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AspectRatio {
    /// `None` stretches the view box non-uniformly.
    pub(crate) align: Option<(Align, Align)>,
    pub(crate) slice: bool,
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self {
            align: Some((Align::Mid, Align::Mid)),
            slice: false,
        }
    }
}

impl AspectRatio {
    pub(crate) fn parse(input: &str) -> Self {
        let mut parts = input.split_ascii_whitespace();
        let align = match parts.next() {
            Some("none") => None,
            Some(name) if name.len() == 8 => {
                let axis = |s: &str| match s {
                    "Min" => Some(Align::Min),
                    "Mid" => Some(Align::Mid),
                    "Max" => Some(Align::Max),
                    _ => None,
                };
                let (x, y) = (name.get(1..4), name.get(5..8));
                match (name.get(..1), x.and_then(axis), name.get(4..5), y.and_then(axis)) {
                    (Some("x"), Some(x), Some("Y"), Some(y)) => Some((x, y)),
                    _ => return Self::default(),
                }
            }
            _ => return Self::default(),
        };
        let slice = parts.next() == Some("slice");
        Self { align, slice }
    }

    /// The transform mapping `view_box` into a `width` by `height` viewport at the origin.
    pub(crate) fn transform(self, view_box: Rect, width: f64, height: f64) -> Affine {
        let sx = width / view_box.width();
        let sy = height / view_box.height();
        let origin = Affine::translate((-view_box.x0, -view_box.y0));
        let Some((ax, ay)) = self.align else {
            return Affine::scale_non_uniform(sx, sy) * origin;
        };
        let s = if self.slice { sx.max(sy) } else { sx.min(sy) };
        let dx = ax.offset(width - view_box.width() * s);
        let dy = ay.offset(height - view_box.height() * s);
        Affine::translate((dx, dy)) * Affine::scale(s) * origin
    }
}

/// A paint value before references are resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PaintSpec<'a> {
    None,
    Color(ParsedColor),
    /// `url(#id)` with the text that follows it, used when the reference is unusable.
    Url {
        id: &'a str,
        fallback: Option<&'a str>,
    },
    /// `var(--name, fallback)`, resolved through the caller's palette.
    Var {
        name: &'a str,
        fallback: Option<&'a str>,
    },
}

/// The text between the parentheses of `name(...)` at the start of `input`, and the text
/// after the closing parenthesis.
fn function_args<'a>(input: &'a str, name: &str) -> Option<(&'a str, &'a str)> {
    let rest = input.strip_prefix(name)?.trim_start().strip_prefix('(')?;
    let end = rest.rfind(')')?;
    Some((&rest[..end], rest[end + 1..].trim()))
}

pub(crate) fn parse_paint(input: &str) -> Option<PaintSpec<'_>> {
    let input = input.trim();
    if input == "none" {
        return Some(PaintSpec::None);
    }
    if input.starts_with("url") {
        let rest = input.strip_prefix("url")?.trim_start().strip_prefix('(')?;
        let end = rest.find(')')?;
        let id = rest[..end].trim().trim_matches(|c| c == '"' || c == '\'');
        let fallback = rest[end + 1..].trim();
        return Some(PaintSpec::Url {
            id: id.strip_prefix('#')?,
            fallback: (!fallback.is_empty()).then_some(fallback),
        });
    }
    if input.starts_with("var") {
        let (args, _) = function_args(input, "var")?;
        let (name, fallback) = match args.split_once(',') {
            Some((name, fallback)) => (name, Some(fallback.trim())),
            None => (args, None),
        };
        return Some(PaintSpec::Var {
            name: name.trim().strip_prefix("--")?,
            fallback,
        });
    }
    parse_color(input).ok().map(PaintSpec::Color)
}

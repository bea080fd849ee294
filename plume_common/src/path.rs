// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The path model.

use core::f64::consts::{FRAC_PI_2, TAU};

use crate::dash::Dasher;
use crate::flatten::{self, Callback};
use crate::kurbo::{Affine, Point, Rect, Vec2};
use log::warn;

/// The magic constant for approximating a quarter circle with a cubic.
pub const KAPPA: f64 = 0.552_284_749_831;

/// A single path element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathEl {
    /// Begin a new contour.
    MoveTo(Point),
    /// A straight segment to the point.
    LineTo(Point),
    /// A cubic Bézier segment with two control points and an end point.
    CubicTo(Point, Point, Point),
    /// Close the contour; carries the contour's start point.
    Close(Point),
}

impl PathEl {
    /// The end point of the element.
    pub fn end_point(&self) -> Point {
        match *self {
            Self::MoveTo(p) | Self::LineTo(p) | Self::Close(p) | Self::CubicTo(_, _, p) => p,
        }
    }

    fn num_points(&self) -> usize {
        match self {
            Self::CubicTo(..) => 3,
            _ => 1,
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            Self::MoveTo(p) | Self::LineTo(p) | Self::Close(p) => p.is_finite(),
            Self::CubicTo(p1, p2, p3) => p1.is_finite() && p2.is_finite() && p3.is_finite(),
        }
    }
}

impl core::ops::Mul<PathEl> for Affine {
    type Output = PathEl;

    fn mul(self, el: PathEl) -> PathEl {
        match el {
            PathEl::MoveTo(p) => PathEl::MoveTo(self * p),
            PathEl::LineTo(p) => PathEl::LineTo(self * p),
            PathEl::CubicTo(p1, p2, p3) => PathEl::CubicTo(self * p1, self * p2, self * p3),
            PathEl::Close(p) => PathEl::Close(self * p),
        }
    }
}

/// A sequence of move, line, cubic and close elements.
///
/// A path is either empty or starts with a [`PathEl::MoveTo`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    elements: Vec<PathEl>,
    num_points: usize,
    num_contours: usize,
    num_curves: usize,
    start_point: Point,
}

impl Path {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty path with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Reserve room for `additional` elements.
    pub fn reserve(&mut self, additional: usize) {
        self.elements.reserve(additional);
    }

    /// Remove all elements, keeping the allocation.
    pub fn reset(&mut self) {
        self.elements.clear();
        self.num_points = 0;
        self.num_contours = 0;
        self.num_curves = 0;
        self.start_point = Point::ZERO;
    }

    /// The elements of the path.
    pub fn elements(&self) -> &[PathEl] {
        &self.elements
    }

    /// Iterate over the elements of the path.
    pub fn iter(&self) -> impl Iterator<Item = PathEl> + Clone + '_ {
        self.elements.iter().copied()
    }

    /// Whether the path has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The number of points stored across all elements.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// The number of contours, that is, move elements.
    pub fn num_contours(&self) -> usize {
        self.num_contours
    }

    /// The number of curve elements.
    pub fn num_curves(&self) -> usize {
        self.num_curves
    }

    /// The start point of the most recent contour.
    pub fn start_point(&self) -> Point {
        self.start_point
    }

    /// The end point of the last element, if any.
    pub fn current_point(&self) -> Option<Point> {
        self.elements.last().map(PathEl::end_point)
    }

    fn push(&mut self, el: PathEl) {
        if !el.is_finite() {
            warn!("dropping path element with non-finite coordinates");
            return;
        }
        self.num_points += el.num_points();
        match el {
            PathEl::MoveTo(p) => {
                self.num_contours += 1;
                self.start_point = p;
            }
            PathEl::CubicTo(..) => self.num_curves += 1,
            _ => {}
        }
        self.elements.push(el);
    }

    fn ensure_start(&mut self) -> Point {
        match self.current_point() {
            Some(p) => p,
            None => {
                self.move_to(Point::ZERO);
                Point::ZERO
            }
        }
    }

    /// Start a new contour at `p`.
    pub fn move_to(&mut self, p: impl Into<Point>) {
        self.push(PathEl::MoveTo(p.into()));
    }

    /// Add a straight segment to `p`.
    pub fn line_to(&mut self, p: impl Into<Point>) {
        self.ensure_start();
        self.push(PathEl::LineTo(p.into()));
    }

    /// Add a quadratic segment, stored as the equivalent cubic.
    pub fn quad_to(&mut self, p1: impl Into<Point>, p2: impl Into<Point>) {
        let p0 = self.ensure_start();
        let (p1, p2) = (p1.into(), p2.into());
        let c1 = p0 + (p1 - p0) * (2.0 / 3.0);
        let c2 = p2 + (p1 - p2) * (2.0 / 3.0);
        self.push(PathEl::CubicTo(c1, c2, p2));
    }

    /// Add a cubic segment.
    pub fn cubic_to(&mut self, p1: impl Into<Point>, p2: impl Into<Point>, p3: impl Into<Point>) {
        self.ensure_start();
        self.push(PathEl::CubicTo(p1.into(), p2.into(), p3.into()));
    }

    /// Add an elliptical arc in SVG endpoint notation; `angle` is the x-axis rotation in radians.
    ///
    /// A zero radius degrades to a line and a zero-length arc is omitted.
    pub fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        angle: f64,
        large_arc: bool,
        sweep: bool,
        p: impl Into<Point>,
    ) {
        let p0 = self.ensure_start();
        let p = p.into();
        let (mut rx, mut ry) = (rx.abs(), ry.abs());
        if p0 == p {
            return;
        }
        if rx == 0.0 || ry == 0.0 {
            self.line_to(p);
            return;
        }

        let (sin_th, cos_th) = angle.sin_cos();
        let dx2 = (p0.x - p.x) / 2.0;
        let dy2 = (p0.y - p.y) / 2.0;
        let x1p = cos_th * dx2 + sin_th * dy2;
        let y1p = -sin_th * dx2 + cos_th * dy2;

        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let s = lambda.sqrt();
            rx *= s;
            ry *= s;
        }

        let (rx2, ry2) = (rx * rx, ry * ry);
        let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
        let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
        let mut coef = if den > 0.0 { (num / den).max(0.0).sqrt() } else { 0.0 };
        if large_arc == sweep {
            coef = -coef;
        }
        let cxp = coef * rx * y1p / ry;
        let cyp = -coef * ry * x1p / rx;
        let cx = cos_th * cxp - sin_th * cyp + (p0.x + p.x) / 2.0;
        let cy = sin_th * cxp + cos_th * cyp + (p0.y + p.y) / 2.0;

        let u = Vec2::new((x1p - cxp) / rx, (y1p - cyp) / ry);
        let v = Vec2::new((-x1p - cxp) / rx, (-y1p - cyp) / ry);
        let theta1 = u.y.atan2(u.x);
        let mut dtheta = u.cross(v).atan2(u.dot(v));
        if !sweep && dtheta > 0.0 {
            dtheta -= TAU;
        } else if sweep && dtheta < 0.0 {
            dtheta += TAU;
        }

        let ellipse = Affine::new([
            rx * cos_th,
            rx * sin_th,
            -ry * sin_th,
            ry * cos_th,
            cx,
            cy,
        ]);
        let segments = (dtheta.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
        let delta = dtheta / segments as f64;
        let t = 4.0 / 3.0 * (delta / 4.0).tan();
        let mut a0 = theta1;
        for i in 0..segments {
            let a1 = a0 + delta;
            let (s0, c0) = a0.sin_cos();
            let (s1, c1) = a1.sin_cos();
            let c1p = ellipse * Point::new(c0 - t * s0, s0 + t * c0);
            let c2p = ellipse * Point::new(c1 + t * s1, s1 - t * c1);
            let end = if i + 1 == segments {
                p
            } else {
                ellipse * Point::new(c1, s1)
            };
            self.push(PathEl::CubicTo(c1p, c2p, end));
            a0 = a1;
        }
    }

    /// Close the current contour.
    pub fn close(&mut self) {
        if matches!(self.elements.last(), None | Some(PathEl::Close(_))) {
            return;
        }
        self.push(PathEl::Close(self.start_point));
    }

    /// [`Self::move_to`] relative to the current point.
    pub fn rel_move_to(&mut self, d: Vec2) {
        let p = self.current_point().unwrap_or(Point::ZERO);
        self.move_to(p + d);
    }

    /// [`Self::line_to`] relative to the current point.
    pub fn rel_line_to(&mut self, d: Vec2) {
        let p = self.current_point().unwrap_or(Point::ZERO);
        self.line_to(p + d);
    }

    /// [`Self::quad_to`] relative to the current point.
    pub fn rel_quad_to(&mut self, d1: Vec2, d2: Vec2) {
        let p = self.current_point().unwrap_or(Point::ZERO);
        self.quad_to(p + d1, p + d2);
    }

    /// [`Self::cubic_to`] relative to the current point.
    pub fn rel_cubic_to(&mut self, d1: Vec2, d2: Vec2, d3: Vec2) {
        let p = self.current_point().unwrap_or(Point::ZERO);
        self.cubic_to(p + d1, p + d2, p + d3);
    }

    /// [`Self::arc_to`] relative to the current point.
    pub fn rel_arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        angle: f64,
        large_arc: bool,
        sweep: bool,
        d: Vec2,
    ) {
        let p = self.current_point().unwrap_or(Point::ZERO);
        self.arc_to(rx, ry, angle, large_arc, sweep, p + d);
    }

    /// Add a closed rectangle contour.
    pub fn add_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.reserve(5);
        self.move_to((x, y));
        self.line_to((x + w, y));
        self.line_to((x + w, y + h));
        self.line_to((x, y + h));
        self.close();
    }

    /// Add a rectangle with elliptical corners; radii are clamped to half the extents.
    pub fn add_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rx: f64, ry: f64) {
        let rx = rx.clamp(0.0, w.abs() * 0.5);
        let ry = ry.clamp(0.0, h.abs() * 0.5);
        if rx == 0.0 && ry == 0.0 {
            self.add_rect(x, y, w, h);
            return;
        }
        let (right, bottom) = (x + w, y + h);
        let (cpx, cpy) = (rx * KAPPA, ry * KAPPA);
        self.reserve(10);
        self.move_to((x, y + ry));
        self.cubic_to((x, y + ry - cpy), (x + rx - cpx, y), (x + rx, y));
        self.line_to((right - rx, y));
        self.cubic_to((right - rx + cpx, y), (right, y + ry - cpy), (right, y + ry));
        self.line_to((right, bottom - ry));
        self.cubic_to((right, bottom - ry + cpy), (right - rx + cpx, bottom), (right - rx, bottom));
        self.line_to((x + rx, bottom));
        self.cubic_to((x + rx - cpx, bottom), (x, bottom - ry + cpy), (x, bottom - ry));
        self.close();
    }

    /// Add a closed ellipse contour.
    pub fn add_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64) {
        let (left, top, right, bottom) = (cx - rx, cy - ry, cx + rx, cy + ry);
        let (cpx, cpy) = (rx * KAPPA, ry * KAPPA);
        self.reserve(6);
        self.move_to((cx, top));
        self.cubic_to((cx + cpx, top), (right, cy - cpy), (right, cy));
        self.cubic_to((right, cy + cpy), (cx + cpx, bottom), (cx, bottom));
        self.cubic_to((cx - cpx, bottom), (left, cy + cpy), (left, cy));
        self.cubic_to((left, cy - cpy), (cx - cpx, top), (cx, top));
        self.close();
    }

    /// Add a closed circle contour.
    pub fn add_circle(&mut self, cx: f64, cy: f64, r: f64) {
        self.add_ellipse(cx, cy, r, r);
    }

    /// Add a circular arc from angle `a0` to `a1` (radians).
    ///
    /// The arc is connected to the current point with a line, or starts a new contour on an
    /// empty path.
    pub fn add_arc(&mut self, cx: f64, cy: f64, r: f64, a0: f64, a1: f64, ccw: bool) {
        let mut da = a1 - a0;
        if da.abs() > TAU {
            da = if ccw { -TAU } else { TAU };
        } else if da != 0.0 && ccw != (da < 0.0) {
            da += if ccw { -TAU } else { TAU };
        }

        let segments = (da.abs() / FRAC_PI_2).ceil() as usize;
        let start = Point::new(cx + a0.cos() * r, cy + a0.sin() * r);
        if self.is_empty() {
            self.move_to(start);
        } else {
            self.line_to(start);
        }
        if segments == 0 {
            return;
        }

        let delta = da / segments as f64;
        let t = 4.0 / 3.0 * (delta / 4.0).tan() * r;
        let mut a = a0;
        let (mut sa, mut ca) = a.sin_cos();
        for _ in 0..segments {
            let b = a + delta;
            let (sb, cb) = b.sin_cos();
            self.push(PathEl::CubicTo(
                Point::new(cx + ca * r - t * sa, cy + sa * r + t * ca),
                Point::new(cx + cb * r + t * sb, cy + sb * r - t * cb),
                Point::new(cx + cb * r, cy + sb * r),
            ));
            a = b;
            (sa, ca) = (sb, cb);
        }
    }

    /// Append all elements of `other`, optionally transformed.
    pub fn add_path(&mut self, other: &Self, transform: Option<&Affine>) {
        self.reserve(other.elements.len());
        for el in other.iter() {
            self.push(match transform {
                Some(t) => *t * el,
                None => el,
            });
        }
    }

    /// Transform every point of the path in place.
    pub fn transform(&mut self, affine: &Affine) {
        for el in &mut self.elements {
            *el = *affine * *el;
        }
        self.start_point = *affine * self.start_point;
    }

    /// Call `callback` with each element as stored.
    pub fn traverse(&self, callback: &mut impl Callback) {
        for el in self.iter() {
            callback.callback(el);
        }
    }

    /// Call `callback` with each element, curves flattened into lines.
    pub fn traverse_flatten(&self, callback: &mut impl Callback) {
        flatten::flatten(self.iter(), flatten::FLATTEN_TOLERANCE, callback);
    }

    /// Call `callback` with each element of the flattened and dashed path.
    pub fn traverse_dashed(&self, offset: f64, dashes: &[f64], callback: &mut impl Callback) {
        match Dasher::new(offset, dashes) {
            Some(mut dasher) => {
                let mut out = dasher.wrap(callback);
                self.traverse_flatten(&mut out);
            }
            None => self.traverse_flatten(callback),
        }
    }

    /// A copy of the path with every curve replaced by lines.
    pub fn clone_flatten(&self) -> Self {
        let mut out = Self::with_capacity(self.elements.len() + self.num_curves * 8);
        self.traverse_flatten(&mut out);
        out
    }

    /// A copy of the path containing only the "on" parts of the dash pattern.
    pub fn clone_dashed(&self, offset: f64, dashes: &[f64]) -> Self {
        let mut out = Self::new();
        self.traverse_dashed(offset, dashes, &mut out);
        out
    }

    /// The bounding box and total length of the path.
    ///
    /// With `tight` the box is computed from the flattened path; otherwise control points are
    /// included.
    pub fn measure(&self, tight: bool) -> (Rect, f64) {
        let mut m = Measure::default();
        self.traverse_flatten(&mut m);
        if !tight {
            for el in self.iter() {
                if let PathEl::CubicTo(p1, p2, p3) = el {
                    m.include(p1);
                    m.include(p2);
                    m.include(p3);
                }
            }
        }
        (m.bounds.unwrap_or(Rect::ZERO), m.length)
    }

    /// The bounding box of the path.
    pub fn extents(&self, tight: bool) -> Rect {
        if tight {
            return self.measure(true).0;
        }
        let mut points = self.iter().flat_map(|el| match el {
            PathEl::CubicTo(a, b, c) => [Some(a), Some(b), Some(c)],
            el => [Some(el.end_point()), None, None],
        });
        let Some(Some(first)) = points.next() else {
            return Rect::ZERO;
        };
        points
            .flatten()
            .fold(Rect::from_points(first, first), |r, p| r.union_pt(p))
    }

    /// The total length of the flattened path.
    pub fn length(&self) -> f64 {
        self.measure(true).1
    }
}

impl Callback for Path {
    fn callback(&mut self, el: PathEl) {
        self.push(el);
    }
}

#[derive(Default)]
struct Measure {
    bounds: Option<Rect>,
    length: f64,
    current: Point,
}

impl Measure {
    fn include(&mut self, p: Point) {
        self.bounds = Some(match self.bounds {
            Some(r) => r.union_pt(p),
            None => Rect::from_points(p, p),
        });
    }
}

impl Callback for Measure {
    fn callback(&mut self, el: PathEl) {
        let p = el.end_point();
        if !matches!(el, PathEl::MoveTo(_)) {
            self.length += self.current.distance(p);
        }
        self.include(p);
        self.current = p;
    }
}

// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expanding strokes into fillable outlines.
//!
//! The stroker works in 26.6 device coordinates with 16.16 degree angles. Every subpath
//! produces two borders offset by the stroke radius to the left and right of the centre line.
//! Open subpaths are turned into a single ring by appending the reversed left border and caps,
//! closed subpaths produce one ring per side. The result is meant to be filled with the
//! non-zero rule.

use crate::kurbo::{Affine, Cap, Join, Point, Stroke};
use crate::math::{
    angle_diff, atan2, cos, div_fix, from_polar, from_pos, length, mul_div, mul_fix, sin, tan,
    to_fixed, to_pos, unit, Angle, Fixed, Pos, Vector, ANGLE_PI, ANGLE_PI2,
};
use crate::path::{Path, PathEl};

const TAG_ON: u8 = 1;
const TAG_CUBIC: u8 = 2;
const TAG_BEGIN: u8 = 4;
const TAG_END: u8 = 8;
const TAG_BEGIN_END: u8 = TAG_BEGIN | TAG_END;

const ARC_CUBIC_ANGLE: Angle = ANGLE_PI / 2;
const SMALL_CUBIC_THRESHOLD: Angle = ANGLE_PI / 8;
/// Inside corners turning more than this are not intersected.
const MAX_INSIDE_THETA: Angle = 0x59C000;

#[inline]
fn is_small(v: i64) -> bool {
    v > -2 && v < 2
}

#[inline]
fn is_small_vec(a: Vector, b: Vector) -> bool {
    is_small(a.x - b.x) && is_small(a.y - b.y)
}

/// The rotation from the direction of travel to the border on `side`.
#[inline]
fn side_to_rotate(side: usize) -> Angle {
    ANGLE_PI2 - side as Angle * ANGLE_PI
}

fn angle_mean(a1: Angle, a2: Angle) -> Angle {
    a1 + angle_diff(a1, a2) / 2
}

#[derive(Debug, Default)]
struct Border {
    points: Vec<Vector>,
    tags: Vec<u8>,
    /// Whether the last point may be replaced by the next line.
    movable: bool,
    /// Index of the first point of the open contour.
    start: Option<usize>,
}

impl Border {
    fn reset(&mut self) {
        self.points.clear();
        self.tags.clear();
        self.movable = false;
        self.start = None;
    }

    fn push(&mut self, p: Vector, tag: u8) {
        self.points.push(p);
        self.tags.push(tag);
    }

    fn close(&mut self, reverse: bool) {
        let Some(start) = self.start.take() else {
            return;
        };
        let count = self.points.len();
        if count <= start + 1 {
            self.points.truncate(start);
            self.tags.truncate(start);
        } else {
            // The last point holds the adjusted start coordinates.
            let count = count - 1;
            self.points[start] = self.points[count];
            self.tags[start] = self.tags[count];
            self.points.truncate(count);
            self.tags.truncate(count);
            if reverse {
                self.points[start + 1..count].reverse();
                self.tags[start + 1..count].reverse();
            }
            self.tags[start] |= TAG_BEGIN;
            self.tags[count - 1] |= TAG_END;
        }
        self.movable = false;
    }

    fn line_to(&mut self, to: Vector, movable: bool) {
        if self.movable {
            if let Some(last) = self.points.last_mut() {
                *last = to;
            }
        } else {
            let has_contour_point = self.start.is_some_and(|s| self.points.len() > s);
            // Zero-length lines are dropped, but moves are always added.
            let skip = has_contour_point
                && self.points.last().is_some_and(|&last| is_small_vec(last, to));
            if !skip {
                self.push(to, TAG_ON);
            }
        }
        self.movable = movable;
    }

    fn cubic_to(&mut self, c1: Vector, c2: Vector, to: Vector) {
        self.push(c1, TAG_CUBIC);
        self.push(c2, TAG_CUBIC);
        self.push(to, TAG_ON);
        self.movable = false;
    }

    fn arc_to(&mut self, center: Vector, radius: Pos, angle_start: Angle, angle_diff: Angle) {
        let mut arcs: Angle = 1;
        while angle_diff > ARC_CUBIC_ANGLE * arcs || -angle_diff > ARC_CUBIC_ANGLE * arcs {
            arcs += 1;
        }
        let mut coef = tan(angle_diff / (4 * arcs));
        coef += coef / 3;

        let a0 = from_polar(radius, angle_start);
        let mut a1 = Vector::new(mul_fix(-a0.y, coef), mul_fix(a0.x, coef));
        let a0 = a0 + center;
        a1 = a1 + a0;
        for i in 1..=arcs {
            let a3 = from_polar(radius, angle_start + i * angle_diff / arcs);
            let a2 = Vector::new(mul_fix(a3.y, coef), mul_fix(-a3.x, coef));
            let a3 = a3 + center;
            let a2 = a2 + a3;
            self.cubic_to(a1, a2, a3);
            a1 = Vector::new(a3.x - a2.x + a3.x, a3.y - a2.y + a3.y);
        }
    }

    fn move_to(&mut self, to: Vector) {
        if self.start.is_some() {
            self.close(false);
        }
        self.start = Some(self.points.len());
        self.movable = false;
        self.line_to(to, false);
    }

    /// Append the closed contours of this border to `out`.
    fn export(&self, out: &mut Path) {
        let to_point = |v: Vector| Point::new(from_pos(v.x), from_pos(v.y));
        let mut i = 0;
        while i < self.points.len() {
            if self.tags[i] & TAG_BEGIN == 0 {
                i += 1;
                continue;
            }
            let s = i;
            let Some(e) = (s..self.points.len()).find(|&j| self.tags[j] & TAG_END != 0) else {
                break;
            };
            out.move_to(to_point(self.points[s]));
            let mut j = s + 1;
            while j <= e {
                if self.tags[j] & TAG_CUBIC != 0 {
                    let c1 = self.points[j];
                    let c2 = self.points.get(j + 1).copied().unwrap_or(c1);
                    let end = if j + 2 <= e {
                        self.points[j + 2]
                    } else {
                        self.points[s]
                    };
                    out.cubic_to(to_point(c1), to_point(c2), to_point(end));
                    j += 3;
                } else {
                    out.line_to(to_point(self.points[j]));
                    j += 1;
                }
            }
            out.close();
            i = e + 1;
        }
    }
}

/// Stroke parameters in device space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeParams {
    /// Half the stroke width, in device units.
    pub radius: f64,
    /// Cap at the start of open subpaths.
    pub start_cap: Cap,
    /// Cap at the end of open subpaths.
    pub end_cap: Cap,
    /// Join between segments.
    pub join: Join,
    /// Maximum ratio of miter length to stroke width; clamped to at least 1.
    pub miter_limit: f64,
}

impl StrokeParams {
    /// Device-space parameters for `style` drawn under `transform`.
    pub fn new(style: &Stroke, transform: &Affine) -> Self {
        let [a, b, c, d, _, _] = transform.as_coeffs();
        let scale = a.hypot(b).hypot(c.hypot(d)) / core::f64::consts::SQRT_2;
        Self {
            radius: style.width * scale / 2.0,
            start_cap: style.start_cap,
            end_cap: style.end_cap,
            join: style.join,
            miter_limit: style.miter_limit,
        }
    }
}

/// Converts centre lines into stroke outlines.
#[derive(Debug)]
pub struct Stroker {
    angle_in: Angle,
    angle_out: Angle,
    center: Vector,
    line_length: Fixed,
    first_point: bool,
    subpath_open: bool,
    subpath_angle: Angle,
    subpath_start: Vector,
    subpath_line_length: Fixed,
    handle_wide_strokes: bool,
    start_cap: Cap,
    end_cap: Cap,
    join: Join,
    join_saved: Join,
    miter_limit: Fixed,
    radius: Pos,
    borders: [Border; 2],
}

impl Stroker {
    /// Create a stroker for the given parameters.
    pub fn new(params: &StrokeParams) -> Self {
        Self {
            angle_in: 0,
            angle_out: 0,
            center: Vector::default(),
            line_length: 0,
            first_point: true,
            subpath_open: false,
            subpath_angle: 0,
            subpath_start: Vector::default(),
            subpath_line_length: 0,
            handle_wide_strokes: false,
            start_cap: params.start_cap,
            end_cap: params.end_cap,
            join: params.join,
            join_saved: params.join,
            miter_limit: to_fixed(params.miter_limit).max(0x10000),
            radius: to_pos(params.radius),
            borders: [Border::default(), Border::default()],
        }
    }

    /// Discard all generated borders.
    pub fn rewind(&mut self) {
        for border in &mut self.borders {
            border.reset();
        }
    }

    fn arc_to(&mut self, side: usize) {
        let rotate = side_to_rotate(side);
        let mut total = angle_diff(self.angle_in, self.angle_out);
        if total == ANGLE_PI {
            total = -rotate * 2;
        }
        let border = &mut self.borders[side];
        border.arc_to(self.center, self.radius, self.angle_in + rotate, total);
        border.movable = false;
    }

    fn cap(&mut self, cap: Cap, angle: Angle, side: usize) {
        if cap == Cap::Round {
            self.angle_in = angle;
            self.angle_out = angle + ANGLE_PI;
            self.arc_to(side);
            return;
        }
        let mut middle = from_polar(self.radius, angle);
        let delta = if side != 0 {
            Vector::new(middle.y, -middle.x)
        } else {
            Vector::new(-middle.y, middle.x)
        };
        if cap == Cap::Square {
            middle = middle + self.center;
        } else {
            middle = self.center;
        }
        let delta = delta + middle;
        let border = &mut self.borders[side];
        border.line_to(delta, false);
        let end = Vector::new(middle.x - delta.x + middle.x, middle.y - delta.y + middle.y);
        border.line_to(end, false);
    }

    fn inside(&mut self, side: usize, line_length: Fixed) {
        let rotate = side_to_rotate(side);
        let theta = angle_diff(self.angle_in, self.angle_out) / 2;
        let border_movable = self.borders[side].movable;

        // Only intersect the borders of two long enough lines, and avoid near U-turns.
        let mut sigma = Vector::default();
        let intersect = if !border_movable
            || line_length == 0
            || !(-MAX_INSIDE_THETA..=MAX_INSIDE_THETA).contains(&theta)
        {
            false
        } else {
            sigma = unit(theta);
            let min_length = mul_div(self.radius, sigma.y, sigma.x).abs();
            min_length != 0 && self.line_length >= min_length && line_length >= min_length
        };

        let delta = if intersect {
            let phi = self.angle_in + theta + rotate;
            let len = div_fix(self.radius, sigma.x);
            from_polar(len, phi) + self.center
        } else {
            self.borders[side].movable = false;
            from_polar(self.radius, self.angle_out + rotate) + self.center
        };
        self.borders[side].line_to(delta, false);
    }

    fn outside(&mut self, side: usize, line_length: Fixed) {
        if self.join == Join::Round {
            self.arc_to(side);
            return;
        }
        let rotate = side_to_rotate(side);
        let radius = self.radius;
        let mut bevel = self.join == Join::Bevel;
        let mut sigma = Vector::default();
        let mut phi = 0;
        if !bevel {
            let mut theta = angle_diff(self.angle_in, self.angle_out) / 2;
            if theta == ANGLE_PI2 {
                theta = -rotate;
            }
            phi = self.angle_in + theta + rotate;
            sigma = from_polar(self.miter_limit, theta);
            // The miter limit is exceeded.
            if sigma.x < 0x10000 {
                bevel = true;
            }
        }

        let border = &mut self.borders[side];
        if bevel {
            let delta = from_polar(radius, self.angle_out + rotate) + self.center;
            border.movable = false;
            border.line_to(delta, false);
        } else {
            let len = mul_div(radius, self.miter_limit, sigma.x);
            border.line_to(from_polar(len, phi) + self.center, false);
            // Lines supply their own end point.
            if line_length == 0 {
                border.line_to(from_polar(radius, self.angle_out + rotate) + self.center, false);
            }
        }
    }

    fn process_corner(&mut self, line_length: Fixed) {
        let turn = angle_diff(self.angle_in, self.angle_out);
        if turn == 0 {
            return;
        }
        // Turning right puts the inside on side 0.
        let inside_side = usize::from(turn < 0);
        self.inside(inside_side, line_length);
        self.outside(1 - inside_side, line_length);
    }

    fn subpath_start(&mut self, start_angle: Angle, line_length: Fixed) {
        let delta = from_polar(self.radius, start_angle + ANGLE_PI2);
        self.borders[0].move_to(self.center + delta);
        self.borders[1].move_to(self.center - delta);
        self.subpath_angle = start_angle;
        self.first_point = false;
        self.subpath_line_length = line_length;
    }

    /// Start a new subpath at `to`.
    pub fn begin_subpath(&mut self, to: Vector, open: bool) {
        self.first_point = true;
        self.center = to;
        self.subpath_open = open;
        // Round joins, and round or square caps, already cover the sector that a wide
        // stroke folds back over.
        self.handle_wide_strokes = self.join != Join::Round
            || (open && (self.start_cap == Cap::Butt || self.end_cap == Cap::Butt));
        self.subpath_start = to;
        self.angle_in = 0;
    }

    /// Add a straight segment from the current point.
    pub fn line_to(&mut self, to: Vector) {
        let delta = to - self.center;
        // A zero-length line would create a spurious corner.
        if delta == Vector::default() {
            return;
        }
        let line_length = length(delta);
        let angle = atan2(delta.x, delta.y);
        let mut delta = from_polar(self.radius, angle + ANGLE_PI2);

        if self.first_point {
            self.subpath_start(angle, line_length);
        } else {
            self.angle_out = angle;
            self.process_corner(line_length);
        }

        for border in &mut self.borders {
            // Line ends may be replaced by the next join.
            border.line_to(to + delta, true);
            delta = Vector::new(-delta.x, -delta.y);
        }
        self.angle_in = angle;
        self.center = to;
        self.line_length = line_length;
    }

    /// Add a cubic segment from the current point.
    pub fn cubic_to(&mut self, control1: Vector, control2: Vector, to: Vector) {
        if is_small_vec(self.center, control1)
            && is_small_vec(control1, control2)
            && is_small_vec(control2, to)
        {
            self.center = to;
            return;
        }

        const LIMIT: usize = 32;
        let mut stack = [Vector::default(); 37];
        stack[0] = to;
        stack[1] = control2;
        stack[2] = control1;
        stack[3] = self.center;
        let mut arc = 0;
        let mut first_arc = true;

        loop {
            let mut angles = [self.angle_in; 3];
            if arc < LIMIT && !cubic_is_small_enough(&stack[arc..arc + 4], &mut angles) {
                if self.first_point {
                    self.angle_in = angles[0];
                }
                cubic_split(&mut stack[arc..arc + 7]);
                arc += 3;
                continue;
            }
            let [angle_in, angle_mid, angle_out] = angles;

            if first_arc {
                first_arc = false;
                if self.first_point {
                    self.subpath_start(angle_in, 0);
                } else {
                    self.angle_out = angle_in;
                    self.process_corner(0);
                }
            } else if angle_diff(self.angle_in, angle_in).abs() > SMALL_CUBIC_THRESHOLD / 4 {
                // Too sharp a turn between consecutive arcs gets a round corner.
                self.center = stack[arc + 3];
                self.angle_out = angle_in;
                self.join = Join::Round;
                self.process_corner(0);
                self.join = self.join_saved;
            }

            self.add_arc(&stack[arc..arc + 4], angle_in, angle_mid, angle_out);

            self.angle_in = angle_out;
            if arc == 0 {
                break;
            }
            arc -= 3;
        }
        self.center = to;
        self.line_length = 0;
    }

    /// Offset one small-enough arc onto both borders.
    fn add_arc(&mut self, arc: &[Vector], angle_in: Angle, angle_mid: Angle, angle_out: Angle) {
        let theta1 = angle_diff(angle_in, angle_mid) / 2;
        let theta2 = angle_diff(angle_mid, angle_out) / 2;
        let phi1 = angle_mean(angle_in, angle_mid);
        let phi2 = angle_mean(angle_mid, angle_out);
        let length1 = div_fix(self.radius, cos(theta1));
        let length2 = div_fix(self.radius, cos(theta2));

        let alpha0 = if self.handle_wide_strokes {
            atan2(arc[0].x - arc[3].x, arc[0].y - arc[3].y)
        } else {
            0
        };

        for (side, border) in self.borders.iter_mut().enumerate() {
            let rotate = side_to_rotate(side);
            let ctrl1 = from_polar(length1, phi1 + rotate) + arc[2];
            let ctrl2 = from_polar(length2, phi2 + rotate) + arc[1];
            let end = from_polar(self.radius, angle_out + rotate) + arc[0];

            if self.handle_wide_strokes {
                let start = border.points.last().copied().unwrap_or(end);
                let alpha1 = atan2(end.x - start.x, end.y - start.y);
                // The border runs against the centre line: the radius exceeds the local
                // radius of curvature.
                if angle_diff(alpha0, alpha1).abs() > ANGLE_PI / 2 {
                    let beta = atan2(arc[3].x - start.x, arc[3].y - start.y);
                    let gamma = atan2(arc[0].x - end.x, arc[0].y - end.y);
                    let blen = length(end - start);
                    let sin_a = sin(alpha1 - gamma).abs();
                    let sin_b = sin(beta - gamma).abs();
                    let alen = mul_div(blen, sin_a, sin_b);
                    let delta = from_polar(alen, beta) + start;

                    // Walk the folded sector backwards, then move on to the end point.
                    border.movable = false;
                    border.line_to(delta, false);
                    border.line_to(end, false);
                    border.cubic_to(ctrl2, ctrl1, start);
                    border.line_to(end, false);
                    continue;
                }
            }
            border.cubic_to(ctrl1, ctrl2, end);
        }
    }

    fn add_reverse_left(&mut self, open: bool) {
        let [right, left] = &mut self.borders;
        let Some(start) = left.start else {
            return;
        };
        if left.points.len() <= start {
            return;
        }
        for i in (start..left.points.len()).rev() {
            let mut tag = left.tags[i];
            if open {
                tag &= !TAG_BEGIN_END;
            } else {
                let ends = tag & TAG_BEGIN_END;
                if ends == TAG_BEGIN || ends == TAG_END {
                    tag ^= TAG_BEGIN_END;
                }
            }
            right.push(left.points[i], tag);
        }
        left.points.truncate(start);
        left.tags.truncate(start);
        right.movable = false;
        left.movable = false;
    }

    /// Finish the current subpath, adding caps or the closing join.
    pub fn end_subpath(&mut self) {
        if self.first_point {
            // Nothing but degenerate segments.
            return;
        }
        if self.subpath_open {
            self.cap(self.end_cap, self.angle_in, 0);
            self.add_reverse_left(true);
            self.center = self.subpath_start;
            self.cap(self.start_cap, self.subpath_angle + ANGLE_PI, 0);
            self.borders[0].close(false);
            self.borders[1].start = None;
        } else {
            if self.center != self.subpath_start {
                self.line_to(self.subpath_start);
            }
            self.angle_out = self.subpath_angle;
            self.process_corner(self.subpath_line_length);
            self.borders[0].close(false);
            self.borders[1].close(true);
        }
    }

    /// Stroke every contour of `path`, mapped to 26.6 device space by `transform`.
    fn parse(&mut self, path: impl IntoIterator<Item = PathEl>, transform: &Affine) {
        let to_vec = |p: Point| {
            let p = *transform * p;
            Vector::new(to_pos(p.x), to_pos(p.y))
        };
        let mut contour: Vec<PathEl> = Vec::new();
        let mut last_start = Point::ZERO;
        let flush = |stroker: &mut Self, contour: &mut Vec<PathEl>, closed: bool| {
            if let Some(PathEl::MoveTo(p)) = contour.first().copied() {
                stroker.begin_subpath(to_vec(p), !closed);
                for el in &contour[1..] {
                    match *el {
                        PathEl::LineTo(p) => stroker.line_to(to_vec(p)),
                        PathEl::CubicTo(p1, p2, p3) => {
                            stroker.cubic_to(to_vec(p1), to_vec(p2), to_vec(p3));
                        }
                        PathEl::MoveTo(_) | PathEl::Close(_) => {}
                    }
                }
                stroker.end_subpath();
            }
            contour.clear();
        };
        for el in path {
            match el {
                PathEl::MoveTo(p) => {
                    flush(self, &mut contour, false);
                    last_start = p;
                    contour.push(el);
                }
                PathEl::Close(p) => {
                    flush(self, &mut contour, true);
                    last_start = p;
                }
                _ => {
                    if contour.is_empty() {
                        contour.push(PathEl::MoveTo(last_start));
                    }
                    contour.push(el);
                }
            }
        }
        flush(self, &mut contour, false);
    }

    /// The generated outline, in device coordinates.
    pub fn export(&self) -> Path {
        let capacity = self.borders[0].points.len() + self.borders[1].points.len();
        let mut out = Path::with_capacity(capacity);
        for border in &self.borders {
            border.export(&mut out);
        }
        out
    }
}

/// Split the cubic stored in reverse order at `base[0..4]` into two halves at `base[0..7]`.
fn cubic_split(base: &mut [Vector]) {
    let split = |p0: i64, p1: i64, p2: i64, p3: i64| {
        let a = (p0 + p1) / 2;
        let b = (p3 + p2) / 2;
        let c = (p1 + p2) / 2;
        let a2 = (a + c) / 2;
        let b2 = (b + c) / 2;
        [p0, a, a2, (a2 + b2) / 2, b2, b, p3]
    };
    let xs = split(base[0].x, base[1].x, base[2].x, base[3].x);
    let ys = split(base[0].y, base[1].y, base[2].y, base[3].y);
    for (i, (x, y)) in xs.into_iter().zip(ys).enumerate() {
        base[i] = Vector::new(x, y);
    }
}

/// Compute the in/mid/out directions of a reversed cubic and whether it turns little enough
/// to be offset directly.
fn cubic_is_small_enough(base: &[Vector], angles: &mut [Angle; 3]) -> bool {
    let d1 = base[2] - base[3];
    let d2 = base[1] - base[2];
    let d3 = base[0] - base[1];
    let zero = Vector::default();
    let dir = |d: Vector| atan2(d.x, d.y);

    match (
        is_small_vec(d1, zero),
        is_small_vec(d2, zero),
        is_small_vec(d3, zero),
    ) {
        // A point keeps the previous direction.
        (true, true, true) => {}
        (true, true, false) => *angles = [dir(d3); 3],
        (true, false, true) => *angles = [dir(d2); 3],
        (true, false, false) => {
            let a = dir(d2);
            *angles = [a, a, dir(d3)];
        }
        (false, true, true) => *angles = [dir(d1); 3],
        (false, true, false) => {
            let (a_in, a_out) = (dir(d1), dir(d3));
            *angles = [a_in, angle_mean(a_in, a_out), a_out];
        }
        (false, false, true) => {
            let a = dir(d2);
            *angles = [dir(d1), a, a];
        }
        (false, false, false) => *angles = [dir(d1), dir(d2), dir(d3)],
    }

    let theta1 = angle_diff(angles[0], angles[1]).abs();
    let theta2 = angle_diff(angles[1], angles[2]).abs();
    theta1 < SMALL_CUBIC_THRESHOLD && theta2 < SMALL_CUBIC_THRESHOLD
}

/// Expand `path` into the outline of its stroke under `transform`.
///
/// The input is in user space; the output is in device space and must be filled with the
/// non-zero rule. A non-positive width produces an empty path.
pub fn stroke(path: impl IntoIterator<Item = PathEl>, style: &Stroke, transform: &Affine) -> Path {
    let params = StrokeParams::new(style, transform);
    stroke_with(path, &params, transform)
}

/// [`stroke`] with explicit device-space parameters.
pub fn stroke_with(
    path: impl IntoIterator<Item = PathEl>,
    params: &StrokeParams,
    transform: &Affine,
) -> Path {
    if params.radius.is_nan() || params.radius <= 0.0 {
        return Path::new();
    }
    let mut stroker = Stroker::new(params);
    stroker.parse(path, transform);
    stroker.export()
}

#[cfg(test)]
mod tests {
    use super::{stroke, StrokeParams};
    use crate::math::MAX_COORD;
    use crate::kurbo::{Affine, Cap, Join, Stroke};
    use crate::path::{Path, PathEl};

    fn style(width: f64, cap: Cap, join: Join) -> Stroke {
        Stroke::new(width).with_caps(cap).with_join(join).with_miter_limit(10.0)
    }

    /// Sum of the signed areas of all contours.
    fn signed_area(path: &Path) -> f64 {
        let flat = path.clone_flatten();
        let mut area = 0.0;
        let mut start = None;
        let mut prev = None;
        for el in flat.iter() {
            let p = el.end_point();
            match el {
                PathEl::MoveTo(_) => start = Some(p),
                _ => {
                    if let Some(q) = prev {
                        area += crate::kurbo::Vec2::cross(q - start.unwrap(), p - start.unwrap());
                    }
                }
            }
            prev = Some(p);
        }
        area / 2.0
    }

    fn horizontal_line() -> Path {
        let mut p = Path::new();
        p.move_to((0.0, 0.0));
        p.line_to((100.0, 0.0));
        p
    }

    #[test]
    fn butt_line_area() {
        let butt = style(10.0, Cap::Butt, Join::Miter);
        let out = stroke(horizontal_line().iter(), &butt, &Affine::IDENTITY);
        assert_eq!(out.num_contours(), 1);
        let area = signed_area(&out).abs();
        assert!((area - 1000.0).abs() < 1.0, "area {area}");
        let r = out.extents(false);
        assert!((r.y0 + 5.0).abs() < 0.05 && (r.y1 - 5.0).abs() < 0.05);
        assert!(r.x0.abs() < 0.05 && (r.x1 - 100.0).abs() < 0.05);
    }

    #[test]
    fn square_and_round_caps() {
        let line = horizontal_line();
        let square = stroke(line.iter(), &style(10.0, Cap::Square, Join::Miter), &Affine::IDENTITY);
        assert!((signed_area(&square).abs() - 1100.0).abs() < 1.0);
        let round = stroke(line.iter(), &style(10.0, Cap::Round, Join::Miter), &Affine::IDENTITY);
        let expected = 1000.0 + core::f64::consts::PI * 25.0;
        assert!((signed_area(&round).abs() - expected).abs() < 2.0);
    }

    #[test]
    fn transform_scales_width() {
        let out = stroke(
            horizontal_line().iter(),
            &style(10.0, Cap::Butt, Join::Miter),
            &Affine::scale(2.0),
        );
        assert!((signed_area(&out).abs() - 4000.0).abs() < 4.0);
        let params = StrokeParams::new(&Stroke::new(4.0), &Affine::scale(3.0));
        assert!((params.radius - 6.0).abs() < 1e-9);
    }

    #[test]
    fn closed_square_ring() {
        let mut p = Path::new();
        p.add_rect(0.0, 0.0, 100.0, 100.0);
        let out = stroke(p.iter(), &style(10.0, Cap::Butt, Join::Miter), &Affine::IDENTITY);
        assert_eq!(out.num_contours(), 2);
        assert!((signed_area(&out).abs() - 4000.0).abs() < 2.0);
        let r = out.extents(false);
        assert!((r.x0 + 5.0).abs() < 0.05 && (r.x1 - 105.0).abs() < 0.05);
    }

    #[test]
    fn bevel_cuts_corner() {
        let mut p = Path::new();
        p.move_to((0.0, 0.0));
        p.line_to((100.0, 0.0));
        p.line_to((100.0, 100.0));
        let miter = stroke(p.iter(), &style(10.0, Cap::Butt, Join::Miter), &Affine::IDENTITY);
        let bevel = stroke(p.iter(), &style(10.0, Cap::Butt, Join::Bevel), &Affine::IDENTITY);
        let round = stroke(p.iter(), &style(10.0, Cap::Butt, Join::Round), &Affine::IDENTITY);
        let (m, b, r) = (
            signed_area(&miter).abs(),
            signed_area(&bevel).abs(),
            signed_area(&round).abs(),
        );
        assert!((m - b - 12.5).abs() < 1.0, "miter {m} bevel {b}");
        assert!(b < r && r < m);
    }

    #[test]
    fn miter_limit_falls_back_to_bevel() {
        let mut p = Path::new();
        p.move_to((0.0, 0.0));
        p.line_to((100.0, 0.0));
        p.line_to((0.0, 10.0));
        let sharp = style(4.0, Cap::Butt, Join::Miter).with_miter_limit(1.5);
        let bevel = style(4.0, Cap::Butt, Join::Bevel);
        let a = signed_area(&stroke(p.iter(), &sharp, &Affine::IDENTITY));
        let b = signed_area(&stroke(p.iter(), &bevel, &Affine::IDENTITY));
        assert!((a - b).abs() < 0.5);
    }

    #[test]
    fn area_grows_with_width() {
        let mut p = Path::new();
        p.move_to((10.0, 10.0));
        p.cubic_to((60.0, 0.0), (90.0, 80.0), (150.0, 40.0));
        let mut last = 0.0;
        for width in [1.0, 2.0, 4.0, 8.0, 16.0] {
            let butt = style(width, Cap::Butt, Join::Miter);
            let outline = stroke(p.iter(), &butt, &Affine::IDENTITY);
            let area = signed_area(&outline).abs();
            assert!(area > last, "width {width}: {area} <= {last}");
            last = area;
        }
    }

    #[test]
    fn degenerate_input_is_empty() {
        let mut p = Path::new();
        p.move_to((5.0, 5.0));
        p.cubic_to((5.0, 5.0), (5.0, 5.0), (5.0, 5.0));
        p.line_to((5.0, 5.0));
        let butt = style(4.0, Cap::Butt, Join::Miter);
        assert!(stroke(p.iter(), &butt, &Affine::IDENTITY).is_empty());
        let hairline = style(0.0, Cap::Butt, Join::Miter);
        assert!(stroke(horizontal_line().iter(), &hairline, &Affine::IDENTITY).is_empty());
    }

    #[test]
    fn wide_stroke_on_tight_curve_stays_bounded() {
        let mut p = Path::new();
        p.move_to((0.0, 0.0));
        p.cubic_to((10.0, 0.0), (10.0, 10.0), (0.0, 10.0));
        let out = stroke(p.iter(), &style(40.0, Cap::Butt, Join::Bevel), &Affine::IDENTITY);
        assert!(!out.is_empty());
        let r = out.extents(true);
        assert!(r.x0 > -25.0 && r.x1 < 35.0 && r.y0 > -25.0 && r.y1 < 35.0, "{r:?}");
    }

    #[test]
    fn huge_coordinates_are_clamped() {
        let mut p = Path::new();
        p.move_to((-1e20, 0.0));
        p.line_to((1e20, 0.0));
        let out = stroke(p.iter(), &style(2.0, Cap::Butt, Join::Miter), &Affine::IDENTITY);
        assert!(!out.is_empty());
        let r = out.extents(true);
        assert!(r.x0 >= -MAX_COORD - 1.0 && r.x1 <= MAX_COORD + 1.0, "{r:?}");
        assert!(r.y0 >= -1.5 && r.y1 <= 1.5, "{r:?}");
    }

    #[test]
    fn huge_width_is_clamped() {
        let out = stroke(
            horizontal_line().iter(),
            &style(1e20, Cap::Square, Join::Round),
            &Affine::IDENTITY,
        );
        assert!(!out.is_empty());
        let r = out.extents(true);
        assert!(r.y0 >= -2.0 * MAX_COORD && r.y1 <= 2.0 * MAX_COORD, "{r:?}");
    }
}

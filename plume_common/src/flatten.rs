// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flattening Bézier paths into polylines.

use crate::kurbo::Point;
use crate::path::PathEl;

/// The maximum distance between a curve and its flattened polyline, in device units.
pub const FLATTEN_TOLERANCE: f64 = 0.25;

/// The maximum number of pending subdivisions of a single cubic.
///
/// Once the stack is full the remaining piece is emitted as a line.
pub const MAX_SUBDIVISION_DEPTH: usize = 32;

/// Receives flattened path elements.
///
/// Only [`PathEl::MoveTo`], [`PathEl::LineTo`] and [`PathEl::Close`] are ever passed.
pub trait Callback {
    /// Handle one element.
    fn callback(&mut self, el: PathEl);
}

impl<C: Callback + ?Sized> Callback for &mut C {
    #[inline]
    fn callback(&mut self, el: PathEl) {
        (**self).callback(el);
    }
}

#[derive(Clone, Copy, Default)]
struct Cubic {
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
}

impl Cubic {
    /// Split at `t = 0.5`, returning the first and second halves.
    fn subdivide(&self) -> (Self, Self) {
        let p01 = self.p0.midpoint(self.p1);
        let p12 = self.p1.midpoint(self.p2);
        let p23 = self.p2.midpoint(self.p3);
        let p012 = p01.midpoint(p12);
        let p123 = p12.midpoint(p23);
        let mid = p012.midpoint(p123);
        (
            Self {
                p0: self.p0,
                p1: p01,
                p2: p012,
                p3: mid,
            },
            Self {
                p0: mid,
                p1: p123,
                p2: p23,
                p3: self.p3,
            },
        )
    }

    /// Whether the control polygon is within `tolerance` of the chord.
    fn is_flat(&self, tolerance: f64) -> bool {
        let d = self.p3 - self.p0;
        let mut l = d.x.abs() + d.y.abs();
        let dev = if l > 1.0 {
            let a = self.p0 - self.p1;
            let b = self.p0 - self.p2;
            (d.x * a.y - d.y * a.x).abs() + (d.x * b.y - d.y * b.x).abs()
        } else {
            l = 1.0;
            let a = self.p0 - self.p1;
            let b = self.p0 - self.p2;
            a.x.abs() + a.y.abs() + b.x.abs() + b.y.abs()
        };
        dev < tolerance * l
    }
}

/// Flatten a single cubic starting at `p0`, emitting [`PathEl::LineTo`]s.
pub fn flatten_cubic(
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    tolerance: f64,
    callback: &mut impl Callback,
) {
    if !(p1.is_finite() && p2.is_finite()) {
        callback.callback(PathEl::LineTo(p3));
        return;
    }
    let mut stack = [Cubic::default(); MAX_SUBDIVISION_DEPTH];
    stack[0] = Cubic { p0, p1, p2, p3 };
    let mut top = 1;
    while top > 0 {
        let c = stack[top - 1];
        if top == MAX_SUBDIVISION_DEPTH || c.is_flat(tolerance) {
            callback.callback(PathEl::LineTo(c.p3));
            top -= 1;
        } else {
            let (first, second) = c.subdivide();
            stack[top - 1] = second;
            stack[top] = first;
            top += 1;
        }
    }
}

/// Flatten a path, forwarding moves, lines and closes and replacing curves by lines.
pub fn flatten(
    path: impl IntoIterator<Item = PathEl>,
    tolerance: f64,
    callback: &mut impl Callback,
) {
    let mut current = Point::ZERO;
    for el in path {
        match el {
            PathEl::CubicTo(p1, p2, p3) => {
                flatten_cubic(current, p1, p2, p3, tolerance, callback);
            }
            el => callback.callback(el),
        }
        current = el.end_point();
    }
}

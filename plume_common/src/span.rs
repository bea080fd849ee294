// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Horizontal coverage runs.

use std::cell::OnceCell;

use crate::kurbo::Rect;

/// A horizontal run of pixels sharing one coverage value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// The first pixel of the run.
    pub x: i32,
    /// The number of pixels in the run.
    pub len: i32,
    /// The scanline.
    pub y: i32,
    /// Coverage in `0..=255`.
    pub coverage: u8,
}

/// Spans sorted by `y`, then by `x`, not overlapping within a scanline.
#[derive(Debug, Clone, Default)]
pub struct SpanBuffer {
    spans: Vec<Span>,
    extents: OnceCell<Rect>,
}

impl PartialEq for SpanBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.spans == other.spans
    }
}

impl SpanBuffer {
    /// Create an empty span buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer fully covering the given pixel rectangle.
    pub fn from_rect(x: i32, y: i32, width: i32, height: i32) -> Self {
        let mut buf = Self::new();
        buf.init_rect(x, y, width, height);
        buf
    }

    /// The spans.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Whether there are no spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Remove all spans.
    pub fn reset(&mut self) {
        self.spans.clear();
        self.extents = OnceCell::new();
    }

    /// Replace the contents by one full-coverage span per row of the rectangle.
    pub fn init_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.reset();
        if width <= 0 {
            return;
        }
        self.spans.extend((0..height.max(0)).map(|i| Span {
            x,
            len: width,
            y: y + i,
            coverage: 255,
        }));
    }

    /// Append a run, merging it into the previous one when they touch and match.
    ///
    /// Runs must be appended in sorted order.
    pub fn push(&mut self, x: i32, len: i32, y: i32, coverage: u8) {
        if len <= 0 || coverage == 0 {
            return;
        }
        self.extents = OnceCell::new();
        if let Some(last) = self.spans.last_mut() {
            if last.y == y && last.x + last.len == x && last.coverage == coverage {
                last.len += len;
                return;
            }
        }
        self.spans.push(Span { x, len, y, coverage });
    }

    /// Replace the contents by the pixels covered by both `a` and `b`.
    ///
    /// Coverage of overlapping runs is multiplied.
    pub fn intersect(&mut self, a: &Self, b: &Self) {
        self.reset();
        self.spans.reserve(a.spans.len().max(b.spans.len()));
        let (mut ia, mut ib) = (0, 0);
        while let (Some(sa), Some(sb)) = (a.spans.get(ia), b.spans.get(ib)) {
            if sb.y > sa.y {
                ia += 1;
                continue;
            }
            if sa.y != sb.y {
                ib += 1;
                continue;
            }
            let (ax1, ax2) = (sa.x, sa.x + sa.len);
            let (bx1, bx2) = (sb.x, sb.x + sb.len);
            if bx1 < ax1 && bx2 < ax1 {
                ib += 1;
                continue;
            }
            if ax1 < bx1 && ax2 < bx1 {
                ia += 1;
                continue;
            }
            let x = ax1.max(bx1);
            let len = ax2.min(bx2) - x;
            if len > 0 {
                self.spans.push(Span {
                    x,
                    len,
                    y: sa.y,
                    coverage: (u32::from(sa.coverage) * u32::from(sb.coverage) / 255) as u8,
                });
            }
            if ax2 < bx2 {
                ia += 1;
            } else {
                ib += 1;
            }
        }
    }

    /// The bounding box of all spans, zero-sized when empty.
    pub fn extents(&self) -> Rect {
        *self.extents.get_or_init(|| {
            let (Some(first), Some(last)) = (self.spans.first(), self.spans.last()) else {
                return Rect::ZERO;
            };
            let (x1, x2) = self.spans.iter().fold((i32::MAX, i32::MIN), |(x1, x2), s| {
                (x1.min(s.x), x2.max(s.x + s.len))
            });
            Rect::new(
                f64::from(x1),
                f64::from(first.y),
                f64::from(x2),
                f64::from(last.y + 1),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Span, SpanBuffer};
    use crate::kurbo::Rect;

    fn buffer(spans: &[(i32, i32, i32, u8)]) -> SpanBuffer {
        let mut buf = SpanBuffer::new();
        for &(x, len, y, c) in spans {
            buf.push(x, len, y, c);
        }
        buf
    }

    #[test]
    fn push_coalesces() {
        let buf = buffer(&[(0, 2, 0, 255), (2, 3, 0, 255), (5, 1, 0, 128), (0, 1, 1, 128)]);
        assert_eq!(
            buf.spans(),
            &[
                Span { x: 0, len: 5, y: 0, coverage: 255 },
                Span { x: 5, len: 1, y: 0, coverage: 128 },
                Span { x: 0, len: 1, y: 1, coverage: 128 },
            ]
        );
    }

    #[test]
    fn intersect_with_full_rect_is_identity() {
        let a = buffer(&[
            (3, 4, 1, 200),
            (7, 2, 1, 17),
            (0, 10, 2, 255),
            (5, 1, 4, 1),
            (9, 1, 4, 90),
        ]);
        let full = SpanBuffer::from_rect(0, 0, 10, 10);
        let mut out = SpanBuffer::new();
        out.intersect(&a, &full);
        assert_eq!(out, a);
        out.intersect(&full, &a);
        assert_eq!(out, a);
    }

    #[test]
    fn intersect_multiplies_coverage() {
        let a = buffer(&[(0, 10, 0, 128)]);
        let b = buffer(&[(5, 10, 0, 128), (0, 4, 1, 255)]);
        let mut out = SpanBuffer::new();
        out.intersect(&a, &b);
        assert_eq!(out.spans(), &[Span { x: 5, len: 5, y: 0, coverage: 64 }]);
    }

    #[test]
    fn disjoint_rows_are_empty() {
        let a = SpanBuffer::from_rect(0, 0, 10, 2);
        let b = SpanBuffer::from_rect(0, 5, 10, 2);
        let mut out = SpanBuffer::new();
        out.intersect(&a, &b);
        assert!(out.is_empty());
        assert_eq!(out.extents(), Rect::ZERO);
    }

    #[test]
    fn extents() {
        let buf = buffer(&[(3, 4, 1, 200), (1, 2, 2, 255), (5, 5, 6, 10)]);
        assert_eq!(buf.extents(), Rect::new(1.0, 1.0, 10.0, 7.0));
        assert_eq!(SpanBuffer::from_rect(2, 3, 4, 5).extents(), Rect::new(2.0, 3.0, 6.0, 8.0));
    }
}

// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An exact-area cell rasterizer.
//!
//! Outlines are walked in 24.8 fixed point. Every line segment deposits signed `cover` (the
//! vertical extent crossed inside a pixel) and `area` (cover weighted by the horizontal
//! position) into the cells of the pixels it touches. Sweeping each scanline from left to
//! right then turns the running sum of covers, corrected by the cell areas, into exact
//! per-pixel coverage.
//!
//! Cells live in a fixed-size pool together with the per-scanline list heads. The outline is
//! processed in horizontal bands; when a band does not fit into the pool it is split in half
//! and retried, and once a single scanline overflows the pool is doubled.

use log::{debug, warn};

use crate::flatten::{self, Callback, FLATTEN_TOLERANCE};
use crate::kurbo::Rect;
use crate::math::MAX_COORD;
use crate::path::PathEl;
use crate::peniko::Fill;
use crate::span::SpanBuffer;

/// The number of fractional bits of rasterizer coordinates.
pub const PIXEL_BITS: u32 = 8;
const ONE_PIXEL: i64 = 1 << PIXEL_BITS;
const NONE: u32 = u32::MAX;

#[inline]
fn trunc(x: i64) -> i64 {
    x >> PIXEL_BITS
}

#[inline]
fn subpixels(x: i64) -> i64 {
    x << PIXEL_BITS
}

/// Floor division that also returns the non-negative remainder.
#[inline]
fn div_mod(dividend: i64, divisor: i64) -> (i64, i64) {
    (dividend.div_euclid(divisor), dividend.rem_euclid(divisor))
}

/// Memory limits of the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterSettings {
    /// Size of the cell pool in bytes, shared between scanline heads and cells.
    pub pool_bytes: usize,
    /// Initial height of a band in scanlines.
    pub band_height: u32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            pool_bytes: 16 * 1024,
            band_height: 32,
        }
    }
}

/// The cell pool of the current band is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PoolOverflow;

#[derive(Debug, Clone, Copy)]
struct Cell {
    x: i32,
    cover: i32,
    area: i64,
    next: u32,
}

/// A flattened outline in 24.8 fixed point.
#[derive(Debug, Default)]
struct Outline {
    points: Vec<(i64, i64)>,
    /// One past the last point of each contour.
    contour_ends: Vec<usize>,
    /// Start of the most recent contour, reused by lines following a close.
    start: (i64, i64),
    has_nan: bool,
}

impl Outline {
    fn clear(&mut self) {
        self.points.clear();
        self.contour_ends.clear();
        self.start = (0, 0);
        self.has_nan = false;
    }

    fn contour_start(&self) -> usize {
        self.contour_ends.last().copied().unwrap_or(0)
    }

    fn end_contour(&mut self) {
        if self.points.len() > self.contour_start() {
            self.contour_ends.push(self.points.len());
        }
    }

    fn contours(&self) -> impl Iterator<Item = &[(i64, i64)]> + '_ {
        let mut start = 0;
        self.contour_ends.iter().map(move |&end| {
            let c = &self.points[start..end];
            start = end;
            c
        })
    }

    /// The bounding box in whole pixels, `[x0, y0, x1, y1)`.
    fn cbox(&self) -> Option<[i64; 4]> {
        let (&(x, y), rest) = self.points.split_first()?;
        let [x0, y0, x1, y1] = rest.iter().fold([x, y, x, y], |[x0, y0, x1, y1], &(x, y)| {
            [x0.min(x), y0.min(y), x1.max(x), y1.max(y)]
        });
        Some([
            trunc(x0),
            trunc(y0),
            trunc(x1 + ONE_PIXEL - 1),
            trunc(y1 + ONE_PIXEL - 1),
        ])
    }
}

impl Callback for Outline {
    fn callback(&mut self, el: PathEl) {
        match el {
            PathEl::MoveTo(_) => self.end_contour(),
            PathEl::Close(_) => {
                self.end_contour();
                return;
            }
            _ => {}
        }
        let p = el.end_point();
        self.has_nan |= p.is_nan();
        let fix = |v: f64| (v.clamp(-MAX_COORD, MAX_COORD) * ONE_PIXEL as f64).round() as i64;
        let p = (fix(p.x), fix(p.y));
        if matches!(el, PathEl::MoveTo(_)) {
            self.start = p;
        } else if self.points.len() == self.contour_start() {
            self.points.push(self.start);
        }
        self.points.push(p);
    }
}

/// Converts outlines into coverage spans.
///
/// A rasterizer keeps its buffers between calls, so reusing one avoids allocations.
#[derive(Debug)]
pub struct Rasterizer {
    settings: RasterSettings,
    band_height: i64,
    outline: Outline,
    cells: Vec<Cell>,
    max_cells: usize,
    ycells: Vec<u32>,
    // The cell being accumulated, relative to the band origin.
    ex: i64,
    ey: i64,
    area: i64,
    cover: i64,
    invalid: bool,
    // Horizontal clip and current band, in absolute pixels.
    min_ex: i64,
    max_ex: i64,
    min_ey: i64,
    max_ey: i64,
    count_ex: i64,
    count_ey: i64,
    // Pen position in 24.8.
    x: i64,
    y: i64,
    last_ey: i64,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(RasterSettings::default())
    }
}

impl Rasterizer {
    /// Create a rasterizer with the given memory limits.
    pub fn new(settings: RasterSettings) -> Self {
        Self {
            settings,
            band_height: i64::from(settings.band_height.max(1)),
            outline: Outline::default(),
            cells: Vec::new(),
            max_cells: 0,
            ycells: Vec::new(),
            ex: 0,
            ey: 0,
            area: 0,
            cover: 0,
            invalid: true,
            min_ex: 0,
            max_ex: 0,
            min_ey: 0,
            max_ey: 0,
            count_ex: 0,
            count_ey: 0,
            x: 0,
            y: 0,
            last_ey: 0,
        }
    }

    /// The memory limits.
    pub fn settings(&self) -> RasterSettings {
        self.settings
    }

    /// Rasterize a device-space path into `out`, restricted to `clip` when given.
    ///
    /// Curves are flattened first and every contour is implicitly closed.
    pub fn render(
        &mut self,
        path: impl IntoIterator<Item = PathEl>,
        fill: Fill,
        clip: Option<Rect>,
        out: &mut SpanBuffer,
    ) {
        out.reset();
        let mut outline = core::mem::take(&mut self.outline);
        outline.clear();
        flatten::flatten(path, FLATTEN_TOLERANCE, &mut outline);
        outline.end_contour();
        if outline.has_nan {
            warn!("A path contains NaN, ignoring it.");
        } else {
            self.render_outline(&outline, fill, clip, out);
        }
        self.outline = outline;
    }

    fn render_outline(
        &mut self,
        outline: &Outline,
        fill: Fill,
        clip: Option<Rect>,
        out: &mut SpanBuffer,
    ) {
        let Some([mut min_ex, mut min_ey, mut max_ex, mut max_ey]) = outline.cbox() else {
            return;
        };
        if let Some(clip) = clip {
            let clip = clip.abs();
            let (cx0, cy0) = (clip.x0.floor() as i64, clip.y0.floor() as i64);
            let (cx1, cy1) = (clip.x1.ceil() as i64, clip.y1.ceil() as i64);
            if max_ex <= cx0 || min_ex >= cx1 || max_ey <= cy0 || min_ey >= cy1 {
                return;
            }
            min_ex = min_ex.max(cx0);
            min_ey = min_ey.max(cy0);
            max_ex = max_ex.min(cx1);
            max_ey = max_ey.min(cy1);
        }
        if min_ex >= max_ex || min_ey >= max_ey {
            return;
        }
        self.min_ex = min_ex;
        self.max_ex = max_ex;
        self.count_ex = max_ex - min_ex;

        let mut pool_bytes = self.settings.pool_bytes;
        let mut band_shoot = 0;
        let mut band_min = min_ey;
        while band_min < max_ey {
            let band_max = (band_min + self.band_height).min(max_ey);
            let mut bands = vec![(band_min, band_max)];
            while let Some((bottom, top)) = bands.pop() {
                match self.render_band(outline, bottom, top, pool_bytes) {
                    Ok(()) => self.sweep(fill, out),
                    Err(PoolOverflow) => {
                        let middle = bottom + ((top - bottom) >> 1);
                        if middle == bottom {
                            // A single scanline never fits: grow the pool.
                            pool_bytes *= 2;
                            debug!("raster pool overflow, growing to {pool_bytes} bytes");
                            bands.push((bottom, top));
                            continue;
                        }
                        if top - bottom >= self.band_height {
                            band_shoot += 1;
                        }
                        debug!("raster pool overflow, splitting band {bottom}..{top}");
                        bands.push((middle, top));
                        bands.push((bottom, middle));
                    }
                }
            }
            band_min = band_max;
        }
        if band_shoot > 8 && self.band_height > 16 {
            self.band_height /= 2;
        }
    }

    /// Accumulate the cells of scanlines `min..max`.
    fn render_band(
        &mut self,
        outline: &Outline,
        min: i64,
        max: i64,
        pool_bytes: usize,
    ) -> Result<(), PoolOverflow> {
        let ycount = (max - min) as usize;
        let cell_size = size_of::<Cell>();
        let heads = (ycount * size_of::<u32>()).div_ceil(cell_size) * cell_size;
        if heads >= pool_bytes {
            return Err(PoolOverflow);
        }
        self.max_cells = (pool_bytes - heads) / cell_size;
        if self.max_cells < 2 {
            return Err(PoolOverflow);
        }
        self.ycells.clear();
        self.ycells.resize(ycount, NONE);
        self.cells.clear();

        self.invalid = true;
        self.min_ey = min;
        self.max_ey = max;
        self.count_ey = max - min;

        for contour in outline.contours() {
            let Some((first, rest)) = contour.split_first() else {
                continue;
            };
            self.move_to(first.0, first.1)?;
            for &(x, y) in rest {
                self.line_to(x, y)?;
            }
            self.line_to(first.0, first.1)?;
        }
        if !self.invalid {
            self.record_cell()?;
        }
        Ok(())
    }

    fn find_cell(&mut self) -> Result<usize, PoolOverflow> {
        let x = self.ex.min(self.count_ex) as i32;
        let row = self.ey as usize;
        let mut prev = None;
        let mut cur = self.ycells[row];
        while cur != NONE {
            let cell = &self.cells[cur as usize];
            if cell.x > x {
                break;
            }
            if cell.x == x {
                return Ok(cur as usize);
            }
            prev = Some(cur as usize);
            cur = cell.next;
        }
        if self.cells.len() >= self.max_cells {
            return Err(PoolOverflow);
        }
        let index = self.cells.len();
        self.cells.push(Cell {
            x,
            cover: 0,
            area: 0,
            next: cur,
        });
        match prev {
            Some(p) => self.cells[p].next = index as u32,
            None => self.ycells[row] = index as u32,
        }
        Ok(index)
    }

    fn record_cell(&mut self) -> Result<(), PoolOverflow> {
        if self.area | self.cover != 0 {
            let index = self.find_cell()?;
            let cell = &mut self.cells[index];
            cell.area += self.area;
            cell.cover += self.cover as i32;
        }
        Ok(())
    }

    /// Move to the cell `(ex, ey)` in absolute pixels, recording the current one.
    fn set_cell(&mut self, ex: i64, ey: i64) -> Result<(), PoolOverflow> {
        // Everything left of the clip collapses into column -1.
        let ey = ey - self.min_ey;
        let ex = (ex.min(self.max_ex) - self.min_ex).max(-1);
        if ex != self.ex || ey != self.ey {
            if !self.invalid {
                self.record_cell()?;
            }
            self.area = 0;
            self.cover = 0;
            self.ex = ex;
            self.ey = ey;
        }
        self.invalid = ey < 0 || ey >= self.count_ey || ex >= self.count_ex;
        Ok(())
    }

    fn start_cell(&mut self, ex: i64, ey: i64) -> Result<(), PoolOverflow> {
        let ex = ex.min(self.max_ex).max(self.min_ex - 1);
        self.area = 0;
        self.cover = 0;
        self.ex = ex - self.min_ex;
        self.ey = ey - self.min_ey;
        self.last_ey = subpixels(ey);
        self.invalid = false;
        self.set_cell(ex, ey)
    }

    fn move_to(&mut self, x: i64, y: i64) -> Result<(), PoolOverflow> {
        if !self.invalid {
            self.record_cell()?;
        }
        self.start_cell(trunc(x), trunc(y))?;
        self.x = x;
        self.y = y;
        Ok(())
    }

    /// Render the part of a line inside scanline `ey`; `y1` and `y2` are fractional.
    fn render_scanline(
        &mut self,
        ey: i64,
        x1: i64,
        y1: i64,
        x2: i64,
        y2: i64,
    ) -> Result<(), PoolOverflow> {
        let mut dx = x2 - x1;
        let mut ex1 = trunc(x1);
        let ex2 = trunc(x2);
        let fx1 = x1 - subpixels(ex1);
        let fx2 = x2 - subpixels(ex2);

        if y1 == y2 {
            return self.set_cell(ex2, ey);
        }
        if ex1 == ex2 {
            let delta = y2 - y1;
            self.area += (fx1 + fx2) * delta;
            self.cover += delta;
            return Ok(());
        }

        // A run of adjacent cells on the same scanline.
        let (mut p, first, incr) = if dx < 0 {
            dx = -dx;
            (fx1 * (y2 - y1), 0, -1)
        } else {
            ((ONE_PIXEL - fx1) * (y2 - y1), ONE_PIXEL, 1)
        };
        let (mut delta, mut rem) = div_mod(p, dx);
        self.area += (fx1 + first) * delta;
        self.cover += delta;
        ex1 += incr;
        self.set_cell(ex1, ey)?;
        let mut y1 = y1 + delta;

        if ex1 != ex2 {
            p = ONE_PIXEL * (y2 - y1 + delta);
            let (lift, step) = div_mod(p, dx);
            rem -= dx;
            while ex1 != ex2 {
                delta = lift;
                rem += step;
                if rem >= 0 {
                    rem -= dx;
                    delta += 1;
                }
                self.area += ONE_PIXEL * delta;
                self.cover += delta;
                y1 += delta;
                ex1 += incr;
                self.set_cell(ex1, ey)?;
            }
        }
        let delta = y2 - y1;
        self.area += (fx2 + ONE_PIXEL - first) * delta;
        self.cover += delta;
        Ok(())
    }

    fn line_to(&mut self, to_x: i64, to_y: i64) -> Result<(), PoolOverflow> {
        let result = self.render_line(to_x, to_y);
        self.x = to_x;
        self.y = to_y;
        self.last_ey = subpixels(trunc(to_y));
        result
    }

    fn render_line(&mut self, to_x: i64, to_y: i64) -> Result<(), PoolOverflow> {
        let mut ey1 = trunc(self.last_ey);
        let ey2 = trunc(to_y);
        let fy1 = self.y - self.last_ey;
        let fy2 = to_y - subpixels(ey2);
        let dx = to_x - self.x;
        let mut dy = to_y - self.y;

        // Vertical clipping against the band.
        if ey1.min(ey2) >= self.max_ey || ey1.max(ey2) < self.min_ey {
            return Ok(());
        }

        if ey1 == ey2 {
            return self.render_scanline(ey1, self.x, fy1, to_x, fy2);
        }

        if dx == 0 {
            // Vertical lines touch a single column.
            let ex = trunc(self.x);
            let two_fx = (self.x - subpixels(ex)) << 1;
            let (first, incr) = if dy < 0 { (0, -1) } else { (ONE_PIXEL, 1) };
            let mut delta = first - fy1;
            self.area += two_fx * delta;
            self.cover += delta;
            ey1 += incr;
            self.set_cell(ex, ey1)?;

            delta = first + first - ONE_PIXEL;
            let area = two_fx * delta;
            while ey1 != ey2 {
                self.area += area;
                self.cover += delta;
                ey1 += incr;
                self.set_cell(ex, ey1)?;
            }
            delta = fy2 - ONE_PIXEL + first;
            self.area += two_fx * delta;
            self.cover += delta;
            return Ok(());
        }

        // Several scanlines.
        let (p, first, incr) = if dy < 0 {
            dy = -dy;
            (fy1 * dx, 0, -1)
        } else {
            ((ONE_PIXEL - fy1) * dx, ONE_PIXEL, 1)
        };
        let (delta, mut rem) = div_mod(p, dy);
        let mut x = self.x + delta;
        self.render_scanline(ey1, self.x, fy1, x, first)?;
        ey1 += incr;
        self.set_cell(trunc(x), ey1)?;

        if ey1 != ey2 {
            let (lift, step) = div_mod(ONE_PIXEL * dx, dy);
            rem -= dy;
            while ey1 != ey2 {
                let mut delta = lift;
                rem += step;
                if rem >= 0 {
                    rem -= dy;
                    delta += 1;
                }
                let x2 = x + delta;
                self.render_scanline(ey1, x, ONE_PIXEL - first, x2, first)?;
                x = x2;
                ey1 += incr;
                self.set_cell(trunc(x), ey1)?;
            }
        }
        self.render_scanline(ey1, x, ONE_PIXEL - first, to_x, fy2)
    }

    /// Convert the cells of the current band into spans.
    fn sweep(&self, fill: Fill, out: &mut SpanBuffer) {
        for (row, &head) in self.ycells.iter().enumerate() {
            let y = row as i64 + self.min_ey;
            let mut cover: i64 = 0;
            let mut x: i64 = 0;
            let mut index = head;
            while index != NONE {
                let cell = &self.cells[index as usize];
                let cx = i64::from(cell.x);
                if cx > x && cover != 0 {
                    self.hline(out, fill, x, y, cover * (ONE_PIXEL * 2), cx - x);
                }
                cover += i64::from(cell.cover);
                let area = cover * (ONE_PIXEL * 2) - cell.area;
                if area != 0 && cx >= 0 {
                    self.hline(out, fill, cx, y, area, 1);
                }
                x = cx + 1;
                index = cell.next;
            }
            if self.count_ex > x && cover != 0 {
                self.hline(out, fill, x, y, cover * (ONE_PIXEL * 2), self.count_ex - x);
            }
        }
    }

    fn hline(&self, out: &mut SpanBuffer, fill: Fill, x: i64, y: i64, area: i64, count: i64) {
        let mut coverage = (area >> (PIXEL_BITS * 2 + 1 - 8)).abs();
        match fill {
            Fill::EvenOdd => {
                coverage &= 511;
                if coverage > 256 {
                    coverage = 512 - coverage;
                } else if coverage == 256 {
                    coverage = 255;
                }
            }
            Fill::NonZero => coverage = coverage.min(255),
        }
        let x = x + self.min_ex;
        out.push(x as i32, count as i32, y as i32, coverage as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::{RasterSettings, Rasterizer};
    use crate::kurbo::Rect;
    use crate::path::Path;
    use crate::peniko::Fill;
    use crate::span::{Span, SpanBuffer};

    fn render(path: &Path, fill: Fill, clip: Option<Rect>) -> SpanBuffer {
        let mut out = SpanBuffer::new();
        Rasterizer::default().render(path.iter(), fill, clip, &mut out);
        out
    }

    fn coverage_sum(buf: &SpanBuffer) -> f64 {
        buf.spans()
            .iter()
            .map(|s| f64::from(s.coverage) * f64::from(s.len))
            .sum::<f64>()
            / 255.0
    }

    #[test]
    fn aligned_rect_is_opaque_and_bounded() {
        let mut p = Path::new();
        p.add_rect(2.0, 3.0, 5.0, 4.0);
        let buf = render(&p, Fill::NonZero, None);
        let expected: Vec<Span> = (3..7)
            .map(|y| Span { x: 2, len: 5, y, coverage: 255 })
            .collect();
        assert_eq!(buf.spans(), expected);
        assert_eq!(buf.extents(), Rect::new(2.0, 3.0, 7.0, 7.0));
    }

    #[test]
    fn half_pixel_edges() {
        let mut p = Path::new();
        p.add_rect(0.5, 0.0, 2.0, 1.0);
        let buf = render(&p, Fill::NonZero, None);
        assert_eq!(
            buf.spans(),
            &[
                Span { x: 0, len: 1, y: 0, coverage: 128 },
                Span { x: 1, len: 1, y: 0, coverage: 255 },
                Span { x: 2, len: 1, y: 0, coverage: 128 },
            ]
        );
    }

    #[test]
    fn triangle_area() {
        let mut p = Path::new();
        p.move_to((0.0, 0.0));
        p.line_to((40.0, 0.0));
        p.line_to((0.0, 30.0));
        p.close();
        let buf = render(&p, Fill::NonZero, None);
        assert!((coverage_sum(&buf) - 600.0).abs() < 2.0);
        assert!(buf.spans().iter().all(|s| s.coverage > 0));
    }

    #[test]
    fn circle_area() {
        let mut p = Path::new();
        p.add_circle(50.0, 50.0, 40.0);
        let buf = render(&p, Fill::NonZero, None);
        let expected = core::f64::consts::PI * 1600.0;
        assert!((coverage_sum(&buf) - expected).abs() < 10.0);
    }

    #[test]
    fn fill_rules_agree_on_simple_polygons() {
        let mut p = Path::new();
        p.move_to((3.3, 1.7));
        p.line_to((40.2, 10.1));
        p.line_to((25.0, 37.9));
        p.line_to((5.5, 20.25));
        p.close();
        p.add_ellipse(70.0, 30.0, 12.5, 20.0);
        assert_eq!(render(&p, Fill::NonZero, None), render(&p, Fill::EvenOdd, None));
    }

    #[test]
    fn even_odd_punches_holes() {
        let mut p = Path::new();
        p.add_rect(0.0, 0.0, 10.0, 10.0);
        p.add_rect(2.0, 2.0, 6.0, 6.0);
        let non_zero = render(&p, Fill::NonZero, None);
        let even_odd = render(&p, Fill::EvenOdd, None);
        assert_eq!(coverage_sum(&non_zero), 100.0);
        assert_eq!(coverage_sum(&even_odd), 64.0);
    }

    #[test]
    fn clip_rect_limits_spans() {
        let mut p = Path::new();
        p.add_rect(-10.0, -10.0, 100.0, 100.0);
        let clip = Rect::new(0.0, 0.0, 8.0, 6.0);
        let buf = render(&p, Fill::NonZero, Some(clip));
        assert_eq!(buf, SpanBuffer::from_rect(0, 0, 8, 6));
        let outside = Rect::new(200.0, 200.0, 210.0, 210.0);
        assert!(render(&p, Fill::NonZero, Some(outside)).is_empty());
    }

    #[test]
    fn tiny_pool_gives_identical_result() {
        let mut p = Path::new();
        for i in 0..20 {
            let r = 5.0 + f64::from(i) * 2.3;
            p.add_circle(60.0, 60.0, r);
        }
        let reference = render(&p, Fill::EvenOdd, None);
        let mut small = Rasterizer::new(RasterSettings {
            pool_bytes: 256,
            band_height: 64,
        });
        let mut out = SpanBuffer::new();
        small.render(p.iter(), Fill::EvenOdd, None, &mut out);
        assert_eq!(out, reference);
        assert!(!out.is_empty());
    }

    #[test]
    fn nan_path_is_ignored() {
        let mut p = Path::new();
        p.add_rect(0.0, 0.0, f64::NAN, 4.0);
        assert!(render(&p, Fill::NonZero, None).is_empty());
    }
}

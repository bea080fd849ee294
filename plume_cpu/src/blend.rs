// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositing coverage spans into a surface.
//!
//! Pixels are premultiplied `0xAARRGGBB`. Channel products use the usual integer
//! approximation of `x * a / 255`, two channels at a time.

use log::debug;
use plume_common::color::ColorExt;
use plume_common::kurbo::{Affine, Point, Vec2};
use plume_common::peniko::{Compose, Extend};
use plume_common::span::SpanBuffer;

use crate::paint::{Gradient, GradientKind, GradientStop, Paint, Texture, TextureKind};
use crate::Surface;

/// Number of entries in a gradient's color lookup table.
pub const COLOR_TABLE_SIZE: usize = 1024;

#[inline]
fn alpha(x: u32) -> u32 {
    x >> 24
}

/// Multiply every channel of `x` by `a / 255`.
#[inline]
pub(crate) fn byte_mul(x: u32, a: u32) -> u32 {
    let mut t = (x & 0x00ff_00ff) * a;
    t = (t + ((t >> 8) & 0x00ff_00ff) + 0x0080_0080) >> 8;
    t &= 0x00ff_00ff;
    let mut x = ((x >> 8) & 0x00ff_00ff) * a;
    x = x + ((x >> 8) & 0x00ff_00ff) + 0x0080_0080;
    x &= 0xff00_ff00;
    x | t
}

/// `x * a / 255 + y * b / 255` per channel.
///
/// Exact for premultiplied pixels; other inputs wrap per channel.
#[inline]
pub(crate) fn interpolate(x: u32, a: u32, y: u32, b: u32) -> u32 {
    let mut t = (x & 0x00ff_00ff)
        .wrapping_mul(a)
        .wrapping_add((y & 0x00ff_00ff).wrapping_mul(b));
    t = t.wrapping_add((t >> 8) & 0x00ff_00ff).wrapping_add(0x0080_0080) >> 8;
    t &= 0x00ff_00ff;
    let mut x = ((x >> 8) & 0x00ff_00ff)
        .wrapping_mul(a)
        .wrapping_add(((y >> 8) & 0x00ff_00ff).wrapping_mul(b));
    x = x.wrapping_add((x >> 8) & 0x00ff_00ff).wrapping_add(0x0080_0080);
    x &= 0xff00_ff00;
    x | t
}

#[inline]
fn saturating_add(x: u32, y: u32) -> u32 {
    let [xa, xr, xg, xb] = x.to_be_bytes();
    let [ya, yr, yg, yb] = y.to_be_bytes();
    u32::from_be_bytes([
        xa.saturating_add(ya),
        xr.saturating_add(yr),
        xg.saturating_add(yg),
        xb.saturating_add(yb),
    ])
}

/// Composite source pixel `s` onto destination `d` with constant alpha `ca` in `0..=255`.
pub(crate) fn composite(op: Compose, s: u32, d: u32, ca: u32) -> u32 {
    let cia = 255 - ca;
    match op {
        Compose::Clear => byte_mul(d, cia),
        Compose::Copy => {
            if ca == 255 {
                s
            } else {
                interpolate(s, ca, d, cia)
            }
        }
        Compose::Dest => d,
        Compose::SrcOver => {
            let s = byte_mul(s, ca);
            s.wrapping_add(byte_mul(d, 255 - alpha(s)))
        }
        Compose::DestOver => {
            let s = byte_mul(s, ca);
            d.wrapping_add(byte_mul(s, 255 - alpha(d)))
        }
        Compose::SrcIn => interpolate(byte_mul(s, alpha(d)), ca, d, cia),
        Compose::DestIn => byte_mul(d, byte_mul(alpha(s), ca) + cia),
        Compose::SrcOut => interpolate(byte_mul(s, 255 - alpha(d)), ca, d, cia),
        Compose::DestOut => byte_mul(d, byte_mul(255 - alpha(s), ca) + cia),
        Compose::SrcAtop => {
            let s = byte_mul(s, ca);
            interpolate(s, alpha(d), d, 255 - alpha(s))
        }
        Compose::DestAtop => {
            let s = byte_mul(s, ca);
            let a = alpha(s) + cia;
            interpolate(d, a, s, 255 - alpha(d))
        }
        Compose::Xor => {
            let s = byte_mul(s, ca);
            interpolate(s, 255 - alpha(d), d, 255 - alpha(s))
        }
        Compose::Plus | Compose::PlusLighter => saturating_add(byte_mul(s, ca), d),
    }
}

/// A gradient's colors, premultiplied and sampled at [`COLOR_TABLE_SIZE`] positions.
#[derive(Debug, Clone)]
pub(crate) struct GradientLut(Vec<u32>);

impl GradientLut {
    pub(crate) fn new(stops: &[GradientStop]) -> Self {
        let mut table = Vec::with_capacity(COLOR_TABLE_SIZE);
        let Some((first, rest)) = stops.split_first() else {
            table.resize(COLOR_TABLE_SIZE, 0);
            return Self(table);
        };
        let incr = 1.0 / COLOR_TABLE_SIZE as f32;
        let mut fpos = 0.0_f32;
        let mut curr = first;
        let mut curr_color = curr.color.to_premul_argb32();
        while fpos <= curr.offset && table.len() < COLOR_TABLE_SIZE {
            table.push(curr_color);
            fpos += incr;
        }
        for next in rest {
            let next_color = next.color.to_premul_argb32();
            let delta = 1.0 / (next.offset - curr.offset);
            while fpos < next.offset && table.len() < COLOR_TABLE_SIZE {
                let t = (fpos - curr.offset) * delta;
                let dist = (255.0 * t) as u32;
                table.push(interpolate(curr_color, 255 - dist, next_color, dist));
                fpos += incr;
            }
            curr = next;
            curr_color = next_color;
        }
        table.resize(COLOR_TABLE_SIZE, curr_color);
        Self(table)
    }

    #[inline]
    pub(crate) fn get(&self, index: i32) -> u32 {
        self.0[index as usize]
    }
}

/// Map a table position to an index according to the extend mode.
#[inline]
fn extend_index(extend: Extend, pos: i32) -> i32 {
    const SIZE: i32 = COLOR_TABLE_SIZE as i32;
    match extend {
        Extend::Pad => pos.clamp(0, SIZE - 1),
        Extend::Repeat => pos.rem_euclid(SIZE),
        Extend::Reflect => {
            let pos = pos.rem_euclid(2 * SIZE);
            if pos >= SIZE {
                2 * SIZE - 1 - pos
            } else {
                pos
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Geometry {
    Linear {
        start: Point,
        /// Direction divided by its squared length, so `t = (p - start) . dir`.
        dir: Vec2,
    },
    Radial {
        focal: Point,
        /// Center minus focal point.
        d: Vec2,
        fr: f64,
        dr: f64,
        a: f64,
    },
}

#[derive(Debug)]
pub(crate) struct GradientSource {
    lut: GradientLut,
    extend: Extend,
    inverse: Affine,
    geometry: Geometry,
}

impl GradientSource {
    fn new(gradient: &Gradient, transform: &Affine) -> Option<Self> {
        let inverse = invert(&(*transform * gradient.transform))?;
        let geometry = match gradient.kind {
            GradientKind::Linear { x1, y1, x2, y2 } => {
                let dir = Vec2::new(x2 - x1, y2 - y1);
                let len2 = dir.hypot2();
                Geometry::Linear {
                    start: Point::new(x1, y1),
                    dir: if len2 == 0.0 { Vec2::ZERO } else { dir / len2 },
                }
            }
            GradientKind::Radial {
                cx,
                cy,
                cr,
                fx,
                fy,
                fr,
            } => {
                let d = Vec2::new(cx - fx, cy - fy);
                let dr = cr - fr;
                Geometry::Radial {
                    focal: Point::new(fx, fy),
                    d,
                    fr,
                    dr,
                    a: dr * dr - d.hypot2(),
                }
            }
        };
        Some(Self {
            lut: GradientLut::new(&gradient.stops),
            extend: gradient.extend,
            inverse,
            geometry,
        })
    }

    /// The gradient parameter at a point in gradient space, or `None` where it is undefined.
    fn t(&self, p: Point) -> Option<f64> {
        match self.geometry {
            Geometry::Linear { start, dir } => Some((p - start).dot(dir)),
            Geometry::Radial {
                focal,
                d,
                fr,
                dr,
                a,
            } => {
                let r = p - focal;
                let b = 2.0 * (dr * fr + r.dot(d));
                let c = fr * fr - r.hypot2();
                if a == 0.0 {
                    if b == 0.0 {
                        return None;
                    }
                    let t = -c / b;
                    return (fr + t * dr >= 0.0).then_some(t);
                }
                let det = b * b - 4.0 * a * c;
                if det < 0.0 {
                    return None;
                }
                let w = det.sqrt();
                let t0 = (-b + w) / (2.0 * a);
                let t1 = (-b - w) / (2.0 * a);
                let (hi, lo) = if t0 > t1 { (t0, t1) } else { (t1, t0) };
                if fr + hi * dr >= 0.0 {
                    Some(hi)
                } else if fr + lo * dr >= 0.0 {
                    Some(lo)
                } else {
                    None
                }
            }
        }
    }

    fn fetch(&self, x: i32, y: i32, out: &mut [u32]) {
        let mut p = self.inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
        let step = Vec2::new(self.inverse.as_coeffs()[0], self.inverse.as_coeffs()[1]);
        let scale = (COLOR_TABLE_SIZE - 1) as f64;
        for px in out {
            *px = match self.t(p) {
                Some(t) if t.is_finite() => {
                    let pos = (t * scale + 0.5).clamp(i32::MIN as f64, i32::MAX as f64);
                    self.lut.get(extend_index(self.extend, pos.floor() as i32))
                }
                _ => 0,
            };
            p += step;
        }
    }
}

#[derive(Debug)]
pub(crate) struct TextureSource<'a> {
    texture: &'a Texture,
    inverse: Affine,
}

impl TextureSource<'_> {
    fn fetch(&self, x: i32, y: i32, out: &mut [u32]) {
        let surface = &self.texture.surface;
        let (w, h) = (i64::from(surface.width()), i64::from(surface.height()));
        let coeffs = self.inverse.as_coeffs();
        let mut p = self.inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
        let step = Vec2::new(coeffs[0], coeffs[1]);
        let axis_aligned = coeffs[1] == 0.0;
        // Without rotation or shear the source row is the same for the whole span.
        let row_y = p.y.floor() as i64;
        for px in out {
            let mut sx = p.x.floor() as i64;
            let mut sy = if axis_aligned { row_y } else { p.y.floor() as i64 };
            *px = match self.texture.kind {
                TextureKind::Tiled => {
                    sx = sx.rem_euclid(w);
                    sy = sy.rem_euclid(h);
                    surface.row(sy as u32)[sx as usize]
                }
                TextureKind::Plain if (0..w).contains(&sx) && (0..h).contains(&sy) => {
                    surface.row(sy as u32)[sx as usize]
                }
                TextureKind::Plain => 0,
            };
            p += step;
        }
    }
}

fn invert(m: &Affine) -> Option<Affine> {
    let det = m.determinant();
    if det == 0.0 || !det.is_finite() {
        debug!("Skipping a paint with a singular transform.");
        return None;
    }
    Some(m.inverse())
}

/// A paint resolved against a device transform, ready to produce pixels.
#[derive(Debug)]
pub(crate) enum Source<'a> {
    Solid(u32),
    Gradient(GradientSource),
    Texture(TextureSource<'a>),
}

impl<'a> Source<'a> {
    /// Resolve `paint` drawn under `transform`; `None` when nothing would be visible.
    pub(crate) fn new(paint: &'a Paint, transform: &Affine) -> Option<Self> {
        match paint {
            Paint::Color(color) => Some(Self::Solid(color.to_premul_argb32())),
            Paint::Gradient(gradient) => {
                let source = GradientSource::new(gradient, transform)?;
                (!gradient.stops.is_empty()).then_some(Self::Gradient(source))
            }
            Paint::Texture(texture) => Some(Self::Texture(TextureSource {
                texture,
                inverse: invert(&(*transform * texture.transform))?,
            })),
        }
    }

    /// Extra opacity contributed by the source itself.
    fn opacity(&self) -> f32 {
        match self {
            Self::Texture(t) => t.texture.opacity,
            _ => 1.0,
        }
    }
}

/// Composite `source` into `surface` under the coverage of `spans`.
pub(crate) fn blend(
    surface: &mut Surface,
    op: Compose,
    source: &Source<'_>,
    opacity: f32,
    spans: &SpanBuffer,
) {
    let opacity = (opacity * source.opacity()).clamp(0.0, 1.0);
    let opacity = (opacity * 255.0 + 0.5) as u32;
    let (width, height) = (surface.width() as i32, surface.height() as i32);
    let mut buf = Vec::new();
    for span in spans.spans() {
        if span.y < 0 || span.y >= height {
            continue;
        }
        let x0 = span.x.max(0);
        let x1 = (span.x + span.len).min(width);
        if x0 >= x1 {
            continue;
        }
        let ca = byte_mul_scalar(u32::from(span.coverage), opacity);
        let row = &mut surface.row_mut(span.y as u32)[x0 as usize..x1 as usize];
        match source {
            Source::Solid(s) => {
                for d in row {
                    *d = composite(op, *s, *d, ca);
                }
            }
            Source::Gradient(g) => {
                buf.resize(row.len(), 0);
                g.fetch(x0, span.y, &mut buf);
                for (d, s) in row.iter_mut().zip(&buf) {
                    *d = composite(op, *s, *d, ca);
                }
            }
            Source::Texture(t) => {
                buf.resize(row.len(), 0);
                t.fetch(x0, span.y, &mut buf);
                for (d, s) in row.iter_mut().zip(&buf) {
                    *d = composite(op, *s, *d, ca);
                }
            }
        }
    }
}

#[inline]
fn byte_mul_scalar(x: u32, a: u32) -> u32 {
    let t = x * a + 128;
    (t + (t >> 8)) >> 8
}

#[cfg(test)]
mod tests {
    use super::{byte_mul, composite, extend_index, interpolate, GradientLut, COLOR_TABLE_SIZE};
    use crate::paint::GradientStop;
    use plume_common::color::{Color, ColorExt};
    use plume_common::peniko::{Compose, Extend};

    const RED: u32 = 0xFFFF_0000;
    const HALF_BLUE: u32 = 0x8000_0080;

    #[test]
    fn byte_mul_extremes() {
        assert_eq!(byte_mul(0x1234_5678, 255), 0x1234_5678);
        assert_eq!(byte_mul(0x1234_5678, 0), 0);
        assert_eq!(byte_mul(0xFFFF_FFFF, 128), 0x8080_8080);
        assert_eq!(interpolate(RED, 255, 0xFF00_FF00, 0), RED);
    }

    #[test]
    fn porter_duff_full_coverage() {
        assert_eq!(composite(Compose::Clear, RED, HALF_BLUE, 255), 0);
        assert_eq!(composite(Compose::Copy, HALF_BLUE, RED, 255), HALF_BLUE);
        assert_eq!(composite(Compose::Dest, HALF_BLUE, RED, 255), RED);
        assert_eq!(composite(Compose::SrcOver, RED, HALF_BLUE, 255), RED);
        assert_eq!(composite(Compose::SrcOver, HALF_BLUE, RED, 255), 0xFF7F_0080);
        assert_eq!(composite(Compose::DestOver, HALF_BLUE, RED, 255), RED);
        assert_eq!(composite(Compose::SrcIn, RED, HALF_BLUE, 255), 0x8080_0000);
        assert_eq!(composite(Compose::SrcIn, RED, 0, 255), 0);
        assert_eq!(composite(Compose::DestIn, HALF_BLUE, RED, 255), 0x8080_0000);
        assert_eq!(composite(Compose::SrcOut, RED, RED, 255), 0);
        assert_eq!(composite(Compose::DestOut, RED, HALF_BLUE, 255), 0);
        assert_eq!(composite(Compose::SrcAtop, HALF_BLUE, 0, 255), 0);
        assert_eq!(composite(Compose::DestAtop, HALF_BLUE, 0, 255), HALF_BLUE);
        assert_eq!(composite(Compose::Xor, RED, RED, 255), 0);
        assert_eq!(composite(Compose::Plus, RED, 0xFF00_00FF, 255), 0xFFFF_00FF);
    }

    #[test]
    fn unpremultiplied_input_wraps() {
        const STRAIGHT: u32 = 0x80FF_FFFF;
        const WHITE: u32 = 0xFFFF_FFFF;
        assert_eq!(
            composite(Compose::SrcOver, STRAIGHT, WHITE, 255),
            STRAIGHT.wrapping_add(0x7F7F_7F7F)
        );
        for op in [
            Compose::Clear,
            Compose::Copy,
            Compose::Dest,
            Compose::SrcOver,
            Compose::DestOver,
            Compose::SrcIn,
            Compose::DestIn,
            Compose::SrcOut,
            Compose::DestOut,
            Compose::SrcAtop,
            Compose::DestAtop,
            Compose::Xor,
            Compose::Plus,
        ] {
            for ca in [0, 128, 255] {
                composite(op, STRAIGHT, WHITE, ca);
                composite(op, WHITE, STRAIGHT, ca);
                composite(op, 0x00FF_FFFF, 0x00FF_FFFF, ca);
            }
        }
    }

    #[test]
    fn partial_coverage_blends_toward_destination() {
        assert_eq!(composite(Compose::SrcOver, RED, 0, 128), 0x8080_0000);
        assert_eq!(composite(Compose::Copy, RED, 0, 0), 0);
        assert_eq!(composite(Compose::Clear, RED, RED, 0), RED);
    }

    #[test]
    fn extend_modes() {
        let last = COLOR_TABLE_SIZE as i32 - 1;
        assert_eq!(extend_index(Extend::Pad, -5), 0);
        assert_eq!(extend_index(Extend::Pad, last + 10), last);
        assert_eq!(extend_index(Extend::Repeat, last + 1), 0);
        assert_eq!(extend_index(Extend::Repeat, -1), last);
        assert_eq!(extend_index(Extend::Reflect, last + 1), last);
        assert_eq!(extend_index(Extend::Reflect, -1), 0);
    }

    #[test]
    fn lut_endpoints() {
        let stops = [
            GradientStop {
                offset: 0.0,
                color: Color::WHITE,
            },
            GradientStop {
                offset: 1.0,
                color: Color::BLACK,
            },
        ];
        let lut = GradientLut::new(&stops);
        assert_eq!(lut.get(0), Color::WHITE.to_premul_argb32());
        // The last entry sits just short of the final stop.
        let last = lut.get(COLOR_TABLE_SIZE as i32 - 1);
        assert_eq!(last >> 24, 0xFF);
        assert!(last & 0xFF <= 1);
        let mid = lut.get(COLOR_TABLE_SIZE as i32 / 2) & 0xFF;
        assert!((120..=135).contains(&mid), "{mid}");
    }
}

// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-point arithmetic and CORDIC trigonometry.
//!
//! Positions are 26.6 fixed point, scalars are 16.16 and angles are 16.16 degrees.
//! The trigonometric functions are the classic pseudo-rotation kernels; they are exact
//! enough for stroking and fully deterministic across platforms.

/// A 16.16 fixed-point scalar.
pub type Fixed = i64;
/// A 26.6 fixed-point coordinate.
pub type Pos = i64;
/// An angle in 16.16 fixed-point degrees.
pub type Angle = i64;

/// Device coordinates are clamped to this many pixels from the origin before conversion
/// to fixed point.
pub const MAX_COORD: f64 = (1 << 22) as f64;

/// Half a turn.
pub const ANGLE_PI: Angle = 180 << 16;
/// A full turn.
pub const ANGLE_2PI: Angle = ANGLE_PI * 2;
/// A quarter turn.
pub const ANGLE_PI2: Angle = ANGLE_PI / 2;
/// An eighth of a turn.
pub const ANGLE_PI4: Angle = ANGLE_PI / 4;

const TRIG_SCALE: u64 = 0xDBD9_5B16;
const TRIG_SAFE_MSB: i32 = 29;
const TRIG_MAX_ITERS: usize = 23;

const ARCTAN_TABLE: [Angle; TRIG_MAX_ITERS - 1] = [
    1740967, 919879, 466945, 234379, 117304, 58666, 29335, 14668, 7334, 3667, 1833, 917, 458,
    229, 115, 57, 29, 14, 7, 4, 2, 1,
];

/// A vector with fixed-point components.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Vector {
    /// Horizontal component.
    pub x: i64,
    /// Vertical component.
    pub y: i64,
}

impl Vector {
    /// Create a new vector.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl core::ops::Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Convert a float to 26.6, clamped to [`MAX_COORD`].
#[inline]
pub fn to_pos(v: f64) -> Pos {
    (v.clamp(-MAX_COORD, MAX_COORD) * 64.0).round() as Pos
}

/// Convert 26.6 to a float.
#[inline]
pub fn from_pos(v: Pos) -> f64 {
    v as f64 / 64.0
}

/// Convert a float to 16.16.
#[inline]
pub fn to_fixed(v: f64) -> Fixed {
    (v * 65536.0).round() as Fixed
}

/// Compute `a * b / 0x10000` with rounding.
#[inline]
pub fn mul_fix(a: Fixed, b: Fixed) -> Fixed {
    let ab = a as i128 * b as i128;
    let ab = ab + 0x8000 + (ab >> 127);
    (ab >> 16) as Fixed
}

/// Compute `a * b / c` with rounding, saturating on division by zero.
pub fn mul_div(a: i64, b: i64, c: i64) -> i64 {
    let negative = (a < 0) ^ (b < 0) ^ (c < 0);
    let (a, b, c) = (a.unsigned_abs() as u128, b.unsigned_abs() as u128, c.unsigned_abs() as u128);
    let d = if c > 0 {
        ((a * b + (c >> 1)) / c).min(i64::MAX as u128) as i64
    } else {
        0x7FFF_FFFF
    };
    if negative {
        -d
    } else {
        d
    }
}

/// Compute `a * 0x10000 / b` with rounding.
#[inline]
pub fn div_fix(a: Fixed, b: Fixed) -> Fixed {
    mul_div(a, 0x10000, b)
}

/// Normalize the signed difference `a2 - a1` to `(-PI, PI]`.
pub fn angle_diff(a1: Angle, a2: Angle) -> Angle {
    let mut delta = a2 - a1;
    while delta <= -ANGLE_PI {
        delta += ANGLE_2PI;
    }
    while delta > ANGLE_PI {
        delta -= ANGLE_2PI;
    }
    delta
}

fn msb(v: u64) -> i32 {
    63 - v.leading_zeros() as i32
}

fn downscale(val: i64) -> i64 {
    let v = ((val.unsigned_abs() * TRIG_SCALE + 0x1_0000_0000) >> 32) as i64;
    if val < 0 {
        -v
    } else {
        v
    }
}

/// Scale `vec` so its largest component uses the safe number of bits, returning the shift.
fn prenorm(vec: &mut Vector) -> i32 {
    let shift = msb(vec.x.unsigned_abs() | vec.y.unsigned_abs());
    if shift <= TRIG_SAFE_MSB {
        let shift = TRIG_SAFE_MSB - shift;
        vec.x <<= shift;
        vec.y <<= shift;
        shift
    } else {
        let shift = shift - TRIG_SAFE_MSB;
        vec.x >>= shift;
        vec.y >>= shift;
        -shift
    }
}

fn pseudo_rotate(vec: &mut Vector, mut theta: Angle) {
    let (mut x, mut y) = (vec.x, vec.y);
    while theta < -ANGLE_PI4 {
        let t = y;
        y = -x;
        x = t;
        theta += ANGLE_PI2;
    }
    while theta > ANGLE_PI4 {
        let t = -y;
        y = x;
        x = t;
        theta -= ANGLE_PI2;
    }
    let mut b = 1_i64;
    for (i, atan) in (1..TRIG_MAX_ITERS).zip(ARCTAN_TABLE) {
        let t;
        if theta < 0 {
            t = x + ((y + b) >> i);
            y -= (x + b) >> i;
            theta += atan;
        } else {
            t = x - ((y + b) >> i);
            y += (x + b) >> i;
            theta -= atan;
        }
        x = t;
        b <<= 1;
    }
    *vec = Vector::new(x, y);
}

/// Returns the length in `x` and the angle in `y`.
fn pseudo_polarize(vec: &mut Vector) {
    let (mut x, mut y) = (vec.x, vec.y);
    let mut theta;
    if y > x {
        if y > -x {
            theta = ANGLE_PI2;
            let t = y;
            y = -x;
            x = t;
        } else {
            theta = if y > 0 { ANGLE_PI } else { -ANGLE_PI };
            x = -x;
            y = -y;
        }
    } else if y < -x {
        theta = -ANGLE_PI2;
        let t = -y;
        y = x;
        x = t;
    } else {
        theta = 0;
    }
    let mut b = 1_i64;
    for (i, atan) in (1..TRIG_MAX_ITERS).zip(ARCTAN_TABLE) {
        let t;
        if y > 0 {
            t = x + ((y + b) >> i);
            y -= (x + b) >> i;
            theta += atan;
        } else {
            t = x - ((y + b) >> i);
            y += (x + b) >> i;
            theta -= atan;
        }
        x = t;
        b <<= 1;
    }
    // The error accumulates towards negative values.
    theta = if theta >= 0 {
        (theta + 8) & !15
    } else {
        -((-theta + 8) & !15)
    };
    *vec = Vector::new(x, theta);
}

/// The cosine of `angle` in 16.16.
pub fn cos(angle: Angle) -> Fixed {
    let mut v = Vector::new((TRIG_SCALE >> 8) as i64, 0);
    pseudo_rotate(&mut v, angle);
    (v.x + 0x80) >> 8
}

/// The sine of `angle` in 16.16.
pub fn sin(angle: Angle) -> Fixed {
    cos(ANGLE_PI2 - angle)
}

/// The tangent of `angle` in 16.16.
pub fn tan(angle: Angle) -> Fixed {
    let mut v = Vector::new(1 << 24, 0);
    pseudo_rotate(&mut v, angle);
    div_fix(v.y, v.x)
}

/// The angle of the vector `(dx, dy)`, zero for the zero vector.
pub fn atan2(dx: i64, dy: i64) -> Angle {
    if dx == 0 && dy == 0 {
        return 0;
    }
    let mut v = Vector::new(dx, dy);
    prenorm(&mut v);
    pseudo_polarize(&mut v);
    v.y
}

/// The unit vector at `angle`, components in 16.16.
pub fn unit(angle: Angle) -> Vector {
    let mut v = Vector::new((TRIG_SCALE >> 8) as i64, 0);
    pseudo_rotate(&mut v, angle);
    Vector::new((v.x + 0x80) >> 8, (v.y + 0x80) >> 8)
}

/// Rotate `vec` by `angle`.
pub fn rotate(vec: Vector, angle: Angle) -> Vector {
    if angle == 0 || vec == Vector::default() {
        return vec;
    }
    let mut v = vec;
    let shift = prenorm(&mut v);
    pseudo_rotate(&mut v, angle);
    let (x, y) = (downscale(v.x), downscale(v.y));
    if shift > 0 {
        let half = 1_i64 << (shift - 1);
        Vector::new(
            (x + half - i64::from(x < 0)) >> shift,
            (y + half - i64::from(y < 0)) >> shift,
        )
    } else {
        let shift = -shift;
        Vector::new(x << shift, y << shift)
    }
}

/// The length of `vec`.
pub fn length(vec: Vector) -> i64 {
    if vec.x == 0 {
        return vec.y.abs();
    }
    if vec.y == 0 {
        return vec.x.abs();
    }
    let mut v = vec;
    let shift = prenorm(&mut v);
    pseudo_polarize(&mut v);
    let x = downscale(v.x);
    if shift > 0 {
        (x + (1 << (shift - 1))) >> shift
    } else {
        x << -shift
    }
}

/// The vector with the given length and angle.
pub fn from_polar(len: i64, angle: Angle) -> Vector {
    rotate(Vector::new(len, 0), angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: i64 = 8;

    #[test]
    fn fixed_mul_div() {
        assert_eq!(mul_fix(3 << 16, 1 << 15), 3 << 15);
        assert_eq!(mul_fix(-(3 << 16), 1 << 15), -(3 << 15));
        assert_eq!(div_fix(1 << 16, 2 << 16), 1 << 15);
        assert_eq!(mul_div(7, 3, -2), -11);
        assert_eq!(mul_div(1, 1, 0), 0x7FFF_FFFF);
    }

    #[test]
    fn trig_values() {
        assert!((cos(0) - 0x10000).abs() <= EPS);
        assert!(cos(ANGLE_PI2).abs() <= EPS);
        assert!((sin(ANGLE_PI2) - 0x10000).abs() <= EPS);
        assert!((sin(30 << 16) - 0x8000).abs() <= EPS);
        assert!((tan(ANGLE_PI4) - 0x10000).abs() <= EPS);
    }

    #[test]
    fn atan2_quadrants() {
        assert_eq!(atan2(0, 0), 0);
        assert!((atan2(100, 0)).abs() <= EPS);
        assert!((atan2(100, 100) - ANGLE_PI4).abs() <= 16);
        assert!((atan2(0, 100) - ANGLE_PI2).abs() <= 16);
        assert!((atan2(-100, 0).abs() - ANGLE_PI).abs() <= 16);
        assert!((atan2(0, -100) + ANGLE_PI2).abs() <= 16);
    }

    #[test]
    fn vector_length_and_polar() {
        assert_eq!(length(Vector::new(0, -5)), 5);
        assert!((length(Vector::new(3 << 6, 4 << 6)) - (5 << 6)).abs() <= 1);
        let v = from_polar(10 << 6, ANGLE_PI2);
        assert!(v.x.abs() <= 1);
        assert!((v.y - (10 << 6)).abs() <= 1);
        let u = unit(ANGLE_PI);
        assert!((u.x + 0x10000).abs() <= EPS);
    }

    #[test]
    fn angle_diff_wraps() {
        assert_eq!(angle_diff(170 << 16, -(170 << 16)), 20 << 16);
        assert_eq!(angle_diff(0, ANGLE_PI), ANGLE_PI);
        assert_eq!(angle_diff(0, -ANGLE_PI), ANGLE_PI);
    }
}

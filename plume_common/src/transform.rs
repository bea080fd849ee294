// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG transform lists and affine helpers.

use crate::kurbo::{Affine, Point, Rect, Vec2};
use crate::parse::Scanner;
use crate::ParseError;

/// Parse an SVG transform list such as `translate(10 20) rotate(45, 5, 5)`.
///
/// Transforms compose left to right, each one applying in the local space of the previous.
/// An empty list yields the identity.
pub fn parse_transform(input: &str) -> Result<Affine, ParseError> {
    let mut s = Scanner::new(input);
    let mut m = Affine::IDENTITY;
    while s.skip_ws_comma() {
        let name = s.ident();
        if name.is_empty() {
            return Err(s.unexpected());
        }
        s.skip_ws();
        s.expect(b'(')?;
        s.skip_ws();
        let mut args = [0.0; 6];
        let mut count = 0;
        while s.at_number() {
            if count == args.len() {
                return Err(s.unexpected());
            }
            args[count] = s.list_number()?;
            count += 1;
        }
        s.expect(b')')?;
        let local = match (name, count) {
            ("matrix", 6) => Affine::new(args),
            ("translate", 1) => Affine::translate((args[0], 0.0)),
            ("translate", 2) => Affine::translate((args[0], args[1])),
            ("scale", 1) => Affine::scale(args[0]),
            ("scale", 2) => Affine::scale_non_uniform(args[0], args[1]),
            ("rotate", 1) => Affine::rotate(args[0].to_radians()),
            ("rotate", 3) => {
                Affine::rotate_about(args[0].to_radians(), Point::new(args[1], args[2]))
            }
            ("skewX", 1) => shear(args[0].to_radians(), 0.0),
            ("skewY", 1) => shear(0.0, args[0].to_radians()),
            ("matrix" | "translate" | "scale" | "rotate" | "skewX" | "skewY", _) => {
                return Err(ParseError::InvalidNumber { pos: s.pos() });
            }
            _ => return Err(ParseError::UnknownFunction(name.to_owned())),
        };
        m *= local;
    }
    Ok(m)
}

/// A shear by the given angles in radians along the x and y axes.
pub fn shear(shx: f64, shy: f64) -> Affine {
    Affine::skew(shx.tan(), shy.tan())
}

/// Post-multiply `m` by a translation, so the offset applies in local space.
pub fn translate(m: Affine, tx: f64, ty: f64) -> Affine {
    m.pre_translate(Vec2::new(tx, ty))
}

/// Post-multiply `m` by a scale.
pub fn scale(m: Affine, sx: f64, sy: f64) -> Affine {
    m.pre_scale_non_uniform(sx, sy)
}

/// Post-multiply `m` by a rotation in radians.
pub fn rotate(m: Affine, angle: f64) -> Affine {
    m.pre_rotate(angle)
}

/// The bounding box of `rect`'s four corners under `m`.
pub fn map_rect(m: &Affine, rect: Rect) -> Rect {
    m.transform_rect_bbox(rect)
}

// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG path data (`d` attribute) parsing.

use crate::kurbo::{Point, Vec2};
use crate::parse::Scanner;
use crate::path::Path;
use crate::ParseError;

impl Path {
    /// Parse SVG path data into a new path.
    pub fn parse(data: &str) -> Result<Self, ParseError> {
        let mut path = Self::new();
        parse_into(&mut Scanner::new(data), &mut path)?;
        Ok(path)
    }

    /// Parse SVG path data, keeping every segment before the first error.
    ///
    /// This is how SVG renders a malformed `d` attribute.
    pub fn parse_prefix(data: &str) -> (Self, Option<ParseError>) {
        let mut path = Self::new();
        let err = parse_into(&mut Scanner::new(data), &mut path).err();
        (path, err)
    }
}

fn coord(s: &mut Scanner<'_>) -> Result<f64, ParseError> {
    s.skip_ws();
    s.list_number()
}

fn point(s: &mut Scanner<'_>, base: Vec2) -> Result<Point, ParseError> {
    let x = coord(s)?;
    let y = coord(s)?;
    Ok(Point::new(x, y) + base)
}

/// Arc flags are single digits and need no separator, as in `a1 1 0 00 1 1`.
fn flag(s: &mut Scanner<'_>) -> Result<bool, ParseError> {
    s.skip_ws();
    let value = match s.peek() {
        Some(b'0') => false,
        Some(b'1') => true,
        _ => return Err(s.unexpected()),
    };
    s.bump();
    s.skip_ws_comma();
    Ok(value)
}

fn reflect(ctrl: Option<Point>, current: Point) -> Point {
    ctrl.map_or(current, |c| current + (current - c))
}

fn parse_into(s: &mut Scanner<'_>, path: &mut Path) -> Result<(), ParseError> {
    let mut command: Option<u8> = None;
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;
    // Second control point of the previous C/S, and control point of the previous Q/T.
    let mut last_cubic: Option<Point> = None;
    let mut last_quad: Option<Point> = None;

    while s.skip_ws() {
        let cmd = match s.peek() {
            Some(b) if b.is_ascii_alphabetic() => {
                s.bump();
                b
            }
            _ if s.at_number() => match command {
                Some(b'M') => b'L',
                Some(b'm') => b'l',
                Some(c) if !c.eq_ignore_ascii_case(&b'z') => c,
                _ => return Err(s.unexpected()),
            },
            _ => return Err(s.unexpected()),
        };
        if command.is_none() && !cmd.eq_ignore_ascii_case(&b'm') {
            return Err(ParseError::UnexpectedChar {
                ch: cmd as char,
                pos: s.pos() - 1,
            });
        }
        let base = if cmd.is_ascii_lowercase() {
            current.to_vec2()
        } else {
            Vec2::ZERO
        };
        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;
        match cmd.to_ascii_uppercase() {
            b'M' => {
                current = point(s, base)?;
                start = current;
                path.move_to(current);
            }
            b'L' => {
                current = point(s, base)?;
                path.line_to(current);
            }
            b'H' => {
                current.x = coord(s)? + base.x;
                path.line_to(current);
            }
            b'V' => {
                current.y = coord(s)? + base.y;
                path.line_to(current);
            }
            b'C' => {
                let c1 = point(s, base)?;
                let c2 = point(s, base)?;
                current = point(s, base)?;
                path.cubic_to(c1, c2, current);
                cubic_ctrl = Some(c2);
            }
            b'S' => {
                let c1 = reflect(last_cubic, current);
                let c2 = point(s, base)?;
                current = point(s, base)?;
                path.cubic_to(c1, c2, current);
                cubic_ctrl = Some(c2);
            }
            b'Q' => {
                let c = point(s, base)?;
                current = point(s, base)?;
                path.quad_to(c, current);
                quad_ctrl = Some(c);
            }
            b'T' => {
                let c = reflect(last_quad, current);
                current = point(s, base)?;
                path.quad_to(c, current);
                quad_ctrl = Some(c);
            }
            b'A' => {
                let rx = coord(s)?;
                let ry = coord(s)?;
                let angle = coord(s)?;
                let large_arc = flag(s)?;
                let sweep = flag(s)?;
                current = point(s, base)?;
                path.arc_to(rx, ry, angle.to_radians(), large_arc, sweep, current);
            }
            b'Z' => {
                path.close();
                current = start;
            }
            _ => {
                return Err(ParseError::UnexpectedChar {
                    ch: cmd as char,
                    pos: s.pos() - 1,
                });
            }
        }
        last_cubic = cubic_ctrl;
        last_quad = quad_ctrl;
        command = Some(cmd);
    }
    Ok(())
}

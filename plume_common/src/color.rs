// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colors and CSS color syntax.

use crate::parse::Scanner;
use crate::ParseError;

pub use crate::peniko::color::{AlphaColor, Srgb};

/// A non-premultiplied sRGB color with components in `0.0..=1.0`.
pub type Color = AlphaColor<Srgb>;

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// Packed integer conversions and alternative constructors for [`Color`].
pub trait ColorExt: Sized {
    /// Create a color from `0xRRGGBBAA`.
    fn from_rgba32(value: u32) -> Self;
    /// Create a color from `0xAARRGGBB`.
    fn from_argb32(value: u32) -> Self;
    /// Create an opaque color from hue (degrees), saturation and lightness.
    fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        Self::from_hsla(h, s, l, 1.0)
    }
    /// Create a color from hue (degrees), saturation, lightness and alpha.
    fn from_hsla(h: f32, s: f32, l: f32, a: f32) -> Self;
    /// The channels rounded to 8 bits, as `[r, g, b, a]`.
    fn to_bytes(&self) -> [u8; 4];
    /// Pack into `0xRRGGBBAA`.
    fn to_rgba32(&self) -> u32;
    /// Pack into `0xAARRGGBB`.
    fn to_argb32(&self) -> u32;
    /// Pack into premultiplied `0xAARRGGBB`.
    fn to_premul_argb32(&self) -> u32;
}

impl ColorExt for Color {
    fn from_rgba32(value: u32) -> Self {
        let [r, g, b, a] = value.to_be_bytes();
        Self::from_rgba8(r, g, b, a)
    }

    fn from_argb32(value: u32) -> Self {
        let [a, r, g, b] = value.to_be_bytes();
        Self::from_rgba8(r, g, b, a)
    }

    fn from_hsla(h: f32, s: f32, l: f32, a: f32) -> Self {
        let h = h.rem_euclid(360.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        let chroma = s * l.min(1.0 - l);
        let f = |n: f32| {
            let k = (n + h / 30.0) % 12.0;
            l - chroma * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
        };
        Self::new([f(0.0), f(8.0), f(4.0), a.clamp(0.0, 1.0)])
    }

    fn to_bytes(&self) -> [u8; 4] {
        self.components.map(to_u8)
    }

    fn to_rgba32(&self) -> u32 {
        u32::from_be_bytes(self.to_bytes())
    }

    fn to_argb32(&self) -> u32 {
        let [r, g, b, a] = self.to_bytes();
        u32::from_be_bytes([a, r, g, b])
    }

    fn to_premul_argb32(&self) -> u32 {
        let [r, g, b, a] = self.components;
        let a8 = to_u8(a);
        let a = f32::from(a8) / 255.0;
        u32::from_be_bytes([a8, to_u8(r * a), to_u8(g * a), to_u8(b * a)])
    }
}

/// The result of parsing a CSS color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedColor {
    /// A concrete color.
    Color(Color),
    /// The `currentColor` keyword, resolved by the caller.
    CurrentColor,
}

/// Parse a CSS color: hex notation, `rgb()`, `rgba()`, `hsl()`, `hsla()`, a named color,
/// `transparent` or `currentColor`.
pub fn parse_color(input: &str) -> Result<ParsedColor, ParseError> {
    let mut s = Scanner::new(input);
    s.skip_ws();
    let color = parse_color_at(&mut s)?;
    if s.skip_ws() {
        return Err(s.unexpected());
    }
    Ok(color)
}

/// Parse a CSS color at the cursor, leaving trailing input untouched.
pub fn parse_color_at(s: &mut Scanner<'_>) -> Result<ParsedColor, ParseError> {
    if s.eat(b'#') {
        return parse_hex(s).map(ParsedColor::Color);
    }
    let name = s.ident();
    if name.is_empty() {
        return Err(s.unexpected());
    }
    let lower = name.to_ascii_lowercase();
    if s.eat(b'(') {
        let color = match lower.as_str() {
            "rgb" | "rgba" => parse_rgb_args(s)?,
            "hsl" | "hsla" => parse_hsl_args(s)?,
            _ => return Err(ParseError::UnknownFunction(name.to_owned())),
        };
        s.skip_ws();
        s.expect(b')')?;
        return Ok(ParsedColor::Color(color));
    }
    match lower.as_str() {
        "currentcolor" => Ok(ParsedColor::CurrentColor),
        "transparent" => Ok(ParsedColor::Color(Color::TRANSPARENT)),
        _ => named_color(&lower)
            .map(|rgb| ParsedColor::Color(Color::from_rgba32((rgb << 8) | 0xFF)))
            .ok_or(ParseError::UnknownColor(name.to_owned())),
    }
}

fn parse_hex(s: &mut Scanner<'_>) -> Result<Color, ParseError> {
    let start = s.pos();
    let mut digits = Vec::with_capacity(8);
    while let Some(d) = s.peek().and_then(|b| (b as char).to_digit(16)) {
        digits.push(d as u8);
        s.bump();
    }
    let pair = |hi: u8, lo: u8| (hi << 4) | lo;
    let [r, g, b, a] = match *digits.as_slice() {
        [r, g, b] => [r * 17, g * 17, b * 17, 255],
        [r, g, b, a] => [r * 17, g * 17, b * 17, a * 17],
        [r1, r2, g1, g2, b1, b2] => [pair(r1, r2), pair(g1, g2), pair(b1, b2), 255],
        [r1, r2, g1, g2, b1, b2, a1, a2] => {
            [pair(r1, r2), pair(g1, g2), pair(b1, b2), pair(a1, a2)]
        }
        _ => return Err(ParseError::InvalidNumber { pos: start }),
    };
    Ok(Color::from_rgba8(r, g, b, a))
}

/// A number, or a percentage mapped so that `100%` equals `scale`.
fn number_or_percent(s: &mut Scanner<'_>, scale: f32) -> Result<f32, ParseError> {
    s.skip_ws();
    let v = s.number()? as f32;
    if s.eat(b'%') {
        Ok(v / 100.0 * scale)
    } else {
        Ok(v)
    }
}

/// Skip a component separator, returning whether it was a slash.
fn separator(s: &mut Scanner<'_>) -> bool {
    s.skip_ws();
    if s.eat(b'/') {
        return true;
    }
    s.eat(b',');
    false
}

fn parse_alpha(s: &mut Scanner<'_>) -> Result<f32, ParseError> {
    s.skip_ws();
    if s.peek() == Some(b')') {
        return Ok(1.0);
    }
    separator(s);
    Ok(number_or_percent(s, 1.0)?.clamp(0.0, 1.0))
}

fn parse_rgb_args(s: &mut Scanner<'_>) -> Result<Color, ParseError> {
    let r = number_or_percent(s, 255.0)?;
    separator(s);
    let g = number_or_percent(s, 255.0)?;
    separator(s);
    let b = number_or_percent(s, 255.0)?;
    let a = parse_alpha(s)?;
    let c = |v: f32| v.clamp(0.0, 255.0) / 255.0;
    Ok(Color::new([c(r), c(g), c(b), a]))
}

fn parse_hsl_args(s: &mut Scanner<'_>) -> Result<Color, ParseError> {
    s.skip_ws();
    let h = s.number()? as f32;
    s.eat_str("deg");
    separator(s);
    let sat = number_or_percent(s, 1.0)?;
    separator(s);
    let l = number_or_percent(s, 1.0)?;
    let a = parse_alpha(s)?;
    Ok(Color::from_hsla(h, sat, l, a))
}

/// Look up a lowercase CSS color keyword, returning `0xRRGGBB`.
pub fn named_color(name: &str) -> Option<u32> {
    NAMED_COLORS
        .binary_search_by(|(n, _)| (*n).cmp(name))
        .ok()
        .map(|i| NAMED_COLORS[i].1)
}

const NAMED_COLORS: [(&str, u32); 148] = [
    ("aliceblue", 0xF0F8FF),
    ("antiquewhite", 0xFAEBD7),
    ("aqua", 0x00FFFF),
    ("aquamarine", 0x7FFFD4),
    ("azure", 0xF0FFFF),
    ("beige", 0xF5F5DC),
    ("bisque", 0xFFE4C4),
    ("black", 0x000000),
    ("blanchedalmond", 0xFFEBCD),
    ("blue", 0x0000FF),
    ("blueviolet", 0x8A2BE2),
    ("brown", 0xA52A2A),
    ("burlywood", 0xDEB887),
    ("cadetblue", 0x5F9EA0),
    ("chartreuse", 0x7FFF00),
    ("chocolate", 0xD2691E),
    ("coral", 0xFF7F50),
    ("cornflowerblue", 0x6495ED),
    ("cornsilk", 0xFFF8DC),
    ("crimson", 0xDC143C),
    ("cyan", 0x00FFFF),
    ("darkblue", 0x00008B),
    ("darkcyan", 0x008B8B),
    ("darkgoldenrod", 0xB8860B),
    ("darkgray", 0xA9A9A9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xA9A9A9),
    ("darkkhaki", 0xBDB76B),
    ("darkmagenta", 0x8B008B),
    ("darkolivegreen", 0x556B2F),
    ("darkorange", 0xFF8C00),
    ("darkorchid", 0x9932CC),
    ("darkred", 0x8B0000),
    ("darksalmon", 0xE9967A),
    ("darkseagreen", 0x8FBC8F),
    ("darkslateblue", 0x483D8B),
    ("darkslategray", 0x2F4F4F),
    ("darkslategrey", 0x2F4F4F),
    ("darkturquoise", 0x00CED1),
    ("darkviolet", 0x9400D3),
    ("deeppink", 0xFF1493),
    ("deepskyblue", 0x00BFFF),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1E90FF),
    ("firebrick", 0xB22222),
    ("floralwhite", 0xFFFAF0),
    ("forestgreen", 0x228B22),
    ("fuchsia", 0xFF00FF),
    ("gainsboro", 0xDCDCDC),
    ("ghostwhite", 0xF8F8FF),
    ("gold", 0xFFD700),
    ("goldenrod", 0xDAA520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xADFF2F),
    ("grey", 0x808080),
    ("honeydew", 0xF0FFF0),
    ("hotpink", 0xFF69B4),
    ("indianred", 0xCD5C5C),
    ("indigo", 0x4B0082),
    ("ivory", 0xFFFFF0),
    ("khaki", 0xF0E68C),
    ("lavender", 0xE6E6FA),
    ("lavenderblush", 0xFFF0F5),
    ("lawngreen", 0x7CFC00),
    ("lemonchiffon", 0xFFFACD),
    ("lightblue", 0xADD8E6),
    ("lightcoral", 0xF08080),
    ("lightcyan", 0xE0FFFF),
    ("lightgoldenrodyellow", 0xFAFAD2),
    ("lightgray", 0xD3D3D3),
    ("lightgreen", 0x90EE90),
    ("lightgrey", 0xD3D3D3),
    ("lightpink", 0xFFB6C1),
    ("lightsalmon", 0xFFA07A),
    ("lightseagreen", 0x20B2AA),
    ("lightskyblue", 0x87CEFA),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xB0C4DE),
    ("lightyellow", 0xFFFFE0),
    ("lime", 0x00FF00),
    ("limegreen", 0x32CD32),
    ("linen", 0xFAF0E6),
    ("magenta", 0xFF00FF),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66CDAA),
    ("mediumblue", 0x0000CD),
    ("mediumorchid", 0xBA55D3),
    ("mediumpurple", 0x9370DB),
    ("mediumseagreen", 0x3CB371),
    ("mediumslateblue", 0x7B68EE),
    ("mediumspringgreen", 0x00FA9A),
    ("mediumturquoise", 0x48D1CC),
    ("mediumvioletred", 0xC71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xF5FFFA),
    ("mistyrose", 0xFFE4E1),
    ("moccasin", 0xFFE4B5),
    ("navajowhite", 0xFFDEAD),
    ("navy", 0x000080),
    ("oldlace", 0xFDF5E6),
    ("olive", 0x808000),
    ("olivedrab", 0x6B8E23),
    ("orange", 0xFFA500),
    ("orangered", 0xFF4500),
    ("orchid", 0xDA70D6),
    ("palegoldenrod", 0xEEE8AA),
    ("palegreen", 0x98FB98),
    ("paleturquoise", 0xAFEEEE),
    ("palevioletred", 0xDB7093),
    ("papayawhip", 0xFFEFD5),
    ("peachpuff", 0xFFDAB9),
    ("peru", 0xCD853F),
    ("pink", 0xFFC0CB),
    ("plum", 0xDDA0DD),
    ("powderblue", 0xB0E0E6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xFF0000),
    ("rosybrown", 0xBC8F8F),
    ("royalblue", 0x4169E1),
    ("saddlebrown", 0x8B4513),
    ("salmon", 0xFA8072),
    ("sandybrown", 0xF4A460),
    ("seagreen", 0x2E8B57),
    ("seashell", 0xFFF5EE),
    ("sienna", 0xA0522D),
    ("silver", 0xC0C0C0),
    ("skyblue", 0x87CEEB),
    ("slateblue", 0x6A5ACD),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xFFFAFA),
    ("springgreen", 0x00FF7F),
    ("steelblue", 0x4682B4),
    ("tan", 0xD2B48C),
    ("teal", 0x008080),
    ("thistle", 0xD8BFD8),
    ("tomato", 0xFF6347),
    ("turquoise", 0x40E0D0),
    ("violet", 0xEE82EE),
    ("wheat", 0xF5DEB3),
    ("white", 0xFFFFFF),
    ("whitesmoke", 0xF5F5F5),
    ("yellow", 0xFFFF00),
    ("yellowgreen", 0x9ACD32),
];

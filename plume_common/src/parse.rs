// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A byte scanner for the small textual grammars used by SVG attributes.

use crate::ParseError;

/// A forward-only cursor over ASCII-oriented input.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    data: &'a str,
    pos: usize,
}

#[inline]
pub(crate) fn is_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

impl<'a> Scanner<'a> {
    /// Create a scanner at the start of `data`.
    pub fn new(data: &'a str) -> Self {
        Self { data, pos: 0 }
    }

    /// The current byte offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Whether all input has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// The unconsumed remainder.
    pub fn rest(&self) -> &'a str {
        &self.data[self.pos..]
    }

    /// The next byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.data.as_bytes().get(self.pos).copied()
    }

    /// Consume one byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Build an error describing the byte at the cursor.
    pub fn unexpected(&self) -> ParseError {
        match self.rest().chars().next() {
            Some(ch) => ParseError::UnexpectedChar { ch, pos: self.pos },
            None => ParseError::UnexpectedEnd,
        }
    }

    /// Skip whitespace, returning whether anything remains.
    pub fn skip_ws(&mut self) -> bool {
        while self.peek().is_some_and(is_ws) {
            self.pos += 1;
        }
        !self.is_at_end()
    }

    /// Skip whitespace around at most one comma.
    pub fn skip_ws_comma(&mut self) -> bool {
        self.skip_ws();
        if self.peek() == Some(b',') {
            self.pos += 1;
            self.skip_ws();
        }
        !self.is_at_end()
    }

    /// Consume `b` if it is next.
    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume `b` or fail.
    pub fn expect(&mut self, b: u8) -> Result<(), ParseError> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Consume `s` if the input continues with it.
    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Consume a run of identifier characters (`[A-Za-z0-9_-]`).
    pub fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            self.pos += 1;
        }
        &self.data[start..self.pos]
    }

    /// Whether a number could start at the cursor.
    pub fn at_number(&self) -> bool {
        matches!(self.peek(), Some(b'0'..=b'9' | b'+' | b'-' | b'.'))
    }

    /// Read a number: optional sign, digits, optional fraction and optional exponent.
    ///
    /// An `e` is only taken as an exponent when a digit or sign follows, so `1em` reads as `1`.
    pub fn number(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        let bytes = self.data.as_bytes();
        let mut i = self.pos;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let int_start = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        let mut digits = i > int_start;
        if bytes.get(i) == Some(&b'.') {
            let frac_start = i + 1;
            let mut j = frac_start;
            while bytes.get(j).is_some_and(u8::is_ascii_digit) {
                j += 1;
            }
            if j > frac_start || digits {
                digits |= j > frac_start;
                i = j;
            }
        }
        if !digits {
            return Err(ParseError::InvalidNumber { pos: start });
        }
        if matches!(bytes.get(i), Some(b'e' | b'E')) {
            let mut j = i + 1;
            if matches!(bytes.get(j), Some(b'+' | b'-')) {
                j += 1;
            }
            let exp_start = j;
            while bytes.get(j).is_some_and(u8::is_ascii_digit) {
                j += 1;
            }
            if j > exp_start {
                i = j;
            }
        }
        let value = self.data[start..i]
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber { pos: start })?;
        self.pos = i;
        Ok(value)
    }

    /// Read a number followed by optional whitespace and one comma.
    pub fn list_number(&mut self) -> Result<f64, ParseError> {
        let v = self.number()?;
        self.skip_ws_comma();
        Ok(v)
    }
}

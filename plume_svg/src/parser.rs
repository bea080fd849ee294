// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A forward-only scanner for the XML subset SVG documents use.
//!
//! The prolog, doctype declarations, comments, processing instructions and CDATA
//! sections are skipped. Character data is ignored. Elements the renderer does not know
//! are skipped together with their whole subtree by counting how deep inside them the
//! scanner is.

use std::borrow::Cow;

use crate::tree::{AttrId, Attribute, ElementKind, NodeId, Tree};
use crate::Error;

struct Cursor<'a> {
    data: &'a str,
    pos: usize,
}

fn error(pos: usize, reason: &'static str) -> Error {
    Error::Parse { pos, reason }
}

fn is_name_byte(b: u8) -> bool {
    !matches!(
        b,
        b' ' | b'\t' | b'\n' | b'\r' | b'/' | b'>' | b'=' | b'<' | b'"' | b'\''
    )
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.data[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.data.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Move past the next occurrence of `end`.
    fn skip_past(&mut self, end: &str, reason: &'static str) -> Result<(), Error> {
        match self.rest().find(end) {
            Some(i) => {
                self.pos += i + end.len();
                Ok(())
            }
            None => Err(error(self.data.len(), reason)),
        }
    }

    fn name(&mut self) -> Result<&'a str, Error> {
        let start = self.pos;
        while self.peek().is_some_and(is_name_byte) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(error(start, "expected a name"));
        }
        Ok(&self.data[start..self.pos])
    }

    /// Skip a `<!DOCTYPE ...>` declaration, including an internal subset in brackets.
    fn skip_doctype(&mut self) -> Result<(), Error> {
        let mut depth = 0_u32;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(error(self.data.len(), "unterminated declaration"))
    }

    fn attribute_value(&mut self) -> Result<&'a str, Error> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(error(self.pos, "expected a quoted attribute value")),
        };
        self.pos += 1;
        let start = self.pos;
        match self.rest().bytes().position(|b| b == quote) {
            Some(len) => {
                self.pos += len + 1;
                Ok(&self.data[start..start + len])
            }
            None => Err(error(self.data.len(), "unterminated attribute value")),
        }
    }
}

/// Replace the predefined entities and character references.
fn decode_entities(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(i) = rest.find('&') {
        out.push_str(&rest[..i]);
        rest = &rest[i..];
        let Some(end) = rest.find(';') else {
            break;
        };
        let entity = &rest[1..end];
        let ch = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
            }
        };
        match ch {
            Some(ch) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Split a `style` attribute into declarations the renderer understands.
fn style_declarations(style: &str) -> impl Iterator<Item = Attribute> + '_ {
    style.split(';').filter_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        let id = AttrId::from_name(name.trim())?;
        let value = value.trim();
        let value = value.strip_suffix("!important").unwrap_or(value).trim_end();
        Some(Attribute {
            id,
            value: value.to_owned(),
        })
    })
}

/// Parse a document into a tree whose root is an `svg` element.
pub(crate) fn parse(data: &str) -> Result<Tree, Error> {
    let mut tree = Tree::default();
    let mut cursor = Cursor { data, pos: 0 };
    // Names of all open elements, known or not, for matching close tags.
    let mut open: Vec<&str> = Vec::new();
    // Open elements that made it into the tree.
    let mut nodes: Vec<NodeId> = Vec::new();
    let mut ignoring = 0_usize;
    let mut root_closed = false;

    loop {
        match cursor.rest().find('<') {
            Some(i) => cursor.pos += i,
            None => break,
        }
        let start = cursor.pos;
        if cursor.eat("<!--") {
            cursor.skip_past("-->", "unterminated comment")?;
        } else if cursor.eat("<![CDATA[") {
            cursor.skip_past("]]>", "unterminated CDATA section")?;
        } else if cursor.eat("<?") {
            cursor.skip_past("?>", "unterminated processing instruction")?;
        } else if cursor.eat("<!") {
            cursor.skip_doctype()?;
        } else if cursor.eat("</") {
            let name = cursor.name()?;
            cursor.skip_ws();
            if !cursor.eat(">") {
                return Err(error(cursor.pos, "expected `>`"));
            }
            if open.pop() != Some(name) {
                return Err(error(start, "mismatched close tag"));
            }
            if ignoring > 0 {
                ignoring -= 1;
            } else {
                nodes.pop();
            }
            root_closed = open.is_empty();
        } else {
            cursor.pos += 1;
            let name = cursor.name()?;
            let mut attrs = Vec::new();
            let mut style = None;
            let self_closing = loop {
                cursor.skip_ws();
                if cursor.eat("/>") {
                    break true;
                }
                if cursor.eat(">") {
                    break false;
                }
                if cursor.peek().is_none() {
                    return Err(error(start, "unterminated tag"));
                }
                let attr_name = cursor.name()?;
                cursor.skip_ws();
                if !cursor.eat("=") {
                    return Err(error(cursor.pos, "expected `=`"));
                }
                cursor.skip_ws();
                let value = decode_entities(cursor.attribute_value()?);
                if attr_name == "style" {
                    style = Some(value);
                } else if let Some(id) = AttrId::from_name(attr_name) {
                    attrs.push(Attribute {
                        id,
                        value: value.into_owned(),
                    });
                }
            };
            if root_closed {
                return Err(error(start, "content after the document element"));
            }

            let kind = ElementKind::from_name(name);
            if tree.is_empty() && kind != Some(ElementKind::Svg) {
                return Err(error(start, "the document element is not `svg`"));
            }
            match kind {
                Some(kind) if ignoring == 0 => {
                    if let Some(style) = &style {
                        attrs.extend(style_declarations(style));
                    }
                    let node = tree.push(kind, nodes.last().copied(), attrs);
                    if self_closing {
                        root_closed = open.is_empty();
                    } else {
                        nodes.push(node);
                        open.push(name);
                    }
                }
                _ => {
                    if !self_closing {
                        ignoring += 1;
                        open.push(name);
                    }
                }
            }
        }
    }

    if !open.is_empty() {
        return Err(error(data.len(), "unclosed element"));
    }
    if tree.is_empty() {
        return Err(error(data.len(), "no document element"));
    }
    Ok(tree)
}

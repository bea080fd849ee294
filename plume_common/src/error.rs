// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors produced while parsing textual geometry and color syntax.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input ended in the middle of a construct.
    #[error("unexpected end of input")]
    UnexpectedEnd,
    /// A number could not be read at the given byte offset.
    #[error("invalid number at byte {pos}")]
    InvalidNumber {
        /// Byte offset into the input.
        pos: usize,
    },
    /// A character that is not allowed at this point.
    #[error("unexpected character {ch:?} at byte {pos}")]
    UnexpectedChar {
        /// The offending character.
        ch: char,
        /// Byte offset into the input.
        pos: usize,
    },
    /// A functional notation with an unknown name, such as `foo(1 2)`.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    /// A color keyword that is not in the named color table.
    #[error("unknown color `{0}`")]
    UnknownColor(String),
}

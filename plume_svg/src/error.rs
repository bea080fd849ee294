// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use plume_cpu::SurfaceError;
use thiserror::Error;

/// Errors produced while loading or rendering a document.
#[derive(Error, Debug)]
pub enum Error {
    /// The document is not well-formed.
    #[error("malformed document at byte {pos}: {reason}")]
    Parse {
        /// Byte offset into the input.
        pos: usize,
        /// What was wrong.
        reason: &'static str,
    },
    /// The document could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// No element carries the requested id.
    #[error("no element with id `{0}`")]
    ElementNotFound(String),
    /// The requested element covers no area, so there is nothing to render.
    #[error("the element has empty extents")]
    EmptyExtents,
    /// The target surface could not be created.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

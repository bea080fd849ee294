// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use log::debug;
use plume_common::color::Color;
use plume_common::kurbo::Rect;
use plume_common::peniko::Compose;
use plume_cpu::{Canvas, Surface};

use crate::render::{Output, Palette, Renderer};
use crate::style::{parse_length, parse_view_box, Axis, Unit};
use crate::tree::{AttrId, NodeId, Tree};
use crate::{parser, Error};

/// Width used when a document specifies neither a width nor a view box.
pub const DEFAULT_WIDTH: f64 = 300.0;
/// Height used when a document specifies neither a height nor a view box.
pub const DEFAULT_HEIGHT: f64 = 150.0;

/// A parsed SVG document.
#[derive(Debug, Clone)]
pub struct Document {
    tree: Tree,
    width: f64,
    height: f64,
}

impl Document {
    /// Parse a document from memory.
    ///
    /// `width` and `height` describe the container the document is placed in; percentage
    /// sizes on the document element resolve against them and are ignored when they are
    /// `None`.
    pub fn load_from_data(
        data: &[u8],
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<Self, Error> {
        let text = std::str::from_utf8(data).map_err(|err| Error::Parse {
            pos: err.valid_up_to(),
            reason: "invalid UTF-8",
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let tree = parser::parse(text)?;
        let root = tree.root();

        let dimension = |attr, container: Option<f64>| {
            let length = tree.attr(root, attr).and_then(parse_length)?;
            let value = match length.unit {
                Unit::Percent => length.value * container? / 100.0,
                _ => length.resolve(Axis::Horizontal, (0.0, 0.0)),
            };
            (value >= 0.0).then_some(value)
        };
        let mut w = dimension(AttrId::Width, width);
        let mut h = dimension(AttrId::Height, height);
        if let Some(vb) = tree.attr(root, AttrId::ViewBox).and_then(parse_view_box) {
            match (w, h) {
                (None, None) => (w, h) = (Some(vb.width()), Some(vb.height())),
                (Some(w), None) => h = Some(w * vb.height() / vb.width()),
                (None, Some(h)) => w = Some(h * vb.width() / vb.height()),
                (Some(_), Some(_)) => {}
            }
        }
        let width = w.unwrap_or(DEFAULT_WIDTH);
        let height = h.unwrap_or(DEFAULT_HEIGHT);
        debug!("loaded document of size {width}x{height}");
        Ok(Self {
            tree,
            width,
            height,
        })
    }

    /// Read and parse a document from a file.
    pub fn load_from_file(
        path: impl AsRef<std::path::Path>,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<Self, Error> {
        let data = std::fs::read(path)?;
        Self::load_from_data(&data, width, height)
    }

    /// The intrinsic width of the document.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// The intrinsic height of the document.
    pub fn height(&self) -> f64 {
        self.height
    }

    fn find(&self, id: Option<&str>) -> Result<NodeId, Error> {
        match id {
            Some(id) => self
                .tree
                .element_by_id(id)
                .ok_or_else(|| Error::ElementNotFound(id.to_owned())),
            None => Ok(self.tree.root()),
        }
    }

    /// The area covered by the element with the given id, or by the whole document.
    ///
    /// Element extents are the bounding box of their fill geometry in document
    /// coordinates; an element without geometry has zero extents.
    pub fn extents(&self, id: Option<&str>) -> Result<Rect, Error> {
        let node = self.find(id)?;
        if id.is_none() {
            return Ok(Rect::new(0.0, 0.0, self.width, self.height));
        }
        let renderer = Renderer::new(&self.tree, self.size(), Color::BLACK, None);
        Ok(renderer.bounds(node).unwrap_or(Rect::ZERO))
    }

    /// Render the element with the given id, or the whole document, into `canvas` under
    /// its current transform.
    ///
    /// `current_color` is the value of `currentColor` where the document does not set a
    /// `color`; `palette` resolves `var()` colors.
    pub fn render(
        &self,
        id: Option<&str>,
        canvas: &mut Canvas,
        current_color: Color,
        palette: Option<Palette<'_>>,
    ) -> Result<(), Error> {
        let node = self.find(id)?;
        let renderer = Renderer::new(&self.tree, self.size(), current_color, palette);
        canvas.save();
        let base = canvas.matrix();
        canvas.set_operator(Compose::SrcOver);
        canvas.set_opacity(1.0);
        renderer.render(node, base, &mut Output::Paint(canvas));
        canvas.restore();
        Ok(())
    }

    /// Render the element with the given id, or the whole document, into a new surface.
    ///
    /// The extents of the element are scaled to fill the surface. When only one of `width`
    /// and `height` is given, the other follows the aspect ratio of the extents; when
    /// neither is, the extents are rendered at their natural size.
    pub fn render_to_surface(
        &self,
        id: Option<&str>,
        width: Option<u32>,
        height: Option<u32>,
        current_color: Color,
        palette: Option<Palette<'_>>,
    ) -> Result<Surface, Error> {
        let extents = self.extents(id)?;
        let (ew, eh) = (extents.width(), extents.height());
        if !(ew > 0.0 && eh > 0.0) {
            return Err(Error::EmptyExtents);
        }
        let (width, height) = match (width, height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, (f64::from(w) * eh / ew).ceil() as u32),
            (None, Some(h)) => ((f64::from(h) * ew / eh).ceil() as u32, h),
            (None, None) => (ew.ceil() as u32, eh.ceil() as u32),
        };
        let mut canvas = Canvas::new(Surface::new(width, height)?);
        canvas.scale(f64::from(width) / ew, f64::from(height) / eh);
        canvas.translate(-extents.x0, -extents.y0);
        self.render(id, &mut canvas, current_color, palette)?;
        Ok(canvas.into_surface())
    }

    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

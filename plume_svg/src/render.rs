// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Walking the element tree.
//!
//! One recursive walk serves three purposes: painting into a canvas, accumulating a clip
//! mask, and measuring the bounding box of some geometry. Group opacity and `clip-path`
//! are realised with offscreen layers composited back into the target canvas.

use std::sync::Arc;

use log::{trace, warn};
use plume_common::color::{parse_color, Color, ParsedColor};
use plume_common::kurbo::{Affine, Cap, Join, Rect, Stroke};
use plume_common::path::Path;
use plume_common::peniko::{Compose, Extend, Fill};
use plume_common::transform::{map_rect, parse_transform};
use plume_cpu::{Canvas, Gradient, Paint, Surface, TextureKind};
use smallvec::{smallvec, SmallVec};

use crate::style::{
    is_object_bounding_box, parse_dash_array, parse_fill_rule, parse_length, parse_line_cap,
    parse_line_join, parse_number, parse_paint, parse_points, parse_spread_method,
    parse_unit_interval, parse_view_box, AspectRatio, Axis, Length, PaintSpec, Unit,
};
use crate::tree::{AttrId, ElementKind, NodeId, Tree};

/// The longest chain of gradient `href` links that is followed.
pub const MAX_GRADIENT_CHAIN: usize = 16;

/// Resolves `var(--name)` colors. Receives the name without the leading `--`.
pub type Palette<'a> = &'a dyn Fn(&str) -> Option<Color>;

/// Where the walk sends geometry.
pub(crate) enum Output<'c> {
    /// Paint shapes with their fill and stroke.
    Paint(&'c mut Canvas),
    /// Fill shapes opaquely to build a clip mask.
    Clip(&'c mut Canvas),
    /// Accumulate the device-space bounding box of the fill geometry.
    Bounds(&'c mut Option<Rect>),
}

/// One frame of the walk. Frames link to the frame that rendered them, which is how
/// inherited properties reach through `use` references.
#[derive(Clone, Copy)]
struct State<'s> {
    node: NodeId,
    parent: Option<&'s State<'s>>,
    transform: Affine,
    /// Size that percentages resolve against.
    viewport: (f64, f64),
}

pub(crate) struct Renderer<'a> {
    tree: &'a Tree,
    size: (f64, f64),
    current_color: Color,
    palette: Option<Palette<'a>>,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(
        tree: &'a Tree,
        size: (f64, f64),
        current_color: Color,
        palette: Option<Palette<'a>>,
    ) -> Self {
        Self {
            tree,
            size,
            current_color,
            palette,
        }
    }

    /// Render `node` as if the walk had descended to it from the document element.
    pub(crate) fn render(&self, node: NodeId, base: Affine, out: &mut Output<'_>) {
        let ancestors: SmallVec<[NodeId; 8]> = self.tree.ancestors(node).collect();
        let mut transform = base;
        let mut viewport = self.size;
        for &ancestor in ancestors.iter().rev() {
            let Some((local, inner)) = self.local(ancestor, viewport) else {
                return;
            };
            transform *= local;
            viewport = inner;
        }
        self.render_node(node, None, transform, viewport, out);
    }

    /// The device-space bounding box of the fill geometry under `node`.
    pub(crate) fn bounds(&self, node: NodeId) -> Option<Rect> {
        let mut bounds = None;
        self.render(node, Affine::IDENTITY, &mut Output::Bounds(&mut bounds));
        bounds
    }

    fn render_node(
        &self,
        node: NodeId,
        parent: Option<&State<'_>>,
        transform: Affine,
        viewport: (f64, f64),
        out: &mut Output<'_>,
    ) {
        let kind = self.tree.kind(node);
        if matches!(
            kind,
            ElementKind::Defs
                | ElementKind::Symbol
                | ElementKind::LinearGradient
                | ElementKind::RadialGradient
                | ElementKind::Stop
                | ElementKind::ClipPath
        ) || self.is_display_none(node)
        {
            return;
        }
        let Some((local, viewport)) = self.local(node, viewport) else {
            return;
        };
        trace!("render {kind:?}");
        let state = State {
            node,
            parent,
            transform: transform * local,
            viewport,
        };
        self.render_with_effects(&state, out);
    }

    fn render_with_effects(&self, state: &State<'_>, out: &mut Output<'_>) {
        if let Output::Paint(canvas) = out {
            let opacity = self
                .tree
                .attr(state.node, AttrId::Opacity)
                .and_then(parse_unit_interval)
                .unwrap_or(1.0);
            let clip = self.clip_reference(state.node);
            if opacity < 1.0 || clip.is_some() {
                if opacity > 0.0 {
                    self.render_layer(state, opacity, clip, canvas);
                }
                return;
            }
        }
        self.render_content(state, out);
    }

    fn render_content(&self, state: &State<'_>, out: &mut Output<'_>) {
        match self.tree.kind(state.node) {
            ElementKind::Svg | ElementKind::G | ElementKind::Symbol => {
                self.render_children(state, out);
            }
            ElementKind::Use => self.render_use(state, out),
            kind if kind.is_shape() => self.render_shape(state, out),
            _ => {}
        }
    }

    fn render_children(&self, state: &State<'_>, out: &mut Output<'_>) {
        for child in self.tree.children(state.node) {
            self.render_node(child, Some(state), state.transform, state.viewport, out);
        }
    }

    fn render_use(&self, state: &State<'_>, out: &mut Output<'_>) {
        let Some(target) = self.tree.href(state.node) else {
            warn!("skipping `use` with an unresolved reference");
            return;
        };
        if self.is_being_rendered(target, state) {
            warn!("skipping cyclic `use` reference");
            return;
        }
        if self.tree.kind(target) != ElementKind::Symbol {
            self.render_node(target, Some(state), state.transform, state.viewport, out);
            return;
        }
        if self.is_display_none(target) {
            return;
        }
        let full = Length::percent(100.0);
        let vp = state.viewport;
        let width = self.length(state.node, AttrId::Width, Axis::Horizontal, vp, full);
        let height = self.length(state.node, AttrId::Height, Axis::Vertical, vp, full);
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let (transform, viewport) = match self.view_box(target) {
            Some(vb) => (
                state.transform * self.aspect(target).transform(vb, width, height),
                (vb.width(), vb.height()),
            ),
            None => (state.transform, (width, height)),
        };
        let symbol = State {
            node: target,
            parent: Some(state),
            transform,
            viewport,
        };
        self.render_with_effects(&symbol, out);
    }

    /// Whether `node` is already on the path from the document element to `state`.
    fn is_being_rendered(&self, node: NodeId, state: &State<'_>) -> bool {
        let mut frame = Some(state);
        while let Some(s) = frame {
            if s.node == node {
                return true;
            }
            frame = s.parent;
        }
        self.tree.ancestors(state.node).any(|a| a == node)
    }

    fn render_shape(&self, state: &State<'_>, out: &mut Output<'_>) {
        let Some(path) = self.shape_path(state) else {
            return;
        };
        match out {
            Output::Bounds(bounds) => {
                if path.is_empty() {
                    return;
                }
                let rect = map_rect(&state.transform, path.extents(true));
                **bounds = Some(match **bounds {
                    Some(b) => b.union(rect),
                    None => rect,
                });
            }
            Output::Clip(canvas) => {
                if !self.is_visible(state) {
                    return;
                }
                let rule = self
                    .inherited(state, AttrId::ClipRule)
                    .and_then(parse_fill_rule)
                    .unwrap_or(Fill::NonZero);
                canvas.set_matrix(state.transform);
                canvas.set_color(Color::BLACK);
                canvas.set_opacity(1.0);
                canvas.set_fill_rule(rule);
                canvas.fill_path(&path);
            }
            Output::Paint(canvas) => {
                if self.is_visible(state) {
                    self.fill_shape(state, &path, canvas);
                    self.stroke_shape(state, &path, canvas);
                }
            }
        }
    }

    fn fill_shape(&self, state: &State<'_>, path: &Path, canvas: &mut Canvas) {
        let spec = self.inherited(state, AttrId::Fill).unwrap_or("black");
        let Some(paint) = self.resolve_paint(state, spec, path) else {
            return;
        };
        let opacity = self
            .inherited(state, AttrId::FillOpacity)
            .and_then(parse_unit_interval)
            .unwrap_or(1.0);
        let rule = self
            .inherited(state, AttrId::FillRule)
            .and_then(parse_fill_rule)
            .unwrap_or(Fill::NonZero);
        canvas.set_matrix(state.transform);
        canvas.set_paint(paint);
        canvas.set_opacity(opacity);
        canvas.set_fill_rule(rule);
        canvas.fill_path(path);
    }

    fn stroke_shape(&self, state: &State<'_>, path: &Path, canvas: &mut Canvas) {
        let Some(spec) = self.inherited(state, AttrId::Stroke) else {
            return;
        };
        let Some(paint) = self.resolve_paint(state, spec, path) else {
            return;
        };
        let width = self
            .inherited(state, AttrId::StrokeWidth)
            .and_then(parse_length)
            .unwrap_or(Length::new(1.0, Unit::None))
            .resolve(Axis::Diagonal, state.viewport);
        if width <= 0.0 {
            return;
        }
        let cap = self
            .inherited(state, AttrId::StrokeLinecap)
            .and_then(parse_line_cap)
            .unwrap_or(Cap::Butt);
        let join = self
            .inherited(state, AttrId::StrokeLinejoin)
            .and_then(parse_line_join)
            .unwrap_or(Join::Miter);
        let miter_limit = self
            .inherited(state, AttrId::StrokeMiterlimit)
            .and_then(parse_number)
            .filter(|&m| m >= 1.0)
            .unwrap_or(4.0);
        let mut stroke = Stroke::new(width)
            .with_caps(cap)
            .with_join(join)
            .with_miter_limit(miter_limit);
        if let Some(dashes) = self
            .inherited(state, AttrId::StrokeDasharray)
            .and_then(|d| parse_dash_array(d, state.viewport))
        {
            let offset = self
                .inherited(state, AttrId::StrokeDashoffset)
                .and_then(parse_length)
                .map_or(0.0, |l| l.resolve(Axis::Diagonal, state.viewport));
            stroke = stroke.with_dashes(offset, dashes);
        }
        let opacity = self
            .inherited(state, AttrId::StrokeOpacity)
            .and_then(parse_unit_interval)
            .unwrap_or(1.0);
        canvas.set_matrix(state.transform);
        canvas.set_paint(paint);
        canvas.set_opacity(opacity);
        canvas.set_stroke(stroke);
        canvas.stroke_path(path);
    }

    /// Render the content of `state` offscreen, then composite it into `canvas`.
    fn render_layer(
        &self,
        state: &State<'_>,
        opacity: f32,
        clip: Option<NodeId>,
        canvas: &mut Canvas,
    ) {
        let (width, height) = (canvas.surface().width(), canvas.surface().height());
        let Ok(surface) = Surface::new(width, height) else {
            return;
        };
        let mut layer = Canvas::new(surface);
        self.render_content(state, &mut Output::Paint(&mut layer));
        if let Some(clip) = clip {
            let mut visiting = SmallVec::new();
            let Some(mask) = self.clip_mask(clip, state, width, height, &mut visiting) else {
                return;
            };
            apply_mask(&mut layer, mask);
        }
        canvas.save();
        canvas.reset_matrix();
        canvas.set_operator(Compose::SrcOver);
        canvas.set_opacity(1.0);
        canvas.set_texture(
            Arc::new(layer.into_surface()),
            TextureKind::Plain,
            opacity,
            Affine::IDENTITY,
        );
        canvas.paint();
        canvas.restore();
    }

    /// Build the coverage mask of a `clipPath` applied to the element at `state`.
    ///
    /// Returns `None` when everything is clipped away.
    fn clip_mask(
        &self,
        clip: NodeId,
        state: &State<'_>,
        width: u32,
        height: u32,
        visiting: &mut SmallVec<[NodeId; 4]>,
    ) -> Option<Surface> {
        if visiting.contains(&clip) {
            warn!("skipping cyclic clip-path reference");
            return None;
        }
        let mut transform = state.transform * self.transform_attr(clip);
        if is_object_bounding_box(self.tree.attr(clip, AttrId::ClipPathUnits), false) {
            let bbox = self.content_bounds(state)?;
            transform = transform
                * Affine::translate((bbox.x0, bbox.y0))
                * Affine::scale_non_uniform(bbox.width(), bbox.height());
        }
        let mut mask = Canvas::new(Surface::new(width, height).ok()?);
        let clip_state = State {
            node: clip,
            parent: None,
            transform,
            viewport: state.viewport,
        };
        visiting.push(clip);
        self.render_children(&clip_state, &mut Output::Clip(&mut mask));
        let nested = self
            .clip_reference(clip)
            .map(|inner| self.clip_mask(inner, state, width, height, visiting));
        visiting.pop();
        if let Some(nested) = nested {
            apply_mask(&mut mask, nested?);
        }
        Some(mask.into_surface())
    }

    /// Bounding box of the content of `state` in its own user space.
    fn content_bounds(&self, state: &State<'_>) -> Option<Rect> {
        let local = State {
            transform: Affine::IDENTITY,
            ..*state
        };
        let mut bounds = None;
        self.render_content(&local, &mut Output::Bounds(&mut bounds));
        bounds
    }

    fn shape_path(&self, state: &State<'_>) -> Option<Path> {
        let node = state.node;
        let vp = state.viewport;
        let len = |attr, axis| self.length(node, attr, axis, vp, Length::ZERO);
        let optional = |attr, axis| {
            self.tree
                .attr(node, attr)
                .and_then(parse_length)
                .map(|l: Length| l.resolve(axis, vp))
        };
        let radii = |h: Option<f64>, v: Option<f64>| match (h, v) {
            (Some(rx), Some(ry)) => (rx, ry),
            (Some(r), None) | (None, Some(r)) => (r, r),
            (None, None) => (0.0, 0.0),
        };
        let mut path = Path::new();
        match self.tree.kind(node) {
            ElementKind::Rect => {
                let (x, y) = (len(AttrId::X, Axis::Horizontal), len(AttrId::Y, Axis::Vertical));
                let w = len(AttrId::Width, Axis::Horizontal);
                let h = len(AttrId::Height, Axis::Vertical);
                if w <= 0.0 || h <= 0.0 {
                    return None;
                }
                let (rx, ry) = radii(
                    optional(AttrId::Rx, Axis::Horizontal),
                    optional(AttrId::Ry, Axis::Vertical),
                );
                if rx > 0.0 && ry > 0.0 {
                    path.add_round_rect(x, y, w, h, rx, ry);
                } else {
                    path.add_rect(x, y, w, h);
                }
            }
            ElementKind::Circle => {
                let r = len(AttrId::R, Axis::Diagonal);
                if r <= 0.0 {
                    return None;
                }
                let (cx, cy) = (len(AttrId::Cx, Axis::Horizontal), len(AttrId::Cy, Axis::Vertical));
                path.add_circle(cx, cy, r);
            }
            ElementKind::Ellipse => {
                let (rx, ry) = radii(
                    optional(AttrId::Rx, Axis::Horizontal),
                    optional(AttrId::Ry, Axis::Vertical),
                );
                if rx <= 0.0 || ry <= 0.0 {
                    return None;
                }
                let (cx, cy) = (len(AttrId::Cx, Axis::Horizontal), len(AttrId::Cy, Axis::Vertical));
                path.add_ellipse(cx, cy, rx, ry);
            }
            ElementKind::Line => {
                path.move_to((len(AttrId::X1, Axis::Horizontal), len(AttrId::Y1, Axis::Vertical)));
                path.line_to((len(AttrId::X2, Axis::Horizontal), len(AttrId::Y2, Axis::Vertical)));
            }
            kind @ (ElementKind::Polyline | ElementKind::Polygon) => {
                let points = parse_points(self.tree.attr(node, AttrId::Points)?);
                let (first, rest) = points.split_first()?;
                path.move_to(*first);
                for &p in rest {
                    path.line_to(p);
                }
                if kind == ElementKind::Polygon {
                    path.close();
                }
            }
            ElementKind::Path => {
                let (parsed, error) = Path::parse_prefix(self.tree.attr(node, AttrId::D)?);
                if let Some(error) = error {
                    warn!("truncating path data: {error}");
                }
                path = parsed;
            }
            _ => return None,
        }
        Some(path)
    }

    fn resolve_paint(&self, state: &State<'_>, text: &str, path: &Path) -> Option<Paint> {
        match parse_paint(text) {
            None => {
                warn!("ignoring invalid paint `{text}`");
                None
            }
            Some(PaintSpec::None) => None,
            Some(PaintSpec::Color(color)) => Some(Paint::Color(self.color(state, color))),
            Some(PaintSpec::Url { id, fallback }) => {
                let target = self
                    .tree
                    .element_by_id(id)
                    .filter(|&n| self.tree.kind(n).is_gradient());
                match (target, fallback) {
                    (Some(gradient), _) => self.gradient(state, gradient, path),
                    (None, Some(fallback)) => self.resolve_paint(state, fallback, path),
                    (None, None) => {
                        warn!("unresolved paint reference `#{id}`");
                        None
                    }
                }
            }
            Some(PaintSpec::Var { name, fallback }) => match self.palette.and_then(|p| p(name)) {
                Some(color) => Some(Paint::Color(color)),
                None => self.resolve_paint(state, fallback?, path),
            },
        }
    }

    /// Resolve a color-valued property such as `stop-color`.
    fn resolve_color(&self, state: &State<'_>, text: &str) -> Option<Color> {
        match parse_paint(text)? {
            PaintSpec::Color(color) => Some(self.color(state, color)),
            PaintSpec::Var { name, fallback } => self
                .palette
                .and_then(|p| p(name))
                .or_else(|| self.resolve_color(state, fallback?)),
            PaintSpec::None | PaintSpec::Url { .. } => None,
        }
    }

    fn color(&self, state: &State<'_>, color: ParsedColor) -> Color {
        match color {
            ParsedColor::Color(color) => color,
            ParsedColor::CurrentColor => {
                match self.inherited(state, AttrId::Color).map(parse_color) {
                    Some(Ok(ParsedColor::Color(color))) => color,
                    _ => self.current_color,
                }
            }
        }
    }

    /// The gradient `node` and the gradients it inherits from through `href`.
    fn gradient_chain(&self, node: NodeId) -> SmallVec<[NodeId; 4]> {
        let mut chain: SmallVec<[NodeId; 4]> = smallvec![node];
        let mut current = node;
        while let Some(next) = self.tree.href(current) {
            if !self.tree.kind(next).is_gradient() {
                break;
            }
            if chain.contains(&next) {
                warn!("ignoring cyclic gradient reference");
                break;
            }
            if chain.len() >= MAX_GRADIENT_CHAIN {
                warn!("gradient reference chain exceeds {MAX_GRADIENT_CHAIN} links");
                break;
            }
            chain.push(next);
            current = next;
        }
        chain
    }

    fn gradient(&self, state: &State<'_>, node: NodeId, path: &Path) -> Option<Paint> {
        let tree = self.tree;
        let chain = self.gradient_chain(node);
        let attr = |id: AttrId| chain.iter().find_map(|&n| tree.attr(n, id));

        let owner = chain.iter().copied().find(|&n| {
            tree.children(n)
                .any(|c| tree.kind(c) == ElementKind::Stop)
        })?;
        let mut stops: SmallVec<[(f32, Color); 8]> = SmallVec::new();
        for stop in tree.children(owner) {
            if tree.kind(stop) != ElementKind::Stop {
                continue;
            }
            let stop_state = State {
                node: stop,
                parent: None,
                transform: state.transform,
                viewport: state.viewport,
            };
            let offset = tree
                .attr(stop, AttrId::Offset)
                .and_then(parse_unit_interval)
                .unwrap_or(0.0);
            let color = tree
                .attr(stop, AttrId::StopColor)
                .and_then(|c| self.resolve_color(&stop_state, c))
                .unwrap_or(Color::BLACK);
            let opacity = tree
                .attr(stop, AttrId::StopOpacity)
                .and_then(parse_unit_interval)
                .unwrap_or(1.0);
            stops.push((offset, color.multiply_alpha(opacity)));
        }
        if let [(_, color)] = stops.as_slice() {
            return Some(Paint::Color(*color));
        }

        let bounding_box = is_object_bounding_box(attr(AttrId::GradientUnits), true);
        let units = if bounding_box {
            let bbox = path.extents(true);
            if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
                return None;
            }
            Affine::translate((bbox.x0, bbox.y0))
                * Affine::scale_non_uniform(bbox.width(), bbox.height())
        } else {
            Affine::IDENTITY
        };
        let coord = |id: AttrId, axis: Axis, default: Length| {
            let length = attr(id).and_then(parse_length).unwrap_or(default);
            if bounding_box {
                length.fraction()
            } else {
                length.resolve(axis, state.viewport)
            }
        };
        let gradient = match tree.kind(node) {
            ElementKind::LinearGradient => Gradient::new_linear(
                coord(AttrId::X1, Axis::Horizontal, Length::ZERO),
                coord(AttrId::Y1, Axis::Vertical, Length::ZERO),
                coord(AttrId::X2, Axis::Horizontal, Length::percent(100.0)),
                coord(AttrId::Y2, Axis::Vertical, Length::ZERO),
            ),
            _ => {
                let half = Length::percent(50.0);
                let cx = coord(AttrId::Cx, Axis::Horizontal, half);
                let cy = coord(AttrId::Cy, Axis::Vertical, half);
                let r = coord(AttrId::R, Axis::Diagonal, half);
                let fx = match attr(AttrId::Fx) {
                    Some(_) => coord(AttrId::Fx, Axis::Horizontal, half),
                    None => cx,
                };
                let fy = match attr(AttrId::Fy) {
                    Some(_) => coord(AttrId::Fy, Axis::Vertical, half),
                    None => cy,
                };
                let fr = coord(AttrId::Fr, Axis::Diagonal, Length::ZERO);
                Gradient::new_radial(cx, cy, r, fx, fy, fr)
            }
        };
        let gradient_transform = attr(AttrId::GradientTransform)
            .and_then(|t| parse_transform(t).ok())
            .unwrap_or(Affine::IDENTITY);
        let extend = attr(AttrId::SpreadMethod).map_or(Extend::Pad, parse_spread_method);
        Some(
            gradient
                .with_extend(extend)
                .with_transform(units * gradient_transform)
                .with_stops(stops)
                .into(),
        )
    }

    fn clip_reference(&self, node: NodeId) -> Option<NodeId> {
        let value = self.tree.attr(node, AttrId::ClipPath)?;
        let PaintSpec::Url { id, .. } = parse_paint(value)? else {
            return None;
        };
        let target = self
            .tree
            .element_by_id(id)
            .filter(|&n| self.tree.kind(n) == ElementKind::ClipPath);
        if target.is_none() {
            warn!("unresolved clip-path reference `#{id}`");
        }
        target
    }

    /// The transform an element applies to its children and the viewport they see, or
    /// `None` when the element establishes an empty viewport.
    fn local(&self, node: NodeId, viewport: (f64, f64)) -> Option<(Affine, (f64, f64))> {
        let transform = self.transform_attr(node);
        match self.tree.kind(node) {
            ElementKind::Svg => {
                let (x, y, w, h) = if node == self.tree.root() {
                    (0.0, 0.0, self.size.0, self.size.1)
                } else {
                    let full = Length::percent(100.0);
                    (
                        self.length(node, AttrId::X, Axis::Horizontal, viewport, Length::ZERO),
                        self.length(node, AttrId::Y, Axis::Vertical, viewport, Length::ZERO),
                        self.length(node, AttrId::Width, Axis::Horizontal, viewport, full),
                        self.length(node, AttrId::Height, Axis::Vertical, viewport, full),
                    )
                };
                if w <= 0.0 || h <= 0.0 {
                    return None;
                }
                let transform = transform * Affine::translate((x, y));
                Some(match self.view_box(node) {
                    Some(vb) => (
                        transform * self.aspect(node).transform(vb, w, h),
                        (vb.width(), vb.height()),
                    ),
                    None => (transform, (w, h)),
                })
            }
            ElementKind::Use => {
                let x = self.length(node, AttrId::X, Axis::Horizontal, viewport, Length::ZERO);
                let y = self.length(node, AttrId::Y, Axis::Vertical, viewport, Length::ZERO);
                Some((transform * Affine::translate((x, y)), viewport))
            }
            _ => Some((transform, viewport)),
        }
    }

    /// Look up an inherited property, walking up through the frames that led here and
    /// then through the document ancestors of the outermost frame.
    fn inherited(&self, state: &State<'_>, attr: AttrId) -> Option<&'a str> {
        let mut frame = Some(state);
        let mut outermost = state.node;
        while let Some(s) = frame {
            if let Some(value) = self.specified(s.node, attr) {
                return Some(value);
            }
            outermost = s.node;
            frame = s.parent;
        }
        self.tree
            .ancestors(outermost)
            .find_map(|n| self.specified(n, attr))
    }

    fn specified(&self, node: NodeId, attr: AttrId) -> Option<&'a str> {
        let tree: &'a Tree = self.tree;
        tree.attr(node, attr).filter(|v| v.trim() != "inherit")
    }

    fn is_visible(&self, state: &State<'_>) -> bool {
        !matches!(
            self.inherited(state, AttrId::Visibility).map(str::trim),
            Some("hidden" | "collapse")
        )
    }

    fn is_display_none(&self, node: NodeId) -> bool {
        self.tree
            .attr(node, AttrId::Display)
            .is_some_and(|d| d.trim() == "none")
    }

    fn length(
        &self,
        node: NodeId,
        attr: AttrId,
        axis: Axis,
        viewport: (f64, f64),
        default: Length,
    ) -> f64 {
        self.tree
            .attr(node, attr)
            .and_then(parse_length)
            .unwrap_or(default)
            .resolve(axis, viewport)
    }

    fn transform_attr(&self, node: NodeId) -> Affine {
        match self.tree.attr(node, AttrId::Transform) {
            Some(value) => parse_transform(value).unwrap_or_else(|err| {
                warn!("ignoring invalid transform: {err}");
                Affine::IDENTITY
            }),
            None => Affine::IDENTITY,
        }
    }

    fn view_box(&self, node: NodeId) -> Option<Rect> {
        self.tree.attr(node, AttrId::ViewBox).and_then(parse_view_box)
    }

    fn aspect(&self, node: NodeId) -> AspectRatio {
        self.tree
            .attr(node, AttrId::PreserveAspectRatio)
            .map_or_else(AspectRatio::default, AspectRatio::parse)
    }
}

/// Keep only the parts of `target` covered by `mask`.
fn apply_mask(target: &mut Canvas, mask: Surface) {
    target.save();
    target.reset_matrix();
    target.set_operator(Compose::DestIn);
    target.set_opacity(1.0);
    target.set_texture(Arc::new(mask), TextureKind::Plain, 1.0, Affine::IDENTITY);
    target.paint();
    target.restore();
}

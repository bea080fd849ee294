// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An immediate-mode drawing context.

use std::sync::Arc;

use log::debug;

use plume_common::color::Color;
use plume_common::kurbo::{Affine, Cap, Join, Point, Rect, Stroke};
use plume_common::path::Path;
use plume_common::peniko::{Compose, Extend, Fill};
use plume_common::raster::Rasterizer;
use plume_common::rasterize;
use plume_common::span::SpanBuffer;
use plume_common::transform;

use crate::blend::{self, Source};
use crate::paint::{Gradient, GradientKind, GradientStop, Paint, Texture, TextureKind};
use crate::Surface;

/// The graphics state saved and restored by [`Canvas::save`] and [`Canvas::restore`].
#[derive(Debug, Clone)]
struct State {
    paint: Paint,
    transform: Affine,
    stroke: Stroke,
    fill_rule: Fill,
    op: Compose,
    opacity: f32,
    /// Device-space clip coverage; `None` means the whole surface.
    clip: Option<SpanBuffer>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            paint: Paint::default(),
            transform: Affine::IDENTITY,
            stroke: Stroke::new(1.0)
                .with_caps(Cap::Butt)
                .with_join(Join::Miter)
                .with_miter_limit(10.0),
            fill_rule: Fill::NonZero,
            op: Compose::SrcOver,
            opacity: 1.0,
            clip: None,
        }
    }
}

/// A drawing context that owns its target surface.
///
/// Geometry is accumulated into a current path in user space, then filled, stroked or used
/// as a clip under the current transform.
#[derive(Debug)]
pub struct Canvas {
    surface: Surface,
    path: Path,
    state: State,
    stack: Vec<State>,
    rasterizer: Rasterizer,
    spans: SpanBuffer,
    clipped: SpanBuffer,
}

impl Canvas {
    /// Create a canvas drawing into `surface`.
    pub fn new(surface: Surface) -> Self {
        Self::with_rasterizer(surface, Rasterizer::default())
    }

    /// Create a canvas with a specific rasterizer configuration.
    pub fn with_rasterizer(surface: Surface, rasterizer: Rasterizer) -> Self {
        Self {
            surface,
            path: Path::new(),
            state: State::default(),
            stack: Vec::new(),
            rasterizer,
            spans: SpanBuffer::new(),
            clipped: SpanBuffer::new(),
        }
    }

    /// The target surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The target surface, mutably.
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Consume the canvas and return its surface.
    pub fn into_surface(self) -> Surface {
        self.surface
    }

    /// Push a copy of the graphics state.
    pub fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    /// Pop the graphics state pushed by the matching [`Self::save`]. Unbalanced calls are ignored.
    pub fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => debug!("Ignoring restore without a matching save."),
        }
    }

    // --- Paint ---

    /// Set the current paint.
    pub fn set_paint(&mut self, paint: impl Into<Paint>) {
        self.state.paint = paint.into();
    }

    /// The current paint.
    pub fn paint_source(&self) -> &Paint {
        &self.state.paint
    }

    /// Set a solid color.
    pub fn set_color(&mut self, color: Color) {
        self.set_paint(color);
    }

    /// Set an opaque solid color from components in `0.0..=1.0`.
    pub fn set_rgb(&mut self, r: f32, g: f32, b: f32) {
        self.set_rgba(r, g, b, 1.0);
    }

    /// Set a solid color from components in `0.0..=1.0`.
    pub fn set_rgba(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.set_paint(Color::new([r, g, b, a].map(|c| c.clamp(0.0, 1.0))));
    }

    /// Set a linear gradient paint.
    pub fn set_linear_gradient(
        &mut self,
        (x1, y1): (f64, f64),
        (x2, y2): (f64, f64),
        extend: Extend,
        stops: &[GradientStop],
        transform: Affine,
    ) {
        self.set_gradient(GradientKind::Linear { x1, y1, x2, y2 }, extend, stops, transform);
    }

    /// Set a two-point radial gradient paint.
    pub fn set_radial_gradient(
        &mut self,
        (cx, cy, cr): (f64, f64, f64),
        (fx, fy, fr): (f64, f64, f64),
        extend: Extend,
        stops: &[GradientStop],
        transform: Affine,
    ) {
        let kind = GradientKind::Radial {
            cx,
            cy,
            cr,
            fx,
            fy,
            fr,
        };
        self.set_gradient(kind, extend, stops, transform);
    }

    fn set_gradient(
        &mut self,
        kind: GradientKind,
        extend: Extend,
        stops: &[GradientStop],
        transform: Affine,
    ) {
        let mut gradient = match kind {
            GradientKind::Linear { x1, y1, x2, y2 } => Gradient::new_linear(x1, y1, x2, y2),
            GradientKind::Radial {
                cx,
                cy,
                cr,
                fx,
                fy,
                fr,
            } => Gradient::new_radial(cx, cy, cr, fx, fy, fr),
        }
        .with_extend(extend)
        .with_transform(transform);
        for stop in stops {
            gradient.add_stop(stop.offset, stop.color);
        }
        self.set_paint(gradient);
    }

    /// Set a texture paint.
    pub fn set_texture(
        &mut self,
        surface: Arc<Surface>,
        kind: TextureKind,
        opacity: f32,
        transform: Affine,
    ) {
        self.set_paint(Texture {
            surface,
            kind,
            opacity: opacity.clamp(0.0, 1.0),
            transform,
        });
    }

    // --- State ---

    /// Set the fill rule used by fill and clip operations.
    pub fn set_fill_rule(&mut self, fill_rule: Fill) {
        self.state.fill_rule = fill_rule;
    }

    /// The current fill rule.
    pub fn fill_rule(&self) -> Fill {
        self.state.fill_rule
    }

    /// Set the compositing operator.
    pub fn set_operator(&mut self, op: Compose) {
        self.state.op = op;
    }

    /// The current compositing operator.
    pub fn operator(&self) -> Compose {
        self.state.op
    }

    /// Set the global opacity, clamped to `0.0..=1.0`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.state.opacity = opacity.clamp(0.0, 1.0);
    }

    /// The global opacity.
    pub fn opacity(&self) -> f32 {
        self.state.opacity
    }

    /// Replace the whole stroke style.
    pub fn set_stroke(&mut self, stroke: Stroke) {
        self.state.stroke = stroke;
    }

    /// The current stroke style.
    pub fn stroke_style(&self) -> &Stroke {
        &self.state.stroke
    }

    /// Set the stroke width.
    pub fn set_line_width(&mut self, width: f64) {
        self.state.stroke.width = width;
    }

    /// Set both line caps.
    pub fn set_line_cap(&mut self, cap: Cap) {
        self.state.stroke.start_cap = cap;
        self.state.stroke.end_cap = cap;
    }

    /// Set the line join.
    pub fn set_line_join(&mut self, join: Join) {
        self.state.stroke.join = join;
    }

    /// Set the miter limit.
    pub fn set_miter_limit(&mut self, limit: f64) {
        self.state.stroke.miter_limit = limit;
    }

    /// Set the dash offset and pattern. An empty pattern disables dashing.
    pub fn set_dash(&mut self, offset: f64, dashes: &[f64]) {
        self.state.stroke.dash_offset = offset;
        self.state.stroke.dash_pattern = dashes.iter().copied().collect();
    }

    /// Set the dash offset.
    pub fn set_dash_offset(&mut self, offset: f64) {
        self.state.stroke.dash_offset = offset;
    }

    // --- Transform ---

    /// Translate the user space.
    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.state.transform = transform::translate(self.state.transform, tx, ty);
    }

    /// Scale the user space.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform = transform::scale(self.state.transform, sx, sy);
    }

    /// Rotate the user space by `angle` radians.
    pub fn rotate(&mut self, angle: f64) {
        self.state.transform = transform::rotate(self.state.transform, angle);
    }

    /// Shear the user space by angles in radians.
    pub fn shear(&mut self, shx: f64, shy: f64) {
        self.transform(&transform::shear(shx, shy));
    }

    /// Multiply the user space by `m`.
    pub fn transform(&mut self, m: &Affine) {
        self.state.transform *= *m;
    }

    /// Replace the user-to-device transform.
    pub fn set_matrix(&mut self, m: Affine) {
        self.state.transform = m;
    }

    /// Reset the user-to-device transform to the identity.
    pub fn reset_matrix(&mut self) {
        self.state.transform = Affine::IDENTITY;
    }

    /// The user-to-device transform.
    pub fn matrix(&self) -> Affine {
        self.state.transform
    }

    /// Map a user-space point to device space.
    pub fn map_point(&self, p: Point) -> Point {
        self.state.transform * p
    }

    /// Map a user-space rectangle to its device-space bounding box.
    pub fn map_rect(&self, rect: Rect) -> Rect {
        transform::map_rect(&self.state.transform, rect)
    }

    // --- Path ---

    /// Start a new contour.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to((x, y));
    }

    /// Add a line.
    pub fn line_to(&mut self, x: f64, y: f64) {
        self.path.line_to((x, y));
    }

    /// Add a quadratic curve.
    pub fn quad_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.path.quad_to((x1, y1), (x2, y2));
    }

    /// Add a cubic curve.
    pub fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.path.cubic_to((x1, y1), (x2, y2), (x3, y3));
    }

    /// Add an SVG-style elliptical arc; `angle` is in radians.
    #[expect(clippy::too_many_arguments, reason = "Mirrors the SVG arc command.")]
    pub fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        angle: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) {
        self.path.arc_to(rx, ry, angle, large_arc, sweep, (x, y));
    }

    /// Add a rectangle contour.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.path.add_rect(x, y, w, h);
    }

    /// Add a rounded rectangle contour.
    pub fn round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rx: f64, ry: f64) {
        self.path.add_round_rect(x, y, w, h, rx, ry);
    }

    /// Add an ellipse contour.
    pub fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64) {
        self.path.add_ellipse(cx, cy, rx, ry);
    }

    /// Add a circle contour.
    pub fn circle(&mut self, cx: f64, cy: f64, r: f64) {
        self.path.add_circle(cx, cy, r);
    }

    /// Add a circular arc from `a0` to `a1` radians.
    pub fn arc(&mut self, cx: f64, cy: f64, r: f64, a0: f64, a1: f64, ccw: bool) {
        self.path.add_arc(cx, cy, r, a0, a1, ccw);
    }

    /// Append another path.
    pub fn add_path(&mut self, path: &Path) {
        self.path.add_path(path, None);
    }

    /// Discard the current path.
    pub fn new_path(&mut self) {
        self.path.reset();
    }

    /// Close the current contour.
    pub fn close_path(&mut self) {
        self.path.close();
    }

    /// The end point of the current path.
    pub fn current_point(&self) -> Option<Point> {
        self.path.current_point()
    }

    /// The current path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // --- Drawing ---

    /// Fill the current path and discard it.
    pub fn fill(&mut self) {
        self.fill_preserve();
        self.path.reset();
    }

    /// Stroke the current path and discard it.
    pub fn stroke(&mut self) {
        self.stroke_preserve();
        self.path.reset();
    }

    /// Intersect the clip with the current path and discard it.
    pub fn clip(&mut self) {
        self.clip_preserve();
        self.path.reset();
    }

    /// Fill the current path, keeping it.
    pub fn fill_preserve(&mut self) {
        let bounds = self.bounds();
        rasterize::fill(
            &mut self.rasterizer,
            &self.path,
            &self.state.transform,
            self.state.fill_rule,
            Some(bounds),
            &mut self.spans,
        );
        self.blend_spans();
    }

    /// Stroke the current path, keeping it.
    pub fn stroke_preserve(&mut self) {
        let bounds = self.bounds();
        rasterize::stroke(
            &mut self.rasterizer,
            &self.path,
            &self.state.transform,
            &self.state.stroke,
            Some(bounds),
            &mut self.spans,
        );
        self.blend_spans();
    }

    /// Intersect the clip with the current path, keeping it.
    pub fn clip_preserve(&mut self) {
        let bounds = self.bounds();
        rasterize::fill(
            &mut self.rasterizer,
            &self.path,
            &self.state.transform,
            self.state.fill_rule,
            Some(bounds),
            &mut self.spans,
        );
        match &self.state.clip {
            Some(clip) => {
                self.clipped.intersect(&self.spans, clip);
                self.state.clip = Some(self.clipped.clone());
            }
            None => self.state.clip = Some(self.spans.clone()),
        }
    }

    /// Paint the whole clip region.
    pub fn paint(&mut self) {
        let coverage = match &self.state.clip {
            Some(clip) => clip,
            None => {
                let (w, h) = (self.surface.width() as i32, self.surface.height() as i32);
                self.spans.init_rect(0, 0, w, h);
                &self.spans
            }
        };
        if let Some(source) = Source::new(&self.state.paint, &self.state.transform) {
            blend::blend(
                &mut self.surface,
                self.state.op,
                &source,
                self.state.opacity,
                coverage,
            );
        }
    }

    /// Fill a rectangle, leaving the current path untouched.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let mut path = Path::new();
        path.add_rect(x, y, w, h);
        self.fill_path(&path);
    }

    /// Fill `path`, leaving the current path untouched.
    pub fn fill_path(&mut self, path: &Path) {
        let saved = core::mem::replace(&mut self.path, path.clone());
        self.fill_preserve();
        self.path = saved;
    }

    /// Stroke a rectangle, leaving the current path untouched.
    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let mut path = Path::new();
        path.add_rect(x, y, w, h);
        self.stroke_path(&path);
    }

    /// Stroke `path`, leaving the current path untouched.
    pub fn stroke_path(&mut self, path: &Path) {
        let saved = core::mem::replace(&mut self.path, path.clone());
        self.stroke_preserve();
        self.path = saved;
    }

    /// Intersect the clip with a rectangle, leaving the current path untouched.
    pub fn clip_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let mut path = Path::new();
        path.add_rect(x, y, w, h);
        self.clip_path(&path);
    }

    /// Intersect the clip with `path`, leaving the current path untouched.
    pub fn clip_path(&mut self, path: &Path) {
        let saved = core::mem::replace(&mut self.path, path.clone());
        self.clip_preserve();
        self.path = saved;
    }

    /// Remove the clip.
    pub fn reset_clip(&mut self) {
        self.state.clip = None;
    }

    /// Device-space bounds of the current path's interior.
    pub fn fill_extents(&self) -> Rect {
        self.map_rect(self.path.extents(true))
    }

    /// Device-space bounds of the current path's stroke, including caps and miters.
    pub fn stroke_extents(&self) -> Rect {
        let stroke = &self.state.stroke;
        let half = stroke.width / 2.0;
        let square =
            matches!(stroke.start_cap, Cap::Square) || matches!(stroke.end_cap, Cap::Square);
        let cap_limit = if square { half * core::f64::consts::SQRT_2 } else { half };
        let join_limit = if matches!(stroke.join, Join::Miter) {
            half * stroke.miter_limit
        } else {
            half
        };
        let delta = cap_limit.max(join_limit);
        self.map_rect(self.path.extents(true).inflate(delta, delta))
    }

    /// Device-space bounds of the clip region.
    pub fn clip_extents(&self) -> Rect {
        match &self.state.clip {
            Some(clip) => clip.extents(),
            None => self.bounds(),
        }
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            f64::from(self.surface.width()),
            f64::from(self.surface.height()),
        )
    }

    fn blend_spans(&mut self) {
        let coverage = match &self.state.clip {
            Some(clip) => {
                self.clipped.intersect(&self.spans, clip);
                &self.clipped
            }
            None => &self.spans,
        };
        if let Some(source) = Source::new(&self.state.paint, &self.state.transform) {
            blend::blend(
                &mut self.surface,
                self.state.op,
                &source,
                self.state.opacity,
                coverage,
            );
        }
    }
}

// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint sources: solid colors, gradients and textures.

use std::sync::Arc;

use plume_common::color::Color;
use plume_common::kurbo::Affine;
use plume_common::peniko::Extend;

use crate::Surface;

/// A color at a position along a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position in `0.0..=1.0`.
    pub offset: f32,
    /// Color at this position.
    pub color: Color,
}

/// The geometry of a gradient, in the gradient's own coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    /// Colors vary along the line from `(x1, y1)` to `(x2, y2)`.
    Linear {
        /// Start x.
        x1: f64,
        /// Start y.
        y1: f64,
        /// End x.
        x2: f64,
        /// End y.
        y2: f64,
    },
    /// Colors vary between a focal circle and an outer circle.
    Radial {
        /// Center x of the outer circle.
        cx: f64,
        /// Center y of the outer circle.
        cy: f64,
        /// Radius of the outer circle.
        cr: f64,
        /// Center x of the focal circle.
        fx: f64,
        /// Center y of the focal circle.
        fy: f64,
        /// Radius of the focal circle.
        fr: f64,
    },
}

/// A linear or two-point radial gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    /// Geometry of the gradient.
    pub kind: GradientKind,
    /// How colors continue outside `0.0..=1.0`.
    pub extend: Extend,
    /// Stops sorted by offset.
    pub stops: Vec<GradientStop>,
    /// Maps gradient space to user space.
    pub transform: Affine,
}

impl Gradient {
    /// A linear gradient without stops.
    pub fn new_linear(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(GradientKind::Linear { x1, y1, x2, y2 })
    }

    /// A radial gradient without stops.
    pub fn new_radial(cx: f64, cy: f64, cr: f64, fx: f64, fy: f64, fr: f64) -> Self {
        Self::new(GradientKind::Radial {
            cx,
            cy,
            cr,
            fx,
            fy,
            fr,
        })
    }

    fn new(kind: GradientKind) -> Self {
        Self {
            kind,
            extend: Extend::Pad,
            stops: Vec::new(),
            transform: Affine::IDENTITY,
        }
    }

    /// Builder method for setting the extend mode.
    #[must_use]
    pub fn with_extend(mut self, extend: Extend) -> Self {
        self.extend = extend;
        self
    }

    /// Builder method for setting the gradient transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    /// Builder method for appending stops.
    #[must_use]
    pub fn with_stops(mut self, stops: impl IntoIterator<Item = (f32, Color)>) -> Self {
        for (offset, color) in stops {
            self.add_stop(offset, color);
        }
        self
    }

    /// Append a stop. The offset is clamped to `0.0..=1.0` and to be no less than the
    /// previous stop's offset.
    pub fn add_stop(&mut self, offset: f32, color: Color) {
        let min = self.stops.last().map_or(0.0, |s| s.offset);
        let offset = if offset.is_nan() { min } else { offset.clamp(min, 1.0) };
        self.stops.push(GradientStop { offset, color });
    }
}

/// Whether a texture repeats outside its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureKind {
    /// Pixels outside the surface are transparent.
    #[default]
    Plain,
    /// The surface repeats in both directions.
    Tiled,
}

/// An image paint backed by a shared surface.
#[derive(Debug, Clone)]
pub struct Texture {
    /// The image.
    pub surface: Arc<Surface>,
    /// Edge behavior.
    pub kind: TextureKind,
    /// Extra opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Maps texture pixels to user space.
    pub transform: Affine,
}

impl Texture {
    /// A plain, opaque texture placed at the user-space origin.
    pub fn new(surface: Arc<Surface>) -> Self {
        Self {
            surface,
            kind: TextureKind::Plain,
            opacity: 1.0,
            transform: Affine::IDENTITY,
        }
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.surface, &other.surface)
            && self.kind == other.kind
            && self.opacity == other.opacity
            && self.transform == other.transform
    }
}

/// What to fill covered pixels with.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// A solid color.
    Color(Color),
    /// A gradient.
    Gradient(Gradient),
    /// An image.
    Texture(Texture),
}

impl Default for Paint {
    fn default() -> Self {
        Self::Color(Color::BLACK)
    }
}

impl From<Color> for Paint {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<Gradient> for Paint {
    fn from(value: Gradient) -> Self {
        Self::Gradient(value)
    }
}

impl From<Texture> for Paint {
    fn from(value: Texture) -> Self {
        Self::Texture(value)
    }
}

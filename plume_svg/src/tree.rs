// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An arena of parsed elements.
//!
//! Nodes and attributes live in two flat vectors; links between nodes are indices.

use std::collections::HashMap;
use std::ops::Range;

/// Index of an element in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The elements understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ElementKind {
    Svg,
    G,
    Defs,
    Use,
    Symbol,
    Path,
    Rect,
    Circle,
    Ellipse,
    Line,
    Polyline,
    Polygon,
    LinearGradient,
    RadialGradient,
    Stop,
    ClipPath,
}

impl ElementKind {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "svg" => Self::Svg,
            "g" => Self::G,
            "defs" => Self::Defs,
            "use" => Self::Use,
            "symbol" => Self::Symbol,
            "path" => Self::Path,
            "rect" => Self::Rect,
            "circle" => Self::Circle,
            "ellipse" => Self::Ellipse,
            "line" => Self::Line,
            "polyline" => Self::Polyline,
            "polygon" => Self::Polygon,
            "linearGradient" => Self::LinearGradient,
            "radialGradient" => Self::RadialGradient,
            "stop" => Self::Stop,
            "clipPath" => Self::ClipPath,
            _ => return None,
        })
    }

    pub(crate) fn is_shape(self) -> bool {
        matches!(
            self,
            Self::Path
                | Self::Rect
                | Self::Circle
                | Self::Ellipse
                | Self::Line
                | Self::Polyline
                | Self::Polygon
        )
    }

    pub(crate) fn is_gradient(self) -> bool {
        matches!(self, Self::LinearGradient | Self::RadialGradient)
    }
}

/// The attributes understood by the renderer, whether written as XML attributes or as
/// declarations in a `style` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrId {
    Id,
    Transform,
    ViewBox,
    PreserveAspectRatio,
    X,
    Y,
    Width,
    Height,
    Rx,
    Ry,
    Cx,
    Cy,
    R,
    Fx,
    Fy,
    Fr,
    X1,
    Y1,
    X2,
    Y2,
    D,
    Points,
    Href,
    Fill,
    FillOpacity,
    FillRule,
    Stroke,
    StrokeOpacity,
    StrokeWidth,
    StrokeLinecap,
    StrokeLinejoin,
    StrokeMiterlimit,
    StrokeDasharray,
    StrokeDashoffset,
    Opacity,
    Color,
    Display,
    Visibility,
    ClipPath,
    ClipRule,
    ClipPathUnits,
    GradientUnits,
    GradientTransform,
    SpreadMethod,
    Offset,
    StopColor,
    StopOpacity,
}

impl AttrId {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "id" => Self::Id,
            "transform" => Self::Transform,
            "viewBox" => Self::ViewBox,
            "preserveAspectRatio" => Self::PreserveAspectRatio,
            "x" => Self::X,
            "y" => Self::Y,
            "width" => Self::Width,
            "height" => Self::Height,
            "rx" => Self::Rx,
            "ry" => Self::Ry,
            "cx" => Self::Cx,
            "cy" => Self::Cy,
            "r" => Self::R,
            "fx" => Self::Fx,
            "fy" => Self::Fy,
            "fr" => Self::Fr,
            "x1" => Self::X1,
            "y1" => Self::Y1,
            "x2" => Self::X2,
            "y2" => Self::Y2,
            "d" => Self::D,
            "points" => Self::Points,
            "href" | "xlink:href" => Self::Href,
            "fill" => Self::Fill,
            "fill-opacity" => Self::FillOpacity,
            "fill-rule" => Self::FillRule,
            "stroke" => Self::Stroke,
            "stroke-opacity" => Self::StrokeOpacity,
            "stroke-width" => Self::StrokeWidth,
            "stroke-linecap" => Self::StrokeLinecap,
            "stroke-linejoin" => Self::StrokeLinejoin,
            "stroke-miterlimit" => Self::StrokeMiterlimit,
            "stroke-dasharray" => Self::StrokeDasharray,
            "stroke-dashoffset" => Self::StrokeDashoffset,
            "opacity" => Self::Opacity,
            "color" => Self::Color,
            "display" => Self::Display,
            "visibility" => Self::Visibility,
            "clip-path" => Self::ClipPath,
            "clip-rule" => Self::ClipRule,
            "clipPathUnits" => Self::ClipPathUnits,
            "gradientUnits" => Self::GradientUnits,
            "gradientTransform" => Self::GradientTransform,
            "spreadMethod" => Self::SpreadMethod,
            "offset" => Self::Offset,
            "stop-color" => Self::StopColor,
            "stop-opacity" => Self::StopOpacity,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Attribute {
    pub(crate) id: AttrId,
    pub(crate) value: String,
}

#[derive(Debug, Clone)]
struct Node {
    kind: ElementKind,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    attrs: Range<usize>,
}

/// A parsed document: element nodes, their attributes and an id index.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
    attrs: Vec<Attribute>,
    ids: HashMap<String, NodeId>,
}

impl Tree {
    /// The document element. Only valid once a node has been pushed.
    pub(crate) fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append an element as the last child of `parent`.
    ///
    /// The first element to claim an id keeps it.
    pub(crate) fn push(
        &mut self,
        kind: ElementKind,
        parent: Option<NodeId>,
        attrs: impl IntoIterator<Item = Attribute>,
    ) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        let start = self.attrs.len();
        self.attrs.extend(attrs);
        let range = start..self.attrs.len();
        if let Some(attr) = self.attrs[range.clone()]
            .iter()
            .rev()
            .find(|a| a.id == AttrId::Id)
        {
            self.ids.entry(attr.value.trim().to_owned()).or_insert(id);
        }
        self.nodes.push(Node {
            kind,
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
            attrs: range,
        });
        if let Some(parent) = parent {
            let p = &mut self.nodes[parent.index()];
            match p.last_child.replace(id) {
                Some(prev) => self.nodes[prev.index()].next_sibling = Some(id),
                None => p.first_child = Some(id),
            }
        }
        id
    }

    pub(crate) fn kind(&self, node: NodeId) -> ElementKind {
        self.nodes[node.index()].kind
    }

    pub(crate) fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    pub(crate) fn children(&self, node: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.nodes[node.index()].first_child,
        }
    }

    /// Ancestors of `node`, nearest first, not including `node` itself.
    pub(crate) fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), |&n| self.parent(n))
    }

    /// The value of an attribute on `node`. Later declarations win, so `style` overrides
    /// presentation attributes.
    pub(crate) fn attr(&self, node: NodeId, id: AttrId) -> Option<&str> {
        self.attrs[self.nodes[node.index()].attrs.clone()]
            .iter()
            .rev()
            .find(|a| a.id == id)
            .map(|a| a.value.as_str())
    }

    pub(crate) fn has_attr(&self, node: NodeId, id: AttrId) -> bool {
        self.attr(node, id).is_some()
    }

    pub(crate) fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Follow an `href` of the form `#id`.
    pub(crate) fn href(&self, node: NodeId) -> Option<NodeId> {
        let value = self.attr(node, AttrId::Href)?.trim();
        self.element_by_id(value.strip_prefix('#')?)
    }
}

/// Iterator over the children of a node.
#[derive(Debug, Clone)]
pub(crate) struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.nodes[id.index()].next_sibling;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{AttrId, Attribute, ElementKind, Tree};

    fn attr(id: AttrId, value: &str) -> Attribute {
        Attribute {
            id,
            value: value.to_owned(),
        }
    }

    #[test]
    fn links_and_lookup() {
        let mut tree = Tree::default();
        let root = tree.push(ElementKind::Svg, None, []);
        let a = tree.push(ElementKind::G, Some(root), [attr(AttrId::Id, "a")]);
        let b = tree.push(
            ElementKind::Rect,
            Some(a),
            [attr(AttrId::Fill, "red"), attr(AttrId::Fill, "blue")],
        );
        let c = tree.push(ElementKind::Use, Some(root), [attr(AttrId::Href, "#a")]);
        assert_eq!(tree.root(), root);
        assert_eq!(tree.children(root).collect::<Vec<_>>(), [a, c]);
        assert_eq!(tree.ancestors(b).collect::<Vec<_>>(), [a, root]);
        assert_eq!(tree.attr(b, AttrId::Fill), Some("blue"));
        assert_eq!(tree.element_by_id("a"), Some(a));
        assert_eq!(tree.href(c), Some(a));
        assert!(!tree.has_attr(c, AttrId::Fill));
    }

    #[test]
    fn first_id_wins() {
        let mut tree = Tree::default();
        let root = tree.push(ElementKind::Svg, None, []);
        let first = tree.push(ElementKind::Rect, Some(root), [attr(AttrId::Id, "x")]);
        tree.push(ElementKind::Rect, Some(root), [attr(AttrId::Id, "x")]);
        assert_eq!(tree.element_by_id("x"), Some(first));
    }
}

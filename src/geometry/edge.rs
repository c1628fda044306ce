// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Relationship edge routing.
//!
//! A relationship is drawn as one straight segment between the borders of its
//! two element boxes. Each endpoint is found by casting a ray from a box center
//! toward the other box center and clipping it against the box edges, so the
//! segment never crosses a box interior. The end decoration (marker glyph and
//! stroke pattern) is derived from the relationship kind.

use log::{trace, warn};

use super::{Bounds, Point};
use crate::model::{Diagram, Relationship, RelationshipKind};

/// Below this `|cos θ|` the direction counts as vertical.
const VERTICAL_EPSILON: f64 = 1e-9;

/// Glyph drawn at the target end of a relationship line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndMarker {
    None,
    OpenArrow,
    OpenDiamond,
    FilledDiamond,
    /// Unfilled triangle used for inheritance and implementation.
    OpenTriangle,
}

impl EndMarker {
    /// Marker definition id used by SVG renderers (`url(#<id>)`).
    pub fn marker_id(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::OpenArrow => Some("arrow"),
            Self::OpenDiamond => Some("diamond-empty"),
            Self::FilledDiamond => Some("diamond-filled"),
            Self::OpenTriangle => Some("triangle-empty"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrokeStyle {
    Solid,
    Dashed,
}

impl StrokeStyle {
    /// SVG `stroke-dasharray` value, `None` for a continuous line.
    pub fn dash_array(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("4,4"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeDecoration {
    pub marker: EndMarker,
    pub stroke: StrokeStyle,
}

impl EdgeDecoration {
    /// Undecorated solid line.
    pub const PLAIN: Self = Self { marker: EndMarker::None, stroke: StrokeStyle::Solid };

    pub const fn for_kind(kind: RelationshipKind) -> Self {
        let (marker, stroke) = match kind {
            RelationshipKind::Association => (EndMarker::None, StrokeStyle::Solid),
            RelationshipKind::Directed => (EndMarker::OpenArrow, StrokeStyle::Solid),
            RelationshipKind::Aggregation => (EndMarker::OpenDiamond, StrokeStyle::Solid),
            RelationshipKind::Composition => (EndMarker::FilledDiamond, StrokeStyle::Solid),
            RelationshipKind::Inheritance => (EndMarker::OpenTriangle, StrokeStyle::Solid),
            RelationshipKind::Implementation => (EndMarker::OpenTriangle, StrokeStyle::Dashed),
            RelationshipKind::Dependency | RelationshipKind::Usage => {
                (EndMarker::OpenArrow, StrokeStyle::Dashed)
            }
        };
        Self { marker, stroke }
    }
}

/// Looks up the decoration for a raw kind tag.
///
/// Unknown tags are tolerated and drawn as a plain line.
pub fn decoration_for_tag(tag: &str) -> EdgeDecoration {
    match tag.parse::<RelationshipKind>() {
        Ok(kind) => EdgeDecoration::for_kind(kind),
        Err(err) => {
            warn!(tag = tag; "Drawing relationship without decoration: {err}");
            EdgeDecoration::PLAIN
        }
    }
}

/// The drawable segment of one relationship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRoute {
    pub start: Point,
    pub end: Point,
    pub decoration: EdgeDecoration,
}

/// Returns the point where the ray from the center of `bounds` toward `toward`
/// leaves the box.
///
/// If `toward` coincides with the center the ray points right.
pub fn boundary_point(bounds: Bounds, toward: Point) -> Point {
    let center = bounds.center();
    let delta = toward.sub_point(center);
    let theta = delta.y().atan2(delta.x());

    let half_width = bounds.size().width() / 2.0;
    let half_height = bounds.size().height() / 2.0;
    let cos = theta.cos().abs();
    let tan = theta.tan().abs();

    // Vertical edge first, horizontal edge when the ray overshoots it.
    let (mut x, mut y) = if cos < VERTICAL_EPSILON {
        (0.0, half_height)
    } else {
        (half_width, half_width * tan)
    };
    if y > half_height {
        y = half_height;
        x = half_height / tan;
    }

    if delta.x() < 0.0 {
        x = -x;
    }
    if delta.y() < 0.0 {
        y = -y;
    }

    center.add_point(Point::new(x, y))
}

/// Routes a relationship between two boxes.
pub fn route_relationship(source: Bounds, target: Bounds, kind: RelationshipKind) -> EdgeRoute {
    let start = boundary_point(source, target.center());
    let end = boundary_point(target, source.center());
    EdgeRoute { start, end, decoration: EdgeDecoration::for_kind(kind) }
}

/// Routes every relationship of a diagram in insertion order.
///
/// Relationships whose endpoints do not resolve are skipped.
pub fn route_diagram(diagram: &Diagram) -> Vec<(&Relationship, EdgeRoute)> {
    let mut routes = Vec::with_capacity(diagram.relationships().len());
    for relationship in diagram.relationships().values() {
        let source = diagram.element(relationship.source_id());
        let target = diagram.element(relationship.target_id());
        let (Some(source), Some(target)) = (source, target) else {
            warn!(
                relationship_id:% = relationship.id(),
                diagram_id:% = diagram.id();
                "Skipping relationship with unresolved endpoint"
            );
            continue;
        };
        let route = route_relationship(source.bounds(), target.bounds(), relationship.kind());
        trace!(relationship_id:% = relationship.id(), route:?; "Routed relationship");
        routes.push((relationship, route));
    }
    routes
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use rstest::rstest;

    use super::*;
    use crate::model::{ElementId, RelationshipId};

    fn assert_point(actual: Point, x: f64, y: f64) {
        assert!(
            approx_eq!(f64, actual.x(), x, epsilon = 1e-9)
                && approx_eq!(f64, actual.y(), y, epsilon = 1e-9),
            "expected ({x}, {y}), got ({}, {})",
            actual.x(),
            actual.y()
        );
    }

    #[test]
    fn composition_between_horizontally_aligned_boxes() {
        let a = Bounds::from_xywh(0.0, 0.0, 200.0, 100.0);
        let b = Bounds::from_xywh(400.0, 0.0, 200.0, 100.0);

        let route = route_relationship(a, b, RelationshipKind::Composition);

        assert_point(route.start, 200.0, 50.0);
        assert_point(route.end, 400.0, 50.0);
        assert_eq!(route.decoration.marker, EndMarker::FilledDiamond);
        assert_eq!(route.decoration.stroke, StrokeStyle::Solid);
    }

    #[test]
    fn vertically_stacked_boxes_meet_on_horizontal_edges() {
        let top = Bounds::from_xywh(0.0, 0.0, 200.0, 100.0);
        let bottom = Bounds::from_xywh(0.0, 300.0, 200.0, 100.0);

        let route = route_relationship(top, bottom, RelationshipKind::Association);

        assert_point(route.start, 100.0, 100.0);
        assert_point(route.end, 100.0, 300.0);
    }

    #[test]
    fn steep_diagonal_exits_through_top_or_bottom_edge() {
        let bounds = Bounds::from_xywh(0.0, 0.0, 200.0, 100.0);
        // Center (100, 50); direction (100, 200) is steeper than the box diagonal.
        let point = boundary_point(bounds, Point::new(200.0, 250.0));
        assert_point(point, 125.0, 100.0);
    }

    #[test]
    fn shallow_diagonal_exits_through_side_edge() {
        let bounds = Bounds::from_xywh(0.0, 0.0, 200.0, 100.0);
        // Direction (-400, -100) from (100, 50): tan = 0.25, y offset = 25.
        let point = boundary_point(bounds, Point::new(-300.0, -50.0));
        assert_point(point, 0.0, 25.0);
    }

    #[test]
    fn coincident_centers_exit_right() {
        let bounds = Bounds::from_xywh(10.0, 10.0, 50.0, 20.0);
        let point = boundary_point(bounds, bounds.center());
        assert_point(point, 60.0, 20.0);
    }

    #[rstest]
    #[case(RelationshipKind::Association, EndMarker::None, StrokeStyle::Solid)]
    #[case(RelationshipKind::Directed, EndMarker::OpenArrow, StrokeStyle::Solid)]
    #[case(RelationshipKind::Aggregation, EndMarker::OpenDiamond, StrokeStyle::Solid)]
    #[case(RelationshipKind::Composition, EndMarker::FilledDiamond, StrokeStyle::Solid)]
    #[case(RelationshipKind::Inheritance, EndMarker::OpenTriangle, StrokeStyle::Solid)]
    #[case(RelationshipKind::Implementation, EndMarker::OpenTriangle, StrokeStyle::Dashed)]
    #[case(RelationshipKind::Dependency, EndMarker::OpenArrow, StrokeStyle::Dashed)]
    #[case(RelationshipKind::Usage, EndMarker::OpenArrow, StrokeStyle::Dashed)]
    fn decoration_follows_kind(
        #[case] kind: RelationshipKind,
        #[case] marker: EndMarker,
        #[case] stroke: StrokeStyle,
    ) {
        assert_eq!(EdgeDecoration::for_kind(kind), EdgeDecoration { marker, stroke });
    }

    #[test]
    fn tag_aliases_and_unknown_tags() {
        assert_eq!(
            decoration_for_tag("generalization"),
            EdgeDecoration::for_kind(RelationshipKind::Inheritance)
        );
        assert_eq!(
            decoration_for_tag("realization").stroke,
            StrokeStyle::Dashed
        );
        assert_eq!(decoration_for_tag("friendship"), EdgeDecoration::PLAIN);
    }

    #[test]
    fn svg_names() {
        assert_eq!(EndMarker::FilledDiamond.marker_id(), Some("diamond-filled"));
        assert_eq!(EndMarker::OpenTriangle.marker_id(), Some("triangle-empty"));
        assert_eq!(EndMarker::None.marker_id(), None);
        assert_eq!(StrokeStyle::Dashed.dash_array(), Some("4,4"));
        assert_eq!(StrokeStyle::Solid.dash_array(), None);
    }

    #[test]
    fn route_diagram_routes_in_insertion_order() {
        let mut diagram = crate::model::fixtures::two_class_diagram();
        let a = ElementId::new("a").expect("element id");
        let b = ElementId::new("b").expect("element id");
        diagram
            .add_relationship(Relationship::new(
                RelationshipId::new("r1").expect("relationship id"),
                RelationshipKind::Directed,
                a,
                b,
            ))
            .expect("add relationship");

        let routes = route_diagram(&diagram);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].0.id().as_str(), "r1");
        assert_eq!(routes[0].1.decoration.marker, EndMarker::OpenArrow);
    }
}

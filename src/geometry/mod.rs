// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Geometric primitives and relationship edge routing.
//!
//! Coordinates follow the canvas convention: origin at the top-left, `x` grows
//! to the right and `y` grows downward. Element boxes are stored by their
//! top-left corner plus a size; routing works from box centers.

pub mod edge;

use serde::{Deserialize, Serialize};

pub use edge::{
    boundary_point, decoration_for_tag, route_diagram, route_relationship, EdgeDecoration,
    EdgeRoute, EndMarker, StrokeStyle,
};

/// A 2D point in canvas space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn add_point(self, other: Point) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y }
    }

    pub fn sub_point(self, other: Point) -> Self {
        Self { x: self.x - other.x, y: self.y - other.y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width and height of an element box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f64 {
        self.width
    }

    pub fn height(self) -> f64 {
        self.height
    }

    /// Returns true when both dimensions are finite and strictly positive.
    pub fn is_positive(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// An axis-aligned box described by its top-left corner and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    origin: Point,
    size: Size,
}

impl Bounds {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    pub fn origin(self) -> Point {
        self.origin
    }

    pub fn size(self) -> Size {
        self.size
    }

    pub fn center(self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn min_x(self) -> f64 {
        self.origin.x
    }

    pub fn min_y(self) -> f64 {
        self.origin.y
    }

    pub fn max_x(self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }
}

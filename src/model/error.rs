// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use thiserror::Error;

use super::element::ElementKind;
use super::ids::{ElementId, RelationshipId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Diagram,
    Element,
    Member,
    Relationship,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Diagram => "diagram",
            Self::Element => "element",
            Self::Member => "member",
            Self::Relationship => "relationship",
        })
    }
}

/// Invalid use of the diagram model. Failing calls leave the diagram unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{kind} not found (id={id})")]
    NotFound { kind: ObjectKind, id: String },
    #[error("{kind} already exists (id={id})")]
    DuplicateId { kind: ObjectKind, id: String },
    #[error("relationship {relationship_id} references missing element {element_id}")]
    DanglingReference { relationship_id: RelationshipId, element_id: ElementId },
    #[error("{field} cannot be set on {kind} elements")]
    NotApplicable { field: &'static str, kind: ElementKind },
    #[error("element size must be positive (width={width}, height={height})")]
    InvalidSize { width: f64, height: f64 },
    #[error("element position must be finite (x={x}, y={y})")]
    InvalidPosition { x: f64, y: f64 },
    #[error("diagram name must not be empty")]
    EmptyName,
}

impl ModelError {
    pub(crate) fn not_found(kind: ObjectKind, id: impl fmt::Display) -> Self {
        Self::NotFound { kind, id: id.to_string() }
    }

    pub(crate) fn duplicate(kind: ObjectKind, id: impl fmt::Display) -> Self {
        Self::DuplicateId { kind, id: id.to_string() }
    }
}

/// A persisted tag (element kind, member kind, access modifier) that does not
/// name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {field} '{value}'")]
pub struct ParseTagError {
    field: &'static str,
    value: String,
}

impl ParseTagError {
    pub(crate) fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self { field, value: value.into() }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

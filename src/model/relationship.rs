// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::{ElementId, RelationshipId};

/// Semantic kind of a relationship; also selects how its line is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Association,
    Directed,
    Aggregation,
    Composition,
    #[serde(alias = "generalization")]
    Inheritance,
    #[serde(alias = "realization")]
    Implementation,
    Dependency,
    Usage,
}

impl RelationshipKind {
    pub const ALL: [Self; 8] = [
        Self::Association,
        Self::Directed,
        Self::Aggregation,
        Self::Composition,
        Self::Inheritance,
        Self::Implementation,
        Self::Dependency,
        Self::Usage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Association => "association",
            Self::Directed => "directed",
            Self::Aggregation => "aggregation",
            Self::Composition => "composition",
            Self::Inheritance => "inheritance",
            Self::Implementation => "implementation",
            Self::Dependency => "dependency",
            Self::Usage => "usage",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown relationship kind '{0}'")]
pub struct UnknownRelationshipKind(pub String);

impl FromStr for RelationshipKind {
    type Err = UnknownRelationshipKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "association" => Ok(Self::Association),
            "directed" => Ok(Self::Directed),
            "aggregation" => Ok(Self::Aggregation),
            "composition" => Ok(Self::Composition),
            "inheritance" | "generalization" => Ok(Self::Inheritance),
            "implementation" | "realization" => Ok(Self::Implementation),
            "dependency" => Ok(Self::Dependency),
            "usage" => Ok(Self::Usage),
            other => Err(UnknownRelationshipKind(other.to_owned())),
        }
    }
}

/// A directed, typed edge between two elements of the same diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    id: RelationshipId,
    kind: RelationshipKind,
    source_id: ElementId,
    target_id: ElementId,
}

impl Relationship {
    pub fn new(
        id: RelationshipId,
        kind: RelationshipKind,
        source_id: ElementId,
        target_id: ElementId,
    ) -> Self {
        Self { id, kind, source_id, target_id }
    }

    pub fn id(&self) -> &RelationshipId {
        &self.id
    }

    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    pub fn source_id(&self) -> &ElementId {
        &self.source_id
    }

    pub fn target_id(&self) -> &ElementId {
        &self.target_id
    }

    pub fn touches(&self, element_id: &ElementId) -> bool {
        &self.source_id == element_id || &self.target_id == element_id
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }
}

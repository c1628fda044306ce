// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Row shapes of the persisted tables. Field names are the column names.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Diagrams,
    Elements,
    Members,
    Relationships,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Self::Diagrams => "diagrams",
            Self::Elements => "diagram_elements",
            Self::Members => "element_members",
            Self::Relationships => "relationships",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramRow {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRow {
    pub id: String,
    pub diagram_id: String,
    /// `class` or `interface`.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub x_position: f64,
    pub y_position: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRow {
    pub id: String,
    pub element_id: String,
    /// `attribute` or `method`.
    pub member_type: String,
    pub name: String,
    /// `None` for an unspecified type.
    pub data_type: Option<String>,
    pub access_modifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRow {
    pub id: String,
    pub diagram_id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Class diagram model.
//!
//! A diagram owns class/interface elements (with attribute and method members)
//! and the typed relationships between them.

pub mod diagram;
pub mod element;
pub mod error;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod relationship;

pub use diagram::Diagram;
pub use element::{
    AccessModifier, Element, ElementBody, ElementKind, ElementPatch, Member, MemberEdit,
    MemberKind,
};
pub use error::{ModelError, ObjectKind, ParseTagError};
pub use ids::{DiagramId, ElementId, Id, IdError, MemberId, RelationshipId, UserId};
pub use relationship::{Relationship, RelationshipKind, UnknownRelationshipKind};

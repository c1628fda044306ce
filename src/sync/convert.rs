// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Conversions between model values and table rows.

use log::warn;
use thiserror::Error;

use crate::geometry::Bounds;
use crate::model::{
    AccessModifier, Diagram, DiagramId, Element, ElementKind, ElementPatch, Id, IdError, Member,
    MemberKind, ModelError, ParseTagError, Relationship, RelationshipKind,
    UnknownRelationshipKind, UserId,
};
use crate::store::{DiagramRow, ElementRow, MemberRow, RelationshipRow, Table};

/// Why a stored row cannot be turned into a model value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error(transparent)]
    Tag(#[from] ParseTagError),
    #[error(transparent)]
    RelationshipKind(#[from] UnknownRelationshipKind),
    #[error("invalid id: {0}")]
    Id(#[from] IdError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A row that failed conversion, with the table and row id it came from.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("corrupt {table} row {id}")]
pub struct CorruptRow {
    pub table: Table,
    pub id: String,
    #[source]
    pub source: RowError,
}

impl CorruptRow {
    fn wrap(table: Table, id: &str) -> impl FnOnce(RowError) -> Self + '_ {
        move |source| Self { table, id: id.to_owned(), source }
    }
}

fn parse_id<T>(value: &str) -> Result<Id<T>, RowError> {
    Ok(Id::new(value)?)
}

pub fn diagram_from_row(row: DiagramRow) -> Result<Diagram, CorruptRow> {
    let parse = || -> Result<(DiagramId, UserId), RowError> {
        Ok((parse_id(&row.id)?, parse_id(&row.user_id)?))
    };
    let (id, owner_id) = parse().map_err(CorruptRow::wrap(Table::Diagrams, &row.id))?;
    let mut diagram = Diagram::new(id, row.name, owner_id, row.created_at);
    diagram.touch(row.updated_at);
    Ok(diagram)
}

pub fn diagram_to_row(diagram: &Diagram) -> DiagramRow {
    DiagramRow {
        id: diagram.id().to_string(),
        name: diagram.name().to_owned(),
        user_id: diagram.owner_id().to_string(),
        created_at: diagram.created_at(),
        updated_at: diagram.updated_at(),
    }
}

/// Rebuilds an element from its row and member rows. Attribute rows under an
/// interface are dropped.
pub fn element_from_rows(row: &ElementRow, members: &[MemberRow]) -> Result<Element, CorruptRow> {
    let kind = row
        .kind
        .parse::<ElementKind>()
        .map_err(RowError::from)
        .map_err(CorruptRow::wrap(Table::Elements, &row.id))?;

    let mut attributes = Vec::new();
    let mut methods = Vec::new();
    for member_row in members {
        let (member_kind, member) = member_from_row(member_row)
            .map_err(CorruptRow::wrap(Table::Members, &member_row.id))?;
        match (kind, member_kind) {
            (ElementKind::Interface, MemberKind::Attribute) => {
                warn!(
                    element_id = row.id.as_str(),
                    member_id = member_row.id.as_str();
                    "Dropping attribute row stored under an interface"
                );
            }
            (_, MemberKind::Attribute) => attributes.push(member),
            (_, MemberKind::Method) => methods.push(member),
        }
    }

    let build = || -> Result<Element, RowError> {
        let bounds = Bounds::from_xywh(row.x_position, row.y_position, row.width, row.height);
        let mut element = match kind {
            ElementKind::Class => Element::class(parse_id(&row.id)?, row.name.clone(), bounds),
            ElementKind::Interface => {
                Element::interface(parse_id(&row.id)?, row.name.clone(), bounds)
            }
        };
        element.apply_patch(ElementPatch {
            position: Some(bounds.origin()),
            size: Some(bounds.size()),
            attributes: (kind == ElementKind::Class).then_some(attributes),
            methods: Some(methods),
            ..ElementPatch::default()
        })?;
        Ok(element)
    };
    build().map_err(CorruptRow::wrap(Table::Elements, &row.id))
}

fn member_from_row(row: &MemberRow) -> Result<(MemberKind, Member), RowError> {
    let kind = row.member_type.parse::<MemberKind>()?;
    let access = row.access_modifier.parse::<AccessModifier>()?;
    let type_annotation = row.data_type.clone().unwrap_or_default();
    Ok((kind, Member::new(parse_id(&row.id)?, row.name.clone(), type_annotation, access)))
}

pub fn element_to_row(diagram_id: &DiagramId, element: &Element) -> ElementRow {
    let bounds = element.bounds();
    ElementRow {
        id: element.id().to_string(),
        diagram_id: diagram_id.to_string(),
        kind: element.kind().as_str().to_owned(),
        name: element.name().to_owned(),
        x_position: bounds.origin().x(),
        y_position: bounds.origin().y(),
        width: bounds.size().width(),
        height: bounds.size().height(),
    }
}

/// Member rows of an element, attributes first. Empty annotations become NULL.
pub fn member_rows(element: &Element) -> Vec<MemberRow> {
    element
        .all_members()
        .map(|(kind, member)| MemberRow {
            id: member.id().to_string(),
            element_id: element.id().to_string(),
            member_type: kind.as_str().to_owned(),
            name: member.name().to_owned(),
            data_type: Some(member.type_annotation())
                .filter(|annotation| !annotation.is_empty())
                .map(str::to_owned),
            access_modifier: member.access().as_str().to_owned(),
        })
        .collect()
}

pub fn relationship_from_row(row: &RelationshipRow) -> Result<Relationship, CorruptRow> {
    let parse = || -> Result<Relationship, RowError> {
        Ok(Relationship::new(
            parse_id(&row.id)?,
            row.kind.parse::<RelationshipKind>()?,
            parse_id(&row.source_id)?,
            parse_id(&row.target_id)?,
        ))
    };
    parse().map_err(CorruptRow::wrap(Table::Relationships, &row.id))
}

pub fn relationship_to_row(diagram_id: &DiagramId, relationship: &Relationship) -> RelationshipRow {
    RelationshipRow {
        id: relationship.id().to_string(),
        diagram_id: diagram_id.to_string(),
        source_id: relationship.source_id().to_string(),
        target_id: relationship.target_id().to_string(),
        kind: relationship.kind().as_str().to_owned(),
    }
}

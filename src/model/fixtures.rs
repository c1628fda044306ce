// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, TimeZone, Utc};

use super::element::{AccessModifier, Element, Member, MemberKind};
use super::ids::{DiagramId, ElementId, MemberId, RelationshipId, UserId};
use super::relationship::{Relationship, RelationshipKind};
use super::Diagram;
use crate::geometry::Bounds;

pub(crate) fn eid(value: &str) -> ElementId {
    ElementId::new(value).expect("element id")
}

pub(crate) fn mid(value: &str) -> MemberId {
    MemberId::new(value).expect("member id")
}

pub(crate) fn rid(value: &str) -> RelationshipId {
    RelationshipId::new(value).expect("relationship id")
}

pub(crate) fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).single().expect("timestamp")
}

pub(crate) fn empty_diagram(id: &str) -> Diagram {
    Diagram::new(
        DiagramId::new(id).expect("diagram id"),
        "Library",
        UserId::new("u:alice").expect("user id"),
        created_at(),
    )
}

/// Classes `a` at (0,0,200,100) and `b` at (400,0,200,100), no relationships.
pub(crate) fn two_class_diagram() -> Diagram {
    let mut diagram = empty_diagram("d:two");
    diagram
        .add_element(Element::class(eid("a"), "A", Bounds::from_xywh(0.0, 0.0, 200.0, 100.0)))
        .expect("add a");
    diagram
        .add_element(Element::class(eid("b"), "B", Bounds::from_xywh(400.0, 0.0, 200.0, 100.0)))
        .expect("add b");
    diagram
}

/// Book, Patron and Lendable with members and three relationships.
pub(crate) fn library_diagram() -> Diagram {
    let mut diagram = empty_diagram("d:library");

    let book = Element::class(eid("book"), "Book", Bounds::from_xywh(40.0, 40.0, 200.0, 300.0))
        .with_members(
            MemberKind::Attribute,
            vec![
                Member::new(mid("book.isbn"), "isbn", "String", AccessModifier::Private),
                Member::new(mid("book.title"), "title", "", AccessModifier::Protected),
            ],
        )
        .expect("book attributes")
        .with_members(
            MemberKind::Method,
            vec![Member::new(mid("book.lend"), "lend()", "void", AccessModifier::Public)],
        )
        .expect("book methods");
    let patron =
        Element::class(eid("patron"), "Patron", Bounds::from_xywh(420.0, 40.0, 200.0, 300.0))
            .with_members(
                MemberKind::Attribute,
                vec![Member::new(mid("patron.name"), "name", "String", AccessModifier::Default)],
            )
            .expect("patron attributes");
    let lendable =
        Element::interface(eid("lendable"), "Lendable", Bounds::from_xywh(40.0, 420.0, 200.0, 200.0))
            .with_members(
                MemberKind::Method,
                vec![
                    Member::new(mid("lendable.lend"), "lend()", "void", AccessModifier::Public),
                    Member::new(mid("lendable.due"), "due()", "Date", AccessModifier::Public),
                ],
            )
            .expect("lendable methods");

    diagram.add_element(book).expect("add book");
    diagram.add_element(patron).expect("add patron");
    diagram.add_element(lendable).expect("add lendable");

    for (id, kind, source, target) in [
        ("r:borrows", RelationshipKind::Association, "patron", "book"),
        ("r:lendable", RelationshipKind::Implementation, "book", "lendable"),
        ("r:uses", RelationshipKind::Usage, "patron", "lendable"),
    ] {
        diagram
            .add_relationship(Relationship::new(rid(id), kind, eid(source), eid(target)))
            .expect("add relationship");
    }

    diagram
}

// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;
use std::time::Duration;

use classboard::auth::SignedInUser;
use classboard::config::EditorConfig;
use classboard::geometry::{EndMarker, Point, StrokeStyle};
use classboard::model::{ElementPatch, MemberEdit, MemberKind, RelationshipKind, UserId};
use classboard::session::EditingSession;
use classboard::store::MemoryStore;
use classboard::sync::{create_diagram, list_diagrams, load_diagram};

#[tokio::test(start_paused = true)]
async fn edit_autosave_and_reopen() {
    let store = Arc::new(MemoryStore::transactional());
    let owner = UserId::new("u:carol").expect("user id");
    let user = SignedInUser::new(owner.clone()).with_email("carol@example.com");
    let created = create_diagram(store.as_ref(), &user, "Payments").await.expect("create");

    let (mut session, mut reports) =
        EditingSession::open(store.clone(), created.id(), EditorConfig::default())
            .await
            .expect("open");

    let invoice = session.add_class(Point::new(0.0, 0.0)).expect("add class");
    session
        .update_element(&invoice, ElementPatch::name("Invoice"))
        .expect("rename class");
    let total = session.add_member(MemberKind::Attribute).expect("add attribute");
    session
        .update_member(
            &invoice,
            MemberKind::Attribute,
            &total,
            MemberEdit::Name("total".to_owned()),
        )
        .expect("rename attribute");
    session
        .update_member(
            &invoice,
            MemberKind::Attribute,
            &total,
            MemberEdit::TypeAnnotation(String::new()),
        )
        .expect("clear type");

    let payable = session.add_interface(Point::new(400.0, 50.0)).expect("add interface");
    session.add_member(MemberKind::Method).expect("add method");

    session.click_element(&invoice).expect("select invoice");
    session.choose_relationship_kind(RelationshipKind::Implementation).expect("draw");
    session.click_element(&payable).expect("connect").expect("relationship");

    let report = reports.recv().await.expect("autosave report");
    assert!(report.is_ok());
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(reports.try_recv().is_err());

    let reloaded = load_diagram(store.as_ref(), created.id()).await.expect("load");
    assert!(reloaded.eq_ignoring_timestamps(session.diagram()));
    let stored_total = &reloaded.element(&invoice).expect("invoice").attributes()[0];
    assert_eq!(stored_total.notation(), "+ total");

    let routes = session.routes();
    assert_eq!(routes.len(), 1);
    let (_, route) = routes[0];
    assert_eq!(route.start, Point::new(200.0, 150.0));
    assert_eq!(route.end, Point::new(400.0, 150.0));
    assert_eq!(route.decoration.marker, EndMarker::OpenTriangle);
    assert_eq!(route.decoration.stroke, StrokeStyle::Dashed);

    let listed = list_diagrams(store.as_ref(), &owner).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].element_count, 2);
}

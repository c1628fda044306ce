// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Duration as TimeDelta;

use super::{
    convert, create_diagram, list_diagrams, load_diagram, plan_save, save_diagram,
    save_diagram_with_retry, RetryPolicy, SaveSummary, SyncError,
};
use crate::geometry::{Bounds, Point};
use crate::model::fixtures::{eid, library_diagram, two_class_diagram};
use crate::model::{Diagram, DiagramId, Element, ElementPatch, ModelError, UserId};
use crate::store::{
    Fault, MemoryStore, RelationalStore, RelationshipRow, StoreError, Table, WriteOp,
};

async fn store_with(store: MemoryStore, diagram: &Diagram) -> MemoryStore {
    store.insert_diagram(convert::diagram_to_row(diagram)).await.expect("insert diagram row");
    store
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let diagram = library_diagram();
    let store = store_with(MemoryStore::new(), &diagram).await;

    let summary = save_diagram(&store, &diagram).await.expect("save");
    let loaded = load_diagram(&store, diagram.id()).await.expect("load");

    assert!(loaded.eq_ignoring_timestamps(&diagram));
    assert_eq!(
        summary,
        SaveSummary {
            elements_inserted: 3,
            elements_updated: 0,
            elements_deleted: 0,
            members_written: 6,
            relationships_written: 3,
        }
    );
}

#[tokio::test]
async fn every_accepted_element_loads_back() {
    let mut diagram = two_class_diagram();
    let rejected = diagram.add_element(Element::class(
        eid("z"),
        "Z",
        Bounds::from_xywh(0.0, 0.0, 0.0, 100.0),
    ));
    assert!(matches!(rejected, Err(ModelError::InvalidSize { .. })));
    let store = store_with(MemoryStore::new(), &diagram).await;

    save_diagram(&store, &diagram).await.expect("save");
    let loaded = load_diagram(&store, diagram.id()).await.expect("load");

    assert!(loaded.eq_ignoring_timestamps(&diagram));
}

#[tokio::test]
async fn saving_twice_is_idempotent() {
    let diagram = library_diagram();
    let store = store_with(MemoryStore::new(), &diagram).await;

    save_diagram(&store, &diagram).await.expect("first save");
    let first = store.snapshot().await;
    let summary = save_diagram(&store, &diagram).await.expect("second save");

    assert_eq!(store.row_counts().await, first.row_counts());
    assert_eq!(store.snapshot().await, first);
    assert_eq!((summary.elements_inserted, summary.elements_updated), (0, 3));
}

#[tokio::test]
async fn save_removes_stale_elements_and_their_members() {
    let mut diagram = library_diagram();
    let store = store_with(MemoryStore::new(), &diagram).await;
    save_diagram(&store, &diagram).await.expect("save");

    diagram.remove_element(&eid("patron")).expect("remove patron");
    let summary = save_diagram(&store, &diagram).await.expect("save again");

    assert_eq!(summary.elements_deleted, 1);
    let snapshot = store.snapshot().await;
    assert!(!snapshot.elements.contains_key("patron"));
    assert!(!snapshot.members.contains_key("patron.name"));
    let relationship_ids: Vec<&str> = snapshot.relationships.keys().map(String::as_str).collect();
    assert_eq!(relationship_ids, ["r:lendable"]);
    let loaded = load_diagram(&store, diagram.id()).await.expect("load");
    assert!(loaded.eq_ignoring_timestamps(&diagram));
}

#[test]
fn plan_orders_writes_per_element_then_relationships() {
    let diagram = two_class_diagram();
    let stored: HashSet<String> = ["a".to_owned(), "gone".to_owned()].into_iter().collect();

    let plan = plan_save(&diagram, &stored);

    let ops = plan.batch.ops();
    assert!(matches!(&ops[0], WriteOp::UpdateDiagram { id, .. } if id == "d:two"));
    assert!(matches!(&ops[1], WriteOp::UpdateElement(row) if row.id == "a"));
    assert!(matches!(&ops[2], WriteOp::DeleteMembers { element_id } if element_id == "a"));
    assert!(matches!(&ops[3], WriteOp::InsertElement(row) if row.id == "b"));
    assert!(matches!(&ops[4], WriteOp::DeleteMembers { element_id } if element_id == "b"));
    assert!(matches!(&ops[5], WriteOp::DeleteRelationships { .. }));
    assert!(matches!(&ops[6], WriteOp::DeleteElement { id } if id == "gone"));
    assert_eq!(ops.len(), 7);
    assert_eq!(plan.summary.elements_deleted, 1);
}

#[tokio::test]
async fn load_missing_diagram_is_not_found() {
    let store = MemoryStore::new();
    let id = DiagramId::new("d:nope").expect("diagram id");
    assert!(matches!(load_diagram(&store, &id).await, Err(SyncError::NotFound(missing)) if missing == id));
}

#[tokio::test]
async fn failed_select_aborts_load() {
    let diagram = library_diagram();
    let store = store_with(MemoryStore::new(), &diagram).await;
    save_diagram(&store, &diagram).await.expect("save");
    store.inject(Fault::Select(Table::Relationships));

    let err = load_diagram(&store, diagram.id()).await.unwrap_err();

    assert!(err.is_retryable());
    assert!(matches!(err, SyncError::Store(StoreError::Unavailable { table: Table::Relationships, .. })));
}

#[tokio::test]
async fn corrupt_relationship_kind_fails_load() {
    let diagram = two_class_diagram();
    let store = store_with(MemoryStore::new(), &diagram).await;
    save_diagram(&store, &diagram).await.expect("save");
    store
        .insert_relationships(vec![RelationshipRow {
            id: "r:odd".to_owned(),
            diagram_id: "d:two".to_owned(),
            source_id: "a".to_owned(),
            target_id: "b".to_owned(),
            kind: "friendship".to_owned(),
        }])
        .await
        .expect("seed row");

    let err = load_diagram(&store, diagram.id()).await.unwrap_err();

    assert!(matches!(err, SyncError::CorruptRow(row) if row.id == "r:odd"));
}

#[tokio::test]
async fn transactional_store_rolls_back_failed_save() {
    let mut diagram = library_diagram();
    let store = store_with(MemoryStore::transactional(), &diagram).await;
    save_diagram(&store, &diagram).await.expect("save");
    let before = store.snapshot().await;

    diagram
        .update_element(&eid("book"), ElementPatch::position(Point::new(900.0, 900.0)))
        .expect("move");
    store.inject(Fault::WritesAfter(3));

    assert!(save_diagram(&store, &diagram).await.is_err());
    assert_eq!(store.snapshot().await, before);
}

#[tokio::test]
async fn sequential_store_is_left_partial_until_next_save() {
    let diagram = library_diagram();
    let store = store_with(MemoryStore::new(), &diagram).await;
    save_diagram(&store, &diagram).await.expect("save");

    // Fails right after the first element's members were deleted.
    store.inject(Fault::WritesAfter(3));
    assert!(save_diagram(&store, &diagram).await.is_err());
    assert!(store.select_members("book").await.expect("members").is_empty());

    store.clear_faults();
    save_diagram(&store, &diagram).await.expect("save again");
    let loaded = load_diagram(&store, diagram.id()).await.expect("load");
    assert!(loaded.eq_ignoring_timestamps(&diagram));
}

#[tokio::test]
async fn retry_converges_after_transient_failure() {
    let diagram = library_diagram();
    let store = store_with(MemoryStore::new(), &diagram).await;
    store.inject(Fault::OneWriteAfter(5));

    save_diagram_with_retry(&store, &diagram, RetryPolicy::new(3, Duration::ZERO))
        .await
        .expect("save with retry");

    let loaded = load_diagram(&store, diagram.id()).await.expect("load");
    assert!(loaded.eq_ignoring_timestamps(&diagram));
    assert_eq!(store.commits(), 1);
}

#[tokio::test]
async fn retry_gives_up_after_configured_attempts() {
    let diagram = library_diagram();
    let store = store_with(MemoryStore::new(), &diagram).await;
    store.inject(Fault::WritesAfter(0));

    let err = save_diagram_with_retry(&store, &diagram, RetryPolicy::new(2, Duration::ZERO))
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(store.commits(), 0);
}

#[tokio::test]
async fn logical_failures_are_not_retried() {
    let diagram = library_diagram();
    let store = MemoryStore::new();

    let err = save_diagram_with_retry(&store, &diagram, RetryPolicy::new(5, Duration::ZERO))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Store(StoreError::NotFound { table: Table::Diagrams, .. })));
    assert_eq!(store.row_counts().await.elements, 0);
}

#[tokio::test]
async fn create_and_list_diagrams() {
    let store = MemoryStore::new();
    let alice = UserId::new("u:alice").expect("user id");
    let bob = UserId::new("u:bob").expect("user id");

    assert!(matches!(
        create_diagram(&store, &alice, "   ").await,
        Err(SyncError::Model(ModelError::EmptyName))
    ));

    let mut older = create_diagram(&store, &alice, " Orders ").await.expect("create");
    let newer = create_diagram(&store, &alice, "Billing").await.expect("create");
    create_diagram(&store, &bob, "Other").await.expect("create");

    assert_eq!(older.name(), "Orders");
    older.add_element(two_class_diagram().elements()[0].clone()).expect("add element");
    older.touch(newer.updated_at() + TimeDelta::hours(1));
    save_diagram(&store, &older).await.expect("save");

    let listed = list_diagrams(&store, &alice).await.expect("list");
    let names: Vec<&str> = listed.iter().map(|summary| summary.name.as_str()).collect();
    assert_eq!(names, ["Orders", "Billing"]);
    assert_eq!(listed[0].element_count, 1);
    assert_eq!(listed[1].element_count, 0);
}

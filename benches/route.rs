// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use classboard::geometry::{route_diagram, Bounds};
use classboard::model::{
    AccessModifier, Diagram, DiagramId, Element, ElementId, Member, MemberId, MemberKind,
    Relationship, RelationshipId, RelationshipKind, UserId,
};
use classboard::sync::plan_save;

/// A `side` x `side` grid of classes, each linked to its right and lower
/// neighbour, with `members` attributes per class.
fn grid(side: usize, members: usize) -> Diagram {
    let created_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().expect("timestamp");
    let mut diagram = Diagram::new(
        DiagramId::new("d:bench").expect("diagram id"),
        "Bench",
        UserId::new("u:bench").expect("user id"),
        created_at,
    );
    let id = |row: usize, col: usize| ElementId::new(format!("e{row}x{col}")).expect("element id");

    for row in 0..side {
        for col in 0..side {
            let attributes = (0..members)
                .map(|m| {
                    Member::new(
                        MemberId::new(format!("m{row}x{col}x{m}")).expect("member id"),
                        format!("field{m}"),
                        "String",
                        AccessModifier::Private,
                    )
                })
                .collect();
            let bounds = Bounds::from_xywh(col as f64 * 320.0, row as f64 * 420.0, 200.0, 300.0);
            let element = Element::class(id(row, col), format!("C{row}x{col}"), bounds)
                .with_members(MemberKind::Attribute, attributes)
                .expect("members");
            diagram.add_element(element).expect("add element");
        }
    }

    let kinds = RelationshipKind::ALL;
    let mut n = 0;
    for row in 0..side {
        for col in 0..side {
            for (to_row, to_col) in [(row, col + 1), (row + 1, col)] {
                if to_row >= side || to_col >= side {
                    continue;
                }
                let relationship = Relationship::new(
                    RelationshipId::new(format!("r{n}")).expect("relationship id"),
                    kinds[n % kinds.len()],
                    id(row, col),
                    id(to_row, to_col),
                );
                diagram.add_relationship(relationship).expect("add relationship");
                n += 1;
            }
        }
    }
    diagram
}

// Group names (`route.diagram`, `sync.plan_save`) and case ids stay stable so
// results remain comparable across refactors.
fn benches_route(c: &mut Criterion) {
    let cases = [("small", grid(4, 3)), ("medium", grid(12, 6)), ("large", grid(32, 8))];

    {
        let mut group = c.benchmark_group("route.diagram");
        for (case_id, diagram) in &cases {
            group.throughput(Throughput::Elements(diagram.relationships().len() as u64));
            group.bench_function(*case_id, |b| {
                b.iter(|| black_box(route_diagram(black_box(diagram)).len()))
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("sync.plan_save");
        for (case_id, diagram) in &cases {
            let stored: HashSet<String> =
                diagram.elements().keys().step_by(2).map(|id| id.to_string()).collect();
            group.throughput(Throughput::Elements(diagram.elements().len() as u64));
            group.bench_function(*case_id, |b| {
                b.iter(|| black_box(plan_save(black_box(diagram), &stored).batch.len()))
            });
        }
        group.finish();
    }
}

criterion_group!(benches, benches_route);
criterion_main!(benches);

// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Batched mutation operations for diagrams.
//!
//! A batch is applied all-or-nothing and produces a minimal delta that callers
//! use to refresh derived state (routes, selection, pending saves).

use std::collections::HashSet;

use log::{debug, trace};

use crate::model::{
    Diagram, DiagramId, Element, ElementId, ElementPatch, Member, MemberEdit, MemberId,
    MemberKind, ModelError, Relationship, RelationshipId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    AddElement(Element),
    UpdateElement { element_id: ElementId, patch: ElementPatch },
    RemoveElement { element_id: ElementId },
    AddMember { element_id: ElementId, kind: MemberKind, member: Member },
    UpdateMember { element_id: ElementId, kind: MemberKind, member_id: MemberId, edit: MemberEdit },
    RemoveMember { element_id: ElementId, member_id: MemberId },
    AddRelationship(Relationship),
    RemoveRelationship { relationship_id: RelationshipId },
    RenameDiagram { name: String },
}

/// Addresses one object inside a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectRef {
    Diagram(DiagramId),
    Element(ElementId),
    Member { element_id: ElementId, member_id: MemberId },
    Relationship(RelationshipId),
}

/// Objects changed by a batch, each list sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<ObjectRef>,
    pub removed: Vec<ObjectRef>,
    pub updated: Vec<ObjectRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<ObjectRef>,
    removed: HashSet<ObjectRef>,
    updated: HashSet<ObjectRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, object_ref: ObjectRef) {
        self.updated.remove(&object_ref);
        // Remove-then-add of the same id within one batch reads as an update.
        if self.removed.remove(&object_ref) {
            self.updated.insert(object_ref);
            return;
        }
        self.added.insert(object_ref);
    }

    fn record_removed(&mut self, object_ref: ObjectRef) {
        self.updated.remove(&object_ref);
        if self.added.remove(&object_ref) {
            return;
        }
        self.removed.insert(object_ref);
    }

    fn record_updated(&mut self, object_ref: ObjectRef) {
        if self.added.contains(&object_ref) || self.removed.contains(&object_ref) {
            return;
        }
        self.updated.insert(object_ref);
    }

    fn finish(self) -> Delta {
        let mut added = self.added.into_iter().collect::<Vec<_>>();
        let mut removed = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated = self.updated.into_iter().collect::<Vec<_>>();

        added.sort();
        removed.sort();
        updated.sort();

        Delta { added, removed, updated }
    }
}

/// Applies `ops` in order. On the first failing op the diagram is left exactly
/// as it was and the error is returned.
pub fn apply_ops(diagram: &mut Diagram, ops: &[Op]) -> Result<Delta, ModelError> {
    if ops.is_empty() {
        return Ok(Delta::default());
    }

    let mut next = diagram.clone();
    let mut delta = DeltaBuilder::default();

    for (index, op) in ops.iter().enumerate() {
        trace!(diagram_id:% = next.id(), index; "applying op");
        if let Err(err) = apply_op(&mut next, op, &mut delta) {
            debug!(diagram_id:% = diagram.id(), index, err:%; "op batch rejected");
            return Err(err);
        }
    }

    *diagram = next;
    Ok(delta.finish())
}

fn apply_op(diagram: &mut Diagram, op: &Op, delta: &mut DeltaBuilder) -> Result<(), ModelError> {
    match op {
        Op::AddElement(element) => {
            diagram.add_element(element.clone())?;
            delta.record_added(ObjectRef::Element(element.id().clone()));
        }
        Op::UpdateElement { element_id, patch } => {
            diagram.update_element(element_id, patch.clone())?;
            delta.record_updated(ObjectRef::Element(element_id.clone()));
        }
        Op::RemoveElement { element_id } => {
            let (element, relationships) = diagram.remove_element(element_id)?;
            for (_, member) in element.all_members() {
                delta.record_removed(member_ref(element_id, member.id()));
            }
            for relationship in relationships {
                delta.record_removed(ObjectRef::Relationship(relationship.id().clone()));
            }
            delta.record_removed(ObjectRef::Element(element_id.clone()));
        }
        Op::AddMember { element_id, kind, member } => {
            diagram.add_member(element_id, *kind, member.clone())?;
            delta.record_added(member_ref(element_id, member.id()));
        }
        Op::UpdateMember { element_id, kind, member_id, edit } => {
            diagram.update_member(element_id, *kind, member_id, edit.clone())?;
            delta.record_updated(member_ref(element_id, member_id));
        }
        Op::RemoveMember { element_id, member_id } => {
            diagram.remove_member(element_id, member_id)?;
            delta.record_removed(member_ref(element_id, member_id));
        }
        Op::AddRelationship(relationship) => {
            diagram.add_relationship(relationship.clone())?;
            delta.record_added(ObjectRef::Relationship(relationship.id().clone()));
        }
        Op::RemoveRelationship { relationship_id } => {
            diagram.remove_relationship(relationship_id)?;
            delta.record_removed(ObjectRef::Relationship(relationship_id.clone()));
        }
        Op::RenameDiagram { name } => {
            diagram.rename(name.as_str())?;
            delta.record_updated(ObjectRef::Diagram(diagram.id().clone()));
        }
    }
    Ok(())
}

fn member_ref(element_id: &ElementId, member_id: &MemberId) -> ObjectRef {
    ObjectRef::Member { element_id: element_id.clone(), member_id: member_id.clone() }
}

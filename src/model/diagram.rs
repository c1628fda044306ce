// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use super::element::{check_bounds, Element, ElementPatch, Member, MemberEdit, MemberKind};
use super::error::{ModelError, ObjectKind};
use super::ids::{DiagramId, ElementId, MemberId, RelationshipId, UserId};
use super::relationship::Relationship;

/// A class diagram: the aggregate root of elements and relationships.
///
/// Elements and relationships iterate in insertion order. Every relationship
/// endpoint resolves to an element of the same diagram, and member ids are
/// unique across the whole diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    id: DiagramId,
    name: String,
    owner_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    elements: IndexMap<ElementId, Element>,
    relationships: IndexMap<RelationshipId, Relationship>,
}

impl Diagram {
    pub fn new(
        id: DiagramId,
        name: impl Into<String>,
        owner_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            owner_id,
            created_at,
            updated_at: created_at,
            elements: IndexMap::new(),
            relationships: IndexMap::new(),
        }
    }

    pub fn id(&self) -> &DiagramId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Advances the update timestamp. Timestamps never move backwards.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        if at > self.updated_at {
            self.updated_at = at;
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), ModelError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyName);
        }
        self.name = trimmed.to_owned();
        Ok(())
    }

    pub fn elements(&self) -> &IndexMap<ElementId, Element> {
        &self.elements
    }

    pub fn element(&self, element_id: &ElementId) -> Option<&Element> {
        self.elements.get(element_id)
    }

    pub fn relationships(&self) -> &IndexMap<RelationshipId, Relationship> {
        &self.relationships
    }

    pub fn relationship(&self, relationship_id: &RelationshipId) -> Option<&Relationship> {
        self.relationships.get(relationship_id)
    }

    /// Relationships with `element_id` as source or target.
    pub fn relationships_of<'a>(
        &'a self,
        element_id: &ElementId,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        let element_id = element_id.clone();
        self.relationships.values().filter(move |r| r.touches(&element_id))
    }

    pub fn add_element(&mut self, element: Element) -> Result<(), ModelError> {
        if self.elements.contains_key(element.id()) {
            return Err(ModelError::duplicate(ObjectKind::Element, element.id()));
        }
        check_bounds(element.bounds())?;
        for (_, member) in element.all_members() {
            self.ensure_member_id_free(member.id(), None)?;
        }
        self.elements.insert(element.id().clone(), element);
        Ok(())
    }

    pub fn update_element(
        &mut self,
        element_id: &ElementId,
        patch: ElementPatch,
    ) -> Result<(), ModelError> {
        if !self.elements.contains_key(element_id) {
            return Err(ModelError::not_found(ObjectKind::Element, element_id));
        }
        let patched_members = patch.attributes.iter().chain(patch.methods.iter()).flatten();
        for member in patched_members {
            self.ensure_member_id_free(member.id(), Some(element_id))?;
        }
        self.element_mut(element_id)?.apply_patch(patch)
    }

    /// Appends a member to the attribute or method list of an element.
    pub fn add_member(
        &mut self,
        element_id: &ElementId,
        kind: MemberKind,
        member: Member,
    ) -> Result<(), ModelError> {
        if !self.elements.contains_key(element_id) {
            return Err(ModelError::not_found(ObjectKind::Element, element_id));
        }
        self.ensure_member_id_free(member.id(), None)?;
        let element = self.element_mut(element_id)?;
        let element_kind = element.kind();
        let Some(list) = element.member_list_mut(kind) else {
            return Err(ModelError::NotApplicable { field: "attributes", kind: element_kind });
        };
        list.push(member);
        Ok(())
    }

    /// Edits one field of a member.
    ///
    /// The attribute list is searched only when `kind` is an attribute and the
    /// owner is a class; every other combination searches the method list.
    pub fn update_member(
        &mut self,
        element_id: &ElementId,
        kind: MemberKind,
        member_id: &MemberId,
        edit: MemberEdit,
    ) -> Result<(), ModelError> {
        let list = self.element_mut(element_id)?.edit_target_mut(kind);
        let Some(member) = list.iter_mut().find(|m| m.id() == member_id) else {
            return Err(ModelError::not_found(ObjectKind::Member, member_id));
        };
        member.apply_edit(edit);
        Ok(())
    }

    pub fn remove_member(
        &mut self,
        element_id: &ElementId,
        member_id: &MemberId,
    ) -> Result<Member, ModelError> {
        let element = self.element_mut(element_id)?;
        for kind in [MemberKind::Attribute, MemberKind::Method] {
            let Some(list) = element.member_list_mut(kind) else {
                continue;
            };
            if let Some(index) = list.iter().position(|m| m.id() == member_id) {
                return Ok(list.remove(index));
            }
        }
        Err(ModelError::not_found(ObjectKind::Member, member_id))
    }

    pub fn add_relationship(&mut self, relationship: Relationship) -> Result<(), ModelError> {
        if self.relationships.contains_key(relationship.id()) {
            return Err(ModelError::duplicate(ObjectKind::Relationship, relationship.id()));
        }
        for endpoint in [relationship.source_id(), relationship.target_id()] {
            if !self.elements.contains_key(endpoint) {
                return Err(ModelError::DanglingReference {
                    relationship_id: relationship.id().clone(),
                    element_id: endpoint.clone(),
                });
            }
        }
        self.relationships.insert(relationship.id().clone(), relationship);
        Ok(())
    }

    pub fn remove_relationship(
        &mut self,
        relationship_id: &RelationshipId,
    ) -> Result<Relationship, ModelError> {
        self.relationships
            .shift_remove(relationship_id)
            .ok_or_else(|| ModelError::not_found(ObjectKind::Relationship, relationship_id))
    }

    /// Removes an element with its members and every relationship touching it.
    pub fn remove_element(
        &mut self,
        element_id: &ElementId,
    ) -> Result<(Element, Vec<Relationship>), ModelError> {
        let element = self
            .elements
            .shift_remove(element_id)
            .ok_or_else(|| ModelError::not_found(ObjectKind::Element, element_id))?;

        let mut removed = Vec::new();
        self.relationships.retain(|_, relationship| {
            if relationship.touches(element_id) {
                removed.push(relationship.clone());
                false
            } else {
                true
            }
        });
        Ok((element, removed))
    }

    /// Structural equality that ignores creation/update timestamps.
    pub fn eq_ignoring_timestamps(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.owner_id == other.owner_id
            && self.elements.len() == other.elements.len()
            && self.elements.iter().zip(other.elements.iter()).all(|(a, b)| a == b)
            && self.relationships.len() == other.relationships.len()
            && self.relationships.iter().zip(other.relationships.iter()).all(|(a, b)| a == b)
    }

    fn element_mut(&mut self, element_id: &ElementId) -> Result<&mut Element, ModelError> {
        self.elements
            .get_mut(element_id)
            .ok_or_else(|| ModelError::not_found(ObjectKind::Element, element_id))
    }

    fn ensure_member_id_free(
        &self,
        member_id: &MemberId,
        owner: Option<&ElementId>,
    ) -> Result<(), ModelError> {
        let taken = self
            .elements
            .values()
            .filter(|element| Some(element.id()) != owner)
            .any(|element| element.member(member_id).is_some());
        if taken {
            return Err(ModelError::duplicate(ObjectKind::Member, member_id));
        }
        Ok(())
    }
}

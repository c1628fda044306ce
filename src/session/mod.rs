// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Interactive editing of one diagram.
//!
//! [`EditingSession`] owns the diagram and the selection/drawing mode, turns UI
//! events into [`Op`] batches and schedules a debounced save after every
//! successful mutation.

pub mod autosave;
pub mod debounce;

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::EditorConfig;
use crate::geometry::{route_diagram, EdgeRoute, Point};
use crate::model::{
    Diagram, DiagramId, Element, ElementId, ElementPatch, MemberEdit, MemberId, MemberKind,
    ModelError, ObjectKind, Relationship, RelationshipId, RelationshipKind,
};
use crate::ops::{apply_ops, Delta, Op};
use crate::store::RelationalStore;
use crate::sync::{load_diagram, SaveSummary, SyncError};

pub use autosave::{AutoSaver, SaveReport};
pub use debounce::Debouncer;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no element is selected")]
    NothingSelected,
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("save worker is not running")]
    SaverClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Idle,
    Selected(ElementId),
    /// Waiting for the target click of a new relationship.
    DrawingRelationship { kind: RelationshipKind, source: ElementId },
}

impl EditorMode {
    /// The element the mode is anchored on.
    pub fn focus(&self) -> Option<&ElementId> {
        match self {
            Self::Idle => None,
            Self::Selected(element_id) => Some(element_id),
            Self::DrawingRelationship { source, .. } => Some(source),
        }
    }
}

#[derive(Debug)]
pub struct EditingSession {
    diagram: Diagram,
    mode: EditorMode,
    config: EditorConfig,
    saver: AutoSaver,
}

impl EditingSession {
    pub fn new(diagram: Diagram, config: EditorConfig, saver: AutoSaver) -> Self {
        Self { diagram, mode: EditorMode::Idle, config, saver }
    }

    /// Loads a diagram and starts its save worker.
    pub async fn open<S>(
        store: Arc<S>,
        diagram_id: &DiagramId,
        config: EditorConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SaveReport>), SessionError>
    where
        S: RelationalStore + ?Sized + 'static,
    {
        let diagram = load_diagram(store.as_ref(), diagram_id).await?;
        let (saver, reports) = AutoSaver::spawn(store, &config);
        info!(diagram_id:% = diagram_id; "Editing session opened");
        Ok((Self::new(diagram, config, saver), reports))
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn has_pending_save(&self) -> bool {
        self.saver.is_pending()
    }

    /// Handles a click on an element.
    ///
    /// While drawing, a click on another element creates the relationship and
    /// selects the target; a click on the source keeps drawing. Returns the id
    /// of a created relationship.
    pub fn click_element(
        &mut self,
        element_id: &ElementId,
    ) -> Result<Option<RelationshipId>, SessionError> {
        if self.diagram.element(element_id).is_none() {
            return Err(ModelError::NotFound {
                kind: ObjectKind::Element,
                id: element_id.to_string(),
            }
            .into());
        }

        let drawing = match &self.mode {
            EditorMode::DrawingRelationship { kind, source } => Some((*kind, source.clone())),
            EditorMode::Idle | EditorMode::Selected(_) => None,
        };
        let Some((kind, source)) = drawing else {
            self.mode = EditorMode::Selected(element_id.clone());
            return Ok(None);
        };
        if &source == element_id {
            return Ok(None);
        }

        let relationship =
            Relationship::new(RelationshipId::generate(), kind, source, element_id.clone());
        let relationship_id = relationship.id().clone();
        self.commit(vec![Op::AddRelationship(relationship)])?;
        debug!(relationship_id:% = relationship_id; "Relationship drawn");
        self.mode = EditorMode::Selected(element_id.clone());
        Ok(Some(relationship_id))
    }

    /// Enters relationship drawing from the selected element. While already
    /// drawing, swaps the kind and keeps the source.
    pub fn choose_relationship_kind(&mut self, kind: RelationshipKind) -> Result<(), SessionError> {
        let source = self.mode.focus().cloned().ok_or(SessionError::NothingSelected)?;
        self.mode = EditorMode::DrawingRelationship { kind, source };
        Ok(())
    }

    /// Leaves drawing mode back to the source, or clears the selection.
    pub fn cancel(&mut self) {
        self.mode = match std::mem::replace(&mut self.mode, EditorMode::Idle) {
            EditorMode::DrawingRelationship { source, .. } => EditorMode::Selected(source),
            EditorMode::Selected(_) | EditorMode::Idle => EditorMode::Idle,
        };
    }

    /// Commits the dropped position of a dragged element and selects it.
    pub fn drag_element(&mut self, element_id: &ElementId, to: Point) -> Result<(), SessionError> {
        self.commit(vec![Op::UpdateElement {
            element_id: element_id.clone(),
            patch: ElementPatch::position(to),
        }])?;
        self.mode = EditorMode::Selected(element_id.clone());
        Ok(())
    }

    pub fn add_class(&mut self, at: Point) -> Result<ElementId, SessionError> {
        let element = self.config.new_class(at);
        self.add_element(element)
    }

    pub fn add_interface(&mut self, at: Point) -> Result<ElementId, SessionError> {
        let element = self.config.new_interface(at);
        self.add_element(element)
    }

    fn add_element(&mut self, element: Element) -> Result<ElementId, SessionError> {
        let element_id = element.id().clone();
        self.commit(vec![Op::AddElement(element)])?;
        self.mode = EditorMode::Selected(element_id.clone());
        Ok(element_id)
    }

    /// Appends a default attribute or method to the selected element.
    pub fn add_member(&mut self, kind: MemberKind) -> Result<MemberId, SessionError> {
        let element_id = self.selected_element()?;
        let member = self.config.new_member(kind);
        let member_id = member.id().clone();
        self.commit(vec![Op::AddMember { element_id, kind, member }])?;
        Ok(member_id)
    }

    pub fn update_element(
        &mut self,
        element_id: &ElementId,
        patch: ElementPatch,
    ) -> Result<(), SessionError> {
        if patch.is_empty() {
            return Ok(());
        }
        self.commit(vec![Op::UpdateElement { element_id: element_id.clone(), patch }])?;
        Ok(())
    }

    pub fn update_member(
        &mut self,
        element_id: &ElementId,
        kind: MemberKind,
        member_id: &MemberId,
        edit: MemberEdit,
    ) -> Result<(), SessionError> {
        self.commit(vec![Op::UpdateMember {
            element_id: element_id.clone(),
            kind,
            member_id: member_id.clone(),
            edit,
        }])?;
        Ok(())
    }

    pub fn remove_member(
        &mut self,
        element_id: &ElementId,
        member_id: &MemberId,
    ) -> Result<(), SessionError> {
        self.commit(vec![Op::RemoveMember {
            element_id: element_id.clone(),
            member_id: member_id.clone(),
        }])?;
        Ok(())
    }

    /// Deletes the selected element with its members and relationships.
    pub fn delete_selected(&mut self) -> Result<Delta, SessionError> {
        let element_id = self.selected_element()?;
        let delta = self.commit(vec![Op::RemoveElement { element_id }])?;
        self.mode = EditorMode::Idle;
        Ok(delta)
    }

    pub fn remove_relationship(&mut self, relationship_id: &RelationshipId) -> Result<(), SessionError> {
        self.commit(vec![Op::RemoveRelationship { relationship_id: relationship_id.clone() }])?;
        Ok(())
    }

    pub fn rename_diagram(&mut self, name: &str) -> Result<(), SessionError> {
        self.commit(vec![Op::RenameDiagram { name: name.to_owned() }])?;
        Ok(())
    }

    /// Saves immediately, superseding any pending autosave.
    pub async fn save(&self) -> Result<SaveSummary, SessionError> {
        self.saver.save_now(self.diagram.clone()).await
    }

    /// Hands a pending autosave to the save worker without waiting out the
    /// debounce delay.
    pub fn flush(&self) -> bool {
        self.saver.flush()
    }

    /// Line geometry for every drawable relationship.
    pub fn routes(&self) -> Vec<(&Relationship, EdgeRoute)> {
        route_diagram(&self.diagram)
    }

    fn selected_element(&self) -> Result<ElementId, SessionError> {
        self.mode.focus().cloned().ok_or(SessionError::NothingSelected)
    }

    fn commit(&mut self, ops: Vec<Op>) -> Result<Delta, SessionError> {
        let delta = apply_ops(&mut self.diagram, &ops)?;
        self.diagram.touch(Utc::now());
        self.saver.schedule(self.diagram.clone());
        Ok(delta)
    }
}

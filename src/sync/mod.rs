// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reconciliation between in-memory diagrams and the relational store.
//!
//! Loading reads the diagram row, its elements, each element's members and the
//! relationships, and rebuilds a [`Diagram`]. Saving converges the stored rows
//! to a snapshot: element rows are upserted, member and relationship rows are
//! fully replaced, and element rows missing from the snapshot are deleted.

pub mod convert;

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use thiserror::Error;

use crate::auth::Identity;
use crate::model::{Diagram, DiagramId, ModelError, UserId};
use crate::store::{RelationalStore, StoreError, WriteBatch, WriteOp};

pub use convert::{CorruptRow, RowError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("diagram {0} not found")]
    NotFound(DiagramId),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    CorruptRow(#[from] CorruptRow),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl SyncError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_retryable())
    }
}

/// Row writes planned for one save, with what they amount to.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePlan {
    pub batch: WriteBatch,
    pub summary: SaveSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub elements_inserted: usize,
    pub elements_updated: usize,
    pub elements_deleted: usize,
    pub members_written: usize,
    pub relationships_written: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// `attempts` is clamped to at least one.
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self { attempts: attempts.max(1), backoff }
    }

    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

/// A diagram as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSummary {
    pub id: DiagramId,
    pub name: String,
    pub updated_at: DateTime<Utc>,
    pub element_count: usize,
}

/// Loads a diagram with all its elements, members and relationships.
///
/// Any failed select aborts the load. Rows with unknown tags or ids fail it as
/// [`SyncError::CorruptRow`].
pub async fn load_diagram<S>(store: &S, diagram_id: &DiagramId) -> Result<Diagram, SyncError>
where
    S: RelationalStore + ?Sized,
{
    info!(diagram_id:% = diagram_id; "Loading diagram");
    let Some(row) = store.select_diagram(diagram_id.as_str()).await? else {
        return Err(SyncError::NotFound(diagram_id.clone()));
    };
    let mut diagram = convert::diagram_from_row(row)?;

    for element_row in store.select_elements(diagram_id.as_str()).await? {
        let member_rows = store.select_members(&element_row.id).await?;
        let element = convert::element_from_rows(&element_row, &member_rows)?;
        diagram.add_element(element)?;
    }
    for relationship_row in store.select_relationships(diagram_id.as_str()).await? {
        diagram.add_relationship(convert::relationship_from_row(&relationship_row)?)?;
    }

    debug!(
        diagram_id:% = diagram_id,
        elements = diagram.elements().len(),
        relationships = diagram.relationships().len();
        "Loaded diagram"
    );
    Ok(diagram)
}

/// Plans the writes that converge the stored rows of `diagram` to it.
///
/// `stored_element_ids` are the ids of the element rows the store currently
/// holds for the diagram; everything else in the snapshot is inserted.
pub fn plan_save(diagram: &Diagram, stored_element_ids: &HashSet<String>) -> SavePlan {
    let diagram_id = diagram.id();
    let mut batch = WriteBatch::new();
    let mut summary = SaveSummary::default();

    batch.push(WriteOp::UpdateDiagram {
        id: diagram_id.to_string(),
        name: diagram.name().to_owned(),
        updated_at: diagram.updated_at(),
    });

    for element in diagram.elements().values() {
        let row = convert::element_to_row(diagram_id, element);
        if stored_element_ids.contains(element.id().as_str()) {
            summary.elements_updated += 1;
            batch.push(WriteOp::UpdateElement(row));
        } else {
            summary.elements_inserted += 1;
            batch.push(WriteOp::InsertElement(row));
        }
        batch.push(WriteOp::DeleteMembers { element_id: element.id().to_string() });
        let members = convert::member_rows(element);
        if !members.is_empty() {
            summary.members_written += members.len();
            batch.push(WriteOp::InsertMembers(members));
        }
    }

    batch.push(WriteOp::DeleteRelationships { diagram_id: diagram_id.to_string() });

    let mut stale: Vec<&String> = stored_element_ids
        .iter()
        .filter(|id| !diagram.elements().contains_key(id.as_str()))
        .collect();
    stale.sort();
    for id in stale {
        summary.elements_deleted += 1;
        batch.push(WriteOp::DeleteElement { id: id.clone() });
    }

    let relationships: Vec<_> = diagram
        .relationships()
        .values()
        .map(|relationship| convert::relationship_to_row(diagram_id, relationship))
        .collect();
    if !relationships.is_empty() {
        summary.relationships_written = relationships.len();
        batch.push(WriteOp::InsertRelationships(relationships));
    }

    SavePlan { batch, summary }
}

/// Saves `diagram` once.
///
/// The writes go to the store as one [`WriteBatch`]. On a transactional store
/// a failure leaves the stored rows untouched. Otherwise a failure can leave
/// the rows partially written (for example members deleted but not yet
/// re-inserted) until the next successful save; the batch is idempotent, so
/// re-running it converges. The in-memory diagram is never modified.
pub async fn save_diagram<S>(store: &S, diagram: &Diagram) -> Result<SaveSummary, SyncError>
where
    S: RelationalStore + ?Sized,
{
    let stored_element_ids: HashSet<String> = store
        .select_elements(diagram.id().as_str())
        .await?
        .into_iter()
        .map(|row| row.id)
        .collect();
    let SavePlan { batch, summary } = plan_save(diagram, &stored_element_ids);

    debug!(diagram_id:% = diagram.id(), writes = batch.len(); "Committing save");
    store.commit(&batch).await?;
    info!(
        diagram_id:% = diagram.id(),
        inserted = summary.elements_inserted,
        updated = summary.elements_updated,
        deleted = summary.elements_deleted;
        "Saved diagram"
    );
    Ok(summary)
}

/// [`save_diagram`], repeated on retryable store failures.
pub async fn save_diagram_with_retry<S>(
    store: &S,
    diagram: &Diagram,
    policy: RetryPolicy,
) -> Result<SaveSummary, SyncError>
where
    S: RelationalStore + ?Sized,
{
    let mut attempt = 1;
    loop {
        match save_diagram(store, diagram).await {
            Err(err) if err.is_retryable() && attempt < policy.attempts() => {
                warn!(diagram_id:% = diagram.id(), attempt, err:%; "Save failed, retrying");
                tokio::time::sleep(policy.backoff() * attempt).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Creates and stores a new empty diagram owned by `identity`.
pub async fn create_diagram<S, I>(store: &S, identity: &I, name: &str) -> Result<Diagram, SyncError>
where
    S: RelationalStore + ?Sized,
    I: Identity + ?Sized,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(ModelError::EmptyName.into());
    }
    let diagram = Diagram::new(DiagramId::generate(), name, identity.user_id().clone(), Utc::now());
    store.insert_diagram(convert::diagram_to_row(&diagram)).await?;
    info!(diagram_id:% = diagram.id(), owner:% = diagram.owner_id(); "Created diagram");
    Ok(diagram)
}

/// Diagrams owned by `owner`, most recently updated first.
pub async fn list_diagrams<S>(store: &S, owner: &UserId) -> Result<Vec<DiagramSummary>, SyncError>
where
    S: RelationalStore + ?Sized,
{
    let mut summaries = Vec::new();
    for row in store.select_diagrams_by_owner(owner.as_str()).await? {
        let element_count = store.select_elements(&row.id).await?.len();
        let diagram = convert::diagram_from_row(row)?;
        summaries.push(DiagramSummary {
            id: diagram.id().clone(),
            name: diagram.name().to_owned(),
            updated_at: diagram.updated_at(),
            element_count,
        });
    }
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(summaries)
}

#[cfg(test)]
mod tests;

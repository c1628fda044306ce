// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Relational persistence contract.
//!
//! Four id-addressed tables (diagrams, elements, members, relationships), each
//! foreign-keyed to its owner. Stores return rows of a table in insertion
//! order. [`MemoryStore`] is the in-process implementation.

pub mod memory;
pub mod rows;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use memory::{Fault, MemoryStore, MemoryTables, RowCounts};
pub use rows::{DiagramRow, ElementRow, MemberRow, RelationshipRow, Table};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{table}: no row with id {id}")]
    NotFound { table: Table, id: String },
    #[error("{table}: duplicate key {id}")]
    Conflict { table: Table, id: String },
    #[error("{table}: row {id} references missing {column} {reference}")]
    ForeignKey { table: Table, id: String, column: &'static str, reference: String },
    #[error("{table}: row {id} is still referenced by {referenced_by}")]
    Restricted { table: Table, id: String, referenced_by: Table },
    #[error("{table}: store unavailable")]
    Unavailable {
        table: Table,
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    pub fn unavailable(table: Table, source: impl Into<BoxError>) -> Self {
        Self::Unavailable { table, source: source.into() }
    }

    /// Transport-level failures that may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// One row-level write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    UpdateDiagram { id: String, name: String, updated_at: DateTime<Utc> },
    InsertElement(ElementRow),
    UpdateElement(ElementRow),
    /// Deletes the element row and its member rows. A missing row is a no-op.
    DeleteElement { id: String },
    DeleteMembers { element_id: String },
    InsertMembers(Vec<MemberRow>),
    DeleteRelationships { diagram_id: String },
    InsertRelationships(Vec<RelationshipRow>),
}

impl WriteOp {
    pub fn table(&self) -> Table {
        match self {
            Self::UpdateDiagram { .. } => Table::Diagrams,
            Self::InsertElement(_) | Self::UpdateElement(_) | Self::DeleteElement { .. } => {
                Table::Elements
            }
            Self::DeleteMembers { .. } | Self::InsertMembers(_) => Table::Members,
            Self::DeleteRelationships { .. } | Self::InsertRelationships(_) => {
                Table::Relationships
            }
        }
    }
}

/// Ordered writes of one save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Async access to the relational backend.
///
/// Every call is atomic per row. [`RelationalStore::commit`] applies a whole
/// batch; the provided implementation issues the writes one by one and stops
/// at the first failure, leaving earlier writes in place. Backends with
/// transactions override it and report [`RelationalStore::is_transactional`].
#[async_trait]
pub trait RelationalStore: Send + Sync {
    async fn select_diagram(&self, id: &str) -> Result<Option<DiagramRow>, StoreError>;
    async fn select_diagrams_by_owner(&self, user_id: &str) -> Result<Vec<DiagramRow>, StoreError>;
    async fn select_elements(&self, diagram_id: &str) -> Result<Vec<ElementRow>, StoreError>;
    async fn select_members(&self, element_id: &str) -> Result<Vec<MemberRow>, StoreError>;
    async fn select_relationships(
        &self,
        diagram_id: &str,
    ) -> Result<Vec<RelationshipRow>, StoreError>;

    async fn insert_diagram(&self, row: DiagramRow) -> Result<(), StoreError>;
    async fn update_diagram(
        &self,
        id: &str,
        name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
    async fn insert_element(&self, row: ElementRow) -> Result<(), StoreError>;
    async fn update_element(&self, row: ElementRow) -> Result<(), StoreError>;
    async fn delete_element(&self, id: &str) -> Result<(), StoreError>;
    async fn insert_members(&self, rows: Vec<MemberRow>) -> Result<(), StoreError>;
    async fn delete_members(&self, element_id: &str) -> Result<(), StoreError>;
    async fn delete_relationships(&self, diagram_id: &str) -> Result<(), StoreError>;
    async fn insert_relationships(&self, rows: Vec<RelationshipRow>) -> Result<(), StoreError>;

    fn is_transactional(&self) -> bool {
        false
    }

    async fn commit(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        for op in batch.ops() {
            self.write(op.clone()).await?;
        }
        Ok(())
    }

    /// Dispatches one [`WriteOp`] to the matching row-level call.
    async fn write(&self, op: WriteOp) -> Result<(), StoreError> {
        match op {
            WriteOp::UpdateDiagram { id, name, updated_at } => {
                self.update_diagram(&id, &name, updated_at).await
            }
            WriteOp::InsertElement(row) => self.insert_element(row).await,
            WriteOp::UpdateElement(row) => self.update_element(row).await,
            WriteOp::DeleteElement { id } => self.delete_element(&id).await,
            WriteOp::DeleteMembers { element_id } => self.delete_members(&element_id).await,
            WriteOp::InsertMembers(rows) => self.insert_members(rows).await,
            WriteOp::DeleteRelationships { diagram_id } => {
                self.delete_relationships(&diagram_id).await
            }
            WriteOp::InsertRelationships(rows) => self.insert_relationships(rows).await,
        }
    }
}

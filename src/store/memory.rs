// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::{debug, trace};
use tokio::sync::RwLock;

use super::rows::{DiagramRow, ElementRow, MemberRow, RelationshipRow, Table};
use super::{RelationalStore, StoreError, WriteBatch, WriteOp};

/// Table contents of a [`MemoryStore`], keyed by row id in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTables {
    pub diagrams: IndexMap<String, DiagramRow>,
    pub elements: IndexMap<String, ElementRow>,
    pub members: IndexMap<String, MemberRow>,
    pub relationships: IndexMap<String, RelationshipRow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub diagrams: usize,
    pub elements: usize,
    pub members: usize,
    pub relationships: usize,
}

impl MemoryTables {
    pub fn row_counts(&self) -> RowCounts {
        RowCounts {
            diagrams: self.diagrams.len(),
            elements: self.elements.len(),
            members: self.members.len(),
            relationships: self.relationships.len(),
        }
    }

    fn insert_diagram(&mut self, row: DiagramRow) -> Result<(), StoreError> {
        if self.diagrams.contains_key(&row.id) {
            return Err(StoreError::Conflict { table: Table::Diagrams, id: row.id });
        }
        self.diagrams.insert(row.id.clone(), row);
        Ok(())
    }

    fn apply(&mut self, op: &WriteOp) -> Result<(), StoreError> {
        match op {
            WriteOp::UpdateDiagram { id, name, updated_at } => {
                self.update_diagram(id, name, *updated_at)
            }
            WriteOp::InsertElement(row) => self.insert_element(row),
            WriteOp::UpdateElement(row) => self.update_element(row),
            WriteOp::DeleteElement { id } => self.delete_element(id),
            WriteOp::DeleteMembers { element_id } => {
                self.members.retain(|_, member| &member.element_id != element_id);
                Ok(())
            }
            WriteOp::InsertMembers(rows) => self.insert_members(rows),
            WriteOp::DeleteRelationships { diagram_id } => {
                self.relationships.retain(|_, relationship| &relationship.diagram_id != diagram_id);
                Ok(())
            }
            WriteOp::InsertRelationships(rows) => self.insert_relationships(rows),
        }
    }

    fn update_diagram(
        &mut self,
        id: &str,
        name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let Some(row) = self.diagrams.get_mut(id) else {
            return Err(StoreError::NotFound { table: Table::Diagrams, id: id.to_owned() });
        };
        row.name = name.to_owned();
        row.updated_at = updated_at;
        Ok(())
    }

    fn insert_element(&mut self, row: &ElementRow) -> Result<(), StoreError> {
        if self.elements.contains_key(&row.id) {
            return Err(StoreError::Conflict { table: Table::Elements, id: row.id.clone() });
        }
        self.ensure_diagram(Table::Elements, &row.id, &row.diagram_id)?;
        self.elements.insert(row.id.clone(), row.clone());
        Ok(())
    }

    fn update_element(&mut self, row: &ElementRow) -> Result<(), StoreError> {
        if !self.elements.contains_key(&row.id) {
            return Err(StoreError::NotFound { table: Table::Elements, id: row.id.clone() });
        }
        self.ensure_diagram(Table::Elements, &row.id, &row.diagram_id)?;
        self.elements.insert(row.id.clone(), row.clone());
        Ok(())
    }

    fn delete_element(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.elements.contains_key(id) {
            return Ok(());
        }
        let referenced = self
            .relationships
            .values()
            .any(|relationship| relationship.source_id == id || relationship.target_id == id);
        if referenced {
            return Err(StoreError::Restricted {
                table: Table::Elements,
                id: id.to_owned(),
                referenced_by: Table::Relationships,
            });
        }
        self.members.retain(|_, member| member.element_id != id);
        self.elements.shift_remove(id);
        Ok(())
    }

    fn insert_members(&mut self, rows: &[MemberRow]) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for row in rows {
            if self.members.contains_key(&row.id) || !seen.insert(row.id.as_str()) {
                return Err(StoreError::Conflict { table: Table::Members, id: row.id.clone() });
            }
            if !self.elements.contains_key(&row.element_id) {
                return Err(StoreError::ForeignKey {
                    table: Table::Members,
                    id: row.id.clone(),
                    column: "element_id",
                    reference: row.element_id.clone(),
                });
            }
        }
        for row in rows {
            self.members.insert(row.id.clone(), row.clone());
        }
        Ok(())
    }

    fn insert_relationships(&mut self, rows: &[RelationshipRow]) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for row in rows {
            if self.relationships.contains_key(&row.id) || !seen.insert(row.id.as_str()) {
                return Err(StoreError::Conflict {
                    table: Table::Relationships,
                    id: row.id.clone(),
                });
            }
            self.ensure_diagram(Table::Relationships, &row.id, &row.diagram_id)?;
            for (column, reference) in [("source_id", &row.source_id), ("target_id", &row.target_id)]
            {
                if !self.elements.contains_key(reference) {
                    return Err(StoreError::ForeignKey {
                        table: Table::Relationships,
                        id: row.id.clone(),
                        column,
                        reference: reference.clone(),
                    });
                }
            }
        }
        for row in rows {
            self.relationships.insert(row.id.clone(), row.clone());
        }
        Ok(())
    }

    fn ensure_diagram(&self, table: Table, id: &str, diagram_id: &str) -> Result<(), StoreError> {
        if self.diagrams.contains_key(diagram_id) {
            return Ok(());
        }
        Err(StoreError::ForeignKey {
            table,
            id: id.to_owned(),
            column: "diagram_id",
            reference: diagram_id.to_owned(),
        })
    }
}

/// Failure modes a [`MemoryStore`] can be told to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every write after the first `n` fails until faults are cleared.
    WritesAfter(usize),
    /// Only the write after the first `n` fails; the store then recovers.
    OneWriteAfter(usize),
    /// Selects against the table fail.
    Select(Table),
}

#[derive(Debug, Default)]
struct FaultState {
    fault: Option<Fault>,
    writes: usize,
}

impl FaultState {
    fn check_write(&mut self, table: Table) -> Result<(), StoreError> {
        let Some(fault) = self.fault else {
            return Ok(());
        };
        let seen = self.writes;
        self.writes += 1;
        match fault {
            Fault::WritesAfter(n) if seen >= n => Err(injected(table)),
            Fault::OneWriteAfter(n) if seen == n => {
                self.fault = None;
                Err(injected(table))
            }
            _ => Ok(()),
        }
    }

    fn check_select(&self, table: Table) -> Result<(), StoreError> {
        match self.fault {
            Some(Fault::Select(failing)) if failing == table => Err(injected(table)),
            _ => Ok(()),
        }
    }
}

fn injected(table: Table) -> StoreError {
    StoreError::unavailable(table, io::Error::new(io::ErrorKind::ConnectionReset, "injected fault"))
}

/// In-memory [`RelationalStore`] with foreign-key checks.
///
/// Member rows cascade with their element; deleting an element that a
/// relationship still references is rejected. A transactional store applies
/// [`WriteBatch`]es all-or-nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<MemoryTables>,
    faults: Mutex<FaultState>,
    transactional: bool,
    commits: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transactional() -> Self {
        Self { transactional: true, ..Self::default() }
    }

    pub fn with_tables(tables: MemoryTables) -> Self {
        Self { tables: RwLock::new(tables), ..Self::default() }
    }

    pub fn inject(&self, fault: Fault) {
        let mut faults = self.fault_state();
        faults.fault = Some(fault);
        faults.writes = 0;
    }

    pub fn clear_faults(&self) {
        self.fault_state().fault = None;
    }

    pub async fn snapshot(&self) -> MemoryTables {
        self.tables.read().await.clone()
    }

    pub async fn row_counts(&self) -> RowCounts {
        self.tables.read().await.row_counts()
    }

    /// Number of successfully committed batches.
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::Relaxed)
    }

    fn fault_state(&self) -> MutexGuard<'_, FaultState> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn select<T>(
        &self,
        table: Table,
        read: impl FnOnce(&MemoryTables) -> T + Send,
    ) -> Result<T, StoreError> {
        self.fault_state().check_select(table)?;
        let tables = self.tables.read().await;
        Ok(read(&tables))
    }

    async fn write_one(&self, op: &WriteOp) -> Result<(), StoreError> {
        self.fault_state().check_write(op.table())?;
        trace!(table:% = op.table(); "Applying write");
        self.tables.write().await.apply(op)
    }
}

#[async_trait]
impl RelationalStore for MemoryStore {
    async fn select_diagram(&self, id: &str) -> Result<Option<DiagramRow>, StoreError> {
        self.select(Table::Diagrams, |tables| tables.diagrams.get(id).cloned()).await
    }

    async fn select_diagrams_by_owner(&self, user_id: &str) -> Result<Vec<DiagramRow>, StoreError> {
        self.select(Table::Diagrams, |tables| {
            tables.diagrams.values().filter(|row| row.user_id == user_id).cloned().collect()
        })
        .await
    }

    async fn select_elements(&self, diagram_id: &str) -> Result<Vec<ElementRow>, StoreError> {
        self.select(Table::Elements, |tables| {
            tables.elements.values().filter(|row| row.diagram_id == diagram_id).cloned().collect()
        })
        .await
    }

    async fn select_members(&self, element_id: &str) -> Result<Vec<MemberRow>, StoreError> {
        self.select(Table::Members, |tables| {
            tables.members.values().filter(|row| row.element_id == element_id).cloned().collect()
        })
        .await
    }

    async fn select_relationships(
        &self,
        diagram_id: &str,
    ) -> Result<Vec<RelationshipRow>, StoreError> {
        self.select(Table::Relationships, |tables| {
            tables
                .relationships
                .values()
                .filter(|row| row.diagram_id == diagram_id)
                .cloned()
                .collect()
        })
        .await
    }

    async fn insert_diagram(&self, row: DiagramRow) -> Result<(), StoreError> {
        self.fault_state().check_write(Table::Diagrams)?;
        self.tables.write().await.insert_diagram(row)
    }

    async fn update_diagram(
        &self,
        id: &str,
        name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let op = WriteOp::UpdateDiagram { id: id.to_owned(), name: name.to_owned(), updated_at };
        self.write_one(&op).await
    }

    async fn insert_element(&self, row: ElementRow) -> Result<(), StoreError> {
        self.write_one(&WriteOp::InsertElement(row)).await
    }

    async fn update_element(&self, row: ElementRow) -> Result<(), StoreError> {
        self.write_one(&WriteOp::UpdateElement(row)).await
    }

    async fn delete_element(&self, id: &str) -> Result<(), StoreError> {
        self.write_one(&WriteOp::DeleteElement { id: id.to_owned() }).await
    }

    async fn insert_members(&self, rows: Vec<MemberRow>) -> Result<(), StoreError> {
        self.write_one(&WriteOp::InsertMembers(rows)).await
    }

    async fn delete_members(&self, element_id: &str) -> Result<(), StoreError> {
        self.write_one(&WriteOp::DeleteMembers { element_id: element_id.to_owned() }).await
    }

    async fn delete_relationships(&self, diagram_id: &str) -> Result<(), StoreError> {
        self.write_one(&WriteOp::DeleteRelationships { diagram_id: diagram_id.to_owned() }).await
    }

    async fn insert_relationships(&self, rows: Vec<RelationshipRow>) -> Result<(), StoreError> {
        self.write_one(&WriteOp::InsertRelationships(rows)).await
    }

    fn is_transactional(&self) -> bool {
        self.transactional
    }

    async fn commit(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        if self.transactional {
            let mut tables = self.tables.write().await;
            let mut staged = tables.clone();
            for op in batch.ops() {
                self.fault_state().check_write(op.table())?;
                staged.apply(op)?;
            }
            *tables = staged;
        } else {
            for op in batch.ops() {
                self.write_one(op).await?;
            }
        }
        self.commits.fetch_add(1, Ordering::Relaxed);
        debug!(writes = batch.len(), transactional = self.transactional; "Committed write batch");
        Ok(())
    }
}

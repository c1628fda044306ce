// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::{mpsc, oneshot};

use super::debounce::Debouncer;
use super::SessionError;
use crate::config::EditorConfig;
use crate::model::{Diagram, DiagramId};
use crate::store::RelationalStore;
use crate::sync::{save_diagram_with_retry, RetryPolicy, SaveSummary, SyncError};

/// Outcome of a debounced save.
#[derive(Debug)]
pub struct SaveReport {
    pub diagram_id: DiagramId,
    pub outcome: Result<SaveSummary, SyncError>,
}

impl SaveReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

type SaveReply = oneshot::Sender<Result<SaveSummary, SyncError>>;

#[derive(Debug)]
enum SaveJob {
    Debounced(Diagram),
    Immediate(Diagram, SaveReply),
}

/// Debounced, ordered persistence of diagram snapshots.
///
/// One background worker runs every save in submission order, so a later
/// snapshot is never overwritten by an earlier one. Debounced outcomes are
/// published as [`SaveReport`]s; local state is never rolled back on failure.
#[derive(Debug)]
pub struct AutoSaver {
    debouncer: Debouncer<SaveJob>,
    jobs: mpsc::UnboundedSender<SaveJob>,
}

impl AutoSaver {
    /// Starts the save worker on the current tokio runtime.
    pub fn spawn<S>(
        store: Arc<S>,
        config: &EditorConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SaveReport>)
    where
        S: RelationalStore + ?Sized + 'static,
    {
        let (jobs, job_rx) = mpsc::unbounded_channel();
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(store, config.retry_policy(), job_rx, report_tx));

        let debouncer = Debouncer::new(config.autosave_debounce(), jobs.clone());
        (Self { debouncer, jobs }, report_rx)
    }

    /// Schedules a debounced save of `diagram`, replacing any pending snapshot.
    pub fn schedule(&self, diagram: Diagram) {
        self.debouncer.schedule(SaveJob::Debounced(diagram));
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Hands the pending snapshot to the worker without waiting out the delay.
    pub fn flush(&self) -> bool {
        self.debouncer.flush()
    }

    /// Saves `diagram` now, dropping any pending debounced snapshot, and waits
    /// for the outcome.
    pub async fn save_now(&self, diagram: Diagram) -> Result<SaveSummary, SessionError> {
        if self.debouncer.cancel().is_some() {
            debug!(diagram_id:% = diagram.id(); "Pending autosave superseded");
        }
        let (reply, outcome) = oneshot::channel();
        self.jobs
            .send(SaveJob::Immediate(diagram, reply))
            .map_err(|_| SessionError::SaverClosed)?;
        let result = outcome.await.map_err(|_| SessionError::SaverClosed)?;
        Ok(result?)
    }
}

async fn run_worker<S>(
    store: Arc<S>,
    policy: RetryPolicy,
    mut jobs: mpsc::UnboundedReceiver<SaveJob>,
    reports: mpsc::UnboundedSender<SaveReport>,
) where
    S: RelationalStore + ?Sized,
{
    while let Some(job) = jobs.recv().await {
        match job {
            SaveJob::Debounced(diagram) => {
                let outcome = save_diagram_with_retry(store.as_ref(), &diagram, policy).await;
                if let Err(err) = &outcome {
                    warn!(diagram_id:% = diagram.id(), err:%; "Autosave failed; local edits kept");
                }
                let report = SaveReport { diagram_id: diagram.id().clone(), outcome };
                if reports.send(report).is_err() {
                    debug!("Save report receiver dropped");
                }
            }
            SaveJob::Immediate(diagram, reply) => {
                let outcome = save_diagram_with_retry(store.as_ref(), &diagram, policy).await;
                if reply.send(outcome).is_err() {
                    debug!(diagram_id:% = diagram.id(); "Save caller went away");
                }
            }
        }
    }
    debug!("Save worker stopped");
}

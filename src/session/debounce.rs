// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, trace};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
struct Pending<T> {
    payload: T,
    deadline: Instant,
}

#[derive(Debug)]
struct DebounceState<T> {
    pending: Option<Pending<T>>,
    generation: u64,
}

/// Trailing-edge debounce that delivers the latest payload on a channel.
///
/// The first [`Debouncer::schedule`] arms a timer; later calls before it fires
/// replace the payload and push the deadline back. Each armed timer delivers
/// at most once. Scheduling needs a running tokio runtime.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    state: Arc<Mutex<DebounceState<T>>>,
    output: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, output: mpsc::UnboundedSender<T>) -> Self {
        Self {
            delay,
            state: Arc::new(Mutex::new(DebounceState { pending: None, generation: 0 })),
            output,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&self, payload: T) {
        let deadline = Instant::now() + self.delay;
        let mut state = lock(&self.state);
        if let Some(pending) = state.pending.as_mut() {
            trace!("Debounce rescheduled");
            pending.payload = payload;
            pending.deadline = deadline;
            return;
        }

        state.pending = Some(Pending { payload, deadline });
        state.generation += 1;
        let generation = state.generation;
        drop(state);

        tokio::spawn(run_timer(self.state.clone(), self.output.clone(), deadline, generation));
    }

    /// Drops the pending payload, if any, and returns it.
    pub fn cancel(&self) -> Option<T> {
        lock(&self.state).pending.take().map(|pending| pending.payload)
    }

    /// Delivers the pending payload now. Returns whether one was pending.
    pub fn flush(&self) -> bool {
        let Some(payload) = self.cancel() else {
            return false;
        };
        deliver(&self.output, payload);
        true
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.state).pending.is_some()
    }
}

async fn run_timer<T>(
    state: Arc<Mutex<DebounceState<T>>>,
    output: mpsc::UnboundedSender<T>,
    mut deadline: Instant,
    generation: u64,
) {
    loop {
        sleep_until(deadline).await;

        let payload = {
            let mut state = lock(&state);
            if state.generation != generation {
                return;
            }
            match state.pending.take() {
                None => return,
                Some(pending) if pending.deadline > deadline => {
                    deadline = pending.deadline;
                    state.pending = Some(pending);
                    None
                }
                Some(pending) => Some(pending.payload),
            }
        };

        if let Some(payload) = payload {
            deliver(&output, payload);
            return;
        }
    }
}

fn deliver<T>(output: &mpsc::UnboundedSender<T>, payload: T) {
    if output.send(payload).is_err() {
        debug!("Debounce output closed; dropping payload");
    }
}

fn lock<T>(state: &Mutex<DebounceState<T>>) -> MutexGuard<'_, DebounceState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debouncer(delay_ms: u64) -> (Debouncer<u32>, mpsc::UnboundedReceiver<u32>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Debouncer::new(Duration::from_millis(delay_ms), tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_into_latest_payload() {
        let (debouncer, mut rx) = debouncer(500);

        debouncer.schedule(1);
        tokio::time::sleep(Duration::from_millis(40)).await;
        debouncer.schedule(2);
        tokio::time::sleep(Duration::from_millis(40)).await;
        debouncer.schedule(3);

        assert_eq!(rx.recv().await, Some(3));
        assert!(!debouncer.is_pending());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_pushes_deadline_back() {
        let (debouncer, mut rx) = debouncer(100);
        let start = Instant::now();

        debouncer.schedule(1);
        tokio::time::sleep(Duration::from_millis(80)).await;
        debouncer.schedule(2);

        assert_eq!(rx.recv().await, Some(2));
        assert!(start.elapsed() >= Duration::from_millis(180));
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_burst() {
        let (debouncer, mut rx) = debouncer(100);

        debouncer.schedule(1);
        assert_eq!(rx.recv().await, Some(1));
        debouncer.schedule(2);
        assert_eq!(rx.recv().await, Some(2));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_flush() {
        let (debouncer, mut rx) = debouncer(100);

        debouncer.schedule(1);
        assert_eq!(debouncer.cancel(), Some(1));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());

        debouncer.schedule(2);
        assert!(debouncer.flush());
        assert_eq!(rx.try_recv().ok(), Some(2));
        assert!(!debouncer.flush());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
    }
}

// src/pipeline/frontier.rs

//! Bounded work queue of pending crawl tasks.
//!
//! The frontier tracks every task that is queued or being processed. When
//! that count reaches zero no more work can appear, [`Frontier::join`]
//! returns, and [`Frontier::close`] wakes every idle worker with `None`.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::Notify;

use crate::models::CrawlTask;

/// Why a task was not accepted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushError {
    #[error("frontier is closed")]
    Closed,
    #[error("frontier is full ({0} tasks queued)")]
    Full(usize),
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<CrawlTask>,
    /// Queued plus in-flight tasks
    pending: usize,
    closed: bool,
}

#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    capacity: usize,
    /// Wakes workers waiting in `pop`
    task_ready: Notify,
    /// Wakes `join` when pending work runs out
    drained: Notify,
}

impl Frontier {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            capacity: capacity.max(1),
            task_ready: Notify::new(),
            drained: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a task for any worker.
    pub fn push(&self, task: CrawlTask) -> Result<(), PushError> {
        {
            let mut state = self.lock();
            if state.closed {
                return Err(PushError::Closed);
            }
            if state.queue.len() >= self.capacity {
                return Err(PushError::Full(state.queue.len()));
            }
            state.queue.push_back(task);
            state.pending += 1;
        }
        self.task_ready.notify_one();
        Ok(())
    }

    /// Take the next task, waiting while the queue is empty.
    ///
    /// Returns `None` once the frontier is closed. Every task returned here
    /// must be acknowledged with [`Frontier::task_done`].
    pub async fn pop(&self) -> Option<CrawlTask> {
        loop {
            let notified = self.task_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(task) = state.queue.pop_front() {
                    return Some(task);
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Mark one popped task as finished.
    pub fn task_done(&self) {
        let drained = {
            let mut state = self.lock();
            state.pending = state.pending.saturating_sub(1);
            state.pending == 0
        };
        if drained {
            self.drained.notify_waiters();
        }
    }

    /// Wait until no task is queued or in flight.
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.lock().pending == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Refuse further pushes and release every waiting worker.
    pub fn close(&self) {
        self.lock().closed = true;
        self.task_ready.notify_waiters();
    }

    pub fn pending(&self) -> usize {
        self.lock().pending
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// Calls [`Frontier::task_done`] when dropped, so a task is acknowledged
/// exactly once however its processing ends.
pub struct TaskGuard<'a> {
    frontier: &'a Frontier,
}

impl<'a> TaskGuard<'a> {
    pub fn new(frontier: &'a Frontier) -> Self {
        Self { frontier }
    }
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        self.frontier.task_done();
    }
}

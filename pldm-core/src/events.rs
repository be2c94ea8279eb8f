// SPDX-License-Identifier: MIT OR Apache-2.0
/*
 * Cooperative event queue.
 *
 * Copyright (c) 2025 Code Construct
 */

//! Single-threaded cooperative event queue with one-shot timers.
//!
//! State machines in this workspace advance by posting *deferred* tasks:
//! a response callback never encodes the next request inline, it queues a
//! closure that runs once the pipeline has finished its bookkeeping for the
//! completed transaction. The queue also provides the one-shot timers used
//! for firmware data transfer timeouts.
//!
//! Time is polled, not threaded: the embedding loop calls
//! [`poll`](EventQueue::poll) with a monotonic millisecond timestamp, due
//! timers fire, and the next pending deadline is returned so the caller can
//! size its wait.

use std::cell::RefCell;
use std::collections::VecDeque;

#[allow(unused)]
use log::{debug, error, info, trace, warn};

type Task = Box<dyn FnOnce()>;

/// Identifies a scheduled timer for [`EventQueue::cancel`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct TimerToken(u64);

struct Timer {
    token: TimerToken,
    deadline: u64,
    task: Task,
}

#[derive(Default)]
struct Inner {
    deferred: VecDeque<Task>,
    timers: Vec<Timer>,
    next_token: u64,
    now: u64,
}

/// A cooperative run-once-next-tick queue plus timer wheel.
///
/// All tasks run on the thread calling [`run_deferred`](Self::run_deferred)
/// or [`poll`](Self::poll); no internal borrow is held while a task
/// executes, so tasks may freely defer further work or schedule timers.
#[derive(Default)]
pub struct EventQueue {
    inner: RefCell<Inner>,
}

impl EventQueue {
    /// Constructs an empty queue with the clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` to run on the next [`run_deferred`](Self::run_deferred)
    /// or [`poll`](Self::poll).
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.inner.borrow_mut().deferred.push_back(Box::new(task));
    }

    /// Schedules `task` to run once `delay_ms` milliseconds from the last
    /// polled timestamp.
    pub fn schedule(
        &self,
        delay_ms: u64,
        task: impl FnOnce() + 'static,
    ) -> TimerToken {
        let mut inner = self.inner.borrow_mut();
        let token = TimerToken(inner.next_token);
        inner.next_token += 1;
        let deadline = inner.now.saturating_add(delay_ms);
        inner.timers.push(Timer {
            token,
            deadline,
            task: Box::new(task),
        });
        token
    }

    /// Cancels a scheduled timer.
    ///
    /// Returns `false` if the timer already fired or was cancelled.
    pub fn cancel(&self, token: TimerToken) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.timers.iter().position(|t| t.token == token) {
            Some(pos) => {
                inner.timers.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    /// Runs queued deferred tasks until the queue is empty.
    ///
    /// Tasks queued by running tasks are executed in the same call.
    pub fn run_deferred(&self) {
        loop {
            let task = self.inner.borrow_mut().deferred.pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Advances the clock to `now_millis`, runs deferred tasks, fires due
    /// timers, and returns the next pending deadline (in the same timebase)
    /// if any timers remain.
    ///
    /// The clock never moves backwards; a stale timestamp only runs the
    /// deferred queue.
    pub fn poll(&self, now_millis: u64) -> Option<u64> {
        {
            let mut inner = self.inner.borrow_mut();
            if now_millis > inner.now {
                inner.now = now_millis;
            }
        }

        self.run_deferred();

        loop {
            let due = {
                let mut inner = self.inner.borrow_mut();
                let now = inner.now;
                match inner.timers.iter().position(|t| t.deadline <= now) {
                    Some(pos) => Some(inner.timers.swap_remove(pos).task),
                    None => None,
                }
            };
            match due {
                Some(task) => {
                    task();
                    self.run_deferred();
                }
                None => break,
            }
        }

        self.next_deadline()
    }

    /// Earliest pending timer deadline, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.inner.borrow().timers.iter().map(|t| t.deadline).min()
    }
}

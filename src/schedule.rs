//! One-shot deferred tasks.
//!
//! The widget only ever needs fire-and-forget timers: clearing the shake class,
//! staggering confetti spawns and removing each confetti piece. They are modelled
//! as [`Task`] values so the browser can run them from `setTimeout` while tests
//! step a [`VirtualScheduler`] through virtual time.

use std::collections::BTreeMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use tracing::warn;
use web_sys::window;

use crate::celebration::Particle;

/// Identifier of a spawned confetti piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub enum Task {
    ClearShake,
    SpawnParticle(ParticleId, Particle),
    RemoveParticle(ParticleId),
}

pub trait Scheduler {
    /// Runs `task` on the controller after `delay_ms`. Timers are never cancelled.
    fn schedule(&mut self, delay_ms: u32, task: Task);
}

/// Deterministic scheduler for tests: tasks queue up until time is advanced.
#[derive(Default, Debug)]
pub struct VirtualScheduler {
    now_ms: u64,
    next_seq: u64,
    // (due, seq) keeps FIFO order for equal deadlines
    pending: BTreeMap<(u64, u64), Task>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Count of queued tasks matching `pred`.
    pub fn pending_where(&self, pred: impl Fn(&Task) -> bool) -> usize {
        self.pending.values().filter(|t| pred(t)).count()
    }

    /// Pops the earliest task due at or before `until`, moving the clock to its deadline.
    pub fn pop_due(&mut self, until: u64) -> Option<Task> {
        let (&(due, id), _) = self.pending.iter().next()?;
        if due > until {
            return None;
        }
        self.now_ms = due;
        self.pending.remove(&(due, id))
    }

    pub(crate) fn settle(&mut self, until: u64) {
        self.now_ms = self.now_ms.max(until);
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&mut self, delay_ms: u32, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((self.now_ms + delay_ms as u64, seq), task);
    }
}

/// `setTimeout`-backed scheduler. Each timer hands its task to `dispatch`,
/// which re-enters the widget living in thread-local storage.
pub struct BrowserScheduler {
    dispatch: fn(Task),
}

impl BrowserScheduler {
    pub fn new(dispatch: fn(Task)) -> Self {
        Self { dispatch }
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule(&mut self, delay_ms: u32, task: Task) {
        let dispatch = self.dispatch;
        let cb = Closure::once_into_js(move || dispatch(task));
        let Some(w) = window() else {
            warn!("no window, timer dropped");
            return;
        };
        if let Err(e) = w.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.unchecked_ref(),
            delay_ms.min(i32::MAX as u32) as i32,
        ) {
            warn!(error = ?e, delay_ms, "setTimeout failed, task dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_fire_in_deadline_order() {
        let mut s = VirtualScheduler::new();
        s.schedule(1000, Task::ClearShake);
        s.schedule(20, Task::RemoveParticle(ParticleId(1)));
        s.schedule(20, Task::RemoveParticle(ParticleId(2)));
        assert_eq!(s.pop_due(10), None);
        assert_eq!(s.pop_due(999), Some(Task::RemoveParticle(ParticleId(1))));
        assert_eq!(s.pop_due(999), Some(Task::RemoveParticle(ParticleId(2))));
        assert_eq!(s.now_ms(), 20);
        assert_eq!(s.pop_due(999), None);
        assert_eq!(s.pop_due(1000), Some(Task::ClearShake));
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn delays_are_relative_to_current_time() {
        let mut s = VirtualScheduler::new();
        s.schedule(100, Task::ClearShake);
        assert!(s.pop_due(100).is_some());
        s.schedule(50, Task::ClearShake);
        assert_eq!(s.pop_due(149), None);
        assert!(s.pop_due(150).is_some());
    }

    #[test]
    fn equal_deadlines_keep_insertion_order() {
        let mut s = VirtualScheduler::new();
        for i in 0..5 {
            s.schedule(0, Task::RemoveParticle(ParticleId(i)));
        }
        let order: Vec<Task> = std::iter::from_fn(|| s.pop_due(0)).collect();
        let expected: Vec<Task> = (0..5).map(|i| Task::RemoveParticle(ParticleId(i))).collect();
        assert_eq!(order, expected);
    }
}

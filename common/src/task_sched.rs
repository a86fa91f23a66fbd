//! Single-threaded timer and deferred-task facility
//!
//! Timers count down in whole milliseconds and are advanced explicitly with
//! [`TaskScheduler::tick`]. An expired timer yields the event it was armed with
//! instead of invoking a callback, so the owner decides when and how the event
//! is handled. Deferred tasks are queued with [`TaskScheduler::defer_task`] and
//! only leave the queue through [`TaskScheduler::pop_deferred`].

use std::collections::VecDeque;
use tracing::{trace, warn};

/// Handle to a timer owned by a [`TaskScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct TimerSlot<T> {
    generation: u32,
    in_use: bool,
    running: bool,
    duration_ms: u32,
    elapsed_ms: u32,
    event: Option<T>,
}

/// Millisecond timer wheel plus a FIFO of deferred tasks
#[derive(Debug)]
pub struct TaskScheduler<T> {
    timers: Vec<TimerSlot<T>>,
    free_slots: Vec<usize>,
    deferred: VecDeque<T>,
    now_ms: u64,
}

impl<T: Clone> Default for TaskScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TaskScheduler<T> {
    /// Create an empty scheduler at time zero
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            free_slots: Vec::new(),
            deferred: VecDeque::new(),
            now_ms: 0,
        }
    }

    /// Allocate a stopped timer with no event attached
    pub fn create_timer(&mut self) -> TimerId {
        if let Some(index) = self.free_slots.pop() {
            let slot = &mut self.timers[index];
            slot.generation = slot.generation.wrapping_add(1);
            slot.in_use = true;
            slot.running = false;
            slot.duration_ms = 0;
            slot.elapsed_ms = 0;
            slot.event = None;
            return TimerId { index, generation: slot.generation };
        }

        self.timers.push(TimerSlot {
            generation: 0,
            in_use: true,
            running: false,
            duration_ms: 0,
            elapsed_ms: 0,
            event: None,
        });
        TimerId { index: self.timers.len() - 1, generation: 0 }
    }

    /// Stop the timer and return its slot to the pool
    pub fn release(&mut self, id: TimerId) {
        if let Some(slot) = self.slot_mut(id) {
            slot.in_use = false;
            slot.running = false;
            slot.event = None;
            self.free_slots.push(id.index);
        }
    }

    /// Configure duration and expiry event. A running timer restarts with the new duration.
    pub fn set(&mut self, id: TimerId, duration_ms: u32, event: T) {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.duration_ms = duration_ms;
                slot.event = Some(event);
                if slot.running {
                    slot.elapsed_ms = 0;
                }
            }
            None => warn!("Setting unknown timer {:?}", id),
        }
    }

    /// (Re)start the timer from zero with its configured duration
    pub fn run(&mut self, id: TimerId) {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.elapsed_ms = 0;
                slot.running = true;
            }
            None => warn!("Running unknown timer {:?}", id),
        }
    }

    /// Stop the timer. Stopping a stopped timer does nothing.
    pub fn stop(&mut self, id: TimerId) {
        if let Some(slot) = self.slot_mut(id) {
            slot.running = false;
        }
    }

    pub fn is_running(&self, id: TimerId) -> bool {
        self.slot(id).map(|s| s.running).unwrap_or(false)
    }

    pub fn duration(&self, id: TimerId) -> u32 {
        self.slot(id).map(|s| s.duration_ms).unwrap_or(0)
    }

    pub fn time_elapsed(&self, id: TimerId) -> u32 {
        self.slot(id).map(|s| s.elapsed_ms).unwrap_or(0)
    }

    /// Number of timers currently counting down
    pub fn nof_running_timers(&self) -> usize {
        self.timers.iter().filter(|s| s.in_use && s.running).count()
    }

    /// Milliseconds elapsed since creation
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Advance time by one millisecond and collect the events of timers that expired
    pub fn tick(&mut self) -> Vec<T> {
        self.now_ms += 1;

        let mut expired = Vec::new();
        for slot in self.timers.iter_mut().filter(|s| s.in_use && s.running) {
            slot.elapsed_ms = slot.elapsed_ms.saturating_add(1);
            if slot.elapsed_ms >= slot.duration_ms {
                slot.running = false;
                if let Some(event) = &slot.event {
                    expired.push(event.clone());
                }
            }
        }

        if !expired.is_empty() {
            trace!("{} timer(s) expired at t={}ms", expired.len(), self.now_ms);
        }
        expired
    }

    /// Queue a task to run after the current handler returns
    pub fn defer_task(&mut self, task: T) {
        self.deferred.push_back(task);
    }

    /// Take the oldest deferred task
    pub fn pop_deferred(&mut self) -> Option<T> {
        self.deferred.pop_front()
    }

    pub fn nof_deferred(&self) -> usize {
        self.deferred.len()
    }

    fn slot(&self, id: TimerId) -> Option<&TimerSlot<T>> {
        self.timers
            .get(id.index)
            .filter(|s| s.in_use && s.generation == id.generation)
    }

    fn slot_mut(&mut self, id: TimerId) -> Option<&mut TimerSlot<T>> {
        self.timers
            .get_mut(id.index)
            .filter(|s| s.in_use && s.generation == id.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_timer_expires_after_duration() {
        let mut sched = TaskScheduler::new();
        let t = sched.create_timer();
        sched.set(t, 3, "expired");
        sched.run(t);

        assert!(sched.tick().is_empty());
        assert!(sched.tick().is_empty());
        assert_eq!(sched.time_elapsed(t), 2);
        assert_eq!(sched.tick(), vec!["expired"]);
        assert!(!sched.is_running(t));
        assert!(sched.tick().is_empty());
    }

    #[test]
    fn test_set_without_run_does_not_start() {
        let mut sched = TaskScheduler::new();
        let t = sched.create_timer();
        sched.set(t, 1, 1u8);
        assert!(!sched.is_running(t));
        assert!(sched.tick().is_empty());
        assert_eq!(sched.duration(t), 1);
    }

    #[test]
    fn test_run_restarts_countdown() {
        let mut sched = TaskScheduler::new();
        let t = sched.create_timer();
        sched.set(t, 2, ());
        sched.run(t);
        sched.tick();
        sched.run(t);
        assert!(sched.tick().is_empty());
        assert_eq!(sched.tick().len(), 1);
    }

    #[test]
    fn test_set_replaces_event() {
        let mut sched = TaskScheduler::new();
        let t = sched.create_timer();
        sched.set(t, 5, 'a');
        sched.run(t);
        sched.set(t, 1, 'b');
        assert_eq!(sched.tick(), vec!['b']);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut sched = TaskScheduler::new();
        let t = sched.create_timer();
        sched.stop(t);
        sched.set(t, 1, ());
        sched.run(t);
        sched.stop(t);
        sched.stop(t);
        assert_eq!(sched.nof_running_timers(), 0);
        assert!(sched.tick().is_empty());
    }

    #[test]
    fn test_released_handle_is_inert() {
        let mut sched = TaskScheduler::new();
        let old = sched.create_timer();
        sched.set(old, 1, 1);
        sched.run(old);
        sched.release(old);

        let new = sched.create_timer();
        sched.run(old);
        assert!(!sched.is_running(new));
        assert!(!sched.is_running(old));
        assert!(sched.tick().is_empty());
    }

    #[test]
    fn test_deferred_tasks_are_fifo() {
        let mut sched: TaskScheduler<u32> = TaskScheduler::new();
        sched.defer_task(1);
        sched.defer_task(2);
        assert_eq!(sched.nof_deferred(), 2);
        assert_eq!(sched.pop_deferred(), Some(1));
        assert_eq!(sched.pop_deferred(), Some(2));
        assert_eq!(sched.pop_deferred(), None);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Set(u32),
        Run,
        Stop,
        Tick,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u32..20).prop_map(Op::Set),
            Just(Op::Run),
            Just(Op::Stop),
            Just(Op::Tick),
        ]
    }

    proptest! {
        #[test]
        fn prop_single_timer_never_fires_twice_per_run(ops in prop::collection::vec(op(), 1..200)) {
            let mut sched = TaskScheduler::new();
            let t = sched.create_timer();
            sched.set(t, 10, ());
            let mut armed = false;
            for op in ops {
                match op {
                    Op::Set(ms) => sched.set(t, ms, ()),
                    Op::Run => { sched.run(t); armed = true; }
                    Op::Stop => { sched.stop(t); armed = false; }
                    Op::Tick => {
                        let fired = sched.tick().len();
                        prop_assert!(fired <= 1);
                        if fired == 1 {
                            prop_assert!(armed);
                            armed = false;
                        }
                    }
                }
                prop_assert!(sched.nof_running_timers() <= 1);
                prop_assert_eq!(sched.is_running(t), armed);
            }
        }
    }
}

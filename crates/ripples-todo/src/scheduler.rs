use std::cell::{Cell, RefCell};

pub type TimerId = u64;

struct Timer {
    id: TimerId,
    due: u64,
    task: Box<dyn FnOnce()>,
}

/// Deferred callbacks on a virtual millisecond clock.
///
/// Timers run in due-time order, ties in scheduling order. Nothing runs until
/// [`Scheduler::run_pending`] or [`Scheduler::advance`] is called.
#[derive(Default)]
pub struct Scheduler {
    now: Cell<u64>,
    next_id: Cell<TimerId>,
    timers: RefCell<Vec<Timer>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Zero-delay callback: runs after the current event finishes.
    pub fn defer(&self, task: impl FnOnce() + 'static) -> TimerId {
        self.set_timeout(0, task)
    }

    pub fn set_timeout(&self, delay_ms: u64, task: impl FnOnce() + 'static) -> TimerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.timers.borrow_mut().push(Timer {
            id,
            due: self.now.get() + delay_ms,
            task: Box::new(task),
        });
        id
    }

    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let mut timers = self.timers.borrow_mut();
        let before = timers.len();
        timers.retain(|t| t.id != id);
        timers.len() != before
    }

    /// Drops every timer without running it.
    pub fn clear_all(&self) -> usize {
        let dropped = std::mem::take(&mut *self.timers.borrow_mut());
        dropped.len()
    }

    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Runs every timer that is due now, including ones scheduled meanwhile.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Some(timer) = self.pop_due(self.now.get()) {
            (timer.task)();
            ran += 1;
        }
        ran
    }

    /// Moves the clock forward, running timers at their due times.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.now.get() + ms;
        let mut ran = 0;
        while let Some(timer) = self.pop_due(target) {
            self.now.set(self.now.get().max(timer.due));
            (timer.task)();
            ran += 1;
        }
        self.now.set(target);
        ran
    }

    // Earliest timer due at or before `limit`; ids increase with scheduling
    // order, so they break ties.
    fn pop_due(&self, limit: u64) -> Option<Timer> {
        let mut timers = self.timers.borrow_mut();
        let pos = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;
        Some(timers.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_deferred_runs_fifo() {
        let s = Rc::new(Scheduler::new());
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let o = order.clone();
            s.defer(move || o.borrow_mut().push(i));
        }
        assert_eq!(order.borrow().len(), 0);
        assert_eq!(s.run_pending(), 3);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_nested_defer_runs_in_same_pass() {
        let s = Rc::new(Scheduler::new());
        let hit = Rc::new(Cell::new(false));
        let (s2, h) = (s.clone(), hit.clone());
        s.defer(move || {
            s2.defer(move || h.set(true));
        });
        assert_eq!(s.run_pending(), 2);
        assert!(hit.get());
    }

    #[test]
    fn test_timeouts_wait_for_clock() {
        let s = Scheduler::new();
        let hit = Rc::new(Cell::new(0));
        let h = hit.clone();
        s.set_timeout(300, move || h.set(h.get() + 1));
        assert_eq!(s.run_pending(), 0);
        s.advance(299);
        assert_eq!(hit.get(), 0);
        s.advance(1);
        assert_eq!(hit.get(), 1);
        assert_eq!(s.now(), 300);
    }

    #[test]
    fn test_clear_timeout() {
        let s = Scheduler::new();
        let id = s.set_timeout(10, || panic!("cleared timer ran"));
        assert!(s.clear_timeout(id));
        assert!(!s.clear_timeout(id));
        s.advance(20);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_clear_all_drops_without_running() {
        let sched = Scheduler::new();
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        sched.defer(move || r.set(true));
        sched.set_timeout(50, || {});
        assert_eq!(sched.clear_all(), 2);
        assert_eq!(sched.advance(100), 0);
        assert!(!ran.get());
    }
}

//! Cooperative timers driven by the render loop.
//!
//! Nothing runs in the background: due callbacks fire synchronously inside
//! [`TimerManager::process_timers`], which the loop calls once per frame.

use instant::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct Timer {
    id: TimerId,
    deadline: Instant,
    period: Option<Duration>,
    callback: Box<dyn FnMut()>,
}

#[derive(Default)]
pub struct TimerManager {
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `callback` once, `delay` from now.
    pub fn set_timeout(&mut self, delay: Duration, callback: impl FnMut() + 'static) -> TimerId {
        self.schedule(Instant::now() + delay, None, Box::new(callback))
    }

    /// Fire `callback` every `period`, starting one period from now.
    pub fn set_interval(&mut self, period: Duration, callback: impl FnMut() + 'static) -> TimerId {
        self.schedule(Instant::now() + period, Some(period), Box::new(callback))
    }

    /// Cancel a timer. Returns `false` if it already fired or never existed.
    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn process_timers(&mut self) -> usize {
        self.process_timers_at(Instant::now())
    }

    /// Fire every timer due at `now`, earliest deadline first. Each timer
    /// fires at most once per call, an interval that fell behind skips the
    /// periods it missed. Returns the number of callbacks invoked.
    pub fn process_timers_at(&mut self, now: Instant) -> usize {
        let mut due: Vec<usize> = (0..self.timers.len())
            .filter(|&i| self.timers[i].deadline <= now)
            .collect();
        if due.is_empty() {
            return 0;
        }
        due.sort_by_key(|&i| (self.timers[i].deadline, self.timers[i].id));
        for &i in &due {
            let timer = &mut self.timers[i];
            log::trace!("firing timer {:?}", timer.id);
            (timer.callback)();
            if let Some(period) = timer.period {
                let next = timer.deadline + period;
                timer.deadline = if next > now { next } else { now + period };
            }
        }
        let fired = due.len();
        self.timers.retain(|t| t.period.is_some() || t.deadline > now);
        fired
    }

    fn schedule(
        &mut self,
        deadline: Instant,
        period: Option<Duration>,
        callback: Box<dyn FnMut()>,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            deadline,
            period,
            callback,
        });
        id
    }
}

impl std::fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerManager")
            .field("pending", &self.timers.len())
            .finish()
    }
}

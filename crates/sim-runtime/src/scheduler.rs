//! Cycle timing in simulated seconds.
//!
//! Weeks tick on a fixed period; months and years are counted from weeks.
//! Development, revenue and market cycles run about fourteen times a week
//! with each interval scaled by a random factor from the configured
//! jitter range.

use crate::clock::{MONTHS_PER_YEAR, WEEKS_PER_MONTH};
use crate::config::CycleJitter;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fast cycles per week before jitter.
const CYCLES_PER_WEEK: f32 = 14.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cycle {
    Development,
    Revenue,
    Market,
    Weekly,
    Monthly,
    Yearly,
}

/// A cycle that came due, with the time since it last ran.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DueCycle {
    pub cycle: Cycle,
    pub elapsed: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Timer {
    cycle: Cycle,
    next: f32,
    last: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    week_seconds: f32,
    jitter: CycleJitter,
    now: f32,
    next_week: f32,
    last_week: f32,
    weeks: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new(week_seconds: f32, jitter: CycleJitter) -> Self {
        let first = week_seconds / CYCLES_PER_WEEK;
        let timers = [Cycle::Development, Cycle::Revenue, Cycle::Market]
            .into_iter()
            .map(|cycle| Timer {
                cycle,
                next: first,
                last: 0.0,
            })
            .collect();
        Self {
            week_seconds,
            jitter,
            now: 0.0,
            next_week: week_seconds,
            last_week: 0.0,
            weeks: 0,
            timers,
        }
    }

    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn week_seconds(&self) -> f32 {
        self.week_seconds
    }

    pub fn weeks(&self) -> u64 {
        self.weeks
    }

    fn jittered_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let base = self.week_seconds / CYCLES_PER_WEEK;
        let factor = if self.jitter.min < self.jitter.max {
            rng.gen_range(self.jitter.min..=self.jitter.max)
        } else {
            self.jitter.min
        };
        base * factor
    }

    /// Move time forward by `dt` and return every cycle that came due, in
    /// time order. Cycles due at the same instant run in [`Cycle`] order,
    /// with the week boundary after the fast cycles.
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> Vec<DueCycle> {
        let mut due = Vec::new();
        if !(dt.is_finite() && dt > 0.0) {
            return due;
        }
        let until = self.now + dt;
        loop {
            let fast = self
                .timers
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.next.total_cmp(&b.next).then(a.cycle.cmp(&b.cycle)))
                .map(|(i, t)| (i, t.next));
            match fast {
                Some((i, at)) if at <= until && at <= self.next_week => {
                    let interval = self.jittered_interval(rng);
                    let timer = &mut self.timers[i];
                    due.push(DueCycle {
                        cycle: timer.cycle,
                        elapsed: at - timer.last,
                    });
                    timer.last = at;
                    timer.next = at + interval;
                }
                _ if self.next_week <= until => {
                    let at = self.next_week;
                    self.fire_week(at, &mut due);
                }
                _ => break,
            }
        }
        self.now = until;
        due
    }

    fn fire_week(&mut self, at: f32, due: &mut Vec<DueCycle>) {
        let elapsed = at - self.last_week;
        self.weeks += 1;
        self.last_week = at;
        self.next_week = at + self.week_seconds;
        due.push(DueCycle {
            cycle: Cycle::Weekly,
            elapsed,
        });
        if self.weeks % WEEKS_PER_MONTH == 0 {
            due.push(DueCycle {
                cycle: Cycle::Monthly,
                elapsed: elapsed * WEEKS_PER_MONTH as f32,
            });
            if (self.weeks / WEEKS_PER_MONTH) % MONTHS_PER_YEAR == 0 {
                due.push(DueCycle {
                    cycle: Cycle::Yearly,
                    elapsed: elapsed * (WEEKS_PER_MONTH * MONTHS_PER_YEAR) as f32,
                });
            }
        }
    }
}

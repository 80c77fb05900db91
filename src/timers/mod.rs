//! Nested wall clock timers for the setup, update and solve phases.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct InnerTimer {
    start: Option<Instant>,
    elapsed: Duration,
    subtimers: SubTimersMap,
}

impl InnerTimer {
    fn reset(&mut self) {
        self.start = None;
        self.elapsed = Duration::ZERO;
        self.subtimers.clear();
    }

    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            self.elapsed += instant.elapsed();
        }
    }

    fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[derive(Debug, Default)]
struct SubTimersMap(HashMap<&'static str, InnerTimer>);

impl Deref for SubTimersMap {
    type Target = HashMap<&'static str, InnerTimer>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for SubTimersMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl SubTimersMap {
    fn reset_subtimer(&mut self, key: &'static str) {
        self.entry(key).or_default().reset();
    }

    fn start_subtimer(&mut self, key: &'static str) {
        self.entry(key).or_default().start();
    }

    fn total_time(&self) -> Duration {
        self.values()
            .fold(Duration::ZERO, |acc, t| acc + t.elapsed())
    }
}

/// A stack of named timers.  Timers started while another one is
/// running are recorded as children of the running timer.
#[derive(Default, Debug)]
pub struct Timers {
    stack: Vec<&'static str>,
    subtimers: SubTimersMap,
}

impl Timers {
    fn mut_active_timer(&mut self) -> Option<&mut InnerTimer> {
        let (first, rest) = self.stack.split_first()?;
        let mut active_timer = self.subtimers.get_mut(first)?;
        for key in rest {
            active_timer = active_timer.subtimers.get_mut(key)?;
        }
        Some(active_timer)
    }

    pub fn reset_timer(&mut self, key: &'static str) {
        self.subtimers.reset_subtimer(key);
    }

    pub fn start_as_current(&mut self, key: &'static str) {
        match self.mut_active_timer() {
            Some(active) => active.subtimers.start_subtimer(key),
            None => self.subtimers.start_subtimer(key),
        }
        self.stack.push(key);
    }

    pub fn stop_current(&mut self) {
        if let Some(active) = self.mut_active_timer() {
            active.stop();
        }
        self.stack.pop();
    }

    /// Accumulated time of a top level timer, zero if it never ran.
    pub fn elapsed(&self, key: &'static str) -> Duration {
        self.subtimers
            .get(key)
            .map_or(Duration::ZERO, |t| t.elapsed())
    }

    pub fn total_time(&self) -> Duration {
        self.subtimers.total_time()
    }
}

macro_rules! timeit {
    ($timer:ident => $key:literal; $($tt:tt)+) => {

        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_timers() {
        let mut timers = Timers::default();
        timers.reset_timer("solve");

        timeit! {timers => "solve"; {
            timeit! {timers => "kkt"; {
                std::thread::sleep(Duration::from_millis(2));
            }}
        }}

        assert!(timers.elapsed("solve") >= Duration::from_millis(2));
        assert_eq!(timers.elapsed("setup"), Duration::ZERO);
        assert_eq!(timers.total_time(), timers.elapsed("solve"));

        timers.reset_timer("solve");
        assert_eq!(timers.elapsed("solve"), Duration::ZERO);
    }
}

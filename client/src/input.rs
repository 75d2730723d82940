//! Fixed-cadence input sampling decoupled from raw key events

use std::collections::HashSet;
use std::hash::Hash;
use std::time::{Duration, Instant};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Raw key transition as delivered by the windowing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent<K> {
    Pressed(K),
    Released(K),
}

/// Tracks currently held keys and fires a reducer on a fixed wall-clock
/// period, however many key events arrived in between.
///
/// The sampler is driven by polling: the owning loop feeds key events through
/// [`InputSampler::handle_key`] and calls [`InputSampler::poll`] whenever it
/// wakes up. At most one tick fires per poll and missed periods are not
/// replayed.
#[derive(Debug)]
pub struct InputSampler<K> {
    held: HashSet<K>,
    period: Duration,
    next_tick: Option<Instant>,
}

impl<K: Eq + Hash + Copy> InputSampler<K> {
    pub fn new(period: Duration) -> Self {
        Self {
            held: HashSet::new(),
            period: period.max(MIN_PERIOD),
            next_tick: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Arms the timer; the first tick is due one period after `now`.
    /// Restarting a running sampler re-arms it from scratch.
    pub fn start(&mut self, now: Instant) {
        self.held.clear();
        self.next_tick = Some(now + self.period);
    }

    /// Disarms the timer and forgets held keys. Nothing fires after this
    /// until the next `start`.
    pub fn stop(&mut self) {
        self.next_tick = None;
        self.held.clear();
    }

    /// Returns whether the held set changed. Events are ignored while stopped.
    pub fn handle_key(&mut self, event: KeyEvent<K>) -> bool {
        if !self.is_running() {
            return false;
        }

        match event {
            KeyEvent::Pressed(key) => self.held.insert(key),
            KeyEvent::Released(key) => self.held.remove(&key),
        }
    }

    pub fn held(&self) -> &HashSet<K> {
        &self.held
    }

    /// Invokes `on_tick` with the current held set if a tick is due at `now`.
    pub fn poll<T>(&mut self, now: Instant, on_tick: impl FnOnce(&HashSet<K>) -> T) -> Option<T> {
        let due = self.next_tick?;
        if now < due {
            return None;
        }

        let next = due + self.period;
        self.next_tick = Some(if next > now { next } else { now + self.period });

        Some(on_tick(&self.held))
    }
}

/// Reducer turning the held key set into a control delta. Each bound key
/// contributes `rate * period` so opposing keys cancel out.
#[derive(Debug, Clone)]
pub struct PaddleBindings<K> {
    bindings: Vec<(K, f32)>,
}

impl<K: Eq + Hash + Copy> PaddleBindings<K> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// `rate` is in control units per second.
    pub fn bind(mut self, key: K, rate: f32) -> Self {
        self.bindings.push((key, rate));
        self
    }

    /// Binds every key in `increase` to `+speed` and every key in `decrease`
    /// to `-speed`.
    pub fn symmetric(increase: &[K], decrease: &[K], speed: f32) -> Self {
        let bindings = increase
            .iter()
            .map(|key| (*key, speed))
            .chain(decrease.iter().map(|key| (*key, -speed)))
            .collect();
        Self { bindings }
    }

    pub fn delta(&self, held: &HashSet<K>, period: Duration) -> f32 {
        let rate: f32 = self
            .bindings
            .iter()
            .filter(|(key, _)| held.contains(key))
            .map(|(_, rate)| rate)
            .sum();

        rate * period.as_secs_f32()
    }
}

impl<K: Eq + Hash + Copy> Default for PaddleBindings<K> {
    fn default() -> Self {
        Self::new()
    }
}

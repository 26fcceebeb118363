//! Scroll-gated paging for reveal sections.
//!
//! While the gate holds the page (`ScrollLock::Locked`) wheel, swipe and
//! arrow-key input moves a step index through `0..=steps` instead of
//! scrolling. Reaching the last step releases the page after a short delay.
//! The lock is plain state here; the browser glue mirrors it onto the body.

use crate::config::GateConfig;
use crate::input::{Binding, EventKind, Target};

/// Listeners a mounted gate needs. Scroll input is blocking so a locked gate
/// can cancel native scrolling.
pub const GATE_BINDINGS: &[Binding] = &[
    Binding::new(Target::Window, EventKind::Wheel).blocking(),
    Binding::new(Target::Window, EventKind::TouchStart),
    Binding::new(Target::Window, EventKind::TouchMove).blocking(),
    Binding::new(Target::Window, EventKind::TouchEnd),
    Binding::new(Target::Window, EventKind::KeyDown).blocking(),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollLock {
    Locked,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStep {
    None,
    Advanced(usize),
    Retreated(usize),
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKey {
    Up,
    Down,
}

impl GateKey {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "PageUp" => Some(GateKey::Up),
            "ArrowDown" | "PageDown" | " " => Some(GateKey::Down),
            _ => None,
        }
    }
}

/// Backgrounds for the bio steps, darkest first.
pub const BIO_BACKGROUNDS: [&str; 14] = [
    "#0f0f0f", "#131313", "#161616", "#1a1a1a", "#1d1d1d", "#212121", "#222222", "#262626", "#2a2a2a",
    "#2e2e2e", "#323232", "#363636", "#3a3a3a", "#3e3e3e",
];

/// Palette entry for a step, holding on the last colour past the end.
pub fn background_step<T>(index: usize, palette: &[T]) -> Option<&T> {
    palette.get(index.min(palette.len().checked_sub(1)?))
}

#[derive(Debug, Clone)]
pub struct ScrollGate {
    config: GateConfig,
    steps: usize,
    index: usize,
    accumulated: f32,
    touch_origin: Option<f32>,
    lock: ScrollLock,
    release_in: Option<f32>,
    complete: bool,
    touch_primary: bool,
    elapsed_ms: f32,
    /// Set once the reader moved or the timed first reveal ran.
    started: bool,
}

impl ScrollGate {
    pub fn new(steps: usize, config: GateConfig) -> Self {
        Self {
            config,
            steps,
            index: 0,
            accumulated: 0.0,
            touch_origin: None,
            lock: ScrollLock::Released,
            release_in: None,
            complete: false,
            touch_primary: false,
            elapsed_ms: 0.0,
            started: false,
        }
    }

    /// Touch-first devices get every step shown after
    /// `touch_show_all_ms`.
    pub fn touch_primary(mut self, touch_primary: bool) -> Self {
        self.touch_primary = touch_primary;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn lock(&self) -> ScrollLock {
        self.lock
    }

    /// Every step has been shown and the page was handed back.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The section scrolled into view.
    pub fn enter(&mut self) {
        if self.complete || self.steps == 0 {
            return;
        }
        log::debug!("scroll gate engaged at step {}", self.index);
        self.lock = ScrollLock::Locked;
        self.accumulated = 0.0;
    }

    /// The section scrolled out of view. Leaving upward before finishing
    /// starts the sequence over.
    pub fn leave(&mut self, upward: bool) {
        self.lock = ScrollLock::Released;
        self.release_in = None;
        self.accumulated = 0.0;
        self.touch_origin = None;
        if upward && !self.complete {
            self.index = 0;
        }
    }

    pub fn wheel(&mut self, delta: f32) -> GateStep {
        if self.lock == ScrollLock::Released || !delta.is_finite() {
            return GateStep::None;
        }
        self.accumulated += delta;
        if self.accumulated.abs() < self.config.sensitivity {
            return GateStep::None;
        }
        let forward = self.accumulated > 0.0;
        self.accumulated = 0.0;
        self.step(forward)
    }

    pub fn touch_start(&mut self, y: f32) {
        if self.lock == ScrollLock::Locked {
            self.touch_origin = Some(y);
        }
    }

    pub fn touch_move(&mut self, y: f32) -> GateStep {
        if self.lock == ScrollLock::Released {
            return GateStep::None;
        }
        let Some(origin) = self.touch_origin else {
            self.touch_origin = Some(y);
            return GateStep::None;
        };
        let diff = origin - y;
        if diff.abs() <= self.config.touch_threshold {
            return GateStep::None;
        }
        self.touch_origin = Some(y);
        self.step(diff > 0.0)
    }

    pub fn touch_end(&mut self) {
        self.touch_origin = None;
    }

    pub fn key(&mut self, key: GateKey) -> GateStep {
        if self.lock == ScrollLock::Released {
            return GateStep::None;
        }
        self.step(key == GateKey::Down)
    }

    /// Jump straight to a step, e.g. from a progress indicator.
    pub fn jump_to(&mut self, index: usize) -> GateStep {
        self.started = true;
        let target = index.min(self.steps);
        match target.cmp(&self.index) {
            std::cmp::Ordering::Equal => GateStep::None,
            std::cmp::Ordering::Greater => {
                self.index = target;
                self.arm_release();
                GateStep::Advanced(target)
            }
            std::cmp::Ordering::Less => {
                self.index = target;
                self.release_in = None;
                GateStep::Retreated(target)
            }
        }
    }

    /// Reveal everything and hand the page back immediately.
    pub fn show_all(&mut self) -> GateStep {
        self.started = true;
        self.index = self.steps;
        self.finish()
    }

    /// Let frame time pass; fires the delayed release and the timed reveals.
    pub fn advance_time(&mut self, dt_ms: f32) -> GateStep {
        self.elapsed_ms += dt_ms.max(0.0);
        if let Some(remaining) = self.release_in {
            let remaining = remaining - dt_ms;
            if remaining > 0.0 {
                self.release_in = Some(remaining);
            } else {
                return self.finish();
            }
        }
        self.timed_reveal()
    }

    fn timed_reveal(&mut self) -> GateStep {
        if self.complete {
            return GateStep::None;
        }
        let due = |delay: Option<f32>, elapsed: f32| delay.is_some_and(|ms| elapsed >= ms);
        if self.touch_primary && due(self.config.touch_show_all_ms, self.elapsed_ms) {
            log::debug!("scroll gate: touch device, showing all {} steps", self.steps);
            self.started = true;
            self.index = self.steps;
            self.finish();
            return GateStep::Advanced(self.index);
        }
        if !self.started && due(self.config.first_reveal_ms, self.elapsed_ms) {
            self.started = true;
            if self.index == 0 && self.steps > 0 {
                self.index = 1;
                self.arm_release();
                return GateStep::Advanced(1);
            }
        }
        GateStep::None
    }

    fn step(&mut self, forward: bool) -> GateStep {
        self.started = true;
        if forward && self.index < self.steps {
            self.index += 1;
            self.arm_release();
            GateStep::Advanced(self.index)
        } else if !forward && self.index > 0 {
            self.index -= 1;
            self.release_in = None;
            GateStep::Retreated(self.index)
        } else {
            GateStep::None
        }
    }

    fn arm_release(&mut self) {
        if self.index == self.steps && self.release_in.is_none() {
            self.release_in = Some(self.config.release_delay_ms);
        }
    }

    fn finish(&mut self) -> GateStep {
        self.release_in = None;
        self.accumulated = 0.0;
        self.complete = true;
        if self.lock == ScrollLock::Released {
            return GateStep::None;
        }
        log::debug!("scroll gate released after {} steps", self.steps);
        self.lock = ScrollLock::Released;
        GateStep::Released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(steps: usize) -> ScrollGate {
        let mut gate = ScrollGate::new(steps, GateConfig::default());
        gate.enter();
        gate
    }

    #[test]
    fn wheel_needs_accumulated_sensitivity() {
        let mut g = gate(3);
        assert_eq!(g.wheel(60.0), GateStep::None);
        assert_eq!(g.wheel(59.0), GateStep::None);
        assert_eq!(g.wheel(1.0), GateStep::Advanced(1));
        // Accumulator was reset.
        assert_eq!(g.wheel(119.0), GateStep::None);
        assert_eq!(g.wheel(-300.0), GateStep::Retreated(0));
    }

    #[test]
    fn one_burst_moves_one_step() {
        let mut g = gate(3);
        assert_eq!(g.wheel(10_000.0), GateStep::Advanced(1));
        assert_eq!(g.index(), 1);
    }

    #[test]
    fn index_never_leaves_range() {
        let mut g = gate(2);
        for _ in 0..10 {
            g.wheel(-500.0);
        }
        assert_eq!(g.index(), 0);
        for _ in 0..10 {
            g.key(GateKey::Down);
        }
        assert_eq!(g.index(), 2);
        assert_eq!(g.jump_to(99), GateStep::None);
        assert_eq!(g.index(), 2);
    }

    #[test]
    fn last_step_releases_after_delay() {
        let mut g = gate(2);
        g.key(GateKey::Down);
        g.key(GateKey::Down);
        assert_eq!(g.lock(), ScrollLock::Locked);
        assert_eq!(g.advance_time(600.0), GateStep::None);
        assert_eq!(g.advance_time(400.0), GateStep::Released);
        assert_eq!(g.lock(), ScrollLock::Released);
        assert!(g.is_complete());
        // Released gates ignore input and never re-lock.
        assert_eq!(g.wheel(-500.0), GateStep::None);
        g.enter();
        assert_eq!(g.lock(), ScrollLock::Released);
    }

    #[test]
    fn retreating_cancels_pending_release() {
        let mut g = gate(1);
        g.key(GateKey::Down);
        g.key(GateKey::Up);
        assert_eq!(g.advance_time(5_000.0), GateStep::None);
        assert_eq!(g.lock(), ScrollLock::Locked);
    }

    #[test]
    fn swipes_use_their_own_threshold() {
        let mut g = gate(3);
        g.touch_start(500.0);
        assert_eq!(g.touch_move(470.0), GateStep::None);
        assert_eq!(g.touch_move(440.0), GateStep::Advanced(1));
        assert_eq!(g.touch_move(500.0), GateStep::Retreated(0));
    }

    #[test]
    fn leaving_upward_resets() {
        let mut g = gate(4);
        g.key(GateKey::Down);
        g.key(GateKey::Down);
        g.leave(true);
        assert_eq!(g.index(), 0);
        assert_eq!(g.lock(), ScrollLock::Released);
        g.enter();
        g.key(GateKey::Down);
        g.leave(false);
        assert_eq!(g.index(), 1);
    }

    #[test]
    fn show_all_releases_now() {
        let mut g = gate(5);
        assert_eq!(g.show_all(), GateStep::Released);
        assert_eq!(g.index(), 5);
    }

    #[test]
    fn first_step_reveals_itself_after_a_pause() {
        let mut g = ScrollGate::new(3, GateConfig::default());
        assert_eq!(g.advance_time(300.0), GateStep::None);
        assert_eq!(g.advance_time(300.0), GateStep::Advanced(1));
        assert_eq!(g.advance_time(5_000.0), GateStep::None);
        assert_eq!(g.index(), 1);
    }

    #[test]
    fn reader_input_cancels_the_timed_reveal() {
        let mut g = gate(3);
        g.key(GateKey::Down);
        g.key(GateKey::Up);
        assert_eq!(g.advance_time(600.0), GateStep::None);
        assert_eq!(g.index(), 0);

        let config = GateConfig { first_reveal_ms: None, ..GateConfig::default() };
        let mut quiet = ScrollGate::new(3, config);
        assert_eq!(quiet.advance_time(5_000.0), GateStep::None);
        assert_eq!(quiet.index(), 0);
    }

    #[test]
    fn touch_devices_show_everything() {
        let mut g = ScrollGate::new(4, GateConfig::default()).touch_primary(true);
        g.enter();
        g.advance_time(600.0);
        assert_eq!(g.index(), 1);
        assert_eq!(g.advance_time(400.0), GateStep::Advanced(4));
        assert!(g.is_complete());
        assert_eq!(g.lock(), ScrollLock::Released);
    }

    #[test]
    fn scroll_listeners_can_cancel_native_scrolling() {
        let blocking: Vec<EventKind> = GATE_BINDINGS.iter().filter(|b| !b.passive).map(|b| b.kind).collect();
        assert_eq!(blocking, [EventKind::Wheel, EventKind::TouchMove, EventKind::KeyDown]);
    }

    #[test]
    fn background_holds_last_colour() {
        assert_eq!(background_step(0, &BIO_BACKGROUNDS), Some(&"#0f0f0f"));
        assert_eq!(background_step(40, &BIO_BACKGROUNDS), Some(&"#3e3e3e"));
        assert_eq!(background_step::<&str>(0, &[]), None);
    }

    #[test]
    fn keys_parse() {
        assert_eq!(GateKey::from_key("ArrowDown"), Some(GateKey::Down));
        assert_eq!(GateKey::from_key("ArrowUp"), Some(GateKey::Up));
        assert_eq!(GateKey::from_key("Enter"), None);
    }
}

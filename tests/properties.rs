#![cfg(not(target_arch = "wasm32"))]

use glam::Vec2;
use portfolio_fx::config::{DotFieldConfig, GateConfig, GeometricConfig};
use portfolio_fx::effects::{DotField, Effect, EffectKind, Scene};
use portfolio_fx::falloff::linear_falloff;
use portfolio_fx::input::{Binding, InputEvent, OrientationPermission};
use portfolio_fx::lifecycle::{Host, Lifecycle, Phase};
use portfolio_fx::scroll_gate::{GateKey, GateStep, ScrollGate, ScrollLock};
use portfolio_fx::surface::RecordingSurface;
use portfolio_fx::{FxError, Result};

use rand::SeedableRng;

const KINDS: [EffectKind; 5] = [
    EffectKind::DotField,
    EffectKind::Geometric,
    EffectKind::Gravity,
    EffectKind::MagicTrail,
    EffectKind::Matrix,
];

/// Counts calls so attach/detach and schedule/cancel can be compared.
#[derive(Default)]
struct CountingHost {
    attached: usize,
    detached: usize,
    scheduled: usize,
    cancelled: usize,
    fail_schedule: bool,
}

impl CountingHost {
    fn live_listeners(&self) -> usize {
        self.attached - self.detached
    }
}

impl Host for CountingHost {
    type Listener = Binding;
    type Frame = usize;

    fn attach(&mut self, binding: Binding) -> Result<Binding> {
        self.attached += 1;
        Ok(binding)
    }

    fn detach(&mut self, _listener: Binding) {
        self.detached += 1;
    }

    fn schedule(&mut self) -> Result<usize> {
        if self.fail_schedule {
            return Err(FxError::Js("requestAnimationFrame unavailable".into()));
        }
        self.scheduled += 1;
        Ok(self.scheduled)
    }

    fn cancel(&mut self, _frame: usize) {
        self.cancelled += 1;
    }
}

fn jitter(step: usize, bounds: Vec2) -> Vec<InputEvent> {
    let t = step as f32;
    let x = (t * 37.0) % (bounds.x + 200.0) - 100.0;
    let y = (t * 53.0) % (bounds.y + 200.0) - 100.0;
    match step % 7 {
        0 => vec![InputEvent::PointerMove { x, y }],
        1 => vec![InputEvent::TouchMove { x, y }],
        2 => vec![InputEvent::TouchEnd],
        3 => vec![InputEvent::Orientation { gamma: (t % 180.0) - 90.0, beta: (t % 360.0) - 180.0 }],
        4 => vec![InputEvent::PointerLeave],
        5 => vec![InputEvent::Permission(OrientationPermission::Granted)],
        _ => vec![InputEvent::PointerMove { x: bounds.x / 2.0, y: bounds.y / 2.0 }],
    }
}

#[test]
fn mount_then_unmount_leaves_nothing_behind() {
    for kind in KINDS {
        let effect = kind.build(None, true).unwrap();
        let bindings = effect.bindings();
        let mut scene = Scene::new(effect, 1);
        let mut surface = RecordingSurface::new(320.0, 240.0);
        scene.resize(Vec2::new(320.0, 240.0));

        let mut host = CountingHost::default();
        let mut lifecycle = Lifecycle::new();
        lifecycle.mount(&mut host, bindings).unwrap();
        assert_eq!(lifecycle.phase(), Phase::Running);
        assert_eq!(host.live_listeners(), bindings.len(), "{kind:?}");

        for _ in 0..10 {
            scene.frame(16.0, &mut surface);
            lifecycle.frame(&mut host).unwrap();
        }
        assert_eq!(lifecycle.frames(), 10);

        lifecycle.unmount(&mut host);
        lifecycle.unmount(&mut host);
        assert_eq!(host.live_listeners(), 0, "{kind:?}");
        assert_eq!(lifecycle.listener_count(), 0);
        assert!(lifecycle.pending_frame().is_none());
        // Every frame ran to completion except the last, which was cancelled.
        assert_eq!(host.cancelled, 1, "{kind:?}");
    }
}

#[test]
fn failed_mount_rolls_back_listeners() {
    let effect = EffectKind::Gravity.build(None, true).unwrap();
    let mut host = CountingHost { fail_schedule: true, ..Default::default() };
    let mut lifecycle = Lifecycle::new();
    assert!(lifecycle.mount(&mut host, effect.bindings()).is_err());
    assert_eq!(lifecycle.phase(), Phase::Idle);
    assert!(host.attached > 0);
    assert_eq!(host.live_listeners(), 0);
}

#[test]
fn particles_stay_in_bounds() {
    let bounds = Vec2::new(400.0, 300.0);
    let wrap_margin = GeometricConfig::default().max_size + 1.0;
    for kind in KINDS {
        let mut scene = Scene::new(kind.build(None, true).unwrap(), 99);
        let mut surface = RecordingSurface::new(bounds.x, bounds.y);
        scene.resize(bounds);

        for step in 0..600 {
            for event in jitter(step, bounds) {
                scene.dispatch(&event);
            }
            surface.reset();
            scene.frame(16.0, &mut surface);

            let margin = if kind == EffectKind::Geometric { wrap_margin } else { 0.0 };
            for p in scene.effect().positions() {
                assert!(
                    p.x >= -margin && p.y >= -margin && p.x <= bounds.x + margin && p.y <= bounds.y + margin,
                    "{kind:?} step {step}: {p} outside {bounds}"
                );
            }
        }
    }
}

#[test]
fn resizing_twice_keeps_particle_count() {
    for kind in KINDS {
        let mut scene = Scene::new(kind.build(None, false).unwrap(), 5);
        scene.resize(Vec2::new(800.0, 600.0));
        let first = scene.effect().len();
        scene.resize(Vec2::new(800.0, 600.0));
        assert_eq!(scene.effect().len(), first, "{kind:?}");
    }
}

#[test]
fn resize_event_goes_through_dispatch() {
    let mut scene = Scene::new(EffectKind::DotField.build(None, true).unwrap(), 3);
    scene.dispatch(&InputEvent::Resize { width: 300.0, height: 300.0 });
    assert_eq!(scene.effect().bounds(), Vec2::new(300.0, 300.0));
    assert_eq!(scene.effect().len(), 100);
}

#[test]
fn falloff_never_increases_with_distance() {
    for radius in [1.0_f32, 50.0, 120.0, 150.0] {
        let mut previous = f32::INFINITY;
        for i in 0..=400 {
            let d = i as f32 * 0.5;
            let f = linear_falloff(d, radius);
            assert!(f <= previous, "radius {radius}, distance {d}");
            if d >= radius {
                assert_eq!(f, 0.0);
            }
            previous = f;
        }
    }
}

#[test]
fn gate_index_stays_within_steps() {
    let mut gate = ScrollGate::new(4, GateConfig::default());
    gate.enter();
    assert_eq!(gate.wheel(1.0e9), GateStep::Advanced(1));
    for _ in 0..50 {
        gate.wheel(1.0e6);
        gate.key(GateKey::Down);
        assert!(gate.index() <= gate.steps());
    }
    assert_eq!(gate.index(), 4);
    assert_eq!(gate.jump_to(99), GateStep::None);
    for _ in 0..50 {
        gate.wheel(-1.0e6);
        gate.touch_start(0.0);
        gate.touch_move(900.0);
    }
    assert_eq!(gate.index(), 0);
    assert_eq!(gate.lock(), ScrollLock::Locked);
}

#[test]
fn gate_hands_the_page_back_after_the_delay() {
    let mut gate = ScrollGate::new(2, GateConfig::default());
    gate.enter();
    gate.key(GateKey::Down);
    gate.key(GateKey::Down);
    assert_eq!(gate.lock(), ScrollLock::Locked);
    assert_eq!(gate.advance_time(600.0), GateStep::None);
    assert_eq!(gate.advance_time(600.0), GateStep::Released);
    assert!(gate.is_complete());
}

#[test]
fn dot_field_half_radius_scenario() {
    let config = DotFieldConfig { radius: 120.0, easing: 0.2, max_offset: 15.0, ..Default::default() };
    let mut field = DotField::new(config);
    let mut rng = portfolio_fx::effects::FxRng::seed_from_u64(0);
    field.resize(Vec2::new(600.0, 600.0), &mut rng);
    let rest = Vec2::new(300.0, 300.0);
    let i = field.positions().iter().position(|p| *p == rest).unwrap();

    field.input(&InputEvent::PointerMove { x: 360.0, y: 300.0 });
    let offset = field.offset_target(rest, Vec2::new(360.0, 300.0));
    assert!((offset.x + 7.5).abs() < 1e-5, "half of the 15px offset");
    let target = rest + offset;

    field.tick(16.0, &mut rng);
    let mut gap = field.positions()[i].x - target.x;
    assert!((gap - 7.5 * 0.8).abs() < 1e-4);
    for _ in 0..5 {
        field.tick(16.0, &mut rng);
        let next = field.positions()[i].x - target.x;
        assert!((next - gap * 0.8).abs() < 1e-3);
        gap = next;
    }
}

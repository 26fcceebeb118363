use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, HtmlElement, KeyboardEvent, TouchEvent, WheelEvent, Window};

use super::host::DomHost;
use crate::config::{self, GateConfig};
use crate::error::{FxError, Result};
use crate::input::EventKind;
use crate::lifecycle::{Lifecycle, Phase};
use crate::scroll_gate::{
    background_step, GateKey, GateStep, ScrollGate, ScrollLock, BIO_BACKGROUNDS, GATE_BINDINGS,
};

/// Fraction of the section that must be on screen to engage the gate.
const ENGAGE_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
enum GateInput {
    Wheel(f32),
    TouchStart(f32),
    TouchMove(f32),
    TouchEnd,
    Key(GateKey),
}

fn translate(kind: EventKind, event: &Event, _element: &Element) -> Option<GateInput> {
    let first_touch_y = |event: &Event| {
        let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
        Some(touch.client_y() as f32)
    };
    match kind {
        EventKind::Wheel => Some(GateInput::Wheel(event.dyn_ref::<WheelEvent>()?.delta_y() as f32)),
        EventKind::TouchStart => first_touch_y(event).map(GateInput::TouchStart),
        EventKind::TouchMove => first_touch_y(event).map(GateInput::TouchMove),
        EventKind::TouchEnd => Some(GateInput::TouchEnd),
        EventKind::KeyDown => GateKey::from_key(&event.dyn_ref::<KeyboardEvent>()?.key()).map(GateInput::Key),
        _ => None,
    }
}

struct GateStage {
    gate: ScrollGate,
    section: HtmlElement,
    host: DomHost<GateInput>,
    lifecycle: Lifecycle<DomHost<GateInput>>,
    inside: bool,
    applied: Option<ScrollLock>,
    last_ts: Option<f64>,
}

impl GateStage {
    fn on_frame(&mut self, ts: f64) {
        self.track_visibility();
        for input in self.host.drain() {
            let step = match input {
                GateInput::Wheel(delta) => self.gate.wheel(delta),
                GateInput::TouchStart(y) => {
                    self.gate.touch_start(y);
                    GateStep::None
                }
                GateInput::TouchMove(y) => self.gate.touch_move(y),
                GateInput::TouchEnd => {
                    self.gate.touch_end();
                    GateStep::None
                }
                GateInput::Key(key) => self.gate.key(key),
            };
            self.report(step);
        }
        let dt = self.last_ts.map_or(0.0, |last| (ts - last).max(0.0)) as f32;
        self.last_ts = Some(ts);
        let step = self.gate.advance_time(dt);
        self.report(step);
        self.sync_dom();

        if let Err(e) = self.lifecycle.frame(&mut self.host) {
            log::warn!("scroll gate: frame loop stopped: {e}");
        }
    }

    /// Engage when at least half the section is visible; leaving while the
    /// section sits below the viewport means the reader scrolled back up.
    fn track_visibility(&mut self) {
        let window = self.host.window();
        let viewport = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let rect = self.section.get_bounding_client_rect();
        let visible = (rect.bottom().min(viewport) - rect.top().max(0.0)).max(0.0);
        let ratio = if rect.height() > 0.0 { visible / rect.height().min(viewport.max(1.0)) } else { 0.0 };

        let inside = ratio >= ENGAGE_RATIO;
        if inside == self.inside {
            return;
        }
        self.inside = inside;
        if inside {
            self.gate.enter();
        } else {
            self.gate.leave(rect.top() > 0.0);
        }
    }

    fn report(&self, step: GateStep) {
        match step {
            GateStep::None => {}
            GateStep::Advanced(i) | GateStep::Retreated(i) => {
                log::debug!("scroll gate: step {i} of {}", self.gate.steps())
            }
            GateStep::Released => log::info!("scroll gate: all {} steps shown", self.gate.steps()),
        }
    }

    /// Mirror gate state onto the page; the body lock is touched only on change.
    fn sync_dom(&mut self) {
        let index = self.gate.index();
        self.section.set_attribute("data-step", &index.to_string()).ok();
        if self.gate.is_complete() {
            self.section.set_attribute("data-complete", "").ok();
        }
        if let Some(color) = background_step(index, &BIO_BACKGROUNDS) {
            self.section.style().set_property("background-color", color).ok();
        }

        let lock = self.gate.lock();
        if self.applied != Some(lock) {
            apply_lock(self.host.window(), lock);
            self.host.set_blocking(lock == ScrollLock::Locked);
            self.applied = Some(lock);
        }
    }

    fn unmount(&mut self) {
        self.lifecycle.unmount(&mut self.host);
        self.host.set_blocking(false);
        if self.applied == Some(ScrollLock::Locked) {
            apply_lock(self.host.window(), ScrollLock::Released);
        }
        self.applied = None;
    }
}

fn apply_lock(window: &Window, lock: ScrollLock) {
    let Some(body) = window.document().and_then(|d| d.body()) else {
        return;
    };
    let value = match lock {
        ScrollLock::Locked => "hidden",
        ScrollLock::Released => "",
    };
    body.style().set_property("overflow", value).ok();
}

fn attr_f32(section: &HtmlElement, name: &str) -> Result<Option<f32>> {
    match section.get_attribute(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| FxError::config(format!("{name}: not a number: {raw}"))),
    }
}

/// Gate config from `data-sensitivity`, `data-touch-threshold` and
/// `data-release-delay`.
fn gate_config(section: &HtmlElement) -> Result<GateConfig> {
    let mut config: GateConfig = config::parse(section.get_attribute("data-gate-config").as_deref())?;
    if let Some(v) = attr_f32(section, "data-sensitivity")? {
        config.sensitivity = v;
    }
    if let Some(v) = attr_f32(section, "data-touch-threshold")? {
        config.touch_threshold = v;
    }
    if let Some(v) = attr_f32(section, "data-release-delay")? {
        config.release_delay_ms = v;
    }
    config::Validate::validate(&config)?;
    Ok(config)
}

/// Paging for a scroll-gated section.
#[wasm_bindgen]
pub struct GateHandle {
    stage: Rc<RefCell<GateStage>>,
}

#[wasm_bindgen]
impl GateHandle {
    /// Gate `section` over `steps` steps; `steps` defaults to `data-steps`,
    /// then to the number of child elements.
    #[wasm_bindgen(constructor)]
    pub fn new(section: HtmlElement, steps: Option<u32>) -> std::result::Result<GateHandle, JsValue> {
        Ok(Self::mount(section, steps.map(|s| s as usize))?)
    }

    pub fn index(&self) -> usize {
        self.stage.borrow().gate.index()
    }

    #[wasm_bindgen(js_name = isLocked)]
    pub fn is_locked(&self) -> bool {
        self.stage.borrow().gate.lock() == ScrollLock::Locked
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.stage.borrow().lifecycle.phase() == Phase::Running
    }

    #[wasm_bindgen(js_name = showAll)]
    pub fn show_all(&self) {
        let mut stage = self.stage.borrow_mut();
        let step = stage.gate.show_all();
        stage.report(step);
        stage.sync_dom();
    }

    #[wasm_bindgen(js_name = jumpTo)]
    pub fn jump_to(&self, index: usize) {
        let mut stage = self.stage.borrow_mut();
        let step = stage.gate.jump_to(index);
        stage.report(step);
        stage.sync_dom();
    }

    pub fn unmount(&self) {
        self.stage.borrow_mut().unmount();
    }
}

impl GateHandle {
    pub fn mount(section: HtmlElement, steps: Option<usize>) -> Result<GateHandle> {
        let window = web_sys::window().ok_or_else(|| FxError::MissingElement("window".into()))?;
        let steps = match steps {
            Some(n) => n,
            None => match section.get_attribute("data-steps") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| FxError::config(format!("data-steps: not a count: {raw}")))?,
                None => section.child_element_count() as usize,
            },
        };
        let config = gate_config(&section)?;
        let touch_primary = window
            .match_media("(pointer: coarse)")
            .ok()
            .flatten()
            .is_some_and(|mq| mq.matches());
        let host = DomHost::new(window, section.clone().into(), translate);

        let stage = Rc::new(RefCell::new(GateStage {
            gate: ScrollGate::new(steps, config).touch_primary(touch_primary),
            section,
            host,
            lifecycle: Lifecycle::new(),
            inside: false,
            applied: None,
            last_ts: None,
        }));

        let weak: Weak<RefCell<GateStage>> = Rc::downgrade(&stage);
        let on_frame = Closure::wrap(Box::new(move |ts: f64| {
            if let Some(stage) = weak.upgrade() {
                stage.borrow_mut().on_frame(ts);
            }
        }) as Box<dyn FnMut(f64)>);

        {
            let mut guard = stage.borrow_mut();
            let s = &mut *guard;
            s.host.set_frame_callback(on_frame);
            s.lifecycle.mount(&mut s.host, GATE_BINDINGS)?;
            s.sync_dom();
        }
        log::info!("scroll gate mounted with {steps} steps (touch-first: {touch_primary})");
        Ok(GateHandle { stage })
    }
}

impl Drop for GateHandle {
    fn drop(&mut self) {
        if let Ok(mut stage) = self.stage.try_borrow_mut() {
            stage.unmount();
        }
    }
}

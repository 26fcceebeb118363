use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{DeviceOrientationEvent, Element, Event, HtmlCanvasElement, MouseEvent, TouchEvent};

use super::host::DomHost;
use super::orientation;
use super::render::CanvasSurface;
use crate::effects::{EffectKind, Scene};
use crate::error::{FxError, Result};
use crate::input::{EventKind, InputEvent};
use crate::lifecycle::{Lifecycle, Phase};

/// Canvas-relative input sample for one DOM event.
fn translate(kind: EventKind, event: &Event, element: &Element) -> Option<InputEvent> {
    let rect = element.get_bounding_client_rect();
    let local = |x: i32, y: i32| ((x as f64 - rect.left()) as f32, (y as f64 - rect.top()) as f32);
    match kind {
        EventKind::MouseMove => {
            let e = event.dyn_ref::<MouseEvent>()?;
            let (x, y) = local(e.client_x(), e.client_y());
            Some(InputEvent::PointerMove { x, y })
        }
        EventKind::MouseLeave => Some(InputEvent::PointerLeave),
        EventKind::TouchMove => {
            let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
            let (x, y) = local(touch.client_x(), touch.client_y());
            Some(InputEvent::TouchMove { x, y })
        }
        EventKind::TouchEnd => Some(InputEvent::TouchEnd),
        EventKind::Resize => Some(InputEvent::Resize {
            width: rect.width() as f32,
            height: rect.height() as f32,
        }),
        EventKind::DeviceOrientation => {
            let e = event.dyn_ref::<DeviceOrientationEvent>()?;
            Some(InputEvent::Orientation { gamma: e.gamma()? as f32, beta: e.beta()? as f32 })
        }
        _ => None,
    }
}

struct Stage {
    scene: Scene,
    surface: CanvasSurface,
    host: DomHost<InputEvent>,
    lifecycle: Lifecycle<DomHost<InputEvent>>,
    last_ts: Option<f64>,
}

impl Stage {
    fn on_frame(&mut self, ts: f64) {
        for event in self.host.drain() {
            if let InputEvent::Resize { .. } = event {
                // Backing store first so the rebuilt grid matches what is drawn.
                let bounds = self.surface.fit();
                self.scene.resize(bounds);
            } else {
                self.scene.dispatch(&event);
            }
        }
        let dt = self.last_ts.map_or(16.0, |last| (ts - last).clamp(0.0, 100.0)) as f32;
        self.last_ts = Some(ts);
        self.scene.frame(dt, &mut self.surface);

        if let Err(e) = self.lifecycle.frame(&mut self.host) {
            log::warn!("{}: frame loop stopped: {e}", self.scene.effect().name());
        }
    }

    fn unmount(&mut self) {
        if self.lifecycle.phase() == Phase::Running {
            log::debug!("{}: unmount", self.scene.effect().name());
        }
        self.lifecycle.unmount(&mut self.host);
    }
}

fn pointer_available(window: &web_sys::Window) -> bool {
    window
        .match_media("(pointer: fine)")
        .ok()
        .flatten()
        .map_or(true, |mq| mq.matches())
}

fn seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

/// A running canvas effect. Dropping or unmounting it stops the loop and
/// removes every listener it added.
#[wasm_bindgen]
pub struct EffectHandle {
    stage: Rc<RefCell<Stage>>,
}

#[wasm_bindgen]
impl EffectHandle {
    /// Mount `kind` (`dot-field`, `geometric`, `gravity`, `magic-trail`,
    /// `matrix`) on `canvas`, optionally overriding knobs with JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, kind: &str, config: Option<String>) -> std::result::Result<EffectHandle, JsValue> {
        Ok(Self::mount(canvas, kind, config.as_deref())?)
    }

    pub fn unmount(&self) {
        self.stage.borrow_mut().unmount();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.stage.borrow().lifecycle.phase() == Phase::Running
    }

    #[wasm_bindgen(js_name = listenerCount)]
    pub fn listener_count(&self) -> usize {
        self.stage.borrow().lifecycle.listener_count()
    }

    #[wasm_bindgen(js_name = hasPendingFrame)]
    pub fn has_pending_frame(&self) -> bool {
        self.stage.borrow().lifecycle.pending_frame().is_some()
    }

    #[wasm_bindgen(js_name = particleCount)]
    pub fn particle_count(&self) -> usize {
        self.stage.borrow().scene.effect().len()
    }
}

impl EffectHandle {
    pub fn mount(canvas: HtmlCanvasElement, kind: &str, config: Option<&str>) -> Result<EffectHandle> {
        let window = web_sys::window().ok_or_else(|| FxError::MissingElement("window".into()))?;
        let kind: EffectKind = kind.parse()?;
        let effect = kind.build(config, pointer_available(&window))?;
        let surface = CanvasSurface::new(canvas.clone())?;
        let host = DomHost::new(window.clone(), canvas.into(), translate);
        let wants_tilt = effect
            .bindings()
            .iter()
            .any(|b| b.kind == EventKind::DeviceOrientation);

        let stage = Rc::new(RefCell::new(Stage {
            scene: Scene::new(effect, seed()),
            surface,
            host,
            lifecycle: Lifecycle::new(),
            last_ts: None,
        }));

        let weak: Weak<RefCell<Stage>> = Rc::downgrade(&stage);
        let on_frame = Closure::wrap(Box::new(move |ts: f64| {
            if let Some(stage) = weak.upgrade() {
                stage.borrow_mut().on_frame(ts);
            }
        }) as Box<dyn FnMut(f64)>);

        {
            let mut guard = stage.borrow_mut();
            let s = &mut *guard;
            s.host.set_frame_callback(on_frame);
            let bounds = s.surface.fit();
            s.scene.resize(bounds);
            let bindings = s.scene.effect().bindings();
            s.lifecycle.mount(&mut s.host, bindings)?;
            if wants_tilt {
                orientation::request(&window, Rc::downgrade(&s.host.inbox()));
            }
            log::info!("{}: mounted {}x{}", s.scene.effect().name(), bounds.x, bounds.y);
        }
        Ok(EffectHandle { stage })
    }

    pub fn bounds(&self) -> Vec2 {
        self.stage.borrow().scene.effect().bounds()
    }
}

impl Drop for EffectHandle {
    fn drop(&mut self) {
        if let Ok(mut stage) = self.stage.try_borrow_mut() {
            stage.unmount();
        }
    }
}

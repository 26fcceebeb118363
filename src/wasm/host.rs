use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Element, Event, EventTarget, Window};

use crate::error::{FxError, Result};
use crate::input::{Binding, EventKind, Target};
use crate::lifecycle::Host;

pub(crate) fn js_error(e: JsValue) -> FxError {
    FxError::Js(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// Events collected by listeners, drained by the next frame.
pub type Inbox<T> = Rc<RefCell<Vec<T>>>;

/// Turns a raw DOM event into the item queued for the frame loop.
pub type Translate<T> = fn(EventKind, &Event, &Element) -> Option<T>;

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub struct DomListener {
    target: EventTarget,
    name: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// [`Host`] over `addEventListener` and `requestAnimationFrame`.
pub struct DomHost<T> {
    window: Window,
    element: Element,
    inbox: Inbox<T>,
    frame: FrameSlot,
    translate: Translate<T>,
    blocking: Rc<Cell<bool>>,
}

impl<T: 'static> DomHost<T> {
    pub fn new(window: Window, element: Element, translate: Translate<T>) -> Self {
        Self {
            window,
            element,
            inbox: Rc::new(RefCell::new(Vec::new())),
            frame: Rc::new(RefCell::new(None)),
            translate,
            blocking: Rc::new(Cell::new(false)),
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn inbox(&self) -> Inbox<T> {
        Rc::clone(&self.inbox)
    }

    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.inbox.borrow_mut())
    }

    /// While set, non-passive listeners cancel the default action of every
    /// event they queue.
    pub fn set_blocking(&self, blocking: bool) {
        self.blocking.set(blocking);
    }

    /// Install the callback every scheduled frame runs.
    pub fn set_frame_callback(&self, callback: Closure<dyn FnMut(f64)>) {
        *self.frame.borrow_mut() = Some(callback);
    }

    fn target(&self, target: Target) -> Result<EventTarget> {
        Ok(match target {
            Target::Window => self.window.clone().into(),
            Target::Document => self
                .window
                .document()
                .ok_or_else(|| FxError::MissingElement("document".into()))?
                .into(),
            Target::Element => self.element.clone().into(),
        })
    }
}

impl<T: 'static> Host for DomHost<T> {
    type Listener = DomListener;
    type Frame = i32;

    fn attach(&mut self, binding: Binding) -> Result<DomListener> {
        let target = self.target(binding.target)?;
        let inbox = Rc::downgrade(&self.inbox);
        let element = self.element.clone();
        let translate = self.translate;
        let kind = binding.kind;
        let blocking = (!binding.passive).then(|| Rc::clone(&self.blocking));

        let callback = Closure::wrap(Box::new(move |event: Event| {
            let Some(inbox) = inbox.upgrade() else {
                return;
            };
            if let Some(item) = translate(kind, &event, &element) {
                if blocking.as_ref().is_some_and(|b| b.get()) {
                    event.prevent_default();
                }
                inbox.borrow_mut().push(item);
            }
        }) as Box<dyn FnMut(Event)>);

        let options = AddEventListenerOptions::new();
        options.set_passive(binding.passive);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind.name(),
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(js_error)?;
        Ok(DomListener { target, name: kind.name(), callback })
    }

    fn detach(&mut self, listener: DomListener) {
        if let Err(e) = listener
            .target
            .remove_event_listener_with_callback(listener.name, listener.callback.as_ref().unchecked_ref())
        {
            log::warn!("removeEventListener({}) failed: {:?}", listener.name, e);
        }
    }

    fn schedule(&mut self) -> Result<i32> {
        let slot = self.frame.borrow();
        let callback = slot
            .as_ref()
            .ok_or_else(|| FxError::Js("frame callback not installed".into()))?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(js_error)
    }

    fn cancel(&mut self, frame: i32) {
        self.window.cancel_animation_frame(frame).ok();
    }
}

//! Device-orientation capability check.
//!
//! iOS 13+ gates `deviceorientation` behind `DeviceOrientationEvent
//! .requestPermission()`, which resolves asynchronously. Other browsers
//! either deliver events directly or lack the API entirely.

use std::cell::RefCell;
use std::rc::Weak;

use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::Window;

use crate::input::{InputEvent, OrientationPermission};

/// Capability as far as it can be known without prompting, plus the
/// permission prompt when the browser requires one.
pub fn detect(window: &Window) -> (OrientationPermission, Option<Function>) {
    let Ok(ctor) = Reflect::get(window, &JsValue::from_str("DeviceOrientationEvent")) else {
        return (OrientationPermission::Unsupported, None);
    };
    if ctor.is_undefined() || ctor.is_null() {
        return (OrientationPermission::Unsupported, None);
    }
    match Reflect::get(&ctor, &JsValue::from_str("requestPermission")) {
        Ok(f) if f.is_function() => {
            let request: Function = f.unchecked_into();
            // Bind so `this` is the constructor when called.
            let bound = request.bind(&ctor);
            (OrientationPermission::Denied, Some(bound))
        }
        _ => (OrientationPermission::Granted, None),
    }
}

/// Post the capability result into `inbox`, prompting on iOS.
///
/// Anything other than an explicit "granted" counts as denied.
pub fn request(window: &Window, inbox: Weak<RefCell<Vec<InputEvent>>>) {
    let (immediate, prompt) = detect(window);
    let Some(prompt) = prompt else {
        log::info!("device orientation: {immediate:?}");
        post(&inbox, immediate);
        return;
    };

    let promise = match prompt.call0(&JsValue::UNDEFINED) {
        Ok(p) => match p.dyn_into::<Promise>() {
            Ok(p) => p,
            Err(_) => {
                post(&inbox, OrientationPermission::Denied);
                return;
            }
        },
        Err(e) => {
            log::warn!("requestPermission threw: {e:?}");
            post(&inbox, OrientationPermission::Denied);
            return;
        }
    };

    // Settled at most once; leaked like any one-shot promise callback.
    let on_ok = {
        let inbox = inbox.clone();
        Closure::wrap(Box::new(move |state: JsValue| {
            let permission = if state.as_string().as_deref() == Some("granted") {
                OrientationPermission::Granted
            } else {
                OrientationPermission::Denied
            };
            log::info!("device orientation permission: {permission:?}");
            post(&inbox, permission);
        }) as Box<dyn FnMut(JsValue)>)
    };
    let on_err = Closure::wrap(Box::new(move |e: JsValue| {
        log::warn!("device orientation permission rejected: {e:?}");
        post(&inbox, OrientationPermission::Denied);
    }) as Box<dyn FnMut(JsValue)>);
    let _ = promise.then2(&on_ok, &on_err);
    on_ok.forget();
    on_err.forget();
}

fn post(inbox: &Weak<RefCell<Vec<InputEvent>>>, permission: OrientationPermission) {
    if let Some(inbox) = inbox.upgrade() {
        inbox.borrow_mut().push(InputEvent::Permission(permission));
    }
}

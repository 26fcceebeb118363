#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Canvas backgrounds, scroll-gated paging and the contact flow for the
//! portfolio site.
//!
//! Everything outside [`wasm`] is plain Rust and runs under `cargo test` on
//! the host; the browser glue only compiles for `wasm32`.

pub mod config;
pub mod conversation;
pub mod effects;
pub mod error;
pub mod falloff;
pub mod input;
pub mod lifecycle;
pub mod progress;
pub mod scroll_gate;
pub mod surface;

pub use error::{FxError, Result};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement};

    mod contact;
    mod effect;
    mod gate;
    mod host;
    mod orientation;
    mod render;

    pub use contact::{page_scroll_progress, ContactFlow};
    pub use effect::EffectHandle;
    pub use gate::GateHandle;

    thread_local! {
        static MOUNTED: RefCell<Mounted> = RefCell::new(Mounted::default());
    }

    #[derive(Default)]
    struct Mounted {
        effects: Vec<EffectHandle>,
        gates: Vec<GateHandle>,
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let level = document.body().and_then(|b| b.get_attribute("data-fx-log"));
        console_log::init_with_level(crate::config::log_level(level.as_deref())).ok();

        let effects = mount_effects(&document)?;
        let gates = mount_gates(&document)?;
        log::info!("mounted {} effect(s), {} scroll gate(s)", effects.len(), gates.len());

        MOUNTED.with(|m| {
            let mut m = m.borrow_mut();
            m.effects.extend(effects);
            m.gates.extend(gates);
        });
        Ok(())
    }

    /// One bad canvas must not take the rest of the page down with it.
    fn mount_effects(document: &Document) -> Result<Vec<EffectHandle>, JsValue> {
        let nodes = document.query_selector_all("canvas[data-fx]")?;
        let mut handles = Vec::new();
        for i in 0..nodes.length() {
            let Some(canvas) = nodes.get(i).and_then(|n| n.dyn_into::<HtmlCanvasElement>().ok()) else {
                continue;
            };
            let kind = canvas.get_attribute("data-fx").unwrap_or_default();
            let config = canvas.get_attribute("data-fx-config");
            match EffectHandle::mount(canvas, &kind, config.as_deref()) {
                Ok(handle) => handles.push(handle),
                Err(e) => log::warn!("data-fx=\"{kind}\": {e}"),
            }
        }
        Ok(handles)
    }

    fn mount_gates(document: &Document) -> Result<Vec<GateHandle>, JsValue> {
        let nodes = document.query_selector_all("[data-scroll-gate]")?;
        let mut handles = Vec::new();
        for i in 0..nodes.length() {
            let Some(section) = nodes.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            match GateHandle::mount(section, None) {
                Ok(handle) => handles.push(handle),
                Err(e) => log::warn!("data-scroll-gate: {e}"),
            }
        }
        Ok(handles)
    }

    /// Stop every auto-mounted effect and gate, e.g. before a client-side
    /// navigation swaps the page body.
    #[wasm_bindgen(js_name = unmountAll)]
    pub fn unmount_all() {
        let Mounted { effects, gates } = MOUNTED.with(|m| std::mem::take(&mut *m.borrow_mut()));
        log::debug!("unmounting {} effect(s), {} gate(s)", effects.len(), gates.len());
        for handle in &effects {
            handle.unmount();
        }
        for handle in &gates {
            handle.unmount();
        }
    }
}

#![cfg(target_arch = "wasm32")]

use portfolio_fx::wasm::{ContactFlow, EffectHandle, GateHandle};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn canvas() -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.style().set_property("width", "320px").unwrap();
    canvas.style().set_property("height", "240px").unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

fn body_overflow() -> String {
    let body = web_sys::window().unwrap().document().unwrap().body().unwrap();
    body.style().get_property_value("overflow").unwrap()
}

#[wasm_bindgen_test]
fn every_effect_mounts_and_cleans_up() {
    for kind in ["dot-field", "geometric", "gravity", "magic-trail", "matrix"] {
        let canvas = canvas();
        let handle = EffectHandle::new(canvas.clone(), kind, None).unwrap();
        assert!(handle.is_running(), "{kind}");
        assert!(handle.listener_count() > 0, "{kind}");
        assert!(handle.has_pending_frame(), "{kind}");
        assert_eq!(handle.bounds().x, 320.0, "{kind}");

        handle.unmount();
        assert!(!handle.is_running(), "{kind}");
        assert_eq!(handle.listener_count(), 0, "{kind}");
        assert!(!handle.has_pending_frame(), "{kind}");
        canvas.remove();
    }
}

#[wasm_bindgen_test]
fn config_override_is_applied() {
    let canvas = canvas();
    let handle = EffectHandle::new(canvas.clone(), "gravity", Some(r#"{"count": 3}"#.into())).unwrap();
    assert_eq!(handle.particle_count(), 3);
    handle.unmount();
    canvas.remove();
}

#[wasm_bindgen_test]
fn bad_kind_and_bad_config_are_rejected() {
    let canvas = canvas();
    assert!(EffectHandle::new(canvas.clone(), "sparkles", None).is_err());
    assert!(EffectHandle::new(canvas.clone(), "matrix", Some("{\"spacing\": -1}".into())).is_err());
    assert!(EffectHandle::new(canvas.clone(), "dot-field", Some("{\"colour\": 1}".into())).is_err());
    canvas.remove();
}

fn gated_section(document: &web_sys::Document, fill_viewport: bool) -> HtmlElement {
    let section: HtmlElement = document.create_element("section").unwrap().dyn_into().unwrap();
    for _ in 0..3 {
        section.append_child(&document.create_element("p").unwrap()).unwrap();
    }
    if fill_viewport {
        let style = section.style();
        for (name, value) in [("position", "fixed"), ("top", "0"), ("left", "0"), ("width", "100%"), ("height", "100vh")] {
            style.set_property(name, value).unwrap();
        }
    }
    document.body().unwrap().append_child(&section).unwrap();
    section
}

async fn next_frame() {
    let frame = js_sys::Promise::new(&mut |resolve, _reject| {
        web_sys::window().unwrap().request_animation_frame(&resolve).unwrap();
    });
    wasm_bindgen_futures::JsFuture::from(frame).await.unwrap();
}

#[wasm_bindgen_test]
fn gate_steps_are_mirrored_into_the_section() {
    let document = web_sys::window().unwrap().document().unwrap();
    let section = gated_section(&document, false);

    let gate = GateHandle::new(section.clone(), None).unwrap();
    assert!(gate.is_running());
    assert_eq!(gate.index(), 0);
    assert_eq!(section.get_attribute("data-step").as_deref(), Some("0"));

    gate.jump_to(2);
    assert_eq!(section.get_attribute("data-step").as_deref(), Some("2"));
    gate.show_all();
    assert_eq!(gate.index(), 3);
    assert!(section.has_attribute("data-complete"));

    gate.unmount();
    assert!(!gate.is_running());
    section.remove();
}

#[wasm_bindgen_test]
async fn visible_gate_locks_the_page_until_unmounted() {
    let document = web_sys::window().unwrap().document().unwrap();
    let section = gated_section(&document, true);

    let gate = GateHandle::new(section.clone(), None).unwrap();
    next_frame().await;
    next_frame().await;
    assert!(gate.is_locked());
    assert_eq!(body_overflow(), "hidden");

    gate.unmount();
    assert!(!gate.is_running());
    assert_eq!(body_overflow(), "");
    section.remove();
}

#[wasm_bindgen_test]
fn contact_flow_collects_answers() {
    let mut flow = ContactFlow::new(Some("he-IL".into()));
    assert_eq!(flow.dir(), "rtl");
    assert_eq!(flow.field().as_deref(), Some("name"));
    flow.answer("Dana").unwrap();
    assert!(flow.answer("not-an-email").is_err());
    flow.answer("dana@example.com").unwrap();
    flow.answer("hello").unwrap();
    assert!(flow.is_complete());

    let json = flow.submission_json().unwrap().unwrap();
    assert!(json.contains("\"email\":\"dana@example.com\""));
}

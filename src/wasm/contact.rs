use wasm_bindgen::prelude::*;

use crate::conversation::{ConversationFlow, Language};
use crate::error::FxError;
use crate::progress::scroll_progress;

/// The contact conversation as seen from the page script.
#[wasm_bindgen]
pub struct ContactFlow {
    flow: ConversationFlow,
}

#[wasm_bindgen]
impl ContactFlow {
    /// `lang` is a BCP 47 tag such as `he-IL`; unknown tags fall back to English.
    #[wasm_bindgen(constructor)]
    pub fn new(lang: Option<String>) -> ContactFlow {
        let language = lang
            .as_deref()
            .and_then(|tag| tag.parse::<Language>().map_err(|e: FxError| log::debug!("{e}")).ok())
            .unwrap_or_default();
        ContactFlow { flow: ConversationFlow::new(language) }
    }

    pub fn lang(&self) -> String {
        self.flow.language().tag().to_owned()
    }

    pub fn dir(&self) -> String {
        self.flow.language().dir().to_owned()
    }

    #[wasm_bindgen(js_name = setLanguage)]
    pub fn set_language(&mut self, lang: &str) -> Result<(), JsValue> {
        let language: Language = lang.parse()?;
        self.flow.set_language(language);
        Ok(())
    }

    pub fn step(&self) -> usize {
        self.flow.step()
    }

    #[wasm_bindgen(js_name = questionCount)]
    pub fn question_count(&self) -> usize {
        self.flow.questions().len()
    }

    /// Title of the current question, `undefined` once complete.
    pub fn title(&self) -> Option<String> {
        self.flow.current().map(|q| q.title.to_owned())
    }

    pub fn placeholder(&self) -> Option<String> {
        self.flow.current().map(|q| q.placeholder.to_owned())
    }

    pub fn field(&self) -> Option<String> {
        self.flow.current().map(|q| q.field.key().to_owned())
    }

    #[wasm_bindgen(js_name = inputType)]
    pub fn input_type(&self) -> Option<String> {
        self.flow.current().map(|q| q.kind.input_type().to_owned())
    }

    /// Record an answer; throws with a readable message if it is rejected.
    pub fn answer(&mut self, value: &str) -> Result<(), JsValue> {
        self.flow
            .answer(value)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn back(&mut self) -> bool {
        self.flow.back()
    }

    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.flow.is_complete()
    }

    /// The collected answers as JSON, once every question is done.
    #[wasm_bindgen(js_name = submissionJson)]
    pub fn submission_json(&self) -> Result<Option<String>, JsValue> {
        self.flow
            .submission()
            .map(|s| serde_json::to_string(s).map_err(FxError::from))
            .transpose()
            .map_err(JsValue::from)
    }

    pub fn reset(&mut self) {
        self.flow.reset();
    }
}

/// Reading progress of the page in `[0, 1]`.
#[wasm_bindgen(js_name = pageScrollProgress)]
pub fn page_scroll_progress() -> f64 {
    let Some(window) = web_sys::window() else {
        return 0.0;
    };
    let scroll_y = window.scroll_y().unwrap_or(0.0);
    let viewport = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let document_height = window
        .document()
        .and_then(|d| d.document_element())
        .map_or(0.0, |root| root.scroll_height() as f64);
    scroll_progress(scroll_y, document_height, viewport)
}

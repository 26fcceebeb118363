//! Error type shared by the effects, the scroll gate and the browser glue.

use thiserror::Error;

/// Errors raised while configuring or mounting an effect.
#[derive(Error, Debug)]
pub enum FxError {
    /// A DOM node the effect needs is not on the page.
    #[error("element not found: {0}")]
    MissingElement(String),

    /// The canvas refused to hand out a 2D context.
    #[error("2d canvas context unavailable")]
    NoContext,

    /// `data-fx` named an effect this crate does not know.
    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    /// A config knob was malformed or out of range.
    #[error("invalid config: {0}")]
    Config(String),

    /// `data-fx-config` was not valid JSON for the effect.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A browser call threw.
    #[error("javascript error: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, FxError>;

impl FxError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        FxError::Config(msg.into())
    }
}

impl From<FxError> for wasm_bindgen::JsValue {
    fn from(e: FxError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

//! Filename and identifier helpers for the browser front end.

use photo_squeeze_core::{identifier, naming};
use wasm_bindgen::prelude::*;

/// Reduce a person's name to `[A-Za-z0-9_-]` (spaces become underscores).
#[wasm_bindgen]
pub fn sanitize_filename(name: &str) -> String {
    naming::sanitize_filename(name)
}

/// Storage filename for a person's photo, e.g. `John_Doe.jpg`.
#[wasm_bindgen]
pub fn photo_filename(name: &str) -> Result<String, JsValue> {
    naming::photo_filename(name).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Transform an identifier into its stored form.
#[wasm_bindgen]
pub fn encrypt_identifier(id: &str) -> String {
    identifier::encrypt(id)
}

/// Recover an identifier from its stored form.
#[wasm_bindgen]
pub fn decrypt_identifier(stored: &str) -> String {
    identifier::decrypt(stored)
}

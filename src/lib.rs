/// Tab Organizer - background engine for the new-tab page extension
/// Built with Rust + WASM

pub mod browser;
pub mod classifier;
pub mod config;
pub mod operations;
pub mod organizer;
pub mod router;
pub mod tab_data;

#[cfg(test)]
mod fake_browser;

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::browser::ChromeTabs;
use crate::config::OrganizerConfig;
use crate::organizer::Organizer;
use crate::router::{Response, Router};

thread_local! {
    static ROUTER: Rc<Router<ChromeTabs>> =
        Rc::new(Router::new(Organizer::new(ChromeTabs, OrganizerConfig::default())));
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Replace the organizer configuration (megaPriority, settleDelayMs, extractDomains)
#[wasm_bindgen]
pub fn configure(config: JsValue) -> Result<(), JsValue> {
    let config: OrganizerConfig = serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {:?}", e)))?;
    log::info!("Configured with {} priority entries", config.mega_priority.len());
    ROUTER.with(|router| router.organizer().set_config(config));
    Ok(())
}

/// Handle one `runtime.onMessage` request; the promise always resolves to a response
#[wasm_bindgen]
pub fn handle_message(request: JsValue) -> js_sys::Promise {
    let router = ROUTER.with(Rc::clone);

    future_to_promise(async move {
        let response = match serde_wasm_bindgen::from_value::<serde_json::Value>(request) {
            Ok(message) => router.handle_value(message).await,
            Err(e) => Response::failure(format!("Failed to parse request: {:?}", e)),
        };
        Ok(response_to_js(&response))
    })
}

fn response_to_js(response: &Response) -> JsValue {
    serde_wasm_bindgen::to_value(response).unwrap_or_else(|e| {
        let fallback = Response::failure(format!("Failed to serialize response: {:?}", e));
        serde_wasm_bindgen::to_value(&fallback).unwrap_or_else(|_| JsValue::from_str("{\"success\":false}"))
    })
}

// Re-export URL canonicalization for the new-tab page
#[wasm_bindgen]
pub fn canonicalize_url(url: &str) -> String {
    classifier::canonicalize(url)
}

/// Browser tab/window primitives used by the organizer
use std::time::Duration;

use wasm_bindgen::prelude::*;

use crate::tab_data::{TabId, TabInfo, WindowId, WindowInfo, WindowState};

/// The asynchronous tab and window calls the organizer drives
///
/// Every call may fail independently; implementations report failures as
/// readable messages and never panic.
#[allow(async_fn_in_trait)]
pub trait TabApi {
    /// All open tabs across all windows
    async fn query_tabs(&self) -> Result<Vec<TabInfo>, String>;

    async fn query_windows(&self) -> Result<Vec<WindowInfo>, String>;

    /// The window the current request originated from
    async fn current_window(&self) -> Result<WindowId, String>;

    async fn move_tab(&self, tab_id: TabId, window_id: WindowId, index: usize) -> Result<(), String>;

    /// Open a new window containing `seed_tab`, returning its id
    async fn create_window(&self, seed_tab: TabId) -> Result<WindowId, String>;

    async fn set_window_state(&self, window_id: WindowId, state: WindowState) -> Result<(), String>;

    async fn close_window(&self, window_id: WindowId) -> Result<(), String>;

    async fn close_tab(&self, tab_id: TabId) -> Result<(), String>;

    /// Wait before the next dependent call
    async fn pause(&self, delay: Duration);

    /// Resolves once `after` has elapsed; bounds how long any other call may take
    async fn expire(&self, after: Duration);
}

// Import JS bridge functions
#[wasm_bindgen(module = "/tab_api.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryAllTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryAllWindows() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getCurrentWindowId() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn moveTab(tab_id: i32, window_id: i32, index: u32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createWindow(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setWindowState(window_id: i32, state: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn closeWindow(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn closeTab(tab_id: i32) -> Result<JsValue, JsValue>;

    async fn sleep(ms: u32) -> JsValue;
}

/// `TabApi` backed by the extension's `chrome.tabs` / `chrome.windows`
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeTabs;

fn window_state_name(state: WindowState) -> &'static str {
    match state {
        WindowState::Normal => "normal",
        WindowState::Minimized => "minimized",
        WindowState::Maximized => "maximized",
        WindowState::Fullscreen => "fullscreen",
        WindowState::LockedFullscreen => "locked-fullscreen",
    }
}

fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

fn parse_window_id(value: JsValue) -> Result<WindowId, String> {
    value
        .as_f64()
        .map(|id| id as WindowId)
        .ok_or_else(|| format!("Expected a window id, got {:?}", value))
}

impl TabApi for ChromeTabs {
    async fn query_tabs(&self) -> Result<Vec<TabInfo>, String> {
        let tabs_js = queryAllTabs()
            .await
            .map_err(|e| format!("Failed to get tabs: {:?}", e))?;
        serde_wasm_bindgen::from_value(tabs_js).map_err(|e| format!("Failed to parse tabs: {:?}", e))
    }

    async fn query_windows(&self) -> Result<Vec<WindowInfo>, String> {
        let windows_js = queryAllWindows()
            .await
            .map_err(|e| format!("Failed to get windows: {:?}", e))?;
        serde_wasm_bindgen::from_value(windows_js).map_err(|e| format!("Failed to parse windows: {:?}", e))
    }

    async fn current_window(&self) -> Result<WindowId, String> {
        let id = getCurrentWindowId()
            .await
            .map_err(|e| format!("Failed to get current window: {:?}", e))?;
        parse_window_id(id)
    }

    async fn move_tab(&self, tab_id: TabId, window_id: WindowId, index: usize) -> Result<(), String> {
        let index = u32::try_from(index).map_err(|_| format!("Tab index {} out of range", index))?;
        moveTab(tab_id, window_id, index)
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to move tab {}: {:?}", tab_id, e))
    }

    async fn create_window(&self, seed_tab: TabId) -> Result<WindowId, String> {
        let id = createWindow(seed_tab)
            .await
            .map_err(|e| format!("Failed to create window: {:?}", e))?;
        parse_window_id(id)
    }

    async fn set_window_state(&self, window_id: WindowId, state: WindowState) -> Result<(), String> {
        setWindowState(window_id, window_state_name(state))
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to update window {}: {:?}", window_id, e))
    }

    async fn close_window(&self, window_id: WindowId) -> Result<(), String> {
        closeWindow(window_id)
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to close window {}: {:?}", window_id, e))
    }

    async fn close_tab(&self, tab_id: TabId) -> Result<(), String> {
        closeTab(tab_id)
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to close tab {}: {:?}", tab_id, e))
    }

    async fn pause(&self, delay: Duration) {
        let _ = sleep(millis(delay)).await;
    }

    async fn expire(&self, after: Duration) {
        let _ = sleep(millis(after)).await;
    }
}

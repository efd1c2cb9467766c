/// Data structures for tabs and windows as reported by the browser
use serde::{Deserialize, Serialize};

pub type TabId = i32;
pub type WindowId = i32;

/// Information about a browser tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub audible: bool,
    pub window_id: WindowId,
    pub index: i32,
}

impl TabInfo {
    pub fn new(id: TabId, url: Option<String>, audible: bool, window_id: WindowId, index: i32) -> TabInfo {
        TabInfo {
            id,
            url,
            audible,
            window_id,
            index,
        }
    }

    /// The tab's URL, or "" for a blank tab
    pub fn url_str(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowState {
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
    LockedFullscreen,
}

/// A browser window and the tabs it currently holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    pub id: WindowId,
    pub state: WindowState,
    #[serde(default)]
    pub tab_ids: Vec<TabId>,
}

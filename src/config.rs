/// Organizer configuration, supplied by the extension at startup
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Substrings that pull a tab to the front, highest priority first
pub const DEFAULT_MEGA_PRIORITY: [&str; 10] = [
    "mail.google.com",
    "calendar.google.com",
    "docs.google.com",
    "maps.google.com",
    "www.google.com/maps",
    "photos.google.com",
    "chatgpt.com",
    "claude.ai",
    "ebay.com",
    "youtube.com",
];

pub const DEFAULT_SETTLE_DELAY_MS: u64 = 10;

pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;

pub const DEFAULT_EXTRACT_DOMAINS: [&str; 1] = ["chordify.net"];

pub fn default_mega_priority() -> Vec<String> {
    DEFAULT_MEGA_PRIORITY.iter().map(|s| s.to_string()).collect()
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

fn default_call_timeout_ms() -> u64 {
    DEFAULT_CALL_TIMEOUT_MS
}

fn default_extract_domains() -> Vec<String> {
    DEFAULT_EXTRACT_DOMAINS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerConfig {
    #[serde(default = "default_mega_priority")]
    pub mega_priority: Vec<String>,
    /// Pause after each tab move so the browser can catch up; 0 disables it
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Longest a single browser call may take before it counts as failed; 0 waits forever
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    /// Domains pulled out by the single-vendor extraction
    #[serde(default = "default_extract_domains")]
    pub extract_domains: Vec<String>,
}

impl OrganizerConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn from_json(json: &str) -> Result<OrganizerConfig, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse config: {}", e))
    }
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        OrganizerConfig {
            mega_priority: default_mega_priority(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            extract_domains: default_extract_domains(),
        }
    }
}

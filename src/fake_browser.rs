/// In-memory browser for organizer tests
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::time::Duration;

use crate::browser::TabApi;
use crate::tab_data::{TabId, TabInfo, WindowId, WindowInfo, WindowState};

#[derive(Debug, Clone)]
struct FakeWindow {
    id: WindowId,
    state: WindowState,
    tabs: Vec<TabInfo>,
}

/// Windows never close on their own when emptied, so sweeping is observable
#[derive(Debug, Default)]
pub struct FakeBrowser {
    current: WindowId,
    windows: RefCell<Vec<FakeWindow>>,
    failing_moves: RefCell<HashSet<TabId>>,
    failing_closes: RefCell<HashSet<TabId>>,
    failing_window_closes: RefCell<HashSet<WindowId>>,
    hanging_moves: RefCell<HashSet<TabId>>,
    fail_queries: Cell<bool>,
    fail_window_query: Cell<bool>,
    hang_queries: Cell<bool>,
    fail_minimize: Cell<bool>,
    fail_create: Cell<bool>,
    closed_tabs: RefCell<Vec<TabId>>,
    pauses: Cell<usize>,
}

impl FakeBrowser {
    pub fn new(current: WindowId) -> Self {
        FakeBrowser {
            current,
            ..FakeBrowser::default()
        }
    }

    pub fn with_window(self, id: WindowId, tabs: &[(TabId, &str, bool)]) -> Self {
        let tabs = tabs
            .iter()
            .enumerate()
            .map(|(index, (tab_id, url, audible))| {
                let url = if url.is_empty() { None } else { Some(url.to_string()) };
                TabInfo::new(*tab_id, url, *audible, id, index as i32)
            })
            .collect();
        self.windows.borrow_mut().push(FakeWindow {
            id,
            state: WindowState::Normal,
            tabs,
        });
        self
    }

    pub fn fail_move(&self, tab_id: TabId) {
        self.failing_moves.borrow_mut().insert(tab_id);
    }

    pub fn fail_close_tab(&self, tab_id: TabId) {
        self.failing_closes.borrow_mut().insert(tab_id);
    }

    pub fn fail_close_window(&self, window_id: WindowId) {
        self.failing_window_closes.borrow_mut().insert(window_id);
    }

    /// The move never settles
    pub fn hang_move(&self, tab_id: TabId) {
        self.hanging_moves.borrow_mut().insert(tab_id);
    }

    pub fn hang_queries(&self) {
        self.hang_queries.set(true);
    }

    pub fn fail_window_query(&self) {
        self.fail_window_query.set(true);
    }

    pub fn fail_queries(&self) {
        self.fail_queries.set(true);
    }

    pub fn fail_minimize(&self) {
        self.fail_minimize.set(true);
    }

    pub fn fail_create_window(&self) {
        self.fail_create.set(true);
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.borrow().iter().map(|w| w.id).collect()
    }

    pub fn tab_ids_in(&self, window_id: WindowId) -> Vec<TabId> {
        self.windows
            .borrow()
            .iter()
            .find(|w| w.id == window_id)
            .map(|w| w.tabs.iter().map(|t| t.id).collect())
            .unwrap_or_default()
    }

    pub fn state_of(&self, window_id: WindowId) -> Option<WindowState> {
        self.windows.borrow().iter().find(|w| w.id == window_id).map(|w| w.state)
    }

    pub fn closed_tabs(&self) -> Vec<TabId> {
        self.closed_tabs.borrow().clone()
    }

    pub fn pause_count(&self) -> usize {
        self.pauses.get()
    }

    fn take_tab(&self, tab_id: TabId) -> Result<TabInfo, String> {
        let mut windows = self.windows.borrow_mut();
        for window in windows.iter_mut() {
            if let Some(pos) = window.tabs.iter().position(|t| t.id == tab_id) {
                return Ok(window.tabs.remove(pos));
            }
        }
        Err(format!("No tab with id {}", tab_id))
    }

    fn next_window_id(&self) -> WindowId {
        self.windows.borrow().iter().map(|w| w.id).max().unwrap_or(0) + 1
    }
}

impl TabApi for FakeBrowser {
    async fn query_tabs(&self) -> Result<Vec<TabInfo>, String> {
        if self.hang_queries.get() {
            std::future::pending::<()>().await;
        }
        if self.fail_queries.get() {
            return Err("tabs query failed".to_string());
        }
        let windows = self.windows.borrow();
        let tabs = windows
            .iter()
            .flat_map(|w| {
                w.tabs.iter().enumerate().map(move |(index, tab)| TabInfo {
                    window_id: w.id,
                    index: index as i32,
                    ..tab.clone()
                })
            })
            .collect();
        Ok(tabs)
    }

    async fn query_windows(&self) -> Result<Vec<WindowInfo>, String> {
        if self.fail_queries.get() || self.fail_window_query.get() {
            return Err("windows query failed".to_string());
        }
        let windows = self.windows.borrow();
        Ok(windows
            .iter()
            .map(|w| WindowInfo {
                id: w.id,
                state: w.state,
                tab_ids: w.tabs.iter().map(|t| t.id).collect(),
            })
            .collect())
    }

    async fn current_window(&self) -> Result<WindowId, String> {
        Ok(self.current)
    }

    async fn move_tab(&self, tab_id: TabId, window_id: WindowId, index: usize) -> Result<(), String> {
        if self.hanging_moves.borrow().contains(&tab_id) {
            std::future::pending::<()>().await;
        }
        if self.failing_moves.borrow().contains(&tab_id) {
            return Err(format!("move of tab {} rejected", tab_id));
        }
        if !self.window_ids().contains(&window_id) {
            return Err(format!("No window with id {}", window_id));
        }
        let tab = self.take_tab(tab_id)?;
        let mut windows = self.windows.borrow_mut();
        if let Some(window) = windows.iter_mut().find(|w| w.id == window_id) {
            let index = index.min(window.tabs.len());
            window.tabs.insert(index, tab);
        }
        Ok(())
    }

    async fn create_window(&self, seed_tab: TabId) -> Result<WindowId, String> {
        if self.fail_create.get() {
            return Err("window creation failed".to_string());
        }
        let id = self.next_window_id();
        let tab = self.take_tab(seed_tab)?;
        self.windows.borrow_mut().push(FakeWindow {
            id,
            state: WindowState::Normal,
            tabs: vec![tab],
        });
        Ok(id)
    }

    async fn set_window_state(&self, window_id: WindowId, state: WindowState) -> Result<(), String> {
        if self.fail_minimize.get() && state == WindowState::Minimized {
            return Err(format!("window {} refused to minimize", window_id));
        }
        let mut windows = self.windows.borrow_mut();
        let window = windows
            .iter_mut()
            .find(|w| w.id == window_id)
            .ok_or_else(|| format!("No window with id {}", window_id))?;
        window.state = state;
        Ok(())
    }

    async fn close_window(&self, window_id: WindowId) -> Result<(), String> {
        if self.failing_window_closes.borrow().contains(&window_id) {
            return Err(format!("window {} could not be closed", window_id));
        }
        let mut windows = self.windows.borrow_mut();
        let before = windows.len();
        windows.retain(|w| w.id != window_id);
        if windows.len() == before {
            return Err(format!("No window with id {}", window_id));
        }
        Ok(())
    }

    async fn close_tab(&self, tab_id: TabId) -> Result<(), String> {
        if self.failing_closes.borrow().contains(&tab_id) {
            return Err(format!("tab {} could not be closed", tab_id));
        }
        self.take_tab(tab_id)?;
        self.closed_tabs.borrow_mut().push(tab_id);
        Ok(())
    }

    async fn pause(&self, _delay: Duration) {
        self.pauses.set(self.pauses.get() + 1);
    }

    /// Every deadline has already passed; only calls that never settle lose the race
    async fn expire(&self, _after: Duration) {}
}

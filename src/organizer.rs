/// Window organizer: realizes the sorted, deduplicated tab layout
///
/// Every pipeline has a fatal prefix (querying tabs and the current window)
/// followed by a plan of independent browser calls. Calls in the plan never
/// abort the run; each one leaves a `StepOutcome` behind instead.
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures_util::future::{Either, select};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::browser::TabApi;
use crate::classifier::{is_entertainment, matches_domain};
use crate::config::OrganizerConfig;
use crate::operations::{deduplicate, sort_tabs};
use crate::tab_data::{TabInfo, WindowId, WindowState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CloseDuplicate,
    MoveTab,
    CreateWindow,
    MinimizeWindow,
    QueryWindows,
    CloseWindow,
}

/// Result of one browser call made while carrying out a plan
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub step: Step,
    /// Tab or window id the call acted on
    pub target: i32,
    pub result: Result<(), String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizeReport {
    /// Tabs left open after deduplication
    pub tab_count: usize,
    pub duplicates_closed: usize,
    pub regular_count: usize,
    pub entertainment_count: usize,
    pub entertainment_window: Option<WindowId>,
    pub outcomes: Vec<StepOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupReport {
    pub tab_count: usize,
    pub duplicates_closed: usize,
    pub window_id: Option<WindowId>,
    pub outcomes: Vec<StepOutcome>,
}

fn count_failures(outcomes: &[StepOutcome]) -> usize {
    outcomes.iter().filter(|o| o.result.is_err()).count()
}

impl OrganizeReport {
    pub fn failed_steps(&self) -> usize {
        count_failures(&self.outcomes)
    }
}

impl GroupReport {
    pub fn failed_steps(&self) -> usize {
        count_failures(&self.outcomes)
    }
}

/// Store an outcome, logging failures; returns whether the call succeeded
fn record(outcomes: &mut Vec<StepOutcome>, step: Step, target: i32, result: Result<(), String>) -> bool {
    let ok = result.is_ok();
    if let Err(e) = &result {
        warn!("{:?} on {} failed: {}", step, target, e);
    }
    outcomes.push(StepOutcome { step, target, result });
    ok
}

/// Clears the in-flight flag when an operation ends, however it ends
pub(crate) struct FlightGuard<'a> {
    flag: &'a Cell<bool>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

pub struct Organizer<A: TabApi> {
    api: A,
    config: RefCell<OrganizerConfig>,
    in_flight: Cell<bool>,
}

impl<A: TabApi> Organizer<A> {
    pub fn new(api: A, config: OrganizerConfig) -> Self {
        Organizer {
            api,
            config: RefCell::new(config),
            in_flight: Cell::new(false),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> OrganizerConfig {
        self.config.borrow().clone()
    }

    /// Replace the configuration; a running operation keeps the one it started with
    pub fn set_config(&self, config: OrganizerConfig) {
        *self.config.borrow_mut() = config;
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }

    /// Claim the organizer for one operation, rejecting overlapping calls
    pub(crate) fn begin(&self) -> Result<FlightGuard<'_>, String> {
        if self.in_flight.replace(true) {
            return Err("another tab operation is already in progress".to_string());
        }
        Ok(FlightGuard {
            flag: &self.in_flight,
        })
    }

    /// Run one browser call, failing it if it has not settled within the call timeout
    async fn bounded<T, F>(&self, limit: Duration, what: &str, call: F) -> Result<T, String>
    where
        F: Future<Output = Result<T, String>>,
    {
        if limit.is_zero() {
            return call.await;
        }

        match select(pin!(call), pin!(self.api.expire(limit))).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => Err(format!("{} timed out after {}ms", what, limit.as_millis())),
        }
    }

    /// Full sort: dedupe every tab, sort regular tabs into the requesting
    /// window and entertainment tabs into a new minimized window, then close
    /// any window left empty.
    ///
    /// `origin_window` is the window the request came from; when unknown the
    /// browser's current window is used.
    pub async fn organize<S: AsRef<str>>(
        &self,
        entertainment_domains: &[S],
        origin_window: Option<WindowId>,
    ) -> Result<OrganizeReport, String> {
        let _guard = self.begin()?;
        let config = self.config();
        let timeout = config.call_timeout();
        let run_id = Uuid::new_v4();

        let tabs = self.bounded(timeout, "tab query", self.api.query_tabs()).await?;
        let main_window = match origin_window {
            Some(id) => id,
            None => self.bounded(timeout, "current window query", self.api.current_window()).await?,
        };
        info!("[{}] organizing {} tabs into window {}", run_id, tabs.len(), main_window);

        let mut outcomes = Vec::new();
        let deduped = deduplicate(&tabs);
        let duplicates_closed = self.close_duplicates(&deduped.duplicates, &config, &mut outcomes).await;

        let (entertainment, regular): (Vec<TabInfo>, Vec<TabInfo>) = deduped
            .keep
            .into_iter()
            .partition(|tab| is_entertainment(tab.url_str(), entertainment_domains));
        let regular = sort_tabs(&regular, &config.mega_priority);
        let entertainment = sort_tabs(&entertainment, &config.mega_priority);

        for (index, tab) in regular.iter().enumerate() {
            self.move_and_settle(tab, main_window, index, &config, &mut outcomes).await;
        }

        let entertainment_window = if entertainment.is_empty() {
            None
        } else {
            self.gather_into_new_window(&entertainment, true, &config, &mut outcomes).await
        };

        self.close_empty_windows(main_window, entertainment_window, &config, &mut outcomes).await;

        let report = OrganizeReport {
            tab_count: regular.len() + entertainment.len(),
            duplicates_closed,
            regular_count: regular.len(),
            entertainment_count: entertainment.len(),
            entertainment_window,
            outcomes,
        };
        info!(
            "[{}] organize complete: {} tabs, {} duplicates closed, {} failed steps",
            run_id,
            report.tab_count,
            report.duplicates_closed,
            report.failed_steps()
        );
        Ok(report)
    }

    /// Pull every tab accepted by `matches` (given the tab URL) into a fresh window
    pub async fn extract_domain_group<F>(&self, matches: F) -> Result<GroupReport, String>
    where
        F: Fn(&str) -> bool,
    {
        let _guard = self.begin()?;
        self.group_into_window(matches, false).await
    }

    /// Extract the domains named in the configuration (chordify.net by default)
    pub async fn extract_configured_group(&self) -> Result<GroupReport, String> {
        let domains = self.config().extract_domains;
        self.extract_domain_group(|url| matches_domain(url, &domains)).await
    }

    /// Move only the entertainment tabs into a new minimized window
    pub async fn move_entertainment<S: AsRef<str>>(&self, domains: &[S]) -> Result<GroupReport, String> {
        let _guard = self.begin()?;
        self.group_into_window(|url| is_entertainment(url, domains), true).await
    }

    async fn group_into_window<F>(&self, matches: F, minimize: bool) -> Result<GroupReport, String>
    where
        F: Fn(&str) -> bool,
    {
        let config = self.config();
        let run_id = Uuid::new_v4();

        let tabs = self.bounded(config.call_timeout(), "tab query", self.api.query_tabs()).await?;
        let matching: Vec<TabInfo> = tabs.into_iter().filter(|tab| matches(tab.url_str())).collect();
        if matching.is_empty() {
            info!("[{}] no matching tabs, nothing to move", run_id);
            return Ok(GroupReport::default());
        }
        info!("[{}] grouping {} matching tabs", run_id, matching.len());

        let mut outcomes = Vec::new();
        let deduped = deduplicate(&matching);
        let duplicates_closed = self.close_duplicates(&deduped.duplicates, &config, &mut outcomes).await;
        let sorted = sort_tabs(&deduped.keep, &config.mega_priority);

        let window_id = self.gather_into_new_window(&sorted, minimize, &config, &mut outcomes).await;

        let report = GroupReport {
            tab_count: sorted.len(),
            duplicates_closed,
            window_id,
            outcomes,
        };
        info!(
            "[{}] group complete: {} tabs, {} duplicates closed, {} failed steps",
            run_id,
            report.tab_count,
            report.duplicates_closed,
            report.failed_steps()
        );
        Ok(report)
    }

    /// Close each duplicate; returns how many actually closed
    async fn close_duplicates(
        &self,
        duplicates: &[TabInfo],
        config: &OrganizerConfig,
        outcomes: &mut Vec<StepOutcome>,
    ) -> usize {
        let mut closed = 0;
        for tab in duplicates {
            debug!("closing duplicate tab {} ({})", tab.id, tab.url_str());
            let result = self.bounded(config.call_timeout(), "tab close", self.api.close_tab(tab.id)).await;
            if record(outcomes, Step::CloseDuplicate, tab.id, result) {
                closed += 1;
            }
        }
        closed
    }

    async fn move_and_settle(
        &self,
        tab: &TabInfo,
        window_id: WindowId,
        index: usize,
        config: &OrganizerConfig,
        outcomes: &mut Vec<StepOutcome>,
    ) {
        let result = self
            .bounded(config.call_timeout(), "tab move", self.api.move_tab(tab.id, window_id, index))
            .await;
        record(outcomes, Step::MoveTab, tab.id, result);
        if config.settle_delay_ms > 0 {
            self.api.pause(config.settle_delay()).await;
        }
    }

    /// Open a window seeded with the first tab and append the rest in order
    ///
    /// Returns None when the window could not be created; the tabs then stay
    /// where they are.
    async fn gather_into_new_window(
        &self,
        tabs: &[TabInfo],
        minimize: bool,
        config: &OrganizerConfig,
        outcomes: &mut Vec<StepOutcome>,
    ) -> Option<WindowId> {
        let (seed, rest) = tabs.split_first()?;

        let created = self
            .bounded(config.call_timeout(), "window creation", self.api.create_window(seed.id))
            .await;
        let window_id = match created {
            Ok(id) => {
                record(outcomes, Step::CreateWindow, seed.id, Ok(()));
                id
            }
            Err(e) => {
                record(outcomes, Step::CreateWindow, seed.id, Err(e));
                return None;
            }
        };

        for (offset, tab) in rest.iter().enumerate() {
            self.move_and_settle(tab, window_id, offset + 1, config, outcomes).await;
        }

        if minimize {
            let result = self
                .bounded(
                    config.call_timeout(),
                    "window minimize",
                    self.api.set_window_state(window_id, WindowState::Minimized),
                )
                .await;
            record(outcomes, Step::MinimizeWindow, window_id, result);
        }

        Some(window_id)
    }

    /// Close windows emptied by the moves, other than the two we filled
    async fn close_empty_windows(
        &self,
        main_window: WindowId,
        entertainment_window: Option<WindowId>,
        config: &OrganizerConfig,
        outcomes: &mut Vec<StepOutcome>,
    ) {
        let queried = self
            .bounded(config.call_timeout(), "window query", self.api.query_windows())
            .await;
        let windows = match queried {
            Ok(windows) => windows,
            Err(e) => {
                record(outcomes, Step::QueryWindows, main_window, Err(e));
                return;
            }
        };

        for window in windows {
            if window.id == main_window || Some(window.id) == entertainment_window || !window.tab_ids.is_empty() {
                continue;
            }
            debug!("closing empty window {}", window.id);
            let result = self
                .bounded(config.call_timeout(), "window close", self.api.close_window(window.id))
                .await;
            record(outcomes, Step::CloseWindow, window.id, result);
        }
    }
}

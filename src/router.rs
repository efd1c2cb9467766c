/// Message routing between the new-tab page and the organizer
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::browser::TabApi;
use crate::organizer::{GroupReport, OrganizeReport, Organizer};
use crate::tab_data::WindowId;

/// A request sent over `runtime.sendMessage`, tagged by its `action` field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action")]
pub enum Request {
    #[serde(rename = "sortTabs")]
    SortTabs {
        #[serde(default, rename = "entertainmentDomains")]
        entertainment_domains: Vec<String>,
        /// Window of the page that sent the request, when known
        #[serde(default, rename = "windowId")]
        window_id: Option<WindowId>,
    },
    #[serde(rename = "extractChordify")]
    ExtractChordify,
    #[serde(rename = "moveEntertainment")]
    MoveEntertainment {
        #[serde(default, rename = "entertainmentDomains")]
        entertainment_domains: Vec<String>,
    },
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::SortTabs { .. } => "sortTabs",
            Request::ExtractChordify => "extractChordify",
            Request::MoveEntertainment { .. } => "moveEntertainment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSummary {
    pub success: bool,
    pub tab_count: usize,
    pub duplicates_closed: usize,
    pub regular_count: usize,
    pub entertainment_count: usize,
    pub failed_steps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub success: bool,
    pub tab_count: usize,
    pub duplicates_closed: usize,
    pub failed_steps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub success: bool,
    pub error: String,
}

/// The single reply sent back for every request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Sorted(SortSummary),
    Grouped(GroupSummary),
    Failed(Failure),
}

impl Response {
    pub fn failure(error: impl Into<String>) -> Response {
        Response::Failed(Failure {
            success: false,
            error: error.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        match self {
            Response::Sorted(summary) => summary.success,
            Response::Grouped(summary) => summary.success,
            Response::Failed(_) => false,
        }
    }
}

impl From<OrganizeReport> for Response {
    fn from(report: OrganizeReport) -> Self {
        Response::Sorted(SortSummary {
            success: true,
            tab_count: report.tab_count,
            duplicates_closed: report.duplicates_closed,
            regular_count: report.regular_count,
            entertainment_count: report.entertainment_count,
            failed_steps: report.failed_steps(),
        })
    }
}

impl From<GroupReport> for Response {
    fn from(report: GroupReport) -> Self {
        Response::Grouped(GroupSummary {
            success: true,
            tab_count: report.tab_count,
            duplicates_closed: report.duplicates_closed,
            failed_steps: report.failed_steps(),
        })
    }
}

pub struct Router<A: TabApi> {
    organizer: Organizer<A>,
}

impl<A: TabApi> Router<A> {
    pub fn new(organizer: Organizer<A>) -> Self {
        Router { organizer }
    }

    pub fn organizer(&self) -> &Organizer<A> {
        &self.organizer
    }

    /// Parse a raw message and dispatch it; malformed messages still get a reply
    pub async fn handle_value(&self, message: serde_json::Value) -> Response {
        match serde_json::from_value::<Request>(message) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!("Rejected message: {}", e);
                Response::failure(format!("Invalid request: {}", e))
            }
        }
    }

    pub async fn handle(&self, request: Request) -> Response {
        let action = request.action();
        info!("Handling {} request", action);

        let response = match request {
            Request::SortTabs {
                entertainment_domains,
                window_id,
            } => self
                .organizer
                .organize(&entertainment_domains, window_id)
                .await
                .map(Response::from),
            Request::ExtractChordify => self.organizer.extract_configured_group().await.map(Response::from),
            Request::MoveEntertainment { entertainment_domains } => self
                .organizer
                .move_entertainment(&entertainment_domains)
                .await
                .map(Response::from),
        };

        response.unwrap_or_else(|e| {
            warn!("{} failed: {}", action, e);
            Response::failure(e)
        })
    }
}

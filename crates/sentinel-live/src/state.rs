//! Dashboard view state and its transitions.

use sentinel_core::{DashboardStats, FeedbackRecord, FilterSpec, TrendEntry, trends, view};
use tracing::{info, warn};

pub const LOADED_NOTICE: &str = "Dashboard loaded successfully";
pub const REFRESHED_NOTICE: &str = "Dashboard refreshed";

/// Data availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    /// The initial load failed. Terminal: nothing moves the view out of it.
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message for the user (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything the dashboard shows.
///
/// `visible`, `trends` and `stats` are derived from `records` and `filter`
/// and recomputed on every change while [`Phase::Ready`].
#[derive(Debug, Clone)]
pub struct ViewState {
    pub phase: Phase,
    pub records: Vec<FeedbackRecord>,
    pub filter: FilterSpec,
    pub selected: Option<String>,
    pub visible: Vec<FeedbackRecord>,
    pub trends: Vec<TrendEntry>,
    pub stats: DashboardStats,
    pub notice: Option<Notice>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            phase: Phase::Loading,
            records: Vec::new(),
            filter: FilterSpec::default(),
            selected: None,
            visible: Vec::new(),
            trends: Vec::new(),
            stats: DashboardStats::default(),
            notice: None,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Error(_))
    }

    /// Apply the outcome of a full fetch.
    ///
    /// A failed first load is fatal. A failed refresh keeps the records
    /// already shown and only raises a notice.
    pub fn apply_fetch(&mut self, result: Result<Vec<FeedbackRecord>, String>) {
        if self.is_terminal() {
            return;
        }
        let first_load = self.phase == Phase::Loading;

        match result {
            Ok(records) => {
                info!(count = records.len(), first_load, "dashboard records fetched");
                self.phase = Phase::Ready;
                self.records = records;
                self.notice = Some(Notice::info(if first_load {
                    LOADED_NOTICE
                } else {
                    REFRESHED_NOTICE
                }));
                self.recompute();
            }
            Err(message) if first_load => {
                warn!(error = %message, "initial load failed");
                self.notice = Some(Notice::error(format!("Failed to load feedback: {message}")));
                self.phase = Phase::Error(message);
            }
            Err(message) => {
                warn!(error = %message, "refresh failed, keeping previous records");
                self.notice = Some(Notice::error(format!(
                    "Failed to refresh feedback: {message}"
                )));
            }
        }
    }

    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
        self.recompute();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.recompute();
    }

    /// Focus a record by id, or clear the focus with `None`. Unknown ids
    /// clear it too.
    pub fn select(&mut self, id: Option<String>) {
        self.selected = id.filter(|id| self.records.iter().any(|r| &r.id == id));
    }

    pub fn selected_record(&self) -> Option<&FeedbackRecord> {
        let id = self.selected.as_deref()?;
        self.records.iter().find(|r| r.id == id)
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn recompute(&mut self) {
        if !self.is_ready() {
            return;
        }
        self.visible = view(&self.records, &self.filter);
        self.trends = trends(&self.records);
        self.stats = DashboardStats::compute(&self.records);
    }
}

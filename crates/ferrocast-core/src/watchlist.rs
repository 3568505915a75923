//! Watchlist synchronizer.
//!
//! The current [`Watchlist`] lives in a `tokio::sync::watch` channel and is
//! the single source of truth for the watchlist view. Every mutation re-reads
//! the list from the server and publishes it; the dependent overview is then
//! reconciled from the published value alone:
//!
//! ```text
//! add/remove ──▶ gateway ──▶ GET /watchlist ──▶ publish ──▶ reconcile
//!                                                              │
//!                          membership changed, non-empty ──────┼──▶ GET /watchlist/overview
//!                          membership changed, empty ──────────┴──▶ clear locally
//! ```
//!
//! Publishing compares by value, so re-publishing an identical list never
//! refetches the overview unless the table failed or was dismissed. Each list
//! refetch carries a ticket; a list older than the last one published is
//! dropped. Overview fetches for a superseded list are discarded by the
//! [`ViewStateContainer`] token rule.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::view_state::{ViewState, ViewStateContainer};
use crate::{ForecastService, GatewayError, OverviewTable, Symbol, Watchlist};

const ADD_FAILED: &str = "Failed to add symbol. It might be invalid or network error.";
const REMOVE_FAILED: &str = "Failed to remove symbol.";
const LOAD_FAILED: &str = "Failed to load watchlist.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A user-facing message posted by a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Pending notices, drained by the presentation layer.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, notice: Notice) {
        self.lock().push(notice);
    }

    /// Removes and returns every pending notice, oldest first.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notice>> {
        self.notices
            .lock()
            .expect("notice board lock is not poisoned")
    }
}

fn failure_message(base: &str, error: &GatewayError) -> String {
    match error.detail() {
        Some(detail) => format!("{base} ({detail})"),
        None => base.to_owned(),
    }
}

#[derive(Debug)]
struct SyncCursor {
    receiver: watch::Receiver<Watchlist>,
    /// Membership the overview was last reconciled against.
    reconciled: Option<Watchlist>,
}

/// Ordering of list refetches: tickets issued and the newest one published.
#[derive(Debug, Default)]
struct ListSequence {
    issued: u64,
    published: u64,
}

/// Keeps the watchlist and its overview table consistent with the server.
pub struct WatchlistSynchronizer {
    gateway: Arc<dyn ForecastService>,
    list: watch::Sender<Watchlist>,
    sequence: Mutex<ListSequence>,
    cursor: Mutex<SyncCursor>,
    overview: ViewStateContainer<OverviewTable>,
    notices: NoticeBoard,
}

impl WatchlistSynchronizer {
    pub fn new(gateway: Arc<dyn ForecastService>) -> Self {
        let (list, receiver) = watch::channel(Watchlist::new());
        Self {
            gateway,
            list,
            sequence: Mutex::new(ListSequence::default()),
            cursor: Mutex::new(SyncCursor {
                receiver,
                reconciled: None,
            }),
            overview: ViewStateContainer::new("watchlist_overview"),
            notices: NoticeBoard::new(),
        }
    }

    /// Loads the list once. On failure the list degrades to empty and a
    /// warning notice is posted; the error is still returned.
    pub async fn initialize(&self) -> Result<(), GatewayError> {
        let ticket = self.issue_ticket();
        match self.gateway.watchlist().await {
            Ok(list) => {
                if self.publish(ticket, list) {
                    self.reconcile().await;
                }
                Ok(())
            }
            Err(error) => {
                warn!(%error, "watchlist unavailable, showing empty list");
                self.notices
                    .post(Notice::warning(failure_message(LOAD_FAILED, &error)));
                if self.publish(ticket, Watchlist::new()) {
                    self.reconcile().await;
                }
                Err(error)
            }
        }
    }

    /// Adds `raw` on the server, then re-reads the list.
    ///
    /// Invalid input is rejected before any request. On failure the list is
    /// left unchanged and an error notice is posted.
    pub async fn add(&self, raw: &str) -> Result<(), GatewayError> {
        let symbol = self.parse_input(raw)?;

        if let Err(error) = self.gateway.add_to_watchlist(&symbol).await {
            warn!(%symbol, %error, "watchlist add rejected");
            self.notices
                .post(Notice::error(failure_message(ADD_FAILED, &error)));
            return Err(error);
        }

        info!(%symbol, "added symbol to watchlist");
        self.refresh().await
    }

    /// Removes `raw` on the server, then re-reads the list. Removing an
    /// absent symbol succeeds.
    pub async fn remove(&self, raw: &str) -> Result<(), GatewayError> {
        let symbol = self.parse_input(raw)?;

        if let Err(error) = self.gateway.remove_from_watchlist(&symbol).await {
            warn!(%symbol, %error, "watchlist remove rejected");
            self.notices
                .post(Notice::error(failure_message(REMOVE_FAILED, &error)));
            return Err(error);
        }

        info!(%symbol, "removed symbol from watchlist");
        self.refresh().await
    }

    /// Re-reads the list from the server and reconciles the overview. A
    /// failed overview is fetched again even when the list is unchanged.
    pub async fn refresh(&self) -> Result<(), GatewayError> {
        let ticket = self.issue_ticket();
        match self.gateway.watchlist().await {
            Ok(list) => {
                if self.publish(ticket, list) {
                    self.reconcile().await;
                }
                Ok(())
            }
            Err(error) => {
                warn!(%error, "watchlist refetch failed, keeping previous list");
                self.notices
                    .post(Notice::error(failure_message(LOAD_FAILED, &error)));
                Err(error)
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Watchlist> {
        self.list.subscribe()
    }

    pub fn watchlist(&self) -> Watchlist {
        self.list.borrow().clone()
    }

    pub fn overview(&self) -> ViewState<OverviewTable> {
        self.overview.snapshot()
    }

    pub fn dismiss_error(&self) {
        self.overview.dismiss_error();
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    fn parse_input(&self, raw: &str) -> Result<Symbol, GatewayError> {
        Symbol::parse(raw).map_err(|error| {
            self.notices.post(Notice::warning(error.to_string()));
            GatewayError::from(error)
        })
    }

    fn issue_ticket(&self) -> u64 {
        let mut sequence = self.lock_sequence();
        sequence.issued += 1;
        sequence.issued
    }

    /// Stores `list` if it differs from the current value. Returns `false`
    /// when a newer refetch was already published.
    fn publish(&self, ticket: u64, list: Watchlist) -> bool {
        let mut sequence = self.lock_sequence();
        if ticket < sequence.published {
            debug!(
                stale = ticket,
                published = sequence.published,
                "discarding superseded watchlist"
            );
            return false;
        }
        sequence.published = ticket;

        self.list.send_if_modified(|current| {
            if *current == list {
                false
            } else {
                *current = list;
                true
            }
        });
        true
    }

    fn lock_sequence(&self) -> std::sync::MutexGuard<'_, ListSequence> {
        self.sequence
            .lock()
            .expect("watchlist sequence lock is not poisoned")
    }

    /// Brings the overview in line with the latest published list.
    async fn reconcile(&self) {
        let table_missing = self
            .overview
            .with_state(|state| matches!(state, ViewState::Idle | ViewState::Failed(_)));
        let target = {
            let mut cursor = self
                .cursor
                .lock()
                .expect("watchlist cursor lock is not poisoned");
            let changed = cursor.receiver.has_changed().unwrap_or(false);
            if !changed && cursor.reconciled.is_some() && !table_missing {
                return;
            }
            let current = cursor.receiver.borrow_and_update().clone();
            let unchanged = cursor
                .reconciled
                .as_ref()
                .is_some_and(|last| last.same_symbols(&current));
            if unchanged && !table_missing {
                return;
            }
            cursor.reconciled = Some(current.clone());
            current
        };

        if target.is_empty() {
            self.overview.set_ready(OverviewTable::new());
            return;
        }

        self.overview.run(self.gateway.watchlist_overview()).await;
    }
}

//! Per-view fetch state machine.
//!
//! ```text
//! Idle ──begin──▶ Loading ──complete(Ok)──▶ Ready(T)
//!                    ▲    ──complete(Err)─▶ Failed(GatewayError)
//!                    └────────begin──────────┘
//! ```
//!
//! Every [`begin`](ViewStateContainer::begin) issues a new [`RequestToken`].
//! Only the most recent token may complete; results carrying an older token
//! are discarded on arrival, so a slow response can never overwrite state
//! written by a newer trigger. In-flight requests are not aborted.

use std::future::Future;
use std::sync::Mutex;

use tracing::debug;

use crate::GatewayError;

/// Sequence number identifying one trigger of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(GatewayError),
}

impl<T> ViewState<T> {
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GatewayError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub const fn phase(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "error",
        }
    }
}

/// Whether a completed fetch was written to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer trigger superseded this fetch before it resolved.
    Discarded,
}

#[derive(Debug)]
struct ViewInner<T> {
    state: ViewState<T>,
    latest: u64,
}

/// Thread-safe holder of one view's [`ViewState`].
#[derive(Debug)]
pub struct ViewStateContainer<T> {
    name: &'static str,
    inner: Mutex<ViewInner<T>>,
}

impl<T> ViewStateContainer<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(ViewInner {
                state: ViewState::Idle,
                latest: 0,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Starts a new fetch cycle: clears data and error, enters `Loading`, and
    /// supersedes any fetch still in flight.
    pub fn begin(&self) -> RequestToken {
        let mut inner = self.lock();
        inner.latest += 1;
        inner.state = ViewState::Loading;
        RequestToken(inner.latest)
    }

    /// Applies a fetch result if `token` belongs to the latest trigger.
    pub fn complete(&self, token: RequestToken, result: Result<T, GatewayError>) -> Completion {
        let mut inner = self.lock();
        if token.0 != inner.latest {
            debug!(
                view = self.name,
                stale = token.0,
                latest = inner.latest,
                "discarding superseded response"
            );
            return Completion::Discarded;
        }

        inner.state = match result {
            Ok(value) => ViewState::Ready(value),
            Err(error) => ViewState::Failed(error),
        };
        Completion::Applied
    }

    /// `begin`, await `fetch`, then `complete` with the issued token.
    pub async fn run<F>(&self, fetch: F) -> Completion
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        let token = self.begin();
        let result = fetch.await;
        self.complete(token, result)
    }

    /// Local transition to `Ready` without a fetch; supersedes in-flight work.
    pub fn set_ready(&self, value: T) {
        let mut inner = self.lock();
        inner.latest += 1;
        inner.state = ViewState::Ready(value);
    }

    /// Local transition to `Failed`, e.g. for input rejected before sending.
    pub fn fail(&self, error: GatewayError) {
        let mut inner = self.lock();
        inner.latest += 1;
        inner.state = ViewState::Failed(error);
    }

    /// Back to `Idle`; supersedes in-flight work.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.latest += 1;
        inner.state = ViewState::Idle;
    }

    /// Dismisses an error banner. Has no effect in any other state.
    pub fn dismiss_error(&self) {
        let mut inner = self.lock();
        if matches!(inner.state, ViewState::Failed(_)) {
            inner.state = ViewState::Idle;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.lock().state.is_loading()
    }

    /// Sequence number of the most recent trigger.
    pub fn latest_sequence(&self) -> u64 {
        self.lock().latest
    }

    pub fn with_state<R>(&self, read: impl FnOnce(&ViewState<T>) -> R) -> R {
        read(&self.lock().state)
    }

    pub fn error(&self) -> Option<GatewayError> {
        self.lock().state.error().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ViewInner<T>> {
        self.inner
            .lock()
            .expect("view state lock is not poisoned")
    }
}

impl<T: Clone> ViewStateContainer<T> {
    pub fn snapshot(&self) -> ViewState<T> {
        self.lock().state.clone()
    }

    pub fn data(&self) -> Option<T> {
        self.lock().state.data().cloned()
    }
}

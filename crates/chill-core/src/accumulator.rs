//! Result accumulator: the pagination state machine for one active query.
//!
//! ```text
//! Idle ──reset──▶ Loading ──success(next)──▶ LoadedWithMore ──request_next_page──▶ Loading
//!                    │ ──success(no next)──▶ Exhausted
//!                    └──failure───────────▶ Error ──retry──▶ Loading
//! ```
//!
//! The accumulator performs no I/O. Operations that need a fetch hand back a
//! [`FetchTicket`]; the caller runs it and reports the outcome with the same
//! ticket. Tickets carry the generation they were issued under and a
//! per-fetch sequence number. Only the ticket of the single fetch in flight is
//! applied; a completion for a replaced query, or a late or repeated one for an
//! earlier page, is dropped without touching state.

use std::fmt;

use crate::error::ChillError;
use crate::model::{Cursor, PageRequest, ResultItem, ResultPage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    LoadedWithMore,
    Exhausted,
    Error(LoadFailure),
}

impl Status {
    /// Only `LoadedWithMore` accepts a next-page request.
    pub fn can_load_more(&self) -> bool {
        matches!(self, Self::LoadedWithMore)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::LoadedWithMore => "loaded-with-more",
            Self::Exhausted => "exhausted",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A terminal fetch failure, kept as state for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub message: String,
    /// Whether the last error was of a retryable kind (retries ran out).
    pub transient: bool,
}

impl From<&ChillError> for LoadFailure {
    fn from(err: &ChillError) -> Self {
        Self {
            message: err.to_string(),
            transient: err.is_transient(),
        }
    }
}

/// A fetch the caller must run, tagged with the generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    /// Unique per issued fetch, so two tickets for the same query never match.
    pub seq: u64,
    pub request: PageRequest,
}

/// Result of reporting a completion back to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// The ticket is not the fetch in flight; state untouched.
    Stale,
}

/// Full loader state for the active query.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderState {
    pub items: Vec<ResultItem>,
    /// Next request to issue. After a failure it still names the request that failed.
    pub cursor: Option<PageRequest>,
    pub status: Status,
    pub active_query: Option<String>,
}

impl Default for LoaderState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            status: Status::Idle,
            active_query: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ResultAccumulator {
    state: LoaderState,
    generation: u64,
    next_seq: u64,
    in_flight: Option<u64>,
    pages_applied: usize,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.state.items
    }

    pub fn status(&self) -> &Status {
        &self.state.status
    }

    pub fn active_query(&self) -> Option<&str> {
        self.state.active_query.as_deref()
    }

    /// The backend cursor for the next page, if one is pending.
    pub fn cursor(&self) -> Option<&Cursor> {
        self.state.cursor.as_ref().and_then(PageRequest::cursor)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pages_applied(&self) -> usize {
        self.pages_applied
    }

    /// Start over for `query`: drop all items and issue the first-page fetch.
    pub fn reset(&mut self, query: &str) -> FetchTicket {
        self.generation += 1;
        self.pages_applied = 0;
        let request = PageRequest::initial(query);
        self.state = LoaderState {
            items: Vec::new(),
            cursor: Some(request.clone()),
            status: Status::Loading,
            active_query: Some(query.to_string()),
        };
        tracing::info!(query, generation = self.generation, "query reset");
        self.issue(request)
    }

    /// Back to `Idle` with no query. In-flight fetches become stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.pages_applied = 0;
        self.in_flight = None;
        self.state = LoaderState::default();
    }

    fn issue(&mut self, request: PageRequest) -> FetchTicket {
        self.next_seq += 1;
        self.in_flight = Some(self.next_seq);
        FetchTicket {
            generation: self.generation,
            seq: self.next_seq,
            request,
        }
    }

    /// Issue the next-page fetch. No-op unless the status is `LoadedWithMore`.
    pub fn request_next_page(&mut self) -> Option<FetchTicket> {
        if !self.state.status.can_load_more() {
            tracing::trace!(status = %self.state.status, "next page request ignored");
            return None;
        }
        let request = self.state.cursor.clone()?;
        self.state.status = Status::Loading;
        tracing::debug!(%request, "requesting next page");
        Some(self.issue(request))
    }

    /// Re-issue the request that failed. No-op unless the status is `Error`.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        if !matches!(self.state.status, Status::Error(_)) {
            return None;
        }
        let request = self.state.cursor.clone()?;
        self.state.status = Status::Loading;
        tracing::info!(%request, "retrying after error");
        Some(self.issue(request))
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
            && self.in_flight == Some(ticket.seq)
            && self.state.status.is_loading()
    }

    pub fn on_fetch_success(&mut self, ticket: &FetchTicket, page: ResultPage) -> Applied {
        if !self.is_current(ticket) {
            tracing::debug!(request = %ticket.request, "discarding stale page");
            return Applied::Stale;
        }

        self.in_flight = None;
        let added = page.results.len();
        self.state.items.extend(page.results);
        self.pages_applied += 1;
        self.state.cursor = page.next.map(|cursor| PageRequest::Next {
            query: ticket.request.query().to_string(),
            cursor,
        });
        self.state.status = if self.state.cursor.is_some() {
            Status::LoadedWithMore
        } else {
            tracing::info!(
                query = ticket.request.query(),
                total = self.state.items.len(),
                "results exhausted"
            );
            Status::Exhausted
        };
        tracing::debug!(added, total = self.state.items.len(), status = %self.state.status, "page applied");
        Applied::Applied
    }

    pub fn on_fetch_failure(&mut self, ticket: &FetchTicket, err: &ChillError) -> Applied {
        if !self.is_current(ticket) {
            tracing::debug!(request = %ticket.request, error = %err, "discarding stale failure");
            return Applied::Stale;
        }
        tracing::warn!(request = %ticket.request, error = %err, "page fetch failed");
        self.in_flight = None;
        self.state.status = Status::Error(LoadFailure::from(err));
        Applied::Applied
    }
}

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::accumulator::{Applied, FetchTicket, LoadFailure, LoaderState, ResultAccumulator, Status};
use crate::error::Result;
use crate::fetch::{fetch_with_retry, PageFetcher};
use crate::model::{ResultItem, ResultPage};
use crate::retry::RetryPolicy;

/// A finished fetch on its way back to the loader.
struct Completion {
    ticket: FetchTicket,
    result: Result<ResultPage>,
}

/// What happened when a completion was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderEvent {
    PageLoaded { added: usize, status: Status },
    Failed(LoadFailure),
    /// A completion for a replaced query arrived and was dropped.
    Discarded { query: String },
}

/// Drives a [`ResultAccumulator`] against a [`PageFetcher`].
///
/// Each ticket the accumulator issues is run on its own task; completions
/// come back through a channel and are applied one at a time by
/// [`Loader::next_event`] or [`Loader::try_next_event`], so state is only ever
/// touched by the owner of the loader.
pub struct Loader<F> {
    accumulator: ResultAccumulator,
    fetcher: Arc<F>,
    policy: RetryPolicy,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    outstanding: usize,
}

impl<F: PageFetcher + 'static> Loader<F> {
    pub fn new(fetcher: Arc<F>, policy: RetryPolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            accumulator: ResultAccumulator::new(),
            fetcher,
            policy,
            tx,
            rx,
            outstanding: 0,
        }
    }

    pub fn state(&self) -> &LoaderState {
        self.accumulator.state()
    }

    pub fn status(&self) -> &Status {
        self.accumulator.status()
    }

    pub fn items(&self) -> &[ResultItem] {
        self.accumulator.items()
    }

    pub fn active_query(&self) -> Option<&str> {
        self.accumulator.active_query()
    }

    /// Fetches spawned whose completion has not been applied yet,
    /// including stale ones still in flight.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn reset(&mut self, query: &str) {
        let ticket = self.accumulator.reset(query);
        self.spawn(ticket);
    }

    pub fn clear(&mut self) {
        self.accumulator.clear();
    }

    /// Returns `true` when a fetch was issued.
    pub fn request_next_page(&mut self) -> bool {
        match self.accumulator.request_next_page() {
            Some(ticket) => {
                self.spawn(ticket);
                true
            }
            None => false,
        }
    }

    /// Re-run the failed request after an error. Returns `true` when issued.
    pub fn retry(&mut self) -> bool {
        match self.accumulator.retry() {
            Some(ticket) => {
                self.spawn(ticket);
                true
            }
            None => false,
        }
    }

    fn spawn(&mut self, ticket: FetchTicket) {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let policy = self.policy;
        self.outstanding += 1;
        tokio::spawn(async move {
            let result = fetch_with_retry(fetcher.as_ref(), &ticket.request, policy).await;
            // The receiver lives as long as the loader; a send error means it is gone.
            let _ = tx.send(Completion { ticket, result });
        });
    }

    /// Wait for the next completion and apply it.
    /// Returns `None` only when nothing is outstanding.
    pub async fn next_event(&mut self) -> Option<LoaderEvent> {
        if self.outstanding == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Apply a completion if one is ready, without waiting.
    pub fn try_next_event(&mut self) -> Option<LoaderEvent> {
        let completion = self.rx.try_recv().ok()?;
        Some(self.apply(completion))
    }

    fn apply(&mut self, completion: Completion) -> LoaderEvent {
        self.outstanding = self.outstanding.saturating_sub(1);
        let Completion { ticket, result } = completion;
        let applied = match result {
            Ok(page) => {
                let added = page.results.len();
                match self.accumulator.on_fetch_success(&ticket, page) {
                    Applied::Applied => {
                        return LoaderEvent::PageLoaded {
                            added,
                            status: self.accumulator.status().clone(),
                        }
                    }
                    Applied::Stale => Applied::Stale,
                }
            }
            Err(err) => self.accumulator.on_fetch_failure(&ticket, &err),
        };

        match (applied, self.accumulator.status()) {
            (Applied::Applied, Status::Error(failure)) => LoaderEvent::Failed(failure.clone()),
            _ => LoaderEvent::Discarded {
                query: ticket.request.query().to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChillError;
    use crate::model::{Cursor, PageRequest};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves pages keyed by cursor ("" for the first page) and records every attempt.
    struct MapFetcher {
        pages: Vec<(String, std::result::Result<ResultPage, u16>)>,
        calls: Mutex<Vec<PageRequest>>,
    }

    impl MapFetcher {
        fn new(pages: Vec<(&str, std::result::Result<ResultPage, u16>)>) -> Arc<Self> {
            Arc::new(Self {
                pages: pages.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl PageFetcher for MapFetcher {
        async fn fetch_page(&self, request: &PageRequest) -> Result<ResultPage> {
            self.calls.lock().unwrap().push(request.clone());
            let key = request.cursor().map(Cursor::as_str).unwrap_or("");
            match self.pages.iter().find(|(k, _)| k == key) {
                Some((_, Ok(page))) => Ok(page.clone()),
                Some((_, Err(status))) => Err(ChillError::Server {
                    status: *status,
                    body: "scripted".into(),
                }),
                None => Err(ChillError::Server {
                    status: 404,
                    body: format!("no page for '{key}'"),
                }),
            }
        }
    }

    fn fast() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    fn titles(n: usize) -> Vec<ResultItem> {
        (0..n).map(|i| ResultItem::new(format!("t{i}"))).collect()
    }

    #[tokio::test]
    async fn test_first_page_applied() {
        let fetcher = MapFetcher::new(vec![(
            "",
            Ok(ResultPage::new(titles(3), Some(Cursor::new("c2")))),
        )]);
        let mut loader = Loader::new(fetcher.clone(), fast());
        loader.reset("matrix");
        assert_eq!(loader.status(), &Status::Loading);

        let event = loader.next_event().await.unwrap();
        assert_eq!(
            event,
            LoaderEvent::PageLoaded {
                added: 3,
                status: Status::LoadedWithMore
            }
        );
        assert_eq!(loader.items().len(), 3);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_guard_allows_single_in_flight_fetch() {
        let fetcher = MapFetcher::new(vec![
            ("", Ok(ResultPage::new(titles(1), Some(Cursor::new("c2"))))),
            ("c2", Ok(ResultPage::last(titles(1)))),
        ]);
        let mut loader = Loader::new(fetcher.clone(), fast());
        loader.reset("q");
        loader.next_event().await.unwrap();

        assert!(loader.request_next_page());
        for _ in 0..5 {
            assert!(!loader.request_next_page());
        }
        assert_eq!(loader.outstanding(), 1);
        loader.next_event().await.unwrap();
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(loader.status(), &Status::Exhausted);
        assert!(loader.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_transient_failure_exhausts_retries_then_errors() {
        let fetcher = MapFetcher::new(vec![
            ("", Ok(ResultPage::new(titles(2), Some(Cursor::new("c2"))))),
            ("c2", Err(503)),
        ]);
        let mut loader = Loader::new(fetcher.clone(), fast());
        loader.reset("q");
        loader.next_event().await.unwrap();
        loader.request_next_page();

        let event = loader.next_event().await.unwrap();
        assert!(matches!(event, LoaderEvent::Failed(ref f) if f.transient));
        // 1 first page + 1 attempt + 3 retries
        assert_eq!(fetcher.calls(), 5);
        assert_eq!(loader.items().len(), 2);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let fetcher = MapFetcher::new(vec![("", Err(400))]);
        let mut loader = Loader::new(fetcher.clone(), fast());
        loader.reset("q");
        let event = loader.next_event().await.unwrap();
        assert!(matches!(event, LoaderEvent::Failed(ref f) if !f.transient));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_reset_twice_discards_first() {
        let fetcher = MapFetcher::new(vec![("", Ok(ResultPage::last(titles(4))))]);
        let mut loader = Loader::new(fetcher, fast());
        loader.reset("matrix");
        loader.reset("inception");
        assert!(loader.items().is_empty());
        assert_eq!(loader.status(), &Status::Loading);
        assert_eq!(loader.active_query(), Some("inception"));

        let mut discarded = Vec::new();
        while let Some(event) = loader.next_event().await {
            if let LoaderEvent::Discarded { query } = event {
                discarded.push(query);
            }
        }
        assert_eq!(discarded, vec!["matrix".to_string()]);
        assert_eq!(loader.items().len(), 4);
        assert_eq!(loader.active_query(), Some("inception"));
    }

    #[tokio::test]
    async fn test_retry_after_error() {
        let fetcher = MapFetcher::new(vec![("", Err(404))]);
        let mut loader = Loader::new(fetcher.clone(), fast());
        loader.reset("q");
        loader.next_event().await.unwrap();
        assert!(matches!(loader.status(), Status::Error(_)));
        assert!(!loader.request_next_page());
        assert!(loader.retry());
        loader.next_event().await.unwrap();
        assert_eq!(fetcher.calls(), 2);
    }
}

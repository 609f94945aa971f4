mod http;

pub use http::SearchClient;

use crate::error::Result;
use crate::model::{PageRequest, ResultItem, ResultPage};
use crate::retry::{with_retry, RetryPolicy};

/// One network round-trip for one page of search results.
///
/// Implementations make a single attempt and never touch loader state;
/// retry is layered on top by [`fetch_with_retry`].
pub trait PageFetcher: Send + Sync {
    fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> impl std::future::Future<Output = Result<ResultPage>> + Send;
}

/// Source of "you might also like" items for a query.
pub trait RecommendationSource: Send + Sync {
    fn fetch_recommendations(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ResultItem>>> + Send;
}

/// Fetch one page, retrying transient failures per `policy`.
pub async fn fetch_with_retry<F: PageFetcher>(
    fetcher: &F,
    request: &PageRequest,
    policy: RetryPolicy,
) -> Result<ResultPage> {
    tracing::debug!(%request, "fetching page");
    with_retry(policy, || fetcher.fetch_page(request)).await
}

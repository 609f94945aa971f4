use std::sync::Arc;

use crate::error::{ChillError, Result};
use crate::fetch::{PageFetcher, RecommendationSource};
use crate::loader::Loader;
use crate::model::{PageRequest, ResultPage};
use crate::retry::RetryPolicy;

/// Presents a [`RecommendationSource`] as a single-page feed, so recommendations
/// get the same retry, stale-discard and status handling as search results.
pub struct RecommendationFeed<R> {
    source: Arc<R>,
}

impl<R> RecommendationFeed<R> {
    pub fn new(source: Arc<R>) -> Self {
        Self { source }
    }
}

impl<R: RecommendationSource> PageFetcher for RecommendationFeed<R> {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ResultPage> {
        match request {
            PageRequest::Initial { query } => {
                let items = self.source.fetch_recommendations(query).await?;
                Ok(ResultPage::last(items))
            }
            PageRequest::Next { cursor, .. } => Err(ChillError::InvalidInput(format!(
                "recommendations are not paginated (cursor {cursor})"
            ))),
        }
    }
}

pub type RecommendationLoader<R> = Loader<RecommendationFeed<R>>;

/// Loader for recommendations: reset it with the query, it settles in `Exhausted` or `Error`.
pub fn recommendation_loader<R: RecommendationSource + 'static>(
    source: Arc<R>,
    policy: RetryPolicy,
) -> RecommendationLoader<R> {
    Loader::new(Arc::new(RecommendationFeed::new(source)), policy)
}

use std::time::Duration;

use reqwest::Client;

use super::{PageFetcher, RecommendationSource};
use crate::config::ChillConfig;
use crate::error::{ChillError, Result};
use crate::model::{PageRequest, ResultItem, ResultPage};

/// HTTP client for the movie backend's `/search/` and `/recommend/` endpoints.
pub struct SearchClient {
    client: Client,
    search_url: String,
    recommend_url: String,
}

impl SearchClient {
    pub fn new(search_url: String, recommend_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            search_url,
            recommend_url,
        })
    }

    pub fn from_config(config: &ChillConfig) -> Result<Self> {
        Self::new(
            config.search_url(),
            config.recommend_url(),
            Duration::from_secs(config.backend.timeout_secs),
        )
    }

    async fn get_text(&self, builder: reqwest::RequestBuilder) -> Result<String> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".into());
            return Err(ChillError::Server { status, body });
        }

        Ok(response.text().await?)
    }
}

impl PageFetcher for SearchClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ResultPage> {
        let builder = match request {
            PageRequest::Initial { query } => {
                self.client.get(&self.search_url).query(&[("q", query)])
            }
            // A cursor that is already a full URL carries its own query string.
            PageRequest::Next { cursor, .. } if cursor.is_url() => {
                self.client.get(cursor.as_str())
            }
            PageRequest::Next { query, cursor } => self
                .client
                .get(&self.search_url)
                .query(&[("q", query.as_str()), ("page", cursor.as_str())]),
        };

        let body = self.get_text(builder).await?;
        decode_page(&body)
    }
}

impl RecommendationSource for SearchClient {
    async fn fetch_recommendations(&self, query: &str) -> Result<Vec<ResultItem>> {
        let builder = self.client.get(&self.recommend_url).query(&[("q", query)]);
        let body = self.get_text(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Decode a search response. A bare array is read as a single final page.
pub(crate) fn decode_page(body: &str) -> Result<ResultPage> {
    match serde_json::from_str::<ResultPage>(body) {
        Ok(page) => Ok(page),
        Err(err) => match serde_json::from_str::<Vec<ResultItem>>(body) {
            Ok(results) => Ok(ResultPage::last(results)),
            Err(_) => Err(err.into()),
        },
    }
}

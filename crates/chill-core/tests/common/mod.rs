#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chill_core::fetch::PageFetcher;
use chill_core::model::{Cursor, PageRequest, ResultItem, ResultPage};
use chill_core::retry::RetryPolicy;
use chill_core::{ChillError, Result};
use tokio::sync::Notify;

type Key = (String, Option<String>);

#[derive(Clone)]
struct Scripted {
    /// `Err(status)` answers with a server error of that status.
    response: std::result::Result<ResultPage, u16>,
    gate: Option<Arc<Notify>>,
}

/// In-memory backend: answers per (query, cursor) and records every attempt.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<Key, Scripted>>,
    requests: Mutex<Vec<Key>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(
        &self,
        query: &str,
        cursor: Option<&str>,
        response: std::result::Result<ResultPage, u16>,
    ) {
        self.insert(query, cursor, response, None);
    }

    /// Like [`script`](Self::script), but the answer is held until the returned gate is notified.
    pub fn gate(
        &self,
        query: &str,
        cursor: Option<&str>,
        response: std::result::Result<ResultPage, u16>,
    ) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.insert(query, cursor, response, Some(gate.clone()));
        gate
    }

    fn insert(
        &self,
        query: &str,
        cursor: Option<&str>,
        response: std::result::Result<ResultPage, u16>,
        gate: Option<Arc<Notify>>,
    ) {
        self.scripts.lock().unwrap().insert(
            (query.to_string(), cursor.map(str::to_string)),
            Scripted { response, gate },
        );
    }

    pub fn requests(&self) -> Vec<Key> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ResultPage> {
        let key: Key = (
            request.query().to_string(),
            request.cursor().map(|c| c.as_str().to_string()),
        );
        self.requests.lock().unwrap().push(key.clone());

        let scripted = { self.scripts.lock().unwrap().get(&key).cloned() };
        let Some(scripted) = scripted else {
            return Err(ChillError::Server {
                status: 404,
                body: format!("nothing scripted for {key:?}"),
            });
        };

        if let Some(gate) = scripted.gate {
            gate.notified().await;
        }

        scripted.response.map_err(|status| ChillError::Server {
            status,
            body: "scripted failure".into(),
        })
    }
}

pub fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1))
}

pub fn items(prefix: &str, n: usize) -> Vec<ResultItem> {
    (0..n)
        .map(|i| ResultItem::new(format!("{prefix} #{i}")))
        .collect()
}

pub fn page(prefix: &str, n: usize, next: Option<&str>) -> ResultPage {
    ResultPage::new(items(prefix, n), next.map(Cursor::new))
}

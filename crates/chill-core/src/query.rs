use crate::fetch::PageFetcher;
use crate::loader::Loader;

/// Watches the externally owned search query and resets the loader whenever it changes.
#[derive(Debug, Default)]
pub struct QueryController {
    last_seen: Option<String>,
}

impl QueryController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    /// Feed the current query value. Blank or missing means "not available yet".
    ///
    /// Returns `true` when the value differed from the last one observed and
    /// the loader was reset.
    pub fn observe<F: PageFetcher + 'static>(
        &mut self,
        query: Option<&str>,
        loader: &mut Loader<F>,
    ) -> bool {
        let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
            return false;
        };
        if self.last_seen.as_deref() == Some(query) {
            return false;
        }
        tracing::debug!(previous = ?self.last_seen, query, "active query changed");
        self.last_seen = Some(query.to_string());
        loader.reset(query);
        true
    }

    /// Forget the last query so the next observation always resets.
    pub fn forget(&mut self) {
        self.last_seen = None;
    }
}

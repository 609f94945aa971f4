use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::ResultItem;

/// Opaque pagination token handed out by the backend.
///
/// The backend may encode it as a token, a page number or a full URL; it is
/// kept verbatim and never interpreted as an ordered integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the backend handed out an absolute URL rather than a token.
    pub fn is_url(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

/// One page of backend results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub results: Vec<ResultItem>,
    /// `None` (null, absent or empty) means no further pages.
    #[serde(default, deserialize_with = "non_empty_cursor")]
    pub next: Option<Cursor>,
}

impl ResultPage {
    pub fn new(results: Vec<ResultItem>, next: Option<Cursor>) -> Self {
        Self { results, next }
    }

    pub fn last(results: Vec<ResultItem>) -> Self {
        Self::new(results, None)
    }
}

fn non_empty_cursor<'de, D>(deserializer: D) -> Result<Option<Cursor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Cursor>::deserialize(deserializer)?;
    Ok(raw.filter(|c| !c.as_str().is_empty()))
}

/// What to ask the backend for: the first page of a query, or a follow-up cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Initial { query: String },
    Next { query: String, cursor: Cursor },
}

impl PageRequest {
    pub fn initial(query: impl Into<String>) -> Self {
        Self::Initial {
            query: query.into(),
        }
    }

    pub fn query(&self) -> &str {
        match self {
            Self::Initial { query } | Self::Next { query, .. } => query,
        }
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        match self {
            Self::Initial { .. } => None,
            Self::Next { cursor, .. } => Some(cursor),
        }
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial { query } => write!(f, "'{query}' (first page)"),
            Self::Next { query, cursor } => write!(f, "'{query}' (cursor {cursor})"),
        }
    }
}

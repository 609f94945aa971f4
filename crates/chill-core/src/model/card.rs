use serde::Serialize;

use super::ResultItem;
use crate::config::DisplayConfig;

/// Known rating sources in display order: (key, label).
pub const KNOWN_SOURCES: &[(&str, &str)] = &[
    ("imdb", "IMDb"),
    ("metacritic", "Metacritic"),
    ("rotten tomatoes", "RT"),
];

/// Ratings above this get the "hot" marker.
pub const HOT_RATING: f64 = 7.5;

/// Display props for one result, derived from a [`ResultItem`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieCard {
    pub title: String,
    pub release: String,
    pub description: String,
    pub image: String,
    /// One decimal place, e.g. `"8.1"`.
    pub rating: Option<String>,
    pub hot: bool,
    pub duration: String,
    pub genres: Vec<String>,
    pub links: Vec<SourceLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLink {
    pub name: String,
    pub url: String,
}

impl MovieCard {
    pub fn from_item(item: &ResultItem, display: &DisplayConfig) -> Self {
        let rating = item.rating();
        Self {
            title: item.title.clone(),
            release: item.release.clone(),
            description: truncate_description(&item.description, display.description_limit),
            image: item
                .image_url
                .clone()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| display.placeholder_image.clone()),
            rating: rating.map(|r| format!("{r:.1}")),
            hot: rating.is_some_and(|r| r > HOT_RATING),
            duration: item.duration.map(format_duration).unwrap_or_default(),
            genres: item.genres.clone(),
            links: source_links(item),
        }
    }
}

/// Cut to at most `limit` chars and append an ellipsis. Short text is left alone.
pub fn truncate_description(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// `136` → `"2h 16m"`, `45` → `"45m"`.
pub fn format_duration(minutes: u32) -> String {
    let (h, m) = (minutes / 60, minutes % 60);
    if h == 0 {
        format!("{m}m")
    } else {
        format!("{h}h {m}m")
    }
}

fn source_links(item: &ResultItem) -> Vec<SourceLink> {
    KNOWN_SOURCES
        .iter()
        .filter_map(|(key, label)| {
            item.data_sources.get(*key).map(|s| SourceLink {
                name: (*label).to_string(),
                url: s.url.clone(),
            })
        })
        .collect()
}

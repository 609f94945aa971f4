use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::card::KNOWN_SOURCES;

/// A single search hit as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub title: String,
    /// Release info. The backend sends either a year number or a date string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub release: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Running time in minutes. Negative sentinels are read as absent.
    #[serde(default, deserialize_with = "duration_minutes")]
    pub duration: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<String>,
    /// Rating sources keyed by lower-cased source name.
    #[serde(default, deserialize_with = "lowercase_sources")]
    pub data_sources: BTreeMap<String, RatingSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSource {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

impl ResultItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            release: String::new(),
            description: String::new(),
            image_url: None,
            duration: None,
            genres: Vec::new(),
            data_sources: BTreeMap::new(),
        }
    }

    pub fn with_source(mut self, name: &str, score: Option<f64>, url: impl Into<String>) -> Self {
        self.data_sources.insert(
            name.to_lowercase(),
            RatingSource {
                score,
                url: url.into(),
            },
        );
        self
    }

    /// Average of the known source scores, see [`crate::model::rating::aggregate_rating`].
    /// Sources outside [`KNOWN_SOURCES`] are ignored.
    pub fn rating(&self) -> Option<f64> {
        super::rating::aggregate_rating(
            KNOWN_SOURCES
                .iter()
                .filter_map(|(key, _)| self.data_sources.get(*key))
                .map(|s| s.score),
        )
    }
}

// -- Lenient field decoders --

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(f)) => f.to_string(),
        None => String::new(),
    })
}

fn duration_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(|d| d.round() as u32))
}

fn lowercase_sources<'de, D>(deserializer: D) -> Result<BTreeMap<String, RatingSource>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, RatingSource>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, source)| (name.to_lowercase(), source))
        .collect())
}

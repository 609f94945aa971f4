use crate::error::{ChillError, Result};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChillConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_search_path")]
    pub search_path: String,
    #[serde(default = "default_recommend_path")]
    pub recommend_path: String,
    /// Per-request transport timeout. Retries add on top of this.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_path: default_search_path(),
            recommend_path: default_recommend_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Scrolled fraction of the content height past which the next page loads.
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: f64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            scroll_threshold: default_scroll_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_description_limit")]
    pub description_limit: usize,
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            description_limit: default_description_limit(),
            placeholder_image: default_placeholder_image(),
        }
    }
}

// -- Defaults --

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
fn default_search_path() -> String {
    "/search/".to_string()
}
fn default_recommend_path() -> String {
    "/recommend/".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_retries() -> usize {
    3
}
fn default_retry_delay_ms() -> u64 {
    500
}
fn default_scroll_threshold() -> f64 {
    0.9
}
fn default_description_limit() -> usize {
    300
}
fn default_placeholder_image() -> String {
    "https://upload.wikimedia.org/wikipedia/commons/thumb/a/ac/No_image_available.svg/600px-No_image_available.svg.png".to_string()
}

pub const MAX_RETRIES_CAP: usize = 10;
pub const MAX_RETRY_DELAY_MS: u64 = 30_000;

impl ChillConfig {
    /// Load configuration with three-layer TOML merge:
    /// 1. ~/.config/chill/config.toml (global)
    /// 2. .chill/config.toml (project)
    /// 3. .chill/config.local.toml (local, gitignored)
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(dir) = project_dir {
            let project_config = dir.join(".chill").join("config.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }

            let local_config = dir.join(".chill").join("config.local.toml");
            if local_config.exists() {
                builder = builder.add_source(File::from(local_config).required(false));
            }
        }

        let config = builder
            .build()
            .map_err(|e| ChillError::Config(e.to_string()))?;

        let mut cfg: Self = config
            .try_deserialize()
            .map_err(|e| ChillError::Config(e.to_string()))?;

        for warning in cfg.validate() {
            tracing::warn!("config: {warning}");
        }
        Ok(cfg)
    }

    /// Parse a single TOML document, then validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut cfg: Self = toml::from_str(text).map_err(|e| ChillError::Config(e.to_string()))?;
        for warning in cfg.validate() {
            tracing::warn!("config: {warning}");
        }
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ChillError::Config(e.to_string()))
    }

    /// Validate config values, clamping out-of-range values.
    /// Lenient: fixes values rather than rejecting the config.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        let base = self.backend.base_url.trim_end_matches('/').to_string();
        if !base.starts_with("http://") && !base.starts_with("https://") {
            warnings.push(format!(
                "backend.base_url '{}' has no http(s) scheme, using {}",
                self.backend.base_url,
                default_base_url()
            ));
            self.backend.base_url = default_base_url();
        } else {
            self.backend.base_url = base;
        }

        for path in [
            &mut self.backend.search_path,
            &mut self.backend.recommend_path,
        ] {
            if !path.starts_with('/') {
                path.insert(0, '/');
            }
        }

        if self.backend.timeout_secs == 0 {
            warnings.push("backend.timeout_secs must be at least 1, using 1".into());
            self.backend.timeout_secs = 1;
        }

        if self.pagination.max_retries > MAX_RETRIES_CAP {
            warnings.push(format!(
                "pagination.max_retries {} exceeds {MAX_RETRIES_CAP}, clamping",
                self.pagination.max_retries
            ));
            self.pagination.max_retries = MAX_RETRIES_CAP;
        }

        if self.pagination.retry_delay_ms > MAX_RETRY_DELAY_MS {
            warnings.push(format!(
                "pagination.retry_delay_ms {} exceeds {MAX_RETRY_DELAY_MS}, clamping",
                self.pagination.retry_delay_ms
            ));
            self.pagination.retry_delay_ms = MAX_RETRY_DELAY_MS;
        }

        let threshold = self.pagination.scroll_threshold;
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
            warnings.push(format!(
                "pagination.scroll_threshold {threshold} outside (0, 1], using {}",
                default_scroll_threshold()
            ));
            self.pagination.scroll_threshold = default_scroll_threshold();
        }

        if self.display.description_limit == 0 {
            warnings.push(format!(
                "display.description_limit must be positive, using {}",
                default_description_limit()
            ));
            self.display.description_limit = default_description_limit();
        }

        warnings
    }

    pub fn search_url(&self) -> String {
        format!("{}{}", self.backend.base_url, self.backend.search_path)
    }

    pub fn recommend_url(&self) -> String {
        format!("{}{}", self.backend.base_url, self.backend.recommend_path)
    }
}

/// Path of the global config file: `~/.config/chill/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("chill").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ChillConfig::default();
        assert_eq!(cfg.backend.search_path, "/search/");
        assert_eq!(cfg.backend.recommend_path, "/recommend/");
        assert_eq!(cfg.pagination.max_retries, 3);
        assert_eq!(cfg.pagination.retry_delay_ms, 500);
        assert!((cfg.pagination.scroll_threshold - 0.9).abs() < f64::EPSILON);
        assert_eq!(cfg.display.description_limit, 300);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg = ChillConfig::from_toml_str(
            r#"
            [backend]
            base_url = "https://movies.example.com/"

            [pagination]
            max_retries = 1
            "#,
        )
        .unwrap();
        assert_eq!(cfg.backend.base_url, "https://movies.example.com");
        assert_eq!(cfg.search_url(), "https://movies.example.com/search/");
        assert_eq!(cfg.pagination.max_retries, 1);
        assert_eq!(cfg.pagination.retry_delay_ms, 500);
    }

    #[test]
    fn test_validate_clamps_threshold() {
        let mut cfg = ChillConfig::default();
        cfg.pagination.scroll_threshold = 1.5;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert!((cfg.pagination.scroll_threshold - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_clamps_retries_and_timeout() {
        let mut cfg = ChillConfig::default();
        cfg.pagination.max_retries = 50;
        cfg.backend.timeout_secs = 0;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 2);
        assert_eq!(cfg.pagination.max_retries, MAX_RETRIES_CAP);
        assert_eq!(cfg.backend.timeout_secs, 1);
    }

    #[test]
    fn test_validate_fixes_paths_and_scheme() {
        let mut cfg = ChillConfig::default();
        cfg.backend.base_url = "localhost:8000".into();
        cfg.backend.search_path = "search/".into();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(cfg.backend.base_url, "http://127.0.0.1:8000");
        assert_eq!(cfg.backend.search_path, "/search/");
    }

    #[test]
    fn test_defaults_are_valid() {
        let mut cfg = ChillConfig::default();
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let text = ChillConfig::default().to_toml_string().unwrap();
        assert!(text.contains("[pagination]"));
        let parsed = ChillConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.pagination.max_retries, 3);
    }

    #[test]
    fn test_load_project_layers() {
        let dir = std::env::temp_dir().join(format!("chill-config-test-{}", std::process::id()));
        let chill_dir = dir.join(".chill");
        std::fs::create_dir_all(&chill_dir).unwrap();
        std::fs::write(
            chill_dir.join("config.toml"),
            "[pagination]\nmax_retries = 2\nretry_delay_ms = 100\n",
        )
        .unwrap();
        std::fs::write(
            chill_dir.join("config.local.toml"),
            "[pagination]\nretry_delay_ms = 250\n",
        )
        .unwrap();

        let cfg = ChillConfig::load(Some(&dir)).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(cfg.pagination.max_retries, 2);
        assert_eq!(cfg.pagination.retry_delay_ms, 250);
    }
}

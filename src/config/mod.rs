use anyhow::{Result, bail};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

fn default_verbose() -> bool {
    false
}

/// Settings read from `safexit.toml`; command-line flags win over these
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    /// Venue snapshot path or URL
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
    #[serde(default)]
    pub routing: Option<RoutingConfig>,
    #[serde(default)]
    pub geolocation: Option<GeolocationConfig>,
    #[serde(default)]
    pub watch: Option<WatchConfig>,
}

fn default_restricted_penalty() -> f64 {
    1000.0
}

fn default_distance_floor() -> f64 {
    1e-4
}

/// Exit scoring tunables
#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    /// Added once per restricted area an exit lies inside
    #[serde(default = "default_restricted_penalty")]
    pub restricted_penalty: f64,
    /// Smallest incident-to-exit distance used as a divisor, in degrees
    #[serde(default = "default_distance_floor")]
    pub distance_floor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            restricted_penalty: default_restricted_penalty(),
            distance_floor: default_distance_floor(),
        }
    }
}

impl ScoringConfig {
    /// Reject values that would make exit totals NaN or reward restricted zones
    pub fn validate(&self) -> Result<()> {
        if !self.distance_floor.is_finite() || self.distance_floor <= 0.0 {
            bail!(
                "scoring.distance_floor must be a positive number, got {}",
                self.distance_floor
            );
        }
        if !self.restricted_penalty.is_finite() || self.restricted_penalty < 0.0 {
            bail!(
                "scoring.restricted_penalty must be zero or positive, got {}",
                self.restricted_penalty
            );
        }
        Ok(())
    }
}

fn default_routing_urls() -> Vec<String> {
    vec!["https://router.project-osrm.org".to_string()]
}

fn default_profile() -> String {
    "driving".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_simplify_tolerance() -> f64 {
    0.0
}

/// OSRM routing service settings
#[derive(Debug, Deserialize, Clone)]
pub struct RoutingConfig {
    /// Service roots, tried in order
    #[serde(default = "default_routing_urls")]
    pub urls: Vec<String>,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Route simplification tolerance in degrees, 0 disables
    #[serde(default = "default_simplify_tolerance")]
    pub simplify_tolerance: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            urls: default_routing_urls(),
            profile: default_profile(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            simplify_tolerance: default_simplify_tolerance(),
        }
    }
}

fn default_high_accuracy() -> bool {
    true
}

fn default_geolocation_timeout_ms() -> u64 {
    5000
}

fn default_max_age_ms() -> u64 {
    0
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeolocationConfig {
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,
    #[serde(default = "default_geolocation_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_age_ms")]
    pub max_age_ms: u64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: default_high_accuracy(),
            timeout_ms: default_geolocation_timeout_ms(),
            max_age_ms: default_max_age_ms(),
        }
    }
}

impl GeolocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }
}

fn default_interval_secs() -> u64 {
    30
}

/// Hazard feed polling
#[derive(Debug, Deserialize, Clone)]
pub struct WatchConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl FileConfig {
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("safexit.toml"));
    paths.push(PathBuf::from(".safexit.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("safexit").join("config.toml"));
        paths.push(config_dir.join("safexit.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".safexit.toml"));
        paths.push(home.join(".config").join("safexit").join("config.toml"));
    }

    paths
}

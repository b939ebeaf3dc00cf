use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const USER_AGENT: &str = "safexit/0.1.0";

/// Venue data as published by the event server
#[derive(Debug, Clone, Deserialize)]
pub struct VenueSnapshot {
    #[serde(default)]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Absent when the venue has not published its exits
    #[serde(default, deserialize_with = "lenient_optional_list")]
    pub exits: Option<Vec<RawExit>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub restricted_areas: Vec<RawRestrictedArea>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub incidents: Vec<RawIncident>,
}

/// Keep the entries that deserialize, warn about the rest
fn skip_malformed<T: DeserializeOwned>(values: Vec<serde_json::Value>) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(index, "Skipping malformed venue entry: {}", e);
                None
            }
        })
        .collect()
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(values.map(skip_malformed).unwrap_or_default())
}

fn lenient_optional_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(values.map(skip_malformed))
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawExit {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRestrictedArea {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// `[[lat, lng], ...]`, either inline or as a JSON-encoded string
    #[serde(default)]
    pub coordinates: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIncident {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub incident_type: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Where venue snapshots come from
#[derive(Debug, Clone, PartialEq)]
pub enum VenueSource {
    File(PathBuf),
    Url(String),
}

impl VenueSource {
    /// Treat http(s) locations as URLs and everything else as a file path
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            VenueSource::Url(location.to_string())
        } else {
            VenueSource::File(PathBuf::from(location))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, VenueSource::Url(_))
    }

    pub async fn load(&self) -> Result<VenueSnapshot> {
        match self {
            VenueSource::File(path) => load_snapshot(path).await,
            VenueSource::Url(url) => fetch_snapshot(url).await,
        }
    }
}

impl fmt::Display for VenueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VenueSource::File(path) => write!(f, "{}", path.display()),
            VenueSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Read a venue snapshot from a JSON file
pub async fn load_snapshot(path: &Path) -> Result<VenueSnapshot> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read venue file: {:?}", path))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse venue file: {:?}", path))
}

/// Fetch a venue snapshot from the event server
pub async fn fetch_snapshot(url: &str) -> Result<VenueSnapshot> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .context("Failed to send request to venue server")?;

    if !response.status().is_success() {
        bail!("Venue server returned error status: {}", response.status());
    }

    response
        .json()
        .await
        .context("Failed to parse venue JSON response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_snapshot() {
        let json = r#"{
            "name": "Riverside Festival",
            "latitude": 51.5,
            "longitude": -0.12,
            "restricted_areas": [
                {"id": 1, "name": "Stage", "description": "Crew only",
                 "coordinates": "[[51.5,-0.12],[51.501,-0.12],[51.501,-0.119]]"}
            ],
            "incidents": [
                {"id": 7, "latitude": 51.5004, "longitude": -0.1196,
                 "severity": "Critical", "status": "Reported", "timestamp": "2024-05-01T12:00:00"}
            ]
        }"#;

        let snapshot: VenueSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.name.as_deref(), Some("Riverside Festival"));
        assert!(snapshot.exits.is_none());
        assert_eq!(snapshot.restricted_areas.len(), 1);
        assert!(snapshot.restricted_areas[0].coordinates.is_string());
        assert_eq!(snapshot.incidents[0].severity.as_deref(), Some("Critical"));
    }

    #[test]
    fn test_mistyped_entries_do_not_reject_snapshot() {
        let json = r#"{
            "latitude": 0.0, "longitude": 0.0,
            "restricted_areas": [
                {"name": "Pit", "coordinates": [[0,0],[0,1],[1,1]]},
                {"name": null, "coordinates": [[2,2],[2,3],[3,3]]}
            ],
            "incidents": [
                {"id": 1, "latitude": 0.5, "longitude": 0.5, "severity": "High"},
                {"id": 2, "latitude": "n/a", "longitude": 0.5, "severity": "Critical"}
            ],
            "exits": [
                {"name": "Gate", "latitude": 0.1, "longitude": 0.1},
                {"name": 7, "latitude": 0.2, "longitude": 0.2}
            ]
        }"#;

        let snapshot: VenueSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.restricted_areas.len(), 1);
        assert_eq!(snapshot.restricted_areas[0].name, "Pit");
        assert_eq!(snapshot.incidents.len(), 1);
        assert_eq!(snapshot.incidents[0].id, Some(1));
        assert_eq!(snapshot.exits.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_null_lists_are_treated_as_absent() {
        let json = r#"{"latitude": 0.0, "longitude": 0.0, "exits": null, "incidents": null}"#;

        let snapshot: VenueSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.exits.is_none());
        assert!(snapshot.incidents.is_empty());
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            VenueSource::parse("https://example.org/venue.json"),
            VenueSource::Url("https://example.org/venue.json".to_string())
        );
        assert_eq!(
            VenueSource::parse("venue.json"),
            VenueSource::File(PathBuf::from("venue.json"))
        );
        assert!(VenueSource::parse("http://localhost/v").is_remote());
    }

    #[tokio::test]
    async fn test_load_snapshot_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"latitude": 1.0, "longitude": 2.0}}"#).unwrap();

        let snapshot = load_snapshot(file.path()).await.unwrap();
        assert_eq!(snapshot.latitude, 1.0);
        assert!(snapshot.incidents.is_empty());
    }

    #[tokio::test]
    async fn test_load_snapshot_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = load_snapshot(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse venue file"));
    }
}

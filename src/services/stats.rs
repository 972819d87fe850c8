//! View-stats service client
//!
//! Thin wire client for the external stats service: hits are recorded with
//! `POST /hit`, view counts are read back with `GET /stats`. The client is
//! injected wherever views matter so tests can point it at a double.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::settings::Settings;
use crate::utils::errors::{EventboardError, Result, StatsError};
use crate::utils::time;

/// One endpoint hit, as recorded by the stats service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointHit {
    pub app: String,
    pub uri: String,
    pub ip: String,
    #[serde(with = "time::wire_format")]
    pub timestamp: DateTime<Utc>,
}

/// Aggregated view line returned by the stats service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewStats {
    pub app: String,
    pub uri: String,
    pub hits: i64,
}

/// Client for the view-stats service
#[derive(Debug, Clone)]
pub struct StatsClient {
    client: Client,
    hit_url: Url,
    stats_url: Url,
    settings: Settings,
}

impl StatsClient {
    /// Create a new StatsClient instance
    pub fn new(settings: Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.stats.timeout_seconds))
            .user_agent(concat!("eventboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(EventboardError::Http)?;

        let mut base = settings.stats.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)?;
        let hit_url = base.join("hit")?;
        let stats_url = base.join("stats")?;

        Ok(Self {
            client,
            hit_url,
            stats_url,
            settings,
        })
    }

    /// Record one endpoint hit for the configured application.
    pub async fn record_hit(&self, uri: &str, ip: &str) -> Result<()> {
        let hit = EndpointHit {
            app: self.settings.stats.app_name.clone(),
            uri: uri.to_string(),
            ip: ip.to_string(),
            timestamp: Utc::now(),
        };

        debug!(uri = %hit.uri, ip = %hit.ip, "Recording endpoint hit");

        let response = self
            .client
            .post(self.hit_url.clone())
            .json(&hit)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EventboardError::Stats(StatsError::RequestFailed(format!(
                "HTTP {status}: {error_text}"
            ))));
        }

        Ok(())
    }

    /// Record a hit without blocking the caller. Failures are logged and
    /// swallowed; read traffic never depends on the stats service.
    pub fn record_hit_background(&self, uri: String, ip: String) {
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.record_hit(&uri, &ip).await {
                warn!(uri = %uri, error = %e, "Failed to record endpoint hit");
            }
        });
    }

    /// Fetch aggregated view lines for the given uris over [start, end].
    pub async fn stats(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        uris: &[String],
        unique: bool,
    ) -> Result<Vec<ViewStats>> {
        let mut params: Vec<(&str, String)> = vec![
            ("start", time::format_datetime(&start)),
            ("end", time::format_datetime(&end)),
            ("unique", unique.to_string()),
        ];
        for uri in uris {
            params.push(("uris", uri.clone()));
        }

        debug!(uris = uris.len(), unique = unique, "Fetching view stats");

        let response = self
            .client
            .get(self.stats_url.clone())
            .query(&params)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EventboardError::Stats(StatsError::RequestFailed(format!(
                "HTTP {status}: {error_text}"
            ))));
        }

        let stats = response
            .json::<Vec<ViewStats>>()
            .await
            .map_err(|e| EventboardError::Stats(StatsError::InvalidResponse(e.to_string())))?;

        Ok(stats)
    }

    /// Whether view-count reads may degrade to zero on stats failures.
    pub fn fail_open(&self) -> bool {
        self.settings.stats.fail_open
    }
}

fn map_transport_error(e: reqwest::Error) -> EventboardError {
    if e.is_timeout() {
        EventboardError::Stats(StatsError::Timeout)
    } else if e.is_connect() {
        EventboardError::Stats(StatsError::ServiceUnavailable)
    } else {
        EventboardError::Stats(StatsError::RequestFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn endpoint_hit_serializes_the_wire_timestamp() {
        let hit = EndpointHit {
            app: "eventboard".to_string(),
            uri: "/events/3".to_string(),
            ip: "192.163.0.1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2035, 5, 5, 11, 0, 23).unwrap(),
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["timestamp"], "2035-05-05 11:00:23");
        assert_eq!(json["uri"], "/events/3");
    }

    #[test]
    fn view_stats_deserialize_from_the_wire_shape() {
        let json = r#"[{"app": "eventboard", "uri": "/events/1", "hits": 6},
                       {"app": "eventboard", "uri": "/events/2", "hits": 1}]"#;
        let stats: Vec<ViewStats> = serde_json::from_str(json).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].hits, 6);
        assert_eq!(stats[1].uri, "/events/2");
    }

    #[test]
    fn base_url_joins_with_and_without_trailing_slash() {
        let mut settings = Settings::default();
        settings.stats.base_url = "http://localhost:9090".to_string();
        let client = StatsClient::new(settings.clone()).unwrap();
        assert_eq!(client.hit_url.as_str(), "http://localhost:9090/hit");

        settings.stats.base_url = "http://localhost:9090/".to_string();
        let client = StatsClient::new(settings).unwrap();
        assert_eq!(client.stats_url.as_str(), "http://localhost:9090/stats");
    }
}

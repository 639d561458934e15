use crate::core::config::EvdsProviderConfig;
use crate::core::rates::{RateSource, RawRateRecord, RawValue};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

const DATE_FORMAT: &str = "%d-%m-%Y";
const DATE_FIELD: &str = "Tarih";

/// Client for the EVDS statistics service of the Central Bank of Turkey.
pub struct EvdsProvider {
    base_url: String,
    api_key: Option<String>,
    series: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct EvdsResponse {
    items: Option<Vec<Map<String, Value>>>,
}

impl EvdsProvider {
    pub fn with_series(base_url: &str, api_key: Option<String>, series: &str) -> Self {
        EvdsProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            series: series.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &EvdsProviderConfig, api_key: Option<String>) -> Self {
        Self::with_series(&config.base_url, api_key, &config.series)
    }

    /// EVDS takes its parameters as part of the path, without a `?`.
    fn request_url(&self, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/series={}&startDate={}&endDate={}&type=json&frequency=5",
            self.base_url,
            self.series,
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT)
        )
    }

    /// Column holding the series values, e.g. `TP_FG_J0` for `TP.FG.J0`.
    fn value_field(&self) -> String {
        self.series.replace('.', "_")
    }

    async fn request(&self, api_key: &str, url: &str) -> Result<Vec<RawRateRecord>> {
        let response = self
            .client
            .get(url)
            .header("key", api_key)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for series: {}", e, self.series))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(anyhow!(
                "HTTP error: {} for series: {}",
                response.status(),
                self.series
            ));
        }

        let text = response.text().await?;
        let data: EvdsResponse = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON response for {}", self.series))?;
        let items = data
            .items
            .ok_or_else(|| anyhow!("No items in response for series: {}", self.series))?;

        let value_field = self.value_field();
        Ok(items
            .iter()
            .map(|item| RawRateRecord {
                date: item
                    .get(DATE_FIELD)
                    .and_then(Value::as_str)
                    .map(str::to_string),
                value: item.get(&value_field).and_then(RawValue::from_json),
            })
            .collect())
    }
}

#[async_trait]
impl RateSource for EvdsProvider {
    fn series(&self) -> &str {
        &self.series
    }

    #[instrument(name = "EvdsFetch", skip(self), fields(series = %self.series))]
    async fn fetch_rates(&self, start: NaiveDate, end: NaiveDate) -> Option<Vec<RawRateRecord>> {
        let Some(api_key) = self.api_key.as_deref().filter(|key| !key.is_empty()) else {
            warn!("No EVDS API key configured");
            return None;
        };

        let url = self.request_url(start, end);
        debug!("Requesting rate data from {}", url);

        match self.request(api_key, &url).await {
            Ok(records) => {
                debug!(rows = records.len(), "Received EVDS response");
                Some(records)
            }
            Err(e) => {
                warn!(error = %e, "EVDS request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DEFAULT_SERIES;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REQUEST_PATH: &str =
        "/series=TP.FG.J0&startDate=01-01-2024&endDate=31-01-2026&type=json&frequency=5";

    fn window() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
    }

    fn evds_client(base_url: &str, api_key: Option<String>) -> EvdsProvider {
        EvdsProvider::with_series(base_url, api_key, DEFAULT_SERIES)
    }

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(REQUEST_PATH))
            .and(header("key", "test_key"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(1)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[test]
    fn test_request_url_has_no_query_separator() {
        let provider = evds_client("https://evds2.tcmb.gov.tr/service/evds/", None);
        let (start, end) = window();
        assert_eq!(
            provider.request_url(start, end),
            "https://evds2.tcmb.gov.tr/service/evds/series=TP.FG.J0&startDate=01-01-2024&endDate=31-01-2026&type=json&frequency=5"
        );
    }

    #[tokio::test]
    async fn test_fetch_sends_key_header_and_parses_items() {
        let body = r#"{
            "totalCount": 3,
            "items": [
                {"Tarih": "2024-1", "TP_FG_J0": "6.7", "UNIXTIME": {"$numberLong": "1704056400"}},
                {"Tarih": "2024-2", "TP_FG_J0": "4.53"},
                {"Tarih": "2024-3", "TP_FG_J0": null}
            ]
        }"#;
        let mock_server = create_mock_server(200, body).await;
        let provider = evds_client(&mock_server.uri(), Some("test_key".to_string()));
        let (start, end) = window();

        let records = provider.fetch_rates(start, end).await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0], RawRateRecord::new("2024-1", "6.7"));
        assert_eq!(records[1], RawRateRecord::new("2024-2", "4.53"));
        assert_eq!(records[2].date.as_deref(), Some("2024-3"));
        assert!(records[2].value.is_none());
    }

    #[tokio::test]
    async fn test_fetch_empty_items() {
        let mock_server = create_mock_server(200, r#"{"items": []}"#).await;
        let provider = evds_client(&mock_server.uri(), Some("test_key".to_string()));
        let (start, end) = window();

        let records = provider.fetch_rates(start, end).await;
        assert_eq!(records, Some(vec![]));
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_no_data() {
        let mock_server = create_mock_server(500, "").await;
        let provider = evds_client(&mock_server.uri(), Some("test_key".to_string()));
        let (start, end) = window();

        assert!(provider.fetch_rates(start, end).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_no_data() {
        let mock_server = create_mock_server(200, "<html>maintenance</html>").await;
        let provider = evds_client(&mock_server.uri(), Some("test_key".to_string()));
        let (start, end) = window();

        assert!(provider.fetch_rates(start, end).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_missing_items_is_no_data() {
        let mock_server = create_mock_server(200, r#"{"totalCount": 0}"#).await;
        let provider = evds_client(&mock_server.uri(), Some("test_key".to_string()));
        let (start, end) = window();

        assert!(provider.fetch_rates(start, end).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_without_api_key_sends_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items": []}"#))
            .expect(0)
            .mount(&mock_server)
            .await;
        let (start, end) = window();

        let provider = evds_client(&mock_server.uri(), None);
        assert!(provider.fetch_rates(start, end).await.is_none());

        let provider = evds_client(&mock_server.uri(), Some(String::new()));
        assert!(provider.fetch_rates(start, end).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_no_data() {
        // Nothing listens on port 9 locally.
        let provider = evds_client("http://127.0.0.1:9", Some("test_key".to_string()));
        let (start, end) = window();

        assert!(provider.fetch_rates(start, end).await.is_none());
    }

    #[tokio::test]
    async fn test_custom_series_uses_matching_value_field() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/series=TP.FE.OKTG01&startDate=01-01-2024&endDate=31-01-2026&type=json&frequency=5",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"items": [{"Tarih": "2024-1", "TP_FE_OKTG01": "1.1", "TP_FG_J0": "9.9"}]}"#,
            ))
            .mount(&mock_server)
            .await;
        let provider =
            EvdsProvider::with_series(&mock_server.uri(), Some("k".to_string()), "TP.FE.OKTG01");
        let (start, end) = window();
        assert_eq!(provider.series(), "TP.FE.OKTG01");

        let records = provider.fetch_rates(start, end).await.unwrap();
        assert_eq!(records, vec![RawRateRecord::new("2024-1", "1.1")]);
    }
}

use crate::domain::model::{PirepReports, RawReport, ReportKind, StationInfo};
use crate::domain::ports::{ConfigProvider, ReportFetcher};
use crate::utils::error::{FixtureError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "https://avwx.rest/api";

const REPORT_OPTIONS: &str = "info,translate,summary,speech";
const PIREP_OPTIONS: &str = "info";

// 回應中不屬於報告本身的欄位
const RESPONSE_META_KEYS: &[&str] = &["meta", "units"];

/// 透過 AVWX 風格的 REST 服務取得已解析的報告
pub struct AvwxHttpFetcher {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl AvwxHttpFetcher {
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.api_endpoint(),
            config.api_token().map(str::to_string),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    fn report_url(&self, kind: ReportKind, station: &str, options: &str) -> String {
        format!("{}/{}/{}?options={}", self.endpoint, kind, station, options)
    }

    async fn send(
        &self,
        kind: ReportKind,
        station: &str,
        request: RequestBuilder,
    ) -> Result<Option<Value>> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| FixtureError::fetch(kind, station, e.to_string()))?;
        let status = response.status();
        tracing::debug!("{} {} response status: {}", kind, station, status);

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| FixtureError::fetch(kind, station, e.to_string()))?;

        if !status.is_success() {
            return Err(FixtureError::fetch(
                kind,
                station,
                format!("HTTP {}: {}", status.as_u16(), upstream_message(&body)),
            ));
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            FixtureError::parse(kind, station, format!("invalid JSON response: {}", e))
        })?;

        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return Err(FixtureError::fetch(kind, station, message));
        }

        Ok(Some(value))
    }

    async fn get_report(&self, kind: ReportKind, station: &str, options: &str) -> Result<Option<Value>> {
        let url = self.report_url(kind, station, options);
        tracing::debug!("Making API request to: {}", url);
        self.send(kind, station, self.client.get(url)).await
    }

    async fn fetch_station_info(&self, kind: ReportKind, station: &str) -> Result<StationInfo> {
        let url = format!("{}/station/{}", self.endpoint, station);
        tracing::debug!("Looking up station info: {}", url);
        let body = self
            .send(kind, station, self.client.get(url))
            .await?
            .ok_or_else(|| FixtureError::fetch(kind, station, "station lookup returned no content"))?;
        serde_json::from_value(body)
            .map_err(|e| FixtureError::parse(kind, station, format!("invalid station info: {}", e)))
    }
}

#[async_trait]
impl ReportFetcher for AvwxHttpFetcher {
    async fn fetch_metar(&self, station: &str) -> Result<RawReport> {
        let kind = ReportKind::Metar;
        let body = self
            .get_report(kind, station, REPORT_OPTIONS)
            .await?
            .ok_or_else(|| FixtureError::fetch(kind, station, "no report available"))?;
        split_report(kind, station, body)
    }

    async fn fetch_taf(&self, station: &str, report: Option<&str>) -> Result<RawReport> {
        let kind = ReportKind::Taf;
        let body = match report {
            Some(raw) => {
                let url = format!("{}/parse/taf?options={}", self.endpoint, REPORT_OPTIONS);
                tracing::debug!("Parsing supplied TAF for {} via {}", station, url);
                let request = self
                    .client
                    .post(url)
                    .header(reqwest::header::CONTENT_TYPE, "text/plain")
                    .body(raw.to_string());
                self.send(kind, station, request).await?
            }
            None => self.get_report(kind, station, REPORT_OPTIONS).await?,
        }
        .ok_or_else(|| FixtureError::fetch(kind, station, "no report available"))?;

        let mut map = into_object(kind, station, body)?;
        // 解析端點不一定附帶測站資料
        if report.is_some() && matches!(map.get("info"), None | Some(Value::Null)) {
            let info = self.fetch_station_info(kind, station).await?;
            map.insert("info".to_string(), serde_json::to_value(info)?);
        }
        split_report(kind, station, Value::Object(map))
    }

    async fn fetch_pireps(&self, station: &str) -> Result<PirepReports> {
        let body = self
            .get_report(ReportKind::Pirep, station, PIREP_OPTIONS)
            .await?;
        split_pireps(station, body)
    }
}

fn upstream_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

fn into_object(kind: ReportKind, station: &str, body: Value) -> Result<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(FixtureError::parse(
            kind,
            station,
            "response body is not a JSON object",
        )),
    }
}

fn take_station_info(
    kind: ReportKind,
    station: &str,
    map: &mut Map<String, Value>,
) -> Result<Option<StationInfo>> {
    match map.remove("info") {
        None | Some(Value::Null) => Ok(None),
        Some(info) => serde_json::from_value(info).map(Some).map_err(|e| {
            FixtureError::parse(kind, station, format!("invalid station info: {}", e))
        }),
    }
}

/// 把單一報告回應拆成 data / translations / summary / speech / station_info
pub fn split_report(kind: ReportKind, station: &str, body: Value) -> Result<RawReport> {
    let mut map = into_object(kind, station, body)?;
    for key in RESPONSE_META_KEYS {
        map.remove(*key);
    }

    let station_info = take_station_info(kind, station, &mut map)?
        .ok_or_else(|| FixtureError::parse(kind, station, "response has no station info"))?;
    let translations = map
        .remove("translate")
        .or_else(|| map.remove("translations"))
        .unwrap_or(Value::Null);
    let summary = map.remove("summary").unwrap_or(Value::Null);
    let speech = map.remove("speech").unwrap_or(Value::Null);

    Ok(RawReport {
        data: Value::Object(map),
        translations,
        summary,
        speech,
        station_info,
    })
}

/// `None`（204）或缺少 `data` 時視為沒有報告
pub fn split_pireps(station: &str, body: Option<Value>) -> Result<PirepReports> {
    let kind = ReportKind::Pirep;
    let Some(body) = body else {
        return Ok(PirepReports::default());
    };

    let mut map = into_object(kind, station, body)?;
    let reports = match map.remove("data") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(FixtureError::parse(
                kind,
                station,
                "PIREP data must be an array",
            ))
        }
    };
    let station_info = take_station_info(kind, station, &mut map)?;

    Ok(PirepReports {
        reports,
        station_info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn fetcher(server: &MockServer, token: Option<&str>) -> AvwxHttpFetcher {
        AvwxHttpFetcher::new(
            &server.base_url(),
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn info(icao: &str) -> Value {
        json!({
            "city": "New York",
            "country": "US",
            "elevation_ft": 13,
            "elevation_m": 4,
            "iata": "JFK",
            "icao": icao,
            "latitude": 40.5,
            "longitude": -73.75,
            "name": "John F Kennedy International Airport",
            "reporting": true,
            "runways": [{"length_ft": 14511, "width_ft": 200, "ident1": "13R", "ident2": "31L"}],
            "state": "NY",
            "type": "large_airport"
        })
    }

    #[tokio::test]
    async fn test_fetch_metar_splits_response() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/metar/KJFK")
                .query_param("options", REPORT_OPTIONS);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "meta": {"timestamp": "2019-06-12T12:00:00Z"},
                    "raw": "KJFK 121151Z 18012KT 10SM FEW250 24/14 A3002",
                    "time": {"repr": "121151Z", "dt": "2019-06-12T11:51:00Z"},
                    "translate": {"wind": "S-180 at 12kt"},
                    "summary": "Winds S-180 at 12kt",
                    "speech": "Winds one eight zero at 12kt",
                    "info": info("KJFK")
                }));
        });

        let report = fetcher(&server, None).fetch_metar("KJFK").await.unwrap();

        api_mock.assert();
        assert_eq!(report.data["raw"], json!("KJFK 121151Z 18012KT 10SM FEW250 24/14 A3002"));
        assert!(report.data.get("meta").is_none());
        assert!(report.data.get("info").is_none());
        assert!(report.data.get("translate").is_none());
        assert_eq!(report.translations["wind"], json!("S-180 at 12kt"));
        assert_eq!(report.summary, json!("Winds S-180 at 12kt"));
        assert_eq!(report.station_info.icao.as_deref(), Some("KJFK"));
        assert_eq!(report.station_info.station_type.as_deref(), Some("large_airport"));
        assert_eq!(report.station_info.note, None);
    }

    #[tokio::test]
    async fn test_token_is_sent_as_bearer() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/metar/EGLL")
                .header("Authorization", "Bearer secret-token");
            then.status(200).json_body(json!({"raw": "EGLL", "info": info("EGLL")}));
        });

        fetcher(&server, Some("secret-token"))
            .fetch_metar("EGLL")
            .await
            .unwrap();

        api_mock.assert();
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/metar/XXXX");
            then.status(400)
                .json_body(json!({"error": "XXXX is not a valid ICAO station ident"}));
        });

        let err = fetcher(&server, None).fetch_metar("XXXX").await.unwrap_err();

        api_mock.assert();
        match err {
            FixtureError::FetchError { kind, station, message } => {
                assert_eq!(kind, ReportKind::Metar);
                assert_eq!(station, "XXXX");
                assert_eq!(message, "HTTP 400: XXXX is not a valid ICAO station ident");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/taf/KMCO");
            then.status(200).body("<html>maintenance</html>");
        });

        let err = fetcher(&server, None).fetch_taf("KMCO", None).await.unwrap_err();
        assert!(matches!(err, FixtureError::ParseError { kind: ReportKind::Taf, .. }));
    }

    #[tokio::test]
    async fn test_missing_station_info_is_parse_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/metar/PHNL");
            then.status(200).json_body(json!({"raw": "PHNL 121153Z"}));
        });

        let err = fetcher(&server, None).fetch_metar("PHNL").await.unwrap_err();
        assert!(err.to_string().contains("no station info"));
    }

    #[tokio::test]
    async fn test_taf_override_is_posted_for_parsing() {
        let server = MockServer::start();
        let raw = "KJFK 121130Z 1212/1318 18012KT P6SM FEW250";
        let parse_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/parse/taf")
                .query_param("options", REPORT_OPTIONS)
                .body(raw);
            then.status(200).json_body(json!({
                "raw": raw,
                "forecast": [],
                "summary": [],
                "speech": "Starting on June 12th"
            }));
        });
        let station_mock = server.mock(|when, then| {
            when.method(GET).path("/station/KJFK");
            then.status(200).json_body(info("KJFK"));
        });
        let live_mock = server.mock(|when, then| {
            when.method(GET).path("/taf/KJFK");
            then.status(200).json_body(json!({}));
        });

        let report = fetcher(&server, None)
            .fetch_taf("KJFK", Some(raw))
            .await
            .unwrap();

        parse_mock.assert();
        station_mock.assert();
        live_mock.assert_hits(0);
        assert_eq!(report.data["raw"], json!(raw));
        assert_eq!(report.station_info.iata.as_deref(), Some("JFK"));
    }

    #[tokio::test]
    async fn test_pireps_no_content_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/pirep/EGLL");
            then.status(204);
        });

        let pireps = fetcher(&server, None).fetch_pireps("EGLL").await.unwrap();
        assert!(pireps.reports.is_empty());
        assert_eq!(pireps.station_info, None);
    }

    #[tokio::test]
    async fn test_pireps_split_reports_and_info() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/pirep/KJFK")
                .query_param("options", PIREP_OPTIONS);
            then.status(200).json_body(json!({
                "meta": {"timestamp": "2019-06-12T12:00:00Z"},
                "data": [
                    {"raw": "UA /OV JFK /TM 1200", "time": {"repr": "1200"}},
                    {"raw": "UA /OV JFK /TM 1210", "time": {"repr": "1210"}}
                ],
                "info": info("KJFK")
            }));
        });

        let pireps = fetcher(&server, None).fetch_pireps("KJFK").await.unwrap();

        assert_eq!(pireps.reports.len(), 2);
        assert_eq!(pireps.reports[1]["raw"], json!("UA /OV JFK /TM 1210"));
        assert_eq!(pireps.station_info.unwrap().icao.as_deref(), Some("KJFK"));
    }

    #[test]
    fn test_split_pireps_rejects_non_array_data() {
        let err = split_pireps("KJFK", Some(json!({"data": {"raw": "UA"}}))).unwrap_err();
        assert!(matches!(err, FixtureError::ParseError { kind: ReportKind::Pirep, .. }));
    }

    #[test]
    fn test_split_report_accepts_translations_key() {
        let report = split_report(
            ReportKind::Metar,
            "KMCO",
            json!({"raw": "KMCO", "translations": {"clouds": "Clear"}, "info": info("KMCO")}),
        )
        .unwrap();

        assert_eq!(report.translations["clouds"], json!("Clear"));
        assert!(report.speech.is_null());
    }

    #[test]
    fn test_split_report_drops_units() {
        let report = split_report(
            ReportKind::Metar,
            "KJFK",
            json!({
                "meta": {"timestamp": "2019-06-12T12:00:00Z"},
                "units": {"altimeter": "inHg", "temperature": "C"},
                "raw": "KJFK",
                "info": info("KJFK")
            }),
        )
        .unwrap();

        let data = report.data.as_object().unwrap();
        assert!(!data.contains_key("units"));
        assert!(!data.contains_key("meta"));
        assert_eq!(data["raw"], json!("KJFK"));
    }
}

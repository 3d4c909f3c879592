//! Report API client
//!
//! `GET {base}/report/fights/{code}` and
//! `GET {base}/report/tables/{category}/{code}?start=&end=`, both keyed by
//! the `api_key` query parameter.

use std::time::Duration;

use async_trait::async_trait;
use raidnight_core::{EventTable, FetchResult, ReportFights, ReportSource, TableCategory};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::WclConfig;
use crate::error::WclError;
use crate::retry::with_retry;

pub(crate) const USER_AGENT: &str = concat!("raidnight/", env!("CARGO_PKG_VERSION"));

/// Client for the report API.
#[derive(Debug, Clone)]
pub struct WclClient {
    config: WclConfig,
    http: reqwest::Client,
}

impl WclClient {
    /// Build a client. Fails when no API key is configured.
    pub fn new(config: WclConfig) -> Result<Self, WclError> {
        config.require_api_key()?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, http })
    }

    /// Build a client from `WCL_*` environment variables.
    pub fn from_env() -> Result<Self, WclError> {
        Self::new(WclConfig::from_env())
    }

    pub fn config(&self) -> &WclConfig {
        &self.config
    }

    pub fn fights_url(&self, report_code: &str) -> Result<Url, WclError> {
        let raw = format!("{}/report/fights/{}", self.base(), report_code);
        self.keyed_url(&raw, &[])
    }

    pub fn table_url(
        &self,
        category: TableCategory,
        report_code: &str,
        start: u64,
        end: u64,
    ) -> Result<Url, WclError> {
        let raw = format!(
            "{}/report/tables/{}/{}",
            self.base(),
            category.as_str(),
            report_code
        );
        self.keyed_url(
            &raw,
            &[("start", start.to_string()), ("end", end.to_string())],
        )
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn keyed_url(&self, raw: &str, params: &[(&str, String)]) -> Result<Url, WclError> {
        let key = self.config.require_api_key()?;
        let mut pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        pairs.push(("api_key", key));
        Url::parse_with_params(raw, &pairs).map_err(|e| WclError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, WclError> {
        let shown = redacted(&url);
        debug!(url = %shown, "GET");
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(WclError::Status {
                status: status.as_u16(),
                url: shown,
            });
        }
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| WclError::Decode {
            url: shown,
            reason: e.to_string(),
        })
    }
}

/// URL without its query string, safe to log.
pub(crate) fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

#[async_trait]
impl ReportSource for WclClient {
    #[instrument(skip(self), fields(report = %report_code))]
    async fn fetch_fights(&self, report_code: &str) -> FetchResult<ReportFights> {
        let resource = format!("report/fights/{report_code}");
        let url = self
            .fights_url(report_code)
            .map_err(raidnight_core::FetchError::from)?;
        with_retry(&self.config.retry, &resource, || {
            self.get_json::<ReportFights>(url.clone())
        })
        .await
    }

    #[instrument(skip(self), fields(report = %report_code, category = %category))]
    async fn fetch_table(
        &self,
        category: TableCategory,
        report_code: &str,
        start: u64,
        end: u64,
    ) -> FetchResult<EventTable> {
        let resource = format!("report/tables/{category}/{report_code}?start={start}&end={end}");
        let url = self
            .table_url(category, report_code, start, end)
            .map_err(raidnight_core::FetchError::from)?;
        with_retry(&self.config.retry, &resource, || {
            self.get_json::<EventTable>(url.clone())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> WclClient {
        WclClient::new(WclConfig::new("s3cret").with_base_url("http://wcl.test/v1")).unwrap()
    }

    #[test]
    fn new_requires_api_key() {
        let err = WclClient::new(WclConfig::default()).unwrap_err();
        assert!(matches!(err, WclError::MissingApiKey));
    }

    #[test]
    fn fights_url_carries_api_key() {
        let url = client().fights_url("aBcD1234").unwrap();
        assert_eq!(
            url.as_str(),
            "http://wcl.test/v1/report/fights/aBcD1234?api_key=s3cret"
        );
    }

    #[test]
    fn table_url_has_window_and_category() {
        let url = client()
            .table_url(TableCategory::DamageDone, "aBcD1234", 300_000, 600_000)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://wcl.test/v1/report/tables/damage-done/aBcD1234?start=300000&end=600000&api_key=s3cret"
        );
    }

    #[test]
    fn redacted_url_hides_the_key() {
        let url = client().fights_url("abc").unwrap();
        let shown = redacted(&url);
        assert!(!shown.contains("s3cret"));
        assert_eq!(shown, "http://wcl.test/v1/report/fights/abc");
    }
}

//! Error types for raidnight-wcl

use thiserror::Error;

/// Errors from the report API client and score page scraper
#[derive(Error, Debug)]
pub enum WclError {
    /// No API key configured
    #[error("WCL_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Non-success HTTP status. `url` has its query string removed.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Connection, timeout or body read failure
    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("score page error: {0}")]
    ScorePage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for WclError {
    fn from(err: reqwest::Error) -> Self {
        // Drop the URL: it carries the API key.
        WclError::Transport(err.without_url().to_string())
    }
}

impl WclError {
    /// Resource the failure refers to, when known.
    fn resource(&self) -> String {
        match self {
            WclError::InvalidUrl { url, .. }
            | WclError::Status { url, .. }
            | WclError::Decode { url, .. } => url.clone(),
            _ => "warcraftlogs".to_string(),
        }
    }
}

/// Single-attempt classification. Server errors and transport failures are
/// transient; everything else is permanent.
impl From<WclError> for raidnight_core::FetchError {
    fn from(err: WclError) -> Self {
        let resource = err.resource();
        match &err {
            WclError::Status { status, .. } if *status >= 500 => {
                raidnight_core::FetchError::transient(resource, 1, err.to_string())
            }
            WclError::Transport(_) => {
                raidnight_core::FetchError::transient(resource, 1, err.to_string())
            }
            _ => raidnight_core::FetchError::permanent(resource, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidnight_core::FetchError;

    #[test]
    fn server_errors_convert_to_transient() {
        let err: FetchError = WclError::Status {
            status: 502,
            url: "http://wcl.test/v1/report/fights/abc".to_string(),
        }
        .into();
        assert!(err.is_transient());
    }

    #[test]
    fn decode_errors_convert_to_permanent() {
        let err: FetchError = WclError::Decode {
            url: "http://wcl.test/v1/report/fights/abc".to_string(),
            reason: "expected value".to_string(),
        }
        .into();
        assert_eq!(
            err,
            FetchError::permanent(
                "http://wcl.test/v1/report/fights/abc",
                "could not decode response from http://wcl.test/v1/report/fights/abc: expected value"
            )
        );
    }

    #[test]
    fn missing_key_is_permanent() {
        let err: FetchError = WclError::MissingApiKey.into();
        assert!(!err.is_transient());
    }
}

//! HTTP transport to the remote backtesting backend.

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use trading_core::error::TransportError;
use trading_core::traits::RemoteTransport;
use trading_core::types::{JobId, PerformanceReport, RemoteStatus, RunRequest};
use tracing::debug;

#[derive(Debug, Serialize)]
struct SubmitBody<'a> {
    request: &'a RunRequest,
    algorithm: &'a str,
    mail: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    algo_id: String,
}

/// Status payload: either a bare status string or an object carrying the
/// performance data and logs produced so far.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireStatus {
    Bare(String),
    Detailed {
        status: String,
        #[serde(default)]
        perf: Option<Value>,
        #[serde(default)]
        log: Option<String>,
    },
}

impl From<WireStatus> for RemoteStatus {
    fn from(wire: WireStatus) -> Self {
        match wire {
            WireStatus::Bare(status) => RemoteStatus::Status(status),
            WireStatus::Detailed { status, perf, log } => RemoteStatus::Detailed {
                status,
                result: perf.map(PerformanceReport::new),
                log,
            },
        }
    }
}

/// Remote backend client.
pub struct HttpTransport {
    base_url: Url,
    client: Client,
}

impl HttpTransport {
    /// Create a new client, authenticating with `token` when given.
    pub fn new(base_url: impl Into<String>, token: Option<&str>) -> Result<Self, TransportError> {
        let base_url = base_url.into();
        let base_url = Url::parse(&base_url)
            .map_err(|e| TransportError::Configuration(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::Configuration(format!(
                "invalid base URL '{}'",
                base_url
            )));
        }

        let mut headers = header::HeaderMap::new();
        if let Some(token) = token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| TransportError::Configuration(e.to_string()))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Configuration(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Configuration(format!("invalid base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        if !resp.status().is_success() {
            let status = resp.status();
            let message = resp.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl RemoteTransport for HttpTransport {
    async fn submit(
        &self,
        request: &RunRequest,
        algorithm: &str,
        mail: &str,
    ) -> Result<JobId, TransportError> {
        let url = self.endpoint(&["backtest"])?;
        debug!(%url, "Submitting remote backtest");

        let resp = self
            .client
            .post(url)
            .json(&SubmitBody {
                request,
                algorithm,
                mail,
            })
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let data: SubmitResponse = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(JobId::new(data.algo_id))
    }

    async fn status(&self, id: &JobId) -> Result<RemoteStatus, TransportError> {
        let url = self.endpoint(&["status", id.as_str()])?;
        debug!(%url, "Polling remote job");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let data: WireStatus = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(data.into())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: &str) -> RemoteStatus {
        serde_json::from_str::<WireStatus>(body).unwrap().into()
    }

    #[test]
    fn test_bare_status() {
        assert_eq!(parse(r#""running""#), RemoteStatus::Status("running".into()));
    }

    #[test]
    fn test_detailed_status() {
        let status = parse(r#"{"status": "completed", "perf": {"sharpe": 1.1}, "log": "line"}"#);
        assert_eq!(
            status,
            RemoteStatus::Detailed {
                status: "completed".into(),
                result: Some(PerformanceReport::new(json!({"sharpe": 1.1}))),
                log: Some("line".into()),
            }
        );
    }

    #[test]
    fn test_detailed_status_without_result() {
        let status = parse(r#"{"status": "running", "perf": null, "log": "warming up"}"#);
        assert_eq!(
            status,
            RemoteStatus::Detailed {
                status: "running".into(),
                result: None,
                log: Some("warming up".into()),
            }
        );
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let transport = HttpTransport::new("http://backend/api/", None).unwrap();
        assert_eq!(
            transport.endpoint(&["backtest"]).unwrap().as_str(),
            "http://backend/api/backtest"
        );
    }

    #[test]
    fn test_job_id_is_one_path_segment() {
        let transport = HttpTransport::new("http://backend/api", None).unwrap();
        let url = transport.endpoint(&["status", "a/b?c#d"]).unwrap();
        assert_eq!(url.as_str(), "http://backend/api/status/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpTransport::new("not a url", None),
            Err(TransportError::Configuration(_))
        ));
        assert!(matches!(
            HttpTransport::new("mailto:ops@example.com", None),
            Err(TransportError::Configuration(_))
        ));
    }
}

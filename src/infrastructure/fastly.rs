//! Fastly configuration API client
//!
//! Blocking HTTP implementation of [`ConfigApi`]. Requests are authenticated
//! with the `Fastly-Key` header and write operations send form-encoded bodies.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, trace};

use crate::config::ClientConfig;
use crate::domain::{Dictionary, DictionaryItem, ServiceVersion, ValidationResult};
use crate::infrastructure::traits::{ApiError, ApiResult, ConfigApi};

const AUTH_HEADER: &str = "fastly-key";

/// Stateless client for the Fastly API.
#[derive(Debug, Clone)]
pub struct FastlyClient {
    http: Client,
    endpoint: Url,
}

/// Error body shape used by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValidateBody {
    status: String,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

impl From<ValidateBody> for ValidationResult {
    fn from(body: ValidateBody) -> Self {
        if body.status == "ok" {
            return ValidationResult {
                valid: true,
                message: body.msg.unwrap_or_default(),
            };
        }
        let message = match body.msg {
            Some(msg) if !msg.is_empty() => msg,
            _ => body
                .errors
                .iter()
                .map(|e| match e {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; "),
        };
        ValidationResult::invalid(message)
    }
}

impl FastlyClient {
    /// Create a client from the token and endpoint in `config`.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        if config.token.trim().is_empty() {
            return Err(ApiError::MissingToken);
        }

        let endpoint = Url::parse(&config.endpoint).map_err(|e| ApiError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            message: e.to_string(),
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(ApiError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                message: "not a base URL".into(),
            });
        }

        let mut key = HeaderValue::from_str(&config.token).map_err(|_| ApiError::InvalidToken)?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(AUTH_HEADER), key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        debug!("FastlyClient: endpoint={}", endpoint);
        Ok(Self { http, endpoint })
    }

    /// Endpoint URL with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;
        trace!("response: status={} body={}", status, text);

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                message: error_message(&text, status),
            });
        }
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: error_message(&text, status),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Human-readable message from an error response body.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(ErrorBody { msg, detail }) = serde_json::from_str::<ErrorBody>(body) {
        match (msg, detail) {
            (Some(m), Some(d)) if !d.is_empty() => return format!("{m}: {d}"),
            (Some(m), _) => return m,
            (None, Some(d)) => return d,
            (None, None) => {}
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

impl ConfigApi for FastlyClient {
    #[instrument(skip(self))]
    fn latest_version(&self, service_id: &str) -> ApiResult<ServiceVersion> {
        let url = self.url(&["service", service_id, "version"]);
        let versions: Vec<ServiceVersion> = self.send(self.http.get(url))?;
        debug!("latest_version: {} versions listed", versions.len());
        versions
            .into_iter()
            .max_by_key(|v| v.number)
            .ok_or_else(|| ApiError::NotFound {
                message: format!("service {service_id} has no versions"),
            })
    }

    #[instrument(skip(self))]
    fn get_dictionary(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<Dictionary> {
        let version = version.to_string();
        let url = self.url(&["service", service_id, "version", &version, "dictionary", name]);
        self.send(self.http.get(url))
    }

    #[instrument(skip(self))]
    fn clone_version(&self, service_id: &str, version: u32) -> ApiResult<ServiceVersion> {
        let version = version.to_string();
        let url = self.url(&["service", service_id, "version", &version, "clone"]);
        self.send(self.http.put(url))
    }

    #[instrument(skip(self))]
    fn create_dictionary(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<Dictionary> {
        let version = version.to_string();
        let url = self.url(&["service", service_id, "version", &version, "dictionary"]);
        self.send(self.http.post(url).form(&[("name", name)]))
    }

    #[instrument(skip(self))]
    fn validate_version(&self, service_id: &str, version: u32) -> ApiResult<ValidationResult> {
        let version = version.to_string();
        let url = self.url(&["service", service_id, "version", &version, "validate"]);
        let body: ValidateBody = self.send(self.http.get(url))?;
        Ok(body.into())
    }

    #[instrument(skip(self))]
    fn activate_version(&self, service_id: &str, version: u32) -> ApiResult<ServiceVersion> {
        let version = version.to_string();
        let url = self.url(&["service", service_id, "version", &version, "activate"]);
        self.send(self.http.put(url))
    }

    #[instrument(skip(self, value))]
    fn create_dictionary_item(
        &self,
        service_id: &str,
        dictionary_id: &str,
        key: &str,
        value: &str,
    ) -> ApiResult<DictionaryItem> {
        let url = self.url(&["service", service_id, "dictionary", dictionary_id, "item"]);
        self.send(
            self.http
                .post(url)
                .form(&[("item_key", key), ("item_value", value)]),
        )
    }
}

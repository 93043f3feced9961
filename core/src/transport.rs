//! Network execution of `HttpRequest` values.
//!
//! # Design
//! `Transport` is the seam between the pure build/parse core and real I/O.
//! `ReqwestTransport` builds its two clients once: one shares a cookie jar so
//! requests marked `Credentials::Include` carry the session cookie, the other
//! has no cookie store at all. Non-2xx statuses come back as data; only
//! failures to complete the exchange become `ApiError::NetworkError`.

use std::future::Future;
use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::{Method, Url};

use crate::error::ApiError;
use crate::http::{Credentials, HttpMethod, HttpRequest, HttpResponse};

/// Executes one request and returns the raw response.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

/// `Transport` backed by `reqwest` with a shared cookie jar.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    with_credentials: reqwest::Client,
    anonymous: reqwest::Client,
    jar: Arc<Jar>,
}

impl ReqwestTransport {
    /// Transport with an empty cookie jar. Cookies set by the backend are
    /// kept and replayed on later `Credentials::Include` requests.
    pub fn new() -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());
        let with_credentials = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| ApiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        let anonymous = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            with_credentials,
            anonymous,
            jar,
        })
    }

    /// Store a `Set-Cookie`-style value (e.g. `session=abc`) for `url`.
    pub fn add_session_cookie(&self, cookie: &str, url: &str) -> Result<(), ApiError> {
        let url = Url::parse(url).map_err(|e| ApiError::InvalidInput(format!("invalid cookie url {url}: {e}")))?;
        self.jar.add_cookie_str(cookie, &url);
        Ok(())
    }

    fn client_for(&self, credentials: Credentials) -> &reqwest::Client {
        match credentials {
            Credentials::Include => &self.with_credentials,
            Credentials::Omit => &self.anonymous,
        }
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
        };
        tracing::debug!(method = request.method.as_str(), path = %request.path, "sending request");

        let mut builder = self
            .client_for(request.credentials)
            .request(method, request.path.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;
        tracing::debug!(status, "response received");

        Ok(HttpResponse { status, headers, body })
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ClientSettings;
use crate::error::{ChatError, TransportError};

use super::{DynHttpTransport, HttpRequest, HttpResponse, HttpTransport};

/// Default [`HttpTransport`] backed by reqwest.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Wraps a caller-configured reqwest client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client whose requests are bounded by `settings.timeout`.
    pub fn with_settings(settings: &ClientSettings) -> Result<Self, ChatError> {
        Client::builder()
            .timeout(settings.timeout)
            .build()
            .map(Self::new)
            .map_err(|err| {
                ChatError::configuration(format!("failed to create reqwest client: {err}"))
            })
    }

    fn build_request(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder, TransportError> {
        let HttpRequest { url, headers, body } = request;
        let mut builder = self.client.post(&url);

        for (name, value) in headers {
            let header_name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| TransportError::new(format!("invalid header name: {err}")))?;
            let header_value = reqwest::header::HeaderValue::from_str(&value).map_err(|err| {
                TransportError::new(format!("invalid header value for {header_name}: {err}"))
            })?;
            builder = builder.header(header_name, header_value);
        }

        Ok(builder.body(body))
    }

    fn headers_to_map(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(url = %request.url, bytes = request.body.len(), "sending request");
        let response = self
            .build_request(request)?
            .send()
            .await
            .map_err(|err| TransportError::new(describe(&err)))?;

        let status = response.status().as_u16();
        let headers = Self::headers_to_map(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::new(describe(&err)))?
            .to_vec();
        debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    }
}

/// Convenience constructor for a shared transport.
pub fn default_dyn_transport(settings: &ClientSettings) -> Result<DynHttpTransport, ChatError> {
    Ok(Arc::new(ReqwestTransport::with_settings(settings)?))
}

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AssistantsConfig;
use crate::error::{parse_api_error, AssistantsError};

pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_OPENAI_BETA: &str = "openai-beta";

/// Beta opt-in value required by every assistants endpoint.
pub const BETA_HEADER_VALUE: &str = "assistants=v2";

/// HTTP client for the assistants API.
///
/// Stateless beyond its configuration; resource operations live in the
/// per-resource modules as `impl AssistantsClient` blocks.
#[derive(Debug)]
pub struct AssistantsClient {
    http: Client,
    config: AssistantsConfig,
}

impl AssistantsClient {
    pub fn new(config: AssistantsConfig) -> Result<Self, AssistantsError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(AssistantsError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &AssistantsConfig {
        &self.config
    }

    pub fn endpoint(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    /// Build the deterministic header map sent with every request.
    ///
    /// Streaming opens additionally accept `text/event-stream`.
    pub fn build_headers(&self, streaming: bool) -> Result<HeaderMap, AssistantsError> {
        if self.config.api_key.trim().is_empty() {
            return Err(AssistantsError::MissingApiKey);
        }

        let mut headers = BTreeMap::new();
        headers.insert(
            HEADER_AUTHORIZATION.to_owned(),
            format!("Bearer {}", self.config.api_key.trim()),
        );
        headers.insert(HEADER_OPENAI_BETA.to_owned(), BETA_HEADER_VALUE.to_owned());
        headers.insert(
            HEADER_CONTENT_TYPE.to_owned(),
            "application/json".to_owned(),
        );
        if streaming {
            headers.insert(HEADER_ACCEPT.to_owned(), "text/event-stream".to_owned());
        }
        for (key, value) in &self.config.extra_headers {
            headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
        }

        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| AssistantsError::InvalidHeader(format!("invalid key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    AssistantsError::InvalidHeader(format!("invalid value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, AssistantsError> {
        let headers = self.build_headers(false)?;
        Ok(self
            .http
            .request(method, self.endpoint(path))
            .headers(headers))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, AssistantsError> {
        let response = self.request(Method::GET, path)?.send().await?;
        decode_response(response).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, AssistantsError> {
        let mut request = self.request(Method::POST, path)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        decode_response(response).await
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, AssistantsError> {
        let response = self.request(Method::DELETE, path)?.send().await?;
        decode_response(response).await
    }

    /// Open a streaming POST and confirm success before any bytes are handed
    /// to the SSE decoder. A non-success status surfaces as a structured API
    /// error and the stream is never opened.
    pub(crate) async fn open_stream<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, AssistantsError> {
        let headers = self.build_headers(true)?;
        let response = self
            .http
            .post(self.endpoint(path))
            .headers(headers)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_api_error(status, &body));
        }
        Ok(response)
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, AssistantsError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(parse_api_error(status, &String::from_utf8_lossy(&body)));
    }

    serde_json::from_slice(&body).map_err(AssistantsError::from)
}

//! HTTP adapter for the FinanceFit backend.
//!
//! Attaches the bearer token found in [`SessionStorage`], logs every request
//! and classifies failures. It never touches the session itself: a rejected
//! token comes back as [`ApiError::Auth`] and the caller decides what to do.
use std::{sync::Arc, time::Duration};

use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::storage::{SessionStorage, keys};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered 401: token missing, expired or credentials wrong.
    #[error("authentication rejected")]
    Auth { message: Option<String> },
    #[error("{status}: {}", .message.as_deref().unwrap_or("server error"))]
    Api {
        status: StatusCode,
        message: Option<String>,
    },
    /// The request left but no response came back.
    #[error("network error: {0}")]
    Network(reqwest::Error),
    /// The request could not be built.
    #[error("invalid request: {0}")]
    Config(String),
    #[error("invalid response body: {0}")]
    Decode(reqwest::Error),
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// HTTP status of the response, when there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Auth { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Api { status, .. } => Some(*status),
            Self::Network(_) | Self::Config(_) | Self::Decode(_) => None,
        }
    }

    /// Message sent by the server in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Auth { message } | Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    storage: Arc<dyn SessionStorage>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the endpoint URL; every segment is percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("invalid base_url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<TReq>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&TReq>,
    ) -> Result<reqwest::Response, ApiError>
    where
        TReq: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let token = self.storage.get(keys::TOKEN).filter(|t| !t.is_empty());

        tracing::debug!(
            %method,
            %url,
            authenticated = token.is_some(),
            "api request"
        );

        let mut req = self.client.request(method.clone(), url.clone());
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(err) => {
                let err = ApiError::from_transport(err);
                tracing::error!(%method, %url, "no response from server: {err}");
                return Err(err);
            }
        };

        let status = resp.status();
        tracing::debug!(%method, %url, %status, "api response");
        if status.is_success() {
            return Ok(resp);
        }

        let message = resp.json::<ErrorBody>().await.ok().and_then(|body| {
            body.message
                .or(body.error)
                .filter(|message| !message.is_empty())
        });
        tracing::warn!(
            %method,
            %url,
            %status,
            message = message.as_deref().unwrap_or_default(),
            "api error response"
        );

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Auth { message });
        }
        Err(ApiError::Api { status, message })
    }

    /// Sends a request and decodes the JSON response.
    pub async fn send<TReq, TResp>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&TReq>,
    ) -> Result<TResp, ApiError>
    where
        TReq: Serialize + ?Sized,
        TResp: DeserializeOwned,
    {
        let resp = self.execute(method, segments, body).await?;
        resp.json::<TResp>().await.map_err(ApiError::Decode)
    }

    /// Sends a request whose response body is irrelevant.
    pub async fn send_unit<TReq>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&TReq>,
    ) -> Result<(), ApiError>
    where
        TReq: Serialize + ?Sized,
    {
        self.execute(method, segments, body).await.map(|_| ())
    }

    pub async fn get<TResp: DeserializeOwned>(&self, segments: &[&str]) -> Result<TResp, ApiError> {
        self.send::<(), TResp>(Method::GET, segments, None).await
    }

    pub async fn post<TReq, TResp>(&self, segments: &[&str], body: &TReq) -> Result<TResp, ApiError>
    where
        TReq: Serialize + ?Sized,
        TResp: DeserializeOwned,
    {
        self.send(Method::POST, segments, Some(body)).await
    }

    pub async fn put<TReq, TResp>(&self, segments: &[&str], body: &TReq) -> Result<TResp, ApiError>
    where
        TReq: Serialize + ?Sized,
        TResp: DeserializeOwned,
    {
        self.send(Method::PUT, segments, Some(body)).await
    }

    pub async fn patch<TReq, TResp>(&self, segments: &[&str], body: &TReq) -> Result<TResp, ApiError>
    where
        TReq: Serialize + ?Sized,
        TResp: DeserializeOwned,
    {
        self.send(Method::PATCH, segments, Some(body)).await
    }

    pub async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        self.send_unit::<()>(Method::DELETE, segments, None).await
    }
}

#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    storage: Option<Arc<dyn SessionStorage>>,
}

impl ApiClientBuilder {
    pub fn base_url(mut self, base_url: &str) -> ApiClientBuilder {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> ApiClientBuilder {
        self.timeout = Some(timeout);
        self
    }

    pub fn storage(mut self, storage: Arc<dyn SessionStorage>) -> ApiClientBuilder {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> Result<ApiClient, ApiError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url =
            Url::parse(raw).map_err(|err| ApiError::Config(format!("invalid base_url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!("invalid base_url: {raw}")));
        }

        let storage = self
            .storage
            .ok_or_else(|| ApiError::Config("missing session storage".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|err| ApiError::Config(format!("failed to build http client: {err}")))?;

        tracing::debug!(%base_url, "api client ready");
        Ok(ApiClient {
            client,
            base_url,
            storage,
        })
    }
}

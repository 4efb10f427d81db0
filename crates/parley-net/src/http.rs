//! Thin reqwest wrapper that speaks the response envelope.
//!
//! Every call goes through [`ApiClient::request`], which attaches the bearer
//! token from the [`SessionStore`], sends the JSON body and decodes the reply
//! through [`Envelope`]. Transport failures become `ErrorKind::Network`.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use parley_shared::envelope::Envelope;
use parley_shared::error::{ApiError, ApiResult, ErrorKind};
use parley_store::SessionStore;

/// Whether a request carries the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Bearer,
    Anonymous,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: SessionStore,
}

impl ApiClient {
    /// `base_url` is the REST root, e.g. `https://chat.example.com/api`.
    pub fn new(base_url: &str, session: SessionStore) -> Result<Self, url::ParseError> {
        Ok(Self::with_client(
            reqwest::Client::new(),
            parse_base(base_url)?,
            session,
        ))
    }

    pub fn with_client(http: reqwest::Client, base: Url, session: SessionStore) -> Self {
        Self {
            http,
            base,
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request::<(), T>(Method::GET, path, None, Auth::Bearer)
            .await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body), Auth::Bearer)
            .await
    }

    /// POST without a token, for the sign-in / sign-up flows.
    pub async fn post_anonymous<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body), Auth::Anonymous)
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body), Auth::Bearer)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request::<(), T>(Method::DELETE, path, None, Auth::Bearer)
            .await
    }

    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: Auth,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::new(ErrorKind::Unknown, format!("invalid path {path}: {e}")))?;

        let mut req = self.http.request(method.clone(), url);
        if auth == Auth::Bearer {
            req = req.bearer_auth(self.session.token()?);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "request failed");
            ApiError::network(e.to_string())
        })?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;

        let result = decode_response(status, &text);
        if let Err(ref e) = result {
            debug!(%method, path, status, kind = ?e.kind, "request rejected");
        }
        result
    }
}

/// Make sure relative joins land under the base path.
fn parse_base(base_url: &str) -> Result<Url, url::ParseError> {
    let trimmed = base_url.trim_end_matches('/');
    Url::parse(&format!("{trimmed}/"))
}

/// Decode a response body, falling back to the HTTP status when the body is
/// not an envelope.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<T> {
    let success = (200..300).contains(&status);
    let body = match body.trim() {
        "" if success => r#"{"data":null}"#,
        "" => return Err(ApiError::from_kind(ErrorKind::from_status(status))),
        _ => body,
    };

    match serde_json::from_str::<Envelope<T>>(body) {
        Ok(Envelope::Success { .. }) if !success => {
            Err(ApiError::from_kind(ErrorKind::from_status(status)))
        }
        Ok(envelope) => envelope.into_result(),
        Err(_) if !success => Err(ApiError::from_kind(ErrorKind::from_status(status))),
        Err(e) => Err(ApiError::new(
            ErrorKind::Unknown,
            format!("malformed response: {e}"),
        )),
    }
}

//! HTTP session and request dispatch.
//!
//! A [`Session`] owns the connection pool used for every call against one
//! service. The pool is created lazily on the first request and released by
//! [`Session::close`]; a later request opens a fresh one. The access token
//! is read at request-build time, so replacing it affects only requests
//! issued afterwards.

use std::sync::{Mutex, PoisonError, RwLock};

use bytes::Bytes;
use reqwest::header::{HeaderValue, CONTENT_TYPE, RANGE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::range::ByteRange;
use crate::config::ClientConfig;
use crate::error::{GalleryError, Result};

/// Header carrying the access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";

/// Request body variants.
#[derive(Debug, Default)]
pub enum Payload {
    /// No body.
    #[default]
    Empty,
    /// JSON body.
    Json(Value),
    /// `multipart/form-data` body.
    Multipart(Form),
}

/// A successful response body, resolved once from its content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// `application/json`.
    Json(Value),
    /// Any `text/*` type.
    Text(String),
    /// Everything else.
    Bytes(Bytes),
}

impl ResponseBody {
    /// Interpret the body as JSON.
    ///
    /// Text and byte bodies are parsed; an empty body is `null`.
    pub fn into_json(self) -> Result<Value> {
        match self {
            ResponseBody::Json(value) => Ok(value),
            ResponseBody::Text(text) => parse_json(text.as_bytes()),
            ResponseBody::Bytes(bytes) => parse_json(&bytes),
        }
    }

    /// Interpret the body as text. A JSON string is unwrapped.
    pub fn into_text(self) -> String {
        match self {
            ResponseBody::Json(Value::String(s)) => s,
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Text(text) => text,
            ResponseBody::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Interpret the body as raw bytes.
    pub fn into_bytes(self) -> Bytes {
        match self {
            ResponseBody::Json(value) => Bytes::from(value.to_string()),
            ResponseBody::Text(text) => Bytes::from(text),
            ResponseBody::Bytes(bytes) => bytes,
        }
    }
}

fn parse_json(bytes: &[u8]) -> Result<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// Connection pool, base URL and access token for one service.
#[derive(Debug)]
pub struct Session {
    base_url: String,
    user_agent: String,
    token: RwLock<Option<HeaderValue>>,
    pool: Mutex<Option<Client>>,
}

impl Session {
    /// Create a session. No connection is made until the first request.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.normalized_base_url()?;
        let token = config.access_token.as_deref().map(token_header).transpose()?;

        Ok(Self {
            base_url,
            user_agent: config.user_agent.clone(),
            token: RwLock::new(token),
            pool: Mutex::new(None),
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Replace the access token. `None` or an empty string removes it.
    pub fn set_access_token(&self, token: Option<&str>) -> Result<()> {
        let header = token
            .filter(|t| !t.is_empty())
            .map(token_header)
            .transpose()?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = header;
        debug!(has_token = self.has_access_token(), "Access token updated");
        Ok(())
    }

    /// Whether a token is attached to outgoing requests.
    pub fn has_access_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Open the connection pool if it is not open yet.
    pub fn open(&self) -> Result<()> {
        self.http().map(|_| ())
    }

    /// Whether the connection pool is currently open.
    pub fn is_open(&self) -> bool {
        self.pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Release the connection pool. Safe to call repeatedly.
    ///
    /// Requests already in flight keep their own handle to the pool and
    /// finish normally.
    pub fn close(&self) {
        let pool = self
            .pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if pool.is_some() {
            debug!(base_url = %self.base_url, "Closed HTTP session");
        }
    }

    /// Handle to the pool, creating it on first use.
    fn http(&self) -> Result<Client> {
        let mut pool = self.pool.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = pool.as_ref() {
            return Ok(client.clone());
        }

        let client = Client::builder().user_agent(&self.user_agent).build()?;
        debug!(base_url = %self.base_url, "Opened HTTP session");
        *pool = Some(client.clone());
        Ok(client)
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        range: Option<ByteRange>,
    ) -> Result<RequestBuilder> {
        let mut request = self.http()?.request(method, self.url(path));

        if let Some(token) = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            request = request.header(ACCESS_TOKEN_HEADER, token);
        }

        if let Some(range) = range {
            request = request.header(RANGE, range.header_value());
        }

        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(&body),
            Payload::Multipart(form) => request.multipart(form),
        };

        Ok(request)
    }

    /// Send a request and check its status.
    ///
    /// Returns the unread response so callers can stream the body.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        range: Option<ByteRange>,
    ) -> Result<Response> {
        debug!("{} {}", method, path);
        let response = self.build(method, path, payload, range)?.send().await?;
        check_status(path, response).await
    }

    /// Send a request and decode the body by its content type.
    pub async fn request(&self, method: Method, path: &str, payload: Payload) -> Result<ResponseBody> {
        let response = self.send(method, path, payload, None).await?;
        decode_body(response).await
    }
}

fn token_header(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(token)
        .map_err(|_| GalleryError::InvalidToken("token contains characters not allowed in a header".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Map 401, 404 and other failures to their error kinds.
async fn check_status(path: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => {
            warn!(path = %path, "Unauthorized");
            Err(GalleryError::Unauthorized(path.to_string()))
        }
        StatusCode::NOT_FOUND => Err(GalleryError::NotFound(path.to_string())),
        status => {
            let message = response.text().await.unwrap_or_default();
            warn!(path = %path, status = status.as_u16(), "Request failed");
            Err(GalleryError::Http {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Resolve the body once into JSON, text or bytes.
async fn decode_body(response: Response) -> Result<ResponseBody> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_default();

    match BodyKind::from_content_type(&content_type) {
        BodyKind::Json => {
            let bytes = response.bytes().await?;
            Ok(ResponseBody::Json(parse_json(&bytes)?))
        }
        BodyKind::Text => Ok(ResponseBody::Text(response.text().await?)),
        BodyKind::Bytes => Ok(ResponseBody::Bytes(response.bytes().await?)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Text,
    Bytes,
}

impl BodyKind {
    fn from_content_type(content_type: &str) -> Self {
        let essence = content_type.split(';').next().unwrap_or("").trim();
        if essence == "application/json" || essence.ends_with("+json") {
            BodyKind::Json
        } else if essence.starts_with("text/") {
            BodyKind::Text
        } else {
            BodyKind::Bytes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(base_url: &str) -> Session {
        Session::new(&ClientConfig::new(base_url)).unwrap()
    }

    #[test]
    fn test_body_kind() {
        assert_eq!(
            BodyKind::from_content_type("application/json; charset=utf-8"),
            BodyKind::Json
        );
        assert_eq!(BodyKind::from_content_type("application/problem+json"), BodyKind::Json);
        assert_eq!(BodyKind::from_content_type("text/plain"), BodyKind::Text);
        assert_eq!(BodyKind::from_content_type("image/jpeg"), BodyKind::Bytes);
        assert_eq!(BodyKind::from_content_type(""), BodyKind::Bytes);
    }

    #[test]
    fn test_url_join() {
        let s = session("http://localhost:5000/");
        assert_eq!(s.url("api/albums"), "http://localhost:5000/api/albums");
        assert_eq!(s.url("/api/albums"), "http://localhost:5000/api/albums");
    }

    #[test]
    fn test_lazy_open_and_close() {
        let s = session("http://localhost:5000");
        assert!(!s.is_open());
        s.open().unwrap();
        assert!(s.is_open());
        s.close();
        assert!(!s.is_open());
        s.close();
        assert!(!s.is_open());
    }

    #[test]
    fn test_set_access_token() {
        let s = session("http://localhost:5000");
        assert!(!s.has_access_token());
        s.set_access_token(Some("abc")).unwrap();
        assert!(s.has_access_token());
        s.set_access_token(Some("")).unwrap();
        assert!(!s.has_access_token());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let s = session("http://localhost:5000");
        assert!(matches!(
            s.set_access_token(Some("bad\ntoken")),
            Err(GalleryError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_response_body_conversions() {
        assert_eq!(ResponseBody::Json(json!("1.2.0")).into_text(), "1.2.0");
        assert_eq!(ResponseBody::Text("1.2.0".into()).into_text(), "1.2.0");
        assert_eq!(
            ResponseBody::Text("[1,2]".into()).into_json().unwrap(),
            json!([1, 2])
        );
        assert_eq!(ResponseBody::Bytes(Bytes::new()).into_json().unwrap(), Value::Null);
        assert_eq!(
            ResponseBody::Text("abc".into()).into_bytes(),
            Bytes::from_static(b"abc")
        );
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = ResponseBody::Text("{oops".into()).into_json();
        assert!(matches!(result, Err(GalleryError::ParseError(_))));
    }
}

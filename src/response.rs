//! The outcome of a sent request, with lazy and cached body decoding.
//!
//! A [`Response`] is returned whether or not the request succeeded. The body is
//! read from the transport at most once, the first time one of
//! [`bytes`](Response::bytes), [`text`](Response::text) or
//! [`json`](Response::json) is called; every later call returns the cached
//! outcome.

use crate::{transport::ResponseBody, transport::TransportResponse, Error, Result};
use bytes::Bytes;
use cookie::Cookie;
use http::header::SET_COOKIE;
use http::response::Parts;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio::sync::{Mutex, OnceCell};

/// The result of executing a request.
///
/// Accessors never fail: when no response was received they return empty
/// values (`""`, `0`, an empty header map, no cookies) and the reason is
/// available from [`error`](Response::error).
///
/// A status other than `200 OK` is turned into [`Error::HttpError`] only when
/// the body is materialized. Callers that only look at
/// [`status_code`](Response::status_code) never see that error.
///
/// `Response` is `Send + Sync`; when several tasks decode the same response
/// concurrently, exactly one of them reads the body.
///
/// # Examples
///
/// ```no_run
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// # async fn example() -> Result<(), fluent_http::Error> {
/// let response = fluent_http::get("https://api.example.com/users/123").send().await;
///
/// println!("Status: {}", response.status());
/// if let Some(session) = response.cookie("session") {
///     println!("Session: {}", session.value());
/// }
///
/// let user: User = response.json().await?;
/// println!("User: {}", user.name);
///
/// // Already materialized, served from the cache
/// let raw = response.text().await?;
/// println!("Raw body: {raw}");
/// # Ok(())
/// # }
/// ```
pub struct Response {
    head: Option<Parts>,
    error: Option<Error>,
    body: Mutex<Option<Box<dyn ResponseBody>>>,
    materialized: OnceCell<Result<Bytes>>,
}

impl Response {
    pub(crate) fn from_transport(response: TransportResponse) -> Self {
        let (head, body) = response.into_parts();
        Self {
            head: Some(head),
            error: None,
            body: Mutex::new(Some(body)),
            materialized: OnceCell::new(),
        }
    }

    pub(crate) fn from_error(error: Error) -> Self {
        Self {
            head: None,
            error: Some(error),
            body: Mutex::new(None),
            materialized: OnceCell::new(),
        }
    }

    /// The error recorded for this response.
    ///
    /// Before the body is materialized this is the configuration or send
    /// error. Afterwards a body read error or the `HttpError` for a status
    /// other than `200 OK` shows up here as well.
    pub fn error(&self) -> Option<&Error> {
        self.error
            .as_ref()
            .or_else(|| self.materialized.get().and_then(|result| result.as_ref().err()))
    }

    /// The raw response head (status, version, headers, extensions).
    ///
    /// `None` if the request failed before a response was received.
    pub fn raw(&self) -> Option<&Parts> {
        self.head.as_ref()
    }

    /// Gives back the transport response, body stream included.
    ///
    /// Returns `None` if no response was received or if the body has already
    /// been materialized.
    pub fn into_raw(self) -> Option<TransportResponse> {
        let head = self.head?;
        let body = self.body.into_inner()?;
        Some(http::Response::from_parts(head, body))
    }

    /// The response headers, or an empty map.
    pub fn headers(&self) -> &HeaderMap {
        static EMPTY: OnceLock<HeaderMap> = OnceLock::new();
        match &self.head {
            Some(head) => &head.headers,
            None => EMPTY.get_or_init(HeaderMap::new),
        }
    }

    /// Returns a header value as text, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name)?.to_str().ok()
    }

    /// The status line, e.g. `"200 OK"`, or `""` without a response.
    pub fn status(&self) -> String {
        self.head
            .as_ref()
            .map(|head| status_line(head.status))
            .unwrap_or_default()
    }

    /// The numeric status code, or `0` without a response.
    pub fn status_code(&self) -> u16 {
        self.head
            .as_ref()
            .map(|head| head.status.as_u16())
            .unwrap_or(0)
    }

    /// Cookies set by the response through `Set-Cookie` headers.
    ///
    /// Headers that fail to parse are skipped.
    pub fn cookies(&self) -> Vec<Cookie<'static>> {
        self.headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| Cookie::parse(value.to_owned()).ok())
            .collect()
    }

    /// The first cookie named `name`.
    pub fn cookie(&self, name: &str) -> Option<Cookie<'static>> {
        self.cookies().into_iter().find(|cookie| cookie.name() == name)
    }

    /// The response body.
    ///
    /// # Errors
    ///
    /// Returns the send error if there is one, otherwise a body read error,
    /// otherwise [`Error::HttpError`] when the status is not `200 OK`.
    pub async fn bytes(&self) -> Result<Bytes> {
        self.materialized
            .get_or_init(|| self.materialize())
            .await
            .clone()
    }

    /// The response body as text. Invalid UTF-8 is replaced.
    ///
    /// On error the raw body, if one was read, is still available from
    /// [`Error::raw_response`]. A body whose read failed part way is not kept:
    /// [`ResponseBody::read_to_end`] yields either the whole body or an error,
    /// so [`Error::BodyRead`] carries no data.
    pub async fn text(&self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Deserializes the response body from JSON.
    pub async fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            let raw_response = String::from_utf8_lossy(&bytes).into_owned();
            tracing::error!(
                error = %e,
                raw_response = %raw_response,
                "Failed to deserialize response"
            );
            Error::DeserializationFailed {
                raw_response,
                serde_error: e.to_string(),
                status: self.head.as_ref().map(|head| head.status).unwrap_or(StatusCode::OK),
            }
        })
    }

    async fn materialize(&self) -> Result<Bytes> {
        let mut error = self.error.clone();
        let mut data = Bytes::new();

        let body = self.body.lock().await.take();
        if let Some(body) = body {
            match body.read_to_end().await {
                Ok(bytes) => {
                    tracing::debug!(bytes = bytes.len(), "Materialized response body");
                    data = bytes;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read response body");
                    if error.is_none() {
                        error = Some(Error::BodyRead(Arc::from(e)));
                    }
                }
            }
        }

        if let Some(error) = error {
            return Err(error);
        }

        match &self.head {
            Some(head) if head.status != StatusCode::OK => {
                let raw_response = String::from_utf8_lossy(&data).into_owned();
                if head.status.is_client_error() {
                    tracing::error!(
                        status = head.status.as_u16(),
                        response = %raw_response,
                        "Client error (4xx)"
                    );
                } else if head.status.is_server_error() {
                    tracing::warn!(
                        status = head.status.as_u16(),
                        response = %raw_response,
                        "Server error (5xx)"
                    );
                }
                Err(Error::HttpError {
                    status: head.status,
                    status_line: status_line(head.status),
                    raw_response,
                    headers: head.headers.clone(),
                })
            }
            _ => Ok(data),
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("head", &self.head)
            .field("error", &self.error)
            .field("materialized", &self.materialized.initialized())
            .finish()
    }
}

/// Formats a status the way it appears on an HTTP/1.1 status line.
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_str(), reason),
        None => status.as_str().to_string(),
    }
}

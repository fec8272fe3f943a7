//! Fluent request configuration.
//!
//! Configuration never fails on the spot. The first problem (a bad URL, an
//! invalid header, a value that won't serialize) is recorded and returned by
//! [`RequestBuilder::send`] inside the [`Response`], so a whole chain can be
//! written without intermediate error checks.

use crate::{
    transport::{Request, RequestBody, Transport},
    Error, Response, Result,
};
use bytes::Bytes;
use cookie::Cookie;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// `Content-Type` of URL-encoded form bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// `Content-Type` of JSON bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// A request being configured.
///
/// Created by [`Client::request`](crate::Client::request) or one of the
/// method shortcuts, configured by chaining, and consumed by
/// [`send`](RequestBuilder::send).
///
/// # Examples
///
/// ```no_run
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct NewUser {
///     name: String,
/// }
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
/// }
///
/// # async fn example() -> Result<(), fluent_http::Error> {
/// let user: User = fluent_http::post("https://api.example.com/users")
///     .query("notify", "true")
///     .header("x-request-id", "42")
///     .json(&NewUser { name: "Alice".to_string() })
///     .send()
///     .await
///     .json()
///     .await?;
/// println!("Created user {}", user.id);
/// # Ok(())
/// # }
/// ```
#[must_use = "a request does nothing until it is sent"]
pub struct RequestBuilder {
    transport: Arc<dyn Transport>,
    method: Method,
    url: Option<Url>,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
    error: Option<Error>,
}

impl RequestBuilder {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        method: Method,
        url: &str,
        headers: HeaderMap,
    ) -> Self {
        let mut builder = Self {
            transport,
            method,
            url: None,
            headers,
            query: Vec::new(),
            body: None,
            error: None,
        };
        match Url::parse(url) {
            Ok(url) => builder.url = Some(url),
            Err(e) => builder.fail(e.into()),
        }
        builder
    }

    /// Appends a query parameter. Repeated keys are kept, in order.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Adds every field of `value` as a query parameter.
    ///
    /// `value` must serialize to a JSON object. Field values are flattened to
    /// text: strings are used as-is, `null` becomes an empty string, anything
    /// else (numbers, booleans, nested arrays and objects) uses its compact JSON
    /// rendering. Nested structure is not preserved.
    pub fn query_object<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(serde_json::Value::Object(fields)) => {
                for (key, value) in fields {
                    let value = match value {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    self.query.push((key, value));
                }
            }
            Ok(other) => self.fail(Error::SerializationFailed(format!(
                "query parameters must serialize to an object, got {other}"
            ))),
            Err(e) => self.fail(Error::SerializationFailed(e.to_string())),
        }
        self
    }

    /// Sets a header, replacing any existing values for that name.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let Some((name, value)) = self.header_pair(name.as_ref(), value.as_ref()) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Appends a header value, keeping existing values for that name.
    pub fn add_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let Some((name, value)) = self.header_pair(name.as_ref(), value.as_ref()) {
            self.headers.append(name, value);
        }
        self
    }

    /// Removes every value of a header.
    pub fn remove_header(mut self, name: impl AsRef<str>) -> Self {
        self.headers.remove(name.as_ref());
        self
    }

    /// Adds a cookie to the `Cookie` header.
    ///
    /// Only the name and value are sent; attributes such as `Path` are dropped.
    pub fn cookie(mut self, cookie: &Cookie<'_>) -> Self {
        let pair = format!("{}={}", cookie.name(), cookie.value());
        let value = match self.headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
            Some(existing) if !existing.is_empty() => format!("{existing}; {pair}"),
            _ => pair,
        };
        match HeaderValue::try_from(value) {
            Ok(value) => {
                self.headers.insert(COOKIE, value);
            }
            Err(e) => self.fail(Error::ConfigurationError(format!(
                "Invalid cookie {}: {}",
                cookie.name(),
                e
            ))),
        }
        self
    }

    /// Sets the body, overwriting `Content-Type` and `Content-Length` with the
    /// given values.
    pub fn body(
        mut self,
        content_type: impl AsRef<str>,
        length: u64,
        body: impl Into<RequestBody>,
    ) -> Self {
        self.body = Some(body.into());
        match HeaderValue::try_from(content_type.as_ref()) {
            Ok(value) => {
                self.headers.insert(CONTENT_TYPE, value);
            }
            Err(e) => self.fail(Error::ConfigurationError(format!(
                "Invalid content type: {}",
                e
            ))),
        }
        self.headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        self
    }

    /// Sets an in-memory body of the given content type.
    pub fn body_bytes(self, content_type: impl AsRef<str>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let length = bytes.len() as u64;
        self.body(content_type, length, bytes)
    }

    /// Sets a URL-encoded form body from name/value pairs.
    pub fn form<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.body_bytes(FORM_URLENCODED, encoded)
    }

    /// Sets a JSON body.
    ///
    /// A serialization failure is recorded and surfaces when the request is
    /// sent.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body_bytes(APPLICATION_JSON, bytes),
            Err(e) => {
                self.fail(Error::SerializationFailed(e.to_string()));
                self
            }
        }
    }

    /// The HTTP method of this request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The target URL, without the pending query parameters.
    ///
    /// `None` if the URL failed to parse.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// The headers configured so far.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The cookies carried by the `Cookie` header.
    pub fn cookies(&self) -> Vec<Cookie<'static>> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| Cookie::split_parse(value.to_owned()))
            .filter_map(|cookie| cookie.ok())
            .map(Cookie::into_owned)
            .collect()
    }

    /// The first configuration error, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Freezes the configuration into a [`Request`].
    ///
    /// Query parameters are appended to the URL: after `?` when the URL has no
    /// query string, after `&` otherwise. Nothing is appended when no
    /// parameters were added.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error recorded on this builder.
    pub fn build(self) -> Result<Request> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let mut url = self
            .url
            .ok_or_else(|| Error::ConfigurationError("URL is required".to_string()))?;

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        Ok(Request::new(self.method, url, self.headers, self.body))
    }

    /// Sends the request.
    ///
    /// If a configuration error was recorded, no request is made and the
    /// returned [`Response`] carries only that error. Transport failures are
    /// carried the same way; nothing here returns early with `Err`.
    pub async fn send(self) -> Response {
        let transport = Arc::clone(&self.transport);

        let request = match self.build() {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "Request not sent, configuration failed");
                return Response::from_error(e);
            }
        };

        let method = request.method().clone();
        let url = request.url().clone();

        tracing::debug!(method = %method, url = %url, "Executing HTTP request");

        let start_time = Instant::now();
        match transport.execute(request).await {
            Ok(response) => {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = start_time.elapsed().as_millis(),
                    "Received HTTP response"
                );
                Response::from_transport(response)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    method = %method,
                    url = %url,
                    "Request failed"
                );
                Response::from_error(e)
            }
        }
    }

    fn header_pair(&mut self, name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
        let name = match HeaderName::try_from(name) {
            Ok(name) => name,
            Err(e) => {
                self.fail(Error::ConfigurationError(format!("Invalid header name: {}", e)));
                return None;
            }
        };
        match HeaderValue::try_from(value) {
            Ok(value) => Some((name, value)),
            Err(e) => {
                self.fail(Error::ConfigurationError(format!("Invalid header value: {}", e)));
                None
            }
        }
    }

    // First error wins.
    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

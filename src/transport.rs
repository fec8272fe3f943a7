//! The boundary between the builder and the HTTP client doing the actual work.
//!
//! A [`Transport`] takes a fully configured [`Request`] and performs one round
//! trip. `reqwest::Client` is the default implementation; anything else (a
//! mock in tests, a client with a custom middleware stack) can be plugged in
//! through [`ClientBuilder::transport`](crate::ClientBuilder::transport).

use crate::error::{BoxError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{BoxStream, Stream, StreamExt};
use http::{HeaderMap, Method};
use std::fmt;
use url::Url;

/// What a transport hands back: the response head plus a one-shot body.
pub type TransportResponse = http::Response<Box<dyn ResponseBody>>;

/// Performs a single HTTP round trip.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use fluent_http::{Request, ResponseBody, Transport, TransportResponse};
///
/// struct Canned;
///
/// #[async_trait]
/// impl Transport for Canned {
///     async fn execute(&self, _request: Request) -> fluent_http::Result<TransportResponse> {
///         let body: Box<dyn ResponseBody> = Box::new(bytes::Bytes::from_static(b"ok"));
///         Ok(http::Response::new(body))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the response head and body, or the
    /// transport-level error.
    async fn execute(&self, request: Request) -> Result<TransportResponse>;
}

/// A response body that can be drained exactly once.
///
/// Consuming `self` means the stream cannot be read twice; it is released when
/// `read_to_end` returns.
#[async_trait]
pub trait ResponseBody: Send {
    /// Reads the whole body into memory.
    async fn read_to_end(self: Box<Self>) -> std::result::Result<Bytes, BoxError>;
}

#[async_trait]
impl ResponseBody for Bytes {
    async fn read_to_end(self: Box<Self>) -> std::result::Result<Bytes, BoxError> {
        Ok(*self)
    }
}

#[async_trait]
impl ResponseBody for reqwest::Response {
    async fn read_to_end(self: Box<Self>) -> std::result::Result<Bytes, BoxError> {
        Ok((*self).bytes().await?)
    }
}

/// An outgoing request body: in-memory bytes or a stream of chunks.
pub struct RequestBody {
    inner: BodyInner,
}

enum BodyInner {
    Bytes(Bytes),
    Stream(BoxStream<'static, std::result::Result<Bytes, BoxError>>),
}

impl RequestBody {
    /// Wraps a stream of byte chunks.
    pub fn wrap_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        Self {
            inner: BodyInner::Stream(stream.map(|chunk| chunk.map_err(Into::into)).boxed()),
        }
    }

    /// Returns the body bytes if the body is held in memory.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match &self.inner {
            BodyInner::Bytes(bytes) => Some(bytes),
            BodyInner::Stream(_) => None,
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            BodyInner::Bytes(bytes) => f.debug_tuple("RequestBody").field(bytes).finish(),
            BodyInner::Stream(_) => f.write_str("RequestBody(<stream>)"),
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self {
            inner: BodyInner::Bytes(bytes),
        }
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

impl From<&'static str> for RequestBody {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}

impl From<&'static [u8]> for RequestBody {
    fn from(bytes: &'static [u8]) -> Self {
        Bytes::from_static(bytes).into()
    }
}

impl From<RequestBody> for reqwest::Body {
    fn from(body: RequestBody) -> Self {
        match body.inner {
            BodyInner::Bytes(bytes) => reqwest::Body::from(bytes),
            BodyInner::Stream(stream) => reqwest::Body::wrap_stream(stream),
        }
    }
}

/// An immutable, fully configured request, ready for a [`Transport`].
///
/// The query parameters collected by the builder are already part of
/// [`url`](Request::url).
#[derive(Debug)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<RequestBody>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<RequestBody>,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The target URL, query string included.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The request body, if one was set.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Splits the request into its parts.
    pub fn into_parts(self) -> (Method, Url, HeaderMap, Option<RequestBody>) {
        (self.method, self.url, self.headers, self.body)
    }
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn execute(&self, request: Request) -> Result<TransportResponse> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = self.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(reqwest::Body::from(body));
        }

        let response = builder.send().await?;

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();

        let mut raw = http::Response::new(Box::new(response) as Box<dyn ResponseBody>);
        *raw.status_mut() = status;
        *raw.version_mut() = version;
        *raw.headers_mut() = headers;
        Ok(raw)
    }
}

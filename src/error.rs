//! Error types for building, sending and decoding requests.
//!
//! Every failure is returned as a value. Configuration failures are recorded on
//! the [`RequestBuilder`](crate::RequestBuilder) and surfaced by
//! [`send`](crate::RequestBuilder::send); response failures are cached on the
//! [`Response`](crate::Response) and handed out on every decode call, which is
//! why [`Error`] is `Clone`.

use http::{HeaderMap, StatusCode};
use std::sync::Arc;

/// A boxed error as reported by a transport or a body stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for requests made through this crate.
///
/// # Examples
///
/// ```no_run
/// use fluent_http::Error;
///
/// # async fn example() {
/// let response = fluent_http::get("https://api.example.com/missing").send().await;
///
/// match response.text().await {
///     Ok(body) => println!("Body: {body}"),
///     Err(Error::HttpError { status, raw_response, .. }) => {
///         eprintln!("HTTP error {status}: {raw_response}");
///     }
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// # }
/// ```
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// The transport failed before a response was obtained (connection refused,
    /// DNS failure, timeout configured on the client, ...).
    ///
    /// The underlying error is displayed verbatim.
    #[error("{0}")]
    Network(Arc<dyn std::error::Error + Send + Sync>),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration, such as a malformed header name or value.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to serialize a value into a request body or query string.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// The response body could not be drained.
    #[error("Failed to read response body: {0}")]
    BodyRead(Arc<dyn std::error::Error + Send + Sync>),

    /// The server answered with a status other than `200 OK`.
    ///
    /// This error is only produced when the body is materialized, so a caller
    /// that inspects [`Response::status_code`](crate::Response::status_code)
    /// without reading the body never sees it. Any `2xx` other than `200`
    /// counts too. It displays as the status line, a space, then the raw body,
    /// e.g. `404 Not Found not found`.
    ///
    /// # Fields
    ///
    /// * `status` - The HTTP status code
    /// * `status_line` - The code and reason phrase as sent on the wire
    /// * `raw_response` - The response body, lossily decoded as UTF-8
    /// * `headers` - The response headers
    #[error("{status_line} {raw_response}")]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// The status line, e.g. `404 Not Found`
        status_line: String,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// Failed to deserialize the response body into the expected type.
    ///
    /// The body was read successfully with a `200 OK` status but is not valid
    /// JSON for the target type. Both the raw body and the serde message are
    /// kept, so a schema mismatch can be diagnosed from the error alone.
    ///
    /// # Fields
    ///
    /// * `raw_response` - The raw response body as a string
    /// * `serde_error` - The error message from serde
    /// * `status` - The HTTP status code of the response
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },
}

impl Error {
    /// Wraps a transport failure.
    pub fn network(error: impl Into<BoxError>) -> Self {
        Error::Network(Arc::from(error.into()))
    }

    /// Returns the HTTP status code if this error has one.
    ///
    /// Returns `Some(status)` for `HttpError` and `DeserializationFailed` errors,
    /// `None` for other error types.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpError { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    ///
    /// This keeps the partial data of a failed response reachable after
    /// [`Response::text`](crate::Response::text) returned an error.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns `true` if the failure happened while configuring the request,
    /// before anything was sent.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_) | Error::ConfigurationError(_) | Error::SerializationFailed(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::network(error)
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

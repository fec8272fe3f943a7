//! HTTP client that hands out request builders.
//!
//! The [`Client`] type is the entry point for building requests.
//! Use [`ClientBuilder`] to configure and create clients, or the free
//! functions ([`get`], [`post`], ...) to go through a shared default client.

use crate::{transport::Transport, Error, RequestBuilder, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::de::DeserializeOwned;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// A reusable HTTP client.
///
/// Cloning is cheap; clones share the transport (and its connection pool) and
/// the default headers.
///
/// # Examples
///
/// ```no_run
/// use fluent_http::Client;
/// use serde::Deserialize;
/// use std::time::Duration;
///
/// #[derive(Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// # async fn example() -> Result<(), fluent_http::Error> {
/// let client = Client::builder()
///     .timeout(Duration::from_secs(30))
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
///
/// let user: User = client
///     .get("https://api.example.com/users/123")
///     .send()
///     .await
///     .json()
///     .await?;
/// println!("User: {}", user.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    default_headers: HeaderMap,
}

impl Client {
    /// Creates a client backed by a default `reqwest::Client`.
    pub fn new() -> Self {
        Self::with_transport(reqwest::Client::new())
    }

    /// Creates a client backed by the given transport.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport: Arc::new(transport),
                default_headers: HeaderMap::new(),
            }),
        }
    }

    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Starts a request with the given method.
    ///
    /// The client's default headers are copied into the request; headers set
    /// on the builder replace or extend them.
    pub fn request(&self, method: Method, url: impl AsRef<str>) -> RequestBuilder {
        RequestBuilder::new(
            Arc::clone(&self.inner.transport),
            method,
            url.as_ref(),
            self.inner.default_headers.clone(),
        )
    }

    /// Starts an OPTIONS request.
    pub fn options(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(Method::OPTIONS, url)
    }

    /// Starts a GET request.
    pub fn get(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Starts a HEAD request.
    pub fn head(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(Method::HEAD, url)
    }

    /// Starts a POST request.
    pub fn post(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// Starts a PUT request.
    pub fn put(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }

    /// Starts a TRACE request.
    pub fn trace(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(Method::TRACE, url)
    }

    /// Starts a CONNECT request.
    pub fn connect(&self, url: impl AsRef<str>) -> RequestBuilder {
        self.request(Method::CONNECT, url)
    }

    /// Sends a GET request and decodes the JSON body.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), fluent_http::Error> {
    /// let client = fluent_http::Client::new();
    /// let value: serde_json::Value = client.get_json("https://api.example.com/status").await?;
    /// println!("{value}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_json<T: DeserializeOwned>(&self, url: impl AsRef<str>) -> Result<T> {
        self.get(url).send().await.json().await
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use fluent_http::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), fluent_http::Error> {
/// let client = ClientBuilder::new()
///     .timeout(Duration::from_secs(30))
///     .default_header("Accept", "application/json")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            default_headers: HeaderMap::new(),
            timeout: None,
            transport: None,
        }
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the request timeout of the underlying `reqwest` client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses a custom transport instead of `reqwest`.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout is combined with a custom transport, or if
    /// the `reqwest` client cannot be created.
    pub fn build(self) -> Result<Client> {
        let transport = match (self.transport, self.timeout) {
            (Some(_), Some(_)) => {
                return Err(Error::ConfigurationError(
                    "timeout must be configured on the custom transport".to_string(),
                ))
            }
            (Some(transport), None) => transport,
            (None, timeout) => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = timeout {
                    builder = builder.timeout(timeout);
                }
                let http_client = builder.build().map_err(|e| {
                    Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
                })?;
                Arc::new(http_client) as Arc<dyn Transport>
            }
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                transport,
                default_headers: self.default_headers,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide client behind the free functions.
pub fn default_client() -> &'static Client {
    static DEFAULT: OnceLock<Client> = OnceLock::new();
    DEFAULT.get_or_init(Client::new)
}

/// Starts a GET request on the default client.
pub fn get(url: impl AsRef<str>) -> RequestBuilder {
    default_client().get(url)
}

/// Starts a POST request on the default client.
pub fn post(url: impl AsRef<str>) -> RequestBuilder {
    default_client().post(url)
}

/// Starts a request with any method on the default client.
pub fn request(method: Method, url: impl AsRef<str>) -> RequestBuilder {
    default_client().request(method, url)
}

/// Sends a GET request on the default client and decodes the JSON body.
pub async fn get_json<T: DeserializeOwned>(url: impl AsRef<str>) -> Result<T> {
    default_client().get_json(url).await
}

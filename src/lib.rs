//! # fluent-http - chainable requests, lazily decoded responses
//!
//! fluent-http is a thin convenience layer over `reqwest`. Requests are
//! configured by chaining (query parameters, headers, cookies, raw, form or
//! JSON bodies), sent once, and the [`Response`] is decoded on demand into
//! bytes, text or a JSON-deserialized value.
//!
//! ## Quick Start
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct Search {
//!     q: String,
//!     page: u32,
//! }
//!
//! #[derive(Deserialize)]
//! struct Results {
//!     total: u64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fluent_http::Error> {
//!     let results: Results = fluent_http::get("https://api.example.com/search")
//!         .query_object(&Search { q: "rust".to_string(), page: 1 })
//!         .header("Accept", "application/json")
//!         .send()
//!         .await
//!         .json()
//!         .await?;
//!     println!("Found {} results", results.total);
//!
//!     let response = fluent_http::post("https://api.example.com/login")
//!         .form([("user", "alice"), ("password", "secret")])
//!         .send()
//!         .await;
//!     if let Some(session) = response.cookie("session") {
//!         println!("Logged in: {}", session.value());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Building a request never fails immediately. The first configuration error
//! (bad URL, invalid header, unserializable value) is kept and reported when
//! the response is decoded, without any network I/O:
//!
//! ```no_run
//! use fluent_http::Error;
//!
//! # async fn example() {
//! let response = fluent_http::get("not a url").query("a", "1").send().await;
//! assert!(response.raw().is_none());
//!
//! match response.text().await {
//!     Ok(body) => println!("Success: {body}"),
//!     Err(Error::InvalidUrl(e)) => eprintln!("Bad URL: {e}"),
//!     Err(Error::HttpError { status, raw_response, .. }) => {
//!         eprintln!("HTTP error {status}: {raw_response}");
//!     }
//!     Err(e) => eprintln!("Other error: {e}"),
//! }
//! # }
//! ```
//!
//! A status other than `200 OK` becomes [`Error::HttpError`] when the body is
//! read; [`Response::status_code`] alone never fails.

mod client;
mod error;
pub mod request;
mod response;
pub mod transport;

pub use client::{default_client, get, get_json, post, request, Client, ClientBuilder};
pub use cookie::Cookie;
pub use error::{BoxError, Error, Result};
pub use request::RequestBuilder;
pub use response::Response;
pub use transport::{Request, RequestBody, ResponseBody, Transport, TransportResponse};

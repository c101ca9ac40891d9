//! # Requester
//!
//! HTTP requester capability used by backend adapters.
//!
//! - `Request` describes method, URL, headers, client override, payload, timeout
//! - `Requester` executes a request under a `SendContext`
//! - `HttpRequester` is the reqwest implementation
//!
//! ```ignore
//! let request = Request::builder()
//!     .method(Method::POST)
//!     .url("https://slack.com/api/chat.postMessage")
//!     .header("Authorization", format!("Bearer {token}"))
//!     .payload(body)
//!     .build()?;
//! let response = HttpRequester::new().execute(&ctx, request).await?;
//! ```

mod http;
mod request;

pub use http::{HttpRequester, Requester, Response};
pub use request::{Request, RequestBuilder};
pub use reqwest::{Client, Method, StatusCode};

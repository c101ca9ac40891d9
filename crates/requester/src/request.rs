//! Request description and builder

use std::time::Duration;

use bytes::Bytes;
use contracts::NofyError;
use reqwest::{Client, Method};

/// A fully described HTTP request
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) client: Option<Client>,
    pub(crate) payload: Bytes,
    pub(crate) timeout: Option<Duration>,
}

impl Request {
    /// Start describing a request
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Header value by case-insensitive name (last one wins)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Builder for [`Request`]
///
/// Method and URL are required; everything else is optional.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    url: Option<String>,
    headers: Vec<(String, String)>,
    client: Option<Client>,
    payload: Bytes,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set a header; setting the same name twice keeps the last value
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.headers.push((key, value.into()));
        self
    }

    /// Use this client instead of the requester's own
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate and build
    ///
    /// # Errors
    /// Configuration error when method or URL is missing.
    pub fn build(self) -> Result<Request, NofyError> {
        let method = self
            .method
            .ok_or_else(|| NofyError::config("method", "method is required"))?;
        let url = self
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| NofyError::config("url", "url is required"))?;

        Ok(Request {
            method,
            url,
            headers: self.headers,
            client: self.client,
            payload: self.payload,
            timeout: self.timeout,
        })
    }
}

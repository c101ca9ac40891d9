//! HttpRequester - reqwest-backed Requester

use async_trait::async_trait;
use bytes::Bytes;
use contracts::{NofyError, SendContext};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::request::Request;

/// HTTP response as seen by backend adapters
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub body: Bytes,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, NofyError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| NofyError::serialization(format!("error unmarshalling response: {e}")))
    }

    /// Body as (lossy) UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP requester capability
#[async_trait]
pub trait Requester: Send + Sync {
    /// Execute `request`, giving up with [`NofyError::Cancelled`] if `ctx` fires first
    async fn execute(&self, ctx: &SendContext, request: Request) -> Result<Response, NofyError>;
}

/// Requester over a shared `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct HttpRequester {
    client: Client,
}

impl HttpRequester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Requester for HttpRequester {
    #[instrument(
        name = "http_requester_execute",
        skip(self, ctx, request),
        fields(method = %request.method, url = %request.url)
    )]
    async fn execute(&self, ctx: &SendContext, request: Request) -> Result<Response, NofyError> {
        let client = request.client.unwrap_or_else(|| self.client.clone());

        let mut builder = client.request(request.method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder = builder.body(request.payload);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        let http_request = builder
            .build()
            .map_err(|e| NofyError::transport("error creating request", e))?;

        let exchange = async {
            let response = client
                .execute(http_request)
                .await
                .map_err(|e| NofyError::transport("error sending request", e))?;
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| NofyError::transport("error reading response", e))?;
            Ok(Response { status, body })
        };

        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                debug!("Context cancelled before response");
                Err(NofyError::Cancelled)
            }
            result = exchange => {
                if let Ok(ref response) = result {
                    debug!(status = %response.status, bytes = response.body.len(), "Response received");
                }
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use std::time::Duration;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_execute_sends_headers_and_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("Authorization", "Bearer t0k"))
            .and(body_string("payload"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let request = Request::builder()
            .method(Method::POST)
            .url(format!("{}/hook", server.uri()))
            .header("Authorization", "Bearer t0k")
            .payload("payload")
            .build()
            .unwrap();

        let response = HttpRequester::new()
            .execute(&SendContext::background(), request)
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.text(), r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let request = Request::builder()
            .method(Method::GET)
            .url(server.uri())
            .build()
            .unwrap();
        let response = HttpRequester::new()
            .execute(&SendContext::background(), request)
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.text(), "down");
    }

    #[tokio::test]
    async fn test_invalid_url_is_creation_error() {
        let request = Request::builder()
            .method(Method::GET)
            .url("not a url")
            .build()
            .unwrap();
        let err = HttpRequester::new()
            .execute(&SendContext::background(), request)
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("error creating request"), "{err}");
    }

    #[tokio::test]
    async fn test_timeout_is_send_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let request = Request::builder()
            .method(Method::GET)
            .url(server.uri())
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let err = HttpRequester::new()
            .execute(&SendContext::background(), request)
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("error sending request"), "{err}");
    }

    #[tokio::test]
    async fn test_cancelled_context_aborts_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let ctx = SendContext::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let request = Request::builder()
            .method(Method::GET)
            .url(server.uri())
            .build()
            .unwrap();
        let err = HttpRequester::new().execute(&ctx, request).await.unwrap_err();

        assert!(matches!(err, NofyError::Cancelled));
    }

    #[test]
    fn test_response_json_error_message() {
        let response = Response {
            status: StatusCode::OK,
            body: Bytes::from_static(b"not json"),
        };
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert!(err.to_string().starts_with("error unmarshalling response"));
    }
}

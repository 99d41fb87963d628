use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Minimal HTTP method enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP headers represented as key/value pairs.
///
/// Header names are treated case-insensitively by helper functions.
pub type HttpHeaders = Vec<(String, String)>;

/// A minimal HTTP request.
///
/// Query parameters are kept apart from `url` so callers never hand-encode
/// them; [`HttpRequest::full_url`] renders the final address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HttpHeaders,
    pub query: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a GET request without headers or query parameters.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Render the URL with the query parameters appended.
    pub fn full_url(&self) -> Result<String, HttpError> {
        let mut url = Url::parse(&self.url).map_err(|e| HttpError::InvalidUrl {
            url: self.url.clone(),
            message: e.to_string(),
        })?;

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &self.query {
                pairs.append_pair(k, v);
            }
        }

        Ok(url.into())
    }
}

/// A minimal HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("no mock response registered for {method} {url}")]
    NoMockResponse { method: String, url: String },
}

/// Transport boundary for all HTTP I/O.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Get the first header value matching `name` (case-insensitive).
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

pub mod reqwest_transport {
    use super::*;

    use std::time::Duration as StdDuration;

    /// A real HTTP transport backed by reqwest.
    #[derive(Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(client: reqwest::Client) -> Self {
            Self { client }
        }

        pub fn with_timeout(timeout: StdDuration) -> Result<Self, HttpError> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| HttpError::Transport(e.to_string()))?;
            Ok(Self { client })
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let method = match request.method {
                HttpMethod::Get => reqwest::Method::GET,
            };

            let url = request.full_url()?;
            let mut builder = self.client.request(method, &url);
            for (k, v) in request.headers {
                builder = builder.header(&k, &v);
            }

            let resp = builder
                .send()
                .await
                .map_err(|e| HttpError::Transport(e.to_string()))?;

            let status = resp.status().as_u16();
            let mut headers: HttpHeaders = Vec::new();
            for (name, value) in resp.headers().iter() {
                headers.push((
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                ));
            }

            let body = resp
                .bytes()
                .await
                .map_err(|e| HttpError::Transport(e.to_string()))?
                .to_vec();

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

// ---------- Test-only mock transport ----------

#[cfg(test)]
use std::collections::{HashMap, VecDeque};
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// In-memory mock transport.
///
/// Routes are keyed by method and the full URL, query string included.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[cfg(test)]
#[derive(Default)]
struct MockTransportInner {
    routes: HashMap<(HttpMethod, String), VecDeque<HttpResponse>>,
    requests: Vec<HttpRequest>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response for a method + URL.
    ///
    /// If multiple responses are registered for the same key, they are returned
    /// in FIFO order.
    pub fn push_response(
        &self,
        method: HttpMethod,
        url: impl Into<String>,
        response: HttpResponse,
    ) {
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport lock should not be poisoned");
        inner
            .routes
            .entry((method, url.into()))
            .or_default()
            .push_back(response);
    }

    /// Register a 200 response with a JSON body.
    pub fn push_json(&self, url: impl Into<String>, body: &serde_json::Value) {
        self.push_response(
            HttpMethod::Get,
            url,
            HttpResponse {
                status: 200,
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                body: body.to_string().into_bytes(),
            },
        );
    }

    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        let inner = self
            .inner
            .lock()
            .expect("mock transport lock should not be poisoned");
        inner.requests.clone()
    }
}

#[cfg(test)]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = request.full_url()?;
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport lock should not be poisoned");

        let key = (request.method, url);
        inner.requests.push(request);

        match inner.routes.get_mut(&key).and_then(|q| q.pop_front()) {
            Some(resp) => Ok(resp),
            None => Err(HttpError::NoMockResponse {
                method: key.0.as_str().to_string(),
                url: key.1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_header_get_is_case_insensitive_and_returns_first_match() {
        let headers: HttpHeaders = vec![
            ("ETag".to_string(), "W/\"abc\"".to_string()),
            ("etag".to_string(), "W/\"def\"".to_string()),
        ];
        assert_eq!(header_get(&headers, "etag"), Some("W/\"abc\""));
        assert_eq!(header_get(&headers, "ETAG"), Some("W/\"abc\""));
        assert_eq!(header_get(&headers, "missing"), None);
    }

    #[test]
    fn test_full_url_appends_encoded_query_pairs() {
        let req = HttpRequest::get("https://api.example.test/repositories")
            .query("since", "150")
            .query("q", "a b&c");
        assert_eq!(
            req.full_url().expect("valid url"),
            "https://api.example.test/repositories?since=150&q=a+b%26c"
        );
    }

    #[test]
    fn test_full_url_without_query_is_unchanged() {
        let req = HttpRequest::get("https://api.example.test/repos/o/r");
        assert_eq!(
            req.full_url().expect("valid url"),
            "https://api.example.test/repos/o/r"
        );
    }

    #[test]
    fn test_full_url_rejects_garbage() {
        let err = HttpRequest::get("not a url")
            .full_url()
            .expect_err("should not parse");
        assert!(matches!(err, HttpError::InvalidUrl { .. }));
    }

    #[test]
    fn test_http_response_text() {
        let resp = HttpResponse {
            status: 404,
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: b"Not Found".to_vec(),
        };
        assert_eq!(header_get(&resp.headers, "content-type"), Some("text/plain"));
        assert_eq!(header_get(&resp.headers, "missing"), None);
        assert_eq!(resp.text(), "Not Found");
    }

    #[tokio::test]
    async fn test_mock_transport_returns_registered_response_and_records_request() {
        let transport = MockTransport::new();

        transport.push_response(
            HttpMethod::Get,
            "https://example.com/api?since=1",
            HttpResponse {
                status: 200,
                headers: vec![("X-Test".to_string(), "ok".to_string())],
                body: b"hello".to_vec(),
            },
        );

        let req = HttpRequest::get("https://example.com/api")
            .header("Accept", "application/json")
            .query("since", "1");
        let resp = transport.send(req.clone()).await.expect("mock response");
        assert_eq!(resp.status, 200);
        assert_eq!(header_get(&resp.headers, "x-test"), Some("ok"));
        assert_eq!(resp.body, b"hello".to_vec());

        assert_eq!(transport.requests(), vec![req]);
    }

    #[tokio::test]
    async fn test_mock_transport_errors_when_no_response_is_registered() {
        let transport = MockTransport::new();
        let err = transport
            .send(HttpRequest::get("https://example.com/missing"))
            .await
            .expect_err("missing mock should error");
        match err {
            HttpError::NoMockResponse { method, url } => {
                assert_eq!(method, "GET");
                assert_eq!(url, "https://example.com/missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_reqwest_transport_with_timeout_builds_client() {
        let transport = reqwest_transport::ReqwestTransport::with_timeout(Duration::from_millis(1))
            .expect("reqwest transport should build");
        let _ = transport;
    }

    #[tokio::test]
    async fn test_reqwest_transport_send_makes_request_and_reads_response() {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            stream
                .set_read_timeout(Some(Duration::from_secs(2)))
                .expect("set_read_timeout");

            let mut buf = Vec::new();
            let mut tmp = [0u8; 4096];
            loop {
                match stream.read(&mut tmp) {
                    Ok(0) => break,
                    Ok(n) => {
                        buf.extend_from_slice(&tmp[..n]);
                        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    Err(e)
                        if e.kind() == std::io::ErrorKind::WouldBlock
                            || e.kind() == std::io::ErrorKind::TimedOut =>
                    {
                        break;
                    }
                    Err(e) => panic!("read request: {e}"),
                }
            }

            let req_text = String::from_utf8_lossy(&buf);
            assert!(
                req_text.starts_with("GET /repositories?since=42 "),
                "unexpected request line: {req_text:?}"
            );
            assert!(
                req_text.to_lowercase().contains("x-test: 1"),
                "expected x-test header"
            );

            let body = b"[]";
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .expect("write headers");
            stream.write_all(body).expect("write body");
            stream.flush().ok();
        });

        let transport = reqwest_transport::ReqwestTransport::new(reqwest::Client::new());
        let req = HttpRequest::get(format!("http://{addr}/repositories"))
            .header("X-Test", "1")
            .query("since", "42");

        let resp = transport.send(req).await.expect("transport should succeed");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"[]".to_vec());

        handle.join().expect("server thread");
    }

    #[tokio::test]
    async fn test_reqwest_transport_send_returns_error_for_invalid_url() {
        let transport = reqwest_transport::ReqwestTransport::new(reqwest::Client::new());
        let err = transport
            .send(HttpRequest::get("not a url"))
            .await
            .expect_err("expected error");
        assert!(matches!(err, HttpError::InvalidUrl { .. }));
    }
}

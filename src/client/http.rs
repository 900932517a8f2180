// File: src/client/http.rs
use http::{HeaderValue, Request, Uri, header};
use http_body_util::{BodyExt, Empty, Limited};
use hyper::body::Bytes;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::future::Future;
use std::time::Duration;

/// Published sheets are small; anything bigger is not a planning.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
const MAX_REDIRECTS: usize = 5;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "fr-FR,fr;q=0.9,en-US;q=0.5,en;q=0.3";

#[derive(Debug)]
pub enum FetchError {
    InvalidUrl(String),
    Tls(String),
    Http(String),
    Status(u16),
    Timeout,
    Body(String),
    TooManyRedirects,
}

impl FetchError {
    /// Errors that another attempt cannot fix.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::InvalidUrl(_) | Self::Tls(_))
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl(u) => write!(f, "Invalid URL: {}", u),
            Self::Tls(e) => write!(f, "TLS initialization error: {}", e),
            Self::Http(e) => write!(f, "HTTP error: {}", e),
            Self::Status(s) => write!(f, "HTTP status: {}", s),
            Self::Timeout => write!(f, "Request timed out"),
            Self::Body(e) => write!(f, "Failed to read body: {}", e),
            Self::TooManyRedirects => write!(f, "Too many redirects"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Anything that can turn a URL into text. The assembler only talks to
/// this, so tests can serve canned pages.
pub trait Fetcher {
    fn get_text(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// Resolves a `Location` header against the request URI, inheriting scheme
/// and authority when the location is relative.
pub fn resolve_location(base: &Uri, location: &str) -> Option<Uri> {
    let parsed = location.parse::<Uri>().ok()?;
    let parts = parsed.into_parts();
    let mut builder = Uri::builder();

    if let Some(scheme) = parts.scheme {
        builder = builder.scheme(scheme);
    } else if let Some(s) = base.scheme() {
        builder = builder.scheme(s.clone());
    }

    if let Some(authority) = parts.authority {
        builder = builder.authority(authority);
    } else if let Some(a) = base.authority() {
        builder = builder.authority(a.clone());
    }

    match parts.path_and_query {
        Some(pq) => builder = builder.path_and_query(pq),
        None => builder = builder.path_and_query("/"),
    }

    builder.build().ok()
}

type HttpsClient = Client<HttpsConnector<HttpConnector>, Empty<Bytes>>;

/// GET-only client with a per-attempt timeout and immediate retries.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: HttpsClient,
    timeout: Duration,
    max_attempts: u32,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, max_attempts: u32) -> Result<Self, FetchError> {
        let https = HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| FetchError::Tls(e.to_string()))?
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(https);
        Ok(Self {
            client,
            timeout,
            max_attempts: max_attempts.max(1),
        })
    }

    async fn get_once(&self, uri: &Uri) -> Result<String, FetchError> {
        let mut current = uri.clone();

        for _ in 0..=MAX_REDIRECTS {
            let authority = current
                .authority()
                .ok_or_else(|| FetchError::InvalidUrl(current.to_string()))?
                .clone();

            let req = Request::builder()
                .uri(&current)
                .header(header::HOST, authority.as_str())
                .header(header::USER_AGENT, HeaderValue::from_static(USER_AGENT))
                .header(header::ACCEPT, HeaderValue::from_static(ACCEPT))
                .header(
                    header::ACCEPT_LANGUAGE,
                    HeaderValue::from_static(ACCEPT_LANGUAGE),
                )
                .body(Empty::<Bytes>::new())
                .map_err(|e| FetchError::Http(e.to_string()))?;

            let res = self
                .client
                .request(req)
                .await
                .map_err(|e| FetchError::Http(e.to_string()))?;

            let status = res.status();
            if status.is_redirection() {
                let next = res
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|l| l.to_str().ok())
                    .and_then(|l| resolve_location(&current, l));
                if let Some(next) = next {
                    log::debug!("Redirected to {}", next);
                    current = next;
                    continue;
                }
            }
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            let limited = Limited::new(res.into_body(), MAX_BODY_BYTES);
            let collected = BodyExt::collect(limited)
                .await
                .map_err(|e| FetchError::Body(e.to_string()))?;
            let bytes = collected.to_bytes();
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }

        Err(FetchError::TooManyRedirects)
    }
}

impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let uri: Uri = url
            .parse()
            .map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = match tokio::time::timeout(self.timeout, self.get_once(&uri)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout),
            };

            match result {
                Ok(text) => return Ok(text),
                Err(e) if e.is_permanent() || attempt >= self.max_attempts => {
                    log::error!("Request to {} failed: {}", url, e);
                    return Err(e);
                }
                Err(e) => {
                    log::warn!(
                        "Request failed (attempt {}/{}): {}",
                        attempt,
                        self.max_attempts,
                        e
                    );
                }
            }
        }
    }
}

//! Authenticating reverse proxy to the content service.
//!
//! Browser-side code calls `GET <prefix>/<path>?<query>` on this server; the
//! request is forwarded to `<upstream>/<path>?<query>` with the upstream
//! credential attached. Bodies are streamed in both directions and never
//! inspected, so binary assets pass through byte for byte.

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::http::{Method, Request, Response, Uri};
use futures::TryStreamExt;
use url::Url;

use gallery_auth::SharedAuthResolver;

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Inbound headers replaced or dropped on the way upstream.
const STRIPPED_REQUEST: [HeaderName; 3] = [header::AUTHORIZATION, header::COOKIE, header::HOST];

/// How the upstream is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl Transport {
    /// Pick the transport for an upstream URL.
    pub fn for_url(url: &Url) -> Result<Self> {
        match url.scheme() {
            "http" => Ok(Transport::Http),
            "https" => Ok(Transport::Https),
            other => Err(ServerError::Config(format!(
                "unsupported upstream scheme '{}'",
                other
            ))),
        }
    }
}

/// Forwards GET requests to the content service.
#[derive(Debug)]
pub struct ProxyHandler {
    http: reqwest::Client,
    upstream: Url,
    prefix: String,
    transport: Transport,
    auth: SharedAuthResolver,
}

impl ProxyHandler {
    /// Create a handler for the configured upstream.
    pub fn new(config: &ServerConfig, auth: SharedAuthResolver) -> Result<Self> {
        let transport = Transport::for_url(&config.upstream)?;

        // No automatic decompression: bytes and Content-Encoding pass through
        // untouched. Redirects go back to the caller as-is.
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .https_only(transport == Transport::Https)
            .build()
            .map_err(|e| ServerError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            upstream: config.upstream.clone(),
            prefix: config.proxy_prefix.clone(),
            transport,
            auth,
        })
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Forward one request.
    ///
    /// Returns `Ok(None)` for anything but GET: no upstream call is made and
    /// no response is produced.
    pub async fn handle(&self, request: Request<Body>) -> Result<Option<Response<Body>>> {
        if request.method() != Method::GET {
            tracing::debug!(method = %request.method(), uri = %request.uri(), "Dropping non-GET request");
            return Ok(None);
        }

        let (parts, body) = request.into_parts();
        let target = rewrite_target(&self.upstream, &self.prefix, &parts.uri)?;

        let mut outbound = self
            .http
            .get(target.clone())
            .headers(forwarded_request_headers(&parts.headers));

        if let Some(credential) = self.auth.resolve_credential().await? {
            outbound = outbound.header(header::AUTHORIZATION, credential.to_header_value()?);
        }

        if has_body(&parts.headers) {
            outbound = outbound.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let upstream = outbound.send().await?;
        let status = upstream.status();
        tracing::debug!(upstream_path = %target.path(), status = status.as_u16(), "Upstream responded");

        let mut response = Response::builder().status(status);
        if let Some(headers) = response.headers_mut() {
            *headers = forwarded_response_headers(upstream.headers());
        }

        let stream = upstream.bytes_stream().map_err(std::io::Error::other);
        let response = response
            .body(Body::from_stream(stream))
            .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))?;

        Ok(Some(response))
    }
}

/// Map a proxy URI onto the upstream.
///
/// The mount prefix is stripped, the rest of the path is appended to the
/// upstream base path and the query string is kept verbatim.
pub fn rewrite_target(upstream: &Url, prefix: &str, uri: &Uri) -> Result<Url> {
    let prefix = prefix.trim_end_matches('/');
    let path = uri.path();

    let rest = match path.strip_prefix(prefix) {
        Some(rest) if prefix.is_empty() || rest.is_empty() || rest.starts_with('/') => rest,
        _ => {
            return Err(ServerError::BadRequest(format!(
                "path '{}' is outside the proxy mount '{}'",
                path, prefix
            )));
        }
    };

    if rest.split(['/', '\\']).any(is_parent_segment) {
        return Err(ServerError::BadRequest(format!(
            "path '{}' climbs out of the upstream base path",
            path
        )));
    }

    let mut target = upstream.clone();
    let base = target.path().trim_end_matches('/').to_string();
    target.set_path(&format!("{}/{}", base, rest.trim_start_matches('/')));
    target.set_query(uri.query());
    target.set_fragment(None);
    Ok(target)
}

/// `..` in any spelling the URL parser treats as a parent segment.
fn is_parent_segment(segment: &str) -> bool {
    segment.to_ascii_lowercase().replace("%2e", ".") == ".."
}

/// Inbound request headers that travel upstream.
fn forwarded_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = without_hop_by_hop(inbound);
    for name in &STRIPPED_REQUEST {
        headers.remove(name);
    }
    // Framing is decided by the outbound client.
    headers.remove(header::CONTENT_LENGTH);
    headers
}

/// Upstream response headers that travel back to the caller.
fn forwarded_response_headers(upstream: &HeaderMap) -> HeaderMap {
    without_hop_by_hop(upstream)
}

fn without_hop_by_hop(source: &HeaderMap) -> HeaderMap {
    let mut headers = source.clone();

    // Headers listed in `Connection` are hop-by-hop as well.
    let listed: Vec<HeaderName> = source
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::try_from(name.trim()).ok())
        .collect();

    for name in HOP_BY_HOP.iter().chain(listed.iter()) {
        headers.remove(name);
    }
    headers
}

fn has_body(headers: &HeaderMap) -> bool {
    let declared_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    match declared_length {
        Some(len) => len > 0,
        None => headers.contains_key(header::TRANSFER_ENCODING),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::HeaderValue;
    use gallery_auth::AuthResolver;

    use super::*;

    fn upstream() -> Url {
        Url::parse("https://host.example.com").unwrap()
    }

    #[test]
    fn test_rewrite_keeps_path_and_query() {
        let uri: Uri = "/api/foo/bar?x=1".parse().unwrap();
        let target = rewrite_target(&upstream(), "/api", &uri).unwrap();
        assert_eq!(target.as_str(), "https://host.example.com/foo/bar?x=1");
    }

    #[test]
    fn test_rewrite_keeps_upstream_base_path() {
        let base = Url::parse("https://host.example.com/tenant/").unwrap();
        let uri: Uri = "/api/content/published/api/v1.1/items?q=a%20b&limit=4"
            .parse()
            .unwrap();
        let target = rewrite_target(&base, "/api", &uri).unwrap();
        assert_eq!(
            target.as_str(),
            "https://host.example.com/tenant/content/published/api/v1.1/items?q=a%20b&limit=4"
        );
    }

    #[test]
    fn test_rewrite_rejects_foreign_path() {
        let uri: Uri = "/apiary/foo".parse().unwrap();
        assert!(rewrite_target(&upstream(), "/api", &uri).is_err());
    }

    #[test]
    fn test_rewrite_rejects_parent_segments() {
        let base = Url::parse("https://host.example.com/tenant/").unwrap();
        for path in ["/api/../x", "/api/a/%2e%2e/x", "/api/.%2E/x", "/api/%2E%2e"] {
            let uri: Uri = path.parse().unwrap();
            let err = rewrite_target(&base, "/api", &uri).unwrap_err();
            assert!(matches!(err, ServerError::BadRequest(_)), "{}", path);
        }

        // Dots inside a name are fine.
        let uri: Uri = "/api/assets/photo..jpg".parse().unwrap();
        let target = rewrite_target(&base, "/api", &uri).unwrap();
        assert_eq!(target.path(), "/tenant/assets/photo..jpg");
    }

    #[test]
    fn test_transport_from_scheme() {
        assert_eq!(Transport::for_url(&upstream()).unwrap(), Transport::Https);
        let plain = Url::parse("http://localhost:9000").unwrap();
        assert_eq!(Transport::for_url(&plain).unwrap(), Transport::Http);
        let ftp = Url::parse("ftp://host.example.com").unwrap();
        assert!(Transport::for_url(&ftp).is_err());
    }

    #[test]
    fn test_request_headers_filtered() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer browser"));
        inbound.insert(header::COOKIE, HeaderValue::from_static("session=1"));
        inbound.insert(header::HOST, HeaderValue::from_static("gallery.example.com"));
        inbound.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-trace"));
        inbound.insert("x-trace", HeaderValue::from_static("1"));
        inbound.insert(header::ACCEPT, HeaderValue::from_static("image/webp"));

        let forwarded = forwarded_request_headers(&inbound);
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[header::ACCEPT], "image/webp");
    }

    #[test]
    fn test_response_headers_keep_content_headers() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
        upstream.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        upstream.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));

        let forwarded = forwarded_response_headers(&upstream);
        assert_eq!(forwarded[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(forwarded[header::CONTENT_ENCODING], "gzip");
        assert!(!forwarded.contains_key(header::TRANSFER_ENCODING));
    }

    #[test]
    fn test_has_body() {
        let mut headers = HeaderMap::new();
        assert!(!has_body(&headers));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
        assert!(!has_body(&headers));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        assert!(has_body(&headers));
    }

    #[tokio::test]
    async fn test_non_get_produces_nothing() {
        let config = ServerConfig::new(upstream());
        let handler = ProxyHandler::new(&config, Arc::new(AuthResolver::anonymous())).unwrap();

        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            let request = Request::builder()
                .method(method)
                .uri("/api/items")
                .body(Body::empty())
                .unwrap();
            assert!(handler.handle(request).await.unwrap().is_none());
        }
    }
}

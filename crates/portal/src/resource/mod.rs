// ABOUTME: Resource fetching for portal pages: GET and form POST with size limits and status checks.
// ABOUTME: Decodes response bodies using the content-type charset or chardetng detection.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::PortalError;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Options for fetching a resource.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub parse_non_200: bool,
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as text, using charset hints from the content-type header.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// GET a resource.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, PortalError> {
    let parsed = parse_http_url(url, "Fetch")?;
    send(client.get(parsed), url, "Fetch", opts).await
}

/// POST a form-encoded body to a resource.
pub async fn submit_form(
    client: &reqwest::Client,
    url: &str,
    form: &[(&str, &str)],
    opts: &FetchOptions,
) -> Result<FetchResult, PortalError> {
    let parsed = parse_http_url(url, "Submit")?;
    send(client.post(parsed).form(form), url, "Submit", opts).await
}

fn parse_http_url(url: &str, op: &str) -> Result<url::Url, PortalError> {
    if url.is_empty() {
        return Err(PortalError::invalid_url(url, op, None));
    }

    let parsed = url::Url::parse(url).map_err(|e| {
        PortalError::invalid_url(url, op, Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(PortalError::invalid_url(
            url,
            op,
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }
    Ok(parsed)
}

async fn send(
    mut request: reqwest::RequestBuilder,
    url: &str,
    op: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, PortalError> {
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| PortalError::from_transport(url, op, e))?;

    let content_length = response.content_length().or_else(|| {
        response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
    });

    if let Some(len) = content_length {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(PortalError::fetch(
                url,
                op,
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response.bytes().await.map_err(|e| {
        PortalError::fetch(
            url,
            op,
            Some(anyhow::anyhow!("failed to read body: {}", e)),
        )
    })?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(PortalError::fetch(
            url,
            op,
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    if status != 200 && !opts.parse_non_200 {
        return Err(PortalError::fetch(
            url,
            op,
            Some(anyhow::anyhow!("HTTP status {}", status)),
        ));
    }

    Ok(FetchResult {
        status,
        url: url.to_string(),
        final_url,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn create_test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent("test-agent")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_ok_utf8() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/test");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("मुद्दा");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/test"), &FetchOptions::default()).await;
        mock.assert();

        let result = result.expect("fetch should succeed");
        assert_eq!(result.status, 200);
        assert_eq!(result.text(), "मुद्दा");
    }

    #[tokio::test]
    async fn test_submit_form_posts() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/form")
                .header("content-type", "application/x-www-form-urlencoded");
            then.status(200).body("ok");
        });

        let client = create_test_client();
        let result = submit_form(
            &client,
            &server.url("/form"),
            &[("regno", "080-CR-0096"), ("mode", "show")],
            &FetchOptions::default(),
        )
        .await;
        mock.assert();

        assert_eq!(result.expect("submit should succeed").text(), "ok");
    }

    #[tokio::test]
    async fn test_fetch_non_200_rejected() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/notfound");
            then.status(404).body("not found");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/notfound"), &FetchOptions::default()).await;
        mock.assert();

        let err = result.expect_err("should fail on 404");
        assert!(err.is_fetch());
    }

    #[tokio::test]
    async fn test_fetch_non_200_allowed() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/notfound");
            then.status(404).body("not found");
        });

        let client = create_test_client();
        let opts = FetchOptions {
            parse_non_200: true,
            ..Default::default()
        };

        let result = fetch(&client, &server.url("/notfound"), &opts).await;
        mock.assert();

        let result = result.expect("fetch should succeed with parse_non_200");
        assert_eq!(result.status, 404);
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_scheme() {
        let client = create_test_client();
        let err = fetch(&client, "ftp://example.test/x", &FetchOptions::default())
            .await
            .expect_err("ftp is not allowed");
        assert!(err.is_invalid_url());

        let err = fetch(&client, "", &FetchOptions::default())
            .await
            .expect_err("empty url");
        assert!(err.is_invalid_url());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = create_test_client();
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let err = fetch(&client, "http://127.0.0.1:9/", &FetchOptions::default())
            .await
            .expect_err("nothing listens there");
        assert!(err.is_transport());
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(
            extract_charset("text/html; charset=utf-8"),
            Some("utf-8".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"UTF-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn test_decode_body_detects_utf8_without_charset() {
        let body = "तारेख विवरण".as_bytes();
        assert_eq!(decode_body(body, None), "तारेख विवरण");
    }

    #[test]
    fn test_decode_body_with_latin1_charset() {
        let body: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        assert_eq!(decode_body(body, Some("text/plain; charset=iso-8859-1")), "café");
    }
}

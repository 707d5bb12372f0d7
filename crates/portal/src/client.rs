// ABOUTME: The portal Client and its per-run Session that drives the two-step case lookup.
// ABOUTME: A Session owns the cookie-carrying HTTP client; dropping it ends the portal session.

use nyaya_records::StatusCount;
use url::Url;

use crate::error::PortalError;
use crate::extractors::search::{find_detail_link, has_records};
use crate::extractors::status::parse_status_counts;
use crate::extractors::tables::parse_detail_page;
use crate::options::{ClientBuilder, Options};
use crate::record::CaseRecord;
use crate::resource::{fetch, submit_form, FetchOptions};

/// The portal client. Holds configuration only; network state lives in a [`Session`].
#[derive(Debug, Clone)]
pub struct Client {
    opts: Options,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    pub fn new(opts: Options) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Opens an anonymous session. Cookies set by the portal are kept for the
    /// session's lifetime and shared by every request made through it.
    pub fn open_session(&self) -> Result<Session<'_>, PortalError> {
        let http = reqwest::Client::builder()
            .user_agent(&self.opts.user_agent)
            .timeout(self.opts.timeout)
            .cookie_store(true)
            .danger_accept_invalid_certs(!self.opts.tls_verification)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| {
                PortalError::client("OpenSession", Some(anyhow::anyhow!("failed to build HTTP client: {}", e)))
            })?;

        let base = parse_base(&self.opts.base_url)?;
        let search_url = base.join(&self.opts.case_details_path).map_err(|e| {
            PortalError::invalid_url(
                &self.opts.case_details_path,
                "OpenSession",
                Some(anyhow::anyhow!("cannot resolve search path: {}", e)),
            )
        })?;

        tracing::debug!(base = %base, "portal session opened");
        Ok(Session {
            opts: &self.opts,
            http,
            base,
            search_url,
            fetch_opts: FetchOptions {
                headers: self.opts.headers.clone(),
                parse_non_200: false,
            },
        })
    }
}

fn parse_base(base_url: &str) -> Result<Url, PortalError> {
    Url::parse(base_url).map_err(|e| {
        PortalError::invalid_url(
            base_url,
            "OpenSession",
            Some(anyhow::anyhow!("invalid base URL: {}", e)),
        )
    })
}

/// One run's connection to the portal.
pub struct Session<'c> {
    opts: &'c Options,
    http: reqwest::Client,
    base: Url,
    search_url: Url,
    fetch_opts: FetchOptions,
}

impl Session<'_> {
    /// Looks up `case_number` and returns the detail page HTML.
    ///
    /// `Ok(None)` means the portal has no record for the case. Transport failures,
    /// non-200 responses and a results page without a detail link are errors.
    pub async fn fetch_one(&self, case_number: &str) -> Result<Option<String>, PortalError> {
        let search = submit_form(
            &self.http,
            self.search_url.as_str(),
            &[("regno", case_number), ("mode", "show"), ("list", "list")],
            &self.fetch_opts,
        )
        .await?;
        let search_html = search.text();

        if !has_records(&search_html, &self.opts.records_marker) {
            tracing::info!(case_number, "no records found");
            return Ok(None);
        }

        let href = find_detail_link(&search_html).ok_or_else(|| {
            PortalError::extract(
                self.search_url.as_str(),
                "FindDetailLink",
                Some(anyhow::anyhow!("no detail link for {}", case_number)),
            )
        })?;
        let detail_url = self.base.join(&href).map_err(|e| {
            PortalError::invalid_url(&href, "FindDetailLink", Some(anyhow::anyhow!("{}", e)))
        })?;

        let detail = fetch(&self.http, detail_url.as_str(), &self.fetch_opts).await?;
        Ok(Some(detail.text()))
    }

    /// [`Session::fetch_one`] followed by table extraction.
    pub async fn fetch_record(&self, case_number: &str) -> Result<Option<CaseRecord>, PortalError> {
        Ok(self
            .fetch_one(case_number)
            .await?
            .map(|html| parse_detail_page(&html)))
    }

    /// Fetches the index page and reads its case-type counts.
    pub async fn fetch_status_counts(&self) -> Result<Vec<StatusCount>, PortalError> {
        let page = fetch(&self.http, &self.opts.status_url, &self.fetch_opts).await?;
        Ok(parse_status_counts(&page.text()))
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        tracing::debug!(base = %self.base, "portal session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const SEARCH_HIT: &str = r#"<html><body><table class="table">
        <tr><th>दर्ता नं</th><th></th></tr>
        <tr><td>080-CR-0096</td>
            <td><a href="sys.php?d=reports&amp;f=case_detail_full&amp;regid=42">मुद्दाको बिस्तृत विवरण</a></td></tr>
        </table></body></html>"#;

    const DETAIL: &str = r#"<html><body>
        <table class="table table-hover">
          <tr><td class="caption">दर्ता नं :</td><td>080-CR-0096</td></tr>
        </table>
        <table class="table table-bordered"><tr><th>दर्ता नँ</th></tr><tr><td>०८०-RE-०००१</td></tr></table>
        </body></html>"#;

    fn client_for(server: &MockServer) -> Client {
        Client::builder()
            .base_url(server.url("/lic/"))
            .status_url(server.url("/web/eng/index"))
            .build()
    }

    #[tokio::test]
    async fn test_two_step_lookup() {
        let server = MockServer::start();
        let search = server.mock(|when, then| {
            when.method(POST)
                .path("/lic/sys.php")
                .query_param("d", "reports")
                .query_param("f", "case_details")
                .header("content-type", "application/x-www-form-urlencoded");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(SEARCH_HIT);
        });
        let detail = server.mock(|when, then| {
            when.method(GET)
                .path("/lic/sys.php")
                .query_param("f", "case_detail_full")
                .query_param("regid", "42");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(DETAIL);
        });

        let client = client_for(&server);
        let session = client.open_session().expect("session");
        let record = session
            .fetch_record("080-CR-0096")
            .await
            .expect("lookup succeeds")
            .expect("case exists");

        search.assert();
        detail.assert();
        assert_eq!(record.case_details.get("दर्ता नं"), Some("080-CR-0096"));
        assert_eq!(record.related_cases[0].registration_number, "०८०-RE-०००१");
        assert_eq!(record.session_details.len(), 1);
    }

    #[tokio::test]
    async fn test_no_records_is_none() {
        let server = MockServer::start();
        let search = server.mock(|when, then| {
            when.method(POST).path("/lic/sys.php");
            then.status(200).body("<html><body>No Records Found</body></html>");
        });
        let detail = server.mock(|when, then| {
            when.method(GET).path("/lic/sys.php");
            then.status(200).body(DETAIL);
        });

        let client = client_for(&server);
        let session = client.open_session().expect("session");
        let result = session.fetch_one("081-CR-0002").await.expect("lookup succeeds");

        search.assert();
        detail.assert_hits(0);
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_session_cookie_is_sent_back() {
        let server = MockServer::start();
        let search = server.mock(|when, then| {
            when.method(POST).path("/lic/sys.php");
            then.status(200)
                .header("set-cookie", "PHPSESSID=abc123; Path=/")
                .body(SEARCH_HIT);
        });
        let detail = server.mock(|when, then| {
            when.method(GET)
                .path("/lic/sys.php")
                .header("cookie", "PHPSESSID=abc123");
            then.status(200).body(DETAIL);
        });

        let client = client_for(&server);
        let session = client.open_session().expect("session");
        let html = session.fetch_one("080-CR-0096").await.expect("lookup succeeds");

        search.assert();
        detail.assert();
        assert!(html.is_some());
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_error() {
        let server = MockServer::start();
        let search = server.mock(|when, then| {
            when.method(POST).path("/lic/sys.php");
            then.status(500).body("boom");
        });

        let client = client_for(&server);
        let session = client.open_session().expect("session");
        let err = session
            .fetch_one("080-CR-0096")
            .await
            .expect_err("500 should fail");

        search.assert();
        assert!(err.is_fetch());
    }

    #[tokio::test]
    async fn test_marker_without_link_is_extract_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lic/sys.php");
            then.status(200)
                .body("<p>मुद्दाको बिस्तृत विवरण</p>");
        });

        let client = client_for(&server);
        let session = client.open_session().expect("session");
        let err = session
            .fetch_one("080-CR-0096")
            .await
            .expect_err("no link to follow");
        assert!(err.is_extract());
    }

    #[tokio::test]
    async fn test_fetch_status_counts() {
        let server = MockServer::start();
        let page = server.mock(|when, then| {
            when.method(GET).path("/web/eng/index");
            then.status(200).body(
                r#"<table width="100%"><tr><td>रिट</td><td>७</td></tr><tr><td>Total</td><td>n/a</td></tr></table>"#,
            );
        });

        let client = client_for(&server);
        let session = client.open_session().expect("session");
        let counts = session.fetch_status_counts().await.expect("status page");

        page.assert();
        assert_eq!(counts, vec![StatusCount::new("रिट", 7)]);
    }

    #[test]
    fn test_invalid_base_url() {
        let client = Client::builder().base_url("not a url").build();
        let err = client.open_session().err().expect("invalid base");
        assert!(err.is_invalid_url());
    }
}

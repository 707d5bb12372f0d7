// ABOUTME: Configuration options for the portal client and the ClientBuilder fluent API.
// ABOUTME: Holds portal URLs, the records-found marker, timeouts and the TLS verification switch.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::Client;

/// Default portal base; relative detail links are resolved against it.
pub const DEFAULT_BASE_URL: &str = "https://supremecourt.gov.np/lic/";

/// Case search endpoint, relative to the base URL.
pub const DEFAULT_CASE_DETAILS_PATH: &str = "sys.php?d=reports&f=case_details";

/// Page carrying the daily case-status counts table.
pub const DEFAULT_STATUS_URL: &str = "https://supremecourt.gov.np/web/eng/index";

/// Text of the link from a search result to the case's detail page.
pub const DETAIL_LINK_TEXT: &str = "मुद्दाको बिस्तृत विवरण";

/// Configuration options for the portal client.
#[derive(Debug, Clone)]
pub struct Options {
    pub base_url: String,
    pub case_details_path: String,
    pub status_url: String,
    /// Substring whose presence in the search response means at least one record was found.
    pub records_marker: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// When false, the portal's certificate is accepted without validation.
    pub tls_verification: bool,
    pub headers: HashMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            case_details_path: DEFAULT_CASE_DETAILS_PATH.to_string(),
            status_url: DEFAULT_STATUS_URL.to_string(),
            records_marker: DETAIL_LINK_TEXT.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("nyaya/", env!("CARGO_PKG_VERSION")).to_string(),
            tls_verification: false,
            headers: HashMap::new(),
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the portal base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.opts.base_url = base_url.into();
        self
    }

    /// Set the case search path, relative to the base URL.
    pub fn case_details_path(mut self, path: impl Into<String>) -> Self {
        self.opts.case_details_path = path.into();
        self
    }

    /// Set the URL of the daily status page.
    pub fn status_url(mut self, url: impl Into<String>) -> Self {
        self.opts.status_url = url.into();
        self
    }

    /// Set the records-found marker.
    pub fn records_marker(mut self, marker: impl Into<String>) -> Self {
        self.opts.records_marker = marker.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Enable or disable certificate validation toward the portal.
    pub fn tls_verification(mut self, verify: bool) -> Self {
        self.opts.tls_verification = verify;
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Client {
        Client::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

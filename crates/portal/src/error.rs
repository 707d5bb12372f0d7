// ABOUTME: Error types for the portal client including the ErrorCode enum and PortalError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing different categories of portal failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Fetch,
    Timeout,
    Extract,
    Client,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Extract => "extraction error",
            ErrorCode::Client => "client setup error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for portal operations.
#[derive(Debug, thiserror::Error)]
pub struct PortalError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "portal: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl PortalError {
    fn with_code(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Fetch, url, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Timeout, url, op, source)
    }

    /// Create an Extract error.
    pub fn extract(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Extract, url, op, source)
    }

    /// Create a Client error (the HTTP client could not be built).
    pub fn client(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::with_code(ErrorCode::Client, String::new(), op, source)
    }

    /// Classifies a transport error as Timeout or Fetch.
    pub fn from_transport(url: impl Into<String>, op: impl Into<String>, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(url, op, Some(anyhow::anyhow!("request timed out: {}", err)))
        } else {
            Self::fetch(url, op, Some(anyhow::anyhow!("request failed: {}", err)))
        }
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is an Extract error.
    pub fn is_extract(&self) -> bool {
        self.code == ErrorCode::Extract
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true for failures of the network round trip itself (fetch or timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self.code, ErrorCode::Fetch | ErrorCode::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_source() {
        let err = PortalError::fetch(
            "https://example.test/x",
            "Submit",
            Some(anyhow::anyhow!("HTTP status 500")),
        );
        assert_eq!(
            err.to_string(),
            "portal: Submit https://example.test/x: fetch error: HTTP status 500"
        );
        assert!(err.is_fetch());
        assert!(err.is_transport());
        assert!(!err.is_extract());
    }

    #[test]
    fn test_display_without_source() {
        let err = PortalError::invalid_url("", "Resolve", None);
        assert_eq!(err.to_string(), "portal: Resolve : invalid URL");
        assert!(err.is_invalid_url());
    }
}

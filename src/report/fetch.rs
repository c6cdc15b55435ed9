//! Outbound report requests.
//!
//! The provider only needs "GET this URL, give me the body". Transport,
//! timeouts and retries belong to the [`ReportFetcher`] implementation.

use super::ReportError;

/// Fetches a report body. Called from whichever thread triggered the
/// attach, so implementations must be shareable.
pub trait ReportFetcher: Send + Sync {
    /// GET `url` and return the response body.
    ///
    /// # Errors
    ///
    /// [`ReportError::Http`] for transport failures and non-2xx responses.
    fn fetch(&self, url: &str) -> Result<String, ReportError>;
}

impl<F> ReportFetcher for F
where
    F: Fn(&str) -> Result<String, ReportError> + Send + Sync,
{
    fn fetch(&self, url: &str) -> Result<String, ReportError> {
        self(url)
    }
}

/// Blocking HTTP fetcher backed by `ureq`.
#[cfg(feature = "http")]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    /// Fetcher applying a global per-request timeout.
    #[must_use]
    pub fn new(timeout: std::time::Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: config.into(),
        }
    }
}

#[cfg(feature = "http")]
impl ReportFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, ReportError> {
        log::info!("GET {url}");
        self.agent
            .get(url)
            .call()
            .map_err(|e| ReportError::Http(format!("{url}: {e}")))?
            .into_body()
            .read_to_string()
            .map_err(|e| ReportError::Http(format!("{url}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_fetchers() {
        let fetcher = |url: &str| -> Result<String, ReportError> {
            Ok(format!("body of {url}"))
        };
        assert_eq!(fetcher.fetch("x").unwrap(), "body of x");
    }
}

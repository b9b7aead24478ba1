use thiserror::Error;

/// Failures surfaced by the schedule API client. None of them are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport error, non-2xx status, malformed JSON, or an API-reported
    /// error envelope.
    #[error("network failure: {0}")]
    NetworkFailure(String),
    /// School search returned a well-formed, empty result set.
    #[error("no matching school")]
    NotFound,
    /// A persisted value needed for the request is absent.
    #[error("missing configuration: {0}")]
    ConfigurationMissing(&'static str),
}

impl FetchError {
    pub(crate) fn network(msg: impl Into<String>) -> Self {
        FetchError::NetworkFailure(msg.into())
    }
}

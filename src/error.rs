//! Error taxonomy shared by every service error.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Broad failure class used by callers to pick user-facing guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Missing credentials or configuration. Needs operator action.
    Configuration,
    /// Network or backend failure. The user may retry.
    Transient,
    /// Rejected by the backing store's access rules.
    Permission,
    /// The addressed record does not exist.
    NotFound,
    /// A query capability (such as a composite index) is missing.
    Degraded,
    /// The caller supplied something unusable.
    InvalidInput,
}

impl ErrorClass {
    #[must_use]
    pub fn retryable(self) -> bool {
        matches!(self, Self::Transient)
    }
}

/// Grepable error code, class and retryable flag.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn class(&self) -> ErrorClass;

    fn retryable(&self) -> bool {
        self.class().retryable()
    }
}

//! In-flight gates for async requests issued by the host.
//!
//! Each kind of request (generate, save, list, delete) gets one gate. A gate
//! admits one request at a time: a second submission while one is pending
//! is rejected, not queued. Every admitted request carries a token from a
//! monotonically increasing generation counter, and its response may only
//! be applied while that token is still current. Navigating away calls
//! [`RequestGate::invalidate`], which makes every outstanding token stale.

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;

/// Identity of one admitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    #[must_use]
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    generation: u64,
    in_flight: Option<u64>,
}

impl RequestGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a new request, or `None` if one is already pending.
    pub fn try_begin(&mut self) -> Option<RequestToken> {
        if self.in_flight.is_some() {
            return None;
        }
        self.generation += 1;
        self.in_flight = Some(self.generation);
        Some(RequestToken(self.generation))
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether a response for `token` may still be applied.
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.in_flight == Some(token.0)
    }

    /// Settle the request for `token`.
    ///
    /// Returns `true` if the token was current, in which case the gate
    /// reopens and the caller should apply the response. Stale tokens leave
    /// the gate untouched and return `false`.
    pub fn finish(&mut self, token: RequestToken) -> bool {
        if self.is_current(token) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Make every outstanding token stale and reopen the gate.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }
}

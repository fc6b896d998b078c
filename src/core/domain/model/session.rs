use crate::core::domain::value_object::{ProxmoxCSRFToken, ProxmoxTicket, ProxmoxUrl};
use std::time::Duration;

/// An authenticated API session.
///
/// Produced once by the login exchange and never mutated afterwards; every
/// request made through the session carries the same ticket and CSRF token.
/// Sessions are not refreshed: a caller that outlives the ticket opens a new one.
#[derive(Debug, Clone)]
pub struct Session {
    url: ProxmoxUrl,
    userid: String,
    ticket: ProxmoxTicket,
    csrf_token: ProxmoxCSRFToken,
    lifetime: Duration,
}

impl Session {
    pub(crate) fn new(
        url: ProxmoxUrl,
        userid: String,
        ticket: ProxmoxTicket,
        csrf_token: ProxmoxCSRFToken,
        lifetime: Duration,
    ) -> Self {
        Self {
            url,
            userid,
            ticket,
            csrf_token,
            lifetime,
        }
    }

    /// Base endpoint the session was opened against.
    pub fn url(&self) -> &ProxmoxUrl {
        &self.url
    }

    /// Authenticated user id, e.g. `root@pam`.
    pub fn userid(&self) -> &str {
        &self.userid
    }

    pub fn ticket(&self) -> &ProxmoxTicket {
        &self.ticket
    }

    pub fn csrf_token(&self) -> &ProxmoxCSRFToken {
        &self.csrf_token
    }

    /// Returns `true` once the ticket is older than the configured lifetime.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.ticket.is_expired(self.lifetime)
    }
}

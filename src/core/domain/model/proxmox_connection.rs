use crate::core::domain::{
    error::{ProxmoxError, ProxmoxResult},
    value_object::{
        ProxmoxHost, ProxmoxPassword, ProxmoxPort, ProxmoxRealm, ProxmoxUrl, ProxmoxUsername,
    },
};
use reqwest::Client;
use std::num::NonZeroU32;
use std::time::Duration;

/// How server certificates are treated.
///
/// No `Default` is provided; callers choose explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Validate the certificate chain and host name.
    Verify,
    /// Accept self-signed or otherwise invalid certificates (lab setups).
    AcceptInvalid,
}

impl TlsPolicy {
    /// Maps the `verify_ssl` configuration toggle to a policy.
    #[must_use]
    pub fn from_verify_flag(verify: bool) -> Self {
        if verify {
            TlsPolicy::Verify
        } else {
            TlsPolicy::AcceptInvalid
        }
    }

    #[must_use]
    pub fn accepts_invalid_certs(self) -> bool {
        self == TlsPolicy::AcceptInvalid
    }
}

/// Client-side request rate limit applied to every API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: NonZeroU32,
    pub burst_size: NonZeroU32,
}

/// Everything needed to reach and authenticate against one API endpoint.
#[derive(Debug, Clone)]
pub struct ProxmoxConnection {
    host: ProxmoxHost,
    port: ProxmoxPort,
    username: ProxmoxUsername,
    password: ProxmoxPassword,
    realm: ProxmoxRealm,
    tls: TlsPolicy,
    timeout: Duration,
    rate_limit: Option<RateLimitConfig>,
    ticket_lifetime: Duration,
    url: ProxmoxUrl,
}

impl ProxmoxConnection {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        host: ProxmoxHost,
        port: ProxmoxPort,
        username: ProxmoxUsername,
        password: ProxmoxPassword,
        realm: ProxmoxRealm,
        tls: TlsPolicy,
        timeout: Duration,
        rate_limit: Option<RateLimitConfig>,
        ticket_lifetime: Duration,
        url: ProxmoxUrl,
    ) -> Self {
        Self {
            host,
            port,
            username,
            password,
            realm,
            tls,
            timeout,
            rate_limit,
            ticket_lifetime,
            url,
        }
    }

    pub fn host(&self) -> &ProxmoxHost {
        &self.host
    }

    pub fn port(&self) -> ProxmoxPort {
        self.port
    }

    pub fn username(&self) -> &ProxmoxUsername {
        &self.username
    }

    pub(crate) fn password(&self) -> &ProxmoxPassword {
        &self.password
    }

    pub fn realm(&self) -> &ProxmoxRealm {
        &self.realm
    }

    pub fn tls(&self) -> TlsPolicy {
        self.tls
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn rate_limit(&self) -> Option<RateLimitConfig> {
        self.rate_limit
    }

    pub fn ticket_lifetime(&self) -> Duration {
        self.ticket_lifetime
    }

    pub fn url(&self) -> &ProxmoxUrl {
        &self.url
    }

    /// The full user id the server knows, e.g. `root@pam`.
    #[must_use]
    pub fn userid(&self) -> String {
        format!("{}@{}", self.username.as_str(), self.realm.as_str())
    }

    /// Builds the HTTP transport shared by the login exchange and every later request.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Connection` if the TLS backend cannot be initialised.
    pub(crate) fn http_client(&self) -> ProxmoxResult<Client> {
        Client::builder()
            .danger_accept_invalid_certs(self.tls.accepts_invalid_certs())
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProxmoxError::Connection(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tls_policy_from_flag() {
        assert_eq!(TlsPolicy::from_verify_flag(true), TlsPolicy::Verify);
        assert!(TlsPolicy::from_verify_flag(false).accepts_invalid_certs());
    }

    #[test]
    fn test_userid_joins_username_and_realm() {
        let connection = crate::tests::test_connection("http://127.0.0.1:8006");
        assert_eq!(connection.userid(), "testuser@pam");
    }
}

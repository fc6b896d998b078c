//! Shared fixtures for the crate's tests.

use crate::{
    ApiClient, ProxmoxConnection, ProxmoxHost, ProxmoxPassword, ProxmoxPort, ProxmoxRealm,
    ProxmoxUrl, ProxmoxUsername, Session, TlsPolicy,
    core::domain::value_object::{DEFAULT_TICKET_LIFETIME, ProxmoxCSRFToken, ProxmoxTicket},
};
use std::time::Duration;
use wiremock::MockServer;

mod client_tests;
mod cleanup_tests;

pub(crate) const TEST_TICKET: &str = "PVE:testuser@pam:4EEC61E2::sig";
pub(crate) const TEST_CSRF: &str = "4EEC61E2:token";

/// Connection to `server_url` (e.g. a wiremock server) for `testuser@pam`.
pub(crate) fn test_connection(server_url: &str) -> ProxmoxConnection {
    let authority = server_url
        .trim_start_matches("http://")
        .trim_end_matches('/');
    let (host, port) = authority
        .rsplit_once(':')
        .map(|(h, p)| (h, p.parse().unwrap()))
        .unwrap_or((authority, 8006));
    ProxmoxConnection::new(
        ProxmoxHost::new_unchecked(host.to_string()),
        ProxmoxPort::new_unchecked(port),
        ProxmoxUsername::new_unchecked("testuser".to_string()),
        ProxmoxPassword::new_unchecked("testpass".to_string()),
        ProxmoxRealm::new_unchecked("pam".to_string()),
        TlsPolicy::AcceptInvalid,
        Duration::from_secs(5),
        None,
        DEFAULT_TICKET_LIFETIME,
        ProxmoxUrl::new_unchecked(&format!("{}/", server_url.trim_end_matches('/'))),
    )
}

/// A session as if the login exchange had already succeeded.
pub(crate) fn test_session(server_url: &str) -> Session {
    Session::new(
        ProxmoxUrl::new_unchecked(&format!("{}/", server_url.trim_end_matches('/'))),
        "testuser@pam".to_string(),
        ProxmoxTicket::new_unchecked(TEST_TICKET.to_string()),
        ProxmoxCSRFToken::new_unchecked(TEST_CSRF.to_string()),
        DEFAULT_TICKET_LIFETIME,
    )
}

/// Pre-authenticated client pointed at `mock_server`.
pub(crate) fn authenticated_client(mock_server: &MockServer) -> ApiClient {
    let connection = test_connection(&mock_server.uri());
    ApiClient::new(
        connection.http_client().unwrap(),
        test_session(&mock_server.uri()),
        None,
    )
}

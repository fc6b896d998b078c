use super::{TEST_CSRF, TEST_TICKET};
use crate::{ProxmoxApi, ProxmoxClient, ProxmoxError, TlsPolicy, ValidationError};
use std::num::NonZeroU32;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

fn client_for(mock_server: &MockServer) -> ProxmoxClient {
    let address = mock_server.address();
    ProxmoxClient::builder()
        .host(address.ip().to_string())
        .unwrap()
        .port(address.port())
        .unwrap()
        .credentials("testuser", "testpass", "pam")
        .unwrap()
        .secure(false)
        .tls(TlsPolicy::AcceptInvalid)
        .timeout(Duration::from_secs(5))
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn test_builder_requires_host() {
    let result = ProxmoxClient::builder()
        .credentials("root", "secret", "pam")
        .unwrap()
        .tls(TlsPolicy::Verify)
        .build();
    assert!(matches!(
        result,
        Err(ProxmoxError::Validation(ValidationError::Field { ref field, .. })) if field == "host"
    ));
}

#[test]
fn test_builder_requires_explicit_tls_policy() {
    let result = ProxmoxClient::builder()
        .host("pve.lab.local")
        .unwrap()
        .credentials("root", "secret", "pam")
        .unwrap()
        .build();
    assert!(matches!(
        result,
        Err(ProxmoxError::Validation(ValidationError::Field { ref field, .. })) if field == "tls"
    ));
}

#[test]
fn test_builder_rejects_invalid_values() {
    assert!(ProxmoxClient::builder().host("").is_err());
    assert!(ProxmoxClient::builder().host("-bad-.example").is_err());
    assert!(ProxmoxClient::builder().port(0).is_err());
    assert!(ProxmoxClient::builder().timeout(Duration::ZERO).is_err());
    assert!(
        ProxmoxClient::builder()
            .credentials("root@pam", "secret", "pam")
            .is_err()
    );
}

#[test]
fn test_builder_brackets_ipv6_hosts() {
    let client = ProxmoxClient::builder()
        .host("fd00::10")
        .unwrap()
        .credentials("root", "secret", "pve")
        .unwrap()
        .tls(TlsPolicy::Verify)
        .rate_limit(NonZeroU32::new(10).unwrap(), NonZeroU32::new(5).unwrap())
        .build()
        .unwrap();
    let connection = client.connection();
    assert_eq!(connection.url().as_str(), "https://[fd00::10]:8006/");
    assert_eq!(connection.userid(), "root@pve");
    assert_eq!(connection.timeout(), crate::DEFAULT_TIMEOUT);
    assert_eq!(
        connection.rate_limit().map(|r| r.requests_per_second.get()),
        Some(10)
    );
}

#[tokio::test]
async fn test_open_session_authenticates_once_and_reuses_tokens() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api2/json/access/ticket"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "ticket": TEST_TICKET,
                "CSRFPreventionToken": TEST_CSRF,
                "username": "testuser@pam"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .and(header("cookie", format!("PVEAuthCookie={TEST_TICKET}").as_str()))
        .and(header("CSRFPreventionToken", TEST_CSRF))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": [{"node": "pve", "status": "online"}]})),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let api = client_for(&mock_server).open_session().await.unwrap();
    assert_eq!(api.session().userid(), "testuser@pam");
    api.get("nodes").await.unwrap();
    let nodes = api.get("nodes").await.unwrap();
    assert_eq!(nodes[0]["node"], "pve");
}

#[tokio::test]
async fn test_open_session_rejected_credentials() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api2/json/access/ticket"))
        .respond_with(ResponseTemplate::new(401).set_body_string("authentication failure"))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).open_session().await;
    assert!(matches!(
        result,
        Err(ProxmoxError::Authentication {
            status: Some(401),
            ..
        })
    ));
}

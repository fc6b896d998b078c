use crate::{
    auth::application::{
        request::login_request::LoginRequest, response::login_response::LoginResponse,
    },
    core::domain::{
        error::{ProxmoxError, ProxmoxResult},
        model::{ProxmoxConnection, Session},
        value_object::{ProxmoxCSRFToken, ProxmoxTicket, validate_csrf_token, validate_ticket},
    },
};

use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use tracing::{debug, instrument, warn};

const LOGIN_PATH: &str = "access/ticket";

/// Performs the single authentication exchange that opens a [`Session`].
pub(crate) struct LoginService {
    default_headers: HeaderMap,
}

impl LoginService {
    pub(crate) fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self { default_headers }
    }

    /// Exchanges the connection's credentials for a ticket and CSRF token.
    ///
    /// There is no retry: a non-success status, a transport failure or a
    /// response with malformed tokens is reported as
    /// `ProxmoxError::Authentication` and no session is created.
    #[instrument(skip_all, fields(userid = %connection.userid(), url = %connection.url().as_str()))]
    pub(crate) async fn execute(
        &self,
        http_client: &Client,
        connection: &ProxmoxConnection,
    ) -> ProxmoxResult<Session> {
        let url = connection.url().api_url(LOGIN_PATH);
        let request = LoginRequest::from_connection(connection);

        let response = http_client
            .post(&url)
            .headers(self.default_headers.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "login request failed before a response was received");
                ProxmoxError::Authentication {
                    status: None,
                    body: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "login rejected");
            return Err(ProxmoxError::Authentication {
                status: Some(status.as_u16()),
                body,
            });
        }

        let login_response = response.json::<LoginResponse>().await.map_err(|e| {
            ProxmoxError::Authentication {
                status: Some(status.as_u16()),
                body: format!("Failed to parse login response: {e}"),
            }
        })?;
        self.handle_successful_login(connection, status.as_u16(), login_response)
    }

    fn handle_successful_login(
        &self,
        connection: &ProxmoxConnection,
        status: u16,
        login_response: LoginResponse,
    ) -> ProxmoxResult<Session> {
        let data = login_response.data;
        validate_ticket(&data.ticket)
            .and_then(|()| validate_csrf_token(&data.csrf_token))
            .map_err(|e| {
                warn!(error = %e, "login returned malformed tokens");
                ProxmoxError::Authentication {
                    status: Some(status),
                    body: e.to_string(),
                }
            })?;

        let userid = data.username.unwrap_or_else(|| connection.userid());
        debug!(%userid, "session opened");
        Ok(Session::new(
            connection.url().clone(),
            userid,
            ProxmoxTicket::new_unchecked(data.ticket),
            ProxmoxCSRFToken::new_unchecked(data.csrf_token),
            connection.ticket_lifetime(),
        ))
    }
}

impl Default for LoginService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{TEST_CSRF, TEST_TICKET, test_connection};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    async fn login(server_uri: &str) -> ProxmoxResult<Session> {
        let connection = test_connection(server_uri);
        let client = connection.http_client().unwrap();
        LoginService::new().execute(&client, &connection).await
    }

    #[tokio::test]
    async fn test_login_success_opens_session() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api2/json/access/ticket"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "username": "testuser@pam",
                "password": "testpass"
            })))
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

        let session = login(&mock_server.uri()).await.unwrap();
        assert_eq!(session.userid(), "testuser@pam");
        assert_eq!(session.ticket().as_str(), TEST_TICKET);
        assert_eq!(session.csrf_token().as_str(), TEST_CSRF);
        assert!(!session.is_expired());
    }

    #[tokio::test]
    async fn test_login_rejected_returns_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api2/json/access/ticket"))
            .respond_with(ResponseTemplate::new(401).set_body_string("authentication failure"))
            .expect(1)
            .mount(&mock_server)
            .await;

        match login(&mock_server.uri()).await {
            Err(ProxmoxError::Authentication { status, body }) => {
                assert_eq!(status, Some(401));
                assert_eq!(body, "authentication failure");
            }
            other => panic!("expected authentication error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_transport_failure_has_no_status() {
        // Bind then drop a listener to get a port nothing is serving on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        match login(&format!("http://{addr}")).await {
            Err(ProxmoxError::Authentication { status, .. }) => assert_eq!(status, None),
            other => panic!("expected authentication error, got {other:?}"),
        }
    }

    async fn login_with_tokens(ticket: &str, csrf_token: &str) -> ProxmoxResult<Session> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api2/json/access/ticket"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"ticket": ticket, "CSRFPreventionToken": csrf_token}
            })))
            .mount(&mock_server)
            .await;
        login(&mock_server.uri()).await
    }

    #[tokio::test]
    async fn test_login_malformed_ticket_is_an_authentication_error() {
        match login_with_tokens("garbage", TEST_CSRF).await {
            Err(ProxmoxError::Authentication { status, body }) => {
                assert_eq!(status, Some(200));
                assert!(body.contains("Invalid ticket format"), "{body}");
            }
            other => panic!("expected authentication error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_malformed_csrf_token_is_an_authentication_error() {
        assert!(matches!(
            login_with_tokens(TEST_TICKET, "not-a-token").await,
            Err(ProxmoxError::Authentication {
                status: Some(200),
                ..
            })
        ));
    }
}

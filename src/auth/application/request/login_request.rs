use crate::core::domain::model::ProxmoxConnection;
use serde::Serialize;

/// Body of `POST /access/ticket`.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    /// Full user id, `user@realm`.
    pub username: String,
    pub password: &'a str,
}

impl<'a> LoginRequest<'a> {
    pub(crate) fn from_connection(connection: &'a ProxmoxConnection) -> Self {
        Self {
            username: connection.userid(),
            password: connection.password().as_str(),
        }
    }
}

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub data: LoginResponseData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponseData {
    pub ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    pub csrf_token: String,
    /// User id as echoed by the server.
    #[serde(default)]
    pub username: Option<String>,
}

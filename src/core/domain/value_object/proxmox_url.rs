use crate::core::domain::{
    error::ValidationError,
    value_object::{proxmox_host::ProxmoxHost, proxmox_port::ProxmoxPort},
};
use url::Url;

const API_PREFIX: &str = "api2/json";
const MAX_URL_LENGTH: usize = 2083;

/// The validated base endpoint of a Proxmox API server (e.g. `https://pve.lab:8006/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUrl(Url);

impl ProxmoxUrl {
    /// Builds the base URL from host, port and scheme choice.
    pub(crate) fn from_parts(
        host: &ProxmoxHost,
        port: ProxmoxPort,
        secure: bool,
    ) -> Result<Self, ValidationError> {
        let scheme = if secure { "https" } else { "http" };
        let raw = format!("{scheme}://{}:{}/", host.authority(), port.get());
        validate_url(&raw)?;
        Url::parse(&raw)
            .map(Self)
            .map_err(|e| ValidationError::Format(format!("Invalid URL format: {e}")))
    }

    /// Creates a URL without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(raw: &str) -> Self {
        Self(Url::parse(raw).unwrap())
    }

    /// Returns the base URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Full URL of an API path, e.g. `nodes/pve/qemu` → `https://host:8006/api2/json/nodes/pve/qemu`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.0.as_str().trim_end_matches('/'),
            API_PREFIX,
            path.trim_start_matches('/')
        )
    }
}

/// Validates a base URL: http(s) only, bounded length, no path beyond `/`.
pub(crate) fn validate_url(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::field("url", "URL cannot be empty"));
    }
    if raw.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {MAX_URL_LENGTH} characters"
        )));
    }
    let url =
        Url::parse(raw).map_err(|e| ValidationError::Format(format!("Invalid URL format: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::ConstraintViolation(
            "Invalid scheme. Must be one of: http, https".to_string(),
        ));
    }
    if url.path() != "/" {
        return Err(ValidationError::ConstraintViolation(
            "Base URL must not carry a path".to_string(),
        ));
    }
    Ok(())
}

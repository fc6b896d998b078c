//! Connection settings from flags, the environment and `.env` files.

use crate::{
    DEFAULT_TIMEOUT, ProxmoxClient, ProxmoxClientBuilder, ProxmoxResult, TlsPolicy,
    core::domain::value_object::DEFAULT_PORT,
};
use clap::{ArgAction, Args, builder::BoolishValueParser};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

/// Loads `.env` from the current directory or its parents, if present.
///
/// Variables already set in the environment win over the file.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Connection settings. Every flag falls back to a `PROXMOX_*` variable.
///
/// Certificate verification is off unless enabled, matching the self-signed
/// certificates of a fresh install.
#[derive(Clone, Args)]
pub struct Settings {
    /// API host name or IP address
    #[arg(long, env = "PROXMOX_HOST")]
    pub host: String,

    #[arg(long, env = "PROXMOX_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// User name without realm
    #[arg(long, env = "PROXMOX_USERNAME")]
    pub username: String,

    #[arg(long, env = "PROXMOX_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long, env = "PROXMOX_REALM", default_value = "pam")]
    pub realm: String,

    /// Verify the server certificate
    #[arg(
        long,
        env = "PROXMOX_VERIFY_SSL",
        default_value_t = false,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub verify_ssl: bool,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", env = "PROXMOX_TIMEOUT", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_seconds: u64,

    /// Node to inspect; defaults to the first online node
    #[arg(long, env = "PROXMOX_NODE")]
    pub node: Option<String>,

    /// Client-side limit of requests per second
    #[arg(long, env = "PROXMOX_RATE_LIMIT")]
    pub rate_limit: Option<NonZeroU32>,
}

impl Settings {
    /// Builder populated and validated from these settings.
    pub fn client_builder(&self) -> ProxmoxResult<ProxmoxClientBuilder> {
        let mut builder = ProxmoxClient::builder()
            .host(self.host.clone())?
            .port(self.port)?
            .credentials(
                self.username.clone(),
                self.password.clone(),
                self.realm.clone(),
            )?
            .tls(TlsPolicy::from_verify_flag(self.verify_ssl))
            .timeout(Duration::from_secs(self.timeout_seconds))?;
        if let Some(rate) = self.rate_limit {
            builder = builder.rate_limit(rate, rate);
        }
        Ok(builder)
    }

    pub fn client(&self) -> ProxmoxResult<ProxmoxClient> {
        self.client_builder()?.build()
    }
}

//! Async client and maintenance toolkit for the Proxmox VE API.
//!
//! The crate opens one authenticated [`Session`], reads a node's guests,
//! storage pools and snapshots into an [`Inventory`], plans snapshot cleanup
//! and executes it as a paced batch of independent deletions.

mod auth;
mod cleanup;
pub mod config;
mod core;
mod inventory;
pub mod report;

pub use crate::cleanup::application::{
    request::cleanup_plan::{CleanupCandidate, CleanupPlan, PlanPolicy, Risk},
    service::{
        cleanup_service::{CleanupOptions, CleanupService},
        planner_service::PlannerService,
    },
};
pub use crate::core::domain::{
    error::{ApiError, ApiResult, ProxmoxError, ProxmoxResult, ValidationError},
    model::{
        ClusterOverview, ClusterResource, ClusterStatusItem, CpuInfo, DeletionOutcome,
        DeletionRequest, GuestConfig, GuestUtilization, Inventory, InventoryEntry, LifecycleState,
        MemoryInfo, NetworkInterface, NodeDisk, NodeListItem, NodeService, NodeStatus, PoolItem,
        ProxmoxConnection, RateLimitConfig, ResourceHandle, ResourceKind, RunSummary, Session,
        SnapshotRef, SpaceDelta, StorageUsage, TlsPolicy, UserItem, VersionInfo,
    },
    value_object::{
        CSRF_HEADER, DEFAULT_PORT, DEFAULT_TICKET_LIFETIME, ProxmoxCSRFToken, ProxmoxHost,
        ProxmoxPassword, ProxmoxPort, ProxmoxRealm, ProxmoxTicket, ProxmoxUrl, ProxmoxUsername,
    },
};
pub use crate::core::infrastructure::api_client::{ApiClient, ProxmoxApi};
pub use crate::inventory::application::service::inventory_service::InventoryService;

use crate::{
    auth::application::service::login_service::LoginService,
    core::domain::value_object::{
        validate_host, validate_password, validate_port, validate_realm, validate_username,
    },
};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::instrument;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Entry point: validated connection settings that can open sessions.
///
/// # Examples
///
/// ```no_run
/// use pve_janitor::{ProxmoxApi, ProxmoxClient, ProxmoxResult, TlsPolicy};
///
/// #[tokio::main]
/// async fn main() -> ProxmoxResult<()> {
///     let client = ProxmoxClient::builder()
///         .host("pve.lab.local")?
///         .port(8006)?
///         .credentials("root", "password", "pam")?
///         .tls(TlsPolicy::AcceptInvalid)
///         .build()?;
///
///     let api = client.open_session().await?;
///     let nodes = api.get("nodes").await?;
///     println!("{nodes}");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ProxmoxClient {
    connection: ProxmoxConnection,
}

/// Builder for [`ProxmoxClient`].
///
/// Host, credentials and TLS policy are required; everything else has a default.
#[derive(Debug)]
pub struct ProxmoxClientBuilder {
    host: Option<String>,
    port: u16,
    username: Option<String>,
    password: Option<String>,
    realm: Option<String>,
    secure: bool,
    tls: Option<TlsPolicy>,
    timeout: Duration,
    rate_limit: Option<RateLimitConfig>,
    ticket_lifetime: Duration,
}

impl Default for ProxmoxClientBuilder {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            username: None,
            password: None,
            realm: None,
            secure: true,
            tls: None,
            timeout: DEFAULT_TIMEOUT,
            rate_limit: None,
            ticket_lifetime: DEFAULT_TICKET_LIFETIME,
        }
    }
}

impl ProxmoxClientBuilder {
    pub fn host(mut self, host: impl Into<String>) -> ProxmoxResult<Self> {
        let host = host.into();
        validate_host(&host)?;
        self.host = Some(host);
        Ok(self)
    }

    pub fn port(mut self, port: u16) -> ProxmoxResult<Self> {
        validate_port(port)?;
        self.port = port;
        Ok(self)
    }

    /// Sets the user name (without realm), password and realm.
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
    ) -> ProxmoxResult<Self> {
        let (username, password, realm) = (username.into(), password.into(), realm.into());
        validate_username(&username)?;
        validate_password(&password)?;
        validate_realm(&realm)?;
        self.username = Some(username);
        self.password = Some(password);
        self.realm = Some(realm);
        Ok(self)
    }

    /// Use `https` (default) or plain `http`.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn tls(mut self, tls: TlsPolicy) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Per-request timeout. Must be non-zero.
    pub fn timeout(mut self, timeout: Duration) -> ProxmoxResult<Self> {
        if timeout.is_zero() {
            return Err(ValidationError::field("timeout", "Timeout must be greater than zero").into());
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Client-side request rate limit shared by every request of a session.
    pub fn rate_limit(mut self, requests_per_second: NonZeroU32, burst_size: NonZeroU32) -> Self {
        self.rate_limit = Some(RateLimitConfig {
            requests_per_second,
            burst_size,
        });
        self
    }

    /// How long a ticket is considered valid before requests start logging warnings.
    pub fn ticket_lifetime(mut self, lifetime: Duration) -> Self {
        self.ticket_lifetime = lifetime;
        self
    }

    pub fn build(self) -> ProxmoxResult<ProxmoxClient> {
        let host = self.host.ok_or_else(|| ValidationError::field("host", "Host is required"))?;
        let username = self
            .username
            .ok_or_else(|| ValidationError::field("username", "Username is required"))?;
        let password = self
            .password
            .ok_or_else(|| ValidationError::field("password", "Password is required"))?;
        let realm = self
            .realm
            .ok_or_else(|| ValidationError::field("realm", "Realm is required"))?;
        let tls = self
            .tls
            .ok_or_else(|| ValidationError::field("tls", "TLS policy must be chosen explicitly"))?;

        let host = ProxmoxHost::new_unchecked(host);
        let port = ProxmoxPort::new_unchecked(self.port);
        let url = ProxmoxUrl::from_parts(&host, port, self.secure)?;

        let connection = ProxmoxConnection::new(
            host,
            port,
            ProxmoxUsername::new_unchecked(username),
            ProxmoxPassword::new_unchecked(password),
            ProxmoxRealm::new_unchecked(realm),
            tls,
            self.timeout,
            self.rate_limit,
            self.ticket_lifetime,
            url,
        );

        Ok(ProxmoxClient { connection })
    }
}

impl ProxmoxClient {
    pub fn builder() -> ProxmoxClientBuilder {
        ProxmoxClientBuilder::default()
    }

    pub fn connection(&self) -> &ProxmoxConnection {
        &self.connection
    }

    /// Authenticates once and returns a client bound to the new session.
    ///
    /// # Errors
    ///
    /// * `ProxmoxError::Authentication` if the server rejects the credentials,
    ///   cannot be reached or answers with malformed tokens
    /// * `ProxmoxError::Connection` if the HTTP transport cannot be created
    #[instrument(skip(self), fields(url = %self.connection.url().as_str()))]
    pub async fn open_session(&self) -> ProxmoxResult<ApiClient> {
        let http_client = self.connection.http_client()?;
        let session = LoginService::new()
            .execute(&http_client, &self.connection)
            .await?;
        Ok(ApiClient::new(
            http_client,
            session,
            self.connection.rate_limit(),
        ))
    }
}

#[cfg(test)]
mod tests;

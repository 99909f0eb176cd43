//! Domain types for SSO verification and provisioning.

use secrecy::Secret;
use serde::Deserialize;
use uuid::Uuid;

/// Operational settings for the SSO bridge.
///
/// Mutable by an administrator at runtime; every verification call works
/// from one atomic snapshot of this struct so the base URL and secret
/// always agree.
#[derive(Clone, Debug)]
pub struct SsoSettings {
    /// Base address of the companion service. May or may not carry a
    /// trailing slash; the client tolerates either.
    pub companion_base_url: String,
    /// Bearer credential sent on every outbound call. Empty is a valid
    /// (if insecure) value, never absent.
    pub shared_secret: Secret<String>,
    /// When false, every verification attempt fails fast with no network call.
    pub enabled: bool,
    /// Whether an unknown remote identity causes local account creation.
    pub auto_create_users: bool,
    /// Whether the remote-asserted admin flag is applied to the local account.
    pub sync_admin_status: bool,
    /// Observability toggle only; never alters outcomes.
    pub log_attempts: bool,
}

/// Identity assertion returned by the companion service for a valid token.
///
/// Ephemeral; produced once per validation call and never persisted.
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteIdentity {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

/// A user record as seen through the user-store boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalUser {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

/// Result of one token validation attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The token checked out and maps to a local account.
    Verified { user_id: Uuid, username: String },
    /// The token or the identity behind it was refused.
    Rejected(RejectReason),
    /// The companion service or the user store could not be reached.
    Unavailable(UnavailableReason),
}

/// Why a validation attempt was refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// SSO is switched off in the settings.
    SsoDisabled,
    /// The caller supplied no token.
    MissingToken,
    /// The companion service answered with a non-success status.
    RemoteDenied(u16),
    /// The companion answered in-range but without a usable identity.
    MalformedResponse,
    /// No local account exists and auto-creation is disabled.
    UnknownUser,
}

/// Why a validation attempt could not be decided.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The companion call exceeded the per-call timeout.
    Timeout,
    /// DNS, connection, or TLS failure reaching the companion.
    Transport(String),
    /// The user store failed during lookup or provisioning.
    StoreError(String),
}

/// Result of an administrator-triggered connectivity probe.
#[derive(Clone, Debug)]
pub struct ConnectivityResult {
    pub success: bool,
    pub message: String,
}

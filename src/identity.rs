// ============================================================================
// Identity Simulation
// ============================================================================
//
// The gateway does not verify tokens. A fixed set of literal credentials
// maps to a role and subject id; everything else is a guest. Backends read
// the resulting X-User-Role / X-User-Id headers for authorization.
//
// A production deployment swaps `StaticTokenIdentity` for a real verifier
// (e.g. JWT) behind the same `IdentityProvider` trait; the router and
// forwarder are unaware of the difference.
//
// ============================================================================

/// Role carried to backends in the `X-User-Role` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Guest,
    User,
    Admin,
}

impl Role {
    /// Wire form used in forwarded headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// Identity derived from the inbound credential. Lives for one request,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub role: Role,
    pub subject_id: Option<String>,
}

impl Identity {
    pub fn guest() -> Self {
        Self {
            role: Role::Guest,
            subject_id: None,
        }
    }
}

/// Pluggable credential-to-identity resolution.
pub trait IdentityProvider: Send + Sync {
    /// Resolve the raw `Authorization` header value (if any) to an identity.
    /// Must never fail: unknown or absent credentials degrade to guest.
    fn identify(&self, credential: Option<&str>) -> Identity;
}

const ADMIN_TOKEN: &str = "Bearer admin-token";
const USER_TOKEN: &str = "Bearer user-token";

const ADMIN_SUBJECT_ID: &str = "100";
const USER_SUBJECT_ID: &str = "101";

/// Literal-token identity simulator.
pub struct StaticTokenIdentity;

impl IdentityProvider for StaticTokenIdentity {
    fn identify(&self, credential: Option<&str>) -> Identity {
        match credential {
            Some(ADMIN_TOKEN) => {
                tracing::info!("Admin token detected");
                Identity {
                    role: Role::Admin,
                    subject_id: Some(ADMIN_SUBJECT_ID.to_string()),
                }
            }
            Some(USER_TOKEN) => {
                tracing::info!("User token detected");
                Identity {
                    role: Role::User,
                    subject_id: Some(USER_SUBJECT_ID.to_string()),
                }
            }
            Some(other) => {
                tracing::info!(token = %other, "Unknown token in Authorization header");
                Identity::guest()
            }
            None => Identity::guest(),
        }
    }
}

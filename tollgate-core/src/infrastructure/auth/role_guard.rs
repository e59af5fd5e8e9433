//! Role-based authorization on top of [`AuthGate`]

use std::sync::Arc;
use tracing::debug;

use super::gate::{AuthGate, Authenticated};
use crate::application::errors::GateError;
use crate::domain::auth::{CredentialKind, Identity, RoleSet};

/// Decides whether an identity may perform an operation requiring `required`
pub trait AuthorizationPolicy: Send + Sync {
    fn is_authorized(&self, identity: &Identity, required: &RoleSet) -> bool;
}

/// Authorizes identities whose role is a member of the required set
///
/// An empty set authorizes nobody.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleMembershipPolicy;

impl AuthorizationPolicy for RoleMembershipPolicy {
    fn is_authorized(&self, identity: &Identity, required: &RoleSet) -> bool {
        required.contains(identity.role)
    }
}

/// Gate that additionally enforces an allowed-role set
pub struct RoleGuard {
    gate: Arc<AuthGate>,
    policy: Arc<dyn AuthorizationPolicy>,
}

impl RoleGuard {
    pub fn new(gate: Arc<AuthGate>, policy: Arc<dyn AuthorizationPolicy>) -> Self {
        Self { gate, policy }
    }

    /// Role guard using [`RoleMembershipPolicy`]
    pub fn with_membership_policy(gate: Arc<AuthGate>) -> Self {
        Self::new(gate, Arc::new(RoleMembershipPolicy))
    }

    /// Authenticate an access credential, then check its identity against `required`
    pub async fn authorize(
        &self,
        token: &str,
        required: &RoleSet,
    ) -> Result<Authenticated, GateError> {
        let authenticated = self.gate.authenticate(token, CredentialKind::Access).await?;

        if !self.policy.is_authorized(&authenticated.identity, required) {
            debug!(
                identity_id = %authenticated.identity.id,
                role = %authenticated.identity.role,
                required = %required,
                "Role not permitted"
            );
            return Err(GateError::RoleForbidden);
        }

        Ok(authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::{IdentityId, Role};

    #[test]
    fn test_membership_policy() {
        let policy = RoleMembershipPolicy;
        let admin = Identity::new(IdentityId::generate(), "a@example.com", Role::Admin);
        let user = Identity::new(IdentityId::generate(), "u@example.com", Role::User);
        let admins = RoleSet::from([Role::Admin]);
        let everyone = RoleSet::new(Role::all());

        assert!(policy.is_authorized(&admin, &admins));
        assert!(!policy.is_authorized(&user, &admins));
        assert!(policy.is_authorized(&user, &everyone));
        assert!(!policy.is_authorized(&admin, &RoleSet::default()));
    }
}

//! Authentication domain entities

use serde_json::Value;

use super::value_objects::*;

/// Resolved caller identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Unique identity identifier
    pub id: IdentityId,
    /// Identity email address
    pub email: String,
    /// Role used for authorization decisions
    pub role: Role,
}

impl Identity {
    /// Create a new identity
    pub fn new(id: IdentityId, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }

    /// Check if identity has a specific role
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Check if identity is an admin
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Claims embedded in credentials issued for this identity
    pub fn to_claims(&self) -> ClaimMap {
        let mut claims = ClaimMap::new();
        claims.insert("email".to_string(), Value::String(self.email.clone()));
        claims.insert(
            IDENTITY_ID_CLAIM.to_string(),
            Value::String(self.id.as_str()),
        );
        claims.insert(
            "role".to_string(),
            Value::String(self.role.as_str().to_string()),
        );
        claims
    }
}

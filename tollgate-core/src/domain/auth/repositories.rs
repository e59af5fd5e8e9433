//! Identity repository trait

use async_trait::async_trait;

use super::entities::Identity;
use super::errors::IdentityRepositoryError;
use super::value_objects::IdentityId;

/// Lookup of identities referenced by credentials
///
/// Implemented by the hosting application over its own persistence.
#[async_trait]
pub trait IIdentityRepository: Send + Sync {
    /// Find an identity by ID, `None` if it no longer exists
    async fn find_by_id(
        &self,
        identity_id: &IdentityId,
    ) -> Result<Option<Identity>, IdentityRepositoryError>;
}

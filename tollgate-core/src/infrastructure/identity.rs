//! In-memory identity repository for development and tests

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::auth::{IIdentityRepository, Identity, IdentityId, IdentityRepositoryError};

#[derive(Default)]
pub struct InMemoryIdentityRepository {
    identities: RwLock<HashMap<IdentityId, Identity>>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identities(identities: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            identities: RwLock::new(
                identities
                    .into_iter()
                    .map(|identity| (identity.id, identity))
                    .collect(),
            ),
        }
    }

    /// Insert or replace an identity
    pub async fn insert(&self, identity: Identity) {
        self.identities.write().await.insert(identity.id, identity);
    }

    pub async fn remove(&self, identity_id: &IdentityId) -> Option<Identity> {
        self.identities.write().await.remove(identity_id)
    }
}

#[async_trait]
impl IIdentityRepository for InMemoryIdentityRepository {
    async fn find_by_id(
        &self,
        identity_id: &IdentityId,
    ) -> Result<Option<Identity>, IdentityRepositoryError> {
        Ok(self.identities.read().await.get(identity_id).cloned())
    }
}

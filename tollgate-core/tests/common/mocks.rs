//! Store and repository doubles for failure-mode tests

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tollgate_core::application::errors::StoreError;
use tollgate_core::domain::auth::{
    IIdentityRepository, Identity, IdentityId, IdentityRepositoryError,
};
use tollgate_core::infrastructure::store::{
    InMemoryStore, KeyValueStore, WindowAdmission, WindowOutcome,
};

/// Store whose every operation fails as if the server were down
#[derive(Default)]
pub struct UnavailableStore {
    pub calls: AtomicUsize,
}

impl UnavailableStore {
    fn fail(&self, operation: &'static str) -> StoreError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StoreError::unavailable(operation, "Connection refused (os error 111)")
    }
}

#[async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(self.fail("get"))
    }

    async fn set_ex(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), StoreError> {
        Err(self.fail("set"))
    }

    async fn exists(&self, _key: &str) -> Result<bool, StoreError> {
        Err(self.fail("exists"))
    }

    async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
        Err(self.fail("delete"))
    }

    async fn window_admit(
        &self,
        _admission: &WindowAdmission,
    ) -> Result<WindowOutcome, StoreError> {
        Err(self.fail("window_admit"))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(self.fail("ping"))
    }
}

/// Store that reads normally but rejects every write
pub struct ReadOnlyStore {
    pub inner: Arc<InMemoryStore>,
    pub failed_writes: AtomicUsize,
}

impl ReadOnlyStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            failed_writes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(key).await
    }

    async fn set_ex(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), StoreError> {
        self.failed_writes.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Timeout { operation: "set" })
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.delete(key).await
    }

    async fn window_admit(
        &self,
        admission: &WindowAdmission,
    ) -> Result<WindowOutcome, StoreError> {
        self.inner.window_admit(admission).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Identity repository whose backing database is down
pub struct UnavailableIdentityRepository;

#[async_trait]
impl IIdentityRepository for UnavailableIdentityRepository {
    async fn find_by_id(
        &self,
        _identity_id: &IdentityId,
    ) -> Result<Option<Identity>, IdentityRepositoryError> {
        Err(IdentityRepositoryError::Unavailable {
            message: "connection pool exhausted".to_string(),
        })
    }
}

/// Counts how many times a compute closure actually ran
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn hit(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

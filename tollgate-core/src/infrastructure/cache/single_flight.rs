//! Per-key request coalescing
//!
//! Concurrent misses on one key queue on a shared slot. The first holder
//! computes and leaves its serialized payload in the slot; the ones behind it
//! pick that payload up instead of computing again. A holder that fails or is
//! dropped leaves the slot empty, so the next one in line computes.
//!
//! A slot stays registered until every holder and waiter on it has left, so
//! requests arriving while a follower recomputes still queue behind it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<Option<String>>>;

struct Registration {
    slot: Slot,
    /// Tasks holding or waiting for the slot
    holders: usize,
}

#[derive(Default)]
pub struct SingleFlight {
    flights: Mutex<HashMap<String, Registration>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of the slot for `key`
    pub async fn acquire(&self, key: &str) -> Flight<'_> {
        let ticket = {
            let mut flights = self
                .flights
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let registration = flights
                .entry(key.to_string())
                .or_insert_with(|| Registration {
                    slot: Arc::new(AsyncMutex::new(None)),
                    holders: 0,
                });
            registration.holders += 1;
            Ticket {
                owner: self,
                key: key.to_string(),
                slot: registration.slot.clone(),
            }
        };

        // A cancelled wait drops the ticket, which releases the registration
        let guard = ticket.slot.clone().lock_owned().await;
        Flight { guard, ticket }
    }

    /// Keys with a flight currently registered
    pub fn in_flight(&self) -> usize {
        self.flights
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

/// Counted membership in one key's registration
struct Ticket<'a> {
    owner: &'a SingleFlight,
    key: String,
    slot: Slot,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        let mut flights = self
            .owner
            .flights
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(registration) = flights.get_mut(&self.key) else {
            return;
        };
        if !Arc::ptr_eq(&registration.slot, &self.slot) {
            return;
        }
        registration.holders = registration.holders.saturating_sub(1);
        if registration.holders == 0 {
            flights.remove(&self.key);
        }
    }
}

/// Exclusive hold on one key's slot
pub struct Flight<'a> {
    // Unlocks before the ticket is released
    guard: OwnedMutexGuard<Option<String>>,
    ticket: Ticket<'a>,
}

impl Flight<'_> {
    /// Payload left by an earlier holder, if it completed
    pub fn payload(&self) -> Option<&str> {
        self.guard.as_deref()
    }

    /// Publish the payload to everyone queued on this key
    pub fn complete(&mut self, payload: String) {
        *self.guard = Some(payload);
    }

    pub fn key(&self) -> &str {
        &self.ticket.key
    }
}

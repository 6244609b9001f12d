//! Persistence hook for player records.
//!
//! Splat doesn't ship a database layer. Instead it defines the
//! [`PlayerStore`] trait: load a record by id, save a record. Plug in a
//! SQL backend, a key-value store, or a mock in tests, all without
//! touching server code. [`MemoryStore`] is the default.

use std::collections::HashMap;

use splat_protocol::PlayerId;
use tokio::sync::RwLock;

use crate::{PlayerRecord, StoreError};

/// Loads and saves player records.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because one store is shared by every
/// connection task and the game loop for the life of the server.
///
/// # Example
///
/// ```rust
/// use splat_player::{PlayerRecord, PlayerStore, StoreError};
/// use splat_protocol::PlayerId;
///
/// /// Forgets everything. Useful when persistence is off.
/// struct NullStore;
///
/// impl PlayerStore for NullStore {
///     async fn load_player(&self, _id: PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
///         Ok(None)
///     }
///
///     async fn save_player(&self, _record: &PlayerRecord) -> Result<(), StoreError> {
///         Ok(())
///     }
/// }
/// ```
pub trait PlayerStore: Send + Sync + 'static {
    /// Returns the stored record, or `Ok(None)` if this player has never
    /// been saved.
    fn load_player(
        &self,
        id: PlayerId,
    ) -> impl std::future::Future<Output = Result<Option<PlayerRecord>, StoreError>> + Send;

    /// Inserts or overwrites the record for `record.id`.
    fn save_player(
        &self,
        record: &PlayerRecord,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// In-process [`PlayerStore`]. Contents are lost when the server exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<PlayerId, PlayerRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl PlayerStore for MemoryStore {
    async fn load_player(&self, id: PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn save_player(&self, record: &PlayerRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(())
    }
}

//! Storage gateway seam.
//!
//! The core hands finished envelope documents to a [`StorageGateway`] and
//! reads them back; the gateway never interprets schema versions. Gateway
//! errors reach callers unchanged.

pub mod memory;

use std::fmt;

use crate::config::StoreConfig;
use crate::error::StorageError;
use crate::model::Document;

pub use memory::MemoryStore;

/// Collection holding structures.
pub const STRUCTURES: &str = "structures";

/// Collection holding computations.
pub const COMPUTATIONS: &str = "computations";

/// A document store organised in named collections keyed by id.
pub trait StorageGateway: Send + Sync {
    /// Inserts or replaces the document stored under `id`.
    fn put(&self, collection: &str, id: &str, document: Document) -> Result<(), StorageError>;

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StorageError>;

    /// Removes the document under `id`. Returns false if there was none.
    fn delete(&self, collection: &str, id: &str) -> Result<bool, StorageError>;

    /// Returns the documents whose id is in `ids` (all documents when `ids`
    /// is empty), reduced to the `projection` fields when given.
    fn find(
        &self,
        collection: &str,
        ids: &[String],
        projection: Option<&[&str]>,
    ) -> Result<Vec<Document>, StorageError>;
}

/// Handle to the storage backend, owned by whoever runs the service and
/// passed by reference to the code that needs it.
pub struct Database {
    gateway: Box<dyn StorageGateway>,
    config: StoreConfig,
}

impl Database {
    pub fn new(gateway: Box<dyn StorageGateway>, config: StoreConfig) -> Self {
        Self { gateway, config }
    }

    /// A database backed by a fresh [`MemoryStore`].
    pub fn in_memory(config: StoreConfig) -> Self {
        let store = MemoryStore::new(config.clone());
        Self::new(Box::new(store), config)
    }

    pub fn gateway(&self) -> &dyn StorageGateway {
        self.gateway.as_ref()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

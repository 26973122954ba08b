//! In-process storage backend.
//!
//! Documents are kept as encoded bytes, exactly as a remote store would
//! receive them, so every read and write goes through the binary document
//! format (and zstd, when enabled).

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::codec::{
    decode_document_with_limits, encode_document_compressed_with_limits, encode_document_with_limits,
};
use crate::config::StoreConfig;
use crate::error::StorageError;
use crate::model::Document;
use crate::storage::StorageGateway;

type Collection = BTreeMap<String, Vec<u8>>;

/// Thread-safe in-memory document store.
pub struct MemoryStore {
    collections: RwLock<FxHashMap<String, Collection>>,
    config: StoreConfig,
}

impl MemoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            collections: RwLock::new(FxHashMap::default()),
            config,
        }
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, BTreeMap::len)
    }

    /// Total encoded bytes held in `collection`.
    pub fn stored_bytes(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, |c| c.values().map(Vec::len).sum())
    }

    /// Removes every collection.
    pub fn clear(&self) {
        self.collections.write().clear();
    }

    /// Encodes under the same limits reads use, so every accepted write
    /// can be read back.
    fn encode(&self, document: &Document) -> Result<Vec<u8>, StorageError> {
        let compression = &self.config.compression;
        let limits = &self.config.limits;
        let bytes = if compression.enabled {
            encode_document_compressed_with_limits(document, compression.level, limits)?
        } else {
            encode_document_with_limits(document, limits)?
        };
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Document, StorageError> {
        Ok(decode_document_with_limits(bytes, &self.config.limits)?)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let collections = self.collections.read();
        f.debug_struct("MemoryStore")
            .field("collections", &collections.len())
            .field(
                "documents",
                &collections.values().map(BTreeMap::len).sum::<usize>(),
            )
            .finish()
    }
}

impl StorageGateway for MemoryStore {
    fn put(&self, collection: &str, id: &str, document: Document) -> Result<(), StorageError> {
        let bytes = self.encode(&document)?;
        trace!(collection, id, bytes = bytes.len(), "put");
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), bytes);
        Ok(())
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StorageError> {
        let collections = self.collections.read();
        match collections.get(collection).and_then(|c| c.get(id)) {
            Some(bytes) => self.decode(bytes).map(Some),
            None => Ok(None),
        }
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool, StorageError> {
        let removed = self
            .collections
            .write()
            .get_mut(collection)
            .is_some_and(|c| c.remove(id).is_some());
        Ok(removed)
    }

    fn find(
        &self,
        collection: &str,
        ids: &[String],
        projection: Option<&[&str]>,
    ) -> Result<Vec<Document>, StorageError> {
        let collections = self.collections.read();
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let selected: Vec<&Vec<u8>> = if ids.is_empty() {
            documents.values().collect()
        } else {
            documents
                .iter()
                .filter(|(id, _)| ids.contains(*id))
                .map(|(_, bytes)| bytes)
                .collect()
        };

        selected
            .into_iter()
            .map(|bytes| {
                let document = self.decode(bytes)?;
                Ok(match projection {
                    Some(fields) => project(&document, fields),
                    None => document,
                })
            })
            .collect()
    }
}

/// Keeps only `fields`, in stored order.
fn project(document: &Document, fields: &[&str]) -> Document {
    document
        .iter()
        .filter(|(name, _)| fields.contains(name))
        .map(|(name, value)| (name, value.clone()))
        .collect()
}

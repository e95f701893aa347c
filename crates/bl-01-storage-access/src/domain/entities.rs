//! # Domain Entities
//!
//! Persistable entity contract and stored row representation.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::errors::StoreError;

/// Identifier assigned by the backing store on insert.
///
/// Ids are generated per table and increase monotonically, starting at 1.
pub type RowId = u64;

/// A domain object that can be persisted as a row of one table.
///
/// Entities carry no identity of their own; the store assigns a [`RowId`]
/// when the row is written.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table the entity lives in.
    const TABLE: &'static str;

    /// Encode the entity into a row payload.
    fn encode(&self) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a row payload.
    fn decode(payload: &[u8]) -> Result<Self, StoreError> {
        Ok(bincode::deserialize(payload)?)
    }
}

/// A persisted entity together with its store-assigned id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRow<T> {
    /// Store-assigned id.
    pub id: RowId,
    /// The entity.
    pub entity: T,
}

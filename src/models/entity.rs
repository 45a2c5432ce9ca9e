//! The contract every crawled record type fulfils.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{EntityKind, RankingKey};

/// A typed projection of one remote search hit.
pub trait Entity: Clone + Serialize + Send + Sync + 'static {
    /// Raw search hit as returned by the remote API.
    type Raw: DeserializeOwned + Send + Sync + 'static;

    const KIND: EntityKind;

    /// Stable numeric identity. Names can change, IDs do not.
    fn id(&self) -> u64;

    /// Value of `key` for this entity, `None` if the key belongs to another kind.
    fn score(&self, key: RankingKey) -> Option<u64>;
}

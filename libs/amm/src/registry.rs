//! Pool Registry
//!
//! Maps canonical pair keys to pool records. Each pool sits behind its own
//! `RwLock`, so operations on different pairs never contend and every
//! mutation of one pool is serialized against all other access to it.

use crate::error::AmmResult;
use crate::pool::Pool;
use crate::types::{AssetId, Orientation, PairKey};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Shared handle to a pool plus the caller's orientation onto it
#[derive(Debug, Clone)]
pub struct PoolRef {
    pub key: PairKey,
    pub orientation: Orientation,
    pub pool: Arc<RwLock<Pool>>,
}

/// All pools known to one exchange
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: DashMap<PairKey, Arc<RwLock<Pool>>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the pool for the pair, allocating an empty one on first use
    pub fn get_or_create_pool(&self, asset_x: AssetId, asset_y: AssetId) -> AmmResult<PoolRef> {
        let (key, orientation) = PairKey::new(asset_x, asset_y)?;

        let pool = self
            .pools
            .entry(key)
            .or_insert_with(|| {
                info!(pair = %key, pair_address = ?key.pair_address(), "Created pool");
                Arc::new(RwLock::new(Pool::new(key)))
            })
            .clone();

        Ok(PoolRef {
            key,
            orientation,
            pool,
        })
    }

    /// Look up an existing pool without creating state
    pub fn get_pool(&self, asset_x: AssetId, asset_y: AssetId) -> AmmResult<Option<PoolRef>> {
        let (key, orientation) = PairKey::new(asset_x, asset_y)?;

        Ok(self.pools.get(&key).map(|entry| PoolRef {
            key,
            orientation,
            pool: entry.value().clone(),
        }))
    }

    /// Insert a fully built pool, replacing any existing record for its pair
    pub(crate) fn insert(&self, pool: Pool) {
        self.pools.insert(pool.key(), Arc::new(RwLock::new(pool)));
    }

    pub fn pair_count(&self) -> usize {
        self.pools.len()
    }

    /// Keys of every registered pair, sorted
    pub fn pairs(&self) -> Vec<PairKey> {
        let mut keys: Vec<PairKey> = self.pools.iter().map(|entry| *entry.key()).collect();
        keys.sort();
        keys
    }

    /// Consistent copy of each pool, sorted by pair key
    pub fn snapshot_pools(&self) -> Vec<Pool> {
        self.pairs()
            .into_iter()
            .filter_map(|key| self.pools.get(&key).map(|entry| entry.value().read().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AmmError;
    use ethers_core::types::{Address, U256};

    fn asset(n: u64) -> AssetId {
        Address::from_low_u64_be(n)
    }

    #[test]
    fn test_get_pool_does_not_create() {
        let registry = PoolRegistry::new();
        assert!(registry.get_pool(asset(1), asset(2)).unwrap().is_none());
        assert_eq!(registry.pair_count(), 0);
    }

    #[test]
    fn test_either_order_resolves_same_pool() {
        let registry = PoolRegistry::new();
        let ab = registry.get_or_create_pool(asset(1), asset(2)).unwrap();
        let ba = registry.get_or_create_pool(asset(2), asset(1)).unwrap();

        assert_eq!(registry.pair_count(), 1);
        assert!(Arc::ptr_eq(&ab.pool, &ba.pool));
        assert_eq!(ab.orientation, Orientation::Canonical);
        assert_eq!(ba.orientation, Orientation::Reversed);

        let found = registry.get_pool(asset(2), asset(1)).unwrap().unwrap();
        assert!(Arc::ptr_eq(&found.pool, &ab.pool));
    }

    #[test]
    fn test_new_pool_starts_empty() {
        let registry = PoolRegistry::new();
        let pool_ref = registry.get_or_create_pool(asset(3), asset(4)).unwrap();
        let pool = pool_ref.pool.read();
        assert!(pool.is_empty());
        assert_eq!(pool.canonical_reserves(), (U256::zero(), U256::zero()));
    }

    #[test]
    fn test_identical_assets_rejected() {
        let registry = PoolRegistry::new();
        assert_eq!(
            registry.get_or_create_pool(asset(1), asset(1)).unwrap_err(),
            AmmError::IdenticalAssets
        );
        assert_eq!(registry.pair_count(), 0);
    }

    #[test]
    fn test_pairs_sorted() {
        let registry = PoolRegistry::new();
        registry.get_or_create_pool(asset(5), asset(6)).unwrap();
        registry.get_or_create_pool(asset(2), asset(1)).unwrap();

        let pairs = registry.pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].token0(), asset(1));
        assert_eq!(pairs[1].token0(), asset(5));
        assert_eq!(registry.snapshot_pools().len(), 2);
    }
}

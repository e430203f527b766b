//! Write-around invalidation after a transaction is updated or deleted

use tracing::{error, info};

use super::keys::CacheKey;
use super::manager::CacheManager;

impl CacheManager {
    /// Drop every cached view that may describe transaction `id`.
    ///
    /// Removes `transaction:{id}`, every listing page and analytics metric of
    /// each owner, and the unscoped listing pages. `owners` holds the owner
    /// before and after the mutation; duplicates are ignored. Returns the
    /// number of keys removed, counting the single-record key as one even
    /// when it was not cached.
    pub async fn invalidate_transaction(&self, id: i64, owners: &[i64]) -> u64 {
        let mut patterns = vec![CacheKey::transaction(id).to_string()];
        let mut seen = Vec::with_capacity(owners.len());
        for &user_id in owners {
            if seen.contains(&user_id) {
                continue;
            }
            seen.push(user_id);
            patterns.push(CacheKey::transaction_list_pattern(Some(user_id)));
            patterns.push(CacheKey::analytics_pattern(user_id));
        }
        patterns.push(CacheKey::transaction_list_pattern(None));

        let mut removed = 0;
        for pattern in &patterns {
            let result = if pattern.ends_with('*') {
                self.store().scan_delete(pattern).await
            } else {
                self.store().delete(pattern).await.map(|()| 1)
            };

            match result {
                Ok(count) => removed += count,
                // The write is already committed; stale entries now live until their TTL
                Err(e) => error!("Failed to invalidate cache pattern {}: {}", pattern, e),
            }
        }

        info!(
            "Invalidated cache entries for transaction {} (owners {:?}): {} keys",
            id, seen, removed
        );
        removed
    }
}

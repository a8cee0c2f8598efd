//! Time-boxed cache of rendered statements.
//!
//! One blob per metadata row. At most one live row per (register, format)
//! once a store completes; expired rows are swept by [`ExportCache::purge_expired`].

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use till_shared::types::{CashRegisterId, ExportId};

use super::error::ExportError;
use super::types::{CachedArtifact, CashRegisterExport, ExportFormat, NewExport};
use crate::storage::StorageError;

/// Repository trait for export metadata.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait ExportRepository: Send + Sync {
    /// Newest row for the pair with `expires_at > now`.
    fn find_latest_valid(
        &self,
        register_id: CashRegisterId,
        format: ExportFormat,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<CashRegisterExport>, ExportError>> + Send;

    /// Insert a metadata row.
    fn insert(
        &self,
        export: NewExport,
    ) -> impl Future<Output = Result<CashRegisterExport, ExportError>> + Send;

    /// Every row for the pair, valid or not.
    fn list_for_pair(
        &self,
        register_id: CashRegisterId,
        format: ExportFormat,
    ) -> impl Future<Output = Result<Vec<CashRegisterExport>, ExportError>> + Send;

    /// Rows with `expires_at < now`.
    fn list_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<CashRegisterExport>, ExportError>> + Send;

    /// Delete a row. Returns whether it existed.
    fn delete(&self, id: ExportId) -> impl Future<Output = Result<bool, ExportError>> + Send;
}

/// Blob storage capability.
pub trait BlobStore: Send + Sync {
    /// Write a blob.
    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Read a blob. `None` when missing.
    fn get(&self, key: &str)
    -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send;

    /// Delete a blob. Missing blobs count as deleted.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Default lifetime of a cached export.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Export cache over a metadata repository and a blob store.
pub struct ExportCache<E: ExportRepository, B: BlobStore> {
    repo: Arc<E>,
    blobs: Arc<B>,
    ttl: Duration,
}

impl<E: ExportRepository, B: BlobStore> ExportCache<E, B> {
    /// Create a cache with the default 24h TTL.
    #[must_use]
    pub fn new(repo: Arc<E>, blobs: Arc<B>) -> Self {
        Self {
            repo,
            blobs,
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
        }
    }

    /// Override the TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Storage key for a blob: `cash-register/{id}/{format}-{millis}.bin`.
    #[must_use]
    pub fn storage_key(
        register_id: CashRegisterId,
        format: ExportFormat,
        created_at: DateTime<Utc>,
    ) -> String {
        format!(
            "cash-register/{register_id}/{}-{}.bin",
            format.slug(),
            created_at.timestamp_millis()
        )
    }

    /// Newest valid artifact for the pair.
    pub async fn find_valid(
        &self,
        register_id: CashRegisterId,
        format: ExportFormat,
    ) -> Result<Option<CachedArtifact>, ExportError> {
        self.find_valid_at(register_id, format, Utc::now()).await
    }

    /// [`Self::find_valid`] at a given instant.
    ///
    /// A row whose blob is gone is deleted and reported as a miss.
    pub async fn find_valid_at(
        &self,
        register_id: CashRegisterId,
        format: ExportFormat,
        now: DateTime<Utc>,
    ) -> Result<Option<CachedArtifact>, ExportError> {
        let Some(export) = self
            .repo
            .find_latest_valid(register_id, format, now)
            .await?
        else {
            return Ok(None);
        };

        match self.blobs.get(&export.url).await? {
            Some(bytes) => Ok(Some(CachedArtifact { export, bytes })),
            None => {
                tracing::warn!(
                    export_id = %export.id,
                    register_id = %register_id,
                    key = %export.url,
                    "cached export blob missing, dropping stale row"
                );
                self.repo.delete(export.id).await?;
                Ok(None)
            }
        }
    }

    /// Stores a freshly rendered artifact and drops older entries for the pair.
    pub async fn store(
        &self,
        register_id: CashRegisterId,
        format: ExportFormat,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<CachedArtifact, ExportError> {
        self.store_at(register_id, format, bytes, content_type, Utc::now())
            .await
    }

    /// [`Self::store`] at a given instant.
    pub async fn store_at(
        &self,
        register_id: CashRegisterId,
        format: ExportFormat,
        bytes: Vec<u8>,
        content_type: &str,
        now: DateTime<Utc>,
    ) -> Result<CachedArtifact, ExportError> {
        let key = Self::storage_key(register_id, format, now);
        self.blobs.put(&key, bytes.clone()).await?;

        let export = self
            .repo
            .insert(NewExport {
                cash_register_id: register_id,
                format,
                url: key,
                content_type: content_type.to_string(),
                created_at: now,
                expires_at: now + self.ttl,
            })
            .await?;

        if let Err(e) = self.drop_superseded(&export).await {
            tracing::warn!(
                export_id = %export.id,
                register_id = %register_id,
                error = %e,
                "failed to drop superseded exports"
            );
        }

        Ok(CachedArtifact { export, bytes })
    }

    /// Deletes rows (and blobs) of the same pair created before `current`.
    ///
    /// Newer rows belong to a concurrent store and are left to it.
    async fn drop_superseded(&self, current: &CashRegisterExport) -> Result<(), ExportError> {
        let siblings = self
            .repo
            .list_for_pair(current.cash_register_id, current.format)
            .await?;

        let mark = (current.created_at, current.id.into_inner());
        for stale in siblings
            .into_iter()
            .filter(|e| (e.created_at, e.id.into_inner()) < mark)
        {
            if stale.url != current.url {
                self.blobs.remove(&stale.url).await?;
            }
            self.repo.delete(stale.id).await?;
        }
        Ok(())
    }

    /// Deletes expired rows and their blobs. Returns how many were purged.
    pub async fn purge_expired(&self) -> Result<usize, ExportError> {
        self.purge_expired_at(Utc::now()).await
    }

    /// [`Self::purge_expired`] at a given instant.
    ///
    /// A row that fails to purge is logged and left for the next run.
    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<usize, ExportError> {
        let expired = self.repo.list_expired(now).await?;
        let mut purged = 0;

        for export in expired {
            if let Err(e) = self.blobs.remove(&export.url).await {
                tracing::warn!(export_id = %export.id, key = %export.url, error = %e, "failed to delete expired export blob");
                continue;
            }
            match self.repo.delete(export.id).await {
                Ok(_) => purged += 1,
                Err(e) => {
                    tracing::warn!(export_id = %export.id, error = %e, "failed to delete expired export row");
                }
            }
        }

        if purged > 0 {
            tracing::info!(purged, "expired exports purged");
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryStore, MemoryBlobStore};

    fn cache() -> (
        ExportCache<InMemoryStore, MemoryBlobStore>,
        Arc<InMemoryStore>,
        Arc<MemoryBlobStore>,
    ) {
        let repo = Arc::new(InMemoryStore::default());
        let blobs = Arc::new(MemoryBlobStore::default());
        (
            ExportCache::new(Arc::clone(&repo), Arc::clone(&blobs)),
            repo,
            blobs,
        )
    }

    #[test]
    fn test_storage_key_layout() {
        let id = CashRegisterId::new();
        let at = DateTime::from_timestamp_millis(1_710_460_800_123).unwrap();
        assert_eq!(
            ExportCache::<InMemoryStore, MemoryBlobStore>::storage_key(id, ExportFormat::Excel, at),
            format!("cash-register/{id}/excel-1710460800123.bin")
        );
    }

    #[tokio::test]
    async fn test_store_then_find_round_trip() {
        let (cache, _, _) = cache();
        let id = CashRegisterId::new();

        let stored = cache
            .store(id, ExportFormat::Pdf, b"%PDF".to_vec(), "application/pdf")
            .await
            .unwrap();
        assert_eq!(stored.export.expires_at - stored.export.created_at, Duration::hours(24));

        let found = cache.find_valid(id, ExportFormat::Pdf).await.unwrap().unwrap();
        assert_eq!(found.bytes, b"%PDF".to_vec());
        assert_eq!(found.content_type(), "application/pdf");
        assert!(cache.find_valid(id, ExportFormat::Excel).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_is_miss_then_purged() {
        let (cache, repo, blobs) = cache();
        let id = CashRegisterId::new();
        let created = Utc::now() - Duration::hours(30);

        let stored = cache
            .store_at(id, ExportFormat::Pdf, b"old".to_vec(), "application/pdf", created)
            .await
            .unwrap();
        assert!(cache.find_valid(id, ExportFormat::Pdf).await.unwrap().is_none());

        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert!(repo.exports().is_empty());
        assert!(!blobs.contains(&stored.export.url));

        assert_eq!(cache.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_second_store_leaves_single_row() {
        let (cache, repo, blobs) = cache();
        let id = CashRegisterId::new();
        let t0 = Utc::now();

        let first = cache
            .store_at(id, ExportFormat::Pdf, b"v1".to_vec(), "application/pdf", t0)
            .await
            .unwrap();
        let second = cache
            .store_at(
                id,
                ExportFormat::Pdf,
                b"v2".to_vec(),
                "application/pdf",
                t0 + Duration::seconds(1),
            )
            .await
            .unwrap();

        let rows = repo.exports();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, second.export.id);
        assert!(!blobs.contains(&first.export.url));
        assert!(blobs.contains(&second.export.url));
    }

    #[tokio::test]
    async fn test_overlapping_stores_keep_newest() {
        let (cache, repo, _) = cache();
        repo.gate_pair_listing(2);
        let id = CashRegisterId::new();
        let t0 = Utc::now();

        let (early, late) = tokio::join!(
            cache.store_at(id, ExportFormat::Pdf, b"v1".to_vec(), "application/pdf", t0),
            cache.store_at(
                id,
                ExportFormat::Pdf,
                b"v2".to_vec(),
                "application/pdf",
                t0 + Duration::milliseconds(5),
            ),
        );
        let (early, late) = (early.unwrap(), late.unwrap());

        let rows = repo.exports();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, late.export.id);
        assert_ne!(rows[0].id, early.export.id);

        let found = cache.find_valid(id, ExportFormat::Pdf).await.unwrap().unwrap();
        assert_eq!(found.bytes, b"v2".to_vec());
    }

    #[tokio::test]
    async fn test_store_survives_failed_cleanup() {
        let (cache, repo, blobs) = cache();
        let id = CashRegisterId::new();
        let t0 = Utc::now();

        let first = cache
            .store_at(id, ExportFormat::Pdf, b"v1".to_vec(), "application/pdf", t0)
            .await
            .unwrap();
        blobs.fail_removal_of(&first.export.url);

        let second = cache
            .store_at(
                id,
                ExportFormat::Pdf,
                b"v2".to_vec(),
                "application/pdf",
                t0 + Duration::seconds(1),
            )
            .await
            .unwrap();

        assert_eq!(repo.exports().len(), 2);
        let found = cache.find_valid(id, ExportFormat::Pdf).await.unwrap().unwrap();
        assert_eq!(found.export.id, second.export.id);
        assert_eq!(found.bytes, b"v2".to_vec());
    }

    #[tokio::test]
    async fn test_store_keeps_other_format() {
        let (cache, repo, _) = cache();
        let id = CashRegisterId::new();
        cache
            .store(id, ExportFormat::Pdf, b"p".to_vec(), "application/pdf")
            .await
            .unwrap();
        cache
            .store(id, ExportFormat::Excel, b"x".to_vec(), ExportFormat::Excel.content_type())
            .await
            .unwrap();
        assert_eq!(repo.exports().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_blob_self_heals() {
        let (cache, repo, blobs) = cache();
        let id = CashRegisterId::new();
        let stored = cache
            .store(id, ExportFormat::Pdf, b"x".to_vec(), "application/pdf")
            .await
            .unwrap();

        blobs.forget(&stored.export.url);

        assert!(cache.find_valid(id, ExportFormat::Pdf).await.unwrap().is_none());
        assert!(repo.exports().is_empty());
    }

    #[tokio::test]
    async fn test_purge_skips_failing_rows() {
        let (cache, repo, blobs) = cache();
        let past = Utc::now() - Duration::hours(48);
        let a = cache
            .store_at(CashRegisterId::new(), ExportFormat::Pdf, b"a".to_vec(), "application/pdf", past)
            .await
            .unwrap();
        cache
            .store_at(CashRegisterId::new(), ExportFormat::Pdf, b"b".to_vec(), "application/pdf", past)
            .await
            .unwrap();

        blobs.fail_removal_of(&a.export.url);

        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        let left = repo.exports();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, a.export.id);
    }
}

//! Export orchestration: closed-only precondition, cache lookup, render, store.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use till_shared::types::CashRegisterId;

use super::cache::{BlobStore, ExportCache, ExportRepository};
use super::error::ExportError;
use super::types::{CachedArtifact, ExportFormat};
use crate::access::{AuthenticatedUser, ShopDirectory};
use crate::ledger::MovementRepository;
use crate::register::{RegisterRepository, RegisterService};
use crate::statement::{RenderError, StatementContext, StatementRenderers};

/// Default upper bound for one render.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Serves statement documents for closed registers.
pub struct ExportService<R, M, D, E, B>
where
    R: RegisterRepository,
    M: MovementRepository,
    D: ShopDirectory,
    E: ExportRepository,
    B: BlobStore,
{
    registers: Arc<RegisterService<R, M, D>>,
    cache: ExportCache<E, B>,
    renderers: StatementRenderers,
    render_timeout: Duration,
}

impl<R, M, D, E, B> ExportService<R, M, D, E, B>
where
    R: RegisterRepository,
    M: MovementRepository,
    D: ShopDirectory,
    E: ExportRepository,
    B: BlobStore,
{
    /// Create a new export service.
    #[must_use]
    pub fn new(
        registers: Arc<RegisterService<R, M, D>>,
        cache: ExportCache<E, B>,
        renderers: StatementRenderers,
    ) -> Self {
        Self {
            registers,
            cache,
            renderers,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    /// Override the render timeout.
    #[must_use]
    pub const fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// The underlying cache.
    #[must_use]
    pub const fn cache(&self) -> &ExportCache<E, B> {
        &self.cache
    }

    /// Returns the cached statement or renders and caches a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the register is missing, forbidden or still open
    /// - rendering fails or times out
    /// - the blob store or metadata repository fails
    pub async fn get_or_render(
        &self,
        id: CashRegisterId,
        format: ExportFormat,
        user: &AuthenticatedUser,
    ) -> Result<CachedArtifact, ExportError> {
        let closed = self.registers.load_closed(id, user).await?;

        if let Some(hit) = self.cache.find_valid(id, format).await? {
            tracing::debug!(register_id = %id, %format, "export cache hit");
            return Ok(hit);
        }

        let ctx = StatementContext::from_closed(closed, Utc::now());
        let bytes = self.render(format, ctx).await?;
        tracing::info!(register_id = %id, %format, size = bytes.len(), "statement rendered");

        self.cache
            .store(id, format, bytes, format.content_type())
            .await
    }

    async fn render(
        &self,
        format: ExportFormat,
        ctx: StatementContext,
    ) -> Result<Vec<u8>, ExportError> {
        let renderer = self.renderers.for_format(format);
        let task = tokio::task::spawn_blocking(move || renderer.render(&ctx));

        match tokio::time::timeout(self.render_timeout, task).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(join)) => Err(RenderError::Aborted(join.to_string()).into()),
            Err(_) => {
                tracing::warn!(%format, timeout = ?self.render_timeout, "statement render timed out");
                Err(ExportError::Timeout("render"))
            }
        }
    }

    /// Deletes expired exports. Returns how many were purged.
    ///
    /// # Errors
    ///
    /// Returns an error if the expired rows cannot be listed.
    pub async fn purge_expired(&self) -> Result<usize, ExportError> {
        self.cache.purge_expired().await
    }
}

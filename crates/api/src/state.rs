//! Application state and service wiring.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use sea_orm::DatabaseConnection;
use till_core::access::AccessGuard;
use till_core::export::{ExportCache, ExportService};
use till_core::ledger::LedgerService;
use till_core::notify::DistributionNotifier;
use till_core::register::RegisterService;
use till_core::reports::ReportService;
use till_core::statement::{
    ExcelRenderer, LogoCache, PdfRenderer, RenderError, StatementFormatter, StatementRenderers,
};
use till_core::storage::StorageService;
use till_db::{
    CashMovementRepository, CashRegisterExportRepository, CashRegisterRepository, ShopRepository,
};
use till_shared::{AppConfig, EmailService, JwtService};

/// Register service over the Postgres repositories.
pub type Registers = RegisterService<CashRegisterRepository, CashMovementRepository, ShopRepository>;

/// Ledger service over the Postgres repositories.
pub type Ledger = LedgerService<CashMovementRepository, CashRegisterRepository, ShopRepository>;

/// Report service over the Postgres repositories.
pub type Reports = ReportService<CashRegisterRepository, ShopRepository>;

/// Export service backed by Postgres metadata and OpenDAL blobs.
pub type Exports = ExportService<
    CashRegisterRepository,
    CashMovementRepository,
    ShopRepository,
    CashRegisterExportRepository,
    StorageService,
>;

/// Closing-statement distribution over SMTP.
pub type Notifier = DistributionNotifier<
    CashRegisterRepository,
    CashMovementRepository,
    ShopRepository,
    CashRegisterExportRepository,
    StorageService,
    EmailService,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Register lifecycle.
    pub registers: Arc<Registers>,
    /// Movement appends.
    pub ledger: Arc<Ledger>,
    /// Cached statement exports.
    pub exports: Arc<Exports>,
    /// Closed-register reports.
    pub reports: Arc<Reports>,
    /// Post-close distribution.
    pub notifier: Arc<Notifier>,
    /// Statement timezone and formats.
    pub formatter: StatementFormatter,
}

impl AppState {
    /// Wires every service from a connection, a blob store and the loaded config.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement timezone is not a valid IANA name.
    pub fn new(
        db: DatabaseConnection,
        storage: StorageService,
        config: &AppConfig,
    ) -> Result<Self, RenderError> {
        let formatter = StatementFormatter::from_name(&config.statements.timezone)?;

        let shops = Arc::new(ShopRepository::new(db.clone()));
        let register_repo = Arc::new(CashRegisterRepository::new(db.clone()));
        let movement_repo = Arc::new(CashMovementRepository::new(db.clone()));
        let export_repo = Arc::new(CashRegisterExportRepository::new(db));
        let guard = AccessGuard::new(shops);

        let registers = Arc::new(RegisterService::new(
            Arc::clone(&register_repo),
            Arc::clone(&movement_repo),
            guard.clone(),
        ));
        let ledger = Arc::new(LedgerService::new(
            movement_repo,
            Arc::clone(&register_repo),
            guard.clone(),
        ));
        let reports = Arc::new(ReportService::new(
            register_repo,
            guard,
            formatter.timezone(),
        ));

        let logo = Arc::new(LogoCache::new(config.statements.logo_path.clone()));
        let renderers = StatementRenderers::new(
            Arc::new(PdfRenderer::new(formatter)),
            Arc::new(ExcelRenderer::new(formatter, logo)),
        );
        let cache = ExportCache::new(export_repo, Arc::new(storage))
            .with_ttl(Duration::hours(config.exports.ttl_hours));
        let exports = Arc::new(
            ExportService::new(Arc::clone(&registers), cache, renderers)
                .with_render_timeout(StdDuration::from_secs(config.exports.render_timeout_secs)),
        );

        let notifier = Arc::new(DistributionNotifier::new(
            Arc::clone(&registers),
            Arc::clone(&exports),
            Arc::new(EmailService::new(config.email.clone())),
            config.notifications.recipient.clone(),
            formatter,
        ));

        Ok(Self {
            jwt_service: Arc::new(JwtService::new(config.jwt.clone())),
            registers,
            ledger,
            exports,
            reports,
            notifier,
            formatter,
        })
    }
}

//! In-memory doubles shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use till_shared::types::{
    CashMovementId, CashRegisterId, ExportId, ProjectId, ShopId, UserId,
};
use uuid::Uuid;

use crate::access::{
    AccessError, AccessGuard, AuthenticatedUser, Shop, ShopDirectory, UserRole,
};
use crate::export::{BlobStore, CashRegisterExport, ExportError, ExportFormat, ExportRepository, NewExport};
use crate::ledger::{
    AppendMovementInput, CashMovement, LedgerError, LedgerService, MovementRepository,
    MovementType, NewMovement, OriginKind, OriginRef,
};
use crate::register::{
    CashRegister, CloseCommand, CloseRegisterInput, ClosedRegister, ClosingType, HistoryFilter,
    NewRegister, OpenRegisterInput, Reconciliation, RegisterError, RegisterRepository,
    RegisterService, RegisterStatus,
};
use crate::statement::{RenderError, StatementContext, StatementRenderer};
use crate::storage::StorageError;

/// A movement on a throwaway register.
pub fn movement(movement_type: MovementType, amount: Decimal) -> CashMovement {
    CashMovement {
        id: CashMovementId::new(),
        cash_register_id: CashRegisterId::new(),
        shop_id: ShopId::new(),
        movement_type,
        amount,
        description: String::new(),
        user_id: UserId::new(),
        origin: None,
        created_at: Utc::now(),
    }
}

/// A CLP shop.
pub fn shop_in(project_id: ProjectId, owner_id: UserId) -> Shop {
    Shop {
        id: ShopId::new(),
        project_id,
        owner_id,
        name: "Main Street".to_string(),
        currency: "CLP".to_string(),
    }
}

/// The owner of `shop`.
pub fn owner_of(shop: &Shop) -> AuthenticatedUser {
    AuthenticatedUser {
        id: shop.owner_id,
        project_id: shop.project_id,
        role: UserRole::Owner,
        name: Some("Owner".to_string()),
    }
}

/// A fresh employee without assignments.
pub fn employee(project_id: ProjectId) -> AuthenticatedUser {
    AuthenticatedUser {
        id: UserId::new(),
        project_id,
        role: UserRole::Employee,
        name: Some("Clerk".to_string()),
    }
}

/// Shops, registers, movements and export rows behind mutexes.
///
/// Lock order is registers before movements.
#[derive(Default)]
pub struct InMemoryStore {
    shops: Mutex<HashMap<ShopId, Shop>>,
    assignments: Mutex<HashSet<(UserId, ShopId)>>,
    registers: Mutex<HashMap<CashRegisterId, CashRegister>>,
    movements: Mutex<Vec<CashMovement>>,
    exports: Mutex<Vec<CashRegisterExport>>,
    pair_gate: Mutex<Option<Arc<tokio::sync::Barrier>>>,
}

impl InMemoryStore {
    pub fn add_shop(&self, project_id: ProjectId, owner_id: UserId) -> Shop {
        let shop = shop_in(project_id, owner_id);
        self.shops.lock().unwrap().insert(shop.id, shop.clone());
        shop
    }

    pub fn assign(&self, user_id: UserId, shop_id: ShopId) {
        self.assignments.lock().unwrap().insert((user_id, shop_id));
    }

    pub fn register(&self, id: CashRegisterId) -> Option<CashRegister> {
        self.registers.lock().unwrap().get(&id).cloned()
    }

    pub fn movements_of(&self, id: CashRegisterId) -> Vec<CashMovement> {
        self.movements
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.cash_register_id == id)
            .cloned()
            .collect()
    }

    pub fn exports(&self) -> Vec<CashRegisterExport> {
        self.exports.lock().unwrap().clone()
    }

    /// Makes `list_for_pair` wait until `parties` callers reach it.
    pub fn gate_pair_listing(&self, parties: usize) {
        *self.pair_gate.lock().unwrap() = Some(Arc::new(tokio::sync::Barrier::new(parties)));
    }

    /// Overwrites a register row, for arranging timestamps.
    pub fn put_register(&self, register: CashRegister) {
        self.registers.lock().unwrap().insert(register.id, register);
    }
}

impl ShopDirectory for InMemoryStore {
    async fn find_shop(&self, shop_id: ShopId) -> Result<Option<Shop>, AccessError> {
        Ok(self.shops.lock().unwrap().get(&shop_id).cloned())
    }

    async fn is_assigned(
        &self,
        user: &AuthenticatedUser,
        shop_id: ShopId,
    ) -> Result<bool, AccessError> {
        Ok(self.assignments.lock().unwrap().contains(&(user.id, shop_id)))
    }

    async fn owned_shop_ids(&self, user: &AuthenticatedUser) -> Result<Vec<ShopId>, AccessError> {
        Ok(self
            .shops
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.owner_id == user.id && s.project_id == user.project_id)
            .map(|s| s.id)
            .collect())
    }

    async fn assigned_shop_ids(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Vec<ShopId>, AccessError> {
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| *u == user.id)
            .map(|(_, s)| *s)
            .collect())
    }
}

impl RegisterRepository for InMemoryStore {
    async fn find_by_id(&self, id: CashRegisterId) -> Result<Option<CashRegister>, RegisterError> {
        Ok(self.register(id))
    }

    async fn find_open_for_shop(
        &self,
        shop_id: ShopId,
    ) -> Result<Option<CashRegister>, RegisterError> {
        Ok(self
            .registers
            .lock()
            .unwrap()
            .values()
            .find(|r| r.shop_id == shop_id && r.is_open())
            .cloned())
    }

    async fn open(&self, new: NewRegister) -> Result<CashRegister, RegisterError> {
        let mut registers = self.registers.lock().unwrap();
        if registers
            .values()
            .any(|r| r.shop_id == new.shop_id && r.is_open())
        {
            return Err(RegisterError::AlreadyOpen(new.shop_id));
        }

        let register = CashRegister {
            id: CashRegisterId::new(),
            shop_id: new.shop_id,
            employee_id: new.employee_id,
            status: RegisterStatus::Open,
            opening_amount: new.opening_amount,
            closing_amount: None,
            actual_amount: None,
            difference: None,
            opened_at: new.opened_at,
            opened_by: new.opened_by,
            opened_by_name: new.opened_by_name,
            closed_at: None,
            closed_by: None,
            closing_notes: None,
            closing_type: None,
        };
        self.movements.lock().unwrap().push(CashMovement {
            id: CashMovementId::new(),
            cash_register_id: register.id,
            shop_id: register.shop_id,
            movement_type: MovementType::Opening,
            amount: register.opening_amount,
            description: "Opening".to_string(),
            user_id: new.opened_by,
            origin: None,
            created_at: new.opened_at,
        });
        registers.insert(register.id, register.clone());
        Ok(register)
    }

    async fn close(
        &self,
        id: CashRegisterId,
        command: CloseCommand,
    ) -> Result<CashRegister, RegisterError> {
        let mut registers = self.registers.lock().unwrap();
        let register = registers.get_mut(&id).ok_or(RegisterError::NotFound(id))?;
        if !register.is_open() {
            return Err(RegisterError::NotOpen(id));
        }

        let movements: Vec<_> = self
            .movements
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.cash_register_id == id)
            .cloned()
            .collect();
        let rec = Reconciliation::compute(register.opening_amount, &movements, command.actual_amount);

        register.status = RegisterStatus::Closed;
        register.closing_amount = Some(rec.closing_amount);
        register.actual_amount = Some(rec.actual_amount);
        register.difference = Some(rec.difference);
        register.closed_at = Some(command.closed_at);
        register.closed_by = Some(command.closed_by);
        register.closing_notes = command.closing_notes;
        register.closing_type = Some(command.closing_type);
        Ok(register.clone())
    }

    async fn history(
        &self,
        shop_id: ShopId,
        filter: HistoryFilter,
        limit: u64,
    ) -> Result<Vec<CashRegister>, RegisterError> {
        let mut rows: Vec<_> = self
            .registers
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.shop_id == shop_id && filter.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        rows.truncate(usize::try_from(limit).unwrap());
        Ok(rows)
    }

    async fn closed_between(
        &self,
        shop_ids: &[ShopId],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CashRegister>, RegisterError> {
        let mut rows: Vec<_> = self
            .registers
            .lock()
            .unwrap()
            .values()
            .filter(|r| shop_ids.contains(&r.shop_id))
            .filter(|r| r.closed_at.is_some_and(|at| at >= start && at <= end))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.closed_at.cmp(&a.closed_at));
        Ok(rows)
    }
}

impl MovementRepository for InMemoryStore {
    async fn append(&self, new: NewMovement) -> Result<CashMovement, LedgerError> {
        let registers = self.registers.lock().unwrap();
        match registers.get(&new.cash_register_id) {
            None => return Err(LedgerError::RegisterNotFound(new.cash_register_id)),
            Some(r) if !r.is_open() => {
                return Err(LedgerError::RegisterNotOpen(new.cash_register_id));
            }
            Some(_) => {}
        }

        let movement = CashMovement {
            id: CashMovementId::new(),
            cash_register_id: new.cash_register_id,
            shop_id: new.shop_id,
            movement_type: new.movement_type,
            amount: new.amount,
            description: new.description,
            user_id: new.user_id,
            origin: new.origin,
            created_at: Utc::now(),
        };
        self.movements.lock().unwrap().push(movement.clone());
        Ok(movement)
    }

    async fn list_for_register(
        &self,
        register_id: CashRegisterId,
    ) -> Result<Vec<CashMovement>, LedgerError> {
        Ok(self.movements_of(register_id))
    }
}

impl ExportRepository for InMemoryStore {
    async fn find_latest_valid(
        &self,
        register_id: CashRegisterId,
        format: ExportFormat,
        now: DateTime<Utc>,
    ) -> Result<Option<CashRegisterExport>, ExportError> {
        Ok(self
            .exports
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.cash_register_id == register_id && e.format == format)
            .filter(|e| e.is_valid_at(now))
            .max_by_key(|e| e.created_at)
            .cloned())
    }

    async fn insert(&self, new: NewExport) -> Result<CashRegisterExport, ExportError> {
        let export = CashRegisterExport {
            id: ExportId::new(),
            cash_register_id: new.cash_register_id,
            format: new.format,
            url: new.url,
            content_type: new.content_type,
            created_at: new.created_at,
            expires_at: new.expires_at,
        };
        self.exports.lock().unwrap().push(export.clone());
        Ok(export)
    }

    async fn list_for_pair(
        &self,
        register_id: CashRegisterId,
        format: ExportFormat,
    ) -> Result<Vec<CashRegisterExport>, ExportError> {
        let gate = self.pair_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.wait().await;
        }
        Ok(self
            .exports
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.cash_register_id == register_id && e.format == format)
            .cloned()
            .collect())
    }

    async fn list_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<CashRegisterExport>, ExportError> {
        Ok(self
            .exports
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.expires_at < now)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: ExportId) -> Result<bool, ExportError> {
        let mut exports = self.exports.lock().unwrap();
        let before = exports.len();
        exports.retain(|e| e.id != id);
        Ok(exports.len() != before)
    }
}

/// Blob store in a hash map, with injectable removal failures.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryBlobStore {
    pub fn contains(&self, key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(key)
    }

    /// Drops a blob behind the cache's back.
    pub fn forget(&self, key: &str) {
        self.blobs.lock().unwrap().remove(key);
    }

    pub fn fail_removal_of(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }
}

impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.blobs.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.blobs.lock().unwrap().get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(StorageError::Operation(format!("injected failure for {key}")));
        }
        self.blobs.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Renderer that counts calls and returns a fixed body.
pub struct CountingRenderer {
    format: ExportFormat,
    calls: AtomicUsize,
    fail_next: AtomicBool,
    delay: Option<Duration>,
}

impl CountingRenderer {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            calls: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl StatementRenderer for CountingRenderer {
    fn format(&self) -> ExportFormat {
        self.format
    }

    fn render(&self, ctx: &StatementContext) -> Result<Vec<u8>, RenderError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(RenderError::Pdf("injected failure".to_string()));
        }
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("{}:{}:{n}", self.format, ctx.register.id).into_bytes())
    }
}

/// One shop, its owner, and services over a shared store.
pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub shop: Shop,
    pub owner: AuthenticatedUser,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::default());
        let shop = store.add_shop(ProjectId::new(), UserId::new());
        let owner = owner_of(&shop);
        Self { store, shop, owner }
    }

    pub fn guard(&self) -> AccessGuard<InMemoryStore> {
        AccessGuard::new(Arc::clone(&self.store))
    }

    pub fn registers(&self) -> RegisterService<InMemoryStore, InMemoryStore, InMemoryStore> {
        RegisterService::new(Arc::clone(&self.store), Arc::clone(&self.store), self.guard())
    }

    pub fn ledger(&self) -> LedgerService<InMemoryStore, InMemoryStore, InMemoryStore> {
        LedgerService::new(Arc::clone(&self.store), Arc::clone(&self.store), self.guard())
    }

    pub async fn open_register(&self, opening_amount: Decimal) -> CashRegister {
        self.registers()
            .open(
                OpenRegisterInput {
                    shop_id: self.shop.id,
                    employee_id: None,
                    opening_amount,
                },
                &self.owner,
            )
            .await
            .unwrap()
    }

    pub async fn close_register(&self, id: CashRegisterId, actual_amount: Decimal) -> CashRegister {
        self.registers()
            .close(
                id,
                CloseRegisterInput {
                    actual_amount,
                    closing_notes: None,
                    closing_type: ClosingType::Manual,
                },
                &self.owner,
            )
            .await
            .unwrap()
    }

    pub async fn post(&self, id: CashRegisterId, movement_type: MovementType, amount: Decimal) {
        self.ledger()
            .append(
                id,
                AppendMovementInput {
                    movement_type,
                    amount,
                    description: String::new(),
                    origin: None,
                },
                &self.owner,
            )
            .await
            .unwrap();
    }
}

/// Closed register: open 10000, sale 5000, expense 2000, counted 13000.
pub fn sample_statement() -> StatementContext {
    let shop = shop_in(ProjectId::new(), UserId::new());
    let opened_at: DateTime<Utc> = "2024-03-15T12:00:00Z".parse().unwrap();
    let register_id = CashRegisterId::new();

    let entry = |movement_type, amount, minutes, description: &str, origin| CashMovement {
        id: CashMovementId::new(),
        cash_register_id: register_id,
        shop_id: shop.id,
        movement_type,
        amount,
        description: description.to_string(),
        user_id: shop.owner_id,
        origin,
        created_at: opened_at + chrono::Duration::minutes(minutes),
    };
    let movements = vec![
        entry(MovementType::Opening, dec!(10000), 0, "Opening", None),
        entry(
            MovementType::Sale,
            dec!(5000),
            5,
            "",
            Some(OriginRef {
                kind: OriginKind::Sale,
                id: Uuid::new_v4(),
            }),
        ),
        entry(MovementType::Expense, dec!(2000), 10, "Cleaning supplies", None),
    ];

    let register = CashRegister {
        id: register_id,
        shop_id: shop.id,
        employee_id: shop.owner_id,
        status: RegisterStatus::Closed,
        opening_amount: dec!(10000),
        closing_amount: Some(dec!(13000)),
        actual_amount: Some(dec!(13000)),
        difference: Some(dec!(0)),
        opened_at,
        opened_by: shop.owner_id,
        opened_by_name: Some("Owner".to_string()),
        closed_at: Some(opened_at + chrono::Duration::hours(8)),
        closed_by: Some(shop.owner_id),
        closing_notes: Some("End of day".to_string()),
        closing_type: Some(ClosingType::Manual),
    };

    StatementContext::from_closed(
        ClosedRegister {
            register,
            shop,
            movements,
        },
        opened_at + chrono::Duration::hours(9),
    )
}

/// Sample statement padded with `extra` sales.
pub fn statement_with_lines(extra: usize) -> StatementContext {
    let mut ctx = sample_statement();
    let base = ctx.lines.last().map(|l| (l.created_at, l.running_balance)).unwrap();
    let mut balance = base.1;
    for i in 0..extra {
        balance += dec!(100);
        ctx.lines.push(crate::statement::StatementLine {
            created_at: base.0 + chrono::Duration::seconds(i64::try_from(i).unwrap() + 1),
            movement_type: MovementType::Sale,
            reference: format!("Sale #{i:08}"),
            amount: dec!(100),
            signed_amount: dec!(100),
            running_balance: balance,
        });
    }
    ctx
}

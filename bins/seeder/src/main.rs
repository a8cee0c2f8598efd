//! Database seeder for Till development and testing.
//!
//! Seeds a demo project with one shop, an owner, an assigned employee and an
//! open register carrying a handful of movements, then prints bearer tokens
//! for both users.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use rust_decimal::Decimal;
use till_core::access::{AccessGuard, AuthenticatedUser, ShopDirectory, UserRole};
use till_core::ledger::{
    AppendMovementInput, LedgerService, MovementType, OriginKind, OriginRef,
};
use till_core::register::{OpenRegisterInput, RegisterService};
use till_db::{CashMovementRepository, CashRegisterRepository, ShopRepository};
use till_shared::types::{ProjectId, ShopId, UserId};
use till_shared::{AppConfig, JwtService};
use uuid::Uuid;

/// Demo project ID (consistent for all seeds)
const DEMO_PROJECT_ID: Uuid = Uuid::from_u128(1);
/// Demo owner ID
const DEMO_OWNER_ID: Uuid = Uuid::from_u128(2);
/// Demo employee ID
const DEMO_EMPLOYEE_ID: Uuid = Uuid::from_u128(3);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    println!("Connecting to database...");
    let db = till_db::connect(&config.database).await?;

    let owner = demo_user(DEMO_OWNER_ID, UserRole::Owner, "Demo Owner");
    let employee = demo_user(DEMO_EMPLOYEE_ID, UserRole::Employee, "Demo Cashier");

    let shops = Arc::new(ShopRepository::new(db.clone()));
    println!("Seeding demo shop...");
    let shop_id = seed_shop(&shops, &owner, &employee).await?;

    let registers = Arc::new(CashRegisterRepository::new(db.clone()));
    let movements = Arc::new(CashMovementRepository::new(db));
    let guard = AccessGuard::new(shops);
    let register_service = RegisterService::new(
        Arc::clone(&registers),
        Arc::clone(&movements),
        guard.clone(),
    );
    let ledger = LedgerService::new(movements, registers, guard);

    println!("Seeding open register...");
    if register_service
        .current_open(shop_id, &employee)
        .await?
        .is_some()
    {
        println!("  Register already open, skipping...");
    } else {
        let register = register_service
            .open(
                OpenRegisterInput {
                    shop_id,
                    employee_id: None,
                    opening_amount: Decimal::from(50_000),
                },
                &employee,
            )
            .await?;

        for (movement_type, amount, description, origin) in demo_movements() {
            ledger
                .append(
                    register.id,
                    AppendMovementInput {
                        movement_type,
                        amount,
                        description: description.to_string(),
                        origin,
                    },
                    &employee,
                )
                .await?;
        }
        println!("  Opened register {}", register.id);
    }

    let jwt = JwtService::new(config.jwt);
    println!();
    println!("Shop ID:        {shop_id}");
    for (label, user, role) in [("Owner", &owner, "owner"), ("Employee", &employee, "employee")] {
        let token = jwt.generate_access_token(
            user.id.into_inner(),
            user.project_id.into_inner(),
            role,
            user.name.clone(),
        )?;
        println!("{label} token: {token}");
    }

    println!("Seeding complete!");
    Ok(())
}

fn demo_user(id: Uuid, role: UserRole, name: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        id: UserId::from_uuid(id),
        project_id: ProjectId::from_uuid(DEMO_PROJECT_ID),
        role,
        name: Some(name.to_string()),
    }
}

/// Reuses the owner's first shop, creating it on a fresh database.
async fn seed_shop(
    shops: &ShopRepository,
    owner: &AuthenticatedUser,
    employee: &AuthenticatedUser,
) -> anyhow::Result<ShopId> {
    if let Some(existing) = shops.owned_shop_ids(owner).await?.first() {
        println!("  Demo shop already exists, skipping...");
        return Ok(*existing);
    }

    let shop = shops
        .create(owner.project_id, owner.id, "Demo Shop", "CLP")
        .await?;
    shops.assign_employee(shop.id, employee.id).await?;
    println!("  Created shop {} ({})", shop.name, shop.id);
    Ok(shop.id)
}

fn demo_movements() -> Vec<(MovementType, Decimal, &'static str, Option<OriginRef>)> {
    vec![
        (
            MovementType::Sale,
            Decimal::from(12_500),
            "Counter sale",
            Some(OriginRef {
                kind: OriginKind::Sale,
                id: Uuid::now_v7(),
            }),
        ),
        (MovementType::Income, Decimal::from(3_000), "Tip jar", None),
        (MovementType::Expense, Decimal::from(4_200), "Cleaning supplies", None),
        (MovementType::Withdrawal, Decimal::from(10_000), "Safe drop", None),
    ]
}

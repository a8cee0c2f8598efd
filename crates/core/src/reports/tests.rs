//! Range resolution and report tests.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal_macros::dec;

use super::error::ReportError;
use super::period::{RangeParams, RangeResolver, ReportPeriod};
use super::service::ReportService;
use super::types::EMPTY_REPORT_MESSAGE;
use crate::access::{AccessGuard, AuthenticatedUser, UserRole};
use crate::register::DifferenceStatus;
use crate::testing::{Fixture, employee};

fn at(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.3f").unwrap()
}

/// Wednesday afternoon.
fn now() -> NaiveDateTime {
    at("2024-03-20 15:00:00.000")
}

fn params() -> RangeParams {
    RangeParams::default()
}

#[test]
fn test_day_window() {
    let range = RangeResolver::resolve(
        ReportPeriod::Day,
        &RangeParams {
            date: Some("2024-03-15".to_string()),
            ..params()
        },
        now(),
    )
    .unwrap();
    assert_eq!(range.start, at("2024-03-15 00:00:00.000"));
    assert_eq!(range.end, at("2024-03-15 23:59:59.999"));
}

#[rstest]
#[case(None)]
#[case(Some("15/03/2024"))]
#[case(Some("2024-02-30"))]
fn test_day_requires_valid_date(#[case] date: Option<&str>) {
    let result = RangeResolver::resolve(
        ReportPeriod::Day,
        &RangeParams {
            date: date.map(str::to_string),
            ..params()
        },
        now(),
    );
    assert!(matches!(
        result,
        Err(ReportError::MissingParameter(_) | ReportError::InvalidDate(_))
    ));
}

#[test]
fn test_month_window_february_leap_year() {
    let range = RangeResolver::resolve(
        ReportPeriod::Month,
        &RangeParams {
            year: Some("2024".to_string()),
            month: Some("2".to_string()),
            ..params()
        },
        now(),
    )
    .unwrap();
    assert_eq!(range.start, at("2024-02-01 00:00:00.000"));
    assert_eq!(range.end, at("2024-02-29 23:59:59.999"));
}

#[test]
fn test_current_month_clamped_to_now() {
    let range = RangeResolver::resolve(ReportPeriod::Month, &params(), now()).unwrap();
    assert_eq!(range.start, at("2024-03-01 00:00:00.000"));
    assert_eq!(range.end, now());
}

#[test]
fn test_december_rolls_into_next_year() {
    let range = RangeResolver::resolve(
        ReportPeriod::Month,
        &RangeParams {
            year: Some("2023".to_string()),
            month: Some("12".to_string()),
            ..params()
        },
        now(),
    )
    .unwrap();
    assert_eq!(range.end, at("2023-12-31 23:59:59.999"));
}

#[rstest]
#[case(Some("13"), None)]
#[case(Some("0"), None)]
#[case(Some("feb"), None)]
#[case(None, Some("1899"))]
#[case(None, Some("10000"))]
fn test_month_rejects_bad_values(#[case] month: Option<&str>, #[case] year: Option<&str>) {
    let result = RangeResolver::resolve(
        ReportPeriod::Month,
        &RangeParams {
            month: month.map(str::to_string),
            year: year.map(str::to_string),
            ..params()
        },
        now(),
    );
    assert!(matches!(
        result,
        Err(ReportError::InvalidMonth(_) | ReportError::InvalidYear(_))
    ));
}

#[test]
fn test_future_month_rejected() {
    let result = RangeResolver::resolve(
        ReportPeriod::Month,
        &RangeParams {
            year: Some("2024".to_string()),
            month: Some("4".to_string()),
            ..params()
        },
        now(),
    );
    assert!(matches!(result, Err(ReportError::FutureRange(_))));
}

#[test]
fn test_current_week_clamped_to_now() {
    let range = RangeResolver::resolve(ReportPeriod::Week, &params(), now()).unwrap();
    assert_eq!(range.start, at("2024-03-18 00:00:00.000"));
    assert_eq!(range.end, now());
}

#[rstest]
#[case(Some("2024-03-06"), None)]
#[case(None, Some("2024-03-10"))]
fn test_single_bound_selects_its_week(#[case] from: Option<&str>, #[case] to: Option<&str>) {
    let range = RangeResolver::resolve(
        ReportPeriod::Week,
        &RangeParams {
            date_from: from.map(str::to_string),
            date_to: to.map(str::to_string),
            ..params()
        },
        now(),
    )
    .unwrap();
    assert_eq!(range.start, at("2024-03-04 00:00:00.000"));
    assert_eq!(range.end, at("2024-03-10 23:59:59.999"));
}

#[test]
fn test_explicit_pair_used_directly() {
    let range = RangeResolver::resolve(
        ReportPeriod::Week,
        &RangeParams {
            date_from: Some("2024-03-01".to_string()),
            date_to: Some("2024-03-12".to_string()),
            ..params()
        },
        now(),
    )
    .unwrap();
    assert_eq!(range.start, at("2024-03-01 00:00:00.000"));
    assert_eq!(range.end, at("2024-03-12 23:59:59.999"));
}

#[test]
fn test_inverted_pair_rejected() {
    let result = RangeResolver::resolve(
        ReportPeriod::Week,
        &RangeParams {
            date_from: Some("2024-03-12".to_string()),
            date_to: Some("2024-03-01".to_string()),
            ..params()
        },
        now(),
    );
    assert!(matches!(result, Err(ReportError::InvalidDateRange { .. })));
}

#[test]
fn test_week_number_selects_iso_week() {
    let range = RangeResolver::resolve(
        ReportPeriod::Week,
        &RangeParams {
            week: Some("1".to_string()),
            year: Some("2024".to_string()),
            ..params()
        },
        now(),
    )
    .unwrap();
    assert_eq!(range.start, at("2024-01-01 00:00:00.000"));
    assert_eq!(range.end, at("2024-01-07 23:59:59.999"));
}

#[rstest]
#[case("0")]
#[case("54")]
#[case("x")]
fn test_bad_week_number(#[case] week: &str) {
    let result = RangeResolver::resolve(
        ReportPeriod::Week,
        &RangeParams {
            week: Some(week.to_string()),
            ..params()
        },
        now(),
    );
    assert!(matches!(result, Err(ReportError::InvalidWeek(_))));
}

#[test]
fn test_year_window() {
    let past = RangeResolver::resolve(
        ReportPeriod::Year,
        &RangeParams {
            year: Some("2023".to_string()),
            ..params()
        },
        now(),
    )
    .unwrap();
    assert_eq!(past.start, at("2023-01-01 00:00:00.000"));
    assert_eq!(past.end, at("2023-12-31 23:59:59.999"));

    let current = RangeResolver::resolve(ReportPeriod::Year, &params(), now()).unwrap();
    assert_eq!(current.end, now());

    let future = RangeResolver::resolve(
        ReportPeriod::Year,
        &RangeParams {
            year: Some("2025".to_string()),
            ..params()
        },
        now(),
    );
    assert!(matches!(future, Err(ReportError::FutureRange(_))));
}

#[rstest]
#[case("day", ReportPeriod::Day)]
#[case("WEEK", ReportPeriod::Week)]
#[case(" month ", ReportPeriod::Month)]
#[case("year", ReportPeriod::Year)]
fn test_period_parsing(#[case] raw: &str, #[case] expected: ReportPeriod) {
    assert_eq!(raw.parse::<ReportPeriod>().unwrap(), expected);
}

#[test]
fn test_unknown_period_is_invalid_argument() {
    let err = "quarter".parse::<ReportPeriod>().unwrap_err();
    assert!(matches!(
        till_shared::AppError::from(err),
        till_shared::AppError::InvalidArgument(_)
    ));
}

proptest! {
    /// Resolved windows never end after "now" and never start after they end.
    #[test]
    fn test_clamped_periods_are_ordered(
        days in 0i64..20_000,
        secs in 0i64..86_400,
        period_idx in 0usize..3,
    ) {
        let base = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let now = base + Duration::days(days) + Duration::seconds(secs);
        let period = [ReportPeriod::Week, ReportPeriod::Month, ReportPeriod::Year][period_idx];

        let range = RangeResolver::resolve(period, &RangeParams::default(), now).unwrap();
        prop_assert!(range.end <= now);
        prop_assert!(range.start <= range.end);
        prop_assert_eq!(range.end, now);
    }
}

fn report_service(fx: &Fixture) -> ReportService<crate::testing::InMemoryStore, crate::testing::InMemoryStore> {
    ReportService::new(
        Arc::clone(&fx.store),
        AccessGuard::new(Arc::clone(&fx.store)),
        chrono_tz::UTC,
    )
}

#[tokio::test]
async fn test_report_lists_closed_registers_of_owned_shops() {
    let fx = Fixture::new();
    let first = fx.open_register(dec!(1000)).await;
    fx.close_register(first.id, dec!(1100)).await;
    let second = fx.open_register(dec!(500)).await;
    fx.close_register(second.id, dec!(400)).await;
    fx.open_register(dec!(10)).await;

    let report = report_service(&fx)
        .closed_registers("day", &RangeParams {
            date: Some(chrono::Utc::now().format("%Y-%m-%d").to_string()),
            ..params()
        }, &fx.owner)
        .await
        .unwrap();

    assert_eq!(report.registers.len(), 2);
    assert!(report.message.is_none());
    assert!(report.registers.iter().all(|r| r.shop_name == "Main Street" && r.currency == "CLP"));
    let statuses: Vec<_> = report.registers.iter().map(|r| r.difference_status).collect();
    assert!(statuses.contains(&Some(DifferenceStatus::Surplus)));
    assert!(statuses.contains(&Some(DifferenceStatus::Shortage)));
}

#[tokio::test]
async fn test_report_empty_window_has_message() {
    let fx = Fixture::new();
    let register = fx.open_register(dec!(1)).await;
    fx.close_register(register.id, dec!(1)).await;

    let report = report_service(&fx)
        .closed_registers("year", &RangeParams {
            year: Some("2001".to_string()),
            ..params()
        }, &fx.owner)
        .await
        .unwrap();

    assert!(report.registers.is_empty());
    assert_eq!(report.message.as_deref(), Some(EMPTY_REPORT_MESSAGE));
}

#[tokio::test]
async fn test_report_for_unassigned_employee_is_empty() {
    let fx = Fixture::new();
    let register = fx.open_register(dec!(1)).await;
    fx.close_register(register.id, dec!(1)).await;

    let worker = employee(fx.shop.project_id);
    let report = report_service(&fx)
        .closed_registers("month", &params(), &worker)
        .await
        .unwrap();
    assert!(report.registers.is_empty());

    fx.store.assign(worker.id, fx.shop.id);
    let report = report_service(&fx)
        .closed_registers("month", &params(), &worker)
        .await
        .unwrap();
    assert_eq!(report.registers.len(), 1);
}

#[tokio::test]
async fn test_report_other_role_sees_nothing() {
    let fx = Fixture::new();
    let register = fx.open_register(dec!(1)).await;
    fx.close_register(register.id, dec!(1)).await;

    let auditor = AuthenticatedUser {
        role: UserRole::Other,
        ..fx.owner.clone()
    };
    let report = report_service(&fx)
        .closed_registers("week", &params(), &auditor)
        .await
        .unwrap();
    assert!(report.registers.is_empty());
}

//! Period registry tests.

mod common;

use common::{connect_memory, create_period, date, setup};
use neraca_core::period::FiscalCalendar;
use neraca_core::{ErrorKind, LedgerError, LedgerSettings};
use neraca_db::Repositories;
use neraca_db::repositories::{CreatePeriodInput, DateRange};

fn input(name: &str, start_date: chrono::NaiveDate, end_date: chrono::NaiveDate) -> CreatePeriodInput {
    CreatePeriodInput {
        name: name.to_string(),
        start_date,
        end_date,
    }
}

#[tokio::test]
async fn test_overlap_rejected() {
    let t = setup().await;
    let err = t
        .repos
        .periods
        .create(input("Mid January", date(2025, 1, 15), date(2025, 2, 14)))
        .await
        .unwrap_err();
    assert!(matches!(err.as_ledger(), Some(LedgerError::OverlappingPeriod(name)) if name == "January 2025"));

    // touching ranges do not overlap
    let feb = create_period(&t.repos, "February 2025", date(2025, 2, 1), date(2025, 2, 28)).await;
    assert!(!feb.is_closed);
    assert!(feb.closed_at.is_none());
}

#[tokio::test]
async fn test_invalid_range_rejected() {
    let t = setup().await;
    let err = t
        .repos
        .periods
        .create(input("Backwards", date(2025, 3, 31), date(2025, 3, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err.as_ledger(), Some(LedgerError::InvalidDateRange { .. })));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let single_day = t
        .repos
        .periods
        .create(input("Adjustments", date(2025, 3, 1), date(2025, 3, 1)))
        .await
        .unwrap();
    assert_eq!(single_day.start_date, single_day.end_date);
}

#[tokio::test]
async fn test_generate_year_creates_months() {
    let db = connect_memory().await;
    let repos = Repositories::new(db, LedgerSettings::default());

    let created = repos.periods.generate_year(2026).await.unwrap();
    assert_eq!(created.len(), 12);
    assert_eq!(created[0].name, "January 2026");
    assert_eq!(created[0].start_date, date(2026, 1, 1));
    assert_eq!(created[1].end_date, date(2026, 2, 28));
    assert_eq!(created[11].end_date, date(2026, 12, 31));

    let listed = repos.periods.list(None).await.unwrap();
    assert_eq!(listed.len(), 12);
    assert!(listed.windows(2).all(|w| w[0].start_date < w[1].start_date));
}

#[tokio::test]
async fn test_generate_year_with_shifted_fiscal_start() {
    let db = connect_memory().await;
    let settings = LedgerSettings {
        calendar: FiscalCalendar::new(4).unwrap(),
        ..LedgerSettings::default()
    };
    let repos = Repositories::new(db, settings);

    let created = repos.periods.generate_year(2025).await.unwrap();
    assert_eq!(created.first().unwrap().start_date, date(2025, 4, 1));
    assert_eq!(created.last().unwrap().end_date, date(2026, 3, 31));
}

#[tokio::test]
async fn test_generate_year_is_atomic() {
    let t = setup().await;
    let err = t.repos.periods.generate_year(2025).await.unwrap_err();
    assert!(matches!(err.as_ledger(), Some(LedgerError::OverlappingPeriod(_))));

    let listed = t.repos.periods.list(None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, t.jan.id);
}

#[tokio::test]
async fn test_list_range_and_lookup() {
    let t = setup().await;
    let feb = create_period(&t.repos, "February 2025", date(2025, 2, 1), date(2025, 2, 28)).await;
    create_period(&t.repos, "March 2025", date(2025, 3, 1), date(2025, 3, 31)).await;

    let range = DateRange {
        from: date(2025, 1, 20),
        to: date(2025, 2, 10),
    };
    let listed = t.repos.periods.list(Some(range)).await.unwrap();
    let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["January 2025", "February 2025"]);

    let found = t.repos.periods.find_open_for_date(date(2025, 2, 28)).await.unwrap();
    assert_eq!(found.map(|p| p.id), Some(feb.id));
    assert!(t.repos.periods.find_open_for_date(date(2024, 12, 31)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_close_and_reopen() {
    let t = setup().await;

    let closed = t.repos.periods.close(t.jan.id).await.unwrap();
    assert!(closed.is_closed);
    assert!(closed.closed_at.is_some());
    assert!(t.repos.periods.find_open_for_date(date(2025, 1, 10)).await.unwrap().is_none());

    // closing twice is a no-op
    let again = t.repos.periods.close(t.jan.id).await.unwrap();
    assert!(again.is_closed);

    let reopened = t.repos.periods.reopen(t.jan.id).await.unwrap();
    assert!(!reopened.is_closed);
    assert!(reopened.closed_at.is_none());
    assert!(t.repos.periods.find_open_for_date(date(2025, 1, 10)).await.unwrap().is_some());

    let missing = uuid::Uuid::new_v4();
    let err = t.repos.periods.close(missing).await.unwrap_err();
    assert!(matches!(err.as_ledger(), Some(LedgerError::PeriodNotFound(id)) if *id == missing));
}

//! Chart-of-accounts repository tests.

mod common;

use common::{create_account, date, setup, simple_entry};
use neraca_core::account::{AccountType, NormalBalance};
use neraca_core::opening_balance::{OpeningBalanceDetailInput, OpeningBalanceInput};
use neraca_core::{ErrorKind, LedgerError};
use neraca_db::entities::sea_orm_active_enums;
use neraca_db::repositories::{AccountFilter, CreateAccountInput, UpdateAccountInput};
use rstest::rstest;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_create_defaults_normal_balance() {
    let t = setup().await;
    assert_eq!(t.cash.normal_balance, sea_orm_active_enums::NormalBalance::Debit);
    assert_eq!(t.payable.normal_balance, sea_orm_active_enums::NormalBalance::Credit);
    assert!(t.cash.is_active);

    let contra = t
        .repos
        .accounts
        .create(CreateAccountInput {
            code: "1900".to_string(),
            name: "Accumulated Depreciation".to_string(),
            account_type: AccountType::Asset,
            normal_balance: Some(NormalBalance::Credit),
        })
        .await
        .unwrap();
    assert_eq!(contra.normal_balance, sea_orm_active_enums::NormalBalance::Credit);
    assert_eq!(contra.account_type, sea_orm_active_enums::AccountType::Asset);
}

#[tokio::test]
async fn test_duplicate_code_rejected() {
    let t = setup().await;
    let err = t
        .repos
        .accounts
        .create(CreateAccountInput {
            code: "1100".to_string(),
            name: "Petty Cash".to_string(),
            account_type: AccountType::Asset,
            normal_balance: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err.as_ledger(), Some(LedgerError::DuplicateAccountCode(code)) if code == "1100"));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("11 00")]
#[case("123456789012345678901")]
#[tokio::test]
async fn test_invalid_code_rejected(#[case] code: &str) {
    let t = setup().await;
    let err = t
        .repos
        .accounts
        .create(CreateAccountInput {
            code: code.to_string(),
            name: "Bad".to_string(),
            account_type: AccountType::Expense,
            normal_balance: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err.as_ledger(), Some(LedgerError::InvalidAccountCode(_))));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_list_filters() {
    let t = setup().await;
    let all = t.repos.accounts.list(AccountFilter::default()).await.unwrap();
    let codes: Vec<_> = all.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["1100", "1200", "2100", "4100"]);

    let assets = t
        .repos
        .accounts
        .list(AccountFilter {
            account_type: Some(AccountType::Asset),
            ..AccountFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(assets.len(), 2);

    let searched = t
        .repos
        .accounts
        .list(AccountFilter {
            search: Some("Receivable".to_string()),
            ..AccountFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].id, t.receivable.id);

    t.repos
        .accounts
        .update(
            t.sales.id,
            UpdateAccountInput {
                is_active: Some(false),
                ..UpdateAccountInput::default()
            },
        )
        .await
        .unwrap();
    let active = t
        .repos
        .accounts
        .list(AccountFilter {
            active_only: true,
            ..AccountFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 3);
    assert!(active.iter().all(|a| a.id != t.sales.id));
}

#[tokio::test]
async fn test_update_type_resets_normal_balance() {
    let t = setup().await;
    let updated = t
        .repos
        .accounts
        .update(
            t.receivable.id,
            UpdateAccountInput {
                name: Some("Deferred Revenue".to_string()),
                account_type: Some(AccountType::Liability),
                ..UpdateAccountInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Deferred Revenue");
    assert_eq!(updated.account_type, sea_orm_active_enums::AccountType::Liability);
    assert_eq!(updated.normal_balance, sea_orm_active_enums::NormalBalance::Credit);

    let by_code = t.repos.accounts.find_by_code("1200").await.unwrap().unwrap();
    assert_eq!(by_code.id, updated.id);
    assert_eq!(by_code.normal_balance, updated.normal_balance);
}

#[tokio::test]
async fn test_referenced_account_is_immutable() {
    let t = setup().await;
    t.repos
        .ledger
        .record_entry(simple_entry("JV-0001", date(2025, 1, 3), t.cash.id, t.sales.id, dec!(10)))
        .await
        .unwrap();
    assert!(t.repos.accounts.is_referenced(t.cash.id).await.unwrap());

    let err = t
        .repos
        .accounts
        .update(
            t.cash.id,
            UpdateAccountInput {
                account_type: Some(AccountType::Expense),
                ..UpdateAccountInput::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err.as_ledger(), Some(LedgerError::AccountInUse(id)) if *id == t.cash.id));

    let err = t.repos.accounts.delete(t.sales.id).await.unwrap_err();
    assert!(matches!(err.as_ledger(), Some(LedgerError::AccountInUse(_))));
}

#[tokio::test]
async fn test_draft_opening_balance_references_account() {
    let t = setup().await;
    t.repos
        .opening_balances
        .create(OpeningBalanceInput {
            as_of_date: date(2025, 1, 1),
            description: "Opening".to_string(),
            details: vec![OpeningBalanceDetailInput::debit(t.receivable.id, dec!(5))],
        })
        .await
        .unwrap();

    assert!(t.repos.accounts.is_referenced(t.receivable.id).await.unwrap());
    assert!(t.repos.accounts.delete(t.receivable.id).await.is_err());
}

#[tokio::test]
async fn test_delete_unreferenced() {
    let t = setup().await;
    let spare = create_account(&t.repos, "6100", "Operating Expenses", AccountType::Expense).await;

    t.repos.accounts.delete(spare.id).await.unwrap();
    assert!(t.repos.accounts.find(spare.id).await.unwrap().is_none());

    let err = t.repos.accounts.delete(spare.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

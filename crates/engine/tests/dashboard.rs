mod common;

use std::collections::BTreeMap;

use engine::{AssetKind, BudgetKey, BudgetKind, BudgetRowUpdate, OTHER_INCOME, TransactionKind};

use common::{date, engine_with_db, input, user};

#[tokio::test]
async fn dashboard_compares_with_the_previous_month() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();

    for (kind, amount, on) in [
        (TransactionKind::Income, 2000, date(2024, 12, 31)),
        (TransactionKind::Expense, 400, date(2024, 12, 10)),
        (TransactionKind::Income, 3000, date(2025, 1, 1)),
        (TransactionKind::Expense, 200, date(2025, 1, 15)),
        (TransactionKind::Saving, 100, date(2025, 1, 31)),
        (TransactionKind::Expense, 999, date(2025, 2, 1)),
    ] {
        engine
            .new_transaction(input(account.id, kind, amount, on), &alice)
            .await
            .unwrap();
    }
    engine
        .new_asset("Gold", AssetKind::Commodities, 1000, &alice)
        .await
        .unwrap();

    let dashboard = engine.dashboard(2025, 1, &alice).await.unwrap();
    assert_eq!(dashboard.first_name, "Alice");
    assert_eq!(dashboard.year, 2025);
    assert_eq!(dashboard.month, 1);

    let kinds: Vec<TransactionKind> = dashboard.summaries.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, TransactionKind::ALL.to_vec());

    let summary = |kind| {
        dashboard
            .summaries
            .iter()
            .find(|s| s.kind == kind)
            .cloned()
            .unwrap()
    };
    let income = summary(TransactionKind::Income);
    assert_eq!((income.previous, income.current), (2000, 3000));
    assert_eq!(income.change_percent, 50.0);

    let expense = summary(TransactionKind::Expense);
    assert_eq!((expense.previous, expense.current), (400, 200));
    assert_eq!(expense.change_percent, -50.0);

    let saving = summary(TransactionKind::Saving);
    assert_eq!(saving.change_percent, 100.0);

    let transfer = summary(TransactionKind::Transfer);
    assert_eq!((transfer.previous, transfer.current), (0, 0));
    assert_eq!(transfer.change_percent, 0.0);

    let balance = 2000 - 400 + 3000 - 200 - 100 - 999;
    assert_eq!(dashboard.net_worth.accounts_total, balance);
    assert_eq!(dashboard.net_worth.net_worth, balance + 1000);

    assert_eq!(dashboard.recent.len(), 5);
    assert_eq!(dashboard.recent[0].date, date(2025, 2, 1));
}

#[tokio::test]
async fn empty_dashboard_is_all_zero() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;

    let dashboard = engine.dashboard(2025, 3, &alice).await.unwrap();
    assert!(dashboard.recent.is_empty());
    assert_eq!(dashboard.net_worth.net_worth, 0);
    assert!(
        dashboard
            .summaries
            .iter()
            .all(|s| s.current == 0 && s.previous == 0 && s.change_percent == 0.0)
    );
}

#[tokio::test]
async fn dashboard_carries_daily_series_and_income_sources() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();

    engine
        .update_budget_row(
            BudgetRowUpdate {
                key: BudgetKey {
                    category_name: "Salary".to_string(),
                    kind: BudgetKind::Income,
                    year: 2025,
                    account_id: account.id,
                },
                asset_id: None,
                monthly_amounts: BTreeMap::from([(2, 3000)]),
            },
            &alice,
        )
        .await
        .unwrap();
    for (kind, amount, day) in [
        (TransactionKind::Income, 120, 3),
        (TransactionKind::Income, 80, 3),
        (TransactionKind::Expense, 45, 3),
        (TransactionKind::Saving, 10, 14),
        (TransactionKind::Transfer, 500, 14),
    ] {
        engine
            .new_transaction(input(account.id, kind, amount, date(2025, 2, day)), &alice)
            .await
            .unwrap();
    }

    let dashboard = engine.dashboard(2025, 2, &alice).await.unwrap();

    assert_eq!(dashboard.daily.len(), 28);
    assert_eq!(dashboard.daily[2].day, 3);
    assert_eq!(
        (
            dashboard.daily[2].income,
            dashboard.daily[2].expense,
            dashboard.daily[2].saving
        ),
        (200, 45, 0)
    );
    assert_eq!(dashboard.daily[13].saving, 10);
    assert_eq!(dashboard.daily[27].income, 3000);
    assert_eq!(dashboard.daily.iter().map(|d| d.expense).sum::<i64>(), 45);

    let breakdown: Vec<(&str, i64)> = dashboard
        .income_breakdown
        .iter()
        .map(|source| (source.source.as_str(), source.amount))
        .collect();
    assert_eq!(breakdown, vec![(OTHER_INCOME, 200), ("Salary", 3000)]);
}

#[tokio::test]
async fn dashboard_rejects_unknown_months() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;

    for month in [0, 13] {
        let err = engine.dashboard(2025, month, &alice).await.unwrap_err();
        let engine::EngineError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.iter().next().unwrap().field, "month");
    }
}

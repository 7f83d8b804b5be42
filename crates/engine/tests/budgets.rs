mod common;

use std::collections::BTreeMap;

use engine::{
    AssetKind, BudgetKey, BudgetKind, BudgetRowUpdate, EngineError, MAX_AMOUNT, TransactionKind,
    TransactionListFilter,
};
use uuid::Uuid;

use common::{count, date, engine_with_db, input, user};

fn key(category: &str, kind: BudgetKind, account_id: Uuid) -> BudgetKey {
    BudgetKey {
        category_name: category.to_string(),
        kind,
        year: 2025,
        account_id,
    }
}

fn plan(key: BudgetKey, asset_id: Option<Uuid>, months: &[(u32, i64)]) -> BudgetRowUpdate {
    BudgetRowUpdate {
        key,
        asset_id,
        monthly_amounts: months.iter().copied().collect::<BTreeMap<_, _>>(),
    }
}

#[tokio::test]
async fn positive_plan_is_mirrored_on_the_last_day_of_the_month() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();

    let rows = engine
        .update_budget_row(
            plan(key("Rent", BudgetKind::Expense, account.id), None, &[(2, 900)]),
            &alice,
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].planned_amount, 900);

    let txs = engine
        .transactions(&alice, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].budget_id, Some(rows[0].id));
    assert_eq!(txs[0].kind, TransactionKind::Expense);
    assert_eq!(txs[0].amount, 900);
    assert_eq!(txs[0].date, date(2025, 2, 28));
    assert_eq!(txs[0].description, "Rent");

    let account_now = engine.account(account.id, &alice).await.unwrap();
    assert_eq!(account_now.current_balance, -900);
}

#[tokio::test]
async fn zero_plan_removes_the_mirrored_transaction() {
    let (engine, db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();
    let salary = key("Salary", BudgetKind::Income, account.id);

    engine
        .update_budget_row(plan(salary.clone(), None, &[(1, 3000)]), &alice)
        .await
        .unwrap();
    engine
        .update_budget_row(plan(salary, None, &[(1, 0)]), &alice)
        .await
        .unwrap();

    assert_eq!(count(&db, "SELECT COUNT(*) FROM transactions", vec![]).await, 0);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM budgets", vec![]).await, 1);
    let account_now = engine.account(account.id, &alice).await.unwrap();
    assert_eq!(account_now.current_balance, 0);
}

#[tokio::test]
async fn repeated_updates_keep_a_single_mirror() {
    let (engine, db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();
    let food = key("Food", BudgetKind::Expense, account.id);

    for amount in [250, 250, 300] {
        engine
            .update_budget_row(plan(food.clone(), None, &[(3, amount)]), &alice)
            .await
            .unwrap();
    }

    assert_eq!(count(&db, "SELECT COUNT(*) FROM transactions", vec![]).await, 1);
    assert_eq!(
        count(
            &db,
            "SELECT amount FROM transactions WHERE budget_id IS NOT NULL",
            vec![]
        )
        .await,
        300
    );
    let account_now = engine.account(account.id, &alice).await.unwrap();
    assert_eq!(account_now.current_balance, -300);
}

#[tokio::test]
async fn saving_plan_moves_the_asset_by_the_difference() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();
    let fund = engine
        .new_asset("Index fund", AssetKind::MutualFund, 1000, &alice)
        .await
        .unwrap();
    let saving = key("Retirement", BudgetKind::Saving, account.id);

    engine
        .update_budget_row(plan(saving.clone(), Some(fund.id), &[(4, 100)]), &alice)
        .await
        .unwrap();
    assert_eq!(
        engine.asset(fund.id, &alice).await.unwrap().current_value,
        1100
    );

    engine
        .update_budget_row(plan(saving.clone(), Some(fund.id), &[(4, 150)]), &alice)
        .await
        .unwrap();
    let fund_now = engine.asset(fund.id, &alice).await.unwrap();
    assert_eq!(fund_now.current_value, 1150);
    let values: Vec<i64> = fund_now.history.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![1000, 1100, 1150]);

    // Same plan again leaves the asset alone.
    engine
        .update_budget_row(plan(saving.clone(), Some(fund.id), &[(4, 150)]), &alice)
        .await
        .unwrap();
    let fund_now = engine.asset(fund.id, &alice).await.unwrap();
    assert_eq!(fund_now.current_value, 1150);
    assert_eq!(fund_now.history.len(), 3);

    engine
        .update_budget_row(plan(saving, Some(fund.id), &[(4, 0)]), &alice)
        .await
        .unwrap();
    assert_eq!(
        engine.asset(fund.id, &alice).await.unwrap().current_value,
        1000
    );
    assert_eq!(
        engine.account(account.id, &alice).await.unwrap().current_balance,
        0
    );
}

#[tokio::test]
async fn asset_link_is_rejected_for_non_saving_rows() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();
    let car = engine
        .new_asset("Car", AssetKind::Vehicle, 5000, &alice)
        .await
        .unwrap();

    let err = engine
        .update_budget_row(
            plan(
                key("Fuel", BudgetKind::Expense, account.id),
                Some(car.id),
                &[(1, 50), (13, -1)],
            ),
            &alice,
        )
        .await
        .unwrap_err();
    let EngineError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["monthly_amounts", "monthly_amounts", "asset_id"]);
}

#[tokio::test]
async fn categories_can_be_added_and_deleted() {
    let (engine, db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();
    let gym = key("Gym", BudgetKind::Expense, account.id);

    assert!(
        engine
            .add_budget_category(gym.clone(), None, &alice)
            .await
            .unwrap()
    );
    assert!(
        !engine
            .add_budget_category(gym.clone(), None, &alice)
            .await
            .unwrap()
    );

    let overview = engine.budget_overview(2025, &alice).await.unwrap();
    assert_eq!(overview.lines.len(), 1);
    assert_eq!(overview.lines[0].amounts, [0; 12]);

    engine
        .update_budget_row(plan(gym.clone(), None, &[(1, 40), (2, 40), (3, 45)]), &alice)
        .await
        .unwrap();
    let overview = engine.budget_overview(2025, &alice).await.unwrap();
    assert_eq!(overview.lines[0].total, 125);
    assert_eq!(overview.totals[&BudgetKind::Expense], 125);
    assert_eq!(overview.totals[&BudgetKind::Income], 0);
    assert_eq!(
        engine.account(account.id, &alice).await.unwrap().current_balance,
        -125
    );

    let removed = engine.delete_budget_category(gym, &alice).await.unwrap();
    assert_eq!(removed, 3);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM budgets", vec![]).await, 0);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM transactions", vec![]).await, 0);
    assert_eq!(
        engine.account(account.id, &alice).await.unwrap().current_balance,
        0
    );
}

#[tokio::test]
async fn budget_rows_on_foreign_accounts_are_not_found() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();

    let err = engine
        .update_budget_row(
            plan(key("Rent", BudgetKind::Expense, account.id), None, &[(1, 900)]),
            &bob,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn plan_edits_without_an_asset_keep_the_link() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();
    let fund = engine
        .new_asset("Index fund", AssetKind::MutualFund, 1000, &alice)
        .await
        .unwrap();
    let saving = key("Retirement", BudgetKind::Saving, account.id);

    engine
        .update_budget_row(plan(saving.clone(), Some(fund.id), &[(4, 100)]), &alice)
        .await
        .unwrap();
    let rows = engine
        .update_budget_row(plan(saving.clone(), None, &[(4, 300), (5, 50)]), &alice)
        .await
        .unwrap();
    assert!(rows.iter().all(|row| row.asset_id == Some(fund.id)));

    let overview = engine.budget_overview(2025, &alice).await.unwrap();
    assert_eq!(overview.lines[0].asset_id, Some(fund.id));
    assert_eq!(
        engine.asset(fund.id, &alice).await.unwrap().current_value,
        1350
    );
}

#[tokio::test]
async fn category_added_with_an_asset_drives_later_plans() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();
    let fund = engine
        .new_asset("Index fund", AssetKind::MutualFund, 1000, &alice)
        .await
        .unwrap();
    let saving = key("Retirement", BudgetKind::Saving, account.id);

    assert!(
        engine
            .add_budget_category(saving.clone(), Some(fund.id), &alice)
            .await
            .unwrap()
    );
    engine
        .update_budget_row(plan(saving, None, &[(1, 200)]), &alice)
        .await
        .unwrap();
    assert_eq!(
        engine.asset(fund.id, &alice).await.unwrap().current_value,
        1200
    );

    let err = engine
        .add_budget_category(
            key("Rent", BudgetKind::Expense, account.id),
            Some(fund.id),
            &alice,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn multi_month_plan_records_one_snapshot() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();
    let fund = engine
        .new_asset("Index fund", AssetKind::MutualFund, 1000, &alice)
        .await
        .unwrap();

    engine
        .update_budget_row(
            plan(
                key("Retirement", BudgetKind::Saving, account.id),
                Some(fund.id),
                &[(1, 100), (2, 100), (3, 100)],
            ),
            &alice,
        )
        .await
        .unwrap();

    let fund_now = engine.asset(fund.id, &alice).await.unwrap();
    assert_eq!(fund_now.current_value, 1300);
    let values: Vec<i64> = fund_now.history.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![1000, 1300]);

    let net_worth = engine.net_worth_at(chrono::Utc::now(), &alice).await.unwrap();
    assert_eq!(net_worth.assets_total, 1300);
}

#[tokio::test]
async fn oversized_plans_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();

    let err = engine
        .update_budget_row(
            plan(
                key("Salary", BudgetKind::Income, account.id),
                None,
                &[(1, MAX_AMOUNT + 1)],
            ),
            &alice,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    engine
        .new_transaction(
            input(account.id, TransactionKind::Income, MAX_AMOUNT, date(2025, 1, 1)),
            &alice,
        )
        .await
        .unwrap();
    engine
        .update_budget_row(
            plan(
                key("Salary", BudgetKind::Income, account.id),
                None,
                &[(1, MAX_AMOUNT)],
            ),
            &alice,
        )
        .await
        .unwrap();
    assert_eq!(
        engine.account(account.id, &alice).await.unwrap().current_balance,
        2 * MAX_AMOUNT
    );
}

mod common;

use engine::{EngineError, MAX_AMOUNT, TransactionInput, TransactionKind, TransactionListFilter};
use uuid::Uuid;

use common::{date, engine_with_db, input, user};

#[tokio::test]
async fn new_account_starts_at_zero() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;

    let account = engine.new_account("  Checking ", &alice).await.unwrap();
    assert_eq!(account.name, "Checking");
    assert_eq!(account.current_balance, 0);

    let accounts = engine.accounts(&alice).await.unwrap();
    assert_eq!(accounts, vec![account]);
}

#[tokio::test]
async fn duplicate_account_name_is_a_conflict() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;

    engine.new_account("Checking", &alice).await.unwrap();
    let err = engine.new_account("checking", &alice).await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("checking".to_string()));
}

#[tokio::test]
async fn balance_follows_every_mutation() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();

    engine
        .new_transaction(
            input(account.id, TransactionKind::Income, 5000, date(2025, 3, 1)),
            &alice,
        )
        .await
        .unwrap();
    let rent = engine
        .new_transaction(
            input(account.id, TransactionKind::Expense, 1200, date(2025, 3, 2)),
            &alice,
        )
        .await
        .unwrap();
    engine
        .new_transaction(
            input(account.id, TransactionKind::Saving, 300, date(2025, 3, 3)),
            &alice,
        )
        .await
        .unwrap();
    engine
        .new_transaction(
            input(account.id, TransactionKind::Transfer, 200, date(2025, 3, 4)),
            &alice,
        )
        .await
        .unwrap();
    engine
        .new_transaction(
            input(account.id, TransactionKind::AssetPurchase, 100, date(2025, 3, 5)),
            &alice,
        )
        .await
        .unwrap();

    let account_now = engine.account(account.id, &alice).await.unwrap();
    assert_eq!(account_now.current_balance, 5000 - 1200 - 300 - 200 - 100);

    engine
        .update_transaction(
            rent.id,
            input(account.id, TransactionKind::Expense, 1500, date(2025, 3, 2)),
            &alice,
        )
        .await
        .unwrap();
    let account_now = engine.account(account.id, &alice).await.unwrap();
    assert_eq!(account_now.current_balance, 5000 - 1500 - 300 - 200 - 100);

    engine.delete_transaction(rent.id, &alice).await.unwrap();
    let account_now = engine.account(account.id, &alice).await.unwrap();
    assert_eq!(account_now.current_balance, 5000 - 300 - 200 - 100);
}

#[tokio::test]
async fn moving_a_transaction_recalculates_both_accounts() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let checking = engine.new_account("Checking", &alice).await.unwrap();
    let savings = engine.new_account("Savings", &alice).await.unwrap();

    let salary = engine
        .new_transaction(
            input(checking.id, TransactionKind::Income, 2000, date(2025, 1, 31)),
            &alice,
        )
        .await
        .unwrap();

    engine
        .update_transaction(
            salary.id,
            input(savings.id, TransactionKind::Income, 2000, date(2025, 1, 31)),
            &alice,
        )
        .await
        .unwrap();

    assert_eq!(
        engine.account(checking.id, &alice).await.unwrap().current_balance,
        0
    );
    assert_eq!(
        engine.account(savings.id, &alice).await.unwrap().current_balance,
        2000
    );
}

#[tokio::test]
async fn recalculate_balance_repairs_and_ignores_unknown_accounts() {
    let (engine, db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();
    engine
        .new_transaction(
            input(account.id, TransactionKind::Income, 700, date(2025, 2, 1)),
            &alice,
        )
        .await
        .unwrap();

    use sea_orm::{ConnectionTrait, Statement};
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE accounts SET current_balance = 0 WHERE id = ?",
        vec![account.id.to_string().into()],
    ))
    .await
    .unwrap();

    let balance = engine
        .recalculate_balance(account.id, &alice)
        .await
        .unwrap();
    assert_eq!(balance, Some(700));

    let missing = engine
        .recalculate_balance(Uuid::new_v4(), &alice)
        .await
        .unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn amounts_above_the_cap_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();

    for amount in [MAX_AMOUNT + 1, i64::MAX / 2 + 1, i64::MAX] {
        let err = engine
            .new_transaction(
                input(account.id, TransactionKind::Income, amount, date(2025, 1, 1)),
                &alice,
            )
            .await
            .unwrap_err();
        let EngineError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.iter().next().unwrap().field, "amount");
    }

    engine
        .new_transaction(
            input(account.id, TransactionKind::Income, MAX_AMOUNT, date(2025, 1, 1)),
            &alice,
        )
        .await
        .unwrap();
    assert_eq!(
        engine.account(account.id, &alice).await.unwrap().current_balance,
        MAX_AMOUNT
    );
}

#[tokio::test]
async fn overflowing_ledger_is_an_error_not_a_panic() {
    let (engine, db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();
    for day in [1, 2] {
        engine
            .new_transaction(
                input(account.id, TransactionKind::Income, 700, date(2025, 2, day)),
                &alice,
            )
            .await
            .unwrap();
    }

    use sea_orm::{ConnectionTrait, Statement};
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE transactions SET amount = ? WHERE account_id = ?",
        vec![(i64::MAX / 2 + 1).into(), account.id.to_string().into()],
    ))
    .await
    .unwrap();

    let err = engine
        .recalculate_balance(account.id, &alice)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(
        engine.account(account.id, &alice).await.unwrap().current_balance,
        1400
    );
    assert!(matches!(
        engine.dashboard(2025, 2, &alice).await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn invalid_input_reports_every_field() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();

    let err = engine
        .new_transaction(
            TransactionInput {
                account_id: account.id,
                kind: TransactionKind::Expense,
                amount: 0,
                description: Some("x".repeat(250)),
                date: date(2025, 1, 1),
            },
            &alice,
        )
        .await
        .unwrap_err();

    let EngineError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["amount", "description"]);
}

#[tokio::test]
async fn other_users_rows_are_not_found() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();
    let tx = engine
        .new_transaction(
            input(account.id, TransactionKind::Income, 100, date(2025, 1, 1)),
            &alice,
        )
        .await
        .unwrap();

    assert!(matches!(
        engine.account(account.id, &bob).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.transaction(tx.id, &bob).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .new_transaction(
                input(account.id, TransactionKind::Expense, 50, date(2025, 1, 2)),
                &bob,
            )
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(
        engine
            .transactions(&bob, &TransactionListFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn list_filters_by_month_and_kind() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();

    for (kind, amount, on) in [
        (TransactionKind::Income, 1000, date(2025, 1, 31)),
        (TransactionKind::Expense, 100, date(2025, 2, 1)),
        (TransactionKind::Expense, 200, date(2025, 2, 28)),
        (TransactionKind::Income, 300, date(2025, 2, 15)),
    ] {
        engine
            .new_transaction(input(account.id, kind, amount, on), &alice)
            .await
            .unwrap();
    }

    let february_expenses = engine
        .transactions(
            &alice,
            &TransactionListFilter {
                month: Some((2025, 2)),
                kind: Some(TransactionKind::Expense),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let amounts: Vec<i64> = february_expenses.iter().map(|tx| tx.amount).collect();
    assert_eq!(amounts, vec![200, 100]);
}

#[tokio::test]
async fn csv_export_lists_transactions_oldest_first() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let account = engine.new_account("Checking", &alice).await.unwrap();

    engine
        .new_transaction(
            TransactionInput {
                description: Some("Groceries, weekly".to_string()),
                ..input(account.id, TransactionKind::Expense, 4250, date(2025, 2, 3))
            },
            &alice,
        )
        .await
        .unwrap();
    engine
        .new_transaction(
            input(account.id, TransactionKind::Income, 100000, date(2025, 1, 31)),
            &alice,
        )
        .await
        .unwrap();

    let csv = engine.export_transactions_csv(&alice).await.unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "date,kind,amount,description,account",
            "2025-01-31,income,100000,,Checking",
            "2025-02-03,expense,4250,\"Groceries, weekly\",Checking",
        ]
    );
}

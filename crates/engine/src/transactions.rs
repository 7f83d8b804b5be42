//! Transaction primitives.
//!
//! A `Transaction` is a money movement on one account. Only `Income` adds to
//! the account balance; every other kind subtracts from it.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{checked_total, parse_uuid},
};

/// Largest amount, in minor units, a single transaction, plan or asset value
/// may hold. Sums of many such values still fit in an `i64`.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Saving,
    Transfer,
    AssetPurchase,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 5] = [
        Self::Income,
        Self::Expense,
        Self::Saving,
        Self::Transfer,
        Self::AssetPurchase,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Saving => "saving",
            Self::Transfer => "transfer",
            Self::AssetPurchase => "asset_purchase",
        }
    }

    /// Contribution of `amount` to the account balance.
    pub fn signed(self, amount: i64) -> i64 {
        match self {
            Self::Income => amount,
            _ => -amount,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "saving" => Ok(Self::Saving),
            "transfer" => Ok(Self::Transfer),
            "asset_purchase" => Ok(Self::AssetPurchase),
            other => Err(EngineError::invalid(
                "kind",
                format!("invalid transaction kind: {other}"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub budget_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: String,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        kind: TransactionKind,
        amount: i64,
        description: String,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            budget_id: None,
            kind,
            amount,
            description,
            date,
        }
    }

    /// Contribution of this transaction to its account balance.
    pub fn signed_amount(&self) -> i64 {
        self.kind.signed(self.amount)
    }
}

/// Signed sum of a set of transactions: the balance they produce.
///
/// Fails with a validation error on `amount` when the sum leaves the `i64`
/// range.
pub fn fold_balance<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> ResultEngine<i64> {
    checked_total(
        transactions.into_iter().map(Transaction::signed_amount),
        "amount",
    )
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    #[sea_orm(unique)]
    pub budget_id: Option<String>,
    pub kind: String,
    pub amount: i64,
    pub description: String,
    pub transaction_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Budgets,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(value: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::NotSet,
            account_id: ActiveValue::Set(value.account_id.to_string()),
            budget_id: ActiveValue::Set(value.budget_id.map(|id| id.to_string())),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            amount: ActiveValue::Set(value.amount),
            description: ActiveValue::Set(value.description.clone()),
            transaction_date: ActiveValue::Set(value.date),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            budget_id: model
                .budget_id
                .as_deref()
                .map(|id| parse_uuid(id, "budget"))
                .transpose()?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: model.amount,
            description: model.description,
            date: model.transaction_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: TransactionKind, amount: i64) -> Transaction {
        Transaction::new(
            Uuid::new_v4(),
            kind,
            amount,
            String::new(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        )
    }

    #[test]
    fn only_income_is_positive() {
        assert_eq!(TransactionKind::Income.signed(100), 100);
        for kind in TransactionKind::ALL {
            if kind != TransactionKind::Income {
                assert_eq!(kind.signed(100), -100, "{kind:?}");
            }
        }
    }

    #[test]
    fn fold_balance_sums_signed_amounts() {
        let txs = vec![
            tx(TransactionKind::Income, 5000),
            tx(TransactionKind::Expense, 1200),
            tx(TransactionKind::Saving, 800),
            tx(TransactionKind::Transfer, 500),
            tx(TransactionKind::AssetPurchase, 1000),
        ];
        assert_eq!(fold_balance(&txs).unwrap(), 1500);
        assert_eq!(fold_balance(&[]).unwrap(), 0);
    }

    #[test]
    fn fold_balance_reports_overflow() {
        let half = i64::MAX / 2 + 1;
        let txs = vec![
            tx(TransactionKind::Income, half),
            tx(TransactionKind::Income, half),
        ];
        let Err(EngineError::Validation(errors)) = fold_balance(&txs) else {
            panic!("expected validation error");
        };
        assert_eq!(errors.iter().next().unwrap().field, "amount");

        let txs = vec![
            tx(TransactionKind::Expense, half),
            tx(TransactionKind::Expense, half),
            tx(TransactionKind::Expense, 1),
        ];
        assert!(fold_balance(&txs).is_err());
    }

    #[test]
    fn kind_round_trips_through_storage_string() {
        for kind in TransactionKind::ALL {
            assert_eq!(TransactionKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(TransactionKind::try_from("refund").is_err());
    }
}

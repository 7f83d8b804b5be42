//! Budget rows.
//!
//! A budget row is the planned amount for one category of one kind, in one
//! month of one year, on one account. A positive plan is mirrored by exactly
//! one transaction so that it counts towards balances and dashboard totals.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, TransactionKind, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetKind {
    Income,
    Saving,
    Expense,
}

impl BudgetKind {
    pub const ALL: [BudgetKind; 3] = [Self::Income, Self::Saving, Self::Expense];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Saving => "saving",
            Self::Expense => "expense",
        }
    }

    /// Kind of the transaction mirroring a budget row of this kind.
    pub fn transaction_kind(self) -> TransactionKind {
        match self {
            Self::Income => TransactionKind::Income,
            Self::Saving => TransactionKind::Saving,
            Self::Expense => TransactionKind::Expense,
        }
    }
}

impl TryFrom<&str> for BudgetKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "saving" => Ok(Self::Saving),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::invalid(
                "kind",
                format!("invalid budget kind: {other}"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Budget {
    pub id: Uuid,
    pub year: i32,
    pub month: u32,
    pub category_name: String,
    pub kind: BudgetKind,
    pub account_id: Uuid,
    pub asset_id: Option<Uuid>,
    pub planned_amount: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub year: i32,
    pub month: i32,
    pub category_name: String,
    pub kind: String,
    pub account_id: String,
    pub asset_id: Option<String>,
    pub planned_amount: i64,
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
        belongs_to = "super::assets::Entity",
        from = "Column::AssetId",
        to = "super::assets::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Assets,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assets.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(value: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::NotSet,
            year: ActiveValue::Set(value.year),
            month: ActiveValue::Set(value.month as i32),
            category_name: ActiveValue::Set(value.category_name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            account_id: ActiveValue::Set(value.account_id.to_string()),
            asset_id: ActiveValue::Set(value.asset_id.map(|id| id.to_string())),
            planned_amount: ActiveValue::Set(value.planned_amount),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let month = u32::try_from(model.month)
            .map_err(|_| EngineError::invalid("month", format!("invalid month {}", model.month)))?;
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            year: model.year,
            month,
            category_name: model.category_name,
            kind: BudgetKind::try_from(model.kind.as_str())?,
            account_id: parse_uuid(&model.account_id, "account")?,
            asset_id: model
                .asset_id
                .as_deref()
                .map(|id| parse_uuid(id, "asset"))
                .transpose()?,
            planned_amount: model.planned_amount,
        })
    }
}

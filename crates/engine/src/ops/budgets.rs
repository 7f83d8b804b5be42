//! Budget synchronizer.
//!
//! Each budget row with a positive planned amount is mirrored by exactly one
//! transaction dated on the last day of its month, so plans count towards
//! balances and dashboard totals. A planned amount of 0 means "no mirrored
//! transaction". Saving rows linked to an asset move that asset's value by the
//! change in plan, never by the plan itself, so repeated edits do not
//! double-count. A row keeps its asset link until a request names another
//! asset.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Budget, BudgetKind, EngineError, FieldErrors, MAX_AMOUNT, ResultEngine, Transaction, budgets,
    transactions,
    util::{checked_total, last_day_of_month, parse_uuid},
};

use super::{
    Engine, assets::adjust_asset_value, ledger::recalculate_in, normalize_required_name,
    transactions::insert_transaction, with_tx,
};

/// Identifies one budget category line: every month of it shares this key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetKey {
    pub category_name: String,
    pub kind: BudgetKind,
    pub year: i32,
    pub account_id: Uuid,
}

/// New planned amounts for some months of one budget line.
#[derive(Clone, Debug)]
pub struct BudgetRowUpdate {
    pub key: BudgetKey,
    /// Only meaningful for [`BudgetKind::Saving`]. `None` keeps whatever
    /// asset the rows are already linked to.
    pub asset_id: Option<Uuid>,
    /// `month (1..=12) → planned amount` in minor units.
    pub monthly_amounts: BTreeMap<u32, i64>,
}

/// One line of the yearly budget grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetLine {
    pub category_name: String,
    pub kind: BudgetKind,
    pub account_id: Uuid,
    pub asset_id: Option<Uuid>,
    /// Planned amount per month, January first.
    pub amounts: [i64; 12],
    pub total: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetOverview {
    pub year: i32,
    pub lines: Vec<BudgetLine>,
    /// Yearly planned total per kind.
    pub totals: BTreeMap<BudgetKind, i64>,
}

impl BudgetKey {
    fn normalized(&self) -> ResultEngine<BudgetKey> {
        Ok(BudgetKey {
            category_name: normalize_required_name(&self.category_name, "category_name")?,
            ..self.clone()
        })
    }

    /// Filter for every month of this line.
    fn condition(&self, user_id: &str) -> sea_orm::Condition {
        sea_orm::Condition::all()
            .add(budgets::Column::UserId.eq(user_id.to_string()))
            .add(budgets::Column::Year.eq(self.year))
            .add(budgets::Column::CategoryName.eq(self.category_name.clone()))
            .add(budgets::Column::Kind.eq(self.kind.as_str()))
            .add(budgets::Column::AccountId.eq(self.account_id.to_string()))
    }
}

fn check_asset_link(kind: BudgetKind, asset_id: Option<Uuid>, errors: &mut FieldErrors) {
    if asset_id.is_some() && kind != BudgetKind::Saving {
        errors.push("asset_id", "only saving budgets can be linked to an asset");
    }
}

impl BudgetRowUpdate {
    fn validate(&self) -> ResultEngine<BudgetKey> {
        let mut errors = FieldErrors::new();
        let key = match self.key.normalized() {
            Ok(key) => Some(key),
            Err(EngineError::Validation(inner)) => {
                for error in inner.iter() {
                    errors.push(&error.field, error.message.clone());
                }
                None
            }
            Err(other) => return Err(other),
        };
        if self.monthly_amounts.is_empty() {
            errors.push("monthly_amounts", "must not be empty");
        }
        for (&month, &amount) in &self.monthly_amounts {
            if !(1..=12).contains(&month) {
                errors.push("monthly_amounts", format!("invalid month {month}"));
            }
            if amount < 0 {
                errors.push(
                    "monthly_amounts",
                    format!("planned amount for month {month} must be >= 0"),
                );
            } else if amount > MAX_AMOUNT {
                errors.push(
                    "monthly_amounts",
                    format!("planned amount for month {month} must be at most {MAX_AMOUNT}"),
                );
            }
        }
        check_asset_link(self.key.kind, self.asset_id, &mut errors);
        errors.into_result()?;
        key.ok_or_else(|| EngineError::invalid("category_name", "must not be empty"))
    }
}

impl Engine {
    /// Sets the planned amount of one budget line for the given months and
    /// keeps the mirrored transactions and the linked asset in step.
    ///
    /// Per month:
    /// 1. find or create the budget row for the key and month;
    /// 2. remember the amount of the mirrored transaction (0 if none);
    /// 3. a positive plan creates or updates the mirrored transaction;
    /// 4. a zero plan deletes it;
    /// 5. saving rows with an asset shift the asset by `plan - previous`.
    ///
    /// The asset shifts are summed per asset and applied once at the end, so
    /// each asset gets a single history snapshot per call. The account balance
    /// is then recalculated. Everything runs in one DB transaction.
    pub async fn update_budget_row(
        &self,
        update: BudgetRowUpdate,
        user_id: &str,
    ) -> ResultEngine<Vec<Budget>> {
        let key = update.validate()?;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, key.account_id)
                .await?;
            let asset_id = match update.asset_id {
                Some(asset_id) => {
                    self.require_asset(&db_tx, user_id, asset_id).await?;
                    Some(asset_id)
                }
                None => linked_asset(&db_tx, user_id, &key).await?,
            };

            let mut rows = Vec::with_capacity(update.monthly_amounts.len());
            let mut asset_deltas: BTreeMap<Uuid, i64> = BTreeMap::new();
            for (&month, &planned) in &update.monthly_amounts {
                let budget =
                    find_or_create_budget(&db_tx, user_id, &key, month, asset_id).await?;
                let budget = set_planned_amount(&db_tx, budget, planned, asset_id).await?;

                let mirrored = mirrored_transaction(&db_tx, &budget.id).await?;
                let previous = mirrored.as_ref().map(|tx| tx.amount).unwrap_or(0);

                if planned > 0 {
                    let date = last_day_of_month(key.year, month)?;
                    match mirrored {
                        Some(model) => {
                            let active = transactions::ActiveModel {
                                id: ActiveValue::Set(model.id),
                                account_id: ActiveValue::Set(key.account_id.to_string()),
                                kind: ActiveValue::Set(
                                    key.kind.transaction_kind().as_str().to_string(),
                                ),
                                amount: ActiveValue::Set(planned),
                                description: ActiveValue::Set(key.category_name.clone()),
                                transaction_date: ActiveValue::Set(date),
                                ..Default::default()
                            };
                            active.update(&db_tx).await?;
                        }
                        None => {
                            let mut tx = Transaction::new(
                                key.account_id,
                                key.kind.transaction_kind(),
                                planned,
                                key.category_name.clone(),
                                date,
                            );
                            tx.budget_id = Some(budget.id);
                            insert_transaction(&db_tx, user_id, &tx).await?;
                        }
                    }
                } else if let Some(model) = mirrored {
                    transactions::Entity::delete_by_id(model.id)
                        .exec(&db_tx)
                        .await?;
                }

                if key.kind == BudgetKind::Saving
                    && let Some(asset_id) = budget.asset_id
                {
                    let delta = asset_deltas.entry(asset_id).or_insert(0);
                    *delta = checked_total([*delta, planned - previous], "monthly_amounts")?;
                }

                rows.push(budget);
            }

            for (asset_id, delta) in asset_deltas {
                adjust_asset_value(&db_tx, &asset_id.to_string(), delta, now).await?;
            }
            recalculate_in(&db_tx, &key.account_id.to_string()).await?;
            Ok(rows)
        })
    }

    /// Creates the line with a zero plan for January, unless any month of it
    /// already exists. A saving line may be linked to an asset here. Returns
    /// whether a row was created.
    pub async fn add_budget_category(
        &self,
        key: BudgetKey,
        asset_id: Option<Uuid>,
        user_id: &str,
    ) -> ResultEngine<bool> {
        let key = key.normalized()?;
        let mut errors = FieldErrors::new();
        check_asset_link(key.kind, asset_id, &mut errors);
        errors.into_result()?;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, key.account_id)
                .await?;
            if let Some(asset_id) = asset_id {
                self.require_asset(&db_tx, user_id, asset_id).await?;
            }

            let exists = budgets::Entity::find()
                .filter(key.condition(user_id))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Ok(false);
            }

            find_or_create_budget(&db_tx, user_id, &key, 1, asset_id).await?;
            Ok(true)
        })
    }

    /// Removes every month of a budget line together with the mirrored
    /// transactions, then recalculates the account. Returns the number of
    /// budget rows removed.
    pub async fn delete_budget_category(
        &self,
        key: BudgetKey,
        user_id: &str,
    ) -> ResultEngine<u64> {
        let key = key.normalized()?;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, key.account_id)
                .await?;

            let ids: Vec<String> = budgets::Entity::find()
                .filter(key.condition(user_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| model.id)
                .collect();
            if ids.is_empty() {
                return Ok(0);
            }

            transactions::Entity::delete_many()
                .filter(transactions::Column::BudgetId.is_in(ids.clone()))
                .exec(&db_tx)
                .await?;
            let removed = budgets::Entity::delete_many()
                .filter(budgets::Column::Id.is_in(ids))
                .exec(&db_tx)
                .await?
                .rows_affected;

            recalculate_in(&db_tx, &key.account_id.to_string()).await?;
            Ok(removed)
        })
    }

    /// The yearly budget grid: one line per (category, kind, account), twelve
    /// monthly amounts each, ordered by kind then category.
    pub async fn budget_overview(&self, year: i32, user_id: &str) -> ResultEngine<BudgetOverview> {
        let rows = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .filter(budgets::Column::Year.eq(year))
            .order_by_asc(budgets::Column::Month)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Budget::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        build_overview(year, rows)
    }
}

fn build_overview(year: i32, rows: Vec<Budget>) -> ResultEngine<BudgetOverview> {
    let mut lines: HashMap<(BudgetKind, String, Uuid), BudgetLine> = HashMap::new();
    for row in rows {
        let line = lines
            .entry((row.kind, row.category_name.clone(), row.account_id))
            .or_insert_with(|| BudgetLine {
                category_name: row.category_name.clone(),
                kind: row.kind,
                account_id: row.account_id,
                asset_id: None,
                amounts: [0; 12],
                total: 0,
            });
        if let Some(slot) = (row.month as usize)
            .checked_sub(1)
            .and_then(|index| line.amounts.get_mut(index))
        {
            *slot = row.planned_amount;
        }
        if line.asset_id.is_none() {
            line.asset_id = row.asset_id;
        }
    }

    let mut lines: Vec<BudgetLine> = lines
        .into_values()
        .map(|mut line| {
            line.total = checked_total(line.amounts, "monthly_amounts")?;
            Ok(line)
        })
        .collect::<ResultEngine<_>>()?;
    lines.sort_by(|a, b| {
        (a.kind, &a.category_name, a.account_id).cmp(&(b.kind, &b.category_name, b.account_id))
    });

    let mut totals: BTreeMap<BudgetKind, i64> =
        BudgetKind::ALL.into_iter().map(|kind| (kind, 0)).collect();
    for line in &lines {
        let total = totals.entry(line.kind).or_insert(0);
        *total = checked_total([*total, line.total], "monthly_amounts")?;
    }

    Ok(BudgetOverview {
        year,
        lines,
        totals,
    })
}

async fn find_or_create_budget(
    db_tx: &DatabaseTransaction,
    user_id: &str,
    key: &BudgetKey,
    month: u32,
    asset_id: Option<Uuid>,
) -> ResultEngine<Budget> {
    let existing = budgets::Entity::find()
        .filter(key.condition(user_id))
        .filter(budgets::Column::Month.eq(month as i32))
        .one(db_tx)
        .await?;
    if let Some(model) = existing {
        return Budget::try_from(model);
    }

    let budget = Budget {
        id: Uuid::new_v4(),
        year: key.year,
        month,
        category_name: key.category_name.clone(),
        kind: key.kind,
        account_id: key.account_id,
        asset_id,
        planned_amount: 0,
    };
    let mut model: budgets::ActiveModel = (&budget).into();
    model.user_id = ActiveValue::Set(user_id.to_string());
    model.insert(db_tx).await?;
    Ok(budget)
}

/// Stores the new plan. The asset link only changes when `asset_id` names
/// an asset.
async fn set_planned_amount(
    db_tx: &DatabaseTransaction,
    mut budget: Budget,
    planned: i64,
    asset_id: Option<Uuid>,
) -> ResultEngine<Budget> {
    let asset_id = asset_id.or(budget.asset_id);
    if budget.planned_amount == planned && budget.asset_id == asset_id {
        return Ok(budget);
    }
    let active = budgets::ActiveModel {
        id: ActiveValue::Set(budget.id.to_string()),
        planned_amount: ActiveValue::Set(planned),
        asset_id: ActiveValue::Set(asset_id.map(|id| id.to_string())),
        ..Default::default()
    };
    active.update(db_tx).await?;
    budget.planned_amount = planned;
    budget.asset_id = asset_id;
    Ok(budget)
}

/// The asset any month of the line is already linked to.
async fn linked_asset(
    db_tx: &DatabaseTransaction,
    user_id: &str,
    key: &BudgetKey,
) -> ResultEngine<Option<Uuid>> {
    let linked = budgets::Entity::find()
        .filter(key.condition(user_id))
        .filter(budgets::Column::AssetId.is_not_null())
        .order_by_asc(budgets::Column::Month)
        .one(db_tx)
        .await?;
    linked
        .and_then(|model| model.asset_id)
        .map(|id| parse_uuid(&id, "asset"))
        .transpose()
}

async fn mirrored_transaction(
    db_tx: &DatabaseTransaction,
    budget_id: &Uuid,
) -> ResultEngine<Option<transactions::Model>> {
    Ok(transactions::Entity::find()
        .filter(transactions::Column::BudgetId.eq(budget_id.to_string()))
        .one(db_tx)
        .await?)
}

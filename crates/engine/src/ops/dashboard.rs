use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionKind, budgets, transactions,
    util::{first_day_of_month, last_day_of_month, parse_uuid, previous_month},
};

use super::{Engine, NetWorth, TransactionListFilter, with_tx};

const RECENT_TRANSACTIONS: u64 = 5;

/// Source name of income that does not mirror a budget line.
pub const OTHER_INCOME: &str = "Other Income";

/// Month-over-month totals for one transaction kind.
#[derive(Clone, Debug, PartialEq)]
pub struct KindSummary {
    pub kind: TransactionKind,
    pub current: i64,
    pub previous: i64,
    /// Percent change from `previous` to `current`.
    pub change_percent: f64,
}

/// Income, expense and saving booked on one day of the month.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DailyTotals {
    pub day: u32,
    pub income: i64,
    pub expense: i64,
    pub saving: i64,
}

/// Income of the month from one budget category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomeSource {
    pub source: String,
    pub amount: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    pub year: i32,
    pub month: u32,
    pub first_name: String,
    /// One entry per [`TransactionKind`], in [`TransactionKind::ALL`] order.
    pub summaries: Vec<KindSummary>,
    /// One entry per calendar day of the month, the 1st first.
    pub daily: Vec<DailyTotals>,
    /// Ordered by source name.
    pub income_breakdown: Vec<IncomeSource>,
    pub net_worth: NetWorth,
    pub recent: Vec<Transaction>,
}

/// Percent change from `previous` to `current`.
///
/// - `previous > 0`: `(current - previous) / previous * 100`
/// - `previous == 0 && current > 0`: `100`
/// - otherwise: `0`
pub fn change_percent(previous: i64, current: i64) -> f64 {
    if previous > 0 {
        (current as f64 - previous as f64) / previous as f64 * 100.0
    } else if current > 0 {
        100.0
    } else {
        0.0
    }
}

impl Engine {
    /// Totals per transaction kind for `(year, month)` and the month before,
    /// the daily chart series and income breakdown of the month, plus the
    /// current net worth and the latest transactions.
    pub async fn dashboard(&self, year: i32, month: u32, user_id: &str) -> ResultEngine<Dashboard> {
        first_day_of_month(year, month)?;
        let (prev_year, prev_month) = previous_month(year, month);

        let (first_name, current, previous, categories) = with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let current = month_transactions(&db_tx, user_id, year, month).await?;
            let previous = month_transactions(&db_tx, user_id, prev_year, prev_month).await?;
            let categories = budget_categories(&db_tx, &current).await?;
            Ok::<_, EngineError>((user.first_name, current, previous, categories))
        })?;

        let current_totals = totals_by_kind(&current)?;
        let previous_totals = totals_by_kind(&previous)?;
        let summaries = TransactionKind::ALL
            .into_iter()
            .map(|kind| {
                let current = current_totals.get(&kind).copied().unwrap_or(0);
                let previous = previous_totals.get(&kind).copied().unwrap_or(0);
                KindSummary {
                    kind,
                    current,
                    previous,
                    change_percent: change_percent(previous, current),
                }
            })
            .collect();

        let daily = daily_totals(year, month, &current)?;
        let income_breakdown = income_breakdown(&current, &categories)?;

        let net_worth = self.net_worth(user_id).await?;
        let recent = self
            .transactions(
                user_id,
                &TransactionListFilter {
                    limit: Some(RECENT_TRANSACTIONS),
                    ..Default::default()
                },
            )
            .await?;

        Ok(Dashboard {
            year,
            month,
            first_name,
            summaries,
            daily,
            income_breakdown,
            net_worth,
            recent,
        })
    }
}

fn add_amount(slot: &mut i64, amount: i64) -> ResultEngine<()> {
    *slot = slot
        .checked_add(amount)
        .ok_or_else(|| EngineError::invalid("amount", "total is out of range"))?;
    Ok(())
}

async fn month_transactions(
    db_tx: &DatabaseTransaction,
    user_id: &str,
    year: i32,
    month: u32,
) -> ResultEngine<Vec<Transaction>> {
    let from = first_day_of_month(year, month)?;
    let to = last_day_of_month(year, month)?;
    transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user_id.to_string()))
        .filter(transactions::Column::TransactionDate.gte(from))
        .filter(transactions::Column::TransactionDate.lte(to))
        .all(db_tx)
        .await?
        .into_iter()
        .map(Transaction::try_from)
        .collect()
}

/// Category name of every budget row mirrored by one of `txs`.
async fn budget_categories(
    db_tx: &DatabaseTransaction,
    txs: &[Transaction],
) -> ResultEngine<HashMap<Uuid, String>> {
    let ids: Vec<String> = txs
        .iter()
        .filter_map(|tx| tx.budget_id)
        .map(|id| id.to_string())
        .collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut categories = HashMap::new();
    for model in budgets::Entity::find()
        .filter(budgets::Column::Id.is_in(ids))
        .all(db_tx)
        .await?
    {
        let id = parse_uuid(&model.id, "budget")?;
        categories.insert(id, model.category_name);
    }
    Ok(categories)
}

fn totals_by_kind(txs: &[Transaction]) -> ResultEngine<HashMap<TransactionKind, i64>> {
    let mut totals = HashMap::new();
    for tx in txs {
        add_amount(totals.entry(tx.kind).or_insert(0), tx.amount)?;
    }
    Ok(totals)
}

fn daily_totals(year: i32, month: u32, txs: &[Transaction]) -> ResultEngine<Vec<DailyTotals>> {
    let days = last_day_of_month(year, month)?.day();
    let mut daily: Vec<DailyTotals> = (1..=days)
        .map(|day| DailyTotals {
            day,
            ..Default::default()
        })
        .collect();

    for tx in txs {
        let Some(entry) = daily.get_mut(tx.date.day0() as usize) else {
            continue;
        };
        let slot = match tx.kind {
            TransactionKind::Income => &mut entry.income,
            TransactionKind::Expense => &mut entry.expense,
            TransactionKind::Saving => &mut entry.saving,
            TransactionKind::Transfer | TransactionKind::AssetPurchase => continue,
        };
        add_amount(slot, tx.amount)?;
    }
    Ok(daily)
}

fn income_breakdown(
    txs: &[Transaction],
    categories: &HashMap<Uuid, String>,
) -> ResultEngine<Vec<IncomeSource>> {
    let mut sources: BTreeMap<&str, i64> = BTreeMap::new();
    for tx in txs.iter().filter(|tx| tx.kind == TransactionKind::Income) {
        let source = tx
            .budget_id
            .and_then(|id| categories.get(&id))
            .map(String::as_str)
            .unwrap_or(OTHER_INCOME);
        add_amount(sources.entry(source).or_insert(0), tx.amount)?;
    }
    Ok(sources
        .into_iter()
        .map(|(source, amount)| IncomeSource {
            source: source.to_string(),
            amount,
        })
        .collect())
}

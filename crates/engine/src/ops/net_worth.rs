//! Net-worth aggregator.
//!
//! "Now" is the live `current_value` of every asset plus the current account
//! balances. "Then" replaces each asset's live value with its latest history
//! snapshot at or before the reference instant; assets with no snapshot that
//! old count as 0.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Months, Utc};
use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{
    Asset, AssetKind, AssetSnapshot, EngineError, ResultEngine, accounts, asset_history,
    util::{checked_total, end_of_month, trailing_months},
};

use super::Engine;

pub const MAX_SERIES_MONTHS: u32 = 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetWorth {
    pub accounts_total: i64,
    pub assets_total: i64,
    pub net_worth: i64,
    /// Asset value per kind; kinds without assets are omitted.
    pub by_asset_kind: BTreeMap<AssetKind, i64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetWorthPoint {
    pub year: i32,
    pub month: u32,
    pub assets_total: i64,
    pub accounts_total: i64,
    pub net_worth: i64,
}

/// Where a share of the net worth sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocationSource {
    Asset(AssetKind),
    /// Money held on accounts.
    CashAndDeposits,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocationSlice {
    pub source: AllocationSource,
    pub value: i64,
}

/// Net worth now against one month ago.
#[derive(Clone, Debug, PartialEq)]
pub struct NetWorthChange {
    pub previous: i64,
    pub current: i64,
    pub absolute: i64,
    /// `0` when either side is `0`.
    pub percent: f64,
}

impl NetWorthChange {
    pub fn between(previous: i64, current: i64) -> ResultEngine<Self> {
        let absolute = current
            .checked_sub(previous)
            .ok_or_else(|| EngineError::invalid("net_worth", "total is out of range"))?;
        let percent = if previous == 0 || current == 0 {
            0.0
        } else {
            absolute as f64 / previous as f64 * 100.0
        };
        Ok(Self {
            previous,
            current,
            absolute,
            percent,
        })
    }
}

impl NetWorth {
    fn from_values(
        accounts_total: i64,
        values: impl IntoIterator<Item = (AssetKind, i64)>,
    ) -> ResultEngine<Self> {
        let mut by_asset_kind = BTreeMap::new();
        for (kind, value) in values {
            let slot = by_asset_kind.entry(kind).or_insert(0i64);
            *slot = checked_total([*slot, value], "current_value")?;
        }
        let assets_total = checked_total(by_asset_kind.values().copied(), "current_value")?;
        Ok(Self {
            accounts_total,
            assets_total,
            net_worth: checked_total([accounts_total, assets_total], "net_worth")?,
            by_asset_kind,
        })
    }

    /// Live net worth: each asset's `current_value`.
    pub fn current(accounts_total: i64, assets: &[Asset]) -> ResultEngine<Self> {
        Self::from_values(
            accounts_total,
            assets.iter().map(|asset| (asset.kind, asset.current_value)),
        )
    }

    /// Net worth at `at`, reading each asset's history.
    pub fn historical(
        accounts_total: i64,
        assets: &[Asset],
        at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        Self::from_values(
            accounts_total,
            assets
                .iter()
                .filter_map(|asset| asset.value_at(at).map(|value| (asset.kind, value))),
        )
    }

    /// One slice per asset kind held, then the account total when it is
    /// positive.
    pub fn allocation(&self) -> Vec<AllocationSlice> {
        let mut slices: Vec<AllocationSlice> = self
            .by_asset_kind
            .iter()
            .map(|(&kind, &value)| AllocationSlice {
                source: AllocationSource::Asset(kind),
                value,
            })
            .collect();
        if self.accounts_total > 0 {
            slices.push(AllocationSlice {
                source: AllocationSource::CashAndDeposits,
                value: self.accounts_total,
            });
        }
        slices
    }
}

impl Engine {
    /// Net worth right now.
    pub async fn net_worth(&self, user_id: &str) -> ResultEngine<NetWorth> {
        let accounts_total = self.total_balance(user_id).await?;
        let assets = self.assets(user_id).await?;
        NetWorth::current(accounts_total, &assets)
    }

    /// Live net worth against the historical one a month before `now`.
    pub async fn net_worth_change(
        &self,
        now: DateTime<Utc>,
        user_id: &str,
    ) -> ResultEngine<NetWorthChange> {
        let month_ago = now
            .checked_sub_months(Months::new(1))
            .ok_or_else(|| EngineError::invalid("date", "out of range"))?;
        let accounts_total = self.total_balance(user_id).await?;
        let assets = self.assets_with_history(user_id).await?;

        let current = NetWorth::current(accounts_total, &assets)?;
        let previous = NetWorth::historical(accounts_total, &assets, month_ago)?;
        NetWorthChange::between(previous.net_worth, current.net_worth)
    }

    /// Net worth as of `at`, from asset history snapshots.
    pub async fn net_worth_at(&self, at: DateTime<Utc>, user_id: &str) -> ResultEngine<NetWorth> {
        let accounts_total = self.total_balance(user_id).await?;
        let assets = self.assets_with_history(user_id).await?;
        NetWorth::historical(accounts_total, &assets, at)
    }

    /// Month-end net worth for the `months` months ending at `(year, month)`,
    /// oldest first.
    pub async fn net_worth_series(
        &self,
        year: i32,
        month: u32,
        months: u32,
        user_id: &str,
    ) -> ResultEngine<Vec<NetWorthPoint>> {
        if months == 0 || months > MAX_SERIES_MONTHS {
            return Err(EngineError::invalid(
                "months",
                format!("must be between 1 and {MAX_SERIES_MONTHS}"),
            ));
        }
        // Validates `(year, month)` before touching the database.
        end_of_month(year, month)?;

        let accounts_total = self.total_balance(user_id).await?;
        let assets = self.assets_with_history(user_id).await?;

        trailing_months(year, month, months)
            .into_iter()
            .map(|(year, month)| {
                let at = end_of_month(year, month)?;
                let point = NetWorth::historical(accounts_total, &assets, at)?;
                Ok(NetWorthPoint {
                    year,
                    month,
                    assets_total: point.assets_total,
                    accounts_total: point.accounts_total,
                    net_worth: point.net_worth,
                })
            })
            .collect()
    }

    /// Sum of the current balances of every account of the user.
    pub async fn total_balance(&self, user_id: &str) -> ResultEngine<i64> {
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .all(&self.database)
            .await?;
        checked_total(
            accounts.iter().map(|account| account.current_balance),
            "current_balance",
        )
    }

    async fn assets_with_history(&self, user_id: &str) -> ResultEngine<Vec<Asset>> {
        let mut assets = self.assets(user_id).await?;
        if assets.is_empty() {
            return Ok(assets);
        }

        let ids: Vec<String> = assets.iter().map(|asset| asset.id.to_string()).collect();
        let mut history: HashMap<String, Vec<AssetSnapshot>> = HashMap::new();
        let rows = asset_history::Entity::find()
            .filter(asset_history::Column::AssetId.is_in(ids))
            .order_by_asc(asset_history::Column::RecordedAt)
            .all(&self.database)
            .await?;
        for row in rows {
            let asset_id = row.asset_id.clone();
            history
                .entry(asset_id)
                .or_default()
                .push(AssetSnapshot::try_from(row)?);
        }

        for asset in &mut assets {
            asset.history = history.remove(&asset.id.to_string()).unwrap_or_default();
        }
        Ok(assets)
    }
}

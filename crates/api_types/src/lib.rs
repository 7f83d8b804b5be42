use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Per-field messages, only present for validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FieldMessage {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: Uuid,
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountRename {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        /// Signed sum of the account's transactions, in minor units.
        pub current_balance: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountsResponse {
        pub accounts: Vec<AccountView>,
        /// Sum of every account balance.
        pub total_balance: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Recalculated {
        pub current_balance: i64,
    }
}

pub mod asset {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AssetKind {
        Stocks,
        MutualFund,
        Crypto,
        RealEstate,
        Vehicle,
        Commodities,
        Other,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetNew {
        pub name: String,
        pub kind: AssetKind,
        pub current_value: i64,
    }

    /// Absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AssetUpdate {
        pub name: Option<String>,
        pub kind: Option<AssetKind>,
        pub current_value: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetSnapshotView {
        pub recorded_at: DateTime<Utc>,
        pub value: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetView {
        pub id: Uuid,
        pub name: String,
        pub kind: AssetKind,
        pub current_value: i64,
        /// Oldest first. Empty in list responses.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub history: Vec<AssetSnapshotView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetsResponse {
        pub assets: Vec<AssetView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
        Saving,
        Transfer,
        AssetPurchase,
    }

    /// Body of both create and update requests.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Uuid,
        pub kind: TransactionKind,
        /// Must be > 0. The kind gives the direction.
        pub amount: i64,
        pub description: Option<String>,
        pub date: NaiveDate,
    }

    /// Query string of `GET /transactions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub account_id: Option<Uuid>,
        /// Requires `month` as well.
        pub year: Option<i32>,
        pub month: Option<u32>,
        pub kind: Option<TransactionKind>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        /// Set when the transaction mirrors a budget row.
        pub budget_id: Option<Uuid>,
        pub kind: TransactionKind,
        pub amount: i64,
        pub description: String,
        pub date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetKind {
        Income,
        Saving,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetQuery {
        pub year: i32,
    }

    /// Identifies one budget line across all months of a year.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetCategory {
        pub category_name: String,
        pub kind: BudgetKind,
        pub year: i32,
        pub account_id: Uuid,
        /// Asset a new saving line is linked to. Ignored on delete.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub asset_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetRowUpdate {
        pub category_name: String,
        pub kind: BudgetKind,
        pub year: i32,
        pub account_id: Uuid,
        /// Only allowed for saving lines. Absent keeps the current link.
        pub asset_id: Option<Uuid>,
        /// Month number (1-12) to planned amount. Months left out are untouched.
        pub monthly_amounts: BTreeMap<u32, i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetRowView {
        pub id: Uuid,
        pub month: u32,
        pub planned_amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetRowResponse {
        pub rows: Vec<BudgetRowView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryAdded {
        pub created: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryDeleted {
        pub removed: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetLineView {
        pub category_name: String,
        pub kind: BudgetKind,
        pub account_id: Uuid,
        pub asset_id: Option<Uuid>,
        pub amounts: [i64; 12],
        pub total: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetOverviewResponse {
        pub year: i32,
        pub lines: Vec<BudgetLineView>,
        pub totals: BTreeMap<BudgetKind, i64>,
    }
}

pub mod net_worth {
    use super::*;
    use crate::asset::AssetKind;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetWorthQuery {
        /// Length of the monthly series ending with the current month.
        pub months: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetWorthAtQuery {
        pub date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetWorthView {
        pub accounts_total: i64,
        pub assets_total: i64,
        pub net_worth: i64,
        pub by_asset_kind: BTreeMap<AssetKind, i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetWorthPointView {
        pub year: i32,
        pub month: u32,
        pub assets_total: i64,
        pub accounts_total: i64,
        pub net_worth: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AllocationSource {
        Asset(AssetKind),
        CashAndDeposits,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllocationSliceView {
        pub source: AllocationSource,
        pub value: i64,
    }

    /// Net worth now against one month ago.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetWorthChangeView {
        pub previous: i64,
        pub absolute: i64,
        pub percent: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetWorthResponse {
        pub current: NetWorthView,
        pub change: NetWorthChangeView,
        pub allocation: Vec<AllocationSliceView>,
        pub series: Vec<NetWorthPointView>,
    }
}

pub mod dashboard {
    use super::*;
    use crate::{
        net_worth::NetWorthView,
        transaction::{TransactionKind, TransactionView},
    };

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardQuery {
        pub year: Option<i32>,
        pub month: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct KindSummaryView {
        pub kind: TransactionKind,
        pub current: i64,
        pub previous: i64,
        pub change_percent: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailyTotalsView {
        pub day: u32,
        pub income: i64,
        pub expense: i64,
        pub saving: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeSourceView {
        /// Budget category, or "Other Income".
        pub source: String,
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardResponse {
        pub year: i32,
        pub month: u32,
        pub first_name: String,
        pub summaries: Vec<KindSummaryView>,
        pub daily: Vec<DailyTotalsView>,
        pub income_breakdown: Vec<IncomeSourceView>,
        pub net_worth: NetWorthView,
        pub recent: Vec<TransactionView>,
    }
}

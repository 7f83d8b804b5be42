//! Personal-finance engine.
//!
//! The engine owns the database connection and exposes every operation the
//! server needs: account/asset/transaction CRUD, the account ledger, the
//! budget synchronizer and the net-worth and dashboard aggregators. Every
//! operation takes the id of the authenticated user and only ever sees rows
//! owned by that user.

pub use accounts::Account;
pub use assets::{Asset, AssetKind, AssetSnapshot};
pub use budgets::{Budget, BudgetKind};
pub use error::{EngineError, FieldError, FieldErrors};
pub use ops::{
    AllocationSlice, AllocationSource, AssetUpdate, BudgetKey, BudgetLine, BudgetOverview,
    BudgetRowUpdate, DailyTotals, Dashboard, Engine, EngineBuilder, IncomeSource, KindSummary,
    NetWorth, NetWorthChange, NetWorthPoint, OTHER_INCOME, TransactionInput,
    TransactionListFilter, change_percent,
};
pub use transactions::{MAX_AMOUNT, Transaction, TransactionKind, fold_balance};
pub use users::User;

mod accounts;
mod asset_history;
mod assets;
mod budgets;
mod error;
mod ops;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

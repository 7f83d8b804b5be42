use sea_orm::DatabaseConnection;
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

mod access;
mod accounts;
mod assets;
mod budgets;
mod dashboard;
mod ledger;
mod net_worth;
mod transactions;
mod users;

pub use assets::AssetUpdate;
pub use budgets::{BudgetKey, BudgetLine, BudgetOverview, BudgetRowUpdate};
pub use dashboard::{
    DailyTotals, Dashboard, IncomeSource, KindSummary, OTHER_INCOME, change_percent,
};
pub use net_worth::{AllocationSlice, AllocationSource, NetWorth, NetWorthChange, NetWorthPoint};
pub use transactions::{TransactionInput, TransactionListFilter};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 200;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Trim and NFC-normalize a required name, rejecting empty or overlong input.
fn normalize_required_name(value: &str, field: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::invalid(field, "must not be empty"));
    }
    if normalized.chars().count() > MAX_NAME_LEN {
        return Err(EngineError::invalid(
            field,
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(normalized)
}

fn normalize_description(value: Option<&str>) -> ResultEngine<String> {
    let normalized: String = value.map(str::trim).unwrap_or_default().nfc().collect();
    if normalized.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(EngineError::invalid(
            "description",
            format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
        ));
    }
    Ok(normalized)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, FieldErrors, MAX_AMOUNT, ResultEngine, Transaction, TransactionKind, accounts,
    transactions,
    util::{first_day_of_month, last_day_of_month},
};

use super::{Engine, ledger::recalculate_in, normalize_description, with_tx};

/// Fields of a transaction as submitted by a client.
#[derive(Clone, Debug)]
pub struct TransactionInput {
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl TransactionInput {
    fn validate(&self) -> ResultEngine<String> {
        let mut errors = FieldErrors::new();
        if self.amount <= 0 {
            errors.push("amount", "must be greater than 0");
        } else if self.amount > MAX_AMOUNT {
            errors.push("amount", format!("must be at most {MAX_AMOUNT}"));
        }
        let description = match normalize_description(self.description.as_deref()) {
            Ok(description) => description,
            Err(EngineError::Validation(inner)) => {
                for error in inner.iter() {
                    errors.push(&error.field, error.message.clone());
                }
                String::new()
            }
            Err(other) => return Err(other),
        };
        errors.into_result()?;
        Ok(description)
    }
}

/// Optional filters for listing transactions.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub account_id: Option<Uuid>,
    /// `(year, month)`
    pub month: Option<(i32, u32)>,
    pub kind: Option<TransactionKind>,
    pub limit: Option<u64>,
}

impl Engine {
    /// Transactions of the user, newest first.
    pub async fn transactions(
        &self,
        user_id: &str,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id.to_string()));
        if let Some(account_id) = filter.account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id.to_string()));
        }
        if let Some((year, month)) = filter.month {
            let from = first_day_of_month(year, month)?;
            let to = last_day_of_month(year, month)?;
            query = query
                .filter(transactions::Column::TransactionDate.gte(from))
                .filter(transactions::Column::TransactionDate.lte(to));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        query
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// Return a transaction snapshot from DB.
    pub async fn transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            Transaction::try_from(model)
        })
    }

    /// Records a new transaction and recalculates its account in the same DB
    /// transaction.
    pub async fn new_transaction(
        &self,
        input: TransactionInput,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        let description = input.validate()?;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, input.account_id)
                .await?;

            let tx = Transaction::new(
                input.account_id,
                input.kind,
                input.amount,
                description,
                input.date,
            );
            insert_transaction(&db_tx, user_id, &tx).await?;
            recalculate_in(&db_tx, &tx.account_id.to_string()).await?;
            Ok(tx)
        })
    }

    /// Replaces every editable field of a transaction.
    ///
    /// Moving a transaction to another account recalculates both accounts.
    /// A budget link, if any, is preserved.
    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        input: TransactionInput,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        let description = input.validate()?;
        with_tx!(self, |db_tx| {
            let current = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            self.require_account(&db_tx, user_id, input.account_id)
                .await?;

            let active = transactions::ActiveModel {
                id: ActiveValue::Set(current.id.clone()),
                account_id: ActiveValue::Set(input.account_id.to_string()),
                kind: ActiveValue::Set(input.kind.as_str().to_string()),
                amount: ActiveValue::Set(input.amount),
                description: ActiveValue::Set(description),
                transaction_date: ActiveValue::Set(input.date),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;

            recalculate_in(&db_tx, &model.account_id).await?;
            if current.account_id != model.account_id {
                recalculate_in(&db_tx, &current.account_id).await?;
            }
            Transaction::try_from(model)
        })
    }

    /// Deletes a transaction and recalculates its account.
    pub async fn delete_transaction(&self, transaction_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let current = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            transactions::Entity::delete_by_id(current.id.clone())
                .exec(&db_tx)
                .await?;
            recalculate_in(&db_tx, &current.account_id).await?;
            Ok(())
        })
    }

    /// Renders every transaction of the user as CSV, oldest first.
    ///
    /// Columns: `date,kind,amount,description,account`. Amounts are unsigned
    /// minor units; the kind gives the direction.
    pub async fn export_transactions_csv(&self, user_id: &str) -> ResultEngine<String> {
        let account_names: HashMap<String, String> = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|account| (account.id, account.name))
            .collect();

        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(transactions::Column::TransactionDate)
            .order_by_asc(transactions::Column::Id)
            .all(&self.database)
            .await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["date", "kind", "amount", "description", "account"])
            .map_err(csv_error)?;
        for model in models {
            let account = account_names
                .get(&model.account_id)
                .map(String::as_str)
                .unwrap_or_default();
            writer
                .write_record([
                    model.transaction_date.to_string().as_str(),
                    model.kind.as_str(),
                    model.amount.to_string().as_str(),
                    model.description.as_str(),
                    account,
                ])
                .map_err(csv_error)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| EngineError::Export(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| EngineError::Export(err.to_string()))
    }
}

fn csv_error(err: csv::Error) -> EngineError {
    EngineError::Export(err.to_string())
}

pub(super) async fn insert_transaction(
    db_tx: &DatabaseTransaction,
    user_id: &str,
    tx: &Transaction,
) -> ResultEngine<()> {
    let mut model: transactions::ActiveModel = tx.into();
    model.user_id = ActiveValue::Set(user_id.to_string());
    model.insert(db_tx).await?;
    Ok(())
}

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{ResultEngine, Transaction, accounts, fold_balance, transactions};

use super::{Engine, with_tx};

impl Engine {
    /// Recomputes the denormalized `current_balance` of an account from its
    /// transactions (`+amount` for income, `-amount` for everything else).
    ///
    /// Returns the new balance, or `None` when the account does not exist or
    /// is not owned by `user_id` (in which case nothing is written).
    pub async fn recalculate_balance(
        &self,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Option<i64>> {
        with_tx!(self, |db_tx| {
            let owned = accounts::Entity::find_by_id(account_id.to_string())
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if owned {
                recalculate_in(&db_tx, &account_id.to_string()).await
            } else {
                Ok(None)
            }
        })
    }
}

/// Recalculate inside an open DB transaction so the new balance commits
/// together with the mutation that triggered it.
pub(super) async fn recalculate_in(
    db_tx: &DatabaseTransaction,
    account_id: &str,
) -> ResultEngine<Option<i64>> {
    if accounts::Entity::find_by_id(account_id.to_string())
        .one(db_tx)
        .await?
        .is_none()
    {
        return Ok(None);
    }

    let models = transactions::Entity::find()
        .filter(transactions::Column::AccountId.eq(account_id.to_string()))
        .all(db_tx)
        .await?;
    let ledger = models
        .into_iter()
        .map(Transaction::try_from)
        .collect::<ResultEngine<Vec<_>>>()?;
    let balance = fold_balance(&ledger)?;

    let account = accounts::ActiveModel {
        id: ActiveValue::Set(account_id.to_string()),
        current_balance: ActiveValue::Set(balance),
        ..Default::default()
    };
    account.update(db_tx).await?;

    Ok(Some(balance))
}

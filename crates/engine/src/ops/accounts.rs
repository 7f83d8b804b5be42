use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{Account, EngineError, ResultEngine, accounts};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// All accounts of the user, ordered by name.
    pub async fn accounts(&self, user_id: &str) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Account::try_from).collect()
    }

    /// Return an account snapshot from DB.
    pub async fn account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, user_id, account_id).await?;
            Account::try_from(model)
        })
    }

    /// Add a new account with a zero balance.
    ///
    /// Names are unique per user, compared case-insensitively.
    pub async fn new_account(&self, name: &str, user_id: &str) -> ResultEngine<Account> {
        let name = normalize_required_name(name, "name")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            self.ensure_account_name_free(&db_tx, user_id, &name, None)
                .await?;

            let account = Account::new(name);
            let mut model: accounts::ActiveModel = (&account).into();
            model.user_id = ActiveValue::Set(user_id.to_string());
            model.insert(&db_tx).await?;
            Ok(account)
        })
    }

    /// Renames an existing account.
    pub async fn rename_account(
        &self,
        account_id: Uuid,
        new_name: &str,
        user_id: &str,
    ) -> ResultEngine<Account> {
        let new_name = normalize_required_name(new_name, "name")?;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, account_id).await?;
            self.ensure_account_name_free(&db_tx, user_id, &new_name, Some(account_id))
                .await?;

            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            Account::try_from(model)
        })
    }

    /// Deletes an account. Its transactions and budget rows go with it through
    /// the schema's cascade.
    pub async fn delete_account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, account_id).await?;
            accounts::Entity::delete_by_id(account_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn ensure_account_name_free(
        &self,
        db_tx: &sea_orm::DatabaseTransaction,
        user_id: &str,
        name: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .filter(
                Expr::expr(Func::lower(Expr::col(accounts::Column::Name)))
                    .eq(name.to_lowercase()),
            );
        if let Some(id) = except {
            query = query.filter(accounts::Column::Id.ne(id.to_string()));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        Ok(())
    }
}

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, FieldErrors, ResultEngine, User, budgets, transactions,
    users::{self, hash_password, verify_password},
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Registers a user. Usernames are unique.
    pub async fn new_user(
        &self,
        username: &str,
        password: &str,
        first_name: &str,
    ) -> ResultEngine<User> {
        let mut errors = FieldErrors::new();
        let username = username.trim();
        if username.is_empty() {
            errors.push("username", "must not be empty");
        }
        if password.is_empty() {
            errors.push("password", "must not be empty");
        }
        errors.into_result()?;
        let first_name = normalize_required_name(first_name, "first_name")?;
        let password_hash = hash_password(password)?;

        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Username.eq(username.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(username.to_string()));
            }

            let user = User {
                id: Uuid::new_v4(),
                username: username.to_string(),
                first_name,
            };
            let model = users::ActiveModel {
                id: ActiveValue::Set(user.id.to_string()),
                username: ActiveValue::Set(user.username.clone()),
                password_hash: ActiveValue::Set(password_hash),
                first_name: ActiveValue::Set(user.first_name.clone()),
            };
            model.insert(&db_tx).await?;
            Ok(user)
        })
    }

    /// Checks credentials. Unknown users and wrong passwords are both `None`.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Option<User>> {
        let Some(model) = users::Entity::find()
            .filter(users::Column::Username.eq(username.to_string()))
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };

        if verify_password(password, &model.password_hash)? {
            Ok(Some(User::try_from(model)?))
        } else {
            Ok(None)
        }
    }

    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            User::try_from(model)
        })
    }

    pub async fn user_by_username(&self, username: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username.trim().to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(username.to_string()))?;
        User::try_from(model)
    }

    /// Deletes a user and everything they own.
    ///
    /// Budget rows and transactions are removed explicitly first; the schema
    /// then cascades the user row to accounts, assets and asset history.
    pub async fn delete_user(&self, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            transactions::Entity::delete_many()
                .filter(transactions::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_many()
                .filter(budgets::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}

//! Ownership lookups.
//!
//! Every row is owned by exactly one user. A row that exists but belongs to
//! somebody else is reported exactly like a missing row.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, accounts, assets, transactions, users};

use super::Engine;

/// Generates a `require_*` method that loads a row by id, scoped to the
/// owning user.
macro_rules! impl_require_owned {
    ($require_fn:ident, $entity:path, $model:path, $user_col:expr, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            user_id: &str,
            target_id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(target_id.to_string())
                .filter($user_col.eq(user_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_owned!(
        require_account,
        accounts::Entity,
        accounts::Model,
        accounts::Column::UserId,
        "account not exists"
    );

    impl_require_owned!(
        require_asset,
        assets::Entity,
        assets::Model,
        assets::Column::UserId,
        "asset not exists"
    );

    impl_require_owned!(
        require_transaction,
        transactions::Entity,
        transactions::Model,
        transactions::Column::UserId,
        "transaction not exists"
    );

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Asset, AssetKind, AssetSnapshot, EngineError, MAX_AMOUNT, ResultEngine, asset_history, assets,
};

use super::{Engine, normalize_required_name, with_tx};

/// Partial update of an asset; `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub kind: Option<AssetKind>,
    pub current_value: Option<i64>,
}

fn validate_value(value: i64) -> ResultEngine<()> {
    if value < 0 {
        return Err(EngineError::invalid("current_value", "must be >= 0"));
    }
    if value > MAX_AMOUNT {
        return Err(EngineError::invalid(
            "current_value",
            format!("must be at most {MAX_AMOUNT}"),
        ));
    }
    Ok(())
}

impl Engine {
    /// All assets of the user, ordered by name. History is not loaded.
    pub async fn assets(&self, user_id: &str) -> ResultEngine<Vec<Asset>> {
        let models = assets::Entity::find()
            .filter(assets::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(assets::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Asset::try_from).collect()
    }

    /// One asset with its full history, oldest snapshot first.
    pub async fn asset(&self, asset_id: Uuid, user_id: &str) -> ResultEngine<Asset> {
        with_tx!(self, |db_tx| {
            let model = self.require_asset(&db_tx, user_id, asset_id).await?;
            let mut asset = Asset::try_from(model)?;
            asset.history = load_history(&db_tx, &asset_id.to_string()).await?;
            Ok(asset)
        })
    }

    /// Creates an asset and records its first history snapshot at
    /// `current_value`.
    pub async fn new_asset(
        &self,
        name: &str,
        kind: AssetKind,
        current_value: i64,
        user_id: &str,
    ) -> ResultEngine<Asset> {
        let name = normalize_required_name(name, "name")?;
        validate_value(current_value)?;
        let recorded_at = Utc::now();
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let mut asset = Asset::new(name, kind, current_value);
            let mut model: assets::ActiveModel = (&asset).into();
            model.user_id = ActiveValue::Set(user_id.to_string());
            model.insert(&db_tx).await?;

            let snapshot = AssetSnapshot::new(recorded_at, current_value);
            asset_history::ActiveModel::for_asset(&asset.id.to_string(), &snapshot)
                .insert(&db_tx)
                .await?;
            asset.history.push(snapshot);

            Ok(asset)
        })
    }

    /// Updates name, kind and/or value. A value change appends a history
    /// snapshot.
    pub async fn update_asset(
        &self,
        asset_id: Uuid,
        update: AssetUpdate,
        user_id: &str,
    ) -> ResultEngine<Asset> {
        let name = update
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "name"))
            .transpose()?;
        if let Some(value) = update.current_value {
            validate_value(value)?;
        }
        let recorded_at = Utc::now();

        with_tx!(self, |db_tx| {
            let current = self.require_asset(&db_tx, user_id, asset_id).await?;
            let id = current.id.clone();

            let mut active = assets::ActiveModel {
                id: ActiveValue::Set(id.clone()),
                ..Default::default()
            };
            let mut changed = false;
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
                changed = true;
            }
            if let Some(kind) = update.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
                changed = true;
            }
            if let Some(value) = update.current_value
                && value != current.current_value
            {
                active.current_value = ActiveValue::Set(value);
                changed = true;
                let snapshot = AssetSnapshot::new(recorded_at, value);
                asset_history::ActiveModel::for_asset(&id, &snapshot)
                    .insert(&db_tx)
                    .await?;
            }

            let model = if changed {
                active.update(&db_tx).await?
            } else {
                current
            };
            let mut asset = Asset::try_from(model)?;
            asset.history = load_history(&db_tx, &id).await?;
            Ok(asset)
        })
    }

    /// Deletes an asset. History goes with it; budget rows linked to it keep
    /// their plan and lose the link.
    pub async fn delete_asset(&self, asset_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_asset(&db_tx, user_id, asset_id).await?;
            assets::Entity::delete_by_id(asset_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}

pub(super) async fn load_history(
    db_tx: &DatabaseTransaction,
    asset_id: &str,
) -> ResultEngine<Vec<AssetSnapshot>> {
    asset_history::Entity::find()
        .filter(asset_history::Column::AssetId.eq(asset_id.to_string()))
        .order_by_asc(asset_history::Column::RecordedAt)
        .all(db_tx)
        .await?
        .into_iter()
        .map(AssetSnapshot::try_from)
        .collect()
}

/// Shift an asset's live value by `delta` and snapshot the result.
///
/// Returns the new value, or `None` when the asset is gone.
pub(super) async fn adjust_asset_value(
    db_tx: &DatabaseTransaction,
    asset_id: &str,
    delta: i64,
    recorded_at: DateTime<Utc>,
) -> ResultEngine<Option<i64>> {
    let Some(model) = assets::Entity::find_by_id(asset_id.to_string())
        .one(db_tx)
        .await?
    else {
        return Ok(None);
    };
    if delta == 0 {
        return Ok(Some(model.current_value));
    }

    let new_value = model
        .current_value
        .checked_add(delta)
        .filter(|value| *value <= MAX_AMOUNT)
        .ok_or_else(|| {
            EngineError::invalid("current_value", format!("must be at most {MAX_AMOUNT}"))
        })?;
    let active = assets::ActiveModel {
        id: ActiveValue::Set(model.id.clone()),
        current_value: ActiveValue::Set(new_value),
        ..Default::default()
    };
    active.update(db_tx).await?;

    let snapshot = AssetSnapshot::new(recorded_at, new_value);
    asset_history::ActiveModel::for_asset(&model.id, &snapshot)
        .insert(db_tx)
        .await?;

    Ok(Some(new_value))
}

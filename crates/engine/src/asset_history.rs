//! Asset value snapshots table.

use sea_orm::{ActiveValue, entity::prelude::*};

use crate::AssetSnapshot;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "asset_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub asset_id: String,
    pub recorded_at: DateTimeUtc,
    pub value: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assets::Entity",
        from = "Column::AssetId",
        to = "super::assets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Assets,
}

impl Related<super::assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn for_asset(asset_id: &str, snapshot: &AssetSnapshot) -> Self {
        Self {
            id: ActiveValue::Set(snapshot.id.to_string()),
            asset_id: ActiveValue::Set(asset_id.to_string()),
            recorded_at: ActiveValue::Set(snapshot.recorded_at),
            value: ActiveValue::Set(snapshot.value),
        }
    }
}

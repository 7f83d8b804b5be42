//! Assets and their value history.
//!
//! An asset carries a live `current_value`; every value it has held is kept as
//! a dated snapshot in `asset_history` so past net worth can be rebuilt.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, asset_history, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
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

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stocks => "stocks",
            Self::MutualFund => "mutual_fund",
            Self::Crypto => "crypto",
            Self::RealEstate => "real_estate",
            Self::Vehicle => "vehicle",
            Self::Commodities => "commodities",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for AssetKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "stocks" => Ok(Self::Stocks),
            "mutual_fund" => Ok(Self::MutualFund),
            "crypto" => Ok(Self::Crypto),
            "real_estate" => Ok(Self::RealEstate),
            "vehicle" => Ok(Self::Vehicle),
            "commodities" => Ok(Self::Commodities),
            "other" => Ok(Self::Other),
            other => Err(EngineError::invalid(
                "kind",
                format!("invalid asset kind: {other}"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    pub kind: AssetKind,
    pub current_value: i64,
    /// Snapshots ordered by `recorded_at`. Empty unless explicitly loaded.
    pub history: Vec<AssetSnapshot>,
}

impl Asset {
    pub fn new(name: String, kind: AssetKind, current_value: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            kind,
            current_value,
            history: Vec::new(),
        }
    }

    /// Value of the latest snapshot recorded at or before `at`.
    ///
    /// `None` when the asset has no snapshot that old.
    pub fn value_at(&self, at: DateTime<Utc>) -> Option<i64> {
        self.history
            .iter()
            .filter(|snapshot| snapshot.recorded_at <= at)
            .max_by_key(|snapshot| snapshot.recorded_at)
            .map(|snapshot| snapshot.value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetSnapshot {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub value: i64,
}

impl AssetSnapshot {
    pub fn new(recorded_at: DateTime<Utc>, value: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at,
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: String,
    pub current_value: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::asset_history::Entity")]
    History,
}

impl Related<super::asset_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Asset> for ActiveModel {
    fn from(value: &Asset) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::NotSet,
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            current_value: ActiveValue::Set(value.current_value),
        }
    }
}

impl TryFrom<Model> for Asset {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "asset")?,
            name: model.name,
            kind: AssetKind::try_from(model.kind.as_str())?,
            current_value: model.current_value,
            history: Vec::new(),
        })
    }
}

impl TryFrom<asset_history::Model> for AssetSnapshot {
    type Error = EngineError;

    fn try_from(model: asset_history::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "asset history")?,
            recorded_at: model.recorded_at,
            value: model.value,
        })
    }
}

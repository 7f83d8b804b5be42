//! Engine types to API views and back.

use api_types::{
    asset::{AssetKind as ApiAssetKind, AssetSnapshotView, AssetView},
    budget::BudgetKind as ApiBudgetKind,
    net_worth::{AllocationSource as ApiAllocationSource, NetWorthView},
    transaction::{TransactionKind as ApiKind, TransactionView},
};

pub(crate) fn transaction_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
        ApiKind::Saving => engine::TransactionKind::Saving,
        ApiKind::Transfer => engine::TransactionKind::Transfer,
        ApiKind::AssetPurchase => engine::TransactionKind::AssetPurchase,
    }
}

pub(crate) fn map_transaction_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
        engine::TransactionKind::Saving => ApiKind::Saving,
        engine::TransactionKind::Transfer => ApiKind::Transfer,
        engine::TransactionKind::AssetPurchase => ApiKind::AssetPurchase,
    }
}

pub(crate) fn asset_kind(kind: ApiAssetKind) -> engine::AssetKind {
    match kind {
        ApiAssetKind::Stocks => engine::AssetKind::Stocks,
        ApiAssetKind::MutualFund => engine::AssetKind::MutualFund,
        ApiAssetKind::Crypto => engine::AssetKind::Crypto,
        ApiAssetKind::RealEstate => engine::AssetKind::RealEstate,
        ApiAssetKind::Vehicle => engine::AssetKind::Vehicle,
        ApiAssetKind::Commodities => engine::AssetKind::Commodities,
        ApiAssetKind::Other => engine::AssetKind::Other,
    }
}

pub(crate) fn map_asset_kind(kind: engine::AssetKind) -> ApiAssetKind {
    match kind {
        engine::AssetKind::Stocks => ApiAssetKind::Stocks,
        engine::AssetKind::MutualFund => ApiAssetKind::MutualFund,
        engine::AssetKind::Crypto => ApiAssetKind::Crypto,
        engine::AssetKind::RealEstate => ApiAssetKind::RealEstate,
        engine::AssetKind::Vehicle => ApiAssetKind::Vehicle,
        engine::AssetKind::Commodities => ApiAssetKind::Commodities,
        engine::AssetKind::Other => ApiAssetKind::Other,
    }
}

pub(crate) fn budget_kind(kind: ApiBudgetKind) -> engine::BudgetKind {
    match kind {
        ApiBudgetKind::Income => engine::BudgetKind::Income,
        ApiBudgetKind::Saving => engine::BudgetKind::Saving,
        ApiBudgetKind::Expense => engine::BudgetKind::Expense,
    }
}

pub(crate) fn map_budget_kind(kind: engine::BudgetKind) -> ApiBudgetKind {
    match kind {
        engine::BudgetKind::Income => ApiBudgetKind::Income,
        engine::BudgetKind::Saving => ApiBudgetKind::Saving,
        engine::BudgetKind::Expense => ApiBudgetKind::Expense,
    }
}

pub(crate) fn transaction_view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        account_id: tx.account_id,
        budget_id: tx.budget_id,
        kind: map_transaction_kind(tx.kind),
        amount: tx.amount,
        description: tx.description,
        date: tx.date,
    }
}

pub(crate) fn asset_view(asset: engine::Asset) -> AssetView {
    AssetView {
        id: asset.id,
        name: asset.name,
        kind: map_asset_kind(asset.kind),
        current_value: asset.current_value,
        history: asset
            .history
            .into_iter()
            .map(|snapshot| AssetSnapshotView {
                recorded_at: snapshot.recorded_at,
                value: snapshot.value,
            })
            .collect(),
    }
}

pub(crate) fn net_worth_view(net_worth: engine::NetWorth) -> NetWorthView {
    NetWorthView {
        accounts_total: net_worth.accounts_total,
        assets_total: net_worth.assets_total,
        net_worth: net_worth.net_worth,
        by_asset_kind: net_worth
            .by_asset_kind
            .into_iter()
            .map(|(kind, value)| (map_asset_kind(kind), value))
            .collect(),
    }
}

pub(crate) fn allocation_source(source: engine::AllocationSource) -> ApiAllocationSource {
    match source {
        engine::AllocationSource::Asset(kind) => ApiAllocationSource::Asset(map_asset_kind(kind)),
        engine::AllocationSource::CashAndDeposits => ApiAllocationSource::CashAndDeposits,
    }
}

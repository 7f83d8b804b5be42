//! Budget API endpoints.
//!
//! A budget line is addressed by its category, kind, year and account; the
//! engine keeps the mirrored transactions in step with every change.

use api_types::budget::{
    BudgetCategory, BudgetLineView, BudgetOverviewResponse, BudgetQuery, BudgetRowResponse,
    BudgetRowUpdate, BudgetRowView, CategoryAdded, CategoryDeleted,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    ServerError,
    convert::{budget_kind, map_budget_kind},
    server::{ServerState, Session},
};

fn key(category: BudgetCategory) -> engine::BudgetKey {
    engine::BudgetKey {
        category_name: category.category_name,
        kind: budget_kind(category.kind),
        year: category.year,
        account_id: category.account_id,
    }
}

pub async fn overview(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<BudgetOverviewResponse>, ServerError> {
    let overview = state
        .engine
        .budget_overview(query.year, session.user_id())
        .await?;

    Ok(Json(BudgetOverviewResponse {
        year: overview.year,
        lines: overview
            .lines
            .into_iter()
            .map(|line| BudgetLineView {
                category_name: line.category_name,
                kind: map_budget_kind(line.kind),
                account_id: line.account_id,
                asset_id: line.asset_id,
                amounts: line.amounts,
                total: line.total,
            })
            .collect(),
        totals: overview
            .totals
            .into_iter()
            .map(|(kind, total)| (map_budget_kind(kind), total))
            .collect(),
    }))
}

pub async fn update_row(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetRowUpdate>,
) -> Result<Json<BudgetRowResponse>, ServerError> {
    let update = engine::BudgetRowUpdate {
        key: key(BudgetCategory {
            category_name: payload.category_name,
            kind: payload.kind,
            year: payload.year,
            account_id: payload.account_id,
            asset_id: None,
        }),
        asset_id: payload.asset_id,
        monthly_amounts: payload.monthly_amounts,
    };
    let rows = state
        .engine
        .update_budget_row(update, session.user_id())
        .await?;

    Ok(Json(BudgetRowResponse {
        rows: rows
            .into_iter()
            .map(|row| BudgetRowView {
                id: row.id,
                month: row.month,
                planned_amount: row.planned_amount,
            })
            .collect(),
    }))
}

pub async fn add_category(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetCategory>,
) -> Result<(StatusCode, Json<CategoryAdded>), ServerError> {
    let asset_id = payload.asset_id;
    let created = state
        .engine
        .add_budget_category(key(payload), asset_id, session.user_id())
        .await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(CategoryAdded { created })))
}

pub async fn delete_category(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetCategory>,
) -> Result<Json<CategoryDeleted>, ServerError> {
    let removed = state
        .engine
        .delete_budget_category(key(payload), session.user_id())
        .await?;
    Ok(Json(CategoryDeleted { removed }))
}

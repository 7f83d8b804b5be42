//! Transactions API endpoints

use api_types::{
    Created,
    transaction::{TransactionList, TransactionListResponse, TransactionNew, TransactionView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{transaction_kind, transaction_view},
    server::{ServerState, Session},
};

fn input(payload: TransactionNew) -> engine::TransactionInput {
    engine::TransactionInput {
        account_id: payload.account_id,
        kind: transaction_kind(payload.kind),
        amount: payload.amount,
        description: payload.description,
        date: payload.date,
    }
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let month = match (query.year, query.month) {
        (Some(year), Some(month)) => Some((year, month)),
        (None, None) => None,
        _ => {
            return Err(ServerError::Generic(
                "year and month must be given together".to_string(),
            ));
        }
    };

    let filter = engine::TransactionListFilter {
        account_id: query.account_id,
        month,
        kind: query.kind.map(transaction_kind),
        limit: query.limit,
    };
    let txs = state
        .engine
        .transactions(session.user_id(), &filter)
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: txs.into_iter().map(transaction_view).collect(),
    }))
}

pub async fn transaction_new(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let tx = state
        .engine
        .new_transaction(input(payload), session.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id: tx.id })))
}

pub async fn get(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .transaction(transaction_id, session.user_id())
        .await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn update(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<TransactionNew>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .update_transaction(transaction_id, input(payload), session.user_id())
        .await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn delete(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_transaction(transaction_id, session.user_id())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn export(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<impl IntoResponse, ServerError> {
    let csv = state
        .engine
        .export_transactions_csv(session.user_id())
        .await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv,
    ))
}

//! Accounts API endpoints.

use api_types::{
    Created,
    account::{AccountNew, AccountRename, AccountView, AccountsResponse, Recalculated},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::EngineError;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, server::Session};

fn account_view(account: engine::Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        current_balance: account.current_balance,
    }
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<AccountsResponse>, ServerError> {
    let accounts = state.engine.accounts(session.user_id()).await?;
    let total_balance = state.engine.total_balance(session.user_id()).await?;
    Ok(Json(AccountsResponse {
        accounts: accounts.into_iter().map(account_view).collect(),
        total_balance,
    }))
}

pub async fn account_new(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let account = state
        .engine
        .new_account(&payload.name, session.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id: account.id })))
}

pub async fn get(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .engine
        .account(account_id, session.user_id())
        .await?;
    Ok(Json(account_view(account)))
}

pub async fn rename(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<AccountRename>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .engine
        .rename_account(account_id, &payload.name, session.user_id())
        .await?;
    Ok(Json(account_view(account)))
}

pub async fn delete(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_account(account_id, session.user_id())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rebuilds the balance from the account's transactions.
pub async fn recalculate(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Recalculated>, ServerError> {
    let current_balance = state
        .engine
        .recalculate_balance(account_id, session.user_id())
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
    Ok(Json(Recalculated { current_balance }))
}

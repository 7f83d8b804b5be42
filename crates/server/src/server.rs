use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{accounts, assets, budgets, dashboard, net_worth, transactions, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// The authenticated user of the current request.
///
/// Inserted by the auth middleware; handlers take it as
/// `Extension<Session>`.
#[derive(Clone, Debug)]
pub struct Session {
    user_id: String,
    username: String,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = state
        .engine
        .authenticate(credentials.username(), credentials.password())
        .await
        .map_err(|err| {
            tracing::error!("authentication failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(Session {
        user_id: user.id.to_string(),
        username: user.username,
    });
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/dashboard", get(dashboard::get))
        .route(
            "/accounts",
            get(accounts::list).post(accounts::account_new),
        )
        .route(
            "/accounts/{id}",
            get(accounts::get)
                .patch(accounts::rename)
                .delete(accounts::delete),
        )
        .route("/accounts/{id}/recalculate", post(accounts::recalculate))
        .route("/assets", get(assets::list).post(assets::asset_new))
        .route(
            "/assets/{id}",
            get(assets::get).patch(assets::update).delete(assets::delete),
        )
        .route("/budgets", get(budgets::overview))
        .route("/budgets/row", put(budgets::update_row))
        .route(
            "/budgets/category",
            post(budgets::add_category).delete(budgets::delete_category),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::transaction_new),
        )
        .route("/transactions/export", get(transactions::export))
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        .route("/net-worth", get(net_worth::get))
        .route("/net-worth/at", get(net_worth::at))
        .route("/user", axum::routing::delete(user::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, bind: &str, port: u16) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind((bind, port)).await?;
    run_with_listener(engine, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

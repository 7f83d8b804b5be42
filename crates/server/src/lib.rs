use api_types::{ErrorBody, FieldMessage};
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerState, Session, router, run, run_with_listener, spawn_with_listener};

mod accounts;
mod assets;
mod budgets;
mod convert;
mod dashboard;
mod net_worth;
mod server;
mod transactions;
mod user;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::InvalidId(_) => StatusCode::BAD_REQUEST,
        EngineError::Password(_) | EngineError::Export(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    match err {
        EngineError::Validation(errors) => ErrorBody {
            error: "invalid input".to_string(),
            fields: errors
                .iter()
                .map(|e| FieldMessage {
                    field: e.field.clone(),
                    message: e.message.clone(),
                })
                .collect(),
        },
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            ErrorBody {
                error: "internal server error".to_string(),
                fields: Vec::new(),
            }
        }
        other @ (EngineError::Password(_) | EngineError::Export(_)) => {
            tracing::error!("{other}");
            ErrorBody {
                error: "internal server error".to_string(),
                fields: Vec::new(),
            }
        }
        other => ErrorBody {
            error: other.to_string(),
            fields: Vec::new(),
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error,
                    fields: Vec::new(),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn engine_validation_maps_to_422_with_fields() {
        let res = ServerError::from(EngineError::invalid("amount", "must be greater than 0"))
            .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["fields"][0]["field"], "amount");
        assert_eq!(body["fields"][0]["message"], "must be greater than 0");
    }

    #[tokio::test]
    async fn database_error_is_hidden() {
        let res = ServerError::from(EngineError::Database(sea_orm::DbErr::Custom(
            "disk I/O error".to_string(),
        )))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal server error");
        assert!(body.get("fields").is_none());
    }

    #[test]
    fn invalid_id_maps_to_400() {
        let res = ServerError::from(EngineError::InvalidId("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

//! HTTP surface: the validation RPC and the token-registry admin API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use autonoindex_core::db::unix_timestamp;

use crate::storage::{TokenDatabase, TokenRecord, TokenRegistration};
use crate::validate::{ValidateRequest, ValidateResponse, evaluate};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: TokenDatabase,
}

/// Build the server router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/noindex/validate", post(validate_noindex))
        .route("/v1/tokens", get(list_tokens))
        .route(
            "/v1/tokens/{token}",
            put(upsert_token).delete(delete_token),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `POST /v1/noindex/validate` -- the validation RPC.
///
/// Always answers HTTP 200; denials and errors are encoded in the body as
/// `active: false`. A malformed body is coerced to empty fields rather
/// than rejected, which yields the empty-token denial.
async fn validate_noindex(State(state): State<AppState>, body: String) -> Json<ValidateResponse> {
    let req: ValidateRequest = serde_json::from_str(&body).unwrap_or_default();

    let token = req.token.trim();
    let record = if token.is_empty() {
        None
    } else {
        match state.db.get_token(token).await {
            Ok(record) => record,
            Err(e) => {
                // Registry unavailable: answer as unknown token.
                warn!(error = %e, "Token lookup failed");
                None
            }
        }
    };

    let resp = evaluate(record.as_ref(), &req, unix_timestamp());
    info!(
        site = %req.site,
        plugin = %req.plugin,
        active = resp.active,
        "Validation answered"
    );
    Json(resp)
}

/// `GET /v1/tokens` -- list all registry rows.
async fn list_tokens(
    State(state): State<AppState>,
) -> Result<Json<Vec<TokenRecord>>, StatusCode> {
    state
        .db
        .list_tokens()
        .await
        .map(Json)
        .map_err(internal_error)
}

/// `PUT /v1/tokens/{token}` -- create or update a registry row.
async fn upsert_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(registration): Json<TokenRegistration>,
) -> Result<Json<TokenRecord>, StatusCode> {
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    state
        .db
        .upsert_token(&token, &registration)
        .await
        .map(Json)
        .map_err(internal_error)
}

/// `DELETE /v1/tokens/{token}`
async fn delete_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let removed = state
        .db
        .delete_token(token.trim())
        .await
        .map_err(internal_error)?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

fn internal_error(e: autonoindex_core::db::DatabaseError) -> StatusCode {
    warn!(error = %e, "Registry query failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

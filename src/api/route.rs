use crate::{
    api::error::ApiError,
    models::{NewTransaction, TransactionUpdate},
    state::AppState,
    validation::{validate_date_range, validate_page},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

// GET /core/ query parameters
#[derive(Deserialize)]
struct ListQuery {
    user_id: Option<i64>,
    page: Option<i64>,
}

// GET /core/{user_id}/analytics query parameters
#[derive(Deserialize)]
struct AnalyticsQuery {
    transaction_value_start_date: Option<String>,
    transaction_value_end_date: Option<String>,
}

// Create router with all routes
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/core/", post(create_transaction).get(list_transactions))
        .route(
            "/core/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route("/core/{id}/analytics", get(get_analytics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

// POST /core/ handler
async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewTransaction>,
) -> Result<Response, ApiError> {
    let transaction = state.transactions.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(transaction)).into_response())
}

// GET /core/ handler
async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let page = validate_page(params.page.unwrap_or(1))?;

    let transactions = state.transactions.get_list(params.user_id, page).await?;
    Ok(Json(transactions).into_response())
}

// GET /core/{id} handler
async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    match state.transactions.get_one(id).await? {
        Some(transaction) => Ok(Json(transaction).into_response()),
        None => Err(ApiError::NotFound(
            "Transaction with the given ID does not exist".to_string(),
        )),
    }
}

// PUT /core/{id} handler
async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Response, ApiError> {
    let transaction = state.transactions.update(id, &payload).await?;
    Ok(Json(transaction).into_response())
}

// DELETE /core/{id} handler
async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    state.transactions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// GET /core/{user_id}/analytics handler
async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Response, ApiError> {
    let range = validate_date_range(
        params.transaction_value_start_date.as_deref(),
        params.transaction_value_end_date.as_deref(),
    )?;
    info!("Computing analytics for user {} over {:?}", user_id, range);

    let analytics = state.analytics.analytics(user_id, &range).await?;
    Ok(Json(analytics).into_response())
}
